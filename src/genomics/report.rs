use anyhow::{anyhow, Result};
use std::io::Write;

use super::{CoverageWindower, DepthAccumulator, SequenceStore, WindowParams};
use crate::pipeline::RunSummary;

const DEPTH_HEADER: &str = "#replicon\tposition\tbase\tplus\tminus\ttotal\n";
const WINDOW_HEADER: &str = "#replicon\toffset\tdepth\tsequence\n";
const SUMMARY_HEADER: &str = "#metric\tvalue\n";
const HISTOGRAM_HEADER: &str = "#distance\tpairs\n";

/// Write per-position strand depth for every position whose combined depth
/// reaches `threshold`. Positions are 1-based.
pub fn write_depth_table<W: Write>(
    writer: &mut W,
    store: &SequenceStore,
    depth: &DepthAccumulator,
    threshold: u64,
) -> Result<()> {
    writer.write_all(DEPTH_HEADER.as_bytes())?;

    for (index, replicon) in store.iter().enumerate() {
        let arrays = depth
            .arrays(index)
            .ok_or_else(|| anyhow!("no depth tracks for replicon '{}'", replicon.id()))?;

        for (position, &base) in replicon.raw_sequence().iter().enumerate() {
            let total = arrays.total_at(position);
            if total < threshold {
                continue;
            }
            let line = format!(
                "{name}\t{pos}\t{base}\t{plus}\t{minus}\t{total}\n",
                name = replicon.name(),
                pos = position + 1,
                base = base as char,
                plus = arrays.plus()[position],
                minus = arrays.minus()[position],
            );
            writer.write_all(line.as_bytes())?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Render the depth table into a string.
pub fn render_depth_table(
    store: &SequenceStore,
    depth: &DepthAccumulator,
    threshold: u64,
) -> Result<String> {
    let mut buffer = Vec::new();
    write_depth_table(&mut buffer, store, depth, threshold)?;
    String::from_utf8(buffer).map_err(|_| anyhow!("rendered depth table is not valid UTF-8"))
}

/// Write windowed coverage with the sequence snapshot of each window.
pub fn write_window_table<W: Write>(
    writer: &mut W,
    store: &SequenceStore,
    depth: &DepthAccumulator,
    params: WindowParams,
) -> Result<()> {
    writer.write_all(WINDOW_HEADER.as_bytes())?;
    let windower = CoverageWindower::new(store, depth);

    for replicon in store.iter() {
        for window in windower.windows(replicon.id(), params)? {
            writer.write_all(replicon.name().as_bytes())?;
            write!(writer, "\t{}\t{}\t", window.offset, window.summed_depth)?;
            writer.write_all(window.sequence)?;
            writer.write_all(b"\n")?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Render the window table into a string.
pub fn render_window_table(
    store: &SequenceStore,
    depth: &DepthAccumulator,
    params: WindowParams,
) -> Result<String> {
    let mut buffer = Vec::new();
    write_window_table(&mut buffer, store, depth, params)?;
    String::from_utf8(buffer).map_err(|_| anyhow!("rendered window table is not valid UTF-8"))
}

/// Write run counters and the depth fingerprint.
pub fn write_summary<W: Write>(
    writer: &mut W,
    summary: &RunSummary,
    depth: &DepthAccumulator,
) -> Result<()> {
    writer.write_all(SUMMARY_HEADER.as_bytes())?;

    let counters = [
        ("total_pairs", summary.total_pairs),
        ("short_reads", summary.short_reads),
        ("ambiguous", summary.ambiguous),
        ("no_match", summary.no_match),
        ("not_valid", summary.not_valid()),
        ("abnormal_distance", summary.abnormal_distance),
        ("accepted", summary.accepted),
        ("accepted_forward", summary.accepted_forward),
        ("accepted_reverse", summary.accepted_reverse),
    ];
    for (name, value) in counters {
        writeln!(writer, "{name}\t{value}")?;
    }
    for (id, count) in &summary.accepted_per_replicon {
        let name = id.split_whitespace().next().unwrap_or(&**id);
        writeln!(writer, "accepted[{name}]\t{count}")?;
    }
    writeln!(writer, "depth_fingerprint\t{}", depth.fingerprint().to_hex())?;

    writer.flush()?;
    Ok(())
}

/// Render the summary into a string.
pub fn render_summary(summary: &RunSummary, depth: &DepthAccumulator) -> Result<String> {
    let mut buffer = Vec::new();
    write_summary(&mut buffer, summary, depth)?;
    String::from_utf8(buffer).map_err(|_| anyhow!("rendered summary is not valid UTF-8"))
}

/// Write the distance histogram of accepted pairs in ascending distance order.
pub fn write_distance_histogram<W: Write>(writer: &mut W, summary: &RunSummary) -> Result<()> {
    writer.write_all(HISTOGRAM_HEADER.as_bytes())?;
    for (distance, pairs) in &summary.distance_histogram {
        writeln!(writer, "{distance}\t{pairs}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Render the distance histogram into a string.
pub fn render_distance_histogram(summary: &RunSummary) -> Result<String> {
    let mut buffer = Vec::new();
    write_distance_histogram(&mut buffer, summary)?;
    String::from_utf8(buffer).map_err(|_| anyhow!("rendered histogram is not valid UTF-8"))
}
