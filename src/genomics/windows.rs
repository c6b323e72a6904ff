#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::genomics::{DepthAccumulator, DepthArrays, Replicon, SequenceStore};

/// Errors raised while deriving windowed coverage.
#[derive(Debug, Error)]
pub enum WindowError {
    /// Window geometry is unusable.
    #[error("invalid window parameters: {0}")]
    InvalidWindow(String),

    /// No replicon with that id.
    #[error("unknown replicon '{0}'")]
    UnknownReplicon(String),
}

/// Geometry of the sliding coverage window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WindowParams {
    /// Bases per window.
    pub size: usize,
    /// Bases trimmed from each side before summing depth.
    pub margin: usize,
    /// Offset between consecutive windows.
    pub step: usize,
}

impl WindowParams {
    /// Check that the margins fit inside the window and the step advances.
    ///
    /// A margin of exactly half the size is allowed; its trimmed span is
    /// empty and every window sums to zero.
    pub fn validate(&self) -> Result<(), WindowError> {
        if self.size == 0 {
            return Err(WindowError::InvalidWindow("size must be > 0".to_string()));
        }
        if self.step == 0 {
            return Err(WindowError::InvalidWindow("step must be > 0".to_string()));
        }
        if self.margin > self.size / 2 {
            return Err(WindowError::InvalidWindow(format!(
                "margins of {} overlap inside a {}-base window",
                self.margin, self.size
            )));
        }
        Ok(())
    }
}

impl Default for WindowParams {
    fn default() -> Self {
        Self {
            size: 120,
            margin: 10,
            step: 10,
        }
    }
}

/// One window of smoothed coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageWindow<'a> {
    /// Start offset of the window.
    pub offset: usize,
    /// Plus + minus depth summed over the margin-trimmed span.
    pub summed_depth: u64,
    /// `size` bases of the window-extended sequence starting at `offset`.
    pub sequence: &'a [u8],
}

/// Derives windowed coverage from accumulated depth.
#[derive(Debug, Clone, Copy)]
pub struct CoverageWindower<'a> {
    store: &'a SequenceStore,
    depth: &'a DepthAccumulator,
}

impl<'a> CoverageWindower<'a> {
    /// Windower over a finished run.
    pub fn new(store: &'a SequenceStore, depth: &'a DepthAccumulator) -> Self {
        Self { store, depth }
    }

    /// Lazy windows over the replicon named `id`.
    ///
    /// The returned iterator is `Clone`, so it can be restarted from the
    /// beginning by cloning it before use.
    pub fn windows(
        &self,
        id: &str,
        params: WindowParams,
    ) -> Result<CoverageWindows<'a>, WindowError> {
        params.validate()?;
        let index = self
            .store
            .index_of(id)
            .ok_or_else(|| WindowError::UnknownReplicon(id.to_string()))?;
        let replicon = self
            .store
            .get(index)
            .ok_or_else(|| WindowError::UnknownReplicon(id.to_string()))?;
        let arrays = self
            .depth
            .arrays(index)
            .ok_or_else(|| WindowError::UnknownReplicon(id.to_string()))?;

        Ok(CoverageWindows {
            replicon,
            arrays,
            params,
            offset: 0,
        })
    }
}

/// Iterator over [`CoverageWindow`]s of one replicon.
#[derive(Debug, Clone)]
pub struct CoverageWindows<'a> {
    replicon: &'a Replicon,
    arrays: &'a DepthArrays,
    params: WindowParams,
    offset: usize,
}

impl<'a> Iterator for CoverageWindows<'a> {
    type Item = CoverageWindow<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let WindowParams { size, margin, step } = self.params;
        let offset = self.offset;
        let end = offset.checked_add(size)?;
        if end > self.replicon.len() {
            return None;
        }
        self.offset = offset.saturating_add(step);

        let summed_depth = (offset + margin..end - margin)
            .map(|i| self.arrays.total_at(i))
            .sum();
        let sequence = &self.replicon.window_extended_sequence()[offset..end];

        Some(CoverageWindow {
            offset,
            summed_depth,
            sequence,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let WindowParams { size, step, .. } = self.params;
        let len = self.replicon.len();
        let remaining = match self.offset.checked_add(size) {
            Some(end) if end <= len => (len - end) / step + 1,
            _ => 0,
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CoverageWindows<'_> {}
