//! Run configuration
//!
//! Every tunable the mapping core consumes, with the defaults the
//! command-line front end exposes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::genomics::{
    DistanceRange, StoreOptions, WindowParams, DEFAULT_CIRCULAR_MARKER, DEFAULT_WINDOW_EXTENSION,
};

/// Default k-mer seed length.
pub const DEFAULT_KMER_LEN: usize = 21;

/// Rejected configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A parameter is out of its valid domain.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Parameters for one mapping run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MappingConfig {
    /// Seed length k.
    pub kmer_len: usize,
    /// Open interval of distances credited to depth.
    pub distance_range: DistanceRange,
    /// Minimum plus+minus depth for a position to be exported.
    pub depth_threshold: u64,
    /// Id substring marking circular replicons.
    pub circular_marker: String,
    /// Bases appended to circular replicons for windowing.
    pub window_extension: usize,
    /// Coverage window geometry.
    pub window: WindowParams,
    /// Seed for tie-break selection.
    pub seed: u64,
    /// Pairs between progress log lines.
    pub progress_interval: u64,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            kmer_len: DEFAULT_KMER_LEN,
            distance_range: DistanceRange::default(),
            depth_threshold: 1,
            circular_marker: DEFAULT_CIRCULAR_MARKER.to_string(),
            window_extension: DEFAULT_WINDOW_EXTENSION,
            window: WindowParams::default(),
            seed: 0,
            progress_interval: 1_000_000,
        }
    }
}

impl MappingConfig {
    /// Override the seed length.
    pub fn with_kmer_len(mut self, kmer_len: usize) -> Self {
        self.kmer_len = kmer_len;
        self
    }

    /// Override the valid distance interval.
    pub fn with_distance_range(mut self, min: u32, max: u32) -> Self {
        self.distance_range = DistanceRange::new(min, max);
        self
    }

    /// Override the export depth threshold.
    pub fn with_depth_threshold(mut self, threshold: u64) -> Self {
        self.depth_threshold = threshold;
        self
    }

    /// Override the circular marker.
    pub fn with_circular_marker(mut self, marker: impl Into<String>) -> Self {
        self.circular_marker = marker.into();
        self
    }

    /// Override the window extension.
    pub fn with_window_extension(mut self, bases: usize) -> Self {
        self.window_extension = bases;
        self
    }

    /// Override the window geometry.
    pub fn with_window(mut self, window: WindowParams) -> Self {
        self.window = window;
        self
    }

    /// Override the tie-break seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check parameter domains.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kmer_len == 0 {
            return Err(ConfigError::Invalid("k-mer length must be > 0".to_string()));
        }
        if self.distance_range.min >= self.distance_range.max {
            return Err(ConfigError::Invalid(format!(
                "distance range ({}, {}) is empty",
                self.distance_range.min, self.distance_range.max
            )));
        }
        if self.circular_marker.is_empty() {
            return Err(ConfigError::Invalid(
                "circular marker must not be empty".to_string(),
            ));
        }
        if self.progress_interval == 0 {
            return Err(ConfigError::Invalid(
                "progress interval must be > 0".to_string(),
            ));
        }
        self.window
            .validate()
            .map_err(|err| ConfigError::Invalid(err.to_string()))
    }

    /// Sequence store options derived from this configuration.
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions::new(self.kmer_len)
            .with_circular_marker(self.circular_marker.clone())
            .with_window_extension(self.window_extension)
    }
}
