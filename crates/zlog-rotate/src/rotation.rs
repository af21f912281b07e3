//! Log rotation configuration

use std::time::Duration;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Log rotation configuration. A zero limit disables that limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationConfig {
    /// Maximum log file size in bytes
    pub max_size_bytes: u64,
    /// Maximum number of rotated files to keep
    pub max_backups: usize,
    /// Maximum age of a rotated file
    pub max_age: Duration,
    /// Gzip rotated files
    pub compress: bool,
}

impl RotationConfig {
    pub fn new(max_size_bytes: u64, max_backups: usize) -> Self {
        Self {
            max_size_bytes,
            max_backups,
            ..Self::default()
        }
    }

    pub fn with_max_age_days(mut self, days: u64) -> Self {
        self.max_age = DAY.saturating_mul(days.min(u32::MAX as u64) as u32);
        self
    }

    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Whether appending `incoming` bytes to a file of `current` bytes needs a rotation first
    pub(crate) fn exceeds(&self, current: u64, incoming: u64) -> bool {
        self.max_size_bytes > 0 && current > 0 && current + incoming > self.max_size_bytes
    }
}
