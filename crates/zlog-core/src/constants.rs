//! Constants and default values for zlog

/// Extension every stream file carries
pub const LOG_EXTENSION: &str = ".log";

/// Base path used when the configured one normalizes to nothing
pub const CURRENT_DIR: &str = ".";

/// Default log directory
pub const DEFAULT_BASE_PATH: &str = "./log";

/// Default max size of a single log file in megabytes
pub const DEFAULT_MAX_SIZE_MB: u64 = 100;

/// Default number of rotated files to keep (0 keeps all)
pub const DEFAULT_MAX_BACKUPS: usize = 0;

/// Default max age of rotated files in days (0 disables age pruning)
pub const DEFAULT_MAX_AGE_DAYS: u64 = 0;

/// Timestamp layout for text records
pub const TEXT_TIME_FORMAT: &str = "[%Y-%m-%d %H:%M:%S]";

/// Default config file names to search for (in priority order)
pub const CONFIG_FILES: &[&str] = &["zlog.toml", "zlog.yaml", "zlog.yml", "zlog.json"];
