//! zlog - Multi-destination logging with rotating file sinks
//!
//! A [`LoggerCore`] turns a map of stream names to level predicates into one
//! [`Logger`]. Each stream gets its own rotating file under the configured base
//! path, and a console sink accepting exactly `INFO` is always added.
//!
//! ```no_run
//! use zlog::{LevelMap, LevelPredicate, LoggerConfig, LoggerCore};
//!
//! let core = LoggerCore::new(LoggerConfig::new("./log", 256, 10, 7, false));
//! let mut streams = LevelMap::new();
//! streams.insert("debug".to_string(), LevelPredicate::DEBUG);
//! streams.insert("error".to_string(), LevelPredicate::ERROR);
//!
//! let logger = core.initialize(&streams);
//! logger.info("hello");
//! ```

mod logger;
mod sink;

pub use logger::{Logger, LoggerCore};
pub use sink::{BoxedLayer, Destination, Sink, SinkBuilder, SinkInfo};
pub use zlog_core::{
    resolve_log_path, ConfigFormat, ConsoleTarget, Error, LevelMap, LevelPredicate, LogFormat,
    LoggerConfig, Result,
};
pub use zlog_rotate::{BackupFile, RotatingWriter, RotationConfig};
