//! zlog Core - Shared configuration, level predicates, path rules, and errors

pub mod config;
pub mod constants;
pub mod error;
pub mod level;
pub mod path;

pub use config::*;
pub use error::{Error, Result};
pub use level::{LevelMap, LevelPredicate};
pub use path::resolve_log_path;
