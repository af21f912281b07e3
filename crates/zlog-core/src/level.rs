//! Level predicates deciding which records reach a sink

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::Level;

use crate::error::{Error, Result};

/// Stream name to predicate mapping supplied at initialization
pub type LevelMap = BTreeMap<String, LevelPredicate>;

/// Decides whether a record at a given level is accepted by a sink
#[derive(Clone)]
pub enum LevelPredicate {
    /// Accept exactly this level
    AtLevel(Level),
    /// Accept this level and anything more severe
    AtOrAbove(Level),
    /// Caller supplied logic
    Custom(Arc<dyn Fn(Level) -> bool + Send + Sync>),
}

impl LevelPredicate {
    pub const DEBUG: Self = Self::AtLevel(Level::DEBUG);
    pub const INFO: Self = Self::AtLevel(Level::INFO);
    pub const ERROR: Self = Self::AtLevel(Level::ERROR);

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(Level) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Check whether a record at `level` passes
    pub fn accepts(&self, level: Level) -> bool {
        match self {
            Self::AtLevel(l) => level == *l,
            // tracing orders verbose levels above severe ones
            Self::AtOrAbove(min) => level <= *min,
            Self::Custom(f) => f(level),
        }
    }
}

impl fmt::Debug for LevelPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtLevel(l) => f.debug_tuple("AtLevel").field(l).finish(),
            Self::AtOrAbove(l) => f.debug_tuple("AtOrAbove").field(l).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl fmt::Display for LevelPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtLevel(l) => write!(f, "{}", l.as_str().to_lowercase()),
            Self::AtOrAbove(l) => write!(f, "{}+", l.as_str().to_lowercase()),
            Self::Custom(_) => f.write_str("custom"),
        }
    }
}

impl FromStr for LevelPredicate {
    type Err = Error;

    /// Parse `"info"` as an exact match and `"warn+"` or `">=warn"` as a threshold
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (name, at_or_above) = if let Some(rest) = s.strip_prefix(">=") {
            (rest.trim(), true)
        } else if let Some(rest) = s.strip_suffix('+') {
            (rest.trim(), true)
        } else {
            (s, false)
        };

        let level = parse_level(name)?;
        Ok(if at_or_above {
            Self::AtOrAbove(level)
        } else {
            Self::AtLevel(level)
        })
    }
}

fn parse_level(name: &str) -> Result<Level> {
    match name.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::invalid_level(name)),
    }
}

impl<'de> Deserialize<'de> for LevelPredicate {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_predicates() {
        assert!(LevelPredicate::DEBUG.accepts(Level::DEBUG));
        assert!(!LevelPredicate::DEBUG.accepts(Level::INFO));
        assert!(LevelPredicate::INFO.accepts(Level::INFO));
        assert!(!LevelPredicate::INFO.accepts(Level::WARN));
        assert!(LevelPredicate::ERROR.accepts(Level::ERROR));
        assert!(!LevelPredicate::ERROR.accepts(Level::WARN));
    }

    #[test]
    fn test_at_or_above() {
        let p = LevelPredicate::AtOrAbove(Level::WARN);
        assert!(p.accepts(Level::WARN));
        assert!(p.accepts(Level::ERROR));
        assert!(!p.accepts(Level::INFO));
        assert!(!p.accepts(Level::TRACE));
    }

    #[test]
    fn test_custom() {
        let p = LevelPredicate::custom(|l| l == Level::TRACE || l == Level::ERROR);
        assert!(p.accepts(Level::TRACE));
        assert!(p.accepts(Level::ERROR));
        assert!(!p.accepts(Level::INFO));
        assert_eq!(format!("{:?}", p), "Custom(..)");
    }

    #[test]
    fn test_parse() {
        let p: LevelPredicate = "debug".parse().unwrap();
        assert!(matches!(p, LevelPredicate::AtLevel(l) if l == Level::DEBUG));
        let p: LevelPredicate = " INFO ".parse().unwrap();
        assert!(matches!(p, LevelPredicate::AtLevel(l) if l == Level::INFO));
        let p: LevelPredicate = "warn+".parse().unwrap();
        assert!(matches!(p, LevelPredicate::AtOrAbove(l) if l == Level::WARN));
        let p: LevelPredicate = ">= error".parse().unwrap();
        assert!(matches!(p, LevelPredicate::AtOrAbove(l) if l == Level::ERROR));
        assert!(matches!(
            "loud".parse::<LevelPredicate>(),
            Err(Error::InvalidLevel(_))
        ));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let p = LevelPredicate::AtOrAbove(Level::WARN);
        assert_eq!(p.to_string(), "warn+");
        let parsed: LevelPredicate = p.to_string().parse().unwrap();
        assert!(matches!(parsed, LevelPredicate::AtOrAbove(l) if l == Level::WARN));
        assert_eq!(LevelPredicate::custom(|_| true).to_string(), "custom");
    }
}
