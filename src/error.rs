//! Error and outcome types
//!
//! Level construction can fail with a `LevelError`. A run never fails with a
//! Rust error: it ends in `RunState::Failed` carrying a `FailReason`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Problems building a level from geometry or authored data
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LevelError {
    /// A path needs at least a start and an end
    #[error("level geometry yields {points} waypoint(s), need at least 2")]
    InvalidLevelGeometry { points: usize },
    /// Authored level data could not be parsed
    #[error("malformed level data: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for LevelError {
    fn from(err: serde_json::Error) -> Self {
        LevelError::Malformed(err.to_string())
    }
}

/// Why a run ended in failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailReason {
    /// Turn pressed with nothing to turn at, steered while a turn was due,
    /// or the turn window ran out
    Misstep,
    /// Left the traversable region
    OutOfBounds,
    /// Touched an obstacle
    Collision,
    /// Dropped below the fall threshold
    Fall,
}

impl FailReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailReason::Misstep => "Wrong time to turn!",
            FailReason::OutOfBounds => "Exited the road",
            FailReason::Collision => "Hit an obstacle",
            FailReason::Fall => "Fell off the world",
        }
    }
}

/// A model that could not be loaded; the caller substitutes a placeholder
#[derive(Debug, Clone, PartialEq, Error)]
#[error("failed to load {model}: {reason}")]
pub struct AssetLoadFailure {
    pub model: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_error_display() {
        let err = LevelError::InvalidLevelGeometry { points: 1 };
        assert_eq!(
            err.to_string(),
            "level geometry yields 1 waypoint(s), need at least 2"
        );
    }

    #[test]
    fn test_json_error_becomes_malformed() {
        let err: LevelError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, LevelError::Malformed(_)));
    }
}
