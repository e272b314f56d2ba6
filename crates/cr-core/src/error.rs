//! Error types
//!
//! Gameplay failures (misses, blocks, resisted brands) are ordinary outcomes
//! and never show up here. These errors are invariant violations and
//! configuration problems.

use thiserror::Error;

use crate::actor::ActorId;

/// Broken invariant inside attack resolution.
///
/// Debug builds assert before returning one of these. The attack that hit
/// it stops where it is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("no actor with handle {0}")]
    MissingActor(ActorId),

    #[error("missile brand resolution on a non-missile item ({0})")]
    NotAMissile(String),
}

/// Problem reading a combat configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("line {line}: expected KEY=value, got {text:?}")]
    Syntax { line: usize, text: String },

    #[error("line {line}: unknown option {key:?}")]
    UnknownKey { line: usize, key: String },

    #[error("line {line}: bad value {value:?} for {key}")]
    BadValue { line: usize, key: String, value: String },

    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
}

/// Assert in debug builds, return the error in release builds.
macro_rules! invariant {
    ($cond:expr, $err:expr) => {
        if !$cond {
            let err = $err;
            debug_assert!(false, "{}", err);
            tracing::error!(%err, "combat invariant violated");
            return Err(err);
        }
    };
}

pub(crate) use invariant;
