//! cr-core: combat rules for a tile-based roguelike
//!
//! Resolves a single, already-targeted attack through a fixed sequence of
//! phases and lets unique artifacts hook into that sequence. Contains no I/O:
//! narration goes to a [`message::MessageSink`], follow-up effects are queued
//! on the [`world::World`], and every roll goes through a
//! [`cr_rng::RandomSource`].

pub mod actor;
pub mod artifact;
pub mod combat;
pub mod config;
mod consts;
mod env;
mod error;
pub mod item;
pub mod message;
pub mod world;

pub use consts::*;
pub use env::Env;
pub use error::{CombatError, ConfigError};

pub use cr_rng::{Bias, GameRng, RandomSource, RiggedRng, choose_weighted};
