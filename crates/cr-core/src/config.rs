//! Combat tunables
//!
//! Read from an rc-style file:
//!
//! ```text
//! # comments and blank lines are skipped
//! OPTIONS=erratic_gate:4,chaos_escape:3
//! OPTIONS=ricochet_chance:3
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::{AUTOMATIC_HIT, LOS_RADIUS, RANGED_HARD_CAP, SWEET_SPOT};

/// Tunable constants used during attack resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// To-hit value treated as a guaranteed hit
    pub automatic_hit: i32,
    /// Distance past which ranged to-hit is zero
    pub ranged_hard_cap: i32,
    /// Distance of peak ranged damage
    pub sweet_spot: i32,
    /// Erratic defenders ignore a shot not aimed at them unless this
    /// `1 in N` roll passes
    pub erratic_gate: i32,
    /// Chaos missiles accept an immune brand anyway `1 in N` of the time
    pub chaos_escape: i32,
    /// Sling bullets ricochet `1 in N` of the time after a hit
    pub ricochet_chance: i32,
    /// Search radius for a ricochet target, also its travel range
    pub ricochet_radius: i32,
    /// Sight radius; bolts continue for what is left of it
    pub vision_radius: i32,
    /// Radius searched for dispersal landing squares
    pub blink_radius: i32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            automatic_hit: AUTOMATIC_HIT,
            ranged_hard_cap: RANGED_HARD_CAP,
            sweet_spot: SWEET_SPOT,
            erratic_gate: 4,
            chaos_escape: 3,
            ricochet_chance: 3,
            ricochet_radius: 3,
            vision_radius: LOS_RADIUS,
            blink_radius: LOS_RADIUS,
        }
    }
}

impl CombatConfig {
    /// Load from an rc file on disk.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_config(&contents)
    }

    /// Parse `OPTIONS=` lines; anything else that isn't a comment is ignored.
    pub fn parse_config(contents: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for (idx, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(opts) = line.strip_prefix("OPTIONS=") {
                for opt in opts.split(',').map(str::trim).filter(|o| !o.is_empty()) {
                    config.parse_option(idx + 1, opt)?;
                }
            }
        }

        tracing::debug!(?config, "combat config parsed");
        Ok(config)
    }

    fn parse_option(&mut self, line: usize, opt: &str) -> Result<(), ConfigError> {
        let Some((key, value)) = opt.split_once(':').or_else(|| opt.split_once('=')) else {
            return Err(ConfigError::Syntax {
                line,
                text: opt.to_string(),
            });
        };
        let (key, value) = (key.trim(), value.trim());

        let slot = match key {
            "automatic_hit" => &mut self.automatic_hit,
            "ranged_hard_cap" => &mut self.ranged_hard_cap,
            "sweet_spot" => &mut self.sweet_spot,
            "erratic_gate" => &mut self.erratic_gate,
            "chaos_escape" => &mut self.chaos_escape,
            "ricochet_chance" => &mut self.ricochet_chance,
            "ricochet_radius" => &mut self.ricochet_radius,
            "vision_radius" => &mut self.vision_radius,
            "blink_radius" => &mut self.blink_radius,
            _ => {
                return Err(ConfigError::UnknownKey {
                    line,
                    key: key.to_string(),
                });
            }
        };

        let bad_value = || ConfigError::BadValue {
            line,
            key: key.to_string(),
            value: value.to_string(),
        };
        let parsed: i32 = value.parse().map_err(|_| bad_value())?;
        // every tunable is a count, distance or `1 in N` denominator
        if parsed < 1 {
            return Err(bad_value());
        }
        *slot = parsed;
        Ok(())
    }
}
