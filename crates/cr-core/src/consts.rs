//! Fixed combat constants

/// To-hit sentinel that skips every later hit and evasion roll.
pub const AUTOMATIC_HIT: i32 = 1500;

/// Beyond this grid distance a ranged attack cannot hit at all.
pub const RANGED_HARD_CAP: i32 = 9;

/// Distance at which ranged damage peaks.
pub const SWEET_SPOT: i32 = 5;

/// Default line-of-sight radius.
pub const LOS_RADIUS: i32 = 7;

/// `range_used` value meaning the projectile stops here.
pub const BEAM_STOP: i32 = 1000;

/// Damage thresholds for hit punctuation.
pub const HIT_WEAK: i32 = 7;
pub const HIT_MED: i32 = 18;
pub const HIT_STRONG: i32 = 36;

/// Time units in one normal-speed turn.
pub const BASELINE_DELAY: i32 = 10;

/// Number of hostile blockers at which the penalty bottoms out.
pub const MAX_BLOCKER_PENALTY: i32 = 7;

/// Cap on weapon enchantment charged by the Thermic Engine.
pub const THERMIC_MAX_PLUS: i32 = 14;
pub const THERMIC_BASE_PLUS: i32 = 2;
