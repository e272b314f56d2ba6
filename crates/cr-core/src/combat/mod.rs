//! Attack resolution
//!
//! [`resolve`] drives any [`AttackPhases`] implementation through the fixed
//! phase order. [`RangedAttack`] and [`MeleeAttack`] are the two kinds of
//! attack; [`brand`] holds the effects a brand has when one lands.

mod base;
pub mod brand;
mod chaos;
mod context;
mod melee;
mod ranged;

pub use base::{hurt, test_hit};
pub use chaos::{
    ChaosEffect, immune_to_missile_brand, random_chaos_missile_brand, random_chaos_weapon_brand,
};
pub use context::{
    AttackOutcome, AttackPhases, AttackResult, AttackState, Phase, PhaseStep, resolve,
};
pub use melee::MeleeAttack;
pub use ranged::{
    RangedAttack, blocker_penalty, fire_missile, is_penetrating, range_falloff,
    ranged_attack_verb, sweet_spot_multiplier,
};

use crate::Env;
use crate::actor::ActorId;
use crate::error::CombatError;

/// Resolve one melee blow.
pub fn melee(
    env: &mut Env<'_>,
    attacker: ActorId,
    defender: ActorId,
) -> Result<AttackOutcome, CombatError> {
    let mut attack = MeleeAttack::new(env, attacker, defender)?;
    resolve(&mut attack, env)
}
