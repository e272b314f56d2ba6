//! Attack context and the phase driver
//!
//! An attack is a small state machine. Each phase reads and writes the
//! [`AttackState`] scratch area and hands back a [`PhaseStep`]; [`resolve`]
//! walks the phases in their fixed order until one of them ends the attack,
//! then always runs the conclusion step.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::base;
use crate::Env;
use crate::actor::{ActorId, Flavour};
use crate::error::CombatError;

/// How an attack ended.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum AttackResult {
    Hit,
    #[default]
    Dodged,
    Blocked,
    /// The defender died during this attack
    Killed,
    /// The defender was already dead when the attack began
    Invalid,
}

/// Summary handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttackOutcome {
    pub result: AttackResult,
    pub damage_done: i32,
    pub special_damage: i32,
    pub did_hit: bool,
    pub reflected: bool,
    pub obvious_effect: bool,
    /// Range consumed by the projectile; `BEAM_STOP` when it stops here
    pub range_used: i32,
    /// Strikes that landed
    pub strikes: i32,
}

/// Resolution phases, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum Phase {
    Attempted,
    TargetCheck,
    ToHit,
    Evasion,
    ShieldBlock,
    Dispatch,
    Hit,
    Dodged,
    Blocked,
}

/// What a phase tells the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseStep {
    Continue(Phase),
    Terminal(AttackResult),
}

/// Scratch values threaded through the phases of one attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackState {
    pub attacker: ActorId,
    pub defender: ActorId,
    /// Who gets the credit or blame
    pub responsible: ActorId,
    pub to_hit: i32,
    /// To-hit before deflection and blockers
    pub to_hit_unhindered: i32,
    pub ev_margin: i32,
    /// Margin the attack would have had without deflection and blockers
    pub unhindered_margin: i32,
    pub shield_blocked: bool,
    pub did_hit: bool,
    pub damage_done: i32,
    pub special_damage: i32,
    pub special_damage_flavour: Flavour,
    pub special_damage_message: Option<String>,
    pub obvious_effect: bool,
    pub should_alert_defender: bool,
    /// The defender noticed it was attacked
    pub perceived_attack: bool,
    pub reflected: bool,
    /// Projectile came through a portal
    pub teleport: bool,
    pub attack_count: i32,
    pub strikes: i32,
    pub attack_verb: String,
    /// Adjacent actor spoiling the aim, named for narration
    pub blocker: Option<String>,
    /// The weapon brand moved the defender off the level or across it
    pub defender_displaced: bool,
}

impl AttackState {
    pub fn new(attacker: ActorId, defender: ActorId) -> Self {
        Self {
            attacker,
            defender,
            responsible: attacker,
            to_hit: 0,
            to_hit_unhindered: 0,
            ev_margin: 0,
            unhindered_margin: 0,
            shield_blocked: false,
            did_hit: false,
            damage_done: 0,
            special_damage: 0,
            special_damage_flavour: Flavour::Physical,
            special_damage_message: None,
            obvious_effect: false,
            should_alert_defender: true,
            perceived_attack: false,
            reflected: false,
            teleport: false,
            attack_count: 1,
            strikes: 0,
            attack_verb: String::new(),
            blocker: None,
            defender_displaced: false,
        }
    }
}

/// One method per phase. Only the attack-specific phases are required;
/// the rest share a default.
pub trait AttackPhases {
    fn state(&self) -> &AttackState;
    fn state_mut(&mut self) -> &mut AttackState;

    /// Record the engagement. Always succeeds.
    fn attempted(&mut self, env: &mut Env<'_>) -> Result<PhaseStep, CombatError> {
        let (attacker, defender) = (self.state().attacker, self.state().defender);
        base::record_engagement(env, attacker, defender)?;
        Ok(PhaseStep::Continue(Phase::TargetCheck))
    }

    fn target_check(&mut self, env: &mut Env<'_>) -> Result<PhaseStep, CombatError> {
        if !env.actor(self.state().defender)?.is_alive() {
            return Ok(PhaseStep::Terminal(AttackResult::Invalid));
        }
        Ok(PhaseStep::Continue(Phase::ToHit))
    }

    /// Final to-hit. `random` picks rolled or expected values.
    fn calc_to_hit(&mut self, env: &mut Env<'_>, random: bool) -> Result<i32, CombatError>;

    fn to_hit(&mut self, env: &mut Env<'_>) -> Result<PhaseStep, CombatError> {
        let hit = self.calc_to_hit(env, true)?;
        tracing::debug!(attacker = %self.state().attacker, to_hit = hit, "to-hit");
        self.state_mut().to_hit = hit;
        Ok(PhaseStep::Continue(Phase::Evasion))
    }

    fn evasion(&mut self, env: &mut Env<'_>) -> Result<PhaseStep, CombatError>;

    /// Whether the attack goes straight through a successful block.
    fn ignores_shield(&mut self, _env: &mut Env<'_>) -> Result<bool, CombatError> {
        Ok(false)
    }

    fn shield_block(&mut self, env: &mut Env<'_>) -> Result<PhaseStep, CombatError> {
        let st = self.state();
        let (attacker, defender, to_hit) = (st.attacker, st.defender, st.to_hit);
        let mut blocked = base::shield_block_roll(env, attacker, defender, to_hit)?;
        if blocked {
            self.state_mut().perceived_attack = true;
            if self.ignores_shield(env)? {
                blocked = false;
            }
        }
        self.state_mut().shield_blocked = blocked;
        Ok(PhaseStep::Continue(Phase::Dispatch))
    }

    fn dispatch(&mut self) -> PhaseStep {
        let st = self.state();
        let next = match (st.ev_margin >= 0, st.shield_blocked) {
            (true, false) => Phase::Hit,
            (true, true) => Phase::Blocked,
            (false, _) => Phase::Dodged,
        };
        PhaseStep::Continue(next)
    }

    /// Ends in `Hit`, or `Killed` if the defender died mid-phase.
    fn hit(&mut self, env: &mut Env<'_>) -> Result<PhaseStep, CombatError>;
    fn dodged(&mut self, env: &mut Env<'_>) -> Result<PhaseStep, CombatError>;
    fn blocked(&mut self, env: &mut Env<'_>) -> Result<PhaseStep, CombatError>;

    fn alert_defender(&mut self, env: &mut Env<'_>) -> Result<(), CombatError> {
        let st = self.state();
        base::alert_defender(env, st.attacker, st.defender)
    }

    /// Runs after every attack, whatever its result.
    fn conclude(&mut self, _env: &mut Env<'_>) -> Result<(), CombatError> {
        Ok(())
    }

    /// Death bookkeeping. Recording the same death twice is harmless.
    fn killed(&mut self, env: &mut Env<'_>) -> Result<(), CombatError> {
        let st = self.state();
        env.world.monster_died(st.defender, Some(st.responsible));
        Ok(())
    }

    fn outcome(&self, result: AttackResult) -> AttackOutcome {
        let st = self.state();
        AttackOutcome {
            result,
            damage_done: st.damage_done,
            special_damage: st.special_damage,
            did_hit: st.did_hit,
            reflected: st.reflected,
            obvious_effect: st.obvious_effect,
            range_used: 0,
            strikes: st.strikes,
        }
    }
}

/// Drive an attack from `Attempted` to its conclusion.
pub fn resolve<A>(attack: &mut A, env: &mut Env<'_>) -> Result<AttackOutcome, CombatError>
where
    A: AttackPhases + ?Sized,
{
    let mut phase = Phase::Attempted;
    let result = loop {
        tracing::trace!(%phase, "attack phase");
        let step = match phase {
            Phase::Attempted => attack.attempted(env)?,
            Phase::TargetCheck => attack.target_check(env)?,
            Phase::ToHit => attack.to_hit(env)?,
            Phase::Evasion => attack.evasion(env)?,
            Phase::ShieldBlock => attack.shield_block(env)?,
            Phase::Dispatch => attack.dispatch(),
            Phase::Hit => attack.hit(env)?,
            Phase::Dodged => attack.dodged(env)?,
            Phase::Blocked => attack.blocked(env)?,
        };
        match step {
            PhaseStep::Continue(next) => phase = next,
            PhaseStep::Terminal(result) => break result,
        }
    };

    let alert = matches!(
        result,
        AttackResult::Hit | AttackResult::Dodged | AttackResult::Blocked
    );
    if alert && attack.state().should_alert_defender {
        attack.alert_defender(env)?;
    }

    attack.conclude(env)?;

    let defender_dead = !env.actor(attack.state().defender)?.is_alive();
    let result = if defender_dead {
        attack.killed(env)?;
        if result == AttackResult::Invalid {
            result
        } else {
            AttackResult::Killed
        }
    } else {
        result
    };

    tracing::debug!(%result, damage = attack.state().damage_done, "attack resolved");
    Ok(attack.outcome(result))
}
