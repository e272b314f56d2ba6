//! Melee attacks
//!
//! Same phases as a ranged attack without any of the range terms. A hit
//! runs the weapon brand, then the wielded artifact's hook, then whatever
//! the defender is wearing.

use super::base::{self, hurt};
use super::brand::apply_weapon_brand;
use super::context::{AttackPhases, AttackResult, AttackState, Phase, PhaseStep};
use crate::Env;
use crate::actor::{ActorId, Flavour};
use crate::artifact::{self, HitInfo};
use crate::error::CombatError;
use crate::item::{EquipSlot, Item};
use crate::message::{apostrophise, attack_strength_punctuation, evasion_margin_adverb, uppercase_first};

/// Damage of a bare-handed player blow.
const UNARMED_DAMAGE: i32 = 3;

/// One blow from `attacker` to an adjacent `defender`.
#[derive(Debug, Clone)]
pub struct MeleeAttack {
    state: AttackState,
    weapon: Option<Item>,
}

impl MeleeAttack {
    pub fn new(env: &Env<'_>, attacker: ActorId, defender: ActorId) -> Result<Self, CombatError> {
        let weapon = env
            .actor(attacker)?
            .weapon()
            .filter(|w| !w.is_launcher())
            .cloned();
        env.actor(defender)?;
        Ok(Self {
            state: AttackState::new(attacker, defender),
            weapon,
        })
    }

    /// Credit someone else with the attack.
    pub fn blame(mut self, responsible: ActorId) -> Self {
        self.state.responsible = responsible;
        self
    }

    pub fn weapon(&self) -> Option<&Item> {
        self.weapon.as_ref()
    }

    fn calc_damage(&self, env: &mut Env<'_>) -> Result<i32, CombatError> {
        let (attacker, defender) = (self.state.attacker, self.state.defender);
        let (pot, plus) = self
            .weapon
            .as_ref()
            .map_or((None, 0), |w| (Some(w.base_damage()), w.plus));
        let raw = if attacker.is_player() {
            let player = &env.world.player;
            let pot = pot.unwrap_or(UNARMED_DAMAGE);
            base::player_damage(&mut *env.rng, player, pot, plus, Some(player.fighting_skill))
        } else {
            let mon = env
                .world
                .monster(attacker)
                .ok_or(CombatError::MissingActor(attacker))?;
            base::monster_damage(&mut *env.rng, mon, pot.unwrap_or(0), plus, false)
        };
        let def = env
            .world
            .actor(defender)
            .ok_or(CombatError::MissingActor(defender))?;
        Ok(def.apply_ac(raw, &mut *env.rng))
    }

    fn stop(&self, env: &Env<'_>) -> Result<PhaseStep, CombatError> {
        let result = if env.actor(self.state.defender)?.is_alive() {
            AttackResult::Hit
        } else {
            AttackResult::Killed
        };
        Ok(PhaseStep::Terminal(result))
    }
}

impl AttackPhases for MeleeAttack {
    fn state(&self) -> &AttackState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut AttackState {
        &mut self.state
    }

    fn calc_to_hit(&mut self, env: &mut Env<'_>, random: bool) -> Result<i32, CombatError> {
        if self.weapon.as_ref().is_some_and(Item::auto_hits) {
            return Ok(env.config.automatic_hit);
        }
        let mhit = base::base_to_hit(env, self.state.attacker, self.state.defender, true)?;
        let rounded = if random {
            env.rng.rand_round(mhit)
        } else {
            mhit.round() as i32
        };
        let hit = env.rng.maybe_random2(rounded, random);
        self.state.to_hit_unhindered = hit;
        Ok(hit.clamp(0, env.config.automatic_hit))
    }

    fn evasion(&mut self, env: &mut Env<'_>) -> Result<PhaseStep, CombatError> {
        let ev = env.actor(self.state.defender)?.evasion();
        let margin = base::test_hit(&mut *env.rng, self.state.to_hit, ev, env.config.automatic_hit);
        self.state.ev_margin = margin;
        self.state.unhindered_margin = margin;
        Ok(PhaseStep::Continue(Phase::ShieldBlock))
    }

    fn hit(&mut self, env: &mut Env<'_>) -> Result<PhaseStep, CombatError> {
        self.state.did_hit = true;
        let (attacker, defender) = (self.state.attacker, self.state.defender);

        let damage = self.calc_damage(env)?;
        self.state.damage_done = damage;
        let att = env.actor(attacker)?;
        let def_name = env.actor(defender)?.the_name();
        let text = if damage > 0 {
            format!(
                "{} {} {def_name}{}",
                uppercase_first(&att.the_name()),
                att.conj_verb("hit"),
                attack_strength_punctuation(damage)
            )
        } else {
            format!(
                "{} {} {def_name} but {} no damage.",
                uppercase_first(&att.the_name()),
                att.conj_verb("hit"),
                att.conj_verb("deal")
            )
        };
        env.say(&text);
        if damage > 0 {
            hurt(env, Some(attacker), defender, damage, Flavour::Physical)?;
            self.state.strikes = 1;
        }

        let gone = match &self.weapon {
            Some(weapon) => apply_weapon_brand(env, &mut self.state, weapon, None)?,
            None => false,
        };
        let dead = !env.actor(defender)?.is_alive();
        if gone && !dead {
            // sent away by the brand; nothing left here to hit
            return self.stop(env);
        }

        let mut hit = HitInfo {
            attacker,
            defender,
            owner: attacker,
            mondied: dead,
            damage: self.state.damage_done,
        };
        artifact::melee_effects(env, EquipSlot::Weapon, &hit)?;
        if env.actor(defender)?.is_alive() {
            hit.owner = defender;
            artifact::defender_armour_effects(env, &hit)?;
        }
        self.stop(env)
    }

    fn dodged(&mut self, env: &mut Env<'_>) -> Result<PhaseStep, CombatError> {
        let (attacker, defender) = (self.state.attacker, self.state.defender);
        self.state.did_hit = false;
        let att = env.actor(attacker)?;
        let text = format!(
            "{} {} {}{}.",
            uppercase_first(&att.the_name()),
            att.conj_verb("miss"),
            env.actor(defender)?.the_name(),
            evasion_margin_adverb(self.state.ev_margin)
        );
        env.say(&text);
        env.actor_mut(defender)?.core_mut().dodges.evasion += 1;
        Ok(PhaseStep::Terminal(AttackResult::Dodged))
    }

    fn blocked(&mut self, env: &mut Env<'_>) -> Result<PhaseStep, CombatError> {
        let def = env.actor(self.state.defender)?;
        let text = format!(
            "{} {} {} attack.",
            uppercase_first(&def.the_name()),
            def.conj_verb("block"),
            apostrophise(&env.actor(self.state.attacker)?.the_name())
        );
        env.say(&text);
        Ok(PhaseStep::Terminal(AttackResult::Blocked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Monster, Player};
    use crate::artifact::{HookRegistry, UnrandArtifact};
    use crate::combat::context::resolve;
    use crate::config::CombatConfig;
    use crate::item::{ArmourType, WeaponType};
    use crate::message::MessageLog;
    use crate::world::{Coord, World};
    use cr_rng::{Bias, RiggedRng};

    fn brawl() -> (World, ActorId) {
        let mut player = Player::new("Hero", 8, 40);
        player.core.pos = Coord::new(4, 4);
        player.strength = 14;
        player.fighting_skill = 5;
        let mut w = World::new(10, 10, player);
        let mut orc = Monster::new(ActorId::default(), "orc", 3, 200);
        orc.core.pos = Coord::new(5, 4);
        let id = w.add_monster(orc);
        (w, id)
    }

    #[test]
    fn test_hit_narrated_and_dealt() {
        let (mut w, orc) = brawl();
        w.player
            .core
            .equipment
            .put(EquipSlot::Weapon, Item::weapon(WeaponType::LongSword));
        let mut rng = RiggedRng::new(Bias::High);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let mut blow = MeleeAttack::new(&env, ActorId::PLAYER, orc).expect("actors");
        let outcome = resolve(&mut blow, &mut env).expect("resolves");

        assert_eq!(outcome.result, AttackResult::Hit);
        assert!(outcome.damage_done > 0);
        assert!(log.contains("You hit the orc ("));
        let orc = w.monster(orc).expect("orc");
        assert_eq!(orc.core.hp, 200 - outcome.damage_done);
        assert_eq!(orc.foe, Some(ActorId::PLAYER));
    }

    #[test]
    fn test_miss_counts_a_dodge() {
        let (mut w, orc) = brawl();
        if let Some(m) = w.monster_mut(orc) {
            m.core.evasion = 500;
        }
        let mut rng = RiggedRng::new(Bias::High);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let mut blow = MeleeAttack::new(&env, ActorId::PLAYER, orc).expect("actors");
        let outcome = resolve(&mut blow, &mut env).expect("resolves");

        assert_eq!(outcome.result, AttackResult::Dodged);
        assert!(log.contains("You miss the orc completely."));
        assert_eq!(w.monster(orc).expect("orc").core.dodges.evasion, 1);
    }

    #[test]
    fn test_shield_block_narration() {
        let (mut w, orc) = brawl();
        if let Some(m) = w.monster_mut(orc) {
            m.core
                .equipment
                .put(EquipSlot::Offhand, Item::armour(ArmourType::TowerShield).with_plus(20));
        }
        let mut rng = RiggedRng::new(Bias::High);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let mut blow = MeleeAttack::new(&env, ActorId::PLAYER, orc).expect("actors");
        let outcome = resolve(&mut blow, &mut env).expect("resolves");

        assert_eq!(outcome.result, AttackResult::Blocked);
        assert!(log.contains("The orc blocks your attack."));
    }

    #[test]
    fn test_woe_never_misses() {
        let (mut w, orc) = brawl();
        w.player
            .core
            .equipment
            .put(EquipSlot::Weapon, Item::unrand(UnrandArtifact::Woe));
        if let Some(m) = w.monster_mut(orc) {
            m.core.evasion = 5000;
        }
        let mut rng = RiggedRng::new(Bias::Low);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::standard();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let mut blow = MeleeAttack::new(&env, ActorId::PLAYER, orc).expect("actors");
        assert_eq!(blow.calc_to_hit(&mut env, true), Ok(config.automatic_hit));
        let outcome = resolve(&mut blow, &mut env).expect("resolves");

        assert_eq!(outcome.result, AttackResult::Killed);
        assert_eq!(w.deaths.len(), 1);
    }

    #[test]
    fn test_monster_hits_player() {
        let (mut w, orc) = brawl();
        if let Some(m) = w.monster_mut(orc) {
            m.attack_damage = 6;
        }
        let mut rng = RiggedRng::new(Bias::High);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let mut blow = MeleeAttack::new(&env, orc, ActorId::PLAYER).expect("actors");
        let outcome = resolve(&mut blow, &mut env).expect("resolves");

        assert_eq!(outcome.result, AttackResult::Hit);
        assert!(log.contains("The orc hits you"));
        assert_eq!(w.player.core.hp, 40 - outcome.damage_done);
    }
}
