//! Pieces shared by ranged and melee attacks

use crate::Env;
use crate::actor::{Actor, ActorId, Flavour, Monster, Player};
use crate::error::CombatError;
use crate::world::Conduct;
use cr_rng::RandomSource;

/// Deal damage and record the death if it kills. Returns damage taken.
pub fn hurt(
    env: &mut Env<'_>,
    source: Option<ActorId>,
    victim: ActorId,
    amount: i32,
    flavour: Flavour,
) -> Result<i32, CombatError> {
    let actor = env.actor_mut(victim)?;
    let taken = actor.apply_damage(amount, source, flavour);
    if taken > 0 && !actor.is_alive() {
        env.world.monster_died(victim, source);
    }
    Ok(taken)
}

/// Attack bookkeeping for retaliation and conduct.
pub(crate) fn record_engagement(
    env: &mut Env<'_>,
    attacker: ActorId,
    defender: ActorId,
) -> Result<(), CombatError> {
    env.actor_mut(attacker)?.core_mut().last_target = Some(defender);
    if attacker != defender {
        env.world.conducts.push(Conduct::Attacked {
            by: attacker,
            target: defender,
        });
    }
    Ok(())
}

/// Accuracy before range, deflection and crowding are considered.
pub(crate) fn base_to_hit(
    env: &Env<'_>,
    attacker: ActorId,
    defender: ActorId,
    melee: bool,
) -> Result<f64, CombatError> {
    let att = env.actor(attacker)?;
    let def = env.actor(defender)?;
    let mut mhit = match att.as_monster() {
        Some(mon) => mon.base_to_hit(!melee),
        None => env.world.player.base_to_hit(melee),
    };
    if att.confused() {
        mhit *= 0.7;
    }
    if !def.visible_to(att) {
        mhit *= 0.5;
    }
    Ok(mhit)
}

/// Margin of `to_land` over a random share of `ev`. Non-negative hits.
///
/// The evasion roll is made even for an automatic hit so the number of
/// rolls does not depend on the attacker's gear. An attack with no to-hit
/// left never lands.
pub fn test_hit(rng: &mut dyn RandomSource, to_land: i32, ev: i32, automatic_hit: i32) -> i32 {
    let roll = rng.random2(ev);
    if to_land >= automatic_hit {
        return to_land;
    }
    if to_land <= 0 {
        return (to_land - roll).min(-1);
    }
    to_land - roll
}

/// Roll the defender's shield against the attack.
pub(crate) fn shield_block_roll(
    env: &mut Env<'_>,
    attacker: ActorId,
    defender: ActorId,
    to_hit: i32,
) -> Result<bool, CombatError> {
    if attacker == defender || to_hit <= 0 {
        return Ok(false);
    }
    let def = env.actor(defender)?;
    if def.incapacitated() || def.shield().is_none() {
        return Ok(false);
    }
    let att = env.actor(attacker)?;
    let con_range = att.shield_bypass_ability(to_hit) + def.shield_block_penalty();
    let mut pro = def.shield_bonus();
    if !att.visible_to(def) {
        pro /= 3;
    }

    let con = env.rng.random2(con_range);
    tracing::debug!(%defender, pro, con, "shield roll");
    Ok(pro >= con)
}

/// Wake a monster defender and point it at the attacker.
pub(crate) fn alert_defender(
    env: &mut Env<'_>,
    attacker: ActorId,
    defender: ActorId,
) -> Result<(), CombatError> {
    if attacker == defender || !env.actor(attacker)?.is_alive() {
        return Ok(());
    }
    let foe = match env.world.monster(defender) {
        Some(m) if m.core.hp > 0 => m.foe,
        _ => return Ok(()),
    };
    // monsters only sometimes switch away from a foe they already have
    if attacker.is_player() || foe.is_none() || env.rng.one_in(3) {
        if let Some(m) = env.world.monster_mut(defender) {
            m.alert(attacker);
        }
    }
    Ok(())
}

/// Hostile from `viewer`'s point of view.
pub(crate) fn hostile_to(viewer: &dyn Actor, other: &Monster) -> bool {
    if viewer.is_player() {
        !other.friendly()
    } else {
        other.core.attitude != viewer.attitude()
    }
}

/// Add or subtract a random share of an enchantment.
pub(crate) fn roll_plus(rng: &mut dyn RandomSource, pot: i32, plus: i32) -> i32 {
    if plus >= 0 {
        pot + rng.random2(plus)
    } else {
        pot - rng.random2(-plus)
    }
}

/// Raw player damage from a weapon or thrown object of strength `pot`.
pub(crate) fn player_damage(
    rng: &mut dyn RandomSource,
    player: &Player,
    pot: i32,
    plus: i32,
    weapon_skill: Option<i32>,
) -> i32 {
    let rand_str = player.strength / 2 + rng.random2(player.strength);
    let mut pot = pot * (75 + 5 * rand_str / 2).max(1) / 100;
    if let Some(skill) = weapon_skill {
        pot = pot * (2500 + rng.random2(skill * 100 + 1)) / 2500;
    }
    pot = pot * (3000 + rng.random2(player.fighting_skill * 100 + 1)) / 3000;
    if plus >= 0 {
        pot += rng.random2(1 + plus);
    } else {
        pot -= rng.random2(1 - plus);
    }
    rng.random2avg(pot.max(0) + 1, 3)
}

/// Raw monster damage from a weapon or projectile of strength `pot`.
pub(crate) fn monster_damage(
    rng: &mut dyn RandomSource,
    monster: &Monster,
    pot: i32,
    plus: i32,
    ranged: bool,
) -> i32 {
    let mut pot = roll_plus(rng, pot, plus);
    pot -= 1 + rng.random2(3);
    pot += monster.attack_damage;
    if ranged && monster.is_archer() {
        pot += rng.random2avg(monster.core.hit_dice * 4 / 3, 2);
    }
    1 + rng.random2avg(pot.max(0) + 1, 3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Attitude, StatusKind};
    use crate::artifact::HookRegistry;
    use crate::config::CombatConfig;
    use crate::item::{ArmourType, EquipSlot, Item};
    use crate::message::MessageLog;
    use crate::world::{Coord, World};
    use cr_rng::{Bias, RiggedRng};

    fn world() -> (World, ActorId) {
        let mut w = World::new(10, 10, Player::new("Hero", 5, 30));
        let mut orc = Monster::new(ActorId::default(), "orc", 3, 15);
        orc.core.pos = Coord::new(3, 3);
        let id = w.add_monster(orc);
        (w, id)
    }

    #[test]
    fn test_test_hit_margin() {
        let mut rng = RiggedRng::with_script(Bias::Low, &[4]);
        assert_eq!(test_hit(&mut rng, 10, 8, 1500), 6);
        // roll still consumed on an automatic hit
        let mut rng = RiggedRng::new(Bias::High);
        assert!(test_hit(&mut rng, 1500, 5000, 1500) >= 0);
        assert_eq!(rng.calls(), 1);
        let mut rng = RiggedRng::new(Bias::Low);
        assert_eq!(test_hit(&mut rng, 0, 10, 1500), -1);
    }

    #[test]
    fn test_hurt_records_death_once() {
        let (mut w, orc) = world();
        let mut rng = RiggedRng::new(Bias::Low);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        assert_eq!(hurt(&mut env, None, orc, 5, Flavour::Fire), Ok(5));
        hurt(&mut env, Some(ActorId::PLAYER), orc, 50, Flavour::Physical).ok();
        assert_eq!(hurt(&mut env, None, orc, 5, Flavour::Physical), Ok(0));
        assert_eq!(w.deaths.len(), 1);
        assert_eq!(w.deaths[0].killer, Some(ActorId::PLAYER));
    }

    #[test]
    fn test_no_block_without_shield() {
        let (mut w, orc) = world();
        let mut rng = RiggedRng::new(Bias::Low);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        assert_eq!(shield_block_roll(&mut env, ActorId::PLAYER, orc, 20), Ok(false));

        if let Some(m) = env.world.monster_mut(orc) {
            m.core
                .equipment
                .put(EquipSlot::Offhand, Item::armour(ArmourType::TowerShield));
        }
        assert_eq!(shield_block_roll(&mut env, ActorId::PLAYER, orc, 20), Ok(true));
        assert_eq!(shield_block_roll(&mut env, ActorId::PLAYER, orc, 0), Ok(false));

        if let Some(m) = env.world.monster_mut(orc) {
            m.core.status.set(StatusKind::Sleep, 5);
        }
        assert_eq!(shield_block_roll(&mut env, ActorId::PLAYER, orc, 20), Ok(false));
    }

    #[test]
    fn test_alert_targets_attacker() {
        let (mut w, orc) = world();
        let mut rng = RiggedRng::new(Bias::High);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        alert_defender(&mut env, ActorId::PLAYER, orc).ok();
        assert_eq!(w.monster(orc).and_then(|m| m.foe), Some(ActorId::PLAYER));
    }

    #[test]
    fn test_hostility() {
        let p = Player::new("Hero", 1, 10);
        let mut m = Monster::new(ActorId(2), "orc", 1, 5);
        assert!(hostile_to(&p, &m));
        m.core.attitude = Attitude::Friendly;
        assert!(!hostile_to(&p, &m));
        let other = Monster::new(ActorId(3), "gnoll", 1, 5);
        assert!(hostile_to(&other, &m));
    }

    #[test]
    fn test_monster_damage_floor() {
        let m = Monster::new(ActorId(2), "rat", 1, 3);
        let mut rng = RiggedRng::new(Bias::Low);
        // always at least one point
        assert_eq!(monster_damage(&mut rng, &m, 0, 0, true), 1);
    }
}
