//! Chaos: random brands and random effects

use strum::{Display, EnumIter};

use super::context::AttackState;
use crate::Env;
use crate::actor::{Actor, ActorId, ActorTraits, Holiness, StatusKind};
use crate::error::CombatError;
use crate::item::{MissileBrand, WeaponBrand};
use crate::message::uppercase_first;
use crate::world::{SpellKind, WorldEffect};
use cr_rng::choose_weighted;

const CHAOS_MISSILE_BRANDS: [(MissileBrand, i32); 10] = [
    (MissileBrand::Flame, 10),
    (MissileBrand::Frost, 10),
    (MissileBrand::Poisoned, 10),
    (MissileBrand::Chaos, 10),
    (MissileBrand::Petrification, 5),
    (MissileBrand::Sleep, 5),
    (MissileBrand::Frenzy, 5),
    (MissileBrand::Curare, 2),
    (MissileBrand::Confusion, 2),
    (MissileBrand::Dispersal, 2),
];

/// A rigged source can reject forever; give up and stay chaotic.
const MAX_CHAOS_REROLLS: usize = 1000;

/// Whether `defender` shrugs off `brand` outright.
pub fn immune_to_missile_brand(defender: &dyn Actor, brand: MissileBrand) -> bool {
    let unliving = defender
        .holiness()
        .intersects(Holiness::UNDEAD | Holiness::NONLIVING);
    match brand {
        MissileBrand::Flame => defender.is_fiery(),
        MissileBrand::Frost => defender.is_icy(),
        MissileBrand::Poisoned => defender.holiness().contains(Holiness::UNDEAD),
        MissileBrand::Dispersal => defender.no_tele(),
        MissileBrand::Confusion => unliving || defender.holiness().contains(Holiness::PLANT),
        MissileBrand::Sleep | MissileBrand::Petrification => unliving,
        MissileBrand::Frenzy => unliving || !defender.can_go_berserk(),
        _ => false,
    }
}

/// Roll a concrete missile brand for a chaos projectile.
///
/// Brands the defender is immune to are rerolled, except that each draw
/// is kept regardless `1 in chaos_escape` of the time.
pub fn random_chaos_missile_brand(
    env: &mut Env<'_>,
    defender: ActorId,
) -> Result<MissileBrand, CombatError> {
    let escape = env.config.chaos_escape;
    for _ in 0..MAX_CHAOS_REROLLS {
        let Some(brand) = choose_weighted(&mut *env.rng, &CHAOS_MISSILE_BRANDS) else {
            break;
        };
        if env.rng.one_in(escape) {
            tracing::debug!(%brand, "chaos brand (escape)");
            return Ok(brand);
        }
        if !immune_to_missile_brand(env.actor(defender)?, brand) {
            tracing::debug!(%brand, "chaos brand");
            return Ok(brand);
        }
    }
    Ok(MissileBrand::Chaos)
}

/// Roll a concrete weapon brand for a chaos weapon, skipping brands that
/// could do nothing to this defender.
pub fn random_chaos_weapon_brand(
    env: &mut Env<'_>,
    attacker: ActorId,
    defender: ActorId,
) -> Result<WeaponBrand, CombatError> {
    let def = env.actor(defender)?;
    let holiness = def.holiness();
    let natural = holiness.contains(Holiness::NATURAL);
    let unliving = holiness.intersects(Holiness::UNDEAD | Holiness::NONLIVING);
    let player_mp = defender.is_player() && env.world.player.max_magic_points > 0;
    let gate = |ok: bool, weight: i32| if ok { weight } else { 0 };

    let table = [
        (WeaponBrand::Flaming, gate(!def.is_fiery(), 10)),
        (WeaponBrand::Freezing, gate(!def.is_icy(), 10)),
        (WeaponBrand::Electrocution, 10),
        (WeaponBrand::Venom, gate(!unliving, 10)),
        (WeaponBrand::Chaos, 10),
        (WeaponBrand::Draining, gate(natural, 5)),
        (
            WeaponBrand::Vampirism,
            gate(natural && !def.traits().contains(ActorTraits::SUMMONED), 5),
        ),
        (WeaponBrand::HolyWrath, gate(def.holy_wrath_susceptible(), 5)),
        (WeaponBrand::Antimagic, gate(player_mp, 5)),
        (WeaponBrand::Confuse, gate(!holiness.contains(Holiness::PLANT), 2)),
        (WeaponBrand::Distortion, 2),
    ];
    let brand = choose_weighted(&mut *env.rng, &table).unwrap_or(WeaponBrand::Chaos);
    tracing::debug!(%attacker, %brand, "chaos weapon brand");
    Ok(brand)
}

/// Things chaos can do to whoever it touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ChaosEffect {
    Clone,
    Polymorph,
    Shifter,
    Miscast,
    Rage,
    Hasting,
    Invisible,
    Mighting,
    Agility,
    EntropicBurst,
    ChaoticInfusion,
    Slowing,
    Petrify,
}

impl ChaosEffect {
    const fn weight(self) -> i32 {
        match self {
            ChaosEffect::Clone | ChaosEffect::Shifter => 1,
            ChaosEffect::Polymorph => 2,
            ChaosEffect::Miscast => 20,
            ChaosEffect::Rage => 5,
            ChaosEffect::Hasting
            | ChaosEffect::Invisible
            | ChaosEffect::Mighting
            | ChaosEffect::Agility
            | ChaosEffect::Slowing
            | ChaosEffect::Petrify => 10,
            ChaosEffect::EntropicBurst | ChaosEffect::ChaoticInfusion => 30,
        }
    }

    /// Whether the effect can do anything to `defender`.
    pub fn valid_for(self, defender: &dyn Actor) -> bool {
        let traits = defender.traits();
        let holiness = defender.holiness();
        let firewood = traits.contains(ActorTraits::FIREWOOD);
        let slowable = !firewood
            && !traits.intersects(ActorTraits::STATIONARY | ActorTraits::STASIS);
        match self {
            ChaosEffect::Clone | ChaosEffect::EntropicBurst | ChaosEffect::ChaoticInfusion => {
                defender.is_monster()
            }
            ChaosEffect::Polymorph => {
                !holiness.intersects(Holiness::UNDEAD | Holiness::NONLIVING) && !firewood
            }
            ChaosEffect::Shifter => defender.is_monster() && holiness.contains(Holiness::NATURAL),
            ChaosEffect::Miscast => true,
            ChaosEffect::Rage => defender.can_go_berserk(),
            ChaosEffect::Hasting => slowable && !defender.has_status(StatusKind::Haste),
            ChaosEffect::Invisible => !defender.is_invisible(),
            ChaosEffect::Mighting => !defender.has_status(StatusKind::Might),
            ChaosEffect::Agility => !defender.has_status(StatusKind::Agility),
            ChaosEffect::Slowing => slowable && !defender.has_status(StatusKind::Slow),
            ChaosEffect::Petrify => {
                slowable
                    && !defender.has_status(StatusKind::Petrified)
                    && !defender.has_status(StatusKind::Petrifying)
            }
        }
    }
}

/// Pick and apply one random chaos effect to the defender.
pub fn chaos_affects_defender(
    env: &mut Env<'_>,
    state: &mut AttackState,
) -> Result<(), CombatError> {
    use strum::IntoEnumIterator;

    let (attacker, defender) = (state.attacker, state.defender);
    let def = env.actor(defender)?;
    let table: Vec<(ChaosEffect, i32)> = ChaosEffect::iter()
        .map(|e| (e, if e.valid_for(def) { e.weight() } else { 0 }))
        .collect();
    let subject = uppercase_first(&def.the_name());
    let seem = def.conj_verb("seem");
    let pos = def.position();

    let Some(effect) = choose_weighted(&mut *env.rng, &table) else {
        return Ok(());
    };
    let power = state.damage_done + state.special_damage;
    tracing::debug!(%effect, power, "chaos effect");

    let duration = 10 + env.rng.random2(10 + power);
    let status = match effect {
        ChaosEffect::Hasting => Some((StatusKind::Haste, format!("{subject} {seem} to speed up."))),
        ChaosEffect::Invisible => Some((
            StatusKind::Invisible,
            format!("{subject} {seem} to flicker out of sight."),
        )),
        ChaosEffect::Mighting => Some((StatusKind::Might, format!("{subject} {seem} to grow stronger."))),
        ChaosEffect::Agility => Some((StatusKind::Agility, format!("{subject} {seem} more agile."))),
        ChaosEffect::Slowing => Some((StatusKind::Slow, format!("{subject} {seem} to slow down."))),
        _ => None,
    };
    if let Some((kind, text)) = status {
        let took = env
            .actor_mut(defender)?
            .core_mut()
            .status
            .increase(kind, duration, 100);
        if took {
            env.say(&text);
            state.obvious_effect = true;
        }
        return Ok(());
    }

    match effect {
        ChaosEffect::Clone => {
            env.world.place_effect(WorldEffect::Clone { original: defender });
            state.obvious_effect = true;
        }
        ChaosEffect::Polymorph | ChaosEffect::Shifter => {
            env.world.place_effect(WorldEffect::Polymorph { target: defender });
            state.obvious_effect = true;
        }
        ChaosEffect::Miscast => {
            let hd = env.actor(attacker)?.hit_dice();
            let levels = [(0, hd), (1, hd - 7), (2, hd - 12), (3, hd - 17)];
            let level = choose_weighted(&mut *env.rng, &levels).unwrap_or(0);
            env.world.place_effect(WorldEffect::Miscast {
                agent: attacker,
                target: defender,
                level,
            });
        }
        ChaosEffect::Rage => {
            let go = env.actor(defender)?.conj_verb("go");
            if env.actor_mut(defender)?.go_berserk() {
                env.say(&format!("{subject} {go} berserk!"));
                state.obvious_effect = true;
            }
        }
        ChaosEffect::Petrify => {
            if env.actor_mut(defender)?.petrify() {
                env.say(&format!("{subject} {seem} to be turning to stone."));
                state.obvious_effect = true;
            }
        }
        ChaosEffect::EntropicBurst | ChaosEffect::ChaoticInfusion => {
            let spell = if effect == ChaosEffect::EntropicBurst {
                SpellKind::EntropicBurst
            } else {
                SpellKind::ChaoticInfusion
            };
            env.world.place_effect(WorldEffect::Spell {
                caster: attacker,
                spell,
                power,
                target: Some(pos),
            });
            state.obvious_effect = true;
        }
        ChaosEffect::Hasting
        | ChaosEffect::Invisible
        | ChaosEffect::Mighting
        | ChaosEffect::Agility
        | ChaosEffect::Slowing => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Monster, Player};
    use crate::artifact::HookRegistry;
    use crate::config::CombatConfig;
    use crate::message::MessageLog;
    use crate::world::World;
    use cr_rng::{Bias, GameRng, RiggedRng};

    fn undead() -> Monster {
        let mut m = Monster::new(ActorId(1), "ghoul", 6, 30);
        m.core.holiness = Holiness::UNDEAD;
        m
    }

    #[test]
    fn test_immunities() {
        let z = undead();
        assert!(immune_to_missile_brand(&z, MissileBrand::Poisoned));
        assert!(immune_to_missile_brand(&z, MissileBrand::Sleep));
        assert!(immune_to_missile_brand(&z, MissileBrand::Frenzy));
        assert!(!immune_to_missile_brand(&z, MissileBrand::Flame));
        assert!(!immune_to_missile_brand(&z, MissileBrand::Chaos));
    }

    #[test]
    fn test_effect_validity() {
        let z = undead();
        assert!(!ChaosEffect::Polymorph.valid_for(&z));
        assert!(!ChaosEffect::Rage.valid_for(&z));
        assert!(ChaosEffect::Miscast.valid_for(&z));
        let p = Player::new("Hero", 3, 20);
        assert!(!ChaosEffect::Clone.valid_for(&p));
        assert!(!ChaosEffect::EntropicBurst.valid_for(&p));
        let mut tree = Monster::new(ActorId(2), "tree", 1, 30);
        tree.core.traits |= ActorTraits::FIREWOOD | ActorTraits::STATIONARY;
        assert!(!ChaosEffect::Slowing.valid_for(&tree));
        assert!(!ChaosEffect::Hasting.valid_for(&tree));
    }

    #[test]
    fn test_escape_hatch_keeps_first_draw() {
        let mut w = World::new(10, 10, Player::new("Hero", 3, 20));
        let id = w.add_monster(undead());
        // poisoned is the third band of the table; escape roll passes
        let mut rng = RiggedRng::with_script(Bias::Low, &[25, 0]);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        assert_eq!(random_chaos_missile_brand(&mut env, id), Ok(MissileBrand::Poisoned));
    }

    #[test]
    fn test_immune_draw_rerolled() {
        let mut w = World::new(10, 10, Player::new("Hero", 3, 20));
        let id = w.add_monster(undead());
        // poisoned, escape fails, then flame
        let mut rng = RiggedRng::with_script(Bias::Low, &[25, 1, 0]);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        assert_eq!(random_chaos_missile_brand(&mut env, id), Ok(MissileBrand::Flame));
    }

    #[test]
    fn test_chaos_weapon_skips_invalid() {
        let mut w = World::new(10, 10, Player::new("Hero", 3, 20));
        let mut m = undead();
        m.core.traits |= ActorTraits::FIERY;
        let id = w.add_monster(m);
        let mut rng = GameRng::new(7);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        for _ in 0..500 {
            let brand = random_chaos_weapon_brand(&mut env, ActorId::PLAYER, id);
            assert!(!matches!(
                brand,
                Ok(WeaponBrand::Flaming | WeaponBrand::Venom | WeaponBrand::Draining)
            ));
        }
    }

    #[test]
    fn test_chaos_effect_queues_or_applies() {
        let mut w = World::new(10, 10, Player::new("Hero", 3, 20));
        let id = w.add_monster(Monster::new(ActorId::default(), "orc", 4, 20));
        let mut rng = GameRng::new(11);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let mut state = AttackState::new(ActorId::PLAYER, id);
        state.damage_done = 5;
        for _ in 0..50 {
            chaos_affects_defender(&mut env, &mut state).ok();
        }
        // every effect either queues follow-up work or touches the defender
        assert!(!w.pending_effects().is_empty() || !log.is_empty());
    }
}
