//! Brand and status effects applied on a hit
//!
//! Every function here works on the [`AttackState`] of the attack that
//! landed: it may add special damage, set the special damage message, and
//! mark the effect as obvious. Damage is only dealt at the end of
//! [`apply_missile_brand`] and [`apply_weapon_brand`], after narration.

use super::base::hurt;
use super::chaos::{chaos_affects_defender, random_chaos_missile_brand, random_chaos_weapon_brand};
use super::context::AttackState;
use crate::Env;
use crate::actor::{Actor, ActorId, ActorTraits, Flavour, Holiness, StatusKind};
use crate::error::{CombatError, invariant};
use crate::item::{Item, MissileBrand, MissileType, WeaponBrand};
use crate::message::{attack_strength_punctuation, uppercase_first};
use crate::world::{Coord, WorldEffect};
use cr_rng::choose_weighted;

/// Scale `damage` by the defender's resistance to `flavour`.
pub fn resist_adjust_damage(defender: &dyn Actor, flavour: Flavour, damage: i32) -> i32 {
    match defender.resist(flavour) {
        res if res >= 3 => 0,
        2 => damage / 3,
        1 => damage / 2,
        0 => damage,
        _ => damage * 3 / 2,
    }
}

/// Extra damage silver does to the unholy and the mutable.
pub fn silver_damages_victim(defender: &dyn Actor, damage: i32) -> (i32, Option<String>) {
    let holiness = defender.holiness();
    let amount = if holiness.intersects(Holiness::UNDEAD | Holiness::DEMONIC) {
        damage
    } else if defender.traits().contains(ActorTraits::CHAOTIC)
        && holiness.contains(Holiness::NATURAL)
    {
        damage * 3 / 4
    } else {
        return (0, None);
    };
    if amount <= 0 {
        return (0, None);
    }
    let msg = format!(
        "{} {} in agony!",
        uppercase_first(&defender.the_name()),
        defender.conj_verb("writhe")
    );
    (amount, Some(msg))
}

/// Poison and slow a breathing victim. Returns true if either took hold.
pub fn curare_actor(
    env: &mut Env<'_>,
    source: Option<ActorId>,
    victim: ActorId,
    levels: i32,
    name: &str,
) -> Result<bool, CombatError> {
    let target = env.actor(victim)?;
    if !target.is_alive() || target.is_unbreathing() {
        return Ok(false);
    }
    let text = if target.is_player() {
        "You have difficulty breathing.".to_string()
    } else {
        format!(
            "{} seems to be having trouble breathing.",
            uppercase_first(&target.the_name())
        )
    };

    let poison = env.rng.dice(levels, 6);
    let slow = levels + env.rng.random2(levels + 1);
    let target = env.actor_mut(victim)?;
    let poisoned = target.poison(source, poison);
    let slowed = target.slow_down(slow);
    tracing::debug!(%victim, name, poisoned, slowed, "curare");
    if poisoned || slowed {
        env.say(&text);
    }
    Ok(poisoned || slowed)
}

/// Resistance check for the blowgun status brands.
pub fn blowgun_check(
    env: &mut Env<'_>,
    attacker: ActorId,
    defender: ActorId,
    brand: MissileBrand,
) -> Result<bool, CombatError> {
    let def = env.actor(defender)?;
    let def_hd = def.hit_dice();
    if def.holiness().intersects(Holiness::UNDEAD | Holiness::NONLIVING) {
        let text = format!(
            "{} {} unaffected.",
            uppercase_first(&def.the_name()),
            def.conj_verb("be")
        );
        env.say(&text);
        return Ok(false);
    }
    let resist_text = format!(
        "{} {}.",
        uppercase_first(&def.the_name()),
        def.conj_verb("resist")
    );

    if !attacker.is_player() {
        let atk_hd = env.actor(attacker)?.hit_dice();
        let mut chance = (85 - (def_hd - atk_hd) * 5 / 2).min(95);
        match brand {
            MissileBrand::Frenzy => chance /= 2,
            MissileBrand::Petrification | MissileBrand::Sleep => chance = chance * 4 / 5,
            _ => {}
        }
        return Ok(env.rng.chance(chance, 100));
    }

    // a tiny chance even without skill
    if def_hd < 15 && env.rng.random2(100) <= 2 {
        return Ok(true);
    }
    let skill = env.world.player.ranged_skill;
    let resist_roll = 2 + env.rng.random2(4 + skill);
    tracing::debug!(resist_roll, def_hd, "blowgun resist roll");
    if resist_roll < def_hd {
        env.say(&resist_text);
        return Ok(false);
    }
    Ok(true)
}

/// Effective damage of a needle, used as the status strength.
pub fn blowgun_duration_roll(
    rng: &mut dyn cr_rng::RandomSource,
    attacker_hd: i32,
    brand: MissileBrand,
) -> i32 {
    match brand {
        MissileBrand::Curare => 2,
        MissileBrand::Poisoned => rng.random2(6 + attacker_hd * 2),
        _ => 5 + rng.random2(attacker_hd),
    }
}

/// Third-person form of a verb with a non-actor subject.
fn third_person(verb: &str) -> String {
    if verb.ends_with('s') || verb.ends_with("sh") || verb.ends_with("ch") || verb.ends_with('x') {
        format!("{verb}es")
    } else {
        format!("{verb}s")
    }
}

/// `"The arrow burns"` or `"The orc burns"`, depending on who does it.
fn brand_subject(
    env: &Env<'_>,
    attacker: ActorId,
    what: Option<&str>,
    verb: &str,
) -> Result<String, CombatError> {
    Ok(match what {
        Some(what) => format!("{} {}", uppercase_first(what), third_person(verb)),
        None => {
            let atk = env.actor(attacker)?;
            format!("{} {}", uppercase_first(&atk.the_name()), atk.conj_verb(verb))
        }
    })
}

/// Fire or cold bonus damage with its narration.
fn calc_elemental_brand_damage(
    env: &mut Env<'_>,
    state: &mut AttackState,
    flavour: Flavour,
    verb: &str,
    what: Option<&str>,
) -> Result<(), CombatError> {
    let d = state.damage_done;
    let raw = if flavour == Flavour::Fire {
        d
    } else {
        let extra = env.rng.random2(d);
        env.rng.div_rand_round(d + extra, 4)
    };
    let special = resist_adjust_damage(env.actor(state.defender)?, flavour, raw);
    state.special_damage = special;
    state.special_damage_flavour = flavour;
    if special > 0 {
        let def_name = env.actor(state.defender)?.the_name();
        state.special_damage_message = Some(format!(
            "{} {}{}",
            brand_subject(env, state.attacker, what, verb)?,
            def_name,
            attack_strength_punctuation(special)
        ));
    }
    Ok(())
}

/// Print the pending brand message and deal the special damage.
fn finish_brand(env: &mut Env<'_>, state: &mut AttackState) -> Result<(), CombatError> {
    if let Some(msg) = state.special_damage_message.take() {
        env.say(&msg);
        state.obvious_effect = true;
    }
    if state.special_damage > 0 {
        hurt(
            env,
            Some(state.attacker),
            state.defender,
            state.special_damage,
            state.special_damage_flavour,
        )?;
    }
    Ok(())
}

/// Apply the ammunition's brand. Returns true if the defender is dead.
pub fn apply_missile_brand(
    env: &mut Env<'_>,
    state: &mut AttackState,
    projectile: &Item,
) -> Result<bool, CombatError> {
    invariant!(
        projectile.is_missile(),
        CombatError::NotAMissile(projectile.name())
    );

    state.special_damage = 0;
    let mut brand = projectile.missile_brand();
    if brand == MissileBrand::Chaos {
        brand = random_chaos_missile_brand(env, state.defender)?;
    }
    tracing::debug!(%brand, damage = state.damage_done, "missile brand");

    let what = projectile.the_name();
    let defender = state.defender;
    let d = state.damage_done;
    match brand {
        MissileBrand::Flame => {
            let verb = if env.actor(defender)?.is_icy() {
                "melt"
            } else {
                "burn"
            };
            calc_elemental_brand_damage(env, state, Flavour::Fire, verb, Some(&what))?;
            env.actor_mut(defender)?.expose_to_element(Flavour::Fire, 2);
        }
        MissileBrand::Frost => {
            calc_elemental_brand_damage(env, state, Flavour::Cold, "freeze", Some(&what))?;
            env.actor_mut(defender)?.expose_to_element(Flavour::Cold, 2);
        }
        MissileBrand::Poisoned => {
            let needle = projectile.missile_type() == Some(MissileType::Needle);
            if (needle && d > 0) || !env.rng.one_in(4) {
                let pois = if needle {
                    d
                } else {
                    6 + env.rng.random2(8) + env.rng.random2(d * 3 / 2)
                };
                if env.actor_mut(defender)?.poison(Some(state.attacker), pois) {
                    state.obvious_effect = true;
                }
            }
        }
        MissileBrand::Curare => {
            state.obvious_effect = curare_actor(env, Some(state.attacker), defender, d, "curare")?;
        }
        MissileBrand::Chaos => chaos_affects_defender(env, state)?,
        MissileBrand::Dispersal if d > 0 => disperse(env, state)?,
        MissileBrand::Silver => {
            let (amount, msg) = silver_damages_victim(env.actor(defender)?, d);
            state.special_damage = amount;
            state.special_damage_message = msg;
        }
        MissileBrand::Petrification => {
            if blowgun_check(env, state.attacker, defender, brand)? {
                state.obvious_effect |= env.actor_mut(defender)?.petrify();
            }
        }
        MissileBrand::Sleep => {
            if blowgun_check(env, state.attacker, defender, brand)? {
                state.obvious_effect |= env.actor_mut(defender)?.put_to_sleep(d);
                state.should_alert_defender = false;
            }
        }
        MissileBrand::Confusion => {
            if blowgun_check(env, state.attacker, defender, brand)? {
                state.obvious_effect |= env.actor_mut(defender)?.confuse(d);
            }
        }
        MissileBrand::Frenzy => {
            if blowgun_check(env, state.attacker, defender, brand)? {
                // go_berserk wakes a sleeping monster first
                state.obvious_effect |= env.actor_mut(defender)?.go_berserk();
            }
        }
        MissileBrand::Dispersal
        | MissileBrand::Normal
        | MissileBrand::Penetration
        | MissileBrand::Blinding => {}
    }

    finish_brand(env, state)?;
    Ok(!env.actor(defender)?.is_alive())
}

/// Blink the defender to the farther of two random nearby squares.
fn disperse(env: &mut Env<'_>, state: &mut AttackState) -> Result<(), CombatError> {
    let def = env.actor(state.defender)?;
    if def.no_tele() {
        if def.is_player() {
            env.say("You feel a strange sense of stasis.");
        }
        return Ok(());
    }
    let centre = def.position();
    let from = env.actor(state.attacker)?.position();
    let radius = env.config.blink_radius;
    let first = env.world.random_near_space(&mut *env.rng, centre, radius);
    let second = env.world.random_near_space(&mut *env.rng, centre, radius);
    if let (Some(a), Some(b)) = (first, second) {
        let dest = farther_from(from, a, b);
        if env.actor_mut(state.defender)?.blink_to(dest) {
            state.obvious_effect = true;
        }
    }
    Ok(())
}

fn farther_from(from: Coord, a: Coord, b: Coord) -> Coord {
    if b.grid_distance(from) > a.grid_distance(from) {
        b
    } else {
        a
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Distortion {
    SmallDmg,
    BigDmg,
    Banish,
    Blink,
    TeleInstant,
    TeleDelayed,
    None,
}

const DISTORTION_WEIGHTS: [(Distortion, i32); 7] = [
    (Distortion::SmallDmg, 33),
    (Distortion::BigDmg, 22),
    (Distortion::Banish, 5),
    (Distortion::Blink, 15),
    (Distortion::TeleInstant, 10),
    (Distortion::TeleDelayed, 10),
    (Distortion::None, 5),
];

/// Apply a weapon or launcher brand.
///
/// `what` names the thing that struck (the projectile, for launchers);
/// `None` makes the attacker the subject of the narration. Returns true
/// if the defender is dead or was moved away by the brand.
pub fn apply_weapon_brand(
    env: &mut Env<'_>,
    state: &mut AttackState,
    weapon: &Item,
    what: Option<&str>,
) -> Result<bool, CombatError> {
    state.special_damage = 0;
    let nominal = weapon.weapon_brand();
    let brand = if nominal == WeaponBrand::Chaos {
        random_chaos_weapon_brand(env, state.attacker, state.defender)?
    } else {
        nominal
    };

    let (attacker, defender) = (state.attacker, state.defender);
    let d = state.damage_done;
    let alive = env.actor(defender)?.is_alive();
    if (!alive && !brand.works_on_corpse()) || (d == 0 && brand.needs_damage()) {
        return Ok(!alive);
    }
    tracing::debug!(%brand, damage = d, "weapon brand");

    let def = env.actor(defender)?;
    let def_name = def.the_name();
    let def_subject = uppercase_first(&def_name);

    match brand {
        WeaponBrand::Flaming => {
            let verb = if def.is_icy() { "melt" } else { "burn" };
            calc_elemental_brand_damage(env, state, Flavour::Fire, verb, what)?;
            env.actor_mut(defender)?.expose_to_element(Flavour::Fire, 2);
        }
        WeaponBrand::Freezing => {
            calc_elemental_brand_damage(env, state, Flavour::Cold, "freeze", what)?;
            env.actor_mut(defender)?.expose_to_element(Flavour::Cold, 2);
        }
        WeaponBrand::HolyWrath | WeaponBrand::DragonSlaying => {
            let susceptible = if brand == WeaponBrand::HolyWrath {
                def.holy_wrath_susceptible()
            } else {
                def.is_dragonkind()
            };
            if susceptible {
                let convulse = def.conj_verb("convulse");
                state.special_damage = 1 + env.rng.random2(d * 15) / 10;
                state.special_damage_flavour = if brand == WeaponBrand::HolyWrath {
                    Flavour::Holy
                } else {
                    Flavour::Physical
                };
                state.special_damage_message = Some(format!(
                    "{def_subject} {convulse}{}",
                    attack_strength_punctuation(state.special_damage)
                ));
            }
        }
        WeaponBrand::Electrocution => {
            let res = def.resist(Flavour::Electricity);
            let is_player = def.is_player();
            let roll = env.rng.dice(2, 4);
            let mut special = resist_adjust_damage(env.actor(defender)?, Flavour::Electricity, roll);
            if special == 1 && env.rng.coinflip() {
                special = 0;
            }
            if special > 0 {
                state.special_damage = special;
                state.special_damage_flavour = Flavour::Electricity;
                state.special_damage_message = Some(if is_player {
                    let how = match res {
                        r if r > 0 => "lightly shocked",
                        r if r < 0 => "electrocuted",
                        _ => "shocked",
                    };
                    format!("You are {how}{}", attack_strength_punctuation(special))
                } else {
                    let how = match res {
                        r if r > 0 => "weakly ",
                        r if r < 0 => "violently ",
                        _ => "",
                    };
                    format!(
                        "Lightning {how}courses through {def_name}{}",
                        attack_strength_punctuation(special)
                    )
                });
                env.actor_mut(defender)?
                    .expose_to_element(Flavour::Electricity, 2);
            }
        }
        WeaponBrand::Venom => {
            if !env.rng.one_in(4) {
                let pois = 6 + env.rng.random2(8) + env.rng.random2(d * 3 / 2);
                state.obvious_effect |= env.actor_mut(defender)?.poison(Some(attacker), pois);
            }
        }
        WeaponBrand::Draining => {
            let natural = def.holiness().contains(Holiness::NATURAL);
            let is_monster = def.is_monster();
            let text = format!("{def_subject} {} drained", def.conj_verb("be"));
            let skip = !natural || (is_monster && env.rng.coinflip());
            if !skip {
                state.special_damage = (1 + env.rng.random2(d)) / 2;
                state.special_damage_message = Some(format!(
                    "{text}{}",
                    attack_strength_punctuation(state.special_damage)
                ));
                env.actor_mut(defender)?
                    .core_mut()
                    .status
                    .increase(StatusKind::Drained, 2 + d, 100);
            }
        }
        WeaponBrand::Vorpal => {
            state.special_damage = 1 + env.rng.random2(d) / 3;
        }
        WeaponBrand::Silver => {
            let (amount, msg) = silver_damages_victim(def, d);
            state.special_damage = amount;
            state.special_damage_message = msg;
        }
        WeaponBrand::Vampirism => vampiric_drain(env, state)?,
        WeaponBrand::Confuse => {
            let natural = def.holiness().contains(Holiness::NATURAL);
            let def_hd = def.hit_dice();
            let atk_hd = env.actor(attacker)?.hit_dice();
            let takes = if attacker.is_player() {
                let hdcheck = if natural {
                    env.rng.random2(30)
                } else {
                    env.rng.random2(22)
                };
                hdcheck >= def_hd && !env.rng.one_in(5)
            } else {
                env.rng.one_in(3)
            };
            if takes {
                let amount = 1 + env.rng.random2(3 + atk_hd);
                if env.actor_mut(defender)?.confuse(amount) {
                    let def = env.actor(defender)?;
                    let text = format!(
                        "{} {} confused.",
                        uppercase_first(&def.the_name()),
                        if def.is_player() { "are" } else { "looks" }
                    );
                    env.say(&text);
                    state.obvious_effect = true;
                }
            }
        }
        WeaponBrand::Distortion => distortion_affects_defender(env, state)?,
        WeaponBrand::Antimagic => {
            if defender.is_player() {
                let player = &mut env.world.player;
                if player.max_magic_points > 0 {
                    let drain = (d * 8 / 10).max(1).min(player.magic_points);
                    player.magic_points -= drain;
                    env.say("You feel your power leaking away.");
                    state.obvious_effect = true;
                }
            }
        }
        WeaponBrand::Chaos => chaos_affects_defender(env, state)?,
        WeaponBrand::Normal | WeaponBrand::Penetration => {}
    }

    if nominal == WeaponBrand::Chaos
        && brand != WeaponBrand::Chaos
        && state.special_damage_message.is_none()
        && env.rng.one_in(20)
    {
        let target = if env.rng.coinflip() { attacker } else { defender };
        env.world.place_effect(WorldEffect::Miscast {
            agent: attacker,
            target,
            level: 0,
        });
    }

    finish_brand(env, state)?;
    Ok(state.defender_displaced || !env.actor(defender)?.is_alive())
}

/// Heal the attacker from the defender's wounds.
fn vampiric_drain(env: &mut Env<'_>, state: &mut AttackState) -> Result<(), CombatError> {
    let (attacker, defender) = (state.attacker, state.defender);
    let d = state.damage_done;
    let def = env.actor(defender)?;
    let atk = env.actor(attacker)?;
    if d < 1
        || !def.holiness().contains(Holiness::NATURAL)
        || atk.hit_points() >= atk.max_hit_points()
    {
        return Ok(());
    }
    let atk_subject = uppercase_first(&atk.the_name());

    let dice = env.rng.dice(3, d);
    let heal = env.rng.div_rand_round(dice, 6).max(1);
    let punct = attack_strength_punctuation(heal);
    let text = if attacker.is_player() {
        format!("You draw strength from its wounds{punct}")
    } else if defender.is_player() {
        format!("{atk_subject} draws strength from your wounds{punct}")
    } else {
        format!("{atk_subject} is healed{punct}")
    };
    env.say(&text);
    env.actor_mut(attacker)?.heal(heal);
    state.obvious_effect = true;
    Ok(())
}

/// Warp space around the defender: damage, blink, teleport or banish.
fn distortion_affects_defender(
    env: &mut Env<'_>,
    state: &mut AttackState,
) -> Result<(), CombatError> {
    let defender = state.defender;
    let def = env.actor(defender)?;
    let def_name = def.the_name();
    let no_tele = def.no_tele();
    let pos = def.position();

    let choice = choose_weighted(&mut *env.rng, &DISTORTION_WEIGHTS).unwrap_or(Distortion::None);
    tracing::debug!(?choice, "distortion");
    match choice {
        Distortion::SmallDmg => {
            state.special_damage = 1 + env.rng.random2avg(7, 2);
            state.special_damage_message = Some(format!(
                "Space bends around {def_name}{}",
                attack_strength_punctuation(state.special_damage)
            ));
        }
        Distortion::BigDmg => {
            state.special_damage = 3 + env.rng.random2avg(24, 2);
            state.special_damage_message = Some(format!(
                "Space warps horribly around {def_name}{}",
                attack_strength_punctuation(state.special_damage)
            ));
        }
        Distortion::Blink if !no_tele => {
            let radius = env.config.blink_radius;
            if let Some(dest) = env.world.random_near_space(&mut *env.rng, pos, radius) {
                env.actor_mut(defender)?.blink_to(dest);
                state.obvious_effect = true;
            }
        }
        Distortion::Banish | Distortion::TeleInstant if !no_tele => {
            let banish = choice == Distortion::Banish;
            if banish {
                let def = env.actor(defender)?;
                let text = format!(
                    "{} {} cast into the Abyss!",
                    uppercase_first(&def.the_name()),
                    def.conj_verb("be")
                );
                env.say(&text);
            }
            env.world.place_effect(WorldEffect::Teleport {
                target: defender,
                banish,
            });
            state.defender_displaced = true;
            state.obvious_effect = true;
        }
        Distortion::TeleDelayed if !no_tele => {
            env.world.place_effect(WorldEffect::Teleport {
                target: defender,
                banish: false,
            });
            state.obvious_effect = true;
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Monster, Player};
    use crate::artifact::HookRegistry;
    use crate::config::CombatConfig;
    use crate::item::WeaponType;
    use crate::message::MessageLog;
    use crate::world::World;
    use cr_rng::{Bias, RiggedRng};

    fn setup(holiness: Holiness) -> (World, ActorId) {
        let mut w = World::new(20, 20, Player::new("Hero", 10, 50));
        let mut m = Monster::new(ActorId::default(), "orc", 5, 40);
        m.core.holiness = holiness;
        m.core.pos = Coord::new(5, 5);
        let id = w.add_monster(m);
        (w, id)
    }

    #[test]
    fn test_resist_levels() {
        let mut m = Monster::new(ActorId(1), "imp", 3, 10);
        assert_eq!(resist_adjust_damage(&m, Flavour::Fire, 12), 12);
        m.core.resists.fire = 1;
        assert_eq!(resist_adjust_damage(&m, Flavour::Fire, 12), 6);
        m.core.resists.fire = 2;
        assert_eq!(resist_adjust_damage(&m, Flavour::Fire, 12), 4);
        m.core.resists.fire = 3;
        assert_eq!(resist_adjust_damage(&m, Flavour::Fire, 12), 0);
        m.core.resists.fire = -1;
        assert_eq!(resist_adjust_damage(&m, Flavour::Fire, 12), 18);
    }

    #[test]
    fn test_silver_by_holiness() {
        let mut m = Monster::new(ActorId(1), "zombie", 3, 10);
        m.core.holiness = Holiness::UNDEAD;
        let (amount, msg) = silver_damages_victim(&m, 8);
        assert_eq!(amount, 8);
        assert_eq!(msg.as_deref(), Some("The zombie writhes in agony!"));

        m.core.holiness = Holiness::NATURAL;
        assert_eq!(silver_damages_victim(&m, 8), (0, None));
        m.core.traits |= ActorTraits::CHAOTIC;
        assert_eq!(silver_damages_victim(&m, 8).0, 6);
    }

    #[test]
    fn test_duration_roll() {
        let mut rng = RiggedRng::new(Bias::High);
        assert_eq!(blowgun_duration_roll(&mut rng, 4, MissileBrand::Curare), 2);
        assert_eq!(blowgun_duration_roll(&mut rng, 4, MissileBrand::Poisoned), 13);
        assert_eq!(blowgun_duration_roll(&mut rng, 4, MissileBrand::Sleep), 8);
    }

    #[test]
    fn test_undead_ignore_blowgun() {
        let (mut w, orc) = setup(Holiness::UNDEAD);
        let mut rng = RiggedRng::new(Bias::Low);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let ok = blowgun_check(&mut env, ActorId::PLAYER, orc, MissileBrand::Sleep);
        assert_eq!(ok, Ok(false));
        assert!(log.contains("The orc is unaffected."));
    }

    #[test]
    fn test_sleep_needle_suppresses_alert() {
        let (mut w, orc) = setup(Holiness::NATURAL);
        let mut rng = RiggedRng::new(Bias::Low);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let needle = Item::missile(MissileType::Needle, 1).with_missile_brand(MissileBrand::Sleep);
        let mut state = AttackState::new(ActorId::PLAYER, orc);
        state.damage_done = 6;
        let died = apply_missile_brand(&mut env, &mut state, &needle);
        assert_eq!(died, Ok(false));
        assert!(!state.should_alert_defender);
        assert!(w.monster(orc).is_some_and(|m| m.has_status(StatusKind::Sleep)));
    }

    #[test]
    fn test_poison_brand_skips_undead() {
        let (mut w, orc) = setup(Holiness::UNDEAD);
        let mut rng = RiggedRng::new(Bias::High);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let arrow = Item::missile(MissileType::Arrow, 1).with_missile_brand(MissileBrand::Poisoned);
        let mut state = AttackState::new(ActorId::PLAYER, orc);
        state.damage_done = 10;
        apply_missile_brand(&mut env, &mut state, &arrow).ok();
        assert!(!state.obvious_effect);
        assert_eq!(w.monster(orc).map(|m| m.status_duration(StatusKind::Poison)), Some(0));
    }

    #[test]
    fn test_flame_arrow_message() {
        let (mut w, orc) = setup(Holiness::NATURAL);
        let mut rng = RiggedRng::new(Bias::Low);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let arrow = Item::missile(MissileType::Arrow, 1).with_missile_brand(MissileBrand::Flame);
        let mut state = AttackState::new(ActorId::PLAYER, orc);
        state.damage_done = 8;
        apply_missile_brand(&mut env, &mut state, &arrow).ok();
        assert_eq!(state.special_damage, 8);
        assert!(log.contains("The arrow burns the orc (8)!"));
        assert_eq!(w.monster(orc).map(|m| m.core.hp), Some(32));
    }

    #[test]
    fn test_dispersal_blocked_by_stasis() {
        let (mut w, orc) = setup(Holiness::NATURAL);
        if let Some(m) = w.monster_mut(orc) {
            m.core.traits |= ActorTraits::STASIS;
        }
        let mut rng = RiggedRng::new(Bias::Low);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let dart = Item::missile(MissileType::Dart, 1).with_missile_brand(MissileBrand::Dispersal);
        let mut state = AttackState::new(ActorId::PLAYER, orc);
        state.damage_done = 3;
        apply_missile_brand(&mut env, &mut state, &dart).ok();
        assert_eq!(w.monster(orc).map(|m| m.core.pos), Some(Coord::new(5, 5)));
    }

    #[test]
    fn test_dispersal_moves_away() {
        assert_eq!(
            farther_from(Coord::new(0, 0), Coord::new(2, 2), Coord::new(6, 6)),
            Coord::new(6, 6)
        );
        assert_eq!(
            farther_from(Coord::new(0, 0), Coord::new(6, 6), Coord::new(2, 2)),
            Coord::new(6, 6)
        );
    }

    #[test]
    fn test_corpse_rule() {
        let (mut w, orc) = setup(Holiness::NATURAL);
        if let Some(m) = w.monster_mut(orc) {
            m.core.hp = 0;
        }
        let mut rng = RiggedRng::new(Bias::Low);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let sword = Item::weapon(WeaponType::LongSword).with_weapon_brand(WeaponBrand::Venom);
        let mut state = AttackState::new(ActorId::PLAYER, orc);
        state.damage_done = 5;
        assert_eq!(apply_weapon_brand(&mut env, &mut state, &sword, None), Ok(true));
        assert!(log.is_empty());
    }

    #[test]
    fn test_holy_wrath_on_undead() {
        let (mut w, orc) = setup(Holiness::UNDEAD);
        let mut rng = RiggedRng::new(Bias::High);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let mace = Item::weapon(WeaponType::Mace).with_weapon_brand(WeaponBrand::HolyWrath);
        let mut state = AttackState::new(ActorId::PLAYER, orc);
        state.damage_done = 10;
        apply_weapon_brand(&mut env, &mut state, &mace, None).ok();
        // 1 + 149 / 10
        assert_eq!(state.special_damage, 15);
        assert!(log.contains("The orc convulses"));
    }
}
