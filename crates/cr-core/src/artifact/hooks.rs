//! Per-artifact hook bodies
//!
//! Each function here is wired into [`super::UNRAND_TABLE`]. They only
//! touch the world through [`Env`] and queue anything bigger than a status
//! change as a [`WorldEffect`].

use super::{EvokeResult, ExplosionSpec, HitInfo, LaunchSetup, SetupMissile, equip_mpr};
use crate::actor::{ActorId, Flavour, Holiness, StatusKind};
use crate::combat::brand::{curare_actor, resist_adjust_damage, silver_damages_victim};
use crate::combat::hurt;
use crate::error::{CombatError, invariant};
use crate::item::{Item, ItemFlags};
use crate::message::{MsgChannel, uppercase_first};
use crate::world::{SpellKind, WorldEffect};
use crate::{BASELINE_DELAY, Env, THERMIC_BASE_PLUS, THERMIC_MAX_PLUS};
use cr_rng::choose_weighted;

type HookResult = Result<(), CombatError>;

/// Evocations skill scaled to `scale` at level 27.
fn evocations(env: &Env<'_>, id: ActorId, scale: i32) -> Result<i32, CombatError> {
    if id.is_player() {
        Ok(env.world.player.evocations_skill * scale)
    } else {
        let hd = env.actor(id)?.hit_dice().min(27);
        Ok(hd * scale)
    }
}

/// Name of the defender as object of the attacker's verb.
fn object_name(env: &Env<'_>, attacker: ActorId, defender: ActorId) -> Result<String, CombatError> {
    if attacker == defender {
        let reflexive = if attacker.is_player() {
            "yourself"
        } else {
            "itself"
        };
        return Ok(reflexive.to_string());
    }
    Ok(env.actor(defender)?.the_name())
}

// ============================================================================
// Singing Sword
// ============================================================================

/// Speaks on every wield, introducing itself the first time.
pub(super) fn singing_sword_equip(
    env: &mut Env<'_>,
    item: &mut Item,
    _owner: ActorId,
    show_msgs: &mut bool,
    _unmeld: bool,
) -> HookResult {
    if !*show_msgs {
        return Ok(());
    }
    if item.flags.contains(ItemFlags::WELCOMED) {
        env.notify(MsgChannel::Talk, "The Singing Sword hums in delight!");
    } else {
        env.notify(
            MsgChannel::Talk,
            "The sword says, \"Hi! I'm the Singing Sword!\"",
        );
        item.flags.insert(ItemFlags::WELCOMED);
    }
    *show_msgs = false;
    Ok(())
}

pub(super) fn singing_sword_unequip(
    env: &mut Env<'_>,
    item: &mut Item,
    _owner: ActorId,
    show_msgs: &mut bool,
) -> HookResult {
    item.custom_name = None;
    equip_mpr(env.messages, show_msgs, "The Singing Sword sighs.", MsgChannel::Talk);
    Ok(())
}

fn singing_tier(tension: i32) -> i32 {
    (1 + tension / 20).clamp(1, 4)
}

/// Renames itself to match the mood of the fight.
pub(super) fn singing_sword_world_reacts(
    env: &mut Env<'_>,
    item: &mut Item,
    owner: ActorId,
    _time_taken: i32,
) -> HookResult {
    let tier = singing_tier(env.world.tension);
    let pos = env.actor(owner)?.position();
    let name = if env.world.is_silenced(pos) {
        "Sulking Sword"
    } else if tier < 4 {
        "Singing Sword"
    } else {
        "Screaming Sword"
    };
    item.custom_name = Some(name.to_string());
    Ok(())
}

const SINGING_LOUDNESS: [i32; 5] = [0, 0, 20, 30, 40];
const SINGING_LINES: [&str; 5] = [
    "The Sulking Sword sulks silently.",
    "The Singing Sword hums a little tune.",
    "The Singing Sword sings a battle hymn!",
    "The Singing Sword sings loudly!",
    "The Screaming Sword SCREAMS!",
];

pub(super) fn singing_sword_melee_effects(
    env: &mut Env<'_>,
    _item: &mut Item,
    hit: &HitInfo,
) -> HookResult {
    let mut tier = if hit.attacker.is_player() {
        singing_tier(env.world.tension)
    } else {
        1
    };
    let pos = env.actor(hit.attacker)?.position();
    if env.world.is_silenced(pos) {
        tier = 0;
    }
    tracing::trace!(tension = env.world.tension, tier, "singing sword");

    let odds = match tier {
        1 => 24,
        2 => 16,
        _ => 12,
    };
    if !env.rng.chance(6, odds) {
        return Ok(());
    }

    let idx = tier as usize;
    env.notify(MsgChannel::Talk, SINGING_LINES[idx]);
    if SINGING_LOUDNESS[idx] > 0 {
        env.world.place_effect(WorldEffect::Noise {
            pos,
            loudness: SINGING_LOUDNESS[idx],
        });
    }
    if tier < 1 {
        return Ok(());
    }

    let power = 100 + 13 * (tier - 1) + if tier == 4 { 36 } else { 0 };
    let target = env.actor(hit.defender)?.position();
    env.world.place_effect(WorldEffect::Spell {
        caster: hit.attacker,
        spell: SpellKind::SonicWave,
        power,
        target: Some(target),
    });
    Ok(())
}

// ============================================================================
// Majin-Bo
// ============================================================================

pub(super) fn majin_equip(
    env: &mut Env<'_>,
    item: &mut Item,
    owner: ActorId,
    show_msgs: &mut bool,
    _unmeld: bool,
) -> HookResult {
    if !owner.is_player() || env.world.player.max_magic_points == 0 {
        return Ok(());
    }
    let should_msg = *show_msgs;
    equip_mpr(
        env.messages,
        show_msgs,
        "You feel a darkness envelop your magic.",
        MsgChannel::Plain,
    );
    if should_msg && !item.flags.contains(ItemFlags::MAJIN_WELCOMED) {
        env.notify(
            MsgChannel::Talk,
            "A voice whispers, \"Our paths have crossed at last.\"",
        );
        item.flags.insert(ItemFlags::MAJIN_WELCOMED);
    }
    Ok(())
}

pub(super) fn majin_unequip(
    env: &mut Env<'_>,
    _item: &mut Item,
    owner: ActorId,
    show_msgs: &mut bool,
) -> HookResult {
    if owner.is_player() && env.world.player.max_magic_points != 0 {
        equip_mpr(
            env.messages,
            show_msgs,
            "The darkness slowly releases its grasp on your magic.",
            MsgChannel::Plain,
        );
    }
    Ok(())
}

// ============================================================================
// Melee-only weapons
// ============================================================================

/// Strips fire resistance from whatever it cuts.
pub(super) fn cerebov_melee_effects(
    env: &mut Env<'_>,
    _item: &mut Item,
    hit: &HitInfo,
) -> HookResult {
    if hit.damage == 0 {
        return Ok(());
    }
    let defender = env.actor(hit.defender)?;
    let vulnerable = defender.has_status(StatusKind::FireVulnerable);

    if defender.is_player() {
        if defender.resist(Flavour::Fire) <= 3 && !vulnerable {
            env.say("The sword of Cerebov burns away your fire resistance.");
            let amount = 3 + env.rng.random2(hit.damage);
            env.actor_mut(hit.defender)?
                .core_mut()
                .status
                .increase(StatusKind::FireVulnerable, amount, 50);
        }
    } else if !hit.mondied && !vulnerable {
        let text = format!(
            "The sword of Cerebov burns away {} fire resistance.",
            defender.pronoun_possessive()
        );
        env.say(&text);
        let duration = (3 + env.rng.random2(hit.damage)) * BASELINE_DELAY;
        env.actor_mut(hit.defender)?
            .set_status_duration(StatusKind::FireVulnerable, duration);
    }
    Ok(())
}

/// Fires a beam at the defender, more often the healthier the wielder.
pub(super) fn power_melee_effects(
    env: &mut Env<'_>,
    _item: &mut Item,
    hit: &HitInfo,
) -> HookResult {
    if hit.mondied {
        return Ok(());
    }
    let attacker = env.actor(hit.attacker)?;
    let odds = (attacker.hit_points() / 10).min(27);
    let source = attacker.position();
    if !env.rng.chance(odds, 27) {
        return Ok(());
    }
    let target = env.actor(hit.defender)?.position();
    env.world.place_effect(WorldEffect::Beam {
        agent: hit.attacker,
        name: "sword beam".to_string(),
        source,
        target,
        range: 4,
        power: 100,
    });
    Ok(())
}

pub(super) fn power_equip(
    env: &mut Env<'_>,
    _item: &mut Item,
    _owner: ActorId,
    show_msgs: &mut bool,
    _unmeld: bool,
) -> HookResult {
    equip_mpr(
        env.messages,
        show_msgs,
        "You sense an aura of extreme power.",
        MsgChannel::Plain,
    );
    Ok(())
}

/// Chance to kill a monster outright, better against small ones.
pub(super) fn finisher_melee_effects(
    env: &mut Env<'_>,
    _item: &mut Item,
    hit: &HitInfo,
) -> HookResult {
    if hit.mondied || hit.damage == 0 || hit.defender.is_player() {
        return Ok(());
    }
    let defender = env.actor(hit.defender)?;
    let hd = defender.hit_dice();
    let hp = defender.hit_points();
    if env.rng.chance(50 - hd, 200) {
        hurt(env, Some(hit.attacker), hit.defender, hp, Flavour::Physical)?;
    }
    Ok(())
}

pub(super) fn undeadhunter_melee_effects(
    env: &mut Env<'_>,
    _item: &mut Item,
    hit: &HitInfo,
) -> HookResult {
    let defender = env.actor(hit.defender)?;
    if !defender.holiness().contains(Holiness::UNDEAD) {
        return Ok(());
    }
    let text = format!(
        "{} {} blasted by disruptive energy!",
        uppercase_first(&defender.the_name()),
        defender.conj_verb("be")
    );
    if env.rng.one_in(3) || hit.mondied || hit.damage == 0 {
        return Ok(());
    }
    env.say(&text);
    let amount = env.rng.random2avg(1 + hit.damage * 3, 3);
    hurt(env, Some(hit.attacker), hit.defender, amount, Flavour::Physical)?;
    Ok(())
}

/// Silver damage against the unholy, a smaller flat bonus otherwise.
pub(super) fn order_melee_effects(
    env: &mut Env<'_>,
    _item: &mut Item,
    hit: &HitInfo,
) -> HookResult {
    if hit.mondied {
        return Ok(());
    }
    let (silver, msg) = silver_damages_victim(env.actor(hit.defender)?, hit.damage);
    let amount = if silver > 0 {
        if let Some(msg) = msg {
            env.say(&msg);
        }
        silver
    } else if hit.damage > 0 {
        1 + env.rng.random2(hit.damage) / 3
    } else {
        return Ok(());
    };
    hurt(env, Some(hit.attacker), hit.defender, amount, Flavour::Physical)?;
    Ok(())
}

pub(super) fn firestarter_equip(
    env: &mut Env<'_>,
    _item: &mut Item,
    _owner: ActorId,
    show_msgs: &mut bool,
    _unmeld: bool,
) -> HookResult {
    equip_mpr(
        env.messages,
        show_msgs,
        "You are filled with an inner flame.",
        MsgChannel::Plain,
    );
    Ok(())
}

pub(super) fn firestarter_unequip(
    env: &mut Env<'_>,
    _item: &mut Item,
    _owner: ActorId,
    show_msgs: &mut bool,
) -> HookResult {
    equip_mpr(env.messages, show_msgs, "Your inner flame fades away.", MsgChannel::Plain);
    Ok(())
}

pub(super) fn firestarter_melee_effects(
    env: &mut Env<'_>,
    _item: &mut Item,
    hit: &HitInfo,
) -> HookResult {
    if hit.damage == 0 || hit.mondied || hit.defender.is_player() {
        return Ok(());
    }
    let defender = env.actor(hit.defender)?;
    if defender.has_status(StatusKind::InnerFlame) {
        return Ok(());
    }
    let text = format!(
        "{} is filled with an inner flame.",
        uppercase_first(&defender.the_name())
    );
    env.say(&text);
    let duration = (3 + env.rng.random2(hit.damage)) * BASELINE_DELAY;
    env.actor_mut(hit.defender)?
        .set_status_duration(StatusKind::InnerFlame, duration);
    Ok(())
}

pub(super) fn snakebite_melee_effects(
    env: &mut Env<'_>,
    _item: &mut Item,
    hit: &HitInfo,
) -> HookResult {
    if !hit.mondied && env.rng.chance(2, 5) {
        curare_actor(env, Some(hit.attacker), hit.defender, 2, "curare")?;
    }
    Ok(())
}

const WOE_VERBS: [(&str, &str); 8] = [
    ("cleave", " in twain"),
    ("pulverise", " into a thin bloody mist"),
    ("hew", " savagely"),
    ("fatally mangle", ""),
    ("dissect", " like a pig carcass"),
    ("chop", " into pieces"),
    ("butcher", " messily"),
    ("slaughter", " joyfully"),
];

/// Never misses, always kills.
pub(super) fn woe_melee_effects(
    env: &mut Env<'_>,
    _item: &mut Item,
    hit: &HitInfo,
) -> HookResult {
    let (verb, adverb) = WOE_VERBS[env.rng.random2(WOE_VERBS.len() as i32) as usize];
    let attacker = env.actor(hit.attacker)?;
    let text = format!(
        "{} {} {}{}.",
        uppercase_first(&attacker.the_name()),
        attacker.conj_verb(verb),
        object_name(env, hit.attacker, hit.defender)?,
        adverb
    );
    env.say(&text);
    if !hit.mondied {
        let hp = env.actor(hit.defender)?.hit_points();
        hurt(env, Some(hit.attacker), hit.defender, hp, Flavour::Physical)?;
    }
    Ok(())
}

pub(super) fn arc_blade_equip(
    env: &mut Env<'_>,
    _item: &mut Item,
    _owner: ActorId,
    show_msgs: &mut bool,
    _unmeld: bool,
) -> HookResult {
    equip_mpr(env.messages, show_msgs, "The arc blade crackles to life.", MsgChannel::Plain);
    Ok(())
}

pub(super) fn arc_blade_unequip(
    env: &mut Env<'_>,
    _item: &mut Item,
    _owner: ActorId,
    show_msgs: &mut bool,
) -> HookResult {
    equip_mpr(env.messages, show_msgs, "The arc blade stops crackling.", MsgChannel::Plain);
    Ok(())
}

pub(super) fn arc_blade_melee_effects(
    env: &mut Env<'_>,
    _item: &mut Item,
    hit: &HitInfo,
) -> HookResult {
    if !env.rng.one_in(3) {
        return Ok(());
    }
    let power = 100 + env.rng.random2avg(100, 2);
    env.say("The arc blade crackles.");
    env.world.place_effect(WorldEffect::Spell {
        caster: hit.attacker,
        spell: SpellKind::Discharge,
        power,
        target: None,
    });
    Ok(())
}

/// Adds a random elemental strike, more often with evocations skill.
pub(super) fn elemental_staff_melee_effects(
    env: &mut Env<'_>,
    _item: &mut Item,
    hit: &HitInfo,
) -> HookResult {
    let evoc = evocations(env, hit.attacker, 27)?;
    if hit.mondied {
        return Ok(());
    }
    // two tries at the same roll
    if !(env.rng.chance(evoc, 27 * 27) || env.rng.chance(evoc, 27 * 27)) {
        return Ok(());
    }

    let (verb, flavour) = match env.rng.random2(4) {
        0 => ("burn", Flavour::Fire),
        1 => ("freeze", Flavour::Cold),
        2 => ("electrocute", Flavour::Electricity),
        _ => ("crush", Flavour::Physical),
    };

    let base = 10 + env.rng.random2(15);
    let defender = env
        .world
        .actor(hit.defender)
        .ok_or(CombatError::MissingActor(hit.defender))?;
    let bonus = if flavour == Flavour::Physical {
        defender.apply_ac(base, &mut *env.rng)
    } else {
        resist_adjust_damage(defender, flavour, base)
    };
    if bonus <= 0 {
        return Ok(());
    }

    let attacker = env.actor(hit.attacker)?;
    let text = format!(
        "{} {} {}.",
        uppercase_first(&attacker.the_name()),
        attacker.conj_verb(verb),
        object_name(env, hit.attacker, hit.defender)?
    );
    env.say(&text);
    hurt(env, Some(hit.attacker), hit.defender, bonus, flavour)?;

    let defender = env.actor_mut(hit.defender)?;
    if defender.is_alive() && flavour != Flavour::Physical {
        defender.expose_to_element(flavour, 2);
    }
    Ok(())
}

// ============================================================================
// Maxwell's thermic engine
// ============================================================================

pub(super) fn thermic_engine_equip(
    env: &mut Env<'_>,
    item: &mut Item,
    _owner: ActorId,
    show_msgs: &mut bool,
    _unmeld: bool,
) -> HookResult {
    equip_mpr(env.messages, show_msgs, "The engine hums to life!", MsgChannel::Plain);
    item.plus = THERMIC_BASE_PLUS;
    Ok(())
}

pub(super) fn thermic_engine_unequip(
    env: &mut Env<'_>,
    item: &mut Item,
    _owner: ActorId,
    show_msgs: &mut bool,
) -> HookResult {
    equip_mpr(env.messages, show_msgs, "The engine shudders to a halt.", MsgChannel::Plain);
    item.plus = THERMIC_BASE_PLUS;
    Ok(())
}

/// Charges up with every blow and adds a cold strike after the fire brand.
pub(super) fn thermic_engine_melee_effects(
    env: &mut Env<'_>,
    item: &mut Item,
    hit: &HitInfo,
) -> HookResult {
    if item.plus < THERMIC_MAX_PLUS {
        item.plus = (item.plus + 2).min(THERMIC_MAX_PLUS);
    }
    if hit.mondied {
        return Ok(());
    }

    let raw = env.rng.random2(hit.damage) / 2 + 1;
    let bonus = resist_adjust_damage(env.actor(hit.defender)?, Flavour::Cold, raw);
    if bonus <= 0 {
        return Ok(());
    }

    let attacker = env.actor(hit.attacker)?;
    let text = format!(
        "{} {} {}.",
        uppercase_first(&attacker.the_name()),
        attacker.conj_verb("freeze"),
        object_name(env, hit.attacker, hit.defender)?
    );
    env.say(&text);
    hurt(env, Some(hit.attacker), hit.defender, bonus, Flavour::Cold)?;
    let defender = env.actor_mut(hit.defender)?;
    if defender.is_alive() {
        defender.expose_to_element(Flavour::Cold, 2);
    }
    Ok(())
}

/// Bleeds off charge as time passes.
pub(super) fn thermic_engine_world_reacts(
    env: &mut Env<'_>,
    item: &mut Item,
    _owner: ActorId,
    time_taken: i32,
) -> HookResult {
    if item.plus > THERMIC_BASE_PLUS {
        let cooled = env.rng.div_rand_round(time_taken, BASELINE_DELAY);
        item.plus = (item.plus - cooled).max(THERMIC_BASE_PLUS);
    }
    Ok(())
}

// ============================================================================
// Shield of the Gong
// ============================================================================

/// Rings out whenever its wearer is struck.
pub(super) fn gong_melee_effects(
    env: &mut Env<'_>,
    _item: &mut Item,
    hit: &HitInfo,
) -> HookResult {
    let pos = env.actor(hit.owner)?.position();
    if env.world.is_silenced(pos) {
        return Ok(());
    }
    env.notify(MsgChannel::Sound, "You hear a strange loud sound.");
    env.world.place_effect(WorldEffect::Noise { pos, loudness: 40 });
    Ok(())
}

// ============================================================================
// Evocable items
// ============================================================================

pub(super) fn olgreb_equip(
    env: &mut Env<'_>,
    _item: &mut Item,
    _owner: ActorId,
    show_msgs: &mut bool,
    _unmeld: bool,
) -> HookResult {
    equip_mpr(env.messages, show_msgs, "You smell chlorine.", MsgChannel::Plain);
    Ok(())
}

pub(super) fn olgreb_unequip(
    env: &mut Env<'_>,
    _item: &mut Item,
    _owner: ActorId,
    show_msgs: &mut bool,
) -> HookResult {
    equip_mpr(env.messages, show_msgs, "The smell of chlorine vanishes.", MsgChannel::Plain);
    Ok(())
}

pub(super) fn olgreb_melee_effects(
    env: &mut Env<'_>,
    _item: &mut Item,
    hit: &HitInfo,
) -> HookResult {
    let defender = env.actor_mut(hit.defender)?;
    if defender.is_alive() {
        defender.poison(Some(hit.attacker), 2);
    }
    Ok(())
}

const OLGREB_MP_COST: i32 = 4;

/// Toxic radiance for four magic points, with a rare venom bolt on top.
pub(super) fn olgreb_evoke(
    env: &mut Env<'_>,
    _item: &mut Item,
    owner: ActorId,
    result: &mut EvokeResult,
) -> Result<bool, CombatError> {
    if !owner.is_player() {
        return Ok(false);
    }
    if env.world.player.magic_points < OLGREB_MP_COST {
        result.unevokable = true;
        return Ok(true);
    }
    let skill = evocations(env, owner, 100)?;
    if !env.rng.chance(skill + 100, 600) {
        return Ok(false);
    }

    result.did_work = true;
    env.world.player.magic_points -= OLGREB_MP_COST;
    let raw_power = 20 + evocations(env, owner, 20)?;
    let power = env.rng.div_rand_round(raw_power, 4);
    env.world.place_effect(WorldEffect::Spell {
        caster: owner,
        spell: SpellKind::ToxicRadiance,
        power,
        target: None,
    });
    if env.rng.chance(skill + 100, 2000) {
        env.world.place_effect(WorldEffect::Spell {
            caster: owner,
            spell: SpellKind::VenomBolt,
            power,
            target: None,
        });
    }
    Ok(false)
}

const ASMODEUS_SERVANTS: [(&str, i32); 5] = [
    ("efreet", 3),
    ("sun demon", 3),
    ("balrug", 3),
    ("hellion", 2),
    ("brimstone fiend", 1),
];

/// Summons one of the sceptre's demon servants.
pub(super) fn asmodeus_evoke(
    env: &mut Env<'_>,
    _item: &mut Item,
    owner: ActorId,
    result: &mut EvokeResult,
) -> Result<bool, CombatError> {
    let skill = evocations(env, owner, 100)?;
    if !env.rng.chance(skill, 3000) {
        return Ok(false);
    }
    let Some(monster) = choose_weighted(&mut *env.rng, &ASMODEUS_SERVANTS) else {
        return Ok(false);
    };
    env.say("The sceptre summons one of its servants.");
    env.world.place_effect(WorldEffect::Summon {
        summoner: owner,
        monster: monster.to_string(),
        count: 1,
    });
    result.did_work = true;
    Ok(false)
}

// ============================================================================
// Damnation
// ============================================================================

/// Turns an ordinary bolt into an exploding damnation bolt.
pub(super) fn damnation_launch(
    _env: &mut Env<'_>,
    _item: &mut Item,
    setup: &mut LaunchSetup,
) -> Result<SetupMissile, CombatError> {
    invariant!(
        setup.projectile.is_missile() && setup.projectile.unrand.is_none(),
        CombatError::NotAMissile(setup.projectile.name())
    );
    setup.projectile.flags.insert(ItemFlags::DAMNATION_BOLT);
    setup.beam_name = "damnation bolt".to_string();
    setup.ammo_name = "a damnation bolt".to_string();
    setup.explosion = Some(ExplosionSpec {
        name: "damnation".to_string(),
        dice: (3, 14),
        flavour: Flavour::Damnation,
        radius: 1,
    });
    Ok(SetupMissile::Finished)
}
