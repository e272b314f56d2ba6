//! Ranged attacks: thrown and launched missiles
//!
//! A [`RangedAttack`] is one missile meeting one defender somewhere along
//! its path. Anything the missile does afterwards (flying on, bouncing,
//! coming back reflected, blowing up) is queued on the world when the
//! attack concludes.

use super::base::{self, hurt};
use super::brand::{apply_missile_brand, apply_weapon_brand, blowgun_duration_roll};
use super::context::{
    AttackOutcome, AttackPhases, AttackResult, AttackState, Phase, PhaseStep, resolve,
};
use crate::actor::{Actor, ActorId, ActorTraits, Flavour, StatusKind};
use crate::artifact::{self, ExplosionSpec, HitInfo, LaunchSetup, SetupMissile, unrand_entry};
use crate::error::{CombatError, invariant};
use crate::item::{Item, MissileBrand, MissileType, WeaponBrand};
use crate::message::{attack_strength_punctuation, evasion_margin_adverb, uppercase_first};
use crate::world::{Coord, Flight, WorldEffect};
use crate::{BASELINE_DELAY, BEAM_STOP, Env, MAX_BLOCKER_PENALTY};

/// How long a net holds whoever it lands on.
const NET_HOLD: i32 = 10 * BASELINE_DELAY;

/// Closest the sweet-spot multiplier gets to nothing when shooting long.
const LONG_RANGE_FLOOR: i32 = 3;

/// Accuracy scale at grid distance `lrange`.
pub fn range_falloff(lrange: i32) -> f64 {
    f64::from(20 - lrange) / 10.0
}

/// Accuracy scale for `blockers` hostile actors crowding the attacker.
///
/// An open line of fire still costs a fifth.
pub fn blocker_penalty(blockers: i32) -> f64 {
    match blockers {
        1 => 0.7,
        n if n < MAX_BLOCKER_PENALTY => 0.8 - 0.1 * f64::from(n.max(0)),
        _ => 0.2,
    }
}

/// Damage multiplier in quarters, peaking at `sweet_spot`.
pub fn sweet_spot_multiplier(lrange: i32, sweet_spot: i32) -> i32 {
    let mult = if lrange > sweet_spot {
        (sweet_spot - (lrange - sweet_spot)).max(LONG_RANGE_FLOOR)
    } else {
        sweet_spot - (sweet_spot - lrange)
    };
    mult.max(1)
}

/// Whether the missile carries on through what it hits.
pub fn is_penetrating(projectile: &Item, launcher: Option<&Item>) -> bool {
    let Some(missile) = projectile.missile_type() else {
        return false;
    };
    if projectile.missile_brand() == MissileBrand::Penetration || missile == MissileType::Bolt {
        return true;
    }
    launcher.is_some_and(|l| {
        missile.damage() == 0
            && (l.weapon_brand() == WeaponBrand::Penetration
                || l.unrand.is_some_and(|art| unrand_entry(art).penetrates))
    })
}

/// Verb for a missile hit of the given damage.
pub fn ranged_attack_verb(missile: MissileType, penetrating: bool, damage: i32) -> &'static str {
    let tier = |verbs: [&'static str; 3]| {
        if damage < 5 {
            verbs[0]
        } else if damage < 20 {
            verbs[1]
        } else {
            verbs[2]
        }
    };
    let tier4 = |verbs: [&'static str; 4]| {
        if damage < 50 {
            tier([verbs[0], verbs[1], verbs[2]])
        } else {
            verbs[3]
        }
    };

    if penetrating {
        return match missile {
            m if m.is_bolt_like() => tier(["stabs through", "pierces through", "bores through"]),
            MissileType::Tomahawk => tier(["tumbles over", "slices through", "divides"]),
            _ => tier(["tumbles over", "rolls over", "bowls through"]),
        };
    }
    match missile {
        m if m.is_bolt_like() => tier(["pokes", "punctures", "impales"]),
        MissileType::Dart | MissileType::Needle => "jabs",
        MissileType::ThrowingNet => "ensnares",
        MissileType::Tomahawk => tier4(["chops", "pummels", "slices", "mangles"]),
        _ => tier4(["hits", "strikes", "crushes", "pulverizes"]),
    }
}

fn hit_punctuation(damage: i32) -> String {
    if damage > 0 {
        attack_strength_punctuation(damage)
    } else {
        ".".to_string()
    }
}

fn launches(launcher: &Item, projectile: &Item) -> bool {
    launcher
        .weapon_type()
        .zip(projectile.missile_type())
        .is_some_and(|(w, m)| w.launches(m))
}

/// One missile against one defender.
#[derive(Debug, Clone)]
pub struct RangedAttack {
    state: AttackState,
    projectile: Item,
    /// The attacker's launcher, if it fired the projectile
    launcher: Option<Item>,
    source: Coord,
    target: Coord,
    /// Fired at a square rather than at whoever stood there
    aimed_at_spot: bool,
    force_range: Option<i32>,
    range_used: i32,
    explosion: Option<ExplosionSpec>,
}

impl RangedAttack {
    /// Set up `projectile` flying from `attacker` at `defender`.
    pub fn new(
        env: &Env<'_>,
        attacker: ActorId,
        defender: ActorId,
        projectile: Item,
    ) -> Result<Self, CombatError> {
        invariant!(
            projectile.is_missile(),
            CombatError::NotAMissile(projectile.name())
        );
        let att = env.actor(attacker)?;
        let source = att.position();
        let launcher = att
            .weapon()
            .filter(|w| launches(w, &projectile))
            .cloned();
        let target = env.actor(defender)?.position();

        let mut state = AttackState::new(attacker, defender);
        state.attack_count = projectile
            .missile_type()
            .map_or(1, MissileType::attack_count);
        Ok(Self {
            state,
            projectile,
            launcher,
            source,
            target,
            aimed_at_spot: false,
            force_range: None,
            range_used: 0,
            explosion: None,
        })
    }

    /// Build from a shot a launch hook may have rewritten.
    pub fn from_launch(
        env: &Env<'_>,
        setup: LaunchSetup,
        defender: ActorId,
    ) -> Result<Self, CombatError> {
        let LaunchSetup {
            agent,
            mut projectile,
            beam_name,
            explosion,
            ..
        } = setup;
        if beam_name != projectile.name() {
            projectile.custom_name = Some(beam_name);
        }
        let mut attack = Self::new(env, agent, defender, projectile)?;
        attack.explosion = explosion;
        Ok(attack)
    }

    /// Aim at a square instead of at the defender.
    pub fn aimed_at(mut self, target: Coord) -> Self {
        self.target = target;
        self.aimed_at_spot = true;
        self
    }

    /// The missile started from somewhere other than the attacker.
    pub fn with_source(mut self, source: Coord) -> Self {
        self.source = source;
        self
    }

    /// Treat the shot as travelling `range` squares whatever the geometry.
    pub fn with_range(mut self, range: i32) -> Self {
        self.force_range = Some(range);
        self
    }

    pub fn with_explosion(mut self, explosion: ExplosionSpec) -> Self {
        self.explosion = Some(explosion);
        self
    }

    /// The missile came through a portal.
    pub fn through_portal(mut self) -> Self {
        self.state.teleport = true;
        self
    }

    /// Credit someone else with the attack.
    pub fn blame(mut self, responsible: ActorId) -> Self {
        self.state.responsible = responsible;
        self
    }

    pub fn projectile(&self) -> &Item {
        &self.projectile
    }

    pub fn launcher(&self) -> Option<&Item> {
        self.launcher.as_ref()
    }

    pub fn range_used(&self) -> i32 {
        self.range_used
    }

    fn penetrating(&self) -> bool {
        is_penetrating(&self.projectile, self.launcher.as_ref())
    }

    fn range(&self, env: &Env<'_>) -> Result<i32, CombatError> {
        if let Some(range) = self.force_range {
            return Ok(range);
        }
        let from = env.actor(self.state.attacker)?.position();
        Ok(from.grid_distance(env.actor(self.state.defender)?.position()))
    }

    fn auto_hits(&self) -> bool {
        self.projectile.auto_hits() || self.launcher.as_ref().is_some_and(Item::auto_hits)
    }

    /// Hostile monsters next to the attacker, and one of them to blame.
    fn hostile_blockers(&self, env: &mut Env<'_>) -> Result<(i32, Option<String>), CombatError> {
        let attacker = self.state.attacker;
        let origin = env.actor(attacker)?.position();
        let mut count = 0;
        let mut blocker = None;
        for pos in origin.rectangle(1, true) {
            let Some(id) = env.world.actor_at(pos) else {
                continue;
            };
            let (Some(mon), Some(att)) = (env.world.monster(id), env.world.actor(attacker)) else {
                continue;
            };
            if !mon.is_alive() || mon.incapacitated() || mon.is_firewood() {
                continue;
            }
            if !base::hostile_to(att, mon) {
                continue;
            }
            count += 1;
            let name = mon.the_name();
            if blocker.is_none() || env.rng.coinflip() {
                blocker = Some(name);
            }
        }
        Ok((count, blocker))
    }

    fn set_attack_verb(&mut self, damage: i32) {
        let missile = self.projectile.missile_type().unwrap_or_default();
        self.state.attack_verb = ranged_attack_verb(missile, self.penetrating(), damage).to_string();
    }

    fn announce_hit(&self, env: &mut Env<'_>, damage: i32) -> Result<(), CombatError> {
        let def = env.actor(self.state.defender)?.the_name();
        let text = format!(
            "{} {} {def}{}",
            uppercase_first(&self.projectile.the_name()),
            self.state.attack_verb,
            hit_punctuation(damage)
        );
        env.say(&text);
        Ok(())
    }

    fn calc_damage(&self, env: &mut Env<'_>) -> Result<i32, CombatError> {
        let attacker = self.state.attacker;
        let defender = self.state.defender;
        let ammo = self.projectile.base_damage();
        let raw = if attacker.is_player() {
            let player = &env.world.player;
            let (pot, plus, skill) = match &self.launcher {
                Some(l) => (ammo + l.base_damage(), l.plus, Some(player.ranged_skill)),
                None => (ammo + 2, self.projectile.plus, None),
            };
            base::player_damage(&mut *env.rng, player, pot, plus, skill)
        } else {
            let mon = env
                .world
                .monster(attacker)
                .ok_or(CombatError::MissingActor(attacker))?;
            let (pot, plus) = match &self.launcher {
                Some(l) => (ammo + l.base_damage(), l.plus),
                None => (ammo, self.projectile.plus),
            };
            base::monster_damage(&mut *env.rng, mon, pot, plus, true)
        };
        let def = env
            .world
            .actor(defender)
            .ok_or(CombatError::MissingActor(defender))?;
        Ok(def.apply_ac(raw, &mut *env.rng))
    }

    /// A cream pie to a monster's face may blind it.
    fn pie_in_the_face(&mut self, env: &mut Env<'_>) -> Result<(), CombatError> {
        let (attacker, defender) = (self.state.attacker, self.state.defender);
        let Some(mon) = env.world.monster(defender) else {
            return Ok(());
        };
        let def_hd = mon.core.hit_dice;
        let name = uppercase_first(&mon.the_name());
        let bonus = if attacker.is_player() {
            env.world.player.ranged_skill / 2
        } else {
            env.actor(attacker)?.hit_dice() / 2
        };
        if env.rng.chance(19 - def_hd * 2 + bonus, 20) {
            env.say(&format!("{name} gets pie all over its eyes and can't see."));
            let duration = env.rng.random_range(4, 8) * BASELINE_DELAY;
            let def = env.actor_mut(defender)?;
            let blind = def.status_duration(StatusKind::Blind).max(duration);
            def.set_status_duration(StatusKind::Blind, blind);
            self.state.obvious_effect = true;
        }
        Ok(())
    }

    /// `Killed` if the defender is gone, otherwise `Hit`.
    fn stop(&self, env: &Env<'_>) -> Result<PhaseStep, CombatError> {
        let result = if env.actor(self.state.defender)?.is_alive() {
            AttackResult::Hit
        } else {
            AttackResult::Killed
        };
        Ok(PhaseStep::Terminal(result))
    }

    /// Send the reflected missile back the way it came.
    fn reflect(&self, env: &mut Env<'_>, from: Coord) -> Result<(), CombatError> {
        let back_to = env.actor(self.state.attacker)?.position();
        env.world.place_effect(WorldEffect::Projectile(Flight {
            item: self.projectile.clone(),
            agent: self.state.defender,
            source: from,
            target: back_to,
            range: env.config.vision_radius,
            reflected: true,
        }));
        Ok(())
    }

    fn ricochet(&mut self, env: &mut Env<'_>, from: Coord) -> Result<(), CombatError> {
        let defender = self.state.defender;
        let radius = env.config.ricochet_radius;
        let candidates: Vec<Coord> = env
            .world
            .actors_near(from, radius)
            .into_iter()
            .filter(|&id| id != defender)
            .filter_map(|id| env.world.actor(id))
            .filter(|a| a.is_alive())
            .map(|a| a.position())
            .collect();
        if candidates.is_empty() {
            return Ok(());
        }
        let pick = env.rng.random2(candidates.len() as i32) as usize;
        let target = candidates[pick];
        tracing::debug!(%from, %target, "ricochet");
        env.say("The sling bullet ricochets!");
        env.world.place_effect(WorldEffect::Ricochet(Flight {
            item: Item::missile(MissileType::SlingBullet, 1),
            agent: self.state.attacker,
            source: from,
            target,
            range: radius,
            reflected: false,
        }));
        Ok(())
    }
}

impl AttackPhases for RangedAttack {
    fn state(&self) -> &AttackState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut AttackState {
        &mut self.state
    }

    fn calc_to_hit(&mut self, env: &mut Env<'_>, random: bool) -> Result<i32, CombatError> {
        let (attacker, defender) = (self.state.attacker, self.state.defender);
        if self.auto_hits() {
            return Ok(env.config.automatic_hit);
        }

        let mhit = base::base_to_hit(env, attacker, defender, false)?;
        let attacker_hd = env.actor(attacker)?.hit_dice();

        let rounded = if random {
            env.rng.rand_round(mhit)
        } else {
            mhit.round() as i32
        };
        let mut hit = f64::from(env.rng.maybe_random2(rounded, random));
        if hit as i32 >= env.config.automatic_hit {
            return Ok(env.config.automatic_hit);
        }

        if self.state.teleport {
            let scale = if attacker.is_player() {
                10 + env.world.player.portal_power / 4
            } else {
                10 + attacker_hd
            };
            hit = hit * f64::from(scale) / 10.0;
        }

        let lrange = self.range(env)?;
        if lrange > env.config.ranged_hard_cap {
            return Ok(0);
        }
        hit *= range_falloff(lrange);
        self.state.to_hit_unhindered = if random {
            env.rng.rand_round(hit)
        } else {
            hit.round() as i32
        };

        let defl = env.actor(defender)?.missile_deflection();
        if defl > 0 {
            hit = if random {
                f64::from(env.rng.random2(hit as i32 / defl))
            } else {
                (hit - 1.0) / f64::from(2 * defl)
            };
        }

        let (blockers, blocker) = self.hostile_blockers(env)?;
        hit *= blocker_penalty(blockers);
        self.state.blocker = blocker;
        tracing::trace!(lrange, defl, blockers, hit, "ranged to-hit");

        if hit <= 0.0 {
            return Ok(0);
        }
        Ok(if random {
            env.rng.rand_round(hit)
        } else {
            hit.round() as i32
        })
    }

    fn evasion(&mut self, env: &mut Env<'_>) -> Result<PhaseStep, CombatError> {
        let gate = env.config.erratic_gate;
        let def = env.actor(self.state.defender)?;
        let off_target = self.target != def.position();
        let erratic = def.traits().contains(ActorTraits::ERRATIC);
        let ev = def.evasion();
        let erratic_at_target = env
            .world
            .actor_at(self.target)
            .and_then(|id| env.world.actor(id))
            .is_some_and(|a| a.traits().contains(ActorTraits::ERRATIC));

        let st = &mut self.state;
        if erratic && (off_target || !self.aimed_at_spot) && !env.rng.one_in(gate) {
            st.ev_margin = -1000;
            st.unhindered_margin = -1000;
        } else if off_target && self.aimed_at_spot && erratic_at_target && !env.rng.one_in(gate) {
            st.ev_margin = -2000;
            st.unhindered_margin = -2000;
        } else {
            let margin = base::test_hit(&mut *env.rng, st.to_hit, ev, env.config.automatic_hit);
            st.ev_margin = margin;
            st.unhindered_margin = if st.to_hit >= env.config.automatic_hit {
                margin
            } else {
                margin + (st.to_hit_unhindered - st.to_hit.max(0))
            };
        }
        tracing::debug!(ev, margin = st.ev_margin, unhindered = st.unhindered_margin, "evasion");
        Ok(PhaseStep::Continue(Phase::ShieldBlock))
    }

    fn ignores_shield(&mut self, env: &mut Env<'_>) -> Result<bool, CombatError> {
        if self.penetrating() {
            return Ok(true);
        }
        let flaming = self
            .launcher
            .as_ref()
            .is_some_and(|l| l.weapon_brand() == WeaponBrand::Flaming);
        Ok(flaming && env.rng.coinflip())
    }

    fn hit(&mut self, env: &mut Env<'_>) -> Result<PhaseStep, CombatError> {
        self.state.did_hit = true;
        let (attacker, defender) = (self.state.attacker, self.state.defender);
        let missile = self.projectile.missile_type();

        match missile {
            Some(MissileType::Needle) => {
                let hd = env.actor(attacker)?.hit_dice();
                let brand = self.projectile.missile_brand();
                self.state.damage_done = blowgun_duration_roll(&mut *env.rng, hd, brand);
                self.set_attack_verb(0);
                self.announce_hit(env, 0)?;
                if apply_missile_brand(env, &mut self.state, &self.projectile)? {
                    return self.stop(env);
                }
            }
            Some(MissileType::ThrowingNet) => {
                self.set_attack_verb(0);
                self.announce_hit(env, 0)?;
                let def = env.actor_mut(defender)?;
                let held = def.status_duration(StatusKind::Caught).max(NET_HOLD);
                def.set_status_duration(StatusKind::Caught, held);
                self.state.obvious_effect = true;
            }
            _ => {
                let lrange = self.range(env)?;
                let what = self.projectile.the_name();
                while self.state.attack_count > 0 {
                    let bdam = self.calc_damage(env)?;
                    if bdam > 0 {
                        let mult = sweet_spot_multiplier(lrange, env.config.sweet_spot);
                        let damage = env.rng.div_rand_round(bdam * mult, 4);
                        self.state.damage_done = damage;
                        self.set_attack_verb(damage);
                        self.announce_hit(env, damage)?;
                        hurt(env, Some(attacker), defender, damage, Flavour::Physical)?;
                        self.state.strikes += 1;
                        if !env.actor(defender)?.is_alive() {
                            return self.stop(env);
                        }
                    } else {
                        self.state.damage_done = 0;
                        self.set_attack_verb(0);
                        let def = env.actor(defender)?.the_name();
                        let text = format!(
                            "{} {} {def} but does no damage.",
                            uppercase_first(&what),
                            self.state.attack_verb
                        );
                        env.say(&text);
                    }

                    if let Some(launcher) = &self.launcher {
                        if apply_weapon_brand(env, &mut self.state, launcher, Some(&what))? {
                            return self.stop(env);
                        }
                    }
                    if apply_missile_brand(env, &mut self.state, &self.projectile)? {
                        return self.stop(env);
                    }
                    if missile == Some(MissileType::Pie) {
                        self.pie_in_the_face(env)?;
                    }
                    self.state.attack_count -= 1;
                }
            }
        }

        let hit = HitInfo {
            attacker,
            defender,
            owner: defender,
            mondied: !env.actor(defender)?.is_alive(),
            damage: self.state.damage_done,
        };
        artifact::defender_armour_effects(env, &hit)?;
        self.stop(env)
    }

    fn dodged(&mut self, env: &mut Env<'_>) -> Result<PhaseStep, CombatError> {
        let (attacker, defender) = (self.state.attacker, self.state.defender);
        self.state.did_hit = false;
        let what = self.projectile.the_name();
        let def = env.actor(defender)?;
        let def_name = def.the_name();

        if self.state.ev_margin < -500 {
            let way = if self.state.ev_margin < -1500 {
                "over"
            } else {
                "under"
            };
            env.say(&format!("{} passes {way} {def_name}!", uppercase_first(&what)));
            return Ok(PhaseStep::Terminal(AttackResult::Dodged));
        }

        let defl = def.missile_deflection();
        let deflect_text = if defl >= 2 {
            format!(
                "{} {} {what}!",
                uppercase_first(&def_name),
                def.conj_verb("deflect")
            )
        } else {
            format!("{} is repelled.", uppercase_first(&what))
        };
        let unhindered_hit = self.state.unhindered_margin >= 0;

        if defl > 0
            && unhindered_hit
            && (self.state.blocker.is_none() || env.rng.coinflip())
        {
            env.say(&deflect_text);
            let def = env.actor_mut(defender)?;
            def.ablate_deflection();
            def.core_mut().dodges.deflect += 1;
            return Ok(PhaseStep::Terminal(AttackResult::Dodged));
        }

        let mut needs_message = true;
        if unhindered_hit {
            if let Some(blocker) = self.state.blocker.clone() {
                let att = env.actor(attacker)?;
                let text = if att.is_player() {
                    Some(format!("{} makes you miss your attack.", uppercase_first(&blocker)))
                } else if att.as_monster().is_some_and(|m| m.friendly()) {
                    Some(format!(
                        "{} makes {} miss {} attack.",
                        uppercase_first(&blocker),
                        att.the_name(),
                        att.pronoun_possessive()
                    ))
                } else {
                    None
                };
                if let Some(text) = text {
                    env.say(&text);
                }
                needs_message = false;
            }
        }

        env.actor_mut(defender)?.core_mut().dodges.evasion += 1;
        if needs_message {
            let text = format!(
                "{}{} misses {def_name}.",
                uppercase_first(&what),
                evasion_margin_adverb(self.state.ev_margin)
            );
            env.say(&text);
        }
        Ok(PhaseStep::Terminal(AttackResult::Dodged))
    }

    fn blocked(&mut self, env: &mut Env<'_>) -> Result<PhaseStep, CombatError> {
        let def = env.actor(self.state.defender)?;
        let reflecting_shield = def.shield().filter(|s| s.reflects());
        let mut verb = "block";
        let mut punctuation = ".".to_string();
        if let Some(shield) = reflecting_shield {
            verb = "reflect";
            punctuation = format!(" off {} {}!", def.pronoun_possessive(), shield.name());
        } else if def.reflection() {
            verb = "reflect";
            let them = if def.is_player() { "you" } else { "it" };
            punctuation = format!(" off an invisible shield around {them}!");
        }
        let text = format!(
            "{} {} {}{punctuation}",
            uppercase_first(&def.the_name()),
            def.conj_verb(verb),
            self.projectile.the_name()
        );
        let def_pos = def.position();
        env.say(&text);

        if verb == "reflect" {
            self.state.reflected = true;
            self.reflect(env, def_pos)?;
        } else {
            self.state.attack_count = 0;
        }
        self.range_used = BEAM_STOP;
        Ok(PhaseStep::Terminal(AttackResult::Blocked))
    }

    fn conclude(&mut self, env: &mut Env<'_>) -> Result<(), CombatError> {
        let att_pos = env.actor(self.state.attacker)?.position();
        let def = env.actor(self.state.defender)?;
        let def_pos = def.position();
        let live_monster = def.is_monster() && def.is_alive();
        let woody = def.as_monster().is_some_and(|m| m.is_firewood());
        let def_is_player = def.is_player();
        let remaining = env.config.vision_radius - att_pos.grid_distance(def_pos);
        let missile = self.projectile.missile_type();

        if missile.is_some_and(MissileType::is_multi_bolt)
            && !self.aimed_at_spot
            && live_monster
            && remaining >= 1
        {
            let kind = if self.state.attack_count > 1 {
                MissileType::DoubleBolt
            } else {
                MissileType::Bolt
            };
            let target = self.source + (self.target - self.source) * 5;
            tracing::debug!(%kind, remaining, "bolt continues");
            env.world.place_effect(WorldEffect::Projectile(Flight {
                item: Item::missile(kind, 1),
                agent: self.state.attacker,
                source: def_pos,
                target,
                range: remaining,
                reflected: false,
            }));
            self.range_used = BEAM_STOP;
        }

        if missile == Some(MissileType::SlingBullet)
            && !self.state.reflected
            && remaining >= 1
            && self.state.did_hit
            && env.rng.one_in(env.config.ricochet_chance)
            && (def_is_player || !woody)
        {
            self.ricochet(env, def_pos)?;
        }

        if !self.penetrating() && self.state.did_hit && self.state.attack_count <= 1 {
            self.range_used = BEAM_STOP;
        }

        // an explosive missile goes off on whatever it meets
        if self.state.did_hit || self.range_used == BEAM_STOP {
            if let Some(spec) = self.explosion.take() {
                self.range_used = BEAM_STOP;
                env.world.place_effect(WorldEffect::Explosion {
                    agent: self.state.attacker,
                    centre: def_pos,
                    name: spec.name,
                    dice: spec.dice,
                    flavour: spec.flavour,
                    radius: spec.radius,
                });
            }
        }
        Ok(())
    }

    fn outcome(&self, result: AttackResult) -> AttackOutcome {
        AttackOutcome {
            result,
            damage_done: self.state.damage_done,
            special_damage: self.state.special_damage,
            did_hit: self.state.did_hit,
            reflected: self.state.reflected,
            obvious_effect: self.state.obvious_effect,
            range_used: self.range_used,
            strikes: self.state.strikes,
        }
    }
}

/// Fire `projectile` from `attacker` at `defender`, letting the wielded
/// launcher's hook rewrite the shot first. `None` if the hook called it
/// off.
pub fn fire_missile(
    env: &mut Env<'_>,
    attacker: ActorId,
    defender: ActorId,
    projectile: Item,
) -> Result<Option<AttackOutcome>, CombatError> {
    let mut setup = LaunchSetup::new(attacker, projectile);
    if artifact::fire_launch(env, &mut setup)? == SetupMissile::Cancel {
        return Ok(None);
    }
    let mut attack = RangedAttack::from_launch(env, setup, defender)?;
    resolve(&mut attack, env).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Monster, Player};
    use crate::artifact::{HookRegistry, UnrandArtifact};
    use crate::config::CombatConfig;
    use crate::item::{ArmourEgo, ArmourType, EquipSlot, WeaponType};
    use crate::message::MessageLog;
    use crate::world::World;
    use cr_rng::{Bias, GameRng, RiggedRng};

    /// Goblin archer at (0, 5), orc at (5, 5), player out of the way.
    fn duel() -> (World, ActorId, ActorId) {
        let mut player = Player::new("Hero", 5, 30);
        player.core.pos = Coord::new(19, 19);
        let mut w = World::new(20, 20, player);
        let mut goblin = Monster::new(ActorId::default(), "goblin", 5, 20);
        goblin.core.pos = Coord::new(0, 5);
        let mut orc = Monster::new(ActorId::default(), "orc", 3, 30);
        orc.core.pos = Coord::new(5, 5);
        let a = w.add_monster(goblin);
        let d = w.add_monster(orc);
        (w, a, d)
    }

    #[test]
    fn test_range_falloff() {
        assert_eq!(range_falloff(1), 1.9);
        assert_eq!(range_falloff(9), 1.1);
    }

    #[test]
    fn test_blocker_penalty_steps() {
        assert_eq!(blocker_penalty(0), 0.8);
        assert_eq!(blocker_penalty(-2), 0.8);
        assert_eq!(blocker_penalty(1), 0.7);
        assert_eq!((100.0 * blocker_penalty(3)).round(), 50.0);
        assert_eq!(blocker_penalty(7), 0.2);
        assert_eq!(blocker_penalty(30), 0.2);
    }

    #[test]
    fn test_sweet_spot() {
        assert_eq!(sweet_spot_multiplier(5, 5), 5);
        assert_eq!(sweet_spot_multiplier(1, 5), 1);
        assert_eq!(sweet_spot_multiplier(3, 5), 3);
        assert_eq!(sweet_spot_multiplier(6, 5), 4);
        assert_eq!(sweet_spot_multiplier(9, 5), 3);
    }

    #[test]
    fn test_verbs() {
        assert_eq!(ranged_attack_verb(MissileType::Arrow, false, 3), "pokes");
        assert_eq!(ranged_attack_verb(MissileType::Arrow, false, 25), "impales");
        assert_eq!(ranged_attack_verb(MissileType::Bolt, true, 10), "pierces through");
        assert_eq!(ranged_attack_verb(MissileType::Tomahawk, false, 60), "mangles");
        assert_eq!(ranged_attack_verb(MissileType::Tomahawk, true, 30), "divides");
        assert_eq!(ranged_attack_verb(MissileType::Stone, false, 40), "crushes");
        assert_eq!(ranged_attack_verb(MissileType::Needle, false, 0), "jabs");
        assert_eq!(ranged_attack_verb(MissileType::ThrowingNet, false, 0), "ensnares");
    }

    #[test]
    fn test_penetration_sources() {
        let arrow = Item::missile(MissileType::Arrow, 1);
        assert!(!is_penetrating(&arrow, None));
        assert!(is_penetrating(&Item::missile(MissileType::Bolt, 1), None));
        let pen = arrow.clone().with_missile_brand(MissileBrand::Penetration);
        assert!(is_penetrating(&pen, None));

        let needle = Item::missile(MissileType::Needle, 1);
        let storm = Item::unrand(UnrandArtifact::StormBow);
        assert!(is_penetrating(&needle, Some(&storm)));
        // only zero-damage ammo rides the launcher's penetration
        assert!(!is_penetrating(&arrow, Some(&storm)));
    }

    #[test]
    fn test_new_rejects_non_missile_in_release() {
        if cfg!(debug_assertions) {
            return;
        }
        let (mut w, a, d) = duel();
        let mut rng = RiggedRng::new(Bias::Low);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let sword = Item::weapon(WeaponType::LongSword);
        assert!(matches!(
            RangedAttack::new(&env, a, d, sword),
            Err(CombatError::NotAMissile(_))
        ));
    }

    #[test]
    fn test_launcher_picked_up_only_for_its_ammo() {
        let (mut w, a, d) = duel();
        if let Some(m) = w.monster_mut(a) {
            m.core
                .equipment
                .put(EquipSlot::Weapon, Item::weapon(WeaponType::Shortbow));
        }
        let mut rng = RiggedRng::new(Bias::Low);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let shot = RangedAttack::new(&env, a, d, Item::missile(MissileType::Arrow, 1));
        assert!(shot.is_ok_and(|s| s.launcher().is_some()));
        let thrown = RangedAttack::new(&env, a, d, Item::missile(MissileType::Javelin, 1));
        assert!(thrown.is_ok_and(|s| s.launcher().is_none()));
    }

    #[test]
    fn test_out_of_range_always_misses() {
        let (mut w, a, d) = duel();
        if let Some(m) = w.monster_mut(d) {
            m.core.pos = Coord::new(10, 5);
        }
        let mut rng = GameRng::new(11);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        for _ in 0..20 {
            let mut shot = RangedAttack::new(&env, a, d, Item::missile(MissileType::Arrow, 1))
                .expect("arrow");
            assert_eq!(shot.calc_to_hit(&mut env, true), Ok(0));
            let outcome = resolve(&mut shot, &mut env).expect("resolves");
            assert_eq!(outcome.result, AttackResult::Dodged);
        }
        assert!(log.contains("misses the orc"));
    }

    #[test]
    fn test_deflection_narrated() {
        let (mut w, a, d) = duel();
        if let Some(m) = w.monster_mut(d) {
            m.core.deflection = 2;
            m.core.evasion = 30;
        }
        let mut rng = RiggedRng::new(Bias::High);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let mut shot =
            RangedAttack::new(&env, a, d, Item::missile(MissileType::Arrow, 1)).expect("arrow");
        let outcome = resolve(&mut shot, &mut env).expect("resolves");

        assert_eq!(outcome.result, AttackResult::Dodged);
        assert_eq!(outcome.damage_done, 0);
        assert!(log.contains("The orc deflects the arrow!"));
        let orc = w.monster(d).expect("orc");
        assert_eq!(orc.core.dodges.deflect, 1);
        assert_eq!(orc.core.hp, 30);
    }

    #[test]
    fn test_erratic_defender_slips_under() {
        let (mut w, a, d) = duel();
        if let Some(m) = w.monster_mut(d) {
            m.core.traits |= ActorTraits::ERRATIC;
        }
        let mut rng = RiggedRng::new(Bias::High);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let mut shot =
            RangedAttack::new(&env, a, d, Item::missile(MissileType::Arrow, 1)).expect("arrow");
        let outcome = resolve(&mut shot, &mut env).expect("resolves");

        assert_eq!(outcome.result, AttackResult::Dodged);
        assert_eq!(shot.state().ev_margin, -1000);
        assert_eq!(shot.state().unhindered_margin, -1000);
        assert!(log.contains("The arrow passes under the orc!"));
        assert_eq!(w.monster(d).map(|m| m.core.hp), Some(30));
    }

    #[test]
    fn test_erratic_target_square_sends_it_over() {
        let (mut w, a, d) = duel();
        let mut bat = Monster::new(ActorId::default(), "bat", 1, 4);
        bat.core.pos = Coord::new(4, 5);
        bat.core.traits |= ActorTraits::ERRATIC;
        w.add_monster(bat);
        let mut rng = RiggedRng::new(Bias::High);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let mut shot = RangedAttack::new(&env, a, d, Item::missile(MissileType::Arrow, 1))
            .expect("arrow")
            .aimed_at(Coord::new(4, 5));
        let outcome = resolve(&mut shot, &mut env).expect("resolves");

        assert_eq!(outcome.result, AttackResult::Dodged);
        assert_eq!(shot.state().ev_margin, -2000);
        assert!(log.contains("The arrow passes over the orc!"));
    }

    #[test]
    fn test_erratic_gate_lets_the_shot_through() {
        let (mut w, a, d) = duel();
        if let Some(m) = w.monster_mut(d) {
            m.core.traits |= ActorTraits::ERRATIC;
        }
        // the first roll is the 1 in erratic_gate escape
        let mut rng = RiggedRng::with_script(Bias::High, &[0]);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let mut shot =
            RangedAttack::new(&env, a, d, Item::missile(MissileType::Arrow, 1)).expect("arrow");
        shot.state_mut().to_hit = 12;
        let step = shot.evasion(&mut env).expect("evasion");

        assert_eq!(step, PhaseStep::Continue(Phase::ShieldBlock));
        // orc has no evasion, so the whole to-hit is margin
        assert_eq!(shot.state().ev_margin, 12);
        assert_eq!(rng.remaining(), 0);
        assert!(log.is_empty());
    }

    #[test]
    fn test_reflective_shield_sends_it_back() {
        let (mut w, a, d) = duel();
        if let Some(m) = w.monster_mut(d) {
            let shield = Item::armour(ArmourType::TowerShield)
                .with_ego(ArmourEgo::Reflection)
                .with_plus(10);
            m.core.equipment.put(EquipSlot::Offhand, shield);
        }
        let mut rng = RiggedRng::new(Bias::High);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let mut shot =
            RangedAttack::new(&env, a, d, Item::missile(MissileType::Arrow, 1)).expect("arrow");
        let outcome = resolve(&mut shot, &mut env).expect("resolves");

        assert_eq!(outcome.result, AttackResult::Blocked);
        assert!(outcome.reflected);
        assert_eq!(outcome.range_used, BEAM_STOP);
        assert!(log.contains("The orc reflects the arrow off its tower shield!"));
        assert!(w.pending_effects().iter().any(|e| matches!(
            e,
            WorldEffect::Projectile(f) if f.reflected && f.target == Coord::new(0, 5)
        )));
    }

    #[test]
    fn test_lethal_hit_stops_the_arrow() {
        let (mut w, a, d) = duel();
        if let Some(m) = w.monster_mut(d) {
            m.core.hp = 1;
        }
        let mut rng = RiggedRng::new(Bias::High);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let mut shot =
            RangedAttack::new(&env, a, d, Item::missile(MissileType::Arrow, 1)).expect("arrow");
        let outcome = resolve(&mut shot, &mut env).expect("resolves");

        assert_eq!(outcome.result, AttackResult::Killed);
        assert!(outcome.did_hit);
        assert_eq!(outcome.strikes, 1);
        assert_eq!(outcome.range_used, BEAM_STOP);
        assert_eq!(w.deaths.len(), 1);
        assert_eq!(w.deaths[0].killer, Some(a));
    }

    #[test]
    fn test_net_ensnares() {
        let (mut w, a, d) = duel();
        let mut rng = RiggedRng::new(Bias::High);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let net = Item::missile(MissileType::ThrowingNet, 1);
        let mut shot = RangedAttack::new(&env, a, d, net).expect("net");
        let outcome = resolve(&mut shot, &mut env).expect("resolves");

        assert_eq!(outcome.result, AttackResult::Hit);
        assert!(log.contains("The throwing net ensnares the orc."));
        assert!(w.monster(d).expect("orc").incapacitated());
    }

    #[test]
    fn test_triple_bolt_continues() {
        let (mut w, a, d) = duel();
        if let Some(m) = w.monster_mut(d) {
            m.core.hp = 500;
            m.core.max_hp = 500;
            m.core.pos = Coord::new(3, 5);
        }
        let mut rng = RiggedRng::new(Bias::High);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let bolt = Item::missile(MissileType::TripleBolt, 1);
        let mut shot = RangedAttack::new(&env, a, d, bolt).expect("bolt");
        let outcome = resolve(&mut shot, &mut env).expect("resolves");

        assert_eq!(outcome.result, AttackResult::Hit);
        assert_eq!(outcome.strikes, 3);
        let flight = w.pending_effects().iter().find_map(|e| match e {
            WorldEffect::Projectile(f) => Some(f.clone()),
            _ => None,
        });
        let flight = flight.expect("continuation");
        assert_eq!(flight.item.missile_type(), Some(MissileType::Bolt));
        assert_eq!(flight.source, Coord::new(3, 5));
        assert_eq!(flight.target, Coord::new(15, 5));
        assert_eq!(flight.range, 4);
    }

    #[test]
    fn test_sling_bullet_ricochet() {
        let (mut w, a, d) = duel();
        if let Some(m) = w.monster_mut(d) {
            m.core.hp = 500;
            m.core.max_hp = 500;
        }
        let mut bystander = Monster::new(ActorId::default(), "rat", 1, 3);
        bystander.core.pos = Coord::new(6, 6);
        w.add_monster(bystander);
        let mut rng = RiggedRng::new(Bias::Low);
        let mut log = MessageLog::new();
        let config = CombatConfig {
            ricochet_chance: 1,
            ..CombatConfig::default()
        };
        let hooks = HookRegistry::empty();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let mut shot = RangedAttack::new(&env, a, d, Item::missile(MissileType::SlingBullet, 1))
            .expect("bullet");
        // conclude on its own: pretend the bullet connected
        shot.state_mut().did_hit = true;
        shot.conclude(&mut env).expect("concludes");

        assert!(log.contains("The sling bullet ricochets!"));
        let bounce = w.pending_effects().iter().find_map(|e| match e {
            WorldEffect::Ricochet(f) => Some(f.clone()),
            _ => None,
        });
        let bounce = bounce.expect("ricochet");
        assert_eq!(bounce.target, Coord::new(6, 6));
        assert_eq!(bounce.range, 3);
    }

    #[test]
    fn test_damnation_explodes_where_it_stops() {
        let (mut w, a, d) = duel();
        if let Some(m) = w.monster_mut(a) {
            m.core
                .equipment
                .put(EquipSlot::Weapon, Item::unrand(UnrandArtifact::Damnation));
        }
        let mut rng = RiggedRng::new(Bias::High);
        let mut log = MessageLog::new();
        let config = CombatConfig::default();
        let hooks = HookRegistry::standard();
        let mut env = Env::new(&mut w, &mut rng, &mut log, &config, &hooks);
        let outcome = fire_missile(&mut env, a, d, Item::missile(MissileType::Bolt, 1))
            .expect("fires")
            .expect("not cancelled");

        assert!(outcome.did_hit);
        assert_eq!(outcome.range_used, BEAM_STOP);
        assert!(log.contains("The damnation bolt"));
        assert!(w.pending_effects().iter().any(|e| matches!(
            e,
            WorldEffect::Explosion { flavour: Flavour::Damnation, centre, .. } if *centre == Coord::new(5, 5)
        )));
    }
}
