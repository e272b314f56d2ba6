//! One player against one monster, round by round
//!
//! The player shoots while there is distance between them and fights in
//! melee once the monster closes in. The monster walks straight at the
//! player and hits it when adjacent.

use serde::Serialize;
use strum::IntoEnumIterator;

use cr_core::actor::{Actor, ActorId, Monster, Player};
use cr_core::artifact::{self, HookRegistry, UnrandArtifact};
use cr_core::combat::{self, AttackOutcome, AttackResult, fire_missile};
use cr_core::config::CombatConfig;
use cr_core::item::{EquipSlot, Item, ItemKind, MissileType, WeaponType};
use cr_core::message::MessageSink;
use cr_core::world::{Coord, World};
use cr_core::{BASELINE_DELAY, CombatError, Env, RandomSource};

/// Setup for a single duel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuelSetup {
    pub max_rounds: u32,
    /// Starting distance between the two
    pub distance: i32,
    pub player_level: i32,
    pub player_hp: i32,
    pub weapon: Option<WeaponType>,
    pub artifact: Option<UnrandArtifact>,
    pub monster_name: String,
    pub monster_hd: i32,
    pub monster_hp: i32,
}

impl Default for DuelSetup {
    fn default() -> Self {
        Self {
            max_rounds: 100,
            distance: 6,
            player_level: 10,
            player_hp: 60,
            weapon: Some(WeaponType::Shortbow),
            artifact: None,
            monster_name: "orc warrior".to_string(),
            monster_hd: 6,
            monster_hp: 45,
        }
    }
}

/// Attack results for one side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub attacks: u32,
    pub hits: u32,
    pub dodged: u32,
    pub blocked: u32,
    pub kills: u32,
    pub damage: i32,
    pub reflected: u32,
}

impl Tally {
    fn record(&mut self, outcome: &AttackOutcome) {
        self.attacks += 1;
        match outcome.result {
            AttackResult::Hit => self.hits += 1,
            AttackResult::Killed => {
                self.hits += 1;
                self.kills += 1;
            }
            AttackResult::Dodged => self.dodged += 1,
            AttackResult::Blocked => self.blocked += 1,
            AttackResult::Invalid => {}
        }
        if outcome.reflected {
            self.reflected += 1;
        }
        self.damage += outcome.damage_done + outcome.special_damage;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Player,
    Monster,
    Nobody,
}

/// What happened, ready to print as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuelSummary {
    pub rounds: u32,
    pub winner: Winner,
    pub player_hp: i32,
    pub monster_hp: i32,
    pub player: Tally,
    pub monster: Tally,
    /// Follow-up effects queued for the caller
    pub world_effects: usize,
}

/// Ammunition the launcher takes, or javelins to throw by hand.
fn ammo_for(launcher: Option<&Item>) -> Item {
    let missile = launcher
        .and_then(Item::weapon_type)
        .and_then(|w| MissileType::iter().find(|m| w.launches(*m)))
        .unwrap_or(MissileType::Javelin);
    Item::missile(missile, 1)
}

fn slot_for(item: &Item) -> EquipSlot {
    match item.kind {
        ItemKind::Armour { .. } if item.is_shield() => EquipSlot::Offhand,
        ItemKind::Armour { .. } => EquipSlot::Body,
        _ => EquipSlot::Weapon,
    }
}

/// Step `from` one square toward `to`.
fn step_toward(from: Coord, to: Coord) -> Coord {
    Coord::new(from.x + (to.x - from.x).signum(), from.y + (to.y - from.y).signum())
}

fn build_world(setup: &DuelSetup) -> (World, ActorId) {
    let size = setup.distance.max(1) + 4;
    let mut player = Player::new("Hero", setup.player_level, setup.player_hp);
    player.core.pos = Coord::new(1, 1);
    player.strength = 14;
    player.dexterity = 14;
    player.fighting_skill = setup.player_level / 2;
    player.ranged_skill = setup.player_level / 2;
    if let Some(weapon) = setup.weapon {
        player.core.equipment.put(EquipSlot::Weapon, Item::weapon(weapon));
    }
    let mut world = World::new(size, 3, player);
    let mut monster = Monster::new(ActorId::default(), &setup.monster_name, setup.monster_hd, setup.monster_hp);
    monster.core.pos = Coord::new(1 + setup.distance.max(1), 1);
    monster.attack_damage = setup.monster_hd * 2;
    let id = world.add_monster(monster);
    (world, id)
}

/// Fight it out. Narration goes to `messages`.
pub fn run_duel(
    setup: &DuelSetup,
    rng: &mut dyn RandomSource,
    messages: &mut dyn MessageSink,
    config: &CombatConfig,
    hooks: &HookRegistry,
) -> Result<DuelSummary, CombatError> {
    let (mut world, foe) = build_world(setup);
    let mut env = Env::new(&mut world, rng, messages, config, hooks);

    if let Some(art) = setup.artifact {
        let item = Item::unrand(art);
        let mut show_msgs = true;
        artifact::equip_item(&mut env, ActorId::PLAYER, slot_for(&item), item, &mut show_msgs, false)?;
    }

    let mut summary = DuelSummary {
        rounds: 0,
        winner: Winner::Nobody,
        player_hp: 0,
        monster_hp: 0,
        player: Tally::default(),
        monster: Tally::default(),
        world_effects: 0,
    };

    for round in 1..=setup.max_rounds {
        summary.rounds = round;

        let player_pos = env.actor(ActorId::PLAYER)?.position();
        let foe_pos = env.actor(foe)?.position();
        let outcome = if player_pos.is_adjacent(foe_pos) {
            Some(combat::melee(&mut env, ActorId::PLAYER, foe)?)
        } else {
            let ammo = ammo_for(env.actor(ActorId::PLAYER)?.weapon());
            fire_missile(&mut env, ActorId::PLAYER, foe, ammo)?
        };
        if let Some(outcome) = outcome {
            tracing::debug!(round, result = %outcome.result, damage = outcome.damage_done, "player attack");
            summary.player.record(&outcome);
        }
        artifact::world_reacts(&mut env, ActorId::PLAYER, BASELINE_DELAY)?;
        summary.world_effects += env.world.take_effects().len();

        if !env.actor(foe)?.is_alive() {
            summary.winner = Winner::Player;
            break;
        }

        let foe_pos = env.actor(foe)?.position();
        let player_pos = env.actor(ActorId::PLAYER)?.position();
        if foe_pos.is_adjacent(player_pos) {
            let outcome = combat::melee(&mut env, foe, ActorId::PLAYER)?;
            tracing::debug!(round, result = %outcome.result, damage = outcome.damage_done, "monster attack");
            summary.monster.record(&outcome);
        } else if !env.actor(foe)?.incapacitated() {
            let next = step_toward(foe_pos, player_pos);
            if env.world.is_free(next) {
                env.actor_mut(foe)?.set_position(next);
            }
        }
        summary.world_effects += env.world.take_effects().len();

        if !env.actor(ActorId::PLAYER)?.is_alive() {
            summary.winner = Winner::Monster;
            break;
        }
    }

    summary.player_hp = env.actor(ActorId::PLAYER)?.hit_points();
    summary.monster_hp = env.actor(foe)?.hit_points();
    tracing::info!(rounds = summary.rounds, winner = ?summary.winner, "duel over");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cr_core::message::MessageLog;
    use cr_core::{Bias, GameRng, RiggedRng};

    #[test]
    fn test_ammo_follows_launcher() {
        let bow = Item::weapon(WeaponType::Shortbow);
        assert_eq!(ammo_for(Some(&bow)).missile_type(), Some(MissileType::Arrow));
        let sling = Item::weapon(WeaponType::Sling);
        assert_eq!(ammo_for(Some(&sling)).missile_type(), Some(MissileType::SlingBullet));
        assert_eq!(ammo_for(None).missile_type(), Some(MissileType::Javelin));
    }

    #[test]
    fn test_step_toward() {
        assert_eq!(step_toward(Coord::new(7, 1), Coord::new(1, 1)), Coord::new(6, 1));
        assert_eq!(step_toward(Coord::new(2, 2), Coord::new(2, 2)), Coord::new(2, 2));
    }

    #[test]
    fn test_same_seed_same_duel() {
        let setup = DuelSetup::default();
        let config = CombatConfig::default();
        let hooks = HookRegistry::standard();
        let mut first = MessageLog::new();
        let mut second = MessageLog::new();
        let a = run_duel(&setup, &mut GameRng::new(42), &mut first, &config, &hooks).expect("duel");
        let b = run_duel(&setup, &mut GameRng::new(42), &mut second, &config, &hooks).expect("duel");
        assert_eq!(a, b);
        assert_eq!(first.messages(), second.messages());
    }

    #[test]
    fn test_round_limit_respected() {
        let setup = DuelSetup {
            max_rounds: 3,
            monster_hp: 10_000,
            ..DuelSetup::default()
        };
        let config = CombatConfig::default();
        let hooks = HookRegistry::empty();
        let mut log = MessageLog::new();
        let summary =
            run_duel(&setup, &mut RiggedRng::new(Bias::High), &mut log, &config, &hooks).expect("duel");
        assert_eq!(summary.rounds, 3);
        assert_eq!(summary.winner, Winner::Nobody);
        assert_eq!(summary.player.attacks, 3);
    }
}
