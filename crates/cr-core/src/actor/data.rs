//! Data shared by every actor

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter};

use super::ActorId;
use crate::item::Equipment;
use crate::world::Coord;

bitflags! {
    /// What an actor fundamentally is. Several brands key off this.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Holiness: u8 {
        const NATURAL = 0x01;
        const UNDEAD = 0x02;
        const DEMONIC = 0x04;
        const NONLIVING = 0x08;
        const PLANT = 0x10;
        const HOLY = 0x20;
    }
}

bitflags! {
    /// Fixed traits that change how attacks and brands land.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ActorTraits: u32 {
        /// Made of fire (flame brands wasted)
        const FIERY = 0x0001;
        /// Made of ice (frost brands wasted)
        const ICY = 0x0002;
        /// Cannot be teleported or blinked
        const STASIS = 0x0004;
        /// Cannot berserk or frenzy
        const NO_BERSERK = 0x0008;
        /// Lurks on the ceiling; shots not aimed at it mostly pass by
        const ERRATIC = 0x0010;
        /// Innate missile reflection
        const REFLECTIVE = 0x0020;
        const DRAGONKIND = 0x0040;
        /// Never moves
        const STATIONARY = 0x0080;
        /// Inert obstacle (plants, fungi); never blocks a shot
        const FIREWOOD = 0x0100;
        /// Touched by chaos; silver hurts it
        const CHAOTIC = 0x0200;
        const SUMMONED = 0x0400;
        /// Does not breathe; curare has nothing to work on
        const UNBREATHING = 0x0800;
        /// Skilled with launchers (monsters)
        const ARCHER = 0x1000;
        /// Skilled with melee weapons (monsters)
        const FIGHTER = 0x2000;
        /// Sees through umbra and darkness
        const NIGHTVISION = 0x4000;
    }
}

/// Timed status effects. Durations are in time units; a normal turn
/// takes [`crate::BASELINE_DELAY`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumCount,
)]
#[repr(u8)]
pub enum StatusKind {
    Poison = 0,
    Confusion = 1,
    Slow = 2,
    Haste = 3,
    Frozen = 4,
    Sleep = 5,
    Paralysis = 6,
    Petrifying = 7,
    Petrified = 8,
    Berserk = 9,
    Blind = 10,
    /// Tangled in a net
    Caught = 11,
    FireVulnerable = 12,
    /// Explodes into flame on death
    InnerFlame = 13,
    Invisible = 14,
    Might = 15,
    Agility = 16,
    Drained = 17,
}

/// Current value of every [`StatusKind`]; zero means inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusTable([i32; StatusKind::COUNT]);

impl StatusTable {
    pub fn get(&self, kind: StatusKind) -> i32 {
        self.0[kind as usize]
    }

    pub fn set(&mut self, kind: StatusKind, value: i32) {
        self.0[kind as usize] = value.max(0);
    }

    /// Add to a duration, clamped to `cap`. Returns true if it grew.
    pub fn increase(&mut self, kind: StatusKind, amount: i32, cap: i32) -> bool {
        let old = self.get(kind);
        let new = (old + amount.max(0)).min(cap.max(old));
        self.set(kind, new);
        new > old
    }

    pub fn is_active(&self, kind: StatusKind) -> bool {
        self.get(kind) > 0
    }

    /// Count every duration down by `turns`.
    pub fn tick(&mut self, turns: i32) {
        for v in &mut self.0 {
            *v = (*v - turns).max(0);
        }
    }
}

/// Elemental resistance levels. Negative is a vulnerability, 3 is immunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resists {
    pub fire: i32,
    pub cold: i32,
    pub elec: i32,
    pub poison: i32,
}

/// Disposition toward the player.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum Attitude {
    #[default]
    Hostile = 0,
    Neutral = 1,
    Friendly = 2,
}

/// Tallies of how attacks against this actor were avoided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DodgeCounts {
    /// Stopped by missile deflection
    pub deflect: u32,
    /// Plain evasion
    pub evasion: u32,
}

/// State common to the player and monsters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorCore {
    pub id: ActorId,
    pub name: String,
    pub pos: Coord,
    pub hp: i32,
    pub max_hp: i32,
    pub hit_dice: i32,
    pub evasion: i32,
    pub armour_class: i32,
    /// Penalty added to an attacker's side of the shield roll
    pub shield_penalty: i32,
    /// Missile deflection level (0 = none)
    pub deflection: i32,
    /// Hits left before deflection wears off; 0 means permanent
    pub deflection_charges: i32,
    pub holiness: Holiness,
    pub traits: ActorTraits,
    pub resists: Resists,
    pub status: StatusTable,
    pub attitude: Attitude,
    pub equipment: Equipment,
    pub dodges: DodgeCounts,
    /// Last actor this one attacked
    pub last_target: Option<ActorId>,
    /// Last actor that attacked this one
    pub last_attacker: Option<ActorId>,
}

impl ActorCore {
    pub fn new(id: ActorId, name: &str, hit_dice: i32, hp: i32) -> Self {
        Self {
            id,
            name: name.to_string(),
            hp,
            max_hp: hp,
            hit_dice,
            holiness: Holiness::NATURAL,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_increase_capped() {
        let mut table = StatusTable::default();
        assert!(table.increase(StatusKind::Poison, 10, 15));
        assert!(table.increase(StatusKind::Poison, 10, 15));
        assert_eq!(table.get(StatusKind::Poison), 15);
        assert!(!table.increase(StatusKind::Poison, 10, 15));
    }

    #[test]
    fn test_status_cap_never_lowers() {
        let mut table = StatusTable::default();
        table.set(StatusKind::Slow, 40);
        assert!(!table.increase(StatusKind::Slow, 5, 20));
        assert_eq!(table.get(StatusKind::Slow), 40);
    }

    #[test]
    fn test_status_tick() {
        let mut table = StatusTable::default();
        table.set(StatusKind::Blind, 3);
        table.set(StatusKind::Haste, 1);
        table.tick(2);
        assert_eq!(table.get(StatusKind::Blind), 1);
        assert!(!table.is_active(StatusKind::Haste));
    }

    #[test]
    fn test_status_set_clamps_negative() {
        let mut table = StatusTable::default();
        table.set(StatusKind::Sleep, -4);
        assert_eq!(table.get(StatusKind::Sleep), 0);
    }
}
