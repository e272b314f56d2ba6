//! Monsters

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::{Actor, ActorCore, ActorId, ActorTraits, Attitude, StatusKind};

/// What a monster is currently doing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum Behaviour {
    Sleep = 0,
    #[default]
    Wander = 1,
    /// Hunting its foe
    Seek = 2,
    Flee = 3,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Monster {
    pub core: ActorCore,
    pub behaviour: Behaviour,
    pub foe: Option<ActorId>,
    /// Flat bonus to the monster's attack damage
    pub attack_damage: i32,
}

impl Monster {
    pub fn new(id: ActorId, name: &str, hit_dice: i32, hp: i32) -> Self {
        Self {
            core: ActorCore::new(id, name, hit_dice, hp),
            ..Self::default()
        }
    }

    pub fn friendly(&self) -> bool {
        self.core.attitude == Attitude::Friendly
    }

    pub fn is_archer(&self) -> bool {
        self.core.traits.contains(ActorTraits::ARCHER)
    }

    pub fn is_fighter(&self) -> bool {
        self.core.traits.contains(ActorTraits::FIGHTER)
    }

    pub fn is_firewood(&self) -> bool {
        self.core.traits.contains(ActorTraits::FIREWOOD)
    }

    /// Base accuracy for an attack of the given kind.
    pub fn base_to_hit(&self, ranged: bool) -> f64 {
        let mut mhit = f64::from(16 + self.core.hit_dice * 2);
        if (ranged && self.is_archer()) || (!ranged && self.is_fighter()) {
            mhit *= 2.0;
        }
        mhit
    }

    /// Wake up and go after `foe`.
    pub fn alert(&mut self, foe: ActorId) {
        self.behaviour = Behaviour::Seek;
        self.foe = Some(foe);
    }
}

impl Actor for Monster {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn is_player(&self) -> bool {
        false
    }

    fn as_monster(&self) -> Option<&Monster> {
        Some(self)
    }

    fn as_monster_mut(&mut self) -> Option<&mut Monster> {
        Some(self)
    }

    fn put_to_sleep(&mut self, power: i32) -> bool {
        if self.has_status(StatusKind::Berserk) {
            return false;
        }
        let slept = self.core.status.increase(StatusKind::Sleep, power.max(1), 100);
        if slept {
            self.behaviour = Behaviour::Sleep;
        }
        slept
    }

    fn go_berserk(&mut self) -> bool {
        if !self.can_go_berserk() {
            return false;
        }
        if self.behaviour == Behaviour::Sleep {
            self.behaviour = Behaviour::Wander;
        }
        self.core.status.set(StatusKind::Sleep, 0);
        self.core.status.increase(StatusKind::Berserk, 10, 30)
    }
}
