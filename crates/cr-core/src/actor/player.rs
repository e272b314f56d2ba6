//! The player character

use serde::{Deserialize, Serialize};

use super::{Actor, ActorCore, ActorId, Attitude};

/// The player. Exactly one exists, owned by the world under
/// [`ActorId::PLAYER`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Player {
    pub core: ActorCore,
    pub experience_level: i32,
    pub strength: i32,
    pub dexterity: i32,
    /// Skill levels, 0 to 27
    pub fighting_skill: i32,
    pub ranged_skill: i32,
    pub evocations_skill: i32,
    pub magic_points: i32,
    pub max_magic_points: i32,
    /// Portal projectile power; boosts teleported shots
    pub portal_power: i32,
}

impl Player {
    pub fn new(name: &str, experience_level: i32, hp: i32) -> Self {
        let mut core = ActorCore::new(ActorId::PLAYER, name, experience_level, hp);
        core.attitude = Attitude::Friendly;
        Self {
            core,
            experience_level,
            strength: 10,
            dexterity: 10,
            ..Self::default()
        }
    }

    /// Base accuracy before the attack adds situational modifiers.
    pub fn base_to_hit(&self, melee: bool) -> f64 {
        let mut mhit = f64::from(6 + (2 * self.dexterity / 3).max(-1));
        let skill = if melee {
            self.fighting_skill
        } else {
            self.ranged_skill
        };
        mhit *= f64::from(2700 + skill * 300 + self.fighting_skill * 100);
        mhit /= 2700.0;
        mhit
    }
}

impl Actor for Player {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn is_player(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_handle() {
        let p = Player::new("Hero", 7, 40);
        assert_eq!(p.id(), ActorId::PLAYER);
        assert!(p.is_player());
        assert_eq!(p.hit_dice(), 7);
        assert_eq!(p.attitude(), Attitude::Friendly);
    }

    #[test]
    fn test_base_to_hit_grows_with_skill() {
        let mut p = Player::new("Hero", 1, 10);
        let unskilled = p.base_to_hit(false);
        p.ranged_skill = 10;
        assert!(p.base_to_hit(false) > unskilled);
        // dex 10: 6 + 6 = 12
        assert!((unskilled - 12.0).abs() < f64::EPSILON);
    }
}
