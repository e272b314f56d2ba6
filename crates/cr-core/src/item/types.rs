//! Base item types

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Weapons, both melee and launchers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum WeaponType {
    Club = 0,
    Dagger = 1,
    ShortSword = 2,
    #[default]
    LongSword = 3,
    GreatSword = 4,
    TripleSword = 5,
    Mace = 6,
    WarAxe = 7,
    Scythe = 8,
    DemonWhip = 9,
    Quarterstaff = 10,
    Sling = 20,
    Shortbow = 21,
    Longbow = 22,
    HandCrossbow = 23,
    Arbalest = 24,
}

impl WeaponType {
    /// Base damage added to the projectile or swing.
    pub const fn damage(self) -> i32 {
        match self {
            WeaponType::Club => 5,
            WeaponType::Dagger => 4,
            WeaponType::ShortSword => 6,
            WeaponType::LongSword => 10,
            WeaponType::GreatSword => 17,
            WeaponType::TripleSword => 19,
            WeaponType::Mace => 8,
            WeaponType::WarAxe => 11,
            WeaponType::Scythe => 14,
            WeaponType::DemonWhip => 11,
            WeaponType::Quarterstaff => 10,
            WeaponType::Sling => 5,
            WeaponType::Shortbow => 8,
            WeaponType::Longbow => 14,
            WeaponType::HandCrossbow => 12,
            WeaponType::Arbalest => 16,
        }
    }

    pub const fn is_launcher(self) -> bool {
        matches!(
            self,
            WeaponType::Sling
                | WeaponType::Shortbow
                | WeaponType::Longbow
                | WeaponType::HandCrossbow
                | WeaponType::Arbalest
        )
    }

    /// Whether this launcher fires `missile`.
    pub const fn launches(self, missile: MissileType) -> bool {
        match self {
            WeaponType::Sling => matches!(missile, MissileType::SlingBullet | MissileType::Stone),
            WeaponType::Shortbow | WeaponType::Longbow => matches!(missile, MissileType::Arrow),
            WeaponType::HandCrossbow | WeaponType::Arbalest => matches!(
                missile,
                MissileType::Bolt | MissileType::DoubleBolt | MissileType::TripleBolt
            ),
            _ => false,
        }
    }

    pub const fn base_name(self) -> &'static str {
        match self {
            WeaponType::Club => "club",
            WeaponType::Dagger => "dagger",
            WeaponType::ShortSword => "short sword",
            WeaponType::LongSword => "long sword",
            WeaponType::GreatSword => "great sword",
            WeaponType::TripleSword => "triple sword",
            WeaponType::Mace => "mace",
            WeaponType::WarAxe => "war axe",
            WeaponType::Scythe => "scythe",
            WeaponType::DemonWhip => "demon whip",
            WeaponType::Quarterstaff => "quarterstaff",
            WeaponType::Sling => "sling",
            WeaponType::Shortbow => "shortbow",
            WeaponType::Longbow => "longbow",
            WeaponType::HandCrossbow => "hand crossbow",
            WeaponType::Arbalest => "arbalest",
        }
    }
}

/// Thrown or launched ammunition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum MissileType {
    Dart = 0,
    /// Delivers its brand; does no damage of its own
    Needle = 1,
    #[default]
    Arrow = 2,
    Bolt = 3,
    DoubleBolt = 4,
    TripleBolt = 5,
    Javelin = 6,
    Tomahawk = 7,
    SlingBullet = 8,
    Stone = 9,
    LargeRock = 10,
    ThrowingNet = 11,
    Pie = 12,
}

impl MissileType {
    pub const fn damage(self) -> i32 {
        match self {
            MissileType::Dart => 2,
            MissileType::Needle => 0,
            MissileType::Arrow => 7,
            MissileType::Bolt | MissileType::DoubleBolt | MissileType::TripleBolt => 10,
            MissileType::Javelin => 10,
            MissileType::Tomahawk => 6,
            MissileType::SlingBullet => 8,
            MissileType::Stone => 2,
            MissileType::LargeRock => 20,
            MissileType::ThrowingNet => 0,
            MissileType::Pie => 0,
        }
    }

    /// Strikes per hit.
    pub const fn attack_count(self) -> i32 {
        match self {
            MissileType::TripleBolt => 3,
            MissileType::DoubleBolt => 2,
            _ => 1,
        }
    }

    /// Multi-strike bolts that keep flying after they connect.
    pub const fn is_multi_bolt(self) -> bool {
        matches!(self, MissileType::DoubleBolt | MissileType::TripleBolt)
    }

    /// Pointed shafts, for attack verbs.
    pub const fn is_bolt_like(self) -> bool {
        matches!(
            self,
            MissileType::Arrow
                | MissileType::Bolt
                | MissileType::DoubleBolt
                | MissileType::TripleBolt
                | MissileType::Javelin
        )
    }

    pub const fn base_name(self) -> &'static str {
        match self {
            MissileType::Dart => "dart",
            MissileType::Needle => "needle",
            MissileType::Arrow => "arrow",
            MissileType::Bolt => "bolt",
            MissileType::DoubleBolt => "double bolt",
            MissileType::TripleBolt => "triple bolt",
            MissileType::Javelin => "javelin",
            MissileType::Tomahawk => "tomahawk",
            MissileType::SlingBullet => "sling bullet",
            MissileType::Stone => "stone",
            MissileType::LargeRock => "large rock",
            MissileType::ThrowingNet => "throwing net",
            MissileType::Pie => "cream pie",
        }
    }
}

/// Body armour and shields.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum ArmourType {
    Robe = 0,
    #[default]
    LeatherArmour = 1,
    PlateArmour = 2,
    DragonScales = 3,
    Buckler = 10,
    KiteShield = 11,
    TowerShield = 12,
}

impl ArmourType {
    pub const fn is_shield(self) -> bool {
        matches!(
            self,
            ArmourType::Buckler | ArmourType::KiteShield | ArmourType::TowerShield
        )
    }

    /// Armour class, or block strength for shields.
    pub const fn base_ac(self) -> i32 {
        match self {
            ArmourType::Robe => 2,
            ArmourType::LeatherArmour => 3,
            ArmourType::PlateArmour => 10,
            ArmourType::DragonScales => 8,
            ArmourType::Buckler => 3,
            ArmourType::KiteShield => 8,
            ArmourType::TowerShield => 13,
        }
    }

    pub const fn base_name(self) -> &'static str {
        match self {
            ArmourType::Robe => "robe",
            ArmourType::LeatherArmour => "leather armour",
            ArmourType::PlateArmour => "plate armour",
            ArmourType::DragonScales => "dragon scales",
            ArmourType::Buckler => "buckler",
            ArmourType::KiteShield => "kite shield",
            ArmourType::TowerShield => "tower shield",
        }
    }
}

/// Special property of a piece of armour.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum ArmourEgo {
    #[default]
    Normal = 0,
    Reflection = 1,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_launchers() {
        for wpn in WeaponType::iter() {
            let fires_something = MissileType::iter().any(|m| wpn.launches(m));
            assert_eq!(fires_something, wpn.is_launcher(), "{wpn}");
        }
        assert!(WeaponType::Arbalest.launches(MissileType::TripleBolt));
        assert!(!WeaponType::Longbow.launches(MissileType::Bolt));
    }

    #[test]
    fn test_attack_counts() {
        assert_eq!(MissileType::TripleBolt.attack_count(), 3);
        assert_eq!(MissileType::DoubleBolt.attack_count(), 2);
        assert_eq!(MissileType::Arrow.attack_count(), 1);
        assert!(MissileType::TripleBolt.is_multi_bolt());
        assert!(!MissileType::Bolt.is_multi_bolt());
    }

    #[test]
    fn test_shields() {
        assert!(ArmourType::Buckler.is_shield());
        assert!(!ArmourType::PlateArmour.is_shield());
        assert!(ArmourType::TowerShield.base_ac() > ArmourType::Buckler.base_ac());
    }
}
