//! Brand tags on weapons and ammunition
//!
//! These are only labels. What each one does on a hit lives in
//! `combat::brand`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Brand on a melee weapon or launcher.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum WeaponBrand {
    #[default]
    Normal = 0,
    Flaming = 1,
    Freezing = 2,
    Electrocution = 3,
    Venom = 4,
    Silver = 5,
    Vorpal = 6,
    Vampirism = 7,
    HolyWrath = 8,
    DragonSlaying = 9,
    /// Rolls another brand per hit
    Chaos = 10,
    Confuse = 11,
    Draining = 12,
    /// Launched ammo passes through targets
    Penetration = 13,
    /// Drains magic
    Antimagic = 14,
    /// Warps space around the defender
    Distortion = 15,
}

impl WeaponBrand {
    /// Brands that do nothing unless the hit did some damage.
    pub const fn needs_damage(self) -> bool {
        matches!(
            self,
            WeaponBrand::Flaming
                | WeaponBrand::Freezing
                | WeaponBrand::HolyWrath
                | WeaponBrand::Vorpal
                | WeaponBrand::Vampirism
                | WeaponBrand::Silver
                | WeaponBrand::DragonSlaying
                | WeaponBrand::Antimagic
        )
    }

    /// Brands that still apply after the blow killed the defender.
    pub const fn works_on_corpse(self) -> bool {
        matches!(
            self,
            WeaponBrand::Flaming
                | WeaponBrand::Freezing
                | WeaponBrand::Electrocution
                | WeaponBrand::Vampirism
        )
    }
}

/// Brand on a stack of ammunition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum MissileBrand {
    #[default]
    Normal = 0,
    Flame = 1,
    Frost = 2,
    Poisoned = 3,
    Curare = 4,
    /// Rolls another missile brand per hit
    Chaos = 5,
    Dispersal = 6,
    Silver = 7,
    Petrification = 8,
    Sleep = 9,
    Confusion = 10,
    Frenzy = 11,
    Penetration = 12,
    Blinding = 13,
}

impl MissileBrand {
    /// Status brands gated by the blowgun resistance check.
    pub const fn is_blowgun_status(self) -> bool {
        matches!(
            self,
            MissileBrand::Petrification
                | MissileBrand::Sleep
                | MissileBrand::Confusion
                | MissileBrand::Frenzy
        )
    }
}
