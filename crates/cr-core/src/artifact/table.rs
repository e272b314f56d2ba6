//! Static artifact data

use super::hooks::*;
use super::{HookBundle, UnrandArtifact};
use crate::item::{ArmourEgo, ArmourType, ItemKind, WeaponBrand, WeaponType};

/// One row of the artifact table.
#[derive(Debug, Clone, Copy)]
pub struct UnrandEntry {
    pub art: UnrandArtifact,
    pub name: &'static str,
    pub base: ItemKind,
    pub plus: i32,
    /// Every attack with it lands, no rolls
    pub auto_hit: bool,
    /// Launched ammo passes through whatever it hits
    pub penetrates: bool,
    pub hooks: HookBundle,
}

const fn weapon(weapon: WeaponType, brand: WeaponBrand) -> ItemKind {
    ItemKind::Weapon { weapon, brand }
}

const fn entry(art: UnrandArtifact, name: &'static str, base: ItemKind, plus: i32) -> UnrandEntry {
    UnrandEntry {
        art,
        name,
        base,
        plus,
        auto_hit: false,
        penetrates: false,
        hooks: HookBundle::EMPTY,
    }
}

/// Indexed by [`UnrandArtifact`] discriminant.
pub static UNRAND_TABLE: [UnrandEntry; 19] = [
    UnrandEntry {
        hooks: HookBundle {
            equip: Some(singing_sword_equip),
            unequip: Some(singing_sword_unequip),
            world_reacts: Some(singing_sword_world_reacts),
            melee_effects: Some(singing_sword_melee_effects),
            ..HookBundle::EMPTY
        },
        ..entry(
            UnrandArtifact::SingingSword,
            "Singing Sword",
            weapon(WeaponType::LongSword, WeaponBrand::Normal),
            7,
        )
    },
    UnrandEntry {
        hooks: HookBundle {
            equip: Some(majin_equip),
            unequip: Some(majin_unequip),
            ..HookBundle::EMPTY
        },
        ..entry(
            UnrandArtifact::MajinBo,
            "demon blade \"Majin-Bo\"",
            weapon(WeaponType::ShortSword, WeaponBrand::Normal),
            8,
        )
    },
    UnrandEntry {
        hooks: HookBundle {
            melee_effects: Some(cerebov_melee_effects),
            ..HookBundle::EMPTY
        },
        ..entry(
            UnrandArtifact::Cerebov,
            "sword of Cerebov",
            weapon(WeaponType::GreatSword, WeaponBrand::Flaming),
            6,
        )
    },
    UnrandEntry {
        hooks: HookBundle {
            equip: Some(olgreb_equip),
            unequip: Some(olgreb_unequip),
            melee_effects: Some(olgreb_melee_effects),
            evoke: Some(olgreb_evoke),
            ..HookBundle::EMPTY
        },
        ..entry(
            UnrandArtifact::Olgreb,
            "staff of Olgreb",
            weapon(WeaponType::Quarterstaff, WeaponBrand::Venom),
            0,
        )
    },
    UnrandEntry {
        hooks: HookBundle {
            equip: Some(power_equip),
            melee_effects: Some(power_melee_effects),
            ..HookBundle::EMPTY
        },
        ..entry(
            UnrandArtifact::Power,
            "sword of Power",
            weapon(WeaponType::LongSword, WeaponBrand::Normal),
            0,
        )
    },
    UnrandEntry {
        hooks: HookBundle {
            melee_effects: Some(finisher_melee_effects),
            ..HookBundle::EMPTY
        },
        ..entry(
            UnrandArtifact::Finisher,
            "scythe \"Finisher\"",
            weapon(WeaponType::Scythe, WeaponBrand::Normal),
            3,
        )
    },
    UnrandEntry {
        hooks: HookBundle {
            melee_effects: Some(undeadhunter_melee_effects),
            ..HookBundle::EMPTY
        },
        ..entry(
            UnrandArtifact::Undeadhunter,
            "mace \"Undeadhunter\"",
            weapon(WeaponType::Mace, WeaponBrand::Normal),
            7,
        )
    },
    UnrandEntry {
        hooks: HookBundle {
            melee_effects: Some(order_melee_effects),
            ..HookBundle::EMPTY
        },
        ..entry(
            UnrandArtifact::Order,
            "sword of Order",
            weapon(WeaponType::LongSword, WeaponBrand::Silver),
            5,
        )
    },
    UnrandEntry {
        hooks: HookBundle {
            equip: Some(firestarter_equip),
            unequip: Some(firestarter_unequip),
            melee_effects: Some(firestarter_melee_effects),
            ..HookBundle::EMPTY
        },
        ..entry(
            UnrandArtifact::Firestarter,
            "mace \"Firestarter\"",
            weapon(WeaponType::Mace, WeaponBrand::Flaming),
            6,
        )
    },
    UnrandEntry {
        hooks: HookBundle {
            melee_effects: Some(snakebite_melee_effects),
            ..HookBundle::EMPTY
        },
        ..entry(
            UnrandArtifact::Snakebite,
            "whip \"Snakebite\"",
            weapon(WeaponType::DemonWhip, WeaponBrand::Normal),
            8,
        )
    },
    UnrandEntry {
        auto_hit: true,
        hooks: HookBundle {
            melee_effects: Some(woe_melee_effects),
            ..HookBundle::EMPTY
        },
        ..entry(
            UnrandArtifact::Woe,
            "axe of Woe",
            weapon(WeaponType::WarAxe, WeaponBrand::Normal),
            0,
        )
    },
    UnrandEntry {
        auto_hit: true,
        ..entry(
            UnrandArtifact::Sniper,
            "crossbow \"Sniper\"",
            weapon(WeaponType::Arbalest, WeaponBrand::HolyWrath),
            10,
        )
    },
    UnrandEntry {
        penetrates: true,
        ..entry(
            UnrandArtifact::StormBow,
            "Storm Bow",
            weapon(WeaponType::Longbow, WeaponBrand::Electrocution),
            8,
        )
    },
    UnrandEntry {
        hooks: HookBundle {
            launch: Some(damnation_launch),
            ..HookBundle::EMPTY
        },
        ..entry(
            UnrandArtifact::Damnation,
            "arbalest \"Damnation\"",
            weapon(WeaponType::Arbalest, WeaponBrand::Normal),
            6,
        )
    },
    UnrandEntry {
        hooks: HookBundle {
            equip: Some(arc_blade_equip),
            unequip: Some(arc_blade_unequip),
            melee_effects: Some(arc_blade_melee_effects),
            ..HookBundle::EMPTY
        },
        ..entry(
            UnrandArtifact::ArcBlade,
            "arc blade",
            weapon(WeaponType::ShortSword, WeaponBrand::Normal),
            8,
        )
    },
    UnrandEntry {
        hooks: HookBundle {
            melee_effects: Some(elemental_staff_melee_effects),
            ..HookBundle::EMPTY
        },
        ..entry(
            UnrandArtifact::ElementalStaff,
            "Elemental Staff",
            weapon(WeaponType::Quarterstaff, WeaponBrand::Normal),
            3,
        )
    },
    UnrandEntry {
        hooks: HookBundle {
            equip: Some(thermic_engine_equip),
            unequip: Some(thermic_engine_unequip),
            world_reacts: Some(thermic_engine_world_reacts),
            melee_effects: Some(thermic_engine_melee_effects),
            ..HookBundle::EMPTY
        },
        ..entry(
            UnrandArtifact::ThermicEngine,
            "Maxwell's thermic engine",
            weapon(WeaponType::GreatSword, WeaponBrand::Flaming),
            crate::THERMIC_BASE_PLUS,
        )
    },
    UnrandEntry {
        hooks: HookBundle {
            melee_effects: Some(gong_melee_effects),
            ..HookBundle::EMPTY
        },
        ..entry(
            UnrandArtifact::Gong,
            "shield of the Gong",
            ItemKind::Armour {
                armour: ArmourType::TowerShield,
                ego: ArmourEgo::Normal,
            },
            5,
        )
    },
    UnrandEntry {
        hooks: HookBundle {
            evoke: Some(asmodeus_evoke),
            ..HookBundle::EMPTY
        },
        ..entry(
            UnrandArtifact::Asmodeus,
            "sceptre of Asmodeus",
            weapon(WeaponType::Mace, WeaponBrand::Draining),
            7,
        )
    },
];

/// Table row for an artifact.
pub fn unrand_entry(art: UnrandArtifact) -> &'static UnrandEntry {
    &UNRAND_TABLE[art as usize]
}
