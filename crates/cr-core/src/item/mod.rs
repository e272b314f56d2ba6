//! Items: weapons, ammunition and armour
//!
//! Static identity lives in [`ItemKind`]; the small per-instance state that
//! artifact hooks are allowed to touch (plus, custom name, flags) lives on
//! [`Item`] itself.

mod brand;
mod types;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

pub use brand::{MissileBrand, WeaponBrand};
pub use types::{ArmourEgo, ArmourType, MissileType, WeaponType};

use crate::artifact::{UnrandArtifact, unrand_entry};

bitflags! {
    /// Persistent per-item flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ItemFlags: u8 {
        /// The Singing Sword has introduced itself
        const WELCOMED = 0x01;
        /// Majin-Bo has whispered to its wielder
        const MAJIN_WELCOMED = 0x02;
        /// Launched as a damnation bolt; explodes on conclusion
        const DAMNATION_BOLT = 0x04;
    }
}

/// Base kind of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Weapon {
        weapon: WeaponType,
        brand: WeaponBrand,
    },
    Missile {
        missile: MissileType,
        brand: MissileBrand,
    },
    Armour {
        armour: ArmourType,
        ego: ArmourEgo,
    },
}

impl Default for ItemKind {
    fn default() -> Self {
        ItemKind::Weapon {
            weapon: WeaponType::default(),
            brand: WeaponBrand::Normal,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    /// Enchantment; some artifacts use it as a charge counter
    pub plus: i32,
    pub quantity: i32,
    pub unrand: Option<UnrandArtifact>,
    /// Overrides the base or artifact name
    pub custom_name: Option<String>,
    pub flags: ItemFlags,
}

impl Item {
    pub fn weapon(weapon: WeaponType) -> Self {
        Self {
            kind: ItemKind::Weapon {
                weapon,
                brand: WeaponBrand::Normal,
            },
            quantity: 1,
            ..Self::default()
        }
    }

    pub fn missile(missile: MissileType, quantity: i32) -> Self {
        Self {
            kind: ItemKind::Missile {
                missile,
                brand: MissileBrand::Normal,
            },
            quantity,
            ..Self::default()
        }
    }

    pub fn armour(armour: ArmourType) -> Self {
        Self {
            kind: ItemKind::Armour {
                armour,
                ego: ArmourEgo::Normal,
            },
            quantity: 1,
            ..Self::default()
        }
    }

    /// A fresh copy of a unique artifact.
    pub fn unrand(art: UnrandArtifact) -> Self {
        let entry = unrand_entry(art);
        Self {
            kind: entry.base,
            plus: entry.plus,
            quantity: 1,
            unrand: Some(art),
            ..Self::default()
        }
    }

    /// Replace the brand. No effect on armour.
    pub fn with_weapon_brand(mut self, new_brand: WeaponBrand) -> Self {
        if let ItemKind::Weapon { brand, .. } = &mut self.kind {
            *brand = new_brand;
        }
        self
    }

    /// Replace the brand. No effect unless this is ammunition.
    pub fn with_missile_brand(mut self, new_brand: MissileBrand) -> Self {
        if let ItemKind::Missile { brand, .. } = &mut self.kind {
            *brand = new_brand;
        }
        self
    }

    pub fn with_ego(mut self, new_ego: ArmourEgo) -> Self {
        if let ItemKind::Armour { ego, .. } = &mut self.kind {
            *ego = new_ego;
        }
        self
    }

    pub fn with_plus(mut self, plus: i32) -> Self {
        self.plus = plus;
        self
    }

    pub fn is_unrand(&self, art: UnrandArtifact) -> bool {
        self.unrand == Some(art)
    }

    pub fn weapon_type(&self) -> Option<WeaponType> {
        match self.kind {
            ItemKind::Weapon { weapon, .. } => Some(weapon),
            _ => None,
        }
    }

    pub fn weapon_brand(&self) -> WeaponBrand {
        match self.kind {
            ItemKind::Weapon { brand, .. } => brand,
            _ => WeaponBrand::Normal,
        }
    }

    pub fn missile_type(&self) -> Option<MissileType> {
        match self.kind {
            ItemKind::Missile { missile, .. } => Some(missile),
            _ => None,
        }
    }

    pub fn missile_brand(&self) -> MissileBrand {
        match self.kind {
            ItemKind::Missile { brand, .. } => brand,
            _ => MissileBrand::Normal,
        }
    }

    pub fn is_missile(&self) -> bool {
        matches!(self.kind, ItemKind::Missile { .. })
    }

    pub fn is_launcher(&self) -> bool {
        self.weapon_type().is_some_and(WeaponType::is_launcher)
    }

    pub fn is_shield(&self) -> bool {
        matches!(self.kind, ItemKind::Armour { armour, .. } if armour.is_shield())
    }

    /// Block strength of a shield, 0 for anything else.
    pub fn shield_base(&self) -> i32 {
        match self.kind {
            ItemKind::Armour { armour, .. } if armour.is_shield() => armour.base_ac(),
            _ => 0,
        }
    }

    pub fn reflects(&self) -> bool {
        matches!(
            self.kind,
            ItemKind::Armour {
                ego: ArmourEgo::Reflection,
                ..
            }
        )
    }

    /// Damage of the base type, before plus and skill.
    pub fn base_damage(&self) -> i32 {
        match self.kind {
            ItemKind::Weapon { weapon, .. } => weapon.damage(),
            ItemKind::Missile { missile, .. } => missile.damage(),
            ItemKind::Armour { .. } => 0,
        }
    }

    /// Whether an automatic-hit artifact.
    pub fn auto_hits(&self) -> bool {
        self.unrand.is_some_and(|art| unrand_entry(art).auto_hit)
    }

    pub fn base_name(&self) -> &'static str {
        match self.kind {
            ItemKind::Weapon { weapon, .. } => weapon.base_name(),
            ItemKind::Missile { missile, .. } => missile.base_name(),
            ItemKind::Armour { armour, .. } => armour.base_name(),
        }
    }

    /// Name without article: custom name, else artifact name, else base.
    pub fn name(&self) -> String {
        if let Some(name) = &self.custom_name {
            return name.clone();
        }
        match self.unrand {
            Some(art) => unrand_entry(art).name.to_string(),
            None => self.base_name().to_string(),
        }
    }

    /// `"the long sword"`, `"the Singing Sword"`.
    pub fn the_name(&self) -> String {
        format!("the {}", self.name())
    }
}

/// Where an item is worn or held.
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
pub enum EquipSlot {
    Weapon = 0,
    /// Shield, or an off-hand weapon
    Offhand = 1,
    Body = 2,
    Quiver = 3,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    slots: [Option<Item>; EquipSlot::COUNT],
}

impl Equipment {
    pub fn get(&self, slot: EquipSlot) -> Option<&Item> {
        self.slots[slot as usize].as_ref()
    }

    pub fn get_mut(&mut self, slot: EquipSlot) -> Option<&mut Item> {
        self.slots[slot as usize].as_mut()
    }

    /// Put an item in a slot, returning what was there.
    pub fn put(&mut self, slot: EquipSlot, item: Item) -> Option<Item> {
        self.slots[slot as usize].replace(item)
    }

    pub fn take(&mut self, slot: EquipSlot) -> Option<Item> {
        self.slots[slot as usize].take()
    }

    pub fn weapon(&self) -> Option<&Item> {
        self.get(EquipSlot::Weapon)
    }

    pub fn shield(&self) -> Option<&Item> {
        self.get(EquipSlot::Offhand).filter(|item| item.is_shield())
    }

    pub fn body_armour(&self) -> Option<&Item> {
        self.get(EquipSlot::Body)
    }

    pub fn quiver(&self) -> Option<&Item> {
        self.get(EquipSlot::Quiver)
    }

    /// Occupied slots holding a unique artifact.
    pub fn unrands(&self) -> impl Iterator<Item = (EquipSlot, UnrandArtifact)> + '_ {
        EquipSlot::iter().filter_map(|slot| {
            self.get(slot)
                .and_then(|item| item.unrand)
                .map(|art| (slot, art))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_builders() {
        let arrows = Item::missile(MissileType::Arrow, 20).with_missile_brand(MissileBrand::Flame);
        assert_eq!(arrows.missile_brand(), MissileBrand::Flame);
        assert_eq!(arrows.weapon_brand(), WeaponBrand::Normal);
        // ignored on the wrong kind
        let sword = Item::weapon(WeaponType::LongSword).with_missile_brand(MissileBrand::Flame);
        assert_eq!(sword.missile_brand(), MissileBrand::Normal);
    }

    #[test]
    fn test_shield_detection() {
        let buckler = Item::armour(ArmourType::Buckler);
        assert!(buckler.is_shield());
        assert_eq!(buckler.shield_base(), 3);
        let robe = Item::armour(ArmourType::Robe);
        assert!(!robe.is_shield());
        assert_eq!(robe.shield_base(), 0);

        let mut eq = Equipment::default();
        eq.put(EquipSlot::Offhand, Item::weapon(WeaponType::Dagger));
        assert!(eq.shield().is_none());
        eq.put(EquipSlot::Offhand, buckler);
        assert!(eq.shield().is_some());
    }

    #[test]
    fn test_reflection_ego() {
        let shield = Item::armour(ArmourType::KiteShield).with_ego(ArmourEgo::Reflection);
        assert!(shield.reflects());
        assert!(!Item::armour(ArmourType::KiteShield).reflects());
    }

    #[test]
    fn test_take_and_restore() {
        let mut eq = Equipment::default();
        eq.put(EquipSlot::Weapon, Item::weapon(WeaponType::Mace));
        let item = eq.take(EquipSlot::Weapon);
        assert!(eq.weapon().is_none());
        assert!(item.is_some());
        if let Some(item) = item {
            eq.put(EquipSlot::Weapon, item);
        }
        assert_eq!(eq.weapon().map(Item::base_name), Some("mace"));
    }

    #[test]
    fn test_unrand_names() {
        let mut sword = Item::unrand(UnrandArtifact::SingingSword);
        assert_eq!(sword.name(), "Singing Sword");
        sword.custom_name = Some("Screaming Sword".to_string());
        assert_eq!(sword.the_name(), "the Screaming Sword");
        assert!(Item::unrand(UnrandArtifact::Woe).auto_hits());
        assert!(!Item::weapon(WeaponType::Dagger).auto_hits());
    }

    #[test]
    fn test_unrands_listing() {
        let mut eq = Equipment::default();
        eq.put(EquipSlot::Weapon, Item::unrand(UnrandArtifact::ThermicEngine));
        eq.put(EquipSlot::Body, Item::armour(ArmourType::Robe));
        let found: Vec<_> = eq.unrands().collect();
        assert_eq!(found, vec![(EquipSlot::Weapon, UnrandArtifact::ThermicEngine)]);
    }
}
