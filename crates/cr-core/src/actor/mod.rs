//! Actors: the player and monsters behind one capability interface
//!
//! Combat code only talks to [`Actor`]. The player is not special-cased
//! through a global; it is the actor behind [`ActorId::PLAYER`].

mod data;
mod monster;
mod player;

use serde::{Deserialize, Serialize};

pub use data::{
    ActorCore, ActorTraits, Attitude, DodgeCounts, Holiness, Resists, StatusKind, StatusTable,
};
pub use monster::{Behaviour, Monster};
pub use player::Player;

use crate::item::{Equipment, Item};
use crate::world::Coord;

/// Handle to an actor owned by the [`crate::world::World`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl ActorId {
    /// The one player character.
    pub const PLAYER: ActorId = ActorId(0);

    pub fn next(self) -> Self {
        ActorId(self.0 + 1)
    }

    pub fn is_player(self) -> bool {
        self == Self::PLAYER
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_player() {
            write!(f, "player")
        } else {
            write!(f, "monster #{}", self.0)
        }
    }
}

/// Damage flavour, for resistances and on-hit side effects.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[repr(u8)]
pub enum Flavour {
    #[default]
    Physical = 0,
    Fire = 1,
    Cold = 2,
    Electricity = 3,
    Poison = 4,
    Holy = 5,
    Damnation = 6,
}

/// Maximum poison duration an actor can build up.
const POISON_CAP: i32 = 100;

/// Everything combat needs to know about, or do to, an actor.
///
/// Implementors only provide storage access and the variant flag; the rest
/// has defaults written against [`ActorCore`].
pub trait Actor {
    fn core(&self) -> &ActorCore;
    fn core_mut(&mut self) -> &mut ActorCore;
    fn is_player(&self) -> bool;

    fn as_monster(&self) -> Option<&Monster> {
        None
    }

    fn as_monster_mut(&mut self) -> Option<&mut Monster> {
        None
    }

    fn is_monster(&self) -> bool {
        !self.is_player()
    }

    fn id(&self) -> ActorId {
        self.core().id
    }

    fn name(&self) -> &str {
        &self.core().name
    }

    /// Definite description: `"you"` or `"the orc"`.
    fn the_name(&self) -> String {
        if self.is_player() {
            "you".to_string()
        } else {
            format!("the {}", self.core().name)
        }
    }

    /// Conjugate a verb for this actor as subject.
    fn conj_verb(&self, verb: &str) -> String {
        if self.is_player() {
            return match verb {
                "be" => "are".to_string(),
                _ => verb.to_string(),
            };
        }
        match verb {
            "be" => "is".to_string(),
            "have" => "has".to_string(),
            _ if verb.ends_with('s')
                || verb.ends_with("sh")
                || verb.ends_with("ch")
                || verb.ends_with('x') =>
            {
                format!("{verb}es")
            }
            _ if verb.ends_with('y') && !verb.ends_with("ay") && !verb.ends_with("ey") => {
                format!("{}ies", &verb[..verb.len() - 1])
            }
            _ => format!("{verb}s"),
        }
    }

    /// Possessive pronoun: `"your"` or `"its"`.
    fn pronoun_possessive(&self) -> &'static str {
        if self.is_player() { "your" } else { "its" }
    }

    fn position(&self) -> Coord {
        self.core().pos
    }

    fn set_position(&mut self, pos: Coord) {
        self.core_mut().pos = pos;
    }

    fn is_alive(&self) -> bool {
        self.core().hp > 0
    }

    fn hit_points(&self) -> i32 {
        self.core().hp
    }

    fn max_hit_points(&self) -> i32 {
        self.core().max_hp
    }

    fn hit_dice(&self) -> i32 {
        self.core().hit_dice
    }

    /// Take damage. Returns the amount actually taken.
    fn apply_damage(&mut self, amount: i32, source: Option<ActorId>, flavour: Flavour) -> i32 {
        if amount <= 0 || !self.is_alive() {
            return 0;
        }
        let core = self.core_mut();
        core.hp -= amount;
        if source.is_some() {
            core.last_attacker = source;
        }
        tracing::trace!(actor = %core.id, amount, %flavour, hp = core.hp, "damage");
        amount
    }

    fn heal(&mut self, amount: i32) {
        let core = self.core_mut();
        core.hp = (core.hp + amount.max(0)).min(core.max_hp);
    }

    /// Evasion against an attack. Helpless actors have none.
    fn evasion(&self) -> i32 {
        if self.incapacitated() {
            0
        } else {
            self.core().evasion
        }
    }

    fn armour_class(&self) -> i32 {
        self.core().armour_class
    }

    /// Reduce raw damage by a random share of armour.
    fn apply_ac(&self, damage: i32, rng: &mut dyn cr_rng::RandomSource) -> i32 {
        (damage - rng.random2(1 + self.armour_class())).max(0)
    }

    fn missile_deflection(&self) -> i32 {
        self.core().deflection
    }

    /// Spend one charge of temporary deflection.
    fn ablate_deflection(&mut self) {
        let core = self.core_mut();
        if core.deflection_charges > 0 {
            core.deflection_charges -= 1;
            if core.deflection_charges == 0 {
                core.deflection = 0;
            }
        }
    }

    fn holiness(&self) -> Holiness {
        self.core().holiness
    }

    fn traits(&self) -> ActorTraits {
        self.core().traits
    }

    fn attitude(&self) -> Attitude {
        self.core().attitude
    }

    fn status_duration(&self, kind: StatusKind) -> i32 {
        self.core().status.get(kind)
    }

    fn set_status_duration(&mut self, kind: StatusKind, value: i32) {
        self.core_mut().status.set(kind, value);
    }

    fn has_status(&self, kind: StatusKind) -> bool {
        self.core().status.is_active(kind)
    }

    /// Unable to move or defend itself.
    fn incapacitated(&self) -> bool {
        [
            StatusKind::Sleep,
            StatusKind::Paralysis,
            StatusKind::Petrified,
            StatusKind::Caught,
        ]
        .into_iter()
        .any(|kind| self.has_status(kind))
    }

    fn confused(&self) -> bool {
        self.has_status(StatusKind::Confusion)
    }

    fn is_invisible(&self) -> bool {
        self.has_status(StatusKind::Invisible)
    }

    /// Whether `observer` can see this actor.
    fn visible_to(&self, observer: &dyn Actor) -> bool {
        !self.is_invisible() && !observer.has_status(StatusKind::Blind)
    }

    fn is_fiery(&self) -> bool {
        self.traits().contains(ActorTraits::FIERY)
    }

    fn is_icy(&self) -> bool {
        self.traits().contains(ActorTraits::ICY)
    }

    /// Protected from teleportation and blinking.
    fn no_tele(&self) -> bool {
        self.traits().contains(ActorTraits::STASIS)
    }

    fn can_go_berserk(&self) -> bool {
        !self.traits().contains(ActorTraits::NO_BERSERK)
            && !self.holiness().intersects(Holiness::UNDEAD | Holiness::NONLIVING)
            && !self.has_status(StatusKind::Berserk)
    }

    fn is_unbreathing(&self) -> bool {
        self.traits().contains(ActorTraits::UNBREATHING)
            || self.holiness().intersects(Holiness::UNDEAD | Holiness::NONLIVING)
    }

    fn is_dragonkind(&self) -> bool {
        self.traits().contains(ActorTraits::DRAGONKIND)
    }

    /// Resistance level against `flavour`. Vulnerability shows as a
    /// negative level.
    fn resist(&self, flavour: Flavour) -> i32 {
        let r = &self.core().resists;
        match flavour {
            Flavour::Fire => {
                let base = if self.is_fiery() { 3 } else { r.fire };
                if self.has_status(StatusKind::FireVulnerable) {
                    base - 1
                } else {
                    base
                }
            }
            Flavour::Cold => {
                if self.is_icy() {
                    3
                } else {
                    r.cold
                }
            }
            Flavour::Electricity => r.elec,
            Flavour::Poison => {
                if self.holiness().intersects(Holiness::UNDEAD | Holiness::NONLIVING) {
                    3
                } else {
                    r.poison
                }
            }
            Flavour::Holy => {
                if self.holy_wrath_susceptible() {
                    -1
                } else {
                    3
                }
            }
            Flavour::Physical | Flavour::Damnation => 0,
        }
    }

    fn holy_wrath_susceptible(&self) -> bool {
        self.holiness().intersects(Holiness::UNDEAD | Holiness::DEMONIC)
    }

    fn equipment(&self) -> &Equipment {
        &self.core().equipment
    }

    fn equipment_mut(&mut self) -> &mut Equipment {
        &mut self.core_mut().equipment
    }

    /// Wielded weapon or launcher, if any.
    fn weapon(&self) -> Option<&Item> {
        self.equipment().weapon()
    }

    /// Worn shield, if any.
    fn shield(&self) -> Option<&Item> {
        self.equipment().shield()
    }

    /// Defender side of the shield roll.
    fn shield_bonus(&self) -> i32 {
        match self.shield() {
            Some(shield) => shield.shield_base() * 2 + shield.plus + self.hit_dice() / 2,
            None => 0,
        }
    }

    fn shield_block_penalty(&self) -> i32 {
        self.core().shield_penalty
    }

    /// Attacker side of the shield roll.
    fn shield_bypass_ability(&self, to_hit: i32) -> i32 {
        15 + to_hit / 2
    }

    /// Innate reflection, or a reflective shield.
    fn reflection(&self) -> bool {
        self.traits().contains(ActorTraits::REFLECTIVE)
    }

    // ========================================================================
    // Status effects
    // ========================================================================

    /// Add poison. Returns true if the poison level went up.
    fn poison(&mut self, source: Option<ActorId>, amount: i32) -> bool {
        if amount <= 0 || self.resist(Flavour::Poison) >= 3 {
            return false;
        }
        let amount = if self.resist(Flavour::Poison) > 0 {
            amount / 3
        } else {
            amount
        };
        if source.is_some() {
            self.core_mut().last_attacker = source;
        }
        self.core_mut()
            .status
            .increase(StatusKind::Poison, amount, POISON_CAP)
    }

    fn confuse(&mut self, amount: i32) -> bool {
        if self.holiness().intersects(Holiness::PLANT) {
            return false;
        }
        self.core_mut()
            .status
            .increase(StatusKind::Confusion, amount.max(1), 40)
    }

    fn slow_down(&mut self, amount: i32) -> bool {
        // stasis also pins an actor's speed
        if self.no_tele() {
            return false;
        }
        self.core_mut().status.increase(StatusKind::Slow, amount, 60)
    }

    /// Start turning to stone. Does nothing if already stone.
    fn petrify(&mut self) -> bool {
        if self.has_status(StatusKind::Petrified) || self.has_status(StatusKind::Petrifying) {
            return false;
        }
        self.set_status_duration(StatusKind::Petrifying, 3);
        true
    }

    fn put_to_sleep(&mut self, power: i32) -> bool {
        if self.has_status(StatusKind::Berserk) {
            return false;
        }
        self.core_mut()
            .status
            .increase(StatusKind::Sleep, power.max(1), 100)
    }

    fn go_berserk(&mut self) -> bool {
        if !self.can_go_berserk() {
            return false;
        }
        self.core_mut().status.set(StatusKind::Sleep, 0);
        self.core_mut().status.increase(StatusKind::Berserk, 10, 30)
    }

    fn blink_to(&mut self, pos: Coord) -> bool {
        if self.no_tele() {
            return false;
        }
        self.set_position(pos);
        true
    }

    /// Environmental side effect of being hit by an element.
    fn expose_to_element(&mut self, flavour: Flavour, strength: i32) {
        match flavour {
            Flavour::Fire => self.set_status_duration(StatusKind::Frozen, 0),
            Flavour::Cold if self.resist(Flavour::Cold) <= 0 => {
                self.core_mut()
                    .status
                    .increase(StatusKind::Frozen, strength, strength);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orc() -> Monster {
        Monster::new(ActorId(1), "orc", 3, 20)
    }

    #[test]
    fn test_conjugation() {
        let m = orc();
        assert_eq!(m.conj_verb("deflect"), "deflects");
        assert_eq!(m.conj_verb("be"), "is");
        assert_eq!(m.conj_verb("catch"), "catches");
        let p = Player::new("Hero", 5, 30);
        assert_eq!(p.conj_verb("deflect"), "deflect");
        assert_eq!(p.conj_verb("be"), "are");
        assert_eq!(p.the_name(), "you");
        assert_eq!(m.the_name(), "the orc");
    }

    #[test]
    fn test_damage_and_death() {
        let mut m = orc();
        assert_eq!(m.apply_damage(5, Some(ActorId::PLAYER), Flavour::Physical), 5);
        assert_eq!(m.hit_points(), 15);
        assert_eq!(m.core().last_attacker, Some(ActorId::PLAYER));
        m.apply_damage(50, None, Flavour::Fire);
        assert!(!m.is_alive());
        // dead stays dead
        assert_eq!(m.apply_damage(5, None, Flavour::Physical), 0);
    }

    #[test]
    fn test_undead_poison_immune() {
        let mut m = orc();
        m.core_mut().holiness = Holiness::UNDEAD;
        assert!(!m.poison(None, 20));
        assert_eq!(m.status_duration(StatusKind::Poison), 0);
    }

    #[test]
    fn test_poison_accumulates() {
        let mut m = orc();
        assert!(m.poison(None, 6));
        assert!(m.poison(None, 6));
        assert_eq!(m.status_duration(StatusKind::Poison), 12);
    }

    #[test]
    fn test_incapacitated_has_no_evasion() {
        let mut m = orc();
        m.core_mut().evasion = 12;
        assert_eq!(m.evasion(), 12);
        m.set_status_duration(StatusKind::Sleep, 5);
        assert!(m.incapacitated());
        assert_eq!(m.evasion(), 0);
    }

    #[test]
    fn test_temporary_deflection_wears_off() {
        let mut m = orc();
        m.core_mut().deflection = 2;
        m.core_mut().deflection_charges = 2;
        m.ablate_deflection();
        assert_eq!(m.missile_deflection(), 2);
        m.ablate_deflection();
        assert_eq!(m.missile_deflection(), 0);
    }

    #[test]
    fn test_permanent_deflection() {
        let mut m = orc();
        m.core_mut().deflection = 1;
        m.ablate_deflection();
        assert_eq!(m.missile_deflection(), 1);
    }

    #[test]
    fn test_fire_vulnerability_lowers_resist() {
        let mut m = orc();
        m.core_mut().resists.fire = 1;
        m.set_status_duration(StatusKind::FireVulnerable, 10);
        assert_eq!(m.resist(Flavour::Fire), 0);
    }

    #[test]
    fn test_berserk_blocked_for_undead() {
        let mut m = orc();
        assert!(m.go_berserk());
        let mut z = orc();
        z.core_mut().holiness = Holiness::UNDEAD;
        assert!(!z.go_berserk());
    }

    #[test]
    fn test_stasis_blocks_blink() {
        let mut m = orc();
        m.core_mut().traits |= ActorTraits::STASIS;
        assert!(!m.blink_to(Coord::new(4, 4)));
        assert_eq!(m.position(), Coord::default());
    }
}
