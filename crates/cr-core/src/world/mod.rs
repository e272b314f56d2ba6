//! The level: who is where, and what happens after an attack
//!
//! Combat never recurses into a new attack. Anything an attack or a hook
//! sets in motion (a bolt flying on, a ricochet, an explosion, a spell) is
//! queued here as a [`WorldEffect`] for the caller to run later.

mod coord;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

pub use coord::Coord;

use crate::actor::{Actor, ActorId, Flavour, Monster, Player};
use crate::item::Item;
use cr_rng::RandomSource;

/// A projectile still in flight after the attack that launched it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub item: Item,
    /// Actor credited with whatever it hits next
    pub agent: ActorId,
    pub source: Coord,
    pub target: Coord,
    pub range: i32,
    /// Travelling back toward the one who fired it
    pub reflected: bool,
}

/// Spells that items cast on their own.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum SpellKind {
    SonicWave,
    Discharge,
    ToxicRadiance,
    VenomBolt,
    EntropicBurst,
    ChaoticInfusion,
}

/// Follow-up work queued by an attack or a hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldEffect {
    /// A bolt or reflected projectile continuing along a new path
    Projectile(Flight),
    /// A sling bullet bouncing toward a new target
    Ricochet(Flight),
    Explosion {
        agent: ActorId,
        centre: Coord,
        name: String,
        dice: (i32, i32),
        flavour: Flavour,
        radius: i32,
    },
    Noise {
        pos: Coord,
        loudness: i32,
    },
    Summon {
        summoner: ActorId,
        monster: String,
        count: i32,
    },
    Spell {
        caster: ActorId,
        spell: SpellKind,
        power: i32,
        target: Option<Coord>,
    },
    /// A wild magic misfire landing on `target`
    Miscast {
        agent: ActorId,
        target: ActorId,
        level: i32,
    },
    Beam {
        agent: ActorId,
        name: String,
        source: Coord,
        target: Coord,
        range: i32,
        power: i32,
    },
    /// Send `target` elsewhere on the level, or off it entirely
    Teleport {
        target: ActorId,
        banish: bool,
    },
    Clone {
        original: ActorId,
    },
    Polymorph {
        target: ActorId,
    },
}

/// Someone died; what happens next is the caller's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Death {
    pub victim: ActorId,
    pub name: String,
    pub killer: Option<ActorId>,
}

/// Attribution records for the actor who started an attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conduct {
    Attacked { by: ActorId, target: ActorId },
    Killed { by: ActorId, victim: ActorId },
}

#[derive(Debug, Clone, Default)]
pub struct World {
    pub player: Player,
    pub monsters: Vec<Monster>,
    next_id: ActorId,
    pub width: i32,
    pub height: i32,
    pub walls: HashSet<Coord>,
    pub silenced: HashSet<Coord>,
    /// How dangerous things look to the player right now, 0 and up
    pub tension: i32,
    pending: Vec<WorldEffect>,
    pub deaths: Vec<Death>,
    pub conducts: Vec<Conduct>,
}

impl World {
    pub fn new(width: i32, height: i32, player: Player) -> Self {
        Self {
            player,
            next_id: ActorId::PLAYER.next(),
            width,
            height,
            ..Self::default()
        }
    }

    /// Give a monster a fresh handle and put it on the level.
    pub fn add_monster(&mut self, mut monster: Monster) -> ActorId {
        let id = self.next_id;
        self.next_id = id.next();
        monster.core.id = id;
        tracing::trace!(%id, name = %monster.core.name, pos = %monster.core.pos, "monster placed");
        self.monsters.push(monster);
        id
    }

    pub fn actor(&self, id: ActorId) -> Option<&dyn Actor> {
        if id.is_player() {
            return Some(&self.player);
        }
        self.monster(id).map(|m| m as &dyn Actor)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut dyn Actor> {
        if id.is_player() {
            return Some(&mut self.player);
        }
        self.monster_mut(id).map(|m| m as &mut dyn Actor)
    }

    pub fn monster(&self, id: ActorId) -> Option<&Monster> {
        self.monsters.iter().find(|m| m.core.id == id)
    }

    pub fn monster_mut(&mut self, id: ActorId) -> Option<&mut Monster> {
        self.monsters.iter_mut().find(|m| m.core.id == id)
    }

    /// Handles of everyone alive, player first.
    pub fn actor_ids(&self) -> Vec<ActorId> {
        std::iter::once(&self.player as &dyn Actor)
            .chain(self.monsters.iter().map(|m| m as &dyn Actor))
            .filter(|a| a.is_alive())
            .map(|a| a.id())
            .collect()
    }

    /// Living actor standing on `pos`.
    pub fn actor_at(&self, pos: Coord) -> Option<ActorId> {
        self.actor_ids()
            .into_iter()
            .find(|&id| self.actor(id).is_some_and(|a| a.position() == pos))
    }

    /// Living actors within `radius` of `centre`, nearest rows first.
    pub fn actors_near(&self, centre: Coord, radius: i32) -> Vec<ActorId> {
        self.actor_ids()
            .into_iter()
            .filter(|&id| {
                self.actor(id)
                    .is_some_and(|a| a.position().grid_distance(centre) <= radius)
            })
            .collect()
    }

    pub fn in_bounds(&self, pos: Coord) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Open floor with nobody on it.
    pub fn is_free(&self, pos: Coord) -> bool {
        self.in_bounds(pos) && !self.walls.contains(&pos) && self.actor_at(pos).is_none()
    }

    pub fn is_silenced(&self, pos: Coord) -> bool {
        self.silenced.contains(&pos)
    }

    /// A random free square within `radius` of `origin`, not `origin` itself.
    pub fn random_near_space(
        &self,
        rng: &mut dyn RandomSource,
        origin: Coord,
        radius: i32,
    ) -> Option<Coord> {
        let spots: Vec<Coord> = origin
            .rectangle(radius, true)
            .filter(|&c| self.is_free(c))
            .collect();
        if spots.is_empty() {
            return None;
        }
        let idx = rng.random2(spots.len() as i32) as usize;
        spots.get(idx).copied()
    }

    /// Queue a follow-up effect.
    pub fn place_effect(&mut self, effect: WorldEffect) {
        tracing::debug!(?effect, "effect queued");
        self.pending.push(effect);
    }

    pub fn pending_effects(&self) -> &[WorldEffect] {
        &self.pending
    }

    pub fn take_effects(&mut self) -> Vec<WorldEffect> {
        std::mem::take(&mut self.pending)
    }

    /// Record a death once. Returns false if it was already recorded.
    pub fn monster_died(&mut self, victim: ActorId, killer: Option<ActorId>) -> bool {
        if self.deaths.iter().any(|d| d.victim == victim) {
            return false;
        }
        let name = self
            .actor(victim)
            .map(|a| a.name().to_string())
            .unwrap_or_default();
        tracing::debug!(%victim, ?killer, %name, "death");
        self.deaths.push(Death {
            victim,
            name,
            killer,
        });
        if let Some(by) = killer {
            self.conducts.push(Conduct::Killed { by, victim });
        }
        true
    }

    /// Drop dead monsters from the level.
    pub fn reap(&mut self) -> usize {
        let before = self.monsters.len();
        self.monsters.retain(|m| m.is_alive());
        before - self.monsters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cr_rng::{Bias, RiggedRng};

    fn world() -> World {
        let mut player = Player::new("Hero", 5, 30);
        player.core.pos = Coord::new(1, 1);
        World::new(10, 10, player)
    }

    fn orc_at(x: i32, y: i32) -> Monster {
        let mut m = Monster::new(ActorId::default(), "orc", 3, 15);
        m.core.pos = Coord::new(x, y);
        m
    }

    #[test]
    fn test_handles_are_unique() {
        let mut w = world();
        let a = w.add_monster(orc_at(3, 3));
        let b = w.add_monster(orc_at(4, 4));
        assert_ne!(a, b);
        assert_ne!(a, ActorId::PLAYER);
        assert_eq!(w.actor(a).map(|m| m.position()), Some(Coord::new(3, 3)));
        assert!(w.actor(ActorId(99)).is_none());
    }

    #[test]
    fn test_player_resolves_through_same_lookup() {
        let mut w = world();
        let p = w.actor_mut(ActorId::PLAYER);
        assert!(p.is_some_and(|p| p.is_player()));
        assert_eq!(w.actor_at(Coord::new(1, 1)), Some(ActorId::PLAYER));
    }

    #[test]
    fn test_random_near_space_skips_occupied() {
        let mut w = world();
        w.add_monster(orc_at(2, 2));
        let mut rng = RiggedRng::new(Bias::Low);
        let spot = w.random_near_space(&mut rng, Coord::new(1, 1), 1);
        // first free square in row order around (1, 1)
        assert_eq!(spot, Some(Coord::new(0, 0)));
        w.walls.insert(Coord::new(0, 0));
        let spot = w.random_near_space(&mut rng, Coord::new(1, 1), 1);
        assert_eq!(spot, Some(Coord::new(1, 0)));
    }

    #[test]
    fn test_no_space_when_boxed_in() {
        let mut w = world();
        for c in Coord::new(1, 1).rectangle(1, true) {
            w.walls.insert(c);
        }
        let mut rng = RiggedRng::new(Bias::Low);
        assert_eq!(w.random_near_space(&mut rng, Coord::new(1, 1), 1), None);
    }

    #[test]
    fn test_death_recorded_once() {
        let mut w = world();
        let id = w.add_monster(orc_at(3, 3));
        assert!(w.monster_died(id, Some(ActorId::PLAYER)));
        assert!(!w.monster_died(id, Some(ActorId::PLAYER)));
        assert_eq!(w.deaths.len(), 1);
        assert_eq!(w.deaths[0].name, "orc");
        assert_eq!(
            w.conducts,
            vec![Conduct::Killed {
                by: ActorId::PLAYER,
                victim: id
            }]
        );
    }

    #[test]
    fn test_effects_drain() {
        let mut w = world();
        w.place_effect(WorldEffect::Noise {
            pos: Coord::new(1, 1),
            loudness: 40,
        });
        assert_eq!(w.pending_effects().len(), 1);
        assert_eq!(w.take_effects().len(), 1);
        assert!(w.pending_effects().is_empty());
    }
}
