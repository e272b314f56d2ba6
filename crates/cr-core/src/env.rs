//! Everything a phase or a hook may touch, bundled

use crate::actor::{Actor, ActorId};
use crate::artifact::HookRegistry;
use crate::config::CombatConfig;
use crate::error::CombatError;
use crate::message::{MessageSink, MsgChannel};
use crate::world::World;
use cr_rng::RandomSource;

/// Borrowed collaborators for one resolution.
///
/// Nothing here is global: the player is reached through
/// [`World::actor`] like any monster.
pub struct Env<'a> {
    pub world: &'a mut World,
    pub rng: &'a mut dyn RandomSource,
    pub messages: &'a mut dyn MessageSink,
    pub config: &'a CombatConfig,
    pub hooks: &'a HookRegistry,
}

impl<'a> Env<'a> {
    pub fn new(
        world: &'a mut World,
        rng: &'a mut dyn RandomSource,
        messages: &'a mut dyn MessageSink,
        config: &'a CombatConfig,
        hooks: &'a HookRegistry,
    ) -> Self {
        Self {
            world,
            rng,
            messages,
            config,
            hooks,
        }
    }

    pub fn say(&mut self, text: &str) {
        self.messages.notify(MsgChannel::Plain, text);
    }

    pub fn notify(&mut self, channel: MsgChannel, text: &str) {
        self.messages.notify(channel, text);
    }

    pub fn actor(&self, id: ActorId) -> Result<&dyn Actor, CombatError> {
        self.world.actor(id).ok_or(CombatError::MissingActor(id))
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Result<&mut dyn Actor, CombatError> {
        self.world
            .actor_mut(id)
            .ok_or(CombatError::MissingActor(id))
    }
}
