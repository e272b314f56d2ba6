//! Unique artifacts and the hooks they run
//!
//! Each [`UnrandArtifact`] maps to a [`HookBundle`] of optional plain
//! function pointers, one per extension point. The combat code only calls
//! the drivers in this module; it never matches on a specific artifact
//! except for the handful of passive properties in the static table
//! (automatic hit, penetration).
//!
//! Hooks receive the item by `&mut` after it has been taken out of its
//! slot, so they can change its plus, name or flags while also holding the
//! [`Env`]. The item goes back in the same slot afterwards, even when the
//! hook fails.

mod hooks;
mod table;

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString};

pub use table::{UNRAND_TABLE, UnrandEntry, unrand_entry};

use crate::Env;
use crate::actor::{ActorId, Flavour};
use crate::error::CombatError;
use crate::item::{EquipSlot, Item};
use crate::message::{MessageSink, MsgChannel, article};

/// Unique artifacts with bespoke rules.
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
    EnumString,
)]
#[strum(ascii_case_insensitive)]
#[repr(u8)]
pub enum UnrandArtifact {
    SingingSword = 0,
    MajinBo = 1,
    Cerebov = 2,
    Olgreb = 3,
    Power = 4,
    Finisher = 5,
    Undeadhunter = 6,
    Order = 7,
    Firestarter = 8,
    Snakebite = 9,
    Woe = 10,
    Sniper = 11,
    StormBow = 12,
    Damnation = 13,
    ArcBlade = 14,
    ElementalStaff = 15,
    ThermicEngine = 16,
    Gong = 17,
    Asmodeus = 18,
}

/// What a melee-effects hook gets to know about the blow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitInfo {
    pub attacker: ActorId,
    pub defender: ActorId,
    /// Who holds or wears the item; the defender for armour hooks
    pub owner: ActorId,
    /// The defender was already dead when the hook ran
    pub mondied: bool,
    pub damage: i32,
}

/// Explosion carried by a projectile, set off when its attack concludes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplosionSpec {
    pub name: String,
    pub dice: (i32, i32),
    pub flavour: Flavour,
    pub radius: i32,
}

/// Ranged setup a launch hook may rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSetup {
    pub agent: ActorId,
    pub projectile: Item,
    pub beam_name: String,
    pub ammo_name: String,
    pub explosion: Option<ExplosionSpec>,
}

impl LaunchSetup {
    pub fn new(agent: ActorId, projectile: Item) -> Self {
        let beam_name = projectile.name();
        let ammo_name = format!("{} {beam_name}", article(&beam_name));
        Self {
            agent,
            projectile,
            beam_name,
            ammo_name,
            explosion: None,
        }
    }
}

/// Result of a launch hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum SetupMissile {
    /// Carry on with the normal setup
    #[default]
    Continue,
    /// Setup is complete; fire as is
    Finished,
    /// Do not fire
    Cancel,
}

/// Outcome flags of an evocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EvokeResult {
    /// Something happened and a turn was used
    pub did_work: bool,
    /// The item cannot be evoked right now
    pub unevokable: bool,
    /// The hook took over the whole evocation
    pub handled: bool,
}

pub type EquipHook =
    fn(&mut Env<'_>, &mut Item, ActorId, &mut bool, bool) -> Result<(), CombatError>;
pub type UnequipHook = fn(&mut Env<'_>, &mut Item, ActorId, &mut bool) -> Result<(), CombatError>;
pub type WorldReactsHook = fn(&mut Env<'_>, &mut Item, ActorId, i32) -> Result<(), CombatError>;
pub type MeleeEffectsHook = fn(&mut Env<'_>, &mut Item, &HitInfo) -> Result<(), CombatError>;
pub type LaunchHook =
    fn(&mut Env<'_>, &mut Item, &mut LaunchSetup) -> Result<SetupMissile, CombatError>;
pub type EvokeHook =
    fn(&mut Env<'_>, &mut Item, ActorId, &mut EvokeResult) -> Result<bool, CombatError>;

/// Optional callbacks for one artifact. An empty slot is a no-op.
#[derive(Clone, Copy, Default)]
pub struct HookBundle {
    pub equip: Option<EquipHook>,
    pub unequip: Option<UnequipHook>,
    pub world_reacts: Option<WorldReactsHook>,
    pub melee_effects: Option<MeleeEffectsHook>,
    pub launch: Option<LaunchHook>,
    pub evoke: Option<EvokeHook>,
}

impl HookBundle {
    pub const EMPTY: HookBundle = HookBundle {
        equip: None,
        unequip: None,
        world_reacts: None,
        melee_effects: None,
        launch: None,
        evoke: None,
    };

    pub fn is_empty(&self) -> bool {
        self.equip.is_none()
            && self.unequip.is_none()
            && self.world_reacts.is_none()
            && self.melee_effects.is_none()
            && self.launch.is_none()
            && self.evoke.is_none()
    }
}

impl fmt::Debug for HookBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookBundle")
            .field("equip", &self.equip.is_some())
            .field("unequip", &self.unequip.is_some())
            .field("world_reacts", &self.world_reacts.is_some())
            .field("melee_effects", &self.melee_effects.is_some())
            .field("launch", &self.launch.is_some())
            .field("evoke", &self.evoke.is_some())
            .finish()
    }
}

/// Artifact identity to hook bundle, indexed by discriminant.
#[derive(Debug, Clone)]
pub struct HookRegistry {
    bundles: Vec<HookBundle>,
}

static GLOBAL_REGISTRY: OnceLock<HookRegistry> = OnceLock::new();

impl HookRegistry {
    /// Every artifact with its standard hooks.
    pub fn standard() -> Self {
        Self {
            bundles: UNRAND_TABLE.iter().map(|entry| entry.hooks).collect(),
        }
    }

    /// No hooks at all.
    pub fn empty() -> Self {
        Self {
            bundles: vec![HookBundle::EMPTY; UnrandArtifact::COUNT],
        }
    }

    /// The shared standard registry, built on first use.
    pub fn global() -> &'static HookRegistry {
        GLOBAL_REGISTRY.get_or_init(HookRegistry::standard)
    }

    /// Replace one artifact's bundle.
    pub fn with_bundle(mut self, art: UnrandArtifact, bundle: HookBundle) -> Self {
        if let Some(slot) = self.bundles.get_mut(art as usize) {
            *slot = bundle;
        }
        self
    }

    pub fn get(&self, art: UnrandArtifact) -> HookBundle {
        self.bundles
            .get(art as usize)
            .copied()
            .unwrap_or(HookBundle::EMPTY)
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Print `text` only while `show_msgs` is set, then clear it.
///
/// The first hook to speak wins; anything after it stays quiet.
pub fn equip_mpr(
    sink: &mut dyn MessageSink,
    show_msgs: &mut bool,
    text: &str,
    channel: MsgChannel,
) {
    if *show_msgs {
        sink.notify(channel, text);
    }
    *show_msgs = false;
}

/// Run `f` on the item in `owner`'s `slot`, putting it back afterwards.
/// `Ok(None)` when the slot is empty.
pub fn with_equipped<R>(
    env: &mut Env<'_>,
    owner: ActorId,
    slot: EquipSlot,
    f: impl FnOnce(&mut Env<'_>, &mut Item) -> Result<R, CombatError>,
) -> Result<Option<R>, CombatError> {
    let Some(mut item) = env.actor_mut(owner)?.equipment_mut().take(slot) else {
        return Ok(None);
    };
    let result = f(env, &mut item);
    if let Some(actor) = env.world.actor_mut(owner) {
        actor.equipment_mut().put(slot, item);
    }
    result.map(Some)
}

fn unrand_in(env: &Env<'_>, owner: ActorId, slot: EquipSlot) -> Option<UnrandArtifact> {
    env.world
        .actor(owner)
        .and_then(|a| a.equipment().get(slot))
        .and_then(|item| item.unrand)
}

/// Put `item` on `owner`, then run its equip hook. Returns whatever the
/// slot held before.
pub fn equip_item(
    env: &mut Env<'_>,
    owner: ActorId,
    slot: EquipSlot,
    item: Item,
    show_msgs: &mut bool,
    unmeld: bool,
) -> Result<Option<Item>, CombatError> {
    let old = env.actor_mut(owner)?.equipment_mut().put(slot, item);

    if let Some(art) = unrand_in(env, owner, slot)
        && let Some(hook) = env.hooks.get(art).equip
    {
        tracing::debug!(%art, %owner, "equip hook");
        with_equipped(env, owner, slot, |env, item| {
            hook(env, item, owner, show_msgs, unmeld)
        })?;
    }

    if *show_msgs && owner.is_player() {
        let name = env
            .actor(owner)?
            .equipment()
            .get(slot)
            .map(Item::the_name)
            .unwrap_or_default();
        let verb = match slot {
            EquipSlot::Weapon => "wield",
            _ => "put on",
        };
        env.say(&format!("You {verb} {name}."));
        *show_msgs = false;
    }
    Ok(old)
}

/// Take the item out of `slot`, running its unequip hook on the way out.
pub fn unequip_item(
    env: &mut Env<'_>,
    owner: ActorId,
    slot: EquipSlot,
    show_msgs: &mut bool,
) -> Result<Option<Item>, CombatError> {
    let Some(mut item) = env.actor_mut(owner)?.equipment_mut().take(slot) else {
        return Ok(None);
    };

    if let Some(art) = item.unrand
        && let Some(hook) = env.hooks.get(art).unequip
    {
        tracing::debug!(%art, %owner, "unequip hook");
        if let Err(err) = hook(env, &mut item, owner, show_msgs) {
            // keep the item where it was rather than lose it
            if let Some(actor) = env.world.actor_mut(owner) {
                actor.equipment_mut().put(slot, item);
            }
            return Err(err);
        }
    }

    if *show_msgs && owner.is_player() {
        env.say(&format!("You take off {}.", item.the_name()));
        *show_msgs = false;
    }
    Ok(Some(item))
}

/// Per-turn tick for every equipped artifact of `owner`.
pub fn world_reacts(env: &mut Env<'_>, owner: ActorId, time_taken: i32) -> Result<(), CombatError> {
    let equipped: Vec<_> = env.actor(owner)?.equipment().unrands().collect();
    for (slot, art) in equipped {
        let Some(hook) = env.hooks.get(art).world_reacts else {
            continue;
        };
        tracing::trace!(%art, %owner, time_taken, "world_reacts hook");
        with_equipped(env, owner, slot, |env, item| hook(env, item, owner, time_taken))?;
    }
    Ok(())
}

/// Run the melee-effects hook of the artifact in `hit.owner`'s `slot`.
/// Returns whether a hook ran.
pub fn melee_effects(env: &mut Env<'_>, slot: EquipSlot, hit: &HitInfo) -> Result<bool, CombatError> {
    let Some(art) = unrand_in(env, hit.owner, slot) else {
        return Ok(false);
    };
    let Some(hook) = env.hooks.get(art).melee_effects else {
        return Ok(false);
    };
    tracing::debug!(%art, attacker = %hit.attacker, defender = %hit.defender, damage = hit.damage, "melee_effects hook");
    with_equipped(env, hit.owner, slot, |env, item| hook(env, item, hit))?;
    Ok(true)
}

/// Run the defender-side hooks of worn armour and shield.
pub fn defender_armour_effects(env: &mut Env<'_>, hit: &HitInfo) -> Result<(), CombatError> {
    for slot in [EquipSlot::Body, EquipSlot::Offhand] {
        melee_effects(env, slot, hit)?;
    }
    Ok(())
}

/// Let the wielded launcher rewrite a shot before it is fired.
pub fn fire_launch(env: &mut Env<'_>, setup: &mut LaunchSetup) -> Result<SetupMissile, CombatError> {
    let owner = setup.agent;
    let Some(art) = unrand_in(env, owner, EquipSlot::Weapon) else {
        return Ok(SetupMissile::Continue);
    };
    let Some(hook) = env.hooks.get(art).launch else {
        return Ok(SetupMissile::Continue);
    };
    tracing::debug!(%art, %owner, "launch hook");
    let outcome = with_equipped(env, owner, EquipSlot::Weapon, |env, item| {
        hook(env, item, setup)
    })?;
    Ok(outcome.unwrap_or_default())
}

/// Evoke the item in `slot`.
pub fn evoke_item(env: &mut Env<'_>, owner: ActorId, slot: EquipSlot) -> Result<EvokeResult, CombatError> {
    let mut result = EvokeResult::default();
    let Some(art) = unrand_in(env, owner, slot) else {
        result.unevokable = true;
        return Ok(result);
    };
    let Some(hook) = env.hooks.get(art).evoke else {
        result.unevokable = true;
        return Ok(result);
    };
    tracing::debug!(%art, %owner, "evoke hook");
    let handled = with_equipped(env, owner, slot, |env, item| {
        hook(env, item, owner, &mut result)
    })?;
    result.handled = handled.unwrap_or(false);
    if !result.did_work && !result.unevokable && owner.is_player() {
        env.say("You feel a momentary sense of loss.");
    }
    Ok(result)
}
