//! Presentation Mirror
//!
//! Client-side view of a battle built purely from `ServerMessage`s. It holds
//! the last replicated snapshot and queues effect events for playback; it has
//! no way to run combat or change authoritative state.

use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

use crate::game::mech::MechState;
use crate::network::protocol::{
    EffectEvent, MechSnapshot, ProjectileSnapshot, ServerMessage, WelcomeInfo, WorldSnapshot,
};

/// Read-only mirror of the authoritative world.
#[derive(Debug, Default)]
pub struct MirrorWorld {
    welcome: Option<WelcomeInfo>,
    tick: u32,
    state_hash: Option<[u8; 32]>,
    mechs: BTreeMap<u32, MechSnapshot>,
    projectiles: BTreeMap<u32, ProjectileSnapshot>,
    effects: VecDeque<EffectEvent>,
    last_pong: Option<u64>,
}

impl MirrorWorld {
    /// Empty mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a server message into the mirror.
    ///
    /// Snapshots older than the one already held are dropped.
    pub fn apply(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::Welcome(info) => {
                self.tick = info.start_tick;
                self.welcome = Some(info);
            }
            ServerMessage::Snapshot(snapshot) => self.apply_snapshot(snapshot),
            ServerMessage::Effect(effect) => self.effects.push_back(effect),
            ServerMessage::Pong { timestamp, .. } => self.last_pong = Some(timestamp),
        }
    }

    fn apply_snapshot(&mut self, snapshot: WorldSnapshot) {
        if self.state_hash.is_some() && snapshot.tick < self.tick {
            debug!(tick = snapshot.tick, current = self.tick, "stale snapshot dropped");
            return;
        }
        self.tick = snapshot.tick;
        self.state_hash = Some(snapshot.state_hash);
        self.mechs = snapshot.mechs.into_iter().map(|m| (m.id, m)).collect();
        self.projectiles = snapshot.projectiles.into_iter().map(|p| (p.id, p)).collect();
    }

    /// Take queued effects in arrival order.
    pub fn drain_effects(&mut self) -> Vec<EffectEvent> {
        self.effects.drain(..).collect()
    }

    /// Battle parameters, once welcomed.
    pub fn welcome(&self) -> Option<&WelcomeInfo> {
        self.welcome.as_ref()
    }

    /// Tick of the latest snapshot.
    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// State hash of the latest snapshot.
    pub fn state_hash(&self) -> Option<[u8; 32]> {
        self.state_hash
    }

    /// A mech by id.
    pub fn mech(&self, id: u32) -> Option<&MechSnapshot> {
        self.mechs.get(&id)
    }

    /// All mechs in id order.
    pub fn mechs(&self) -> impl Iterator<Item = &MechSnapshot> {
        self.mechs.values()
    }

    /// The mech a player controls.
    pub fn controlled_by(&self, player: &[u8; 16]) -> Option<&MechSnapshot> {
        self.mechs.values().find(|m| m.controller.as_ref() == Some(player))
    }

    /// Mechs currently alive.
    pub fn alive_count(&self) -> usize {
        self.mechs.values().filter(|m| m.state == MechState::Alive).count()
    }

    /// All projectiles in id order.
    pub fn projectiles(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.projectiles.values()
    }

    /// Timestamp of the last pong received.
    pub fn last_pong(&self) -> Option<u64> {
        self.last_pong
    }
}
