//! Protocol Messages
//!
//! Wire schema between the authority and its clients. The transport is
//! supplied by the host; this module only defines and encodes messages.
//! Tagged enums are JSON; flat payloads (snapshots, command batches) also
//! have a bincode encoding.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::game::command::{MechCommand, TriggerFrame};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::mech::{Mech, MechState};
use crate::game::projectile::Projectile;
use crate::game::state::BattleState;
use crate::game::weapon::WeaponState;

/// Protocol encoding errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// JSON encode/decode failed
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// Binary encode/decode failed
    #[error("bincode: {0}")]
    Binary(#[from] bincode::Error),
}

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Explicit commands for the sender's mech.
    Command(CommandBatch),

    /// Trigger state; converted to fire/cease commands by the authority.
    Triggers {
        /// Client tick number
        tick: u32,
        /// Held trigger bits
        frame: TriggerFrame,
    },

    /// Request a full snapshot (for reconnection).
    SyncRequest,

    /// Ping for latency measurement.
    Ping {
        /// Client timestamp, echoed back
        timestamp: u64,
    },
}

/// Commands for one client tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandBatch {
    /// Client tick number.
    pub tick: u32,
    /// Commands in the order they were issued.
    pub commands: Vec<MechCommand>,
}

impl CommandBatch {
    /// Serialize to binary.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize from binary.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ProtocolError> {
        Ok(bincode::deserialize(data)?)
    }
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Battle parameters, sent when the authority starts.
    Welcome(WelcomeInfo),

    /// Replicated world state.
    Snapshot(WorldSnapshot),

    /// Effect playback notification.
    Effect(EffectEvent),

    /// Pong response.
    Pong {
        /// Echoed client timestamp
        timestamp: u64,
        /// Authority tick when answered
        server_tick: u32,
    },
}

/// Battle parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WelcomeInfo {
    /// Battle identifier (hex).
    pub battle_id: String,
    /// Authoritative tick rate (Hz).
    pub tick_rate: u32,
    /// Fingerprint of the definition catalog (hex), so clients can detect
    /// mismatched data.
    pub catalog_fingerprint: String,
    /// Tick the battle starts from.
    pub start_tick: u32,
}

impl WelcomeInfo {
    /// Describe a battle.
    pub fn for_battle(state: &BattleState, tick_rate: u32) -> Self {
        Self {
            battle_id: hex::encode(state.battle_id),
            tick_rate,
            catalog_fingerprint: hex::encode(state.catalog().fingerprint()),
            start_tick: state.tick,
        }
    }
}

/// Replicated state of one mech.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MechSnapshot {
    /// Mech instance id.
    pub id: u32,
    /// Mech type id.
    pub mech_type: u32,
    /// Controlling player, if any.
    pub controller: Option<[u8; 16]>,
    /// Lifecycle state.
    pub state: MechState,
    /// Current health (Fixed as i32).
    pub health: i32,
    /// Current heat (Fixed as i32).
    pub heat: i32,
    /// Current speed (Fixed as i32).
    pub speed: i32,
    /// Current turn rate (Fixed as i32).
    pub turn: i32,
    /// Position (Fixed as i32).
    pub position: [i32; 3],
    /// Facing (Fixed as i32).
    pub forward: [i32; 3],
    /// Overheat flag.
    pub overheated: bool,
    /// Weapon states by slot.
    pub weapons: Vec<WeaponState>,
}

impl MechSnapshot {
    /// Capture a mech.
    pub fn capture(mech: &Mech) -> Self {
        Self {
            id: mech.id().0,
            mech_type: mech.definition().id,
            controller: mech.controller().map(|p| *p.as_bytes()),
            state: mech.state(),
            health: mech.current_health(),
            heat: mech.current_heat(),
            speed: mech.current_speed(),
            turn: mech.current_turn(),
            position: mech.position().to_raw(),
            forward: mech.forward().to_raw(),
            overheated: mech.is_overheated(),
            weapons: mech.weapons().map(|w| w.state()).collect(),
        }
    }
}

/// Replicated state of one projectile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    /// Projectile id.
    pub id: u32,
    /// Firing mech.
    pub owner: Option<u32>,
    /// Position (Fixed as i32).
    pub position: [i32; 3],
    /// Whether flight has ended.
    pub is_hit: bool,
}

impl ProjectileSnapshot {
    /// Capture a projectile.
    pub fn capture(projectile: &Projectile) -> Self {
        Self {
            id: projectile.id().0,
            owner: projectile.owner().map(|m| m.0),
            position: projectile.position().to_raw(),
            is_hit: projectile.is_hit(),
        }
    }
}

/// Full replicated world state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Authority tick.
    pub tick: u32,
    /// Mechs in id order.
    pub mechs: Vec<MechSnapshot>,
    /// Launched projectiles in id order.
    pub projectiles: Vec<ProjectileSnapshot>,
    /// State hash for verification.
    pub state_hash: [u8; 32],
}

impl WorldSnapshot {
    /// Capture the battle.
    pub fn capture(state: &BattleState) -> Self {
        Self {
            tick: state.tick,
            mechs: state.mechs.values().map(MechSnapshot::capture).collect(),
            projectiles: state
                .projectiles
                .values()
                .filter(|p| p.launched())
                .map(ProjectileSnapshot::capture)
                .collect(),
            state_hash: state.compute_hash(),
        }
    }

    /// Serialize to binary.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize from binary.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ProtocolError> {
        Ok(bincode::deserialize(data)?)
    }
}

/// Effect events forwarded to presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum EffectEvent {
    /// Muzzle flash / fire animation.
    WeaponFire {
        /// Authority tick
        tick: u32,
        /// Firing mech
        mech: u32,
        /// Weapon slot
        weapon_index: u8,
    },

    /// Projectile struck something.
    ProjectileImpact {
        /// Authority tick
        tick: u32,
        /// Projectile id
        projectile: u32,
        /// Impact point (Fixed as i32)
        position: [i32; 3],
        /// Surface normal (Fixed as i32)
        normal: [i32; 3],
    },

    /// Instant weapon struck something.
    BeamImpact {
        /// Authority tick
        tick: u32,
        /// Firing mech
        mech: u32,
        /// Weapon slot
        weapon_index: u8,
        /// Impact point (Fixed as i32)
        position: [i32; 3],
        /// Surface normal (Fixed as i32)
        normal: [i32; 3],
    },

    /// Mech started dying.
    MechDeath {
        /// Authority tick
        tick: u32,
        /// Dying mech
        mech: u32,
    },
}

impl EffectEvent {
    /// Convert a game event, if it is an effect.
    pub fn from_game_event(event: &GameEvent) -> Option<Self> {
        let tick = event.tick;
        let effect = match &event.data {
            GameEventData::WeaponFireEffect { mech, weapon_index } => EffectEvent::WeaponFire {
                tick,
                mech: mech.0,
                weapon_index: *weapon_index,
            },
            GameEventData::ProjectileImpactEffect { projectile, position, normal } => {
                EffectEvent::ProjectileImpact {
                    tick,
                    projectile: projectile.0,
                    position: position.to_raw(),
                    normal: normal.to_raw(),
                }
            }
            GameEventData::BeamImpactEffect { mech, weapon_index, position, normal } => {
                EffectEvent::BeamImpact {
                    tick,
                    mech: mech.0,
                    weapon_index: *weapon_index,
                    position: position.to_raw(),
                    normal: normal.to_raw(),
                }
            }
            GameEventData::MechDeathEffect { mech } => EffectEvent::MechDeath { tick, mech: mech.0 },
            // Authoritative bookkeeping is replicated through snapshots
            _ => return None,
        };
        Some(effect)
    }

    /// Tick the effect happened on.
    pub fn tick(&self) -> u32 {
        match self {
            EffectEvent::WeaponFire { tick, .. }
            | EffectEvent::ProjectileImpact { tick, .. }
            | EffectEvent::BeamImpact { tick, .. }
            | EffectEvent::MechDeath { tick, .. } => *tick,
        }
    }
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(s)?)
    }
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(s)?)
    }
}
