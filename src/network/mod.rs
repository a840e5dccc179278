//! Network Layer
//!
//! Wire schema, the real-time authority runner and the presentation mirror.
//! This layer is **non-deterministic** - all game logic runs through `game/`.

pub mod protocol;
pub mod runner;
pub mod mirror;

pub use protocol::{
    ClientMessage, ServerMessage, CommandBatch, WelcomeInfo,
    WorldSnapshot, MechSnapshot, ProjectileSnapshot, EffectEvent, ProtocolError,
};
pub use runner::{run_authority, channels, BattleRecord, Inbound, RuntimeConfig};
pub use mirror::MirrorWorld;
