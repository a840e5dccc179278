//! Game Logic Module
//!
//! All battle simulation code. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `definitions`: Immutable mech/weapon type records and the catalog
//! - `weapon`: Ready/Firing/OnCooldown weapon state machine
//! - `projectile`: Server-stepped ballistics
//! - `mech`: Mech aggregate, health/heat and lifecycle
//! - `combat`: Primary and splash damage application
//! - `collision`: Ray probes against mechs and static geometry
//! - `command`: Client commands and trigger frames
//! - `config`: Simulation tunables and arena layout
//! - `state`: Battle registries and spawning
//! - `tick`: Authoritative simulation loop
//! - `events`: Game events for effects/replay/verification

pub mod definitions;
pub mod weapon;
pub mod projectile;
pub mod mech;
pub mod combat;
pub mod collision;
pub mod command;
pub mod config;
pub mod state;
pub mod tick;
pub mod events;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export key types
pub use definitions::{DefinitionCatalog, DefinitionError, MechDefinition, WeaponDefinition};
pub use weapon::{Weapon, WeaponState, HitCheck};
pub use projectile::{Projectile, ProjectileId};
pub use mech::{Mech, MechId, MechState};
pub use command::{MechCommand, TriggerFrame};
pub use config::{SimConfig, SplashOrigin, ArenaLayout};
pub use state::{BattleState, PlayerId, SpawnError};
pub use tick::{TickCommands, TickResult};
pub use events::{GameEvent, GameEventData};
