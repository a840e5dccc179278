//! # Mechwar Battle Server
//!
//! Authoritative simulation for a networked mech-combat game: mech
//! health/heat/lifecycle, weapon fire cycles, projectile ballistics and
//! damage resolution.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    MECHWAR SERVER                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── fixed.rs    - Q16.16 fixed-point arithmetic             │
//! │  ├── vec3.rs     - 3D vector with fixed-point                │
//! │  ├── time.rs     - Tick-counted time base                    │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Battle logic (deterministic)              │
//! │  ├── definitions - Mech and weapon type catalog              │
//! │  ├── weapon.rs   - Weapon fire/cooldown state machine        │
//! │  ├── projectile  - Ballistic stepping                        │
//! │  ├── mech.rs     - Health, heat, lifecycle                   │
//! │  ├── combat.rs   - Primary and splash damage                 │
//! │  ├── collision   - Ray probes                                │
//! │  ├── state.rs    - Battle registries                         │
//! │  └── tick.rs     - Authoritative simulation loop             │
//! │                                                              │
//! │  network/        - Non-deterministic plumbing                │
//! │  ├── protocol.rs - Message types                             │
//! │  ├── runner.rs   - Real-time authority loop                  │
//! │  └── mirror.rs   - Read-only client view                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**:
//! - No floating-point arithmetic in game logic
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time dependencies
//! - All randomness from seeded Xorshift128+
//!
//! A recorded command log replayed from the same initial state reproduces
//! the same state hash.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use core::fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use core::vec3::FixedVec3;
pub use core::rng::DeterministicRng;
pub use core::time::TickRate;
pub use game::definitions::{DefinitionCatalog, MechDefinition, WeaponDefinition};
pub use game::mech::{Mech, MechId, MechState};
pub use game::state::{BattleState, PlayerId};
pub use game::tick::{tick, replay_battle, TickResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;

/// Definition catalog shipped with the server.
pub const BUNDLED_CATALOG: &str = include_str!("../data/catalog.json");
