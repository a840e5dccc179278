//! Core deterministic primitives.
//!
//! Fixed-point scalars and vectors, the tick time base, the seeded RNG
//! and state hashing.
//! Nothing in here touches floats at simulation time.

pub mod fixed;
pub mod vec3;
pub mod rng;
pub mod hash;
pub mod time;

// Re-export core types
pub use fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use vec3::FixedVec3;
pub use rng::DeterministicRng;
pub use hash::{compute_state_hash, StateHash};
pub use time::TickRate;
