//! Simulation Configuration
//!
//! Tunables for the authoritative loop and the arena layout. Defaults match
//! the shipped game; `SimConfig::from_env()` allows overrides for testing
//! servers without a rebuild.

use std::path::Path;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::fixed::{
    to_fixed, Fixed,
    COOLING_INTERVAL, DYING_DURATION,
};
use crate::core::time::TickRate;
use crate::core::vec3::{self, FixedVec3};
use crate::game::collision::{ColliderShape, CollisionMask, StaticCollider};

/// Where splash damage is measured from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SplashOrigin {
    /// The firing mech's position
    #[default]
    Shooter,
    /// The point of impact
    Impact,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Env var could not be parsed
    #[error("invalid value {value:?} for {key}")]
    InvalidEnv {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
    },
    /// File could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// JSON was malformed
    #[error("failed to parse arena: {0}")]
    Parse(#[from] serde_json::Error),
    /// Arena has nowhere to spawn
    #[error("arena has no spawn points")]
    NoSpawnPoints,
}

/// Configuration for the simulation loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimConfig {
    /// Authoritative ticks per second; every timer counts these
    pub tick_rate: TickRate,
    /// Seconds between entering `Dying` and becoming `Dead`
    pub dying_duration: Fixed,
    /// Seconds between heat dissipation steps
    pub cooling_interval: Fixed,
    /// Splash measurement origin
    pub splash_origin: SplashOrigin,
    /// Seconds wreckage stays before despawning (`None` keeps it forever)
    pub wreckage_lifetime: Option<Fixed>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: TickRate::default(),
            dying_duration: DYING_DURATION,
            cooling_interval: COOLING_INTERVAL,
            splash_origin: SplashOrigin::Shooter,
            wreckage_lifetime: None,
        }
    }
}

impl SimConfig {
    /// Defaults overridden by `MECH_DYING_SECONDS`,
    /// `MECH_COOLING_INTERVAL_SECONDS`, `MECH_SPLASH_ORIGIN`
    /// (`shooter`/`impact`) and `MECH_WRECKAGE_SECONDS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup("MECH_DYING_SECONDS") {
            config.dying_duration = parse_seconds("MECH_DYING_SECONDS", &value, false)?;
        }
        if let Some(value) = lookup("MECH_COOLING_INTERVAL_SECONDS") {
            config.cooling_interval = parse_seconds("MECH_COOLING_INTERVAL_SECONDS", &value, true)?;
        }
        if let Some(value) = lookup("MECH_SPLASH_ORIGIN") {
            config.splash_origin = match value.to_ascii_lowercase().as_str() {
                "shooter" => SplashOrigin::Shooter,
                "impact" => SplashOrigin::Impact,
                _ => return Err(ConfigError::InvalidEnv { key: "MECH_SPLASH_ORIGIN", value }),
            };
        }
        if let Some(value) = lookup("MECH_WRECKAGE_SECONDS") {
            config.wreckage_lifetime = Some(parse_seconds("MECH_WRECKAGE_SECONDS", &value, false)?);
        }

        Ok(config)
    }
}

fn parse_seconds(key: &'static str, value: &str, positive: bool) -> Result<Fixed, ConfigError> {
    let invalid = || ConfigError::InvalidEnv { key, value: value.to_string() };
    let seconds: f64 = value.trim().parse().map_err(|_| invalid())?;
    if !seconds.is_finite() || seconds < 0.0 || (positive && seconds == 0.0) || seconds > 30_000.0 {
        return Err(invalid());
    }
    Ok(to_fixed(seconds))
}

// =============================================================================
// ARENA
// =============================================================================

/// A spawn point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// Position
    #[serde(with = "vec3::serde_decimal")]
    pub position: FixedVec3,
    /// Initial facing
    #[serde(with = "vec3::serde_decimal")]
    pub forward: FixedVec3,
}

/// Static arena description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArenaLayout {
    /// Display name
    pub name: String,
    /// Where mechs (re)spawn
    pub spawn_points: Vec<SpawnPoint>,
    /// Static colliders
    #[serde(default)]
    pub colliders: Vec<StaticCollider>,
}

impl Default for ArenaLayout {
    /// Flat ground with four spawn points facing the centre and a pillar.
    fn default() -> Self {
        let spawn = |x: i32, z: i32, fx: i32, fz: i32| SpawnPoint {
            position: FixedVec3::from_ints(x, 0, z),
            forward: FixedVec3::from_ints(fx, 0, fz),
        };

        Self {
            name: "proving-ground".to_string(),
            spawn_points: vec![
                spawn(0, -60, 0, 1),
                spawn(0, 60, 0, -1),
                spawn(-60, 0, 1, 0),
                spawn(60, 0, -1, 0),
            ],
            colliders: vec![
                StaticCollider::ground(0),
                StaticCollider {
                    id: 1,
                    layer: CollisionMask::STRUCTURES,
                    shape: ColliderShape::Sphere {
                        center: FixedVec3::from_ints(30, 4, 30),
                        radius: to_fixed(6.0),
                    },
                },
            ],
        }
    }
}

impl ArenaLayout {
    /// Parse and validate an arena from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let layout: Self = serde_json::from_str(json)?;
        if layout.spawn_points.is_empty() {
            return Err(ConfigError::NoSpawnPoints);
        }
        Ok(layout)
    }

    /// Load an arena from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}
