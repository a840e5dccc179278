//! Q16.16 Fixed-Point Arithmetic
//!
//! Deterministic fixed-point math for the combat simulation.
//! All operations use integer arithmetic only - no floats in gameplay logic.
//!
//! ## Format: Q16.16
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Bit Layout: Q16.16 (32-bit signed integer)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  [S][IIIIIIIIIIIIIIII][FFFFFFFFFFFFFFFF]                    │
//! │   │  └──── 16 bits ────┘└──── 16 bits ────┘                 │
//! │   └─ Sign bit                                               │
//! │                                                             │
//! │  Range: -32768.0 to +32767.99998 (approx)                   │
//! │  Precision: 1/65536 ≈ 0.000015 units                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Health, heat, damage, distances and elapsed time (seconds) are all
//! `Fixed`. Products that can leave the 32-bit range (squared distances,
//! ray discriminants) are carried as `i64` Q16.16 via the `*_wide` helpers.

/// Q16.16 fixed-point number stored as i32.
/// 16 bits integer, 16 bits fractional.
pub type Fixed = i32;

/// Number of fractional bits (16)
pub const FIXED_SCALE: i32 = 16;

/// 1.0 in fixed-point (65536)
pub const FIXED_ONE: Fixed = 1 << FIXED_SCALE; // 65536

/// 0.5 in fixed-point (32768)
pub const FIXED_HALF: Fixed = FIXED_ONE >> 1; // 32768

/// Maximum positive value
pub const FIXED_MAX: Fixed = i32::MAX;

// =============================================================================
// SIMULATION CONSTANTS (All as integer literals - NO float conversion!)
// =============================================================================

/// Delay between entering `Dying` and becoming `Dead`: 5.0 s
pub const DYING_DURATION: Fixed = 327680;

/// Interval between heat dissipation steps: 1.0 s
pub const COOLING_INTERVAL: Fixed = FIXED_ONE;

/// Half-width of the playable world on every axis: 8192.0 units.
/// Differences of in-world positions stay inside the Q16.16 range.
pub const WORLD_EXTENT: Fixed = 536870912;

/// Default projectile speed: 300.0 units/sec = 300 * 65536
pub const DEFAULT_PROJECTILE_SPEED: Fixed = 19660800;

/// Default probe length multiplier over one tick's step: 2.0
pub const DEFAULT_LOOK_AHEAD: Fixed = 131072;

/// Default mech collider radius: 2.5 units
pub const DEFAULT_COLLISION_RADIUS: Fixed = 163840;

/// Default torso (collider centre / muzzle) height: 3.0 units
pub const DEFAULT_TORSO_HEIGHT: Fixed = 196608;

/// Default muzzle distance in front of the mech origin: 3.0 units
pub const DEFAULT_MUZZLE_DISTANCE: Fixed = 196608;

// =============================================================================
// CORE OPERATIONS (All deterministic)
// =============================================================================

/// Convert a compile-time or config-time float to fixed-point.
///
/// # Warning
/// Only use at compile-time or initialization. NEVER in tick loop.
///
/// # Example
/// ```
/// use mechwar::core::fixed::{to_fixed, FIXED_ONE};
/// const MY_VALUE: i32 = to_fixed(2.5);
/// assert_eq!(MY_VALUE, FIXED_ONE * 2 + FIXED_ONE / 2);
/// ```
#[inline]
pub const fn to_fixed(f: f64) -> Fixed {
    (f * (FIXED_ONE as f64)) as Fixed
}

/// Convert fixed-point to float for display/logging.
///
/// # Warning
/// Only use for visual output. NEVER use result in game logic.
#[inline]
pub fn to_float(f: Fixed) -> f32 {
    f as f32 / FIXED_ONE as f32
}

/// Create a fixed-point value from a whole number.
#[inline]
pub const fn from_int(i: i32) -> Fixed {
    i << FIXED_SCALE
}

/// Multiply two fixed-point numbers.
///
/// Uses i64 intermediate to prevent overflow, then truncates.
#[inline]
pub fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    let wide = (a as i64) * (b as i64);
    (wide >> FIXED_SCALE) as Fixed
}

/// Divide two fixed-point numbers.
///
/// Pre-shifts numerator to maintain precision.
/// Divide-by-zero returns 0 (not panic).
#[inline]
pub fn fixed_div(a: Fixed, b: Fixed) -> Fixed {
    if b == 0 {
        return 0;
    }
    let wide = (a as i64) << FIXED_SCALE;
    (wide / b as i64) as Fixed
}

/// Exact integer square root (floor) of a 128-bit value.
///
/// Newton iteration from an over-estimate; terminates when the estimate
/// stops decreasing, so the result is identical on every platform.
pub fn isqrt_u128(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let bits = 128 - n.leading_zeros();
    let mut x: u128 = 1 << bits.div_ceil(2);
    loop {
        let y = (x + n / x) >> 1;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// Square root of a fixed-point number.
///
/// Returns 0 for non-positive inputs.
#[inline]
pub fn fixed_sqrt(x: Fixed) -> Fixed {
    fixed_sqrt_wide(x as i64)
}

/// Square root of a wide (i64) Q16.16 value, saturating to `FIXED_MAX`.
///
/// Use for squared lengths that exceed the 32-bit range.
#[inline]
pub fn fixed_sqrt_wide(x: i64) -> Fixed {
    if x <= 0 {
        return 0;
    }
    let root = isqrt_u128((x as u128) << FIXED_SCALE);
    if root > FIXED_MAX as u128 {
        FIXED_MAX
    } else {
        root as Fixed
    }
}

/// Absolute value of a fixed-point number.
#[inline]
pub fn fixed_abs(x: Fixed) -> Fixed {
    if x < 0 { x.wrapping_neg() } else { x }
}

/// Clamp a fixed-point number to a range.
#[inline]
pub fn fixed_clamp(value: Fixed, min: Fixed, max: Fixed) -> Fixed {
    value.max(min).min(max)
}

// =============================================================================
// SERDE (config files carry decimal numbers, the simulation carries Fixed)
// =============================================================================

/// Serde adapter storing a `Fixed` as a decimal number.
///
/// Use with `#[serde(with = "crate::core::fixed::serde_decimal")]` on
/// configuration fields so JSON files stay human-editable.
pub mod serde_decimal {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{to_fixed, Fixed, FIXED_ONE};

    /// Serialize a `Fixed` as `f64`.
    pub fn serialize<S: Serializer>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(*value as f64 / FIXED_ONE as f64)
    }

    /// Deserialize an `f64` into a `Fixed`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Fixed, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Ok(to_fixed(value))
    }
}

// =============================================================================
// TESTS
// =============================================================================
