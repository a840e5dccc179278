//! Fixed-Point 3D Vector
//!
//! Deterministic 3D vector operations for ballistics and collision probes.
//! Axis convention: +Y is up, +Z is forward, +X is right.

use std::fmt;
use std::ops::{Add, Neg, Sub};
use serde::{Deserialize, Serialize};

use super::fixed::{fixed_div, fixed_mul, fixed_sqrt_wide, Fixed, FIXED_ONE, FIXED_SCALE};

/// 3D vector with fixed-point components.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FixedVec3 {
    /// X component (Q16.16 fixed-point)
    pub x: Fixed,
    /// Y component (Q16.16 fixed-point)
    pub y: Fixed,
    /// Z component (Q16.16 fixed-point)
    pub z: Fixed,
}

impl FixedVec3 {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0, y: 0, z: 0 };

    /// Unit vector pointing right (+X)
    pub const RIGHT: Self = Self { x: FIXED_ONE, y: 0, z: 0 };

    /// Unit vector pointing up (+Y)
    pub const UP: Self = Self { x: 0, y: FIXED_ONE, z: 0 };

    /// Unit vector pointing forward (+Z)
    pub const FORWARD: Self = Self { x: 0, y: 0, z: FIXED_ONE };

    /// Create a new vector from fixed-point components.
    #[inline]
    pub const fn new(x: Fixed, y: Fixed, z: Fixed) -> Self {
        Self { x, y, z }
    }

    /// Create a vector from integer components.
    #[inline]
    pub const fn from_ints(x: i32, y: i32, z: i32) -> Self {
        Self {
            x: x << FIXED_SCALE,
            y: y << FIXED_SCALE,
            z: z << FIXED_SCALE,
        }
    }

    /// Add another vector.
    #[inline]
    pub fn add(self, other: Self) -> Self {
        Self {
            x: self.x.wrapping_add(other.x),
            y: self.y.wrapping_add(other.y),
            z: self.z.wrapping_add(other.z),
        }
    }

    /// Subtract another vector.
    #[inline]
    pub fn sub(self, other: Self) -> Self {
        Self {
            x: self.x.wrapping_sub(other.x),
            y: self.y.wrapping_sub(other.y),
            z: self.z.wrapping_sub(other.z),
        }
    }

    /// Scale by a fixed-point scalar.
    #[inline]
    pub fn scale(self, scalar: Fixed) -> Self {
        Self {
            x: fixed_mul(self.x, scalar),
            y: fixed_mul(self.y, scalar),
            z: fixed_mul(self.z, scalar),
        }
    }

    /// Divide by a fixed-point scalar.
    #[inline]
    pub fn div_scalar(self, scalar: Fixed) -> Self {
        Self {
            x: fixed_div(self.x, scalar),
            y: fixed_div(self.y, scalar),
            z: fixed_div(self.z, scalar),
        }
    }

    /// Dot product as wide Q16.16 (never overflows for in-range vectors).
    #[inline]
    pub fn dot_wide(self, other: Self) -> i64 {
        let sum = (self.x as i128) * (other.x as i128)
            + (self.y as i128) * (other.y as i128)
            + (self.z as i128) * (other.z as i128);
        (sum >> FIXED_SCALE) as i64
    }

    /// Dot product, truncated to `Fixed`.
    #[inline]
    pub fn dot(self, other: Self) -> Fixed {
        self.dot_wide(other) as Fixed
    }

    /// Squared length as wide Q16.16. Prefer this for comparisons.
    #[inline]
    pub fn length_squared(self) -> i64 {
        self.dot_wide(self)
    }

    /// Length (magnitude).
    #[inline]
    pub fn length(self) -> Fixed {
        fixed_sqrt_wide(self.length_squared())
    }

    /// Squared distance to another point as wide Q16.16.
    ///
    /// Component differences are taken in i128, so points further apart
    /// than the `Fixed` range never wrap to a short distance.
    #[inline]
    pub fn distance_squared(self, other: Self) -> i64 {
        let dx = self.x as i128 - other.x as i128;
        let dy = self.y as i128 - other.y as i128;
        let dz = self.z as i128 - other.z as i128;
        let sum = (dx * dx + dy * dy + dz * dz) >> FIXED_SCALE;
        sum.min(i64::MAX as i128) as i64
    }

    /// Distance to another point. Prefer `distance_squared` when possible.
    #[inline]
    pub fn distance(self, other: Self) -> Fixed {
        fixed_sqrt_wide(self.distance_squared(other))
    }

    /// Check whether `other` lies within `radius` of this point (inclusive).
    #[inline]
    pub fn within(self, other: Self, radius: Fixed) -> bool {
        let radius_sq = ((radius as i64) * (radius as i64)) >> FIXED_SCALE;
        self.distance_squared(other) <= radius_sq
    }

    /// Clamp every component to `[-extent, extent]`.
    #[inline]
    pub fn clamp_extent(self, extent: Fixed) -> Self {
        let extent = extent.max(0);
        Self {
            x: self.x.clamp(-extent, extent),
            y: self.y.clamp(-extent, extent),
            z: self.z.clamp(-extent, extent),
        }
    }

    /// Normalize to unit length.
    /// Returns ZERO if length is zero.
    #[inline]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == 0 {
            return Self::ZERO;
        }
        self.div_scalar(len)
    }

    /// Check if all components are zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }

    /// Negate all components.
    #[inline]
    pub fn negate(self) -> Self {
        Self {
            x: self.x.wrapping_neg(),
            y: self.y.wrapping_neg(),
            z: self.z.wrapping_neg(),
        }
    }

    /// Raw components, as sent on the wire.
    #[inline]
    pub fn to_raw(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }

    /// Build from raw wire components.
    #[inline]
    pub fn from_raw(raw: [i32; 3]) -> Self {
        Self::new(raw[0], raw[1], raw[2])
    }

    /// Convert to float tuple for logging.
    #[inline]
    pub fn to_floats(self) -> (f32, f32, f32) {
        (
            self.x as f32 / FIXED_ONE as f32,
            self.y as f32 / FIXED_ONE as f32,
            self.z as f32 / FIXED_ONE as f32,
        )
    }
}

impl Add for FixedVec3 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        FixedVec3::add(self, rhs)
    }
}

impl Sub for FixedVec3 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        FixedVec3::sub(self, rhs)
    }
}

impl Neg for FixedVec3 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        self.negate()
    }
}

impl fmt::Debug for FixedVec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fx, fy, fz) = self.to_floats();
        write!(f, "Vec3({:.3}, {:.3}, {:.3})", fx, fy, fz)
    }
}

impl fmt::Display for FixedVec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fx, fy, fz) = self.to_floats();
        write!(f, "({:.3}, {:.3}, {:.3})", fx, fy, fz)
    }
}

/// Serde adapter storing a `FixedVec3` as `[x, y, z]` decimals.
pub mod serde_decimal {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde::ser::SerializeTuple;

    use super::FixedVec3;
    use crate::core::fixed::{to_fixed, to_float};

    /// Serialize as a 3-element decimal array.
    pub fn serialize<S: Serializer>(value: &FixedVec3, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&(to_float(value.x) as f64))?;
        tuple.serialize_element(&(to_float(value.y) as f64))?;
        tuple.serialize_element(&(to_float(value.z) as f64))?;
        tuple.end()
    }

    /// Deserialize from a 3-element decimal array.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<FixedVec3, D::Error> {
        let [x, y, z] = <[f64; 3]>::deserialize(deserializer)?;
        Ok(FixedVec3::new(to_fixed(x), to_fixed(y), to_fixed(z)))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{from_int, to_fixed};

    #[test]
    fn test_vec3_constants() {
        assert_eq!(FixedVec3::ZERO.length_squared(), 0);
        assert_eq!(FixedVec3::FORWARD.z, FIXED_ONE);
        assert_eq!(FixedVec3::UP.y, FIXED_ONE);
    }

    #[test]
    fn test_vec3_add_sub() {
        let a = FixedVec3::from_ints(3, 4, 5);
        let b = FixedVec3::from_ints(1, 2, 3);
        assert_eq!(a + b, FixedVec3::from_ints(4, 6, 8));
        assert_eq!(a - b, FixedVec3::from_ints(2, 2, 2));
        assert_eq!(-b, FixedVec3::from_ints(-1, -2, -3));
    }

    #[test]
    fn test_vec3_scale() {
        let v = FixedVec3::from_ints(2, 3, -1);
        assert_eq!(v.scale(to_fixed(2.0)), FixedVec3::from_ints(4, 6, -2));
    }

    #[test]
    fn test_vec3_length() {
        let v = FixedVec3::from_ints(2, 3, 6);
        assert_eq!(v.length_squared(), 49i64 << 16);
        assert_eq!(v.length(), from_int(7));
    }

    #[test]
    fn test_vec3_large_distance() {
        // 300 units apart squares to 90000, beyond the i32 Fixed range
        let a = FixedVec3::ZERO;
        let b = FixedVec3::from_ints(0, 0, 300);
        assert_eq!(a.distance(b), from_int(300));
        assert!(a.within(b, from_int(300)));
        assert!(!a.within(b, from_int(299)));
    }

    #[test]
    fn test_vec3_far_points_are_not_close() {
        // 40000 units apart: a wrapped 32-bit difference would read ~25536
        let a = FixedVec3::from_ints(-20_000, 0, 0);
        let b = FixedVec3::from_ints(20_000, 0, 0);
        assert_eq!(a.distance_squared(b), (40_000i64 * 40_000) << 16);
        assert!(!a.within(b, from_int(30_000)));
        assert!(!b.within(a, from_int(30_000)));
    }

    #[test]
    fn test_vec3_clamp_extent() {
        let v = FixedVec3::from_ints(-20_000, 5, 20_000);
        assert_eq!(v.clamp_extent(from_int(100)), FixedVec3::from_ints(-100, 5, 100));
        assert_eq!(FixedVec3::from_ints(1, 2, 3).clamp_extent(from_int(100)), FixedVec3::from_ints(1, 2, 3));
    }

    #[test]
    fn test_vec3_normalize() {
        let v = FixedVec3::from_ints(0, 0, 10);
        assert_eq!(v.normalize(), FixedVec3::FORWARD);

        let diagonal = FixedVec3::from_ints(1, 1, 0).normalize();
        assert!((diagonal.length() - FIXED_ONE).abs() < 4);

        assert_eq!(FixedVec3::ZERO.normalize(), FixedVec3::ZERO);
    }

    #[test]
    fn test_vec3_dot() {
        let a = FixedVec3::from_ints(1, 2, 3);
        let b = FixedVec3::from_ints(4, -5, 6);
        // 4 - 10 + 18 = 12
        assert_eq!(a.dot(b), from_int(12));
    }

    #[test]
    fn test_vec3_serde_decimal() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Holder {
            #[serde(with = "serde_decimal")]
            at: FixedVec3,
        }

        let parsed: Holder = serde_json::from_str(r#"{"at": [1.5, 0, -2]}"#).unwrap();
        assert_eq!(parsed.at, FixedVec3::new(to_fixed(1.5), 0, from_int(-2)));
    }
}
