//! Collision Probes
//!
//! Deterministic ray queries used by projectile look-ahead and instant-hit
//! weapons. Mechs are spheres centred at torso height; the arena adds
//! static spheres (obstacles) and planes (ground, walls).
//!
//! All intersection math is carried in wide Q16.16 so long probes across
//! the arena cannot overflow.

use serde::{Serialize, Deserialize};

use crate::core::fixed::{fixed_sqrt_wide, Fixed, FIXED_SCALE};
use crate::core::vec3::{self, FixedVec3};
use crate::game::mech::MechId;

// =============================================================================
// LAYERS
// =============================================================================

/// Bit set of collision layers a probe may hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollisionMask(pub u8);

impl CollisionMask {
    /// Hits nothing
    pub const NONE: Self = Self(0);
    /// Mech colliders
    pub const MECHS: Self = Self(1);
    /// Ground and terrain planes
    pub const TERRAIN: Self = Self(1 << 1);
    /// Static obstacles
    pub const STRUCTURES: Self = Self(1 << 2);
    /// Every layer
    pub const ALL: Self = Self(0b111);

    /// Check whether any bit of `layer` is set in this mask.
    #[inline]
    pub fn intersects(self, layer: Self) -> bool {
        self.0 & layer.0 != 0
    }
}

impl Default for CollisionMask {
    fn default() -> Self {
        Self::ALL
    }
}

// =============================================================================
// QUERIES & HITS
// =============================================================================

/// What a ray struck.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitTarget {
    /// A mech collider (live or wreckage)
    Mech(MechId),
    /// A static arena collider
    Static(u32),
}

/// Closest intersection along a ray.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RayHit {
    /// World-space point of impact
    pub point: FixedVec3,
    /// Surface normal at the point of impact
    pub normal: FixedVec3,
    /// Distance from the ray origin
    pub distance: Fixed,
    /// What was hit
    pub target: HitTarget,
}

/// A ray cast request.
#[derive(Clone, Copy, Debug)]
pub struct RayQuery {
    /// Ray origin
    pub origin: FixedVec3,
    /// Unit direction
    pub direction: FixedVec3,
    /// Maximum distance to search
    pub max_distance: Fixed,
    /// Layers that may be hit
    pub mask: CollisionMask,
    /// Mech to skip (the shooter)
    pub ignore: Option<MechId>,
}

/// Anything that can answer ray queries against the world.
pub trait CollisionProbe {
    /// Return the closest hit along the ray, if any.
    fn cast(&self, query: &RayQuery) -> Option<RayHit>;
}

/// A probe that never hits anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyProbe;

impl CollisionProbe for EmptyProbe {
    fn cast(&self, _query: &RayQuery) -> Option<RayHit> {
        None
    }
}

// =============================================================================
// PRIMITIVES
// =============================================================================

/// Intersect a ray with a sphere.
///
/// Returns `(distance, point, normal)` for the first contact. A ray that
/// starts inside the sphere reports a hit at distance 0 facing back along
/// the ray.
pub fn ray_sphere(
    origin: FixedVec3,
    direction: FixedVec3,
    max_distance: Fixed,
    center: FixedVec3,
    radius: Fixed,
) -> Option<(Fixed, FixedVec3, FixedVec3)> {
    let m = origin - center;
    let b = m.dot_wide(direction) as i128;
    let r = radius as i128;
    let c = m.length_squared() as i128 - ((r * r) >> FIXED_SCALE);

    // Outside and pointing away
    if c > 0 && b > 0 {
        return None;
    }

    let disc = ((b * b) >> FIXED_SCALE) - c;
    if disc < 0 {
        return None;
    }

    if c <= 0 {
        return Some((0, origin, direction.negate()));
    }

    let root = fixed_sqrt_wide(disc.min(i64::MAX as i128) as i64) as i128;
    let t = -b - root;
    if t < 0 || t > max_distance as i128 {
        return None;
    }

    let t = t as Fixed;
    let point = origin + direction.scale(t);
    let normal = (point - center).normalize();
    Some((t, point, normal))
}

/// Intersect a ray with the front face of a plane.
///
/// `normal` must be unit length. Rays parallel to the plane or
/// approaching from behind do not hit.
pub fn ray_plane(
    origin: FixedVec3,
    direction: FixedVec3,
    max_distance: Fixed,
    plane_point: FixedVec3,
    normal: FixedVec3,
) -> Option<(Fixed, FixedVec3, FixedVec3)> {
    let denom = direction.dot_wide(normal) as i128;
    if denom >= 0 {
        return None;
    }

    let num = (plane_point - origin).dot_wide(normal) as i128;
    let t = (num << FIXED_SCALE) / denom;
    if t < 0 || t > max_distance as i128 {
        return None;
    }

    let t = t as Fixed;
    Some((t, origin + direction.scale(t), normal))
}

// =============================================================================
// ARENA GEOMETRY
// =============================================================================

/// Shape of a static collider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ColliderShape {
    /// Sphere obstacle
    Sphere {
        /// Centre point
        #[serde(with = "vec3::serde_decimal")]
        center: FixedVec3,
        /// Radius
        #[serde(with = "crate::core::fixed::serde_decimal")]
        radius: Fixed,
    },
    /// Infinite one-sided plane
    Plane {
        /// Any point on the plane
        #[serde(with = "vec3::serde_decimal")]
        point: FixedVec3,
        /// Unit normal (front face)
        #[serde(with = "vec3::serde_decimal")]
        normal: FixedVec3,
    },
}

/// Static arena collider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaticCollider {
    /// Collider id reported in hits
    pub id: u32,
    /// Layer this collider lives on
    pub layer: CollisionMask,
    /// Geometry
    #[serde(flatten)]
    pub shape: ColliderShape,
}

impl StaticCollider {
    /// Ground plane at height 0 facing up.
    pub fn ground(id: u32) -> Self {
        Self {
            id,
            layer: CollisionMask::TERRAIN,
            shape: ColliderShape::Plane {
                point: FixedVec3::ZERO,
                normal: FixedVec3::UP,
            },
        }
    }

    fn intersect(&self, query: &RayQuery) -> Option<(Fixed, FixedVec3, FixedVec3)> {
        match self.shape {
            ColliderShape::Sphere { center, radius } => {
                ray_sphere(query.origin, query.direction, query.max_distance, center, radius)
            }
            ColliderShape::Plane { point, normal } => {
                ray_plane(query.origin, query.direction, query.max_distance, point, normal)
            }
        }
    }
}

/// Sphere collider for one mech, captured at probe-build time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MechCollider {
    /// Mech id
    pub id: MechId,
    /// Sphere centre (torso)
    pub center: FixedVec3,
    /// Sphere radius
    pub radius: Fixed,
}

/// Probe over a snapshot of mech colliders plus the static arena.
pub struct SceneProbe<'a> {
    mechs: Vec<MechCollider>,
    statics: &'a [StaticCollider],
}

impl<'a> SceneProbe<'a> {
    /// Build a probe. `mechs` should be in id order for stable tie-breaks.
    pub fn new(mechs: Vec<MechCollider>, statics: &'a [StaticCollider]) -> Self {
        Self { mechs, statics }
    }

    /// Number of mech colliders in the snapshot.
    pub fn mech_count(&self) -> usize {
        self.mechs.len()
    }
}

impl CollisionProbe for SceneProbe<'_> {
    fn cast(&self, query: &RayQuery) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;
        let mut consider = |hit: Option<(Fixed, FixedVec3, FixedVec3)>, target: HitTarget| {
            if let Some((distance, point, normal)) = hit {
                // Strictly closer only, so earlier colliders win ties
                if best.map_or(true, |b| distance < b.distance) {
                    best = Some(RayHit { point, normal, distance, target });
                }
            }
        };

        if query.mask.intersects(CollisionMask::MECHS) {
            for mech in &self.mechs {
                if query.ignore == Some(mech.id) {
                    continue;
                }
                let hit = ray_sphere(
                    query.origin,
                    query.direction,
                    query.max_distance,
                    mech.center,
                    mech.radius,
                );
                consider(hit, HitTarget::Mech(mech.id));
            }
        }

        for collider in self.statics {
            if !query.mask.intersects(collider.layer) {
                continue;
            }
            consider(collider.intersect(query), HitTarget::Static(collider.id));
        }

        best
    }
}

// =============================================================================
// TESTS
// =============================================================================
