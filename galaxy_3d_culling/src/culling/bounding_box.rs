/// Bounding volumes used by the culling engine.
///
/// A `BoundingBox` is an axis-aligned box in object space. Under a world
/// matrix it becomes an `OrientedBox` (corner + three edge vectors), which
/// is what the visibility tests consume.

use glam::{Mat4, Vec3, Vec4};

// ===== BOUNDING BOX =====

/// Axis-aligned bounding box.
///
/// A box with `min > max` on any axis is empty. Empty boxes are never
/// visible and are ignored by unions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl BoundingBox {
    /// The empty box (identity element of `union`)
    pub const EMPTY: BoundingBox = BoundingBox {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing all `points` (empty for no points)
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        points.into_iter().fold(Self::EMPTY, |b, p| BoundingBox {
            min: b.min.min(p),
            max: b.max.max(p),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

// ===== ORIENTED BOX =====

/// World-space box: one corner plus three edge vectors.
///
/// Obtained by transforming an object-space `BoundingBox` by a world matrix.
/// The edges are the matrix axes scaled by the box size, so the volume is
/// exact (no re-fitting to the world axes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    /// Transformed minimum corner (homogeneous, w = 1 for affine matrices)
    pub point: Vec4,
    /// Edge along the object-space X axis (w = 0 for affine matrices)
    pub ex: Vec4,
    /// Edge along the object-space Y axis
    pub ey: Vec4,
    /// Edge along the object-space Z axis
    pub ez: Vec4,
}

impl OrientedBox {
    /// Transform an object-space box by `world`.
    ///
    /// Returns `None` for empty boxes.
    pub fn from_box(bounding_box: &BoundingBox, world: &Mat4) -> Option<Self> {
        if bounding_box.is_empty() {
            return None;
        }
        let extent = bounding_box.max - bounding_box.min;
        Some(Self {
            point: *world * bounding_box.min.extend(1.0),
            ex: world.col(0) * extent.x,
            ey: world.col(1) * extent.y,
            ez: world.col(2) * extent.z,
        })
    }

    /// The 8 homogeneous corners, in the order
    /// p, p+x, p+y, p+x+y, p+z, p+x+z, p+y+z, p+x+y+z
    pub fn corners(&self) -> [Vec4; 8] {
        let p = self.point;
        [
            p,
            p + self.ex,
            p + self.ey,
            p + self.ex + self.ey,
            p + self.ez,
            p + self.ex + self.ez,
            p + self.ey + self.ez,
            p + self.ex + self.ey + self.ez,
        ]
    }

    /// Same box with every component transformed by `matrix`
    /// (used to move a world box into clip space).
    pub fn transformed(&self, matrix: &Mat4) -> OrientedBox {
        OrientedBox {
            point: *matrix * self.point,
            ex: *matrix * self.ex,
            ey: *matrix * self.ey,
            ez: *matrix * self.ez,
        }
    }

    /// Enclosing world-space axis-aligned box
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(self.corners().iter().map(|c| c.truncate()))
    }
}

#[cfg(test)]
#[path = "bounding_box_tests.rs"]
mod tests;
