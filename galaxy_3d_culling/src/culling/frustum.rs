/// Frustum - six clipping half-spaces for visibility culling.
///
/// Convention: column vectors, `clip = view_projection * world_point`, and
/// the visible volume is `-w <= x, y, z <= w`. Projections with a `[0, w]`
/// depth range are covered conservatively, since their volume is a subset.
///
/// Each plane is a Vec4 (A, B, C, D) where:
/// - (A, B, C) is the inward-pointing unit normal
/// - a point P is inside if dot(plane, (P, 1)) >= 0 for all planes
///
/// A point exactly on a plane counts as inside. No extra tolerance is applied.

use bitflags::bitflags;
use glam::{Mat4, Vec3, Vec4};
use super::bounding_box::OrientedBox;

/// Result of a 3-way frustum/box classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumTest {
    /// Every corner is outside one and the same plane
    Outside,
    /// Every corner is inside every plane
    Inside,
    /// The box straddles at least one plane (counts as visible)
    Partial,
}

/// Six frustum planes: left, right, bottom, top, near, far.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Gribb & Hartmann: each plane is a sum or difference of the matrix
    /// rows. Works for perspective and orthographic projections.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let m = vp.to_cols_array_2d();

        let mut planes = [
            // Left:   row3 + row0
            Vec4::new(m[0][3] + m[0][0], m[1][3] + m[1][0], m[2][3] + m[2][0], m[3][3] + m[3][0]),
            // Right:  row3 - row0
            Vec4::new(m[0][3] - m[0][0], m[1][3] - m[1][0], m[2][3] - m[2][0], m[3][3] - m[3][0]),
            // Bottom: row3 + row1
            Vec4::new(m[0][3] + m[0][1], m[1][3] + m[1][1], m[2][3] + m[2][1], m[3][3] + m[3][1]),
            // Top:    row3 - row1
            Vec4::new(m[0][3] - m[0][1], m[1][3] - m[1][1], m[2][3] - m[2][1], m[3][3] - m[3][1]),
            // Near:   row3 + row2
            Vec4::new(m[0][3] + m[0][2], m[1][3] + m[1][2], m[2][3] + m[2][2], m[3][3] + m[3][2]),
            // Far:    row3 - row2
            Vec4::new(m[0][3] - m[0][2], m[1][3] - m[1][2], m[2][3] - m[2][2], m[3][3] - m[3][2]),
        ];

        for plane in &mut planes {
            let normal_len = Vec3::new(plane.x, plane.y, plane.z).length();
            if normal_len > 0.0 {
                *plane /= normal_len;
            }
        }

        Self { planes }
    }

    /// Classify a set of homogeneous corners against all six planes.
    pub fn classify_points(&self, corners: &[Vec4]) -> FrustumTest {
        let mut all_inside = true;

        for plane in &self.planes {
            let outside = corners.iter().filter(|c| plane.dot(**c) < 0.0).count();
            if outside == corners.len() {
                return FrustumTest::Outside;
            }
            if outside > 0 {
                all_inside = false;
            }
        }

        if all_inside { FrustumTest::Inside } else { FrustumTest::Partial }
    }

    /// Classify a world-space oriented box.
    pub fn classify_box(&self, obb: &OrientedBox) -> FrustumTest {
        self.classify_points(&obb.corners())
    }

    /// Conservative visibility: false only if the box is fully outside
    /// one plane. May return false positives, never false negatives.
    pub fn intersects_box(&self, obb: &OrientedBox) -> bool {
        self.classify_box(obb) != FrustumTest::Outside
    }
}

bitflags! {
    /// Clip-space out-codes of a single homogeneous point.
    ///
    /// A box is trivially outside when the AND of its corners' codes is
    /// non-empty (all corners beyond the same plane).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClipFlags: u8 {
        const LEFT   = 0x01;
        const RIGHT  = 0x02;
        const BOTTOM = 0x04;
        const TOP    = 0x08;
        const NEAR   = 0x10;
        const FAR    = 0x20;
    }
}

impl ClipFlags {
    /// Out-codes of a clip-space point against `-w <= x, y, z <= w`.
    ///
    /// Each plane is tested on its own: behind the eye (`w < 0`) a point can
    /// be beyond both planes of an axis.
    pub fn from_clip(p: Vec4) -> Self {
        let mut flags = ClipFlags::empty();
        flags.set(ClipFlags::LEFT, p.x < -p.w);
        flags.set(ClipFlags::RIGHT, p.x > p.w);
        flags.set(ClipFlags::BOTTOM, p.y < -p.w);
        flags.set(ClipFlags::TOP, p.y > p.w);
        flags.set(ClipFlags::NEAR, p.z < -p.w);
        flags.set(ClipFlags::FAR, p.z > p.w);
        flags
    }

    /// AND of the out-codes of all corners of a clip-space box.
    ///
    /// Empty means the box is visible (not entirely beyond any single plane).
    pub fn common_to_box(clip_box: &OrientedBox) -> Self {
        clip_box
            .corners()
            .iter()
            .fold(ClipFlags::all(), |acc, c| acc & ClipFlags::from_clip(*c))
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
