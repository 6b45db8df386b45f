//! Rotated-rectangle construction and convex polygon intersection.
//!
//! All collision volumes in the world are rectangles rotated on the ground
//! plane, so the Separating Axis Theorem gives an exact test: two convex
//! polygons are disjoint if and only if some edge normal of either polygon
//! separates their vertex projections.

use crate::world::{BoundingBox, Vec2};

/// Rotates `point` about `center` by `angle` radians (right-handed).
pub fn rotate_point(angle: f32, center: Vec2, point: Vec2) -> Vec2 {
    let x = point.x - center.x;
    let z = point.z - center.z;
    let (sin, cos) = angle.sin_cos();
    Vec2 {
        x: x * cos - z * sin + center.x,
        z: x * sin + z * cos + center.z,
    }
}

/// Builds the world-space quadrilateral of a bounding box placed at `center`
/// and rotated by `angle`. Corner order is fixed: [bl, br, fr, fl].
pub fn rotated_rectangle(angle: f32, center: Vec2, bbox: &BoundingBox) -> [Vec2; 4] {
    [
        rotate_point(angle, center, center.add(&bbox.bl)),
        rotate_point(angle, center, center.add(&bbox.br)),
        rotate_point(angle, center, center.add(&bbox.fr)),
        rotate_point(angle, center, center.add(&bbox.fl)),
    ]
}

/// Separating Axis Theorem intersection test for convex polygons.
///
/// Short-circuits to `false` on the first separating axis. The interval
/// comparison is strict, so polygons that merely touch along an edge or at a
/// corner count as intersecting. Zero-area rectangles are handled; there is
/// no normalization and no division.
pub fn polygons_intersect(a: &[Vec2], b: &[Vec2]) -> bool {
    for polygon in [a, b] {
        for i in 0..polygon.len() {
            let p1 = polygon[i];
            let p2 = polygon[(i + 1) % polygon.len()];

            // perpendicular to the edge
            let normal = Vec2 {
                x: p2.z - p1.z,
                z: p1.x - p2.x,
            };

            let (min_a, max_a) = project(a, normal);
            let (min_b, max_b) = project(b, normal);

            // a gap between the projection intervals separates the shapes
            if max_a < min_b || max_b < min_a {
                return false;
            }
        }
    }
    true
}

/// Projects every vertex of `polygon` onto `axis` and returns the interval.
fn project(polygon: &[Vec2], axis: Vec2) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for vertex in polygon {
        let projected = axis.x * vertex.x + axis.z * vertex.z;
        min = min.min(projected);
        max = max.max(projected);
    }
    (min, max)
}
