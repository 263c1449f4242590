//! Ray casting for aim-trajectory prediction
//!
//! A ray is an origin plus a unit direction. Casts return the first
//! intersection point ahead of the origin, or `None`:
//! - segment: solve for ray parameter t and segment parameter u, accept
//!   t >= 0 and 0 <= u <= 1
//! - circle: projected-distance/discriminant quadratic, near root only

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A parametric ray in table space
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ray {
    pub origin: DVec2,
    /// Unit direction. Zero when constructed from a zero-length vector,
    /// in which case every cast reports no hit.
    pub dir: DVec2,
}

impl Ray {
    pub fn new(origin: DVec2, direction: DVec2) -> Self {
        Self {
            origin,
            dir: direction.normalize_or_zero(),
        }
    }

    /// Intersect with the line segment from `start` to `end`.
    ///
    /// Parallel and degenerate configurations (zero determinant) report no
    /// intersection rather than failing.
    pub fn cast_to_segment(&self, start: DVec2, end: DVec2) -> Option<DVec2> {
        let seg = end - start;
        let denom = self.dir.x * seg.y - self.dir.y * seg.x;
        if denom == 0.0 {
            return None;
        }

        let to_start = start - self.origin;
        let t = (to_start.x * seg.y - to_start.y * seg.x) / denom;
        let u = (to_start.x * self.dir.y - to_start.y * self.dir.x) / denom;

        if t >= 0.0 && (0.0..=1.0).contains(&u) {
            Some(self.origin + self.dir * t)
        } else {
            None
        }
    }

    /// Intersect with the circle at `center` of radius `radius`, returning
    /// the near intersection (the surface point facing the origin).
    pub fn cast_to_circle(&self, center: DVec2, radius: f64) -> Option<DVec2> {
        if self.dir == DVec2::ZERO {
            return None;
        }

        let to_origin = self.origin - center;
        let b = to_origin.dot(self.dir);
        let c = to_origin.length_squared() - radius * radius;

        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let t = -b - discriminant.sqrt();
        if t >= 0.0 {
            Some(self.origin + self.dir * t)
        } else {
            None
        }
    }
}
