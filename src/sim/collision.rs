//! Pure collision routines
//!
//! Cushion, ball-ball and pocket math with no access to table state, so
//! every rule here is testable in isolation.

use glam::DVec2;

use super::state::{Ball, Pocket};
use crate::consts::*;

/// Contact with a cushion: the clamped ball position and the cushion's
/// inward normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CushionHit {
    pub pos: DVec2,
    pub normal: DVec2,
}

/// Check a ball center against the four cushions. At most one cushion is
/// reported per call; top/bottom win over left/right in a corner, and the
/// returned position is clamped flush against the cushion face.
pub fn cushion_contact(pos: DVec2, radius: f64) -> Option<CushionHit> {
    if pos.y - radius <= TABLE_TOP {
        return Some(CushionHit {
            pos: DVec2::new(pos.x, TABLE_TOP + radius),
            normal: DVec2::new(0.0, 1.0),
        });
    }
    if pos.y + radius >= TABLE_BOTTOM {
        return Some(CushionHit {
            pos: DVec2::new(pos.x, TABLE_BOTTOM - radius),
            normal: DVec2::new(0.0, -1.0),
        });
    }
    if pos.x - radius <= TABLE_LEFT {
        return Some(CushionHit {
            pos: DVec2::new(TABLE_LEFT + radius, pos.y),
            normal: DVec2::new(1.0, 0.0),
        });
    }
    if pos.x + radius >= TABLE_RIGHT {
        return Some(CushionHit {
            pos: DVec2::new(TABLE_RIGHT - radius, pos.y),
            normal: DVec2::new(-1.0, 0.0),
        });
    }
    None
}

/// Cushion restitution: reflect and damp the normal velocity component,
/// keep the tangential component untouched.
#[inline]
pub fn cushion_response(vel: DVec2, normal: DVec2) -> DVec2 {
    let perp = vel.dot(normal) * normal;
    let par = vel - perp;
    par - perp * WALL_RESTITUTION_FACTOR
}

/// Overlap test with symmetric positional correction: overlapping balls
/// are pushed apart along the center line, half the penetration each, so
/// a resolved pair cannot re-trigger on the same tick. Returns whether
/// the pair was in contact.
pub fn detect_ball_collision(a: &mut Ball, b: &mut Ball) -> bool {
    let rel = a.pos - b.pos;
    let dist = rel.length();
    if dist >= a.radius + b.radius {
        return false;
    }
    let dir = rel.normalize_or_zero();
    let half_penetration = (a.radius + b.radius - dist) / 2.0;
    a.pos += dir * half_penetration;
    b.pos -= dir * half_penetration;
    true
}

/// Equal-mass elastic momentum exchange along the center line. Coincident
/// centers leave both velocities untouched.
pub fn apply_ball_collision(a: &mut Ball, b: &mut Ball) {
    let rel = a.pos - b.pos;
    let dist_sq = rel.length_squared();
    if dist_sq == 0.0 {
        return;
    }
    let k = (a.vel - b.vel).dot(rel) / dist_sq;
    a.vel -= rel * k;
    b.vel += rel * k;
}

/// Overlap fraction between a ball and a pocket capture disc, by the
/// squared-chord approximation. Zero once the discs no longer touch.
pub fn pocket_overlap(dist: f64, ball_radius: f64, pocket_radius: f64) -> f64 {
    let reach = ball_radius + pocket_radius;
    if dist >= reach {
        return 0.0;
    }
    let max_r = ball_radius.max(pocket_radius);
    (reach - dist).powi(2) / (4.0 * max_r * max_r)
}

/// The pocket capturing a ball at `pos`, if any overlaps deeply enough. A
/// graze along the pocket rim is not a capture.
pub fn find_pocket(pos: DVec2, radius: f64) -> Option<Pocket> {
    Pocket::ALL.into_iter().find(|pocket| {
        let dist = pos.distance(pocket.center());
        pocket_overlap(dist, radius, POCKET_CAPTURE_RADIUS) >= POCKET_OVERLAP_THRESHOLD
    })
}
