//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (rack/insertion order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod ray;
pub mod state;
pub mod tick;

pub use collision::{
    apply_ball_collision, cushion_contact, cushion_response, detect_ball_collision, find_pocket,
    CushionHit,
};
pub use ray::Ray;
pub use state::{
    AimTarget, Ball, BallKind, GameEvent, Player, PlayerState, Pocket, Rgb, Table, BALL_BLACK,
    BALL_COLORS, BALL_WHITE, RACK_ORDER,
};
pub use tick::{advance_frame, process_turn_rules};
