//! Eightball - a two-player pool simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ball physics, collisions, pool rules)
//!
//! Rendering, input polling, and audio are external: callers feed aim/shoot
//! intents in and read ball state and game events back out each tick.

pub mod sim;

pub use sim::state::Table;

/// Game configuration constants
pub mod consts {
    use glam::DVec2;

    /// Simulation cadence the physics constants are tuned for. Velocities
    /// are expressed in units per tick.
    pub const TICK_RATE: u32 = 120;

    /// Playable table interior (cushion faces)
    pub const TABLE_LEFT: f64 = 150.0;
    pub const TABLE_RIGHT: f64 = 450.0;
    pub const TABLE_TOP: f64 = 100.0;
    pub const TABLE_BOTTOM: f64 = 600.0;

    /// Ball defaults
    pub const BALL_RADIUS: f64 = 10.0;
    /// Speed at or below which a ball is considered stopped
    pub const STOP_THRESHOLD: f64 = 0.1;
    /// Velocity retained per tick from rolling resistance
    pub const TABLE_FRICTION_FACTOR: f64 = 0.990;
    /// Fraction of perpendicular velocity kept after a cushion bounce
    pub const WALL_RESTITUTION_FACTOR: f64 = 0.80;
    /// Cosmetic roll counter wraps after this distance
    pub const ROLL_RESET_DISTANCE: f64 = 100.0;

    /// Pocket capture disc radius
    pub const POCKET_CAPTURE_RADIUS: f64 = 15.0;
    /// Minimum ball/pocket overlap fraction for a capture
    pub const POCKET_OVERLAP_THRESHOLD: f64 = 0.15;

    /// Maximum velocity a shot can impart to the cue ball
    pub const MAX_POWER: f64 = 20.0;
    /// Pull-back distance that maps to maximum power
    pub const MAX_POWER_LINE_LENGTH: f64 = 150.0;

    /// Center-to-center spacing radius of racked balls
    pub const RACK_SPACING: f64 = 11.0;
    /// Rows in the triangular rack
    pub const RACK_ROWS: u32 = 5;
    /// Rack apex position
    pub const FOOT_SPOT: DVec2 = DVec2::new(300.0, 250.0);
    /// Cue ball spawn/respawn position
    pub const HEAD_SPOT: DVec2 = DVec2::new(300.0, 500.0);

    /// The cue ball keeps this id across respawns
    pub const CUE_BALL_ID: u32 = 0;
    /// Shots banked by the opening player
    pub const INITIAL_SHOTS: i32 = 2;
}
