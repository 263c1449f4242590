//! Game state and core simulation types
//!
//! Everything a snapshot needs lives here; the pending event queue is
//! transient and skipped during serialization.

use glam::DVec2;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision;
use super::ray::Ray;
use crate::consts::*;

/// An RGB ball color, used for ownership correlation and rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// The seven object-ball colors; each suit draws all seven
pub const BALL_COLORS: [Rgb; 7] = [
    Rgb::new(255, 204, 0),  // yellow
    Rgb::new(0, 121, 234),  // blue
    Rgb::new(222, 35, 35),  // red
    Rgb::new(156, 44, 212), // purple
    Rgb::new(255, 102, 0),  // orange
    Rgb::new(0, 200, 0),    // green
    Rgb::new(128, 0, 32),   // burgundy
];

/// Cue ball white
pub const BALL_WHITE: Rgb = Rgb::new(245, 245, 245);
/// Eight ball black
pub const BALL_BLACK: Rgb = Rgb::new(32, 32, 32);

/// Ball classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallKind {
    Solid,
    Stripe,
    Cue,
    Black,
}

/// The six table pockets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pocket {
    TopLeft,
    TopRight,
    CenterLeft,
    CenterRight,
    BottomLeft,
    BottomRight,
}

impl Pocket {
    pub const ALL: [Pocket; 6] = [
        Pocket::TopLeft,
        Pocket::TopRight,
        Pocket::CenterLeft,
        Pocket::CenterRight,
        Pocket::BottomLeft,
        Pocket::BottomRight,
    ];

    /// Center of the capture disc. Corner pockets sit inset into the
    /// cushion corners; side pockets sit on the long cushions.
    pub fn center(self) -> DVec2 {
        let mid_y = (TABLE_TOP + TABLE_BOTTOM) / 2.0;
        match self {
            Pocket::TopLeft => DVec2::new(TABLE_LEFT + 5.0, TABLE_TOP + 5.0),
            Pocket::TopRight => DVec2::new(TABLE_RIGHT - 5.0, TABLE_TOP + 5.0),
            Pocket::CenterLeft => DVec2::new(TABLE_LEFT, mid_y),
            Pocket::CenterRight => DVec2::new(TABLE_RIGHT, mid_y),
            Pocket::BottomLeft => DVec2::new(TABLE_LEFT + 5.0, TABLE_BOTTOM - 5.0),
            Pocket::BottomRight => DVec2::new(TABLE_RIGHT - 5.0, TABLE_BOTTOM - 5.0),
        }
    }

    /// Index into the table's capture lists
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A ball on the table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: DVec2,
    /// Velocity in units per tick
    pub vel: DVec2,
    pub radius: f64,
    pub kind: BallKind,
    pub color: Rgb,
    /// Cosmetic roll counter for renderers; wraps past `ROLL_RESET_DISTANCE`
    pub distance_rolled: f64,
}

impl Ball {
    pub fn new(id: u32, pos: DVec2, color: Rgb, kind: BallKind) -> Self {
        Self {
            id,
            pos,
            vel: DVec2::ZERO,
            radius: BALL_RADIUS,
            kind,
            color,
            distance_rolled: 0.0,
        }
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.vel.length()
    }

    /// Whether the ball is above the stop threshold
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.speed() > STOP_THRESHOLD
    }

    /// Rolling resistance, applied once per tick
    pub fn apply_friction(&mut self) {
        self.vel *= TABLE_FRICTION_FACTOR;
    }

    /// Clamp out of any cushion the ball has reached and reflect its
    /// velocity. Returns whether a cushion was touched.
    pub fn collide_with_cushions(&mut self) -> bool {
        match collision::cushion_contact(self.pos, self.radius) {
            Some(hit) => {
                self.pos = hit.pos;
                self.vel = collision::cushion_response(self.vel, hit.normal);
                true
            }
            None => false,
        }
    }

    /// One tick of single-body motion: cushion check, friction, stop
    /// threshold, then position integration and roll bookkeeping.
    pub fn step(&mut self) {
        self.collide_with_cushions();
        self.apply_friction();
        if self.speed() <= STOP_THRESHOLD {
            self.vel = DVec2::ZERO;
        }
        self.pos += self.vel;
        self.distance_rolled += self.speed();
        if self.distance_rolled > ROLL_RESET_DISTANCE {
            self.distance_rolled = 0.0;
        }
    }
}

/// One of the two players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Index into per-player arrays
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }
}

/// Per-player rule state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    /// Assigned suit; set once on the first pocketed money ball and never
    /// changed afterwards
    pub ball_type: Option<BallKind>,
    /// Colors this player still has on the table
    pub remaining: Vec<Rgb>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            ball_type: None,
            remaining: BALL_COLORS.to_vec(),
        }
    }
}

/// Discrete outputs for presentation and audio layers, drained per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// Two balls exchanged momentum; impact speed is the relative approach
    /// speed, for audio volume mapping
    BallsCollided { a: u32, b: u32, impact_speed: f64 },
    BallPocketed { ball: u32, kind: BallKind, pocket: Pocket },
    CueBallRespawned,
    TurnChanged { player: Player, shots_left: i32 },
    GameOver { winner: Player },
}

/// What the aim ray would strike first
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AimTarget {
    /// An object ball; `point` lies on its surface
    Ball { id: u32, point: DVec2 },
    /// A cushion face
    Cushion { point: DVec2 },
}

/// Seeded RNG state; each draw site takes a fresh stream so reracks
/// reshuffle deterministically per seed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Generator on the next stream
    pub fn next_rng(&mut self) -> Pcg32 {
        self.stream += 1;
        Pcg32::new(self.seed, self.stream)
    }
}

/// Ball kinds in rack order, apex first. Suit colors are irrelevant to the
/// pattern; the black sits in the middle of the third row.
pub const RACK_ORDER: [BallKind; 15] = [
    BallKind::Solid,
    BallKind::Stripe,
    BallKind::Stripe,
    BallKind::Solid,
    BallKind::Black,
    BallKind::Stripe,
    BallKind::Stripe,
    BallKind::Solid,
    BallKind::Solid,
    BallKind::Stripe,
    BallKind::Stripe,
    BallKind::Solid,
    BallKind::Stripe,
    BallKind::Solid,
    BallKind::Solid,
];

/// Centers packing circles of spacing radius `radius` into a triangle of
/// `rows` rows, apex first, building upward from `apex`.
pub fn triangle_pattern(radius: f64, rows: u32, apex: DVec2) -> Vec<DVec2> {
    let mut coords = Vec::new();
    for row in 0..rows {
        let start_x = -(row as f64) * radius;
        let y = -(row as f64) * 3.0_f64.sqrt() * radius;
        for col in 0..=row {
            let x = start_x + col as f64 * 2.0 * radius;
            coords.push(apex + DVec2::new(x, y));
        }
    }
    coords
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Run seed for reproducibility
    pub seed: u64,
    /// RNG state
    pub rng_state: RngState,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Balls in play, in insertion/rack order
    pub balls: Vec<Ball>,
    /// Captured balls per pocket, append-only for the life of a game
    pub pockets: [Vec<Ball>; 6],
    pub current_player: Player,
    /// Shots the current player may still take this visit
    pub shots_left: i32,
    pub players: [PlayerState; 2],
    /// True from `shoot` until the turn settles
    pub is_turn_in_play: bool,
    pub has_ball_been_hit_this_turn: bool,
    pub was_white_ball_pocketed: bool,
    pub was_wrong_ball_hit: bool,
    pub was_wrong_ball_pocketed: bool,
    pub was_black_ball_pocketed: bool,
    pub is_game_over: bool,
    pub winner: Option<Player>,
    /// Pending events since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl Table {
    /// Create an empty table. A game starts with `rack` followed by
    /// `reset_cue_ball`.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng_state: RngState::new(seed),
            time_ticks: 0,
            balls: Vec::new(),
            pockets: Default::default(),
            current_player: Player::One,
            shots_left: INITIAL_SHOTS,
            players: [PlayerState::default(), PlayerState::default()],
            is_turn_in_play: false,
            has_ball_been_hit_this_turn: false,
            was_white_ball_pocketed: false,
            was_wrong_ball_hit: false,
            was_wrong_ball_pocketed: false,
            was_black_ball_pocketed: false,
            is_game_over: false,
            winner: None,
            events: Vec::new(),
        }
    }

    /// Arrange the 15 object balls in the triangular rack. Suit colors are
    /// reshuffled on every rack; an existing cue ball survives the re-rack.
    pub fn rack(&mut self) {
        let cue = self.cue_ball().cloned();
        self.balls.clear();
        for pocket in &mut self.pockets {
            pocket.clear();
        }
        if let Some(cue) = cue {
            self.balls.push(cue);
        }

        let mut rng = self.rng_state.next_rng();
        let mut solid_colors = BALL_COLORS;
        let mut stripe_colors = BALL_COLORS;
        solid_colors.shuffle(&mut rng);
        stripe_colors.shuffle(&mut rng);
        let mut solid_idx = 0;
        let mut stripe_idx = 0;

        let coords = triangle_pattern(RACK_SPACING, RACK_ROWS, FOOT_SPOT);
        for (slot, (pos, kind)) in coords.into_iter().zip(RACK_ORDER).enumerate() {
            let color = match kind {
                BallKind::Solid => {
                    let color = solid_colors[solid_idx];
                    solid_idx += 1;
                    color
                }
                BallKind::Stripe => {
                    let color = stripe_colors[stripe_idx];
                    stripe_idx += 1;
                    color
                }
                _ => BALL_BLACK,
            };
            self.balls.push(Ball::new(slot as u32 + 1, pos, color, kind));
        }

        log::info!("racked {} object balls", RACK_ORDER.len());
    }

    /// Put a fresh cue ball on the head spot. The cue ball keeps id 0
    /// across respawns so event correlation stays stable.
    pub fn reset_cue_ball(&mut self) {
        self.balls
            .push(Ball::new(CUE_BALL_ID, HEAD_SPOT, BALL_WHITE, BallKind::Cue));
    }

    /// The cue ball, while on the table
    pub fn cue_ball(&self) -> Option<&Ball> {
        self.balls.iter().find(|b| b.kind == BallKind::Cue)
    }

    pub fn cue_ball_mut(&mut self) -> Option<&mut Ball> {
        self.balls.iter_mut().find(|b| b.kind == BallKind::Cue)
    }

    /// True while any ball is above the stop threshold; rule evaluation
    /// waits for this to go false.
    pub fn are_balls_moving(&self) -> bool {
        self.balls.iter().any(|b| b.is_moving())
    }

    /// Hit-test a pointer position against the cue ball
    pub fn is_over_cue_ball(&self, point: DVec2) -> bool {
        match self.cue_ball() {
            Some(cue) => cue.pos.distance_squared(point) <= cue.radius * cue.radius,
            None => false,
        }
    }

    /// Shot power from the pull-back distance, saturating at `MAX_POWER`
    /// once the pull reaches `MAX_POWER_LINE_LENGTH`.
    pub fn shot_power(&self, aim_point: DVec2) -> f64 {
        match self.cue_ball() {
            Some(cue) => {
                let pull = cue.pos.distance(aim_point);
                MAX_POWER * (pull / MAX_POWER_LINE_LENGTH).min(1.0)
            }
            None => 0.0,
        }
    }

    /// Predict what the shot ray would strike first: the nearest object
    /// ball, else the nearest cushion. Ball hits take precedence.
    pub fn trace_aim(&self, aim_point: DVec2) -> Option<AimTarget> {
        let cue = self.cue_ball()?;
        let ray = Ray::new(cue.pos, cue.pos - aim_point);

        let mut nearest_ball: Option<(f64, u32, DVec2)> = None;
        for ball in &self.balls {
            if ball.id == cue.id {
                continue;
            }
            if let Some(point) = ray.cast_to_circle(ball.pos, ball.radius) {
                let dist = cue.pos.distance(point);
                if nearest_ball.is_none_or(|(best, _, _)| dist < best) {
                    nearest_ball = Some((dist, ball.id, point));
                }
            }
        }
        if let Some((_, id, point)) = nearest_ball {
            return Some(AimTarget::Ball { id, point });
        }

        let top_left = DVec2::new(TABLE_LEFT, TABLE_TOP);
        let top_right = DVec2::new(TABLE_RIGHT, TABLE_TOP);
        let bottom_left = DVec2::new(TABLE_LEFT, TABLE_BOTTOM);
        let bottom_right = DVec2::new(TABLE_RIGHT, TABLE_BOTTOM);
        let cushions = [
            (top_left, top_right),
            (bottom_left, bottom_right),
            (top_left, bottom_left),
            (top_right, bottom_right),
        ];

        let mut nearest_wall: Option<(f64, DVec2)> = None;
        for (start, end) in cushions {
            if let Some(point) = ray.cast_to_segment(start, end) {
                let dist = cue.pos.distance(point);
                if nearest_wall.is_none_or(|(best, _)| dist < best) {
                    nearest_wall = Some((dist, point));
                }
            }
        }
        nearest_wall.map(|(_, point)| AimTarget::Cushion { point })
    }

    /// Strike the cue ball directly away from `aim_point` with the given
    /// power, opening the turn.
    ///
    /// Panics when the cue ball is off the table: shooting without a cue
    /// ball is a caller-sequencing bug, not a recoverable condition.
    pub fn shoot(&mut self, power: f64, aim_point: DVec2) {
        let cue = self
            .cue_ball_mut()
            .expect("shoot called with no cue ball on the table");
        let direction = (cue.pos - aim_point).normalize_or_zero();
        cue.vel = direction * power;
        self.is_turn_in_play = true;
        self.shots_left -= 1;
        log::info!(
            "{:?} shoots with power {:.1} ({} left)",
            self.current_player,
            power,
            self.shots_left
        );
    }

    /// Read a player's rule state
    pub fn player(&self, player: Player) -> &PlayerState {
        &self.players[player.index()]
    }

    pub fn player_mut(&mut self, player: Player) -> &mut PlayerState {
        &mut self.players[player.index()]
    }

    /// Captured balls for one pocket
    pub fn pocket_contents(&self, pocket: Pocket) -> &[Ball] {
        &self.pockets[pocket.index()]
    }

    /// Hand the table to the other player
    pub fn change_player(&mut self) {
        self.current_player = self.current_player.opponent();
    }

    /// Penalty shots granted to a player coming in off a foul: two while
    /// their suit is still on the table, one once it is cleared.
    pub fn shots_for_incoming(&self) -> i32 {
        if self.player(self.current_player).remaining.is_empty() {
            1
        } else {
            2
        }
    }

    /// Clear the per-turn flags after settlement
    pub fn reset_turn_flags(&mut self) {
        self.has_ball_been_hit_this_turn = false;
        self.was_white_ball_pocketed = false;
        self.was_black_ball_pocketed = false;
        self.was_wrong_ball_hit = false;
        self.was_wrong_ball_pocketed = false;
    }

    /// End the game
    pub fn declare_winner(&mut self, winner: Player) {
        self.is_game_over = true;
        self.winner = Some(winner);
        self.events.push(GameEvent::GameOver { winner });
        log::info!("game over: {:?} wins", winner);
    }

    /// Drain pending events for the presentation layer
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rack_layout() {
        let mut table = Table::new(7);
        table.rack();

        assert_eq!(table.balls.len(), 15);
        let solids = table
            .balls
            .iter()
            .filter(|b| b.kind == BallKind::Solid)
            .count();
        let stripes = table
            .balls
            .iter()
            .filter(|b| b.kind == BallKind::Stripe)
            .count();
        let blacks = table
            .balls
            .iter()
            .filter(|b| b.kind == BallKind::Black)
            .count();
        assert_eq!((solids, stripes, blacks), (7, 7, 1));

        // Ids follow rack order
        let ids: Vec<u32> = table.balls.iter().map(|b| b.id).collect();
        assert_eq!(ids, (1..=15).collect::<Vec<u32>>());

        // Triangular packing leaves no pair overlapping
        for (i, a) in table.balls.iter().enumerate() {
            for b in table.balls.iter().skip(i + 1) {
                assert!(a.pos.distance(b.pos) > 2.0 * crate::consts::BALL_RADIUS);
            }
        }

        // Apex ball sits on the foot spot
        assert!(table.balls[0].pos.distance(crate::consts::FOOT_SPOT) < 1e-9);
    }

    #[test]
    fn test_rack_colors_deterministic_per_seed() {
        let mut a = Table::new(42);
        let mut b = Table::new(42);
        a.rack();
        b.rack();
        let colors_a: Vec<Rgb> = a.balls.iter().map(|ball| ball.color).collect();
        let colors_b: Vec<Rgb> = b.balls.iter().map(|ball| ball.color).collect();
        assert_eq!(colors_a, colors_b);

        // Each suit uses every color exactly once
        for kind in [BallKind::Solid, BallKind::Stripe] {
            let mut suit: Vec<Rgb> = a
                .balls
                .iter()
                .filter(|ball| ball.kind == kind)
                .map(|ball| ball.color)
                .collect();
            for color in BALL_COLORS {
                let before = suit.len();
                suit.retain(|c| *c != color);
                assert_eq!(before - suit.len(), 1);
            }
            assert!(suit.is_empty());
        }
    }

    #[test]
    fn test_reset_cue_ball_survives_rerack() {
        let mut table = Table::new(3);
        table.rack();
        table.reset_cue_ball();
        assert_eq!(table.balls.len(), 16);

        let cue = table.cue_ball().expect("cue ball present");
        assert_eq!(cue.id, crate::consts::CUE_BALL_ID);
        assert_eq!(cue.kind, BallKind::Cue);
        assert!(cue.pos.distance(crate::consts::HEAD_SPOT) < 1e-9);

        table.rack();
        assert_eq!(table.balls.len(), 16);
        assert!(table.cue_ball().is_some());
    }

    #[test]
    fn test_is_over_cue_ball() {
        let mut table = Table::new(1);
        assert!(!table.is_over_cue_ball(crate::consts::HEAD_SPOT));

        table.reset_cue_ball();
        let head = crate::consts::HEAD_SPOT;
        assert!(table.is_over_cue_ball(head));
        assert!(table.is_over_cue_ball(head + DVec2::new(9.0, 0.0)));
        assert!(!table.is_over_cue_ball(head + DVec2::new(11.0, 0.0)));
    }

    #[test]
    fn test_shot_power_saturates() {
        let mut table = Table::new(1);
        assert_eq!(table.shot_power(DVec2::new(0.0, 0.0)), 0.0);

        table.reset_cue_ball();
        let head = crate::consts::HEAD_SPOT;
        assert!((table.shot_power(head) - 0.0).abs() < 1e-9);
        assert!((table.shot_power(head + DVec2::new(75.0, 0.0)) - 10.0).abs() < 1e-9);
        assert!((table.shot_power(head + DVec2::new(150.0, 0.0)) - 20.0).abs() < 1e-9);
        assert!((table.shot_power(head + DVec2::new(400.0, 0.0)) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_shoot_recedes_from_aim_point() {
        let mut table = Table::new(1);
        table.reset_cue_ball();
        let head = crate::consts::HEAD_SPOT;

        table.shoot(12.0, head + DVec2::new(50.0, 0.0));
        let cue = table.cue_ball().expect("cue ball present");
        assert!((cue.vel.x - (-12.0)).abs() < 1e-9);
        assert!(cue.vel.y.abs() < 1e-9);
        assert!(table.is_turn_in_play);
        assert_eq!(table.shots_left, crate::consts::INITIAL_SHOTS - 1);
    }

    #[test]
    fn test_trace_aim_prefers_nearest_ball() {
        let mut table = Table::new(1);
        table.reset_cue_ball();
        table
            .balls
            .push(Ball::new(1, DVec2::new(300.0, 300.0), BALL_COLORS[0], BallKind::Solid));
        table
            .balls
            .push(Ball::new(2, DVec2::new(300.0, 200.0), BALL_COLORS[1], BallKind::Stripe));

        // Aim point below the cue ball casts the ray upward through both
        let target = table.trace_aim(DVec2::new(300.0, 600.0));
        match target {
            Some(AimTarget::Ball { id, point }) => {
                assert_eq!(id, 1);
                assert!((point.y - 310.0).abs() < 1e-9);
                assert!((point.x - 300.0).abs() < 1e-9);
            }
            other => panic!("expected ball hit, got {:?}", other),
        }
    }

    #[test]
    fn test_trace_aim_falls_back_to_cushion() {
        let mut table = Table::new(1);
        table.reset_cue_ball();

        // Nothing in the way: the upward ray exits through the top cushion
        let target = table.trace_aim(DVec2::new(300.0, 600.0));
        match target {
            Some(AimTarget::Cushion { point }) => {
                assert!((point.y - crate::consts::TABLE_TOP).abs() < 1e-9);
                assert!((point.x - 300.0).abs() < 1e-9);
            }
            other => panic!("expected cushion hit, got {:?}", other),
        }

        // Degenerate aim at the cue ball itself predicts nothing
        assert!(table.trace_aim(crate::consts::HEAD_SPOT).is_none());
    }

    #[test]
    fn test_ball_step_zeroes_below_stop_threshold() {
        let mut ball = Ball::new(1, DVec2::new(300.0, 300.0), BALL_WHITE, BallKind::Cue);
        ball.vel = DVec2::new(0.05, 0.0);
        ball.step();
        assert_eq!(ball.vel, DVec2::ZERO);
        assert!((ball.pos.x - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_ball_step_integrates_with_friction() {
        let mut ball = Ball::new(1, DVec2::new(300.0, 300.0), BALL_WHITE, BallKind::Cue);
        ball.vel = DVec2::new(1.0, 0.0);
        ball.step();
        assert!((ball.vel.x - 0.99).abs() < 1e-9);
        assert!((ball.pos.x - 300.99).abs() < 1e-9);
        assert!((ball.distance_rolled - 0.99).abs() < 1e-9);
    }
}
