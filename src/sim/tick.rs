//! Fixed timestep frame pipeline and turn settlement
//!
//! `advance_frame` runs one deterministic physics tick; `process_turn_rules`
//! settles the open turn once every ball has stopped. Drivers call both once
//! per frame.

use crate::sim::collision;
use crate::sim::state::{Ball, BallKind, GameEvent, Player, Pocket, Table};

/// Advance the table by one fixed timestep: resolve ball pairs, step every
/// ball, then capture anything sitting over a pocket.
pub fn advance_frame(table: &mut Table) {
    table.time_ticks += 1;
    resolve_ball_collisions(table);
    for ball in &mut table.balls {
        ball.step();
    }
    capture_pocketed(table);
}

/// Resolve every unordered ball pair at most once per tick. Contacts push
/// both balls apart, exchange momentum, and feed the first-hit rule when
/// the cue ball is involved.
fn resolve_ball_collisions(table: &mut Table) {
    let mut cue_struck: Option<BallKind> = None;

    for i in 0..table.balls.len() {
        let (head, tail) = table.balls.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail {
            if !collision::detect_ball_collision(a, b) {
                continue;
            }
            let impact_speed = (a.vel - b.vel).length();
            collision::apply_ball_collision(a, b);
            table.events.push(GameEvent::BallsCollided {
                a: a.id,
                b: b.id,
                impact_speed,
            });
            if cue_struck.is_none() {
                if a.kind == BallKind::Cue {
                    cue_struck = Some(b.kind);
                } else if b.kind == BallKind::Cue {
                    cue_struck = Some(a.kind);
                }
            }
        }
    }

    if let Some(struck) = cue_struck {
        register_first_contact(table, struck);
    }
}

/// Only the first cue contact of a turn counts. Once suits are assigned
/// and the shooter still has balls up, striking anything but their own
/// suit first is a foul; with their suit cleared every first hit is legal.
fn register_first_contact(table: &mut Table, struck: BallKind) {
    if table.has_ball_been_hit_this_turn {
        return;
    }
    table.has_ball_been_hit_this_turn = true;

    let shooter = table.player(table.current_player);
    let own = match shooter.ball_type {
        Some(kind) => kind,
        None => return,
    };
    if shooter.remaining.is_empty() {
        return;
    }
    if struck != own {
        table.was_wrong_ball_hit = true;
        log::info!("{:?} struck a {:?} first", table.current_player, struck);
    }
}

/// Move every ball overlapping a pocket deeply enough off the table, with
/// rule bookkeeping per capture. Captures are collected first so removal
/// never skips a ball.
fn capture_pocketed(table: &mut Table) {
    let captures: Vec<(u32, Pocket)> = table
        .balls
        .iter()
        .filter_map(|ball| {
            collision::find_pocket(ball.pos, ball.radius).map(|pocket| (ball.id, pocket))
        })
        .collect();

    for (id, pocket) in captures {
        let Some(idx) = table.balls.iter().position(|b| b.id == id) else {
            continue;
        };
        let ball = table.balls.remove(idx);
        handle_pocketed_ball(table, ball, pocket);
    }
}

fn handle_pocketed_ball(table: &mut Table, ball: Ball, pocket: Pocket) {
    log::info!("ball {} ({:?}) pocketed into {:?}", ball.id, ball.kind, pocket);
    table.events.push(GameEvent::BallPocketed {
        ball: ball.id,
        kind: ball.kind,
        pocket,
    });

    match ball.kind {
        // The cue ball earns no shot bonus and never enters a capture
        // list; it respawns at settlement
        BallKind::Cue => {
            table.was_white_ball_pocketed = true;
        }
        BallKind::Black => {
            table.shots_left += 1;
            table.was_black_ball_pocketed = true;
            table.pockets[pocket.index()].push(ball);
        }
        BallKind::Solid | BallKind::Stripe => {
            table.shots_left += 1;
            assign_suits_if_open(table, ball.kind);
            remove_from_owner(table, &ball);
            let wrong = table
                .player(table.current_player)
                .ball_type
                .is_some_and(|own| own != ball.kind);
            if wrong {
                table.was_wrong_ball_pocketed = true;
            }
            table.pockets[pocket.index()].push(ball);
        }
    }
}

/// The first pocketed suit ball closes the open table: the shooter takes
/// its suit, the opponent the other.
fn assign_suits_if_open(table: &mut Table, kind: BallKind) {
    let me = table.current_player;
    if table.player(me).ball_type.is_some() {
        return;
    }
    let other = match kind {
        BallKind::Stripe => BallKind::Solid,
        _ => BallKind::Stripe,
    };
    table.player_mut(me).ball_type = Some(kind);
    table.player_mut(me.opponent()).ball_type = Some(other);
    log::info!("suits assigned: {:?} plays {:?}", me, kind);
}

/// Drop the pocketed color from whichever player owns its suit.
fn remove_from_owner(table: &mut Table, ball: &Ball) {
    for player in [Player::One, Player::Two] {
        let state = table.player_mut(player);
        if state.ball_type != Some(ball.kind) {
            continue;
        }
        if let Some(pos) = state.remaining.iter().position(|c| *c == ball.color) {
            state.remaining.remove(pos);
        }
    }
}

/// Settle the open turn once every ball has stopped, applying outcomes in
/// strict priority: black ball, then scratch, then fouls, then shot
/// accounting. No-op while balls are still rolling or no turn is open.
pub fn process_turn_rules(table: &mut Table) {
    if !table.is_turn_in_play || table.are_balls_moving() {
        return;
    }
    debug_assert!(!table.is_game_over, "turn settled after game over");
    table.is_turn_in_play = false;

    if table.was_black_ball_pocketed {
        settle_black_ball(table);
    } else if table.was_white_ball_pocketed {
        table.reset_cue_ball();
        table.events.push(GameEvent::CueBallRespawned);
        log::info!("{:?} scratched; cue ball respawned", table.current_player);
        pass_turn(table, true);
    } else if table.was_wrong_ball_hit
        || table.was_wrong_ball_pocketed
        || !table.has_ball_been_hit_this_turn
    {
        log::info!("foul by {:?}", table.current_player);
        pass_turn(table, true);
    } else if table.shots_left <= 0 {
        pass_turn(table, false);
    } else {
        log::info!(
            "{:?} stays at the table with {} shot(s)",
            table.current_player,
            table.shots_left
        );
    }

    table.reset_turn_flags();
}

/// Pocketing the black ends the game. It is a win only for a shooter who
/// has cleared their suit and kept the cue ball out of the pockets.
fn settle_black_ball(table: &mut Table) {
    let shooter = table.current_player;
    let premature = !table.player(shooter).remaining.is_empty();
    if premature || table.was_white_ball_pocketed {
        table.declare_winner(shooter.opponent());
    } else {
        table.declare_winner(shooter);
    }
}

/// Hand the table over. A foul grants the incoming player two shots while
/// their suit is still up (one once they are on the black); a plain
/// hand-over grants one.
fn pass_turn(table: &mut Table, foul: bool) {
    table.change_player();
    table.shots_left = if foul { table.shots_for_incoming() } else { 1 };
    table.events.push(GameEvent::TurnChanged {
        player: table.current_player,
        shots_left: table.shots_left,
    });
    log::info!(
        "turn passes to {:?} ({} shots)",
        table.current_player,
        table.shots_left
    );
}
