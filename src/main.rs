//! Eightball entry point
//!
//! Headless demo driver: plays one seeded game between two scripted
//! shooters and logs the narrative. Pass a number for a fixed seed and
//! `--dump` to print the final table as JSON.

use std::time::{SystemTime, UNIX_EPOCH};

use glam::DVec2;
use rand::Rng;
use rand_pcg::Pcg32;

use eightball::consts::*;
use eightball::sim::{advance_frame, process_turn_rules, BallKind, Table};

fn main() {
    env_logger::init();

    let mut seed = None;
    let mut dump = false;
    for arg in std::env::args().skip(1) {
        if arg == "--dump" {
            dump = true;
        } else if let Ok(value) = arg.parse::<u64>() {
            seed = Some(value);
        }
    }
    let seed = seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    });

    log::info!("eightball starting with seed {seed}");
    let mut table = Table::new(seed);
    table.rack();
    table.reset_cue_ball();

    // Driver-side randomness stays outside the simulation state
    let mut aim_rng = Pcg32::new(seed, 101);

    let max_ticks = 600 * TICK_RATE as u64;
    while !table.is_game_over && table.time_ticks < max_ticks {
        if !table.is_turn_in_play && !table.are_balls_moving() {
            take_shot(&mut table, &mut aim_rng);
        }
        advance_frame(&mut table);
        process_turn_rules(&mut table);
        for event in table.take_events() {
            log::debug!("{event:?}");
        }
    }

    match table.winner {
        Some(winner) => println!("{winner:?} wins in {} ticks (seed {seed})", table.time_ticks),
        None => {
            log::warn!("tick cap reached before either player won");
            println!("no winner within {max_ticks} ticks (seed {seed})");
        }
    }

    if dump {
        match serde_json::to_string_pretty(&table) {
            Ok(json) => println!("{json}"),
            Err(err) => log::error!("failed to serialize table: {err}"),
        }
    }
}

/// Aim at the nearest legal ball: the shooter's own suit while any remain,
/// the black once their suit is cleared, anything on an open table.
fn take_shot(table: &mut Table, rng: &mut Pcg32) {
    let Some(cue_pos) = table.cue_ball().map(|b| b.pos) else {
        return;
    };
    let shooter = table.player(table.current_player);
    let own = shooter.ball_type;
    let on_black = own.is_some() && shooter.remaining.is_empty();

    let target = table
        .balls
        .iter()
        .filter(|ball| match (on_black, own) {
            (true, _) => ball.kind == BallKind::Black,
            (false, Some(kind)) => ball.kind == kind,
            (false, None) => ball.kind != BallKind::Cue,
        })
        .min_by(|a, b| {
            let da = a.pos.distance_squared(cue_pos);
            let db = b.pos.distance_squared(cue_pos);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|ball| ball.pos);
    let Some(target) = target else {
        return;
    };

    // Shooting recedes from the aim point, so mirror the target through
    // the cue ball and wobble it a little
    let jitter = DVec2::new(rng.random_range(-8.0..8.0), rng.random_range(-8.0..8.0));
    let aim_point = cue_pos * 2.0 - target + jitter;
    let power = rng.random_range(8.0..MAX_POWER);

    if let Some(prediction) = table.trace_aim(aim_point) {
        log::debug!("aim prediction: {prediction:?}");
    }
    table.shoot(power, aim_point);
}
