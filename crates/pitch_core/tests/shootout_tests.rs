//! Penalty shootout tests through the simulation API.
//!
//! A zero-length regulation ends 0-0 at kickoff, so every match here starts
//! directly in the shootout.

use pitch_core::prelude::*;
use pitch_core::shootout::penalty_spot;
use pitch_test_utils::fixtures::{ai_only_config, short_match_config};

fn shootout_sim(seed: u64) -> Simulation {
    Simulation::new(short_match_config(0), seed)
}

fn aim(delta: i8) -> TickInput {
    TickInput {
        aim_delta: delta,
        ..TickInput::IDLE
    }
}

fn confirm() -> TickInput {
    TickInput {
        confirm_shot: true,
        ..TickInput::IDLE
    }
}

/// Tick until an event matching `pred` shows up, returning it.
fn tick_until<F>(sim: &mut Simulation, input: &TickInput, limit: u64, pred: F) -> Option<ShootoutEvent>
where
    F: Fn(&ShootoutEvent) -> bool,
{
    for _ in 0..limit {
        for event in sim.tick(input).events {
            if let MatchEvent::Shootout(e) = event {
                if pred(&e) {
                    return Some(e);
                }
            }
        }
    }
    None
}

#[test]
fn zero_length_match_starts_shootout() {
    let sim = shootout_sim(1);
    assert_eq!(sim.phase(), MatchPhase::Shootout);

    let shootout = sim.shootout().expect("shootout state");
    assert_eq!(shootout.round(), 0);
    assert_eq!(shootout.converted(), [0, 0]);
    assert_eq!(shootout.shooting(), Side::Home);
    assert_eq!(shootout.phase(), ShootoutPhase::Setup);

    let view = sim.snapshot().shootout.expect("shootout view");
    assert_eq!(view.round, 1);
}

#[test]
fn human_taker_waits_for_confirm() {
    let mut sim = shootout_sim(2);
    for _ in 0..200 {
        let events = sim.tick(&TickInput::IDLE);
        assert!(events.is_empty());
    }
    let shootout = sim.shootout().expect("shootout state");
    assert_eq!(shootout.phase(), ShootoutPhase::Setup);
    // Ball waits on the spot in front of the bottom goal.
    assert_eq!(
        sim.ball().position,
        penalty_spot(GoalLine::Bottom, sim.config())
    );
}

#[test]
fn aim_is_clamped() {
    let mut sim = shootout_sim(3);
    for _ in 0..40 {
        sim.tick(&aim(1));
    }
    assert_eq!(sim.shootout().expect("shootout").aim(), Fixed::ONE);

    for _ in 0..80 {
        sim.tick(&aim(-1));
    }
    assert_eq!(sim.shootout().expect("shootout").aim(), -Fixed::ONE);
}

#[test]
fn confirmed_shot_is_taken_and_resolved() {
    let mut sim = shootout_sim(4);
    sim.tick(&TickInput::IDLE);

    let events = sim.tick(&confirm());
    let taken = events.events.iter().find_map(|e| match e {
        MatchEvent::Shootout(ShootoutEvent::PenaltyTaken { side, taker, .. }) => Some((*side, *taker)),
        _ => None,
    });
    // The forward steps up first.
    assert_eq!(taken, Some((Side::Home, 4)));
    assert_eq!(sim.shootout().expect("shootout").phase(), ShootoutPhase::Shooting);

    let resolved = tick_until(&mut sim, &TickInput::IDLE, 300, |e| {
        matches!(e, ShootoutEvent::PenaltyResolved { .. })
    });
    let Some(ShootoutEvent::PenaltyResolved { side, outcome, converted }) = resolved else {
        panic!("kick never resolved");
    };
    assert_eq!(side, Side::Home);
    assert_eq!(converted[0], u32::from(outcome == PenaltyOutcome::Goal));
    assert_eq!(converted[1], 0);
    assert_eq!(sim.shootout().expect("shootout").phase(), ShootoutPhase::Result);
}

#[test]
fn result_is_held_before_next_kick() {
    let mut sim = shootout_sim(5);
    sim.tick(&confirm());
    tick_until(&mut sim, &TickInput::IDLE, 300, |e| {
        matches!(e, ShootoutEvent::PenaltyResolved { .. })
    })
    .expect("kick resolved");

    let hold = sim.config().shootout.result_hold_ticks;
    for _ in 1..hold {
        sim.tick(&TickInput::IDLE);
        assert_eq!(sim.shootout().expect("shootout").phase(), ShootoutPhase::Result);
    }
    sim.tick(&TickInput::IDLE);

    let shootout = sim.shootout().expect("shootout");
    assert_eq!(shootout.phase(), ShootoutPhase::Setup);
    assert_eq!(shootout.shooting(), Side::Away);
    assert_eq!(shootout.round(), 0);
}

#[test]
fn ai_shootout_finishes_with_a_winner() {
    let mut config = ai_only_config();
    config.match_rules.duration_secs = 0;
    let mut sim = Simulation::new(config, 6);

    let finished = tick_until(&mut sim, &TickInput::IDLE, 200_000, |e| {
        matches!(e, ShootoutEvent::Finished { .. })
    });
    let Some(ShootoutEvent::Finished { winner, converted }) = finished else {
        panic!("shootout never finished");
    };

    let shootout = sim.shootout().expect("shootout");
    assert!(shootout.round() >= sim.config().shootout.max_rounds);
    assert_ne!(converted[0], converted[1]);
    assert_eq!(Some(winner), shootout.winner());
    assert_eq!(sim.winner(), Some(winner));
    assert!(sim.is_over());

    let outcome = sim.outcome().expect("outcome");
    assert_eq!(outcome.score, [0, 0]);
    assert_eq!(outcome.penalties, Some(converted));
}

#[test]
fn kicks_alternate_home_first() {
    let mut config = ai_only_config();
    config.match_rules.duration_secs = 0;
    let mut sim = Simulation::new(config, 7);

    let mut sides = Vec::new();
    while sides.len() < 6 && sim.current_tick() < 100_000 {
        for event in sim.tick(&TickInput::IDLE).events {
            if let MatchEvent::Shootout(ShootoutEvent::PenaltyTaken { side, .. }) = event {
                sides.push(side);
            }
        }
    }

    assert_eq!(
        sides,
        vec![Side::Home, Side::Away, Side::Home, Side::Away, Side::Home, Side::Away]
    );
}
