//! Property tests for invariants that must hold on every tick.

use pitch_core::prelude::*;
use pitch_core::shootout::save_probability;
use pitch_test_utils::determinism::strategies::{arb_delta, arb_input_sequence, arb_pitch_position};
use pitch_test_utils::fixtures::{fixed_f, seeded_sim};
use pitch_test_utils::proptest::prelude::*;

fn assert_tick_invariants(sim: &Simulation) {
    let field = &sim.config().field;
    for side in Side::BOTH {
        let team = sim.team(side);
        for p in &team.players {
            assert!(field.contains(p.position()), "{} off the pitch at {:?}", p.name, p.position());
            assert!(p.stamina() >= Fixed::ZERO, "{} stamina below zero", p.name);
            assert!(p.stamina() <= p.max_stamina(), "{} stamina above cap", p.name);
        }
        assert_eq!(team.players.iter().filter(|p| p.controllable).count(), 1);
        assert!(team.players[team.controlled_index()].controllable);
    }
}

fn speed_squared(ball: &Ball) -> Fixed {
    ball.velocity.dot(ball.velocity)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Players stay on the pitch, stamina stays in range and exactly one
    /// player per team is controllable, whatever the human does.
    #[test]
    fn prop_tick_invariants_hold(
        inputs in arb_input_sequence(400),
        seed in 0u64..1000,
    ) {
        let mut sim = seeded_sim(seed);
        assert_tick_invariants(&sim);
        for input in &inputs {
            sim.tick(input);
            assert_tick_invariants(&sim);
        }
    }

    /// Without players nearby the ball only ever slows down.
    #[test]
    fn prop_free_ball_never_speeds_up(
        position in arb_pitch_position(),
        velocity in arb_delta(),
    ) {
        let config = SimConfig::default();
        let mut ball = Ball::new(position, config.ball.radius);
        ball.velocity = velocity;

        for _ in 0..30 {
            let before = speed_squared(&ball);
            ball.update(std::iter::empty::<&Player>(), &config);
            prop_assert!(speed_squared(&ball) <= before);
        }
    }

    /// Once slow enough on both axes, the ball stops dead.
    #[test]
    fn prop_slow_ball_snaps_to_rest(
        position in arb_pitch_position(),
        vx in -9i32..=9,
        vy in -9i32..=9,
    ) {
        let config = SimConfig::default();
        let mut ball = Ball::new(position, config.ball.radius);
        // Components below 0.1 after friction.
        ball.velocity = Vec2Fixed::new(fixed_f(f64::from(vx) / 100.0), fixed_f(f64::from(vy) / 100.0));

        ball.update(std::iter::empty::<&Player>(), &config);
        prop_assert!(ball.velocity.is_zero());
    }

    /// Player movement never leaves the pitch, even when pushed at a wall.
    #[test]
    fn prop_player_moves_stay_in_bounds(
        start in arb_pitch_position(),
        deltas in proptest::collection::vec(arb_delta(), 1..60),
    ) {
        let config = SimConfig::default();
        let mut player = Player::new(&config.teams[0].players[2], Side::Home, 2, start, &config);
        for delta in deltas {
            player.move_by(delta, &config);
            prop_assert!(config.field.contains(player.position()));
            prop_assert!(player.stamina() >= Fixed::ZERO);
        }
    }

    /// A keeper closer to the ball never has a lower save chance.
    #[test]
    fn prop_save_chance_falls_with_distance(
        x in 360i32..=440,
        near in 0i32..60,
        gap in 1i32..60,
    ) {
        let config = SimConfig::default();
        let ball = Vec2Fixed::from_int(x, 535);
        let keeper_near = Vec2Fixed::from_int(x, 535 - near);
        let keeper_far = Vec2Fixed::from_int(x, 535 - near - gap);

        let p_near = save_probability(keeper_near, Fixed::ZERO, ball, &config.field, &config.shootout);
        let p_far = save_probability(keeper_far, Fixed::ZERO, ball, &config.field, &config.shootout);

        prop_assert!(p_near >= p_far);
        prop_assert!(p_near <= config.shootout.max_save_chance);
        prop_assert!(p_far >= config.shootout.base_save_chance);
    }
}
