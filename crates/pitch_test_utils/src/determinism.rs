//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the match simulation produces
//! identical results given identical config, seed and inputs.
//!
//! # Testing Strategy
//!
//! Replays and headless batch runs only work if a match is a pure function
//! of its config, seed and input stream. Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`pitch_core::math::Fixed`] throughout.
//!
//! - **Iteration order**: Players are always processed home first, then in
//!   slot order. No hash map iteration reaches the simulation.
//!
//! - **System randomness**: All chance rolls go through the seeded RNG the
//!   simulation owns.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual system determinism (ball, AI, shootout)
//! 2. **Property tests**: Random input scripts must still replay exactly
//! 3. **Integration tests**: Full matches are reproducible
//! 4. **Parallel tests**: Running N matches on N threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use pitch_core::input::TickInput;
use pitch_core::simulation::Simulation;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Result of parallel simulation runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final state hash from each simulation.
    pub hashes: Vec<u64>,
    /// Number of ticks each simulation ran.
    pub ticks: u64,
    /// Number of simulations run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all simulations produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all simulations matched.
    ///
    /// # Panics
    ///
    /// Panics if simulations produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel simulations diverged!\n\
                 Simulations: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims,
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one tick
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```
/// use pitch_core::config::SimConfig;
/// use pitch_core::input::TickInput;
/// use pitch_core::simulation::Simulation;
/// use pitch_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(
///     3,
///     100,
///     || Simulation::new(SimConfig::default(), 7),
///     |sim| {
///         sim.tick(&TickInput::IDLE);
///     },
///     Simulation::state_hash,
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a scripted match twice and compare final state hashes.
///
/// `script` maps the current tick to the input for that tick.
pub fn verify_scripted_determinism<F, I>(setup_fn: F, script: I, num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
    I: Fn(u64) -> TickInput,
{
    verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |sim| {
            let input = script(sim.current_tick());
            sim.tick(&input);
        },
        Simulation::state_hash,
    )
    .is_deterministic
}

/// Run an idle match twice and compare final state hashes.
///
/// With no human input the AI plays both sides, which still exercises
/// every system in the tick.
pub fn verify_simulation_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    verify_scripted_determinism(setup_fn, |_| TickInput::IDLE, num_ticks)
}

/// Run N simulations on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling or
/// memory layout differences.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn run_parallel_simulations_scoped<F>(
    setup_fn: F,
    num_sims: usize,
    num_ticks: u64,
) -> ParallelSimResult
where
    F: Fn() -> Simulation + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    for _ in 0..num_ticks {
                        sim.tick(&TickInput::IDLE);
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    });

    ParallelSimResult {
        hashes,
        ticks: num_ticks,
        num_sims,
    }
}

/// Compare two scripted runs tick-by-tick, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs stay identical, `Some(tick)` for the first tick
/// after which their hashes differ (0 means they differ before any tick).
pub fn find_first_divergence<F, I>(setup_fn: F, script: I, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
    I: Fn(u64) -> TickInput,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        let input = script(sim1.current_tick());
        sim1.tick(&input);
        sim2.tick(&input);

        if sim1.state_hash() != sim2.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Verify that a serialization round-trip preserves simulation state and
/// that the restored copy keeps evolving identically.
pub fn verify_serialization_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    let mut sim = setup_fn();

    for _ in 0..num_ticks {
        sim.tick(&TickInput::IDLE);
    }

    let Ok(bytes) = sim.serialize() else {
        return false;
    };
    let Ok(mut restored) = Simulation::deserialize(&bytes) else {
        return false;
    };

    if restored.state_hash() != sim.state_hash() {
        return false;
    }

    for _ in 0..num_ticks {
        sim.tick(&TickInput::IDLE);
        restored.tick(&TickInput::IDLE);
    }

    restored.state_hash() == sim.state_hash()
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of the match simulation.
pub mod strategies {
    use proptest::prelude::*;

    use pitch_core::config::{Difficulty, FieldConfig};
    use pitch_core::input::TickInput;
    use pitch_core::math::{Fixed, Vec2Fixed};

    /// Generate a point inside the default playable area (margin 50,
    /// 800 by 600 window).
    pub fn arb_pitch_position() -> impl Strategy<Value = Vec2Fixed> {
        let field = FieldConfig::default();
        let (min_x, max_x) = (field.min_x().to_num::<i32>(), field.max_x().to_num::<i32>());
        let (min_y, max_y) = (field.min_y().to_num::<i32>(), field.max_y().to_num::<i32>());
        (min_x..=max_x, min_y..=max_y).prop_map(|(x, y)| Vec2Fixed::from_int(x, y))
    }

    /// Generate a per-tick delta in `[-10, 10]` on each axis.
    pub fn arb_delta() -> impl Strategy<Value = Vec2Fixed> {
        (-10i32..=10, -10i32..=10).prop_map(|(x, y)| Vec2Fixed::from_int(x, y))
    }

    /// Generate a fraction in `[0, 1]` with two decimal places.
    pub fn arb_unit_fixed() -> impl Strategy<Value = Fixed> {
        (0i32..=100).prop_map(|n| Fixed::from_num(n) / Fixed::from_num(100))
    }

    /// Generate a difficulty.
    pub fn arb_difficulty() -> impl Strategy<Value = Difficulty> {
        prop_oneof![
            Just(Difficulty::Easy),
            Just(Difficulty::Medium),
            Just(Difficulty::Hard),
        ]
    }

    /// Generate a single tick of human input.
    ///
    /// Kicks, switches and difficulty changes are rare, as they are when a
    /// person plays.
    pub fn arb_tick_input() -> impl Strategy<Value = TickInput> {
        (
            (-1i8..=1, -1i8..=1),
            prop::bool::weighted(0.05),
            prop::bool::weighted(0.02),
            prop::option::weighted(0.01, arb_difficulty()),
            -1i8..=1,
            prop::bool::weighted(0.05),
        )
            .prop_map(
                |(movement, kick, switch_player, difficulty, aim_delta, confirm_shot)| TickInput {
                    movement,
                    kick,
                    switch_player,
                    difficulty,
                    aim_delta,
                    confirm_shot,
                },
            )
    }

    /// Generate a sequence of inputs, one per tick.
    pub fn arb_input_sequence(max_len: usize) -> impl Strategy<Value = Vec<TickInput>> {
        proptest::collection::vec(arb_tick_input(), 0..max_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{scripted_input, seeded_sim, short_match_config};
    use pitch_core::config::SimConfig;
    use proptest::prelude::*;

    // =========================================================================
    // Basic determinism tests
    // =========================================================================

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    fn test_idle_match_determinism() {
        assert!(verify_simulation_determinism(|| seeded_sim(42), 600));
    }

    #[test]
    fn test_scripted_match_determinism() {
        assert!(verify_scripted_determinism(|| seeded_sim(7), scripted_input, 900));
    }

    #[test]
    fn test_find_divergence_on_deterministic_sim() {
        let divergence = find_first_divergence(|| seeded_sim(3), scripted_input, 300);
        assert!(divergence.is_none(), "Expected no divergence");
    }

    // =========================================================================
    // Serialization round-trip tests
    // =========================================================================

    #[test]
    fn test_serialization_preserves_kickoff() {
        assert!(verify_serialization_determinism(|| seeded_sim(1), 0));
    }

    #[test]
    fn test_serialization_preserves_mid_match() {
        assert!(verify_serialization_determinism(|| seeded_sim(11), 400));
    }

    #[test]
    fn test_serialization_preserves_shootout() {
        // A zero-length match goes straight to penalties.
        assert!(verify_serialization_determinism(
            || Simulation::new(short_match_config(0), 5),
            300,
        ));
    }

    // =========================================================================
    // Full match determinism
    // =========================================================================

    #[test]
    fn test_short_match_determinism() {
        let result = verify_determinism(
            3,
            1_200,
            || Simulation::new(short_match_config(10), 99),
            |sim| {
                let input = scripted_input(sim.current_tick());
                sim.tick(&input);
            },
            Simulation::state_hash,
        );
        result.assert_deterministic();
    }

    #[test]
    fn test_shootout_determinism() {
        let result = verify_determinism(
            4,
            2_000,
            || Simulation::new(short_match_config(0), 13),
            |sim| {
                sim.tick(&TickInput::IDLE);
            },
            Simulation::state_hash,
        );
        result.assert_deterministic();
    }

    #[test]
    fn test_outcome_is_reproducible() {
        let play = || {
            let mut sim = Simulation::new(short_match_config(5), 21);
            while !sim.is_over() && sim.current_tick() < 20_000 {
                let input = scripted_input(sim.current_tick());
                sim.tick(&input);
            }
            sim.outcome()
        };
        assert_eq!(play(), play());
    }

    // =========================================================================
    // Parallel simulation tests
    // =========================================================================

    #[test]
    fn test_parallel_idle_simulations() {
        let result = run_parallel_simulations_scoped(|| seeded_sim(8), 4, 500);
        result.assert_deterministic();
    }

    #[test]
    fn test_parallel_shootout_simulations() {
        let result =
            run_parallel_simulations_scoped(|| Simulation::new(short_match_config(0), 8), 4, 1_000);
        result.assert_deterministic();
    }

    #[test]
    fn test_compute_hash_matches_for_equal_values() {
        assert_eq!(compute_hash(&(1u32, "a")), compute_hash(&(1u32, "a")));
        assert_ne!(compute_hash(&1u32), compute_hash(&2u32));
    }

    // =========================================================================
    // Property-based tests using proptest
    // =========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Any seed should produce deterministic results.
        #[test]
        fn prop_any_seed_is_deterministic(seed in any::<u64>()) {
            prop_assert!(verify_simulation_determinism(|| seeded_sim(seed), 200));
        }

        /// Random human input sequences should replay exactly.
        #[test]
        fn prop_input_sequences_are_replayable(
            inputs in strategies::arb_input_sequence(300),
            seed in 0u64..1000,
        ) {
            let script = |tick: u64| {
                usize::try_from(tick)
                    .ok()
                    .and_then(|i| inputs.get(i).copied())
                    .unwrap_or(TickInput::IDLE)
            };
            prop_assert_eq!(
                find_first_divergence(|| seeded_sim(seed), script, 300),
                None
            );
        }

        /// Serialization round-trip should always preserve state exactly.
        #[test]
        fn prop_serialization_roundtrip_is_exact(
            seed in 0u64..1000,
            num_ticks in 0u64..200,
        ) {
            prop_assert!(verify_serialization_determinism(|| seeded_sim(seed), num_ticks));
        }

        /// Generated positions stay inside the playable area.
        #[test]
        fn prop_pitch_positions_in_bounds(pos in strategies::arb_pitch_position()) {
            prop_assert!(SimConfig::default().field.contains(pos));
        }
    }

    // =========================================================================
    // Stress tests (only run explicitly with --ignored)
    // =========================================================================

    #[test]
    #[ignore = "Long-running stress test"]
    fn stress_test_full_matches() {
        for seed in 0..8 {
            let result = verify_determinism(
                2,
                5_400,
                || Simulation::new(SimConfig::default(), seed),
                |sim| {
                    let input = scripted_input(sim.current_tick());
                    sim.tick(&input);
                },
                Simulation::state_hash,
            );
            result.assert_deterministic();
        }
    }

    #[test]
    #[ignore = "Long-running stress test"]
    fn stress_test_parallel_many_simulations() {
        let result = run_parallel_simulations_scoped(|| seeded_sim(1), 16, 5_400);
        result.assert_deterministic();
    }
}
