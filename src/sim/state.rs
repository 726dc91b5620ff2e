//! Session ledger and balloon entity records
//!
//! `GameState` is the single writer-owned record of score, lives and wave
//! progress. Every mutation checks the game-over gate first: once the session
//! is over, pops and misses are silently ignored.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::engine::NodeId;
use crate::format_thousands;

/// Lifecycle of a balloon. `Active` moves to exactly one terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalloonStatus {
    Active,
    Popped,
    Missed,
}

/// A launched balloon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balloon {
    pub node: NodeId,
    /// Wave the balloon was launched in
    pub wave: u32,
    /// Jittered time to reach the top (seconds)
    pub travel_secs: f32,
    pub status: BalloonStatus,
    /// Part of the post-game-over flood
    pub flood: bool,
}

impl Balloon {
    pub fn new(node: NodeId, wave: u32, travel_secs: f32, flood: bool) -> Self {
        Self {
            node,
            wave,
            travel_secs,
            status: BalloonStatus::Active,
            flood,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == BalloonStatus::Active
    }
}

/// Result of reporting a miss to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissOutcome {
    /// Game already over; nothing changed
    Ignored,
    LifeLost { lives: i32 },
    /// This miss used up the last life
    GameOver,
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed ^ self.stream)
    }
}

/// Score, lives and progress for one play session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng_state: RngState,
    pub score: u64,
    /// Reaching zero or below ends the session
    pub lives: i32,
    /// Current wave index (0-based, only increases)
    pub wave_index: u32,
    /// High-water mark of lives, used to normalize visual feedback
    pub max_lives_achieved: i32,
    pub popped: u32,
    pub missed: u32,
    /// One-way latch
    game_over: bool,
}

impl GameState {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng_state: RngState::new(seed),
            score: 0,
            lives: INITIAL_LIVES,
            wave_index: 0,
            max_lives_achieved: INITIAL_LIVES,
            popped: 0,
            missed: 0,
            game_over: false,
        }
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Points for a pop: faster balloons are worth more
    pub fn pop_score(travel_secs: f32) -> u64 {
        (POP_SCORE_CEILING_MS - travel_secs * 1000.0).round().max(0.0) as u64
    }

    /// Credit a pop. Adds score and one life. `None` once the game is over.
    pub fn record_pop(&mut self, travel_secs: f32) -> Option<u64> {
        if self.game_over {
            return None;
        }
        let points = Self::pop_score(travel_secs);
        self.score += points;
        self.lives += 1;
        self.max_lives_achieved = self.max_lives_achieved.max(self.lives);
        self.popped += 1;
        Some(points)
    }

    /// Charge a miss. Ends the session when lives run out.
    pub fn record_miss(&mut self) -> MissOutcome {
        if self.game_over {
            return MissOutcome::Ignored;
        }
        self.lives -= 1;
        self.missed += 1;
        if self.lives <= 0 {
            self.game_over = true;
            MissOutcome::GameOver
        } else {
            MissOutcome::LifeLost { lives: self.lives }
        }
    }

    /// Move to the next wave, returning the new index
    pub fn advance_wave(&mut self) -> u32 {
        self.wave_index += 1;
        self.wave_index
    }

    /// Lives relative to the best so far, clamped to [0, 1]
    pub fn life_ratio(&self) -> f32 {
        if self.max_lives_achieved <= 0 {
            return 0.0;
        }
        (self.lives as f32 / self.max_lives_achieved as f32).clamp(0.0, 1.0)
    }

    pub fn score_label(&self) -> String {
        format!("Score: {}", format_thousands(self.score))
    }

    pub fn lives_label(&self) -> String {
        format!("Lives: {}", self.lives)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_session() {
        let state = GameState::new(1);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, INITIAL_LIVES);
        assert_eq!(state.max_lives_achieved, INITIAL_LIVES);
        assert_eq!(state.wave_index, 0);
        assert!(!state.is_game_over());
    }

    #[test]
    fn test_five_misses_end_game_on_fifth() {
        let mut state = GameState::new(1);
        for expected in (1..INITIAL_LIVES).rev() {
            assert_eq!(state.record_miss(), MissOutcome::LifeLost { lives: expected });
            assert!(!state.is_game_over());
        }
        assert_eq!(state.record_miss(), MissOutcome::GameOver);
        assert!(state.is_game_over());

        let score = state.score;
        assert_eq!(state.record_pop(0.5), None);
        assert_eq!(state.score, score);
        assert_eq!(state.record_miss(), MissOutcome::Ignored);
        assert_eq!(state.lives, 0);
    }

    #[test]
    fn test_pop_adds_life_and_raises_high_water_mark() {
        let mut state = GameState::new(1);
        state.record_pop(1.5);
        assert_eq!(state.lives, INITIAL_LIVES + 1);
        assert_eq!(state.max_lives_achieved, INITIAL_LIVES + 1);
        state.record_miss();
        assert_eq!(state.max_lives_achieved, INITIAL_LIVES + 1);
        assert!(state.life_ratio() < 1.0);
    }

    #[test]
    fn test_pop_score_inverse_to_travel() {
        assert_eq!(GameState::pop_score(1.95), 50);
        assert!(GameState::pop_score(0.5) > GameState::pop_score(1.0));
        assert_eq!(GameState::pop_score(1.2), GameState::pop_score(1.2));
        assert_eq!(GameState::pop_score(3.0), 0);
    }

    #[test]
    fn test_labels() {
        let mut state = GameState::new(1);
        state.score = 12_345;
        assert_eq!(state.score_label(), "Score: 12,345");
        assert_eq!(state.lives_label(), "Lives: 5");
    }

    #[derive(Debug, Clone)]
    enum Op {
        Pop(f32),
        Miss,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![(0.25f32..2.5).prop_map(Op::Pop), Just(Op::Miss)]
    }

    proptest! {
        #[test]
        fn prop_game_over_freezes_ledger(ops in prop::collection::vec(op(), 0..200)) {
            let mut state = GameState::new(7);
            for op in ops {
                let was_over = state.is_game_over();
                let (score, lives) = (state.score, state.lives);
                match op {
                    Op::Pop(travel) => {
                        let points = state.record_pop(travel);
                        if was_over {
                            prop_assert!(points.is_none());
                        } else {
                            prop_assert_eq!(state.score, score + GameState::pop_score(travel));
                        }
                    }
                    Op::Miss => {
                        state.record_miss();
                        prop_assert_eq!(state.score, score);
                    }
                }
                if was_over {
                    prop_assert!(state.is_game_over());
                    prop_assert_eq!(state.score, score);
                    prop_assert!(state.lives <= lives);
                }
                prop_assert!(state.max_lives_achieved >= state.lives);
            }
        }
    }
}
