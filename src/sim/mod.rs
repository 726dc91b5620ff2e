//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by node or action ID)
//! - No rendering or platform dependencies

pub mod ambience;
pub mod animator;
pub mod difficulty;
pub mod game_over;
pub mod hit_test;
pub mod scheduler;
pub mod stage;
pub mod state;
pub mod tick;
pub mod timeline;

pub use ambience::{Ambience, Hud};
pub use animator::{Action, ActionId, Command, Completion, Ease, EntityAnimator};
pub use difficulty::{DifficultyCurve, Wave};
pub use game_over::{GameOverSequencer, SequencerPhase};
pub use hit_test::{ChannelId, HitEvent, PointerEvent, PointerHitTester, PointerPhase};
pub use scheduler::{SchedulerEvent, SchedulerPhase, WaveScheduler};
pub use stage::Stage;
pub use state::{Balloon, BalloonStatus, GameState, MissOutcome};
pub use tick::{GameSession, SessionEvent, TickInput, tick};
pub use timeline::Timeline;
