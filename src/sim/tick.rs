//! Fixed timestep simulation tick
//!
//! One play session and the loop that advances it deterministically. Within a
//! tick the order is fixed: pointer input, animations and held timers,
//! animation completions, wave scheduling, game-over sequencing, presentation.

use glam::Vec2;

use crate::Millis;
use crate::content::Texture;
use crate::engine::{Engine, Scene};

use super::ambience::{Ambience, Hud};
use super::game_over::GameOverSequencer;
use super::hit_test::{HitEvent, PointerEvent};
use super::scheduler::{SchedulerEvent, WaveScheduler};
use super::stage::Stage;
use super::state::{GameState, MissOutcome};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Raw pointer events in arrival order, world coordinates
    pub pointer: Vec<PointerEvent>,
}

impl TickInput {
    pub fn tap(channel: u32, location: Vec2) -> Self {
        Self {
            pointer: vec![PointerEvent::down(channel, location), PointerEvent::up(channel, location)],
        }
    }
}

/// Things the surrounding app has to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Player tapped the armed restart affordance
    RestartRequested,
}

/// One play session: scene, ledger, scheduler and game-over flow
#[derive(Debug)]
pub struct GameSession<E: Engine = Scene> {
    pub stage: Stage<E>,
    pub state: GameState,
    pub scheduler: WaveScheduler,
    pub sequencer: GameOverSequencer,
    pub ambience: Ambience,
    pub hud: Hud,
    textures: Vec<Texture>,
}

impl GameSession<Scene> {
    pub fn new(viewport: Vec2, textures: Vec<Texture>, seed: u64) -> Self {
        Self::with_engine(Scene::new(viewport), textures, seed)
    }

    /// Tear this session down and start a fresh one with the same textures
    pub fn restart(&mut self) {
        let viewport = self.stage.engine.viewport().size();
        let seed = self.state.seed.wrapping_add(1);
        self.stage.teardown();
        *self = Self::new(viewport, std::mem::take(&mut self.textures), seed);
    }
}

impl<E: Engine> GameSession<E> {
    pub fn with_engine(engine: E, textures: Vec<Texture>, seed: u64) -> Self {
        let mut stage = Stage::new(engine);
        let state = GameState::new(seed);
        let mut scheduler = WaveScheduler::new(&state, textures.len());
        let mut ambience = Ambience::spawn(&mut stage.engine);
        let hud = Hud::spawn(&mut stage.engine, &state);
        ambience.refresh(&mut stage.engine, &mut stage.animator, &state);
        scheduler.start();
        log::info!("Session started (seed {seed}, {} textures)", textures.len());

        Self {
            stage,
            state,
            scheduler,
            sequencer: GameOverSequencer::new(),
            ambience,
            hud,
            textures,
        }
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    fn refresh_presentation(&mut self) {
        self.ambience
            .refresh(&mut self.stage.engine, &mut self.stage.animator, &self.state);
        self.hud.update(&mut self.stage.engine, &self.state);
    }

    fn enter_game_over(&mut self) {
        log::info!(
            "Game over at wave {}: score {}, popped {}, missed {}",
            self.state.wave_index,
            self.state.score,
            self.state.popped,
            self.state.missed
        );
        self.sequencer.start(&mut self.stage);
        self.ambience
            .game_over(&mut self.stage.engine, &mut self.stage.animator, &self.state);
        self.hud.update(&mut self.stage.engine, &self.state);
    }
}

/// Advance the session by one fixed timestep
pub fn tick<E: Engine>(session: &mut GameSession<E>, input: &TickInput, dt: Millis) -> Option<SessionEvent> {
    let mut restart = false;
    let mut ledger_changed = false;

    // Pointer input: the restart gate gets first refusal
    for event in &input.pointer {
        if session.sequencer.on_pointer(event) {
            restart = true;
            continue;
        }
        if let Some(HitEvent::Began { entity, .. }) = session.stage.dispatch(*event)
            && session.scheduler.owns(entity)
            && session
                .scheduler
                .pop(&mut session.stage, &mut session.state, entity)
                .is_some()
        {
            ledger_changed = true;
        }
    }

    // Animations and held timers
    let (completions, _held) = session.stage.advance(dt);
    let mut game_over = false;
    for completion in completions {
        let event = session
            .scheduler
            .on_completion(&mut session.stage, &mut session.state, completion);
        if let Some(SchedulerEvent::Missed { outcome, .. }) = event {
            match outcome {
                MissOutcome::GameOver => game_over = true,
                MissOutcome::LifeLost { .. } => ledger_changed = true,
                MissOutcome::Ignored => {}
            }
        }
    }

    session
        .scheduler
        .update(&mut session.stage, &mut session.state, dt);
    session.sequencer.update(&mut session.stage);

    if game_over {
        session.enter_game_over();
    } else if ledger_changed {
        session.refresh_presentation();
    }

    restart.then_some(SessionEvent::RestartRequested)
}
