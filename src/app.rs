//! Screen director
//!
//! Owns whichever screen is current and the fixed-step accumulator that
//! drives it. Intro hands over to a game session once textures are loaded;
//! a restart replaces the session with a fresh one using the same textures.

use glam::Vec2;

use crate::Millis;
use crate::consts::{MAX_SUBSTEPS, SIM_DT_MS};
use crate::content::ContentProvider;
use crate::intro::{IntroEvent, IntroScreen};
use crate::settings::Settings;
use crate::sim::{GameSession, GameState, SessionEvent, TickInput, tick};

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Intro,
    Game,
}

/// Screen transitions the host may care about
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    GameStarted { seed: u64 },
    /// A session ended and was replaced; carries its final ledger
    SessionRestarted { finished: Box<GameState> },
}

pub struct App<P: ContentProvider> {
    provider: P,
    viewport: Vec2,
    seed: u64,
    intro: IntroScreen,
    session: Option<GameSession>,
    accumulator: Millis,
}

impl<P: ContentProvider> App<P> {
    pub fn new(settings: &Settings, provider: P) -> Self {
        let viewport = settings.viewport.size();
        Self {
            provider,
            viewport,
            seed: settings.seed,
            intro: IntroScreen::new(viewport, settings.seed),
            session: None,
            accumulator: 0,
        }
    }

    pub fn screen(&self) -> Screen {
        if self.session.is_some() {
            Screen::Game
        } else {
            Screen::Intro
        }
    }

    pub fn intro(&self) -> &IntroScreen {
        &self.intro
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    /// Advance the current screen by exactly one fixed step
    pub fn tick(&mut self, input: &TickInput) -> Option<AppEvent> {
        if self.session.is_none() {
            let IntroEvent::StartGame(textures) = self.intro.tick(&mut self.provider, input, SIM_DT_MS)?;
            self.session = Some(GameSession::new(self.viewport, textures, self.seed));
            return Some(AppEvent::GameStarted { seed: self.seed });
        }

        let session = self.session.as_mut()?;

        match tick(session, input, SIM_DT_MS)? {
            SessionEvent::RestartRequested => {
                let finished = Box::new(session.state.clone());
                session.restart();
                log::info!("New session with seed {}", session.state.seed);
                Some(AppEvent::SessionRestarted { finished })
            }
        }
    }

    /// Run as many fixed steps as `elapsed` covers (bounded). `input` goes to
    /// the first step; later steps see no input.
    pub fn frame(&mut self, input: TickInput, elapsed: Millis) -> Vec<AppEvent> {
        self.accumulator += elapsed.min(SIM_DT_MS * u64::from(MAX_SUBSTEPS));

        let mut events = Vec::new();
        let mut input = Some(input);
        let mut substeps = 0;
        while self.accumulator >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
            let step_input = input.take().unwrap_or_default();
            events.extend(self.tick(&step_input));
            self.accumulator -= SIM_DT_MS;
            substeps += 1;
        }
        events
    }
}
