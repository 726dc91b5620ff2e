//! Balloon Pop entry point
//!
//! Runs the game headless with the demo player at the wheel. A renderer can
//! sit on top of the same `App` and read its scene every frame; this binary
//! only drives the simulation and logs what happens.

use balloon_pop::app::AppEvent;
use balloon_pop::autoplay::Autoplay;
use balloon_pop::content::{MeetupContent, Offline};
use balloon_pop::sim::{GameState, TickInput};
use balloon_pop::{App, Millis, Settings};

/// Host frame length (~60 Hz)
const FRAME_MS: Millis = 16;

fn log_summary(label: &str, state: &GameState) {
    match serde_json::to_string(state) {
        Ok(json) => log::info!("{label}: {json}"),
        Err(err) => log::warn!("Could not serialize {label}: {err}"),
    }
}

fn run_demo(settings: &Settings) {
    let content = MeetupContent::new(settings.content.clone(), Offline);
    let mut app = App::new(settings, content);
    let mut bot = Autoplay::new(&settings.autoplay, settings.seed ^ 0xA07_0F1A7);

    let limit = u64::from(settings.max_sim_secs) * 1000;
    let mut elapsed: Millis = 0;
    let mut finished = 0;

    while elapsed < limit && finished < settings.max_sessions {
        let input = if !settings.autoplay.enabled {
            TickInput::default()
        } else {
            match app.session() {
                Some(session) => bot.game_input(session),
                None => bot.intro_input(app.intro()),
            }
        };

        for event in app.frame(input, FRAME_MS) {
            match event {
                AppEvent::GameStarted { seed } => log::info!("Game started (seed {seed})"),
                AppEvent::SessionRestarted { finished: state } => {
                    finished += 1;
                    bot.reset();
                    log_summary(&format!("Session {finished}"), &state);
                }
            }
        }
        elapsed += FRAME_MS;
    }

    if let Some(session) = app.session() {
        log_summary("Last session", &session.state);
    }
    log::info!(
        "Demo finished after {:.1}s simulated, {finished} sessions completed",
        elapsed as f64 / 1000.0
    );
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Balloon Pop (native) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => match Settings::load(&path) {
            Ok(settings) => settings,
            Err(err) => {
                log::error!("{err}");
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    };

    run_demo(&settings);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        return;
    }
    log::info!("Balloon Pop (web) starting...");
    run_demo(&Settings::default());
}
