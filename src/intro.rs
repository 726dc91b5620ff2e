//! Intro screen
//!
//! Fetches the balloon textures, offers a retry when that fails, then shows
//! the textures off until the player taps to start.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::Millis;
use crate::consts::LAUNCH_STAGGER_MS;
use crate::content::{ContentProvider, Texture};
use crate::engine::{Color, Engine, NodeId, NodeKind, Scene, TextureId, place_at};
use crate::sim::difficulty::vary_by;
use crate::sim::{Action, ActionId, Ease, HitEvent, PointerPhase, Stage, TickInput, Timeline};

const PULSE_MS: f32 = 750.0;
const PULSE_JITTER_PCT: f32 = 0.1;
const SCALE_UP_MS: Millis = 250;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntroPhase {
    Loading,
    Failed { message: String },
    Ready,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntroEvent {
    StartGame(Vec<Texture>),
}

#[derive(Debug)]
pub struct IntroScreen<E: Engine = Scene> {
    pub stage: Stage<E>,
    phase: IntroPhase,
    title: NodeId,
    status: NodeId,
    spinner: NodeId,
    play: Option<NodeId>,
    textures: Vec<Texture>,
    /// Texture indices waiting for their showcase slot
    showcase: Timeline<usize>,
    /// Scale-up actions whose completion starts the pulse
    scale_ups: BTreeMap<ActionId, NodeId>,
    rng: Pcg32,
}

impl IntroScreen<Scene> {
    pub fn new(viewport: Vec2, seed: u64) -> Self {
        Self::with_engine(Scene::new(viewport), seed)
    }
}

impl<E: Engine> IntroScreen<E> {
    pub fn with_engine(engine: E, seed: u64) -> Self {
        let mut stage = Stage::new(engine);
        let engine = &mut stage.engine;
        let root = engine.root();
        let width = engine.viewport().width();

        if let Some(layer) = engine.node_mut(root) {
            layer.kind = NodeKind::Layer {
                start_color: Color::rgb(0, 150, 0),
                end_color: Color::rgb(0, 50, 0),
            };
        }

        let title = label(engine, "Balloon Pop!", 48.0, width);
        place_at(engine, title, 0.5, 0.35, Some(root));
        let status = label(engine, "Loading..", 18.0, width);
        place_at(engine, status, 0.5, 0.7, Some(root));
        let spinner = label(engine, "+", 36.0, 36.0);
        place_at(engine, spinner, 0.5, 0.75, Some(root));

        stage
            .animator
            .run(spinner, Action::rotate_by(100, 180.0).repeat_forever());

        Self {
            stage,
            phase: IntroPhase::Loading,
            title,
            status,
            spinner,
            play: None,
            textures: Vec::new(),
            showcase: Timeline::new(),
            scale_ups: BTreeMap::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn phase(&self) -> &IntroPhase {
        &self.phase
    }

    pub fn title(&self) -> NodeId {
        self.title
    }

    /// Node to tap to retry a failed load
    pub fn retry_target(&self) -> Option<NodeId> {
        matches!(self.phase, IntroPhase::Failed { .. }).then_some(self.status)
    }

    /// "TAP TO PLAY!" label, once textures are in
    pub fn play_target(&self) -> Option<NodeId> {
        self.play
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    pub fn tick<P: ContentProvider + ?Sized>(
        &mut self,
        provider: &mut P,
        input: &TickInput,
        dt: Millis,
    ) -> Option<IntroEvent> {
        for event in &input.pointer {
            match self.phase {
                IntroPhase::Ready if event.phase == PointerPhase::Down => {
                    log::info!("Starting game with {} textures", self.textures.len());
                    return Some(IntroEvent::StartGame(self.textures.clone()));
                }
                IntroPhase::Failed { .. } => {
                    if let Some(HitEvent::Began { entity, .. }) = self.stage.dispatch(*event)
                        && entity == self.status
                    {
                        self.show_loading();
                    }
                }
                _ => {}
            }
        }

        if self.phase == IntroPhase::Loading {
            match provider.fetch_entity_textures() {
                Ok(textures) => self.show_ready(textures),
                Err(err) => {
                    log::warn!("Texture fetch failed: {err}");
                    self.show_failed(err.to_string());
                }
            }
        }

        let (completions, _) = self.stage.advance(dt);
        for completion in completions {
            if let Some(node) = self.scale_ups.remove(&completion.id) {
                self.pulse(node);
            }
        }
        for (_, index) in self.showcase.advance(dt) {
            self.show_texture(index);
        }
        None
    }

    fn show_loading(&mut self) {
        self.stage.hit_tester.detach(self.status);
        if let Some(node) = self.stage.engine.node_mut(self.status) {
            node.set_text("Loading..");
        }
        if let Some(node) = self.stage.engine.node_mut(self.spinner) {
            node.visible = true;
        }
        self.phase = IntroPhase::Loading;
    }

    fn show_failed(&mut self, reason: String) {
        let message = format!("There was an error getting meetup data: {reason}\n\nTap to retry");
        if let Some(node) = self.stage.engine.node_mut(self.status) {
            node.set_text(message.clone());
        }
        if let Some(node) = self.stage.engine.node_mut(self.spinner) {
            node.visible = false;
        }
        self.stage.hit_tester.attach(self.status, None);
        self.phase = IntroPhase::Failed { message };
    }

    fn show_ready(&mut self, textures: Vec<Texture>) {
        for node in [self.status, self.spinner] {
            self.stage.animator.stop_all(node);
            self.stage.hit_tester.detach(node);
            self.stage.engine.remove_node(node);
        }

        for index in 0..textures.len() {
            self.showcase
                .schedule_after(index as Millis * LAUNCH_STAGGER_MS, index);
        }
        self.textures = textures;

        let engine = &mut self.stage.engine;
        let root = engine.root();
        let viewport = engine.viewport();

        let banner = engine.create_node(
            NodeKind::Panel,
            Vec2::new(viewport.width() * 0.75, viewport.height() * 0.1),
        );
        place_at(engine, banner, 0.5, 0.5, Some(root));
        let text = label(engine, "MEETUP POP", 48.0, viewport.width() * 0.75);
        place_at(engine, text, 0.5, 0.5, Some(banner));
        if let Some(node) = engine.node_mut(banner) {
            node.color = Color::RED;
            node.scale = 5.0;
            node.rotation = -22.5;
            node.z_order = 10;
        }

        let play = label(engine, "TAP TO PLAY!", 36.0, viewport.width());
        place_at(engine, play, 0.5, 0.8, Some(root));

        self.stage
            .animator
            .run(banner, Action::scale_to(1000, 1.0).eased(Ease::BounceOut));
        self.stage
            .animator
            .run(play, Action::blink(1000, 1).repeat_forever());
        self.play = Some(play);
        self.phase = IntroPhase::Ready;
    }

    fn show_texture(&mut self, index: usize) {
        let Some(size) = self.textures.get(index).map(|t| t.size) else {
            return;
        };
        let engine = &mut self.stage.engine;
        let root = engine.root();
        let node = engine.create_node(
            NodeKind::Sprite {
                texture: TextureId(index),
            },
            size,
        );
        let x = self.rng.random_range(0.0..=1.0);
        let y = self.rng.random_range(0.0..=0.6);
        place_at(engine, node, x, y, Some(root));
        if let Some(n) = engine.node_mut(node) {
            n.scale = 0.0;
        }
        let id = self
            .stage
            .animator
            .run(node, Action::scale_to(SCALE_UP_MS, 1.0).eased(Ease::Out(0.3)));
        self.scale_ups.insert(id, node);
    }

    fn pulse(&mut self, node: NodeId) {
        let period = vary_by(PULSE_MS, PULSE_JITTER_PCT, &mut self.rng).round() as Millis;
        let pulse = Action::sequence([Action::scale_to(period, 1.5), Action::scale_to(period, 1.0)]);
        self.stage.animator.run(node, pulse.repeat_forever());
    }
}

fn label<E: Engine + ?Sized>(engine: &mut E, text: &str, font_size: f32, width: f32) -> NodeId {
    let id = engine.create_node(
        NodeKind::Label {
            text: text.to_string(),
            font_size,
        },
        Vec2::new(width, font_size * 1.5),
    );
    if let Some(node) = engine.node_mut(id) {
        node.z_order = 20;
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentError, StaticContent};

    /// Fails a fixed number of times, then serves the given textures
    struct Flaky {
        failures: u32,
        textures: Vec<Texture>,
    }

    impl ContentProvider for Flaky {
        fn fetch_entity_textures(&mut self) -> Result<Vec<Texture>, ContentError> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(ContentError::Network("timed out".into()));
            }
            Ok(self.textures.clone())
        }
    }

    fn textures(n: usize) -> Vec<Texture> {
        (0..n).map(|i| Texture::thumbnail(format!("t{i}"))).collect()
    }

    fn intro() -> IntroScreen {
        IntroScreen::new(Vec2::new(640.0, 1136.0), 1)
    }

    fn center_of(screen: &IntroScreen, node: NodeId) -> Vec2 {
        screen.stage.engine.world_position(node).unwrap()
    }

    #[test]
    fn test_failure_shows_retry_and_tap_retries() {
        let mut screen = intro();
        let mut content = Flaky {
            failures: 1,
            textures: textures(2),
        };
        assert_eq!(screen.tick(&mut content, &TickInput::default(), 8), None);
        let IntroPhase::Failed { message } = screen.phase().clone() else {
            panic!("expected failure, got {:?}", screen.phase());
        };
        assert!(message.contains("timed out"));
        assert!(message.ends_with("Tap to retry"));

        let retry = screen.retry_target().unwrap();
        let at = center_of(&screen, retry);
        screen.tick(&mut content, &TickInput::tap(0, at), 8);
        assert_eq!(screen.phase(), &IntroPhase::Ready);
        assert_eq!(screen.textures().len(), 2);
    }

    #[test]
    fn test_tap_away_from_retry_keeps_failed() {
        let mut screen = intro();
        let mut content = Flaky {
            failures: 5,
            textures: textures(2),
        };
        screen.tick(&mut content, &TickInput::default(), 8);
        screen.tick(&mut content, &TickInput::tap(0, Vec2::new(1.0, 1.0)), 8);
        assert!(matches!(screen.phase(), IntroPhase::Failed { .. }));
        assert_eq!(content.failures, 4);
    }

    #[test]
    fn test_showcase_staggers_and_pulses() {
        let mut screen = intro();
        let mut content = StaticContent(textures(3));
        let idle = TickInput::default();
        screen.tick(&mut content, &idle, 0);
        assert_eq!(screen.phase(), &IntroPhase::Ready);

        let sprites = |s: &IntroScreen| {
            s.stage
                .engine
                .nodes()
                .filter(|n| matches!(n.kind, NodeKind::Sprite { .. }))
                .count()
        };
        screen.tick(&mut content, &idle, 0);
        assert_eq!(sprites(&screen), 1);
        screen.tick(&mut content, &idle, LAUNCH_STAGGER_MS);
        assert_eq!(sprites(&screen), 2);
        screen.tick(&mut content, &idle, LAUNCH_STAGGER_MS);
        assert_eq!(sprites(&screen), 3);

        for _ in 0..40 {
            screen.tick(&mut content, &idle, 8);
        }
        assert!(screen.scale_ups.is_empty());
    }

    #[test]
    fn test_any_tap_when_ready_starts_game() {
        let mut screen = intro();
        let mut content = StaticContent(textures(4));
        screen.tick(&mut content, &TickInput::default(), 8);
        assert!(screen.play_target().is_some());
        let event = screen.tick(&mut content, &TickInput::tap(3, Vec2::new(10.0, 10.0)), 8);
        assert_eq!(event, Some(IntroEvent::StartGame(textures(4))));
    }

    #[test]
    fn test_taps_while_loading_are_ignored() {
        let mut screen = intro();
        let mut content = StaticContent(Vec::new());
        let event = screen.tick(&mut content, &TickInput::tap(0, Vec2::new(320.0, 300.0)), 8);
        assert_eq!(event, None);
        assert!(matches!(screen.phase(), IntroPhase::Failed { .. }));
    }
}
