//! Ambient feedback: background gradient, sun, rain and the HUD labels
//!
//! Everything here is driven by the life ratio (lives over the best lives
//! count so far). Continuous effects are stopped and replaced on each refresh
//! rather than left to finish.

use glam::Vec2;

use crate::consts::*;
use crate::engine::{Color, Engine, NodeId, NodeKind, place_at};

use super::animator::{Action, EntityAnimator};
use super::state::GameState;

const EMITTER_SIZE: f32 = 10.0;
const HUD_FONT_SIZE: f32 = 24.0;

/// Sun and rain emitters plus the background they tint
#[derive(Debug, Clone)]
pub struct Ambience {
    pub sun: NodeId,
    pub rain: NodeId,
    /// Rain multiplier over the base emission rate and speed
    rain_intensity: f32,
}

impl Ambience {
    /// Create the emitters under the root layer
    pub fn spawn<E: Engine + ?Sized>(engine: &mut E) -> Self {
        let root = engine.root();
        let viewport = engine.viewport();

        let sun = engine.create_node(
            NodeKind::Particles {
                emission_rate: RAIN_BASE_EMISSION,
                speed: 0.0,
            },
            Vec2::splat(EMITTER_SIZE),
        );
        engine.add_child(root, sun);

        let rain = engine.create_node(
            NodeKind::Particles {
                emission_rate: RAIN_BASE_EMISSION,
                speed: RAIN_BASE_SPEED,
            },
            Vec2::new(viewport.width(), EMITTER_SIZE),
        );
        engine.add_child(root, rain);

        if let Some(node) = engine.node_mut(sun) {
            node.position = Vec2::new(viewport.width() * 0.5, viewport.height() + 20.0);
            node.color = Color::rgb(255, 220, 0);
            node.z_order = -1;
        }
        if let Some(node) = engine.node_mut(rain) {
            node.position = Vec2::new(viewport.width() * 0.5, viewport.height());
            node.color = Color::rgb(120, 160, 255);
            node.scale = 0.0;
            node.visible = false;
            node.z_order = -1;
        }

        Self {
            sun,
            rain,
            rain_intensity: 1.0,
        }
    }

    pub fn rain_intensity(&self) -> f32 {
        self.rain_intensity
    }

    pub fn is_raining<E: Engine + ?Sized>(&self, engine: &E) -> bool {
        engine.node(self.rain).is_some_and(|n| n.visible)
    }

    /// Re-tint everything for the current life ratio
    pub fn refresh<E: Engine + ?Sized>(&mut self, engine: &mut E, animator: &mut EntityAnimator, state: &GameState) {
        let ratio = state.life_ratio();
        let start = Color::rgb(0, (ratio * BACKGROUND_START_GREEN).round() as u8, 0);
        let end = Color::rgb(0, (ratio * BACKGROUND_END_GREEN).round() as u8, 0);
        set_background(engine, start, end);
        self.rescale_sun(engine, animator, ratio);
        self.update_rain(engine, ratio);
    }

    /// End-of-session look: red background, sun gone, rain at whatever ratio is left
    pub fn game_over<E: Engine + ?Sized>(&mut self, engine: &mut E, animator: &mut EntityAnimator, state: &GameState) {
        let ratio = state.life_ratio();
        set_background(engine, Color::rgb(70, 0, 0), Color::rgb(10, 0, 0));
        self.rescale_sun(engine, animator, ratio);
        self.update_rain(engine, ratio);
    }

    fn rescale_sun<E: Engine + ?Sized>(&self, engine: &E, animator: &mut EntityAnimator, ratio: f32) {
        if !engine.contains(self.sun) {
            return;
        }
        animator.stop_all(self.sun);
        animator.run(self.sun, Action::scale_to(SUN_RESCALE_MS, ratio * SUN_MAX_SCALE));
    }

    fn update_rain<E: Engine + ?Sized>(&mut self, engine: &mut E, ratio: f32) {
        let Some(rain) = engine.node_mut(self.rain) else {
            return;
        };
        if ratio < RAIN_THRESHOLD {
            self.rain_intensity = if rain.visible {
                (self.rain_intensity * 2.0).min(RAIN_MAX_INTENSITY)
            } else {
                1.0
            };
            rain.visible = true;
            rain.scale = 1.0;
            rain.kind = NodeKind::Particles {
                emission_rate: RAIN_BASE_EMISSION * self.rain_intensity,
                speed: RAIN_BASE_SPEED * self.rain_intensity,
            };
        } else {
            self.rain_intensity = 1.0;
            rain.visible = false;
            rain.scale = 0.0;
            rain.kind = NodeKind::Particles {
                emission_rate: RAIN_BASE_EMISSION,
                speed: RAIN_BASE_SPEED,
            };
        }
    }
}

fn set_background<E: Engine + ?Sized>(engine: &mut E, start: Color, end: Color) {
    let root = engine.root();
    if let Some(layer) = engine.node_mut(root) {
        layer.kind = NodeKind::Layer {
            start_color: start,
            end_color: end,
        };
    }
}

/// Score and lives labels along the top edge
#[derive(Debug, Clone, Copy)]
pub struct Hud {
    pub score: NodeId,
    pub lives: NodeId,
}

impl Hud {
    pub fn spawn<E: Engine + ?Sized>(engine: &mut E, state: &GameState) -> Self {
        let root = engine.root();
        let score = label(engine, state.score_label());
        let lives = label(engine, state.lives_label());
        place_at(engine, score, 0.1, 0.05, Some(root));
        place_at(engine, lives, 0.9, 0.05, Some(root));
        Self { score, lives }
    }

    pub fn update<E: Engine + ?Sized>(&self, engine: &mut E, state: &GameState) {
        let color = if state.is_game_over() {
            Color::WHITE
        } else {
            Color::BLACK
        };
        for (id, text) in [(self.score, state.score_label()), (self.lives, state.lives_label())] {
            if let Some(node) = engine.node_mut(id) {
                node.set_text(text);
                node.color = color;
            }
        }
    }
}

fn label<E: Engine + ?Sized>(engine: &mut E, text: String) -> NodeId {
    let id = engine.create_node(
        NodeKind::Label {
            text,
            font_size: HUD_FONT_SIZE,
        },
        Vec2::new(160.0, HUD_FONT_SIZE),
    );
    if let Some(node) = engine.node_mut(id) {
        node.color = Color::BLACK;
        node.z_order = 100;
    }
    id
}
