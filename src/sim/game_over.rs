//! Game over panel and restart gate

use glam::Vec2;

use crate::Millis;
use crate::consts::*;
use crate::engine::{Color, Engine, NodeId, NodeKind, place_at};

use super::animator::Action;
use super::hit_test::{PointerEvent, PointerPhase};
use super::stage::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerPhase {
    Inactive,
    /// Panel shown, taps ignored until `arm_at`
    Displaying { arm_at: Millis },
    /// Next pointer-down requests a restart
    Armed,
    RestartRequested,
}

/// Node handles of the modal panel
#[derive(Debug, Clone, Copy)]
pub struct GameOverPanel {
    pub container: NodeId,
    pub background: NodeId,
    pub title: NodeId,
    pub restart: NodeId,
}

#[derive(Debug, Clone)]
pub struct GameOverSequencer {
    phase: SequencerPhase,
    panel: Option<GameOverPanel>,
    display_delay: Millis,
}

impl Default for GameOverSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl GameOverSequencer {
    pub fn new() -> Self {
        Self {
            phase: SequencerPhase::Inactive,
            panel: None,
            display_delay: RESTART_DISPLAY_DELAY_MS,
        }
    }

    #[inline]
    pub fn phase(&self) -> SequencerPhase {
        self.phase
    }

    pub fn panel(&self) -> Option<&GameOverPanel> {
        self.panel.as_ref()
    }

    pub fn is_armed(&self) -> bool {
        self.phase == SequencerPhase::Armed
    }

    /// Show the panel. Only the first call does anything.
    pub fn start<E: Engine>(&mut self, stage: &mut Stage<E>) {
        if self.phase != SequencerPhase::Inactive {
            return;
        }
        let engine = &mut stage.engine;
        let root = engine.root();
        let viewport = engine.viewport();
        let size = Vec2::new(viewport.width() * 0.85, viewport.height() * 0.25);

        let container = engine.create_node(NodeKind::Container, size);
        place_at(engine, container, 0.5, 0.5, Some(root));

        let background = engine.create_node(NodeKind::Panel, size);
        place_at(engine, background, 0.5, 0.5, Some(container));

        let title = engine.create_node(
            NodeKind::Label {
                text: "GAME OVER".into(),
                font_size: 48.0,
            },
            Vec2::new(size.x, 48.0),
        );
        place_at(engine, title, 0.5, 0.4, Some(container));

        let restart = engine.create_node(
            NodeKind::Label {
                text: "[tap to restart]".into(),
                font_size: 12.0,
            },
            Vec2::new(size.x, 12.0),
        );
        place_at(engine, restart, 0.5, 0.7, Some(container));

        for (id, z, color, opacity) in [
            (container, 998, Color::WHITE, 255),
            (background, 999, Color::DARK_GRAY, 255),
            (title, 1000, Color::WHITE, 255),
            (restart, 1001, Color::WHITE, 0),
        ] {
            if let Some(node) = engine.node_mut(id) {
                node.z_order = z;
                node.color = color;
                node.opacity = opacity;
            }
        }

        stage
            .animator
            .run(restart, Action::blink(RESTART_BLINK_MS, 1).repeat_forever());

        let arm_at = stage.now() + self.display_delay;
        log::info!("Game over panel shown, restart armed at {arm_at}ms");
        self.panel = Some(GameOverPanel {
            container,
            background,
            title,
            restart,
        });
        self.phase = SequencerPhase::Displaying { arm_at };
    }

    /// Arm the restart affordance once the display delay has passed
    pub fn update<E: Engine>(&mut self, stage: &mut Stage<E>) {
        let SequencerPhase::Displaying { arm_at } = self.phase else {
            return;
        };
        if stage.now() < arm_at {
            return;
        }
        if let Some(panel) = self.panel
            && let Some(node) = stage.engine.node_mut(panel.restart)
        {
            node.opacity = 255;
        }
        self.phase = SequencerPhase::Armed;
    }

    /// Offer a pointer event. True when it requested a restart (and is consumed).
    pub fn on_pointer(&mut self, event: &PointerEvent) -> bool {
        if self.phase == SequencerPhase::Armed && event.phase == PointerPhase::Down {
            log::info!("Restart requested");
            self.phase = SequencerPhase::RestartRequested;
            return true;
        }
        false
    }
}
