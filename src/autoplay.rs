//! Demo player
//!
//! Watches the scene and produces pointer input like a human would: each
//! balloon gets one tap (or is deliberately let go) a little while after it
//! comes on screen. Also taps the intro and restart affordances.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::Millis;
use crate::engine::{Engine, NodeId};
use crate::intro::IntroScreen;
use crate::settings::AutoplaySettings;
use crate::sim::{GameSession, PointerEvent, TickInput};

#[derive(Debug)]
pub struct Autoplay {
    rng: Pcg32,
    accuracy: f32,
    reaction_ms: Millis,
    /// When each on-screen balloon was first noticed
    seen: BTreeMap<NodeId, Millis>,
    /// Balloons already dealt with (tapped or let go)
    decided: BTreeMap<NodeId, bool>,
    next_channel: u32,
}

impl Autoplay {
    pub fn new(settings: &AutoplaySettings, seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            accuracy: settings.accuracy.clamp(0.0, 1.0),
            reaction_ms: settings.reaction_ms,
            seen: BTreeMap::new(),
            decided: BTreeMap::new(),
            next_channel: 0,
        }
    }

    /// Forget everything about the previous session
    pub fn reset(&mut self) {
        self.seen.clear();
        self.decided.clear();
    }

    /// Balloons tapped so far in this session
    pub fn taps(&self) -> usize {
        self.decided.values().filter(|tapped| **tapped).count()
    }

    fn tap(&mut self, input: &mut TickInput, location: Vec2) {
        let channel = self.next_channel;
        self.next_channel = self.next_channel.wrapping_add(1);
        input.pointer.push(PointerEvent::down(channel, location));
        input.pointer.push(PointerEvent::up(channel, location));
    }

    /// Input for the next game tick
    pub fn game_input<E: Engine>(&mut self, session: &GameSession<E>) -> TickInput {
        let mut input = TickInput::default();
        let engine = &session.stage.engine;
        let now = session.stage.now();

        if session.sequencer.is_armed() {
            let center = engine.viewport().center();
            self.tap(&mut input, center);
            return input;
        }

        self.seen.retain(|node, _| session.scheduler.owns(*node));
        self.decided.retain(|node, _| session.scheduler.owns(*node));

        let viewport = engine.viewport();
        let visible: Vec<(NodeId, Vec2)> = session
            .scheduler
            .balloons()
            .filter(|b| b.is_active() && !self.decided.contains_key(&b.node))
            .filter_map(|b| engine.world_position(b.node).map(|p| (b.node, p)))
            .filter(|(_, p)| viewport.contains_point(*p))
            .collect();

        for (node, location) in visible {
            let first_seen = *self.seen.entry(node).or_insert(now);
            if now.saturating_sub(first_seen) < self.reaction_ms {
                continue;
            }
            let hit = self.rng.random::<f32>() < self.accuracy;
            self.decided.insert(node, hit);
            if hit {
                self.tap(&mut input, location);
            }
        }
        input
    }

    /// Input for the next intro tick: retry a failed load, or start playing
    pub fn intro_input<E: Engine>(&mut self, intro: &IntroScreen<E>) -> TickInput {
        let mut input = TickInput::default();
        let target = intro.retry_target().or_else(|| intro.play_target());
        if let Some(location) = target.and_then(|node| intro.stage.engine.world_position(node)) {
            self.tap(&mut input, location);
        }
        input
    }
}
