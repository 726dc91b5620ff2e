//! Wave scheduler
//!
//! Drives the session: wait, issue a wave of staggered launches, advance the
//! difficulty, wait again. Launches are fire-and-forget; each balloon then
//! resolves on its own, either popped by a tap or missed when its climb
//! finishes. Once the ledger reports game over the scheduler stops issuing
//! normal waves, sends exactly one flood wave and drains.
//!
//! Phases:
//! `Idle -> Waiting -> Spawning -> Waiting -> ... -> Draining -> Terminal`

use std::collections::BTreeMap;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::Millis;
use crate::consts::*;
use crate::engine::{Engine, NodeId, NodeKind, TextureId, place_at};

use super::animator::{Action, ActionId, Completion};
use super::difficulty::{DifficultyCurve, Wave, secs_to_millis};
use super::stage::Stage;
use super::state::{Balloon, BalloonStatus, GameState, MissOutcome};
use super::timeline::Timeline;

/// Where the scheduler's main loop is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    /// Not started
    Idle,
    /// Inter-wave delay; the next wave starts at `until`
    Waiting { until: Millis },
    /// The current wave's launches were queued at `started`; the difficulty
    /// advances within the same update
    Spawning { started: Millis },
    /// Game over: the flood wave's launches are still going out
    Draining,
    /// Nothing more will be launched
    Terminal,
}

/// What happened during one scheduler update
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerEvent {
    WaveStarted { wave: Wave, at: Millis },
    FloodStarted { count: u32, at: Millis },
    Launched { node: NodeId, at: Millis, flood: bool },
    Missed { node: NodeId, outcome: MissOutcome },
    /// A popped balloon finished shrinking and left the scene
    Released { node: NodeId },
    /// Last flood launch issued
    Drained,
}

/// A deferred launch on the scheduler's timeline
#[derive(Debug, Clone, Copy)]
struct Launch {
    wave: u32,
    travel_secs: f32,
    flood: bool,
}

#[derive(Debug)]
pub struct WaveScheduler {
    phase: SchedulerPhase,
    curve: DifficultyCurve,
    base_travel_secs: f32,
    /// Wave whose parameters are in force (pop scoring reads its travel time)
    current: Wave,
    now: Millis,
    launches: Timeline<Launch>,
    /// Live balloons owned by this scheduler
    balloons: BTreeMap<NodeId, Balloon>,
    /// Climb animations; completion means a miss
    climbs: BTreeMap<ActionId, NodeId>,
    /// Shrink animations of popped balloons; completion means release
    releases: BTreeMap<ActionId, NodeId>,
    flood_issued: bool,
    rng: Pcg32,
    texture_count: usize,
}

impl WaveScheduler {
    pub fn new(state: &GameState, texture_count: usize) -> Self {
        Self::with_curve(state, texture_count, DifficultyCurve::default(), BASE_TRAVEL_SECS)
    }

    pub fn with_curve(
        state: &GameState,
        texture_count: usize,
        curve: DifficultyCurve,
        base_travel_secs: f32,
    ) -> Self {
        Self {
            phase: SchedulerPhase::Idle,
            current: curve.next_wave(state.wave_index, base_travel_secs),
            curve,
            base_travel_secs,
            now: 0,
            launches: Timeline::new(),
            balloons: BTreeMap::new(),
            climbs: BTreeMap::new(),
            releases: BTreeMap::new(),
            flood_issued: false,
            rng: state.rng_state.to_rng(),
            texture_count: texture_count.max(1),
        }
    }

    #[inline]
    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    /// Parameters currently in force
    #[inline]
    pub fn current_wave(&self) -> &Wave {
        &self.current
    }

    pub fn flood_issued(&self) -> bool {
        self.flood_issued
    }

    /// Live balloons in node order
    pub fn balloons(&self) -> impl Iterator<Item = &Balloon> {
        self.balloons.values()
    }

    pub fn balloon(&self, node: NodeId) -> Option<&Balloon> {
        self.balloons.get(&node)
    }

    pub fn owns(&self, node: NodeId) -> bool {
        self.balloons.contains_key(&node)
    }

    /// Launches scheduled but not yet issued
    pub fn pending_launches(&self) -> usize {
        self.launches.pending()
    }

    /// Leave `Idle`. The first wave starts after its own delay.
    pub fn start(&mut self) {
        if self.phase != SchedulerPhase::Idle {
            return;
        }
        let until = self.now + secs_to_millis(self.current.delay_secs);
        log::info!("Scheduler started, first wave at {until}ms");
        self.phase = SchedulerPhase::Waiting { until };
    }

    /// Advance the loop by `dt`, issuing any launches that came due
    pub fn update<E: Engine>(
        &mut self,
        stage: &mut Stage<E>,
        state: &mut GameState,
        dt: Millis,
    ) -> Vec<SchedulerEvent> {
        self.now += dt;
        let mut events = Vec::new();

        loop {
            match self.phase {
                SchedulerPhase::Idle | SchedulerPhase::Draining | SchedulerPhase::Terminal => break,
                SchedulerPhase::Waiting { until } => {
                    if state.is_game_over() {
                        // Cut the wait short
                        events.push(self.flood(self.now));
                        continue;
                    }
                    if self.now < until {
                        break;
                    }
                    let wave = self.current;
                    self.schedule_wave(&wave, until, false);
                    log::info!(
                        "Wave {}: {} balloons, travel {:.3}s",
                        wave.index,
                        wave.count,
                        wave.travel_secs
                    );
                    events.push(SchedulerEvent::WaveStarted { wave, at: until });
                    self.phase = SchedulerPhase::Spawning { started: until };
                }
                SchedulerPhase::Spawning { started } => {
                    // Launches are queued, not awaited: the next delay runs from the wave start
                    let index = state.advance_wave();
                    self.current = self.curve.next_wave(index, self.base_travel_secs);
                    if state.is_game_over() {
                        events.push(self.flood(self.now));
                    } else {
                        self.phase = SchedulerPhase::Waiting {
                            until: started + secs_to_millis(self.current.delay_secs),
                        };
                    }
                }
            }
        }

        for (at, launch) in self.launches.advance(dt) {
            let node = self.launch(stage, launch);
            events.push(SchedulerEvent::Launched {
                node,
                at,
                flood: launch.flood,
            });
        }

        if self.phase == SchedulerPhase::Draining && self.launches.is_idle() {
            log::info!("Flood wave fully launched");
            self.phase = SchedulerPhase::Terminal;
            events.push(SchedulerEvent::Drained);
        }

        events
    }

    /// Queue the one and only flood wave and move to `Draining`
    fn flood(&mut self, at: Millis) -> SchedulerEvent {
        debug_assert!(!self.flood_issued, "flood wave issued twice");
        let wave = Wave {
            count: FLOOD_WAVE_COUNT,
            ..self.current
        };
        self.schedule_wave(&wave, at, true);
        self.flood_issued = true;
        self.phase = SchedulerPhase::Draining;
        log::info!("Game over, flooding {FLOOD_WAVE_COUNT} balloons");
        SchedulerEvent::FloodStarted {
            count: FLOOD_WAVE_COUNT,
            at,
        }
    }

    fn schedule_wave(&mut self, wave: &Wave, start: Millis, flood: bool) {
        for slot in 0..wave.count {
            self.launches.schedule_at(
                start + wave.launch_offset(slot),
                Launch {
                    wave: wave.index,
                    travel_secs: wave.travel_secs,
                    flood,
                },
            );
        }
    }

    /// Create one balloon below the screen and send it up
    fn launch<E: Engine>(&mut self, stage: &mut Stage<E>, launch: Launch) -> NodeId {
        let engine = &mut stage.engine;
        let root = engine.root();
        let height = engine.viewport().height();

        let texture = TextureId(self.rng.random_range(0..self.texture_count));
        let node = engine.create_node(NodeKind::Sprite { texture }, Vec2::splat(BALLOON_SIZE));
        let x_pct = self.rng.random_range(LAUNCH_MIN_X..=LAUNCH_MAX_X);
        place_at(engine, node, x_pct, LAUNCH_Y, Some(root));

        let start = engine.node(node).map(|n| n.position).unwrap_or(Vec2::ZERO);
        let target = Vec2::new(start.x, height + EXIT_MARGIN);
        let travel_secs = self.curve.jittered_travel(launch.travel_secs, &mut self.rng);

        let climb = stage
            .animator
            .run(node, Action::move_to(secs_to_millis(travel_secs), target));
        stage.hit_tester.attach(node, None);

        self.climbs.insert(climb, node);
        self.balloons
            .insert(node, Balloon::new(node, launch.wave, travel_secs, launch.flood));
        node
    }

    /// Tap on a balloon. Returns the points scored, or `None` when the pop
    /// does not count (game over, unknown or already resolved balloon).
    pub fn pop<E: Engine>(&mut self, stage: &mut Stage<E>, state: &mut GameState, node: NodeId) -> Option<u64> {
        if state.is_game_over() {
            return None;
        }
        let balloon = self.balloons.get_mut(&node).filter(|b| b.is_active())?;

        stage.hit_tester.detach(node);
        let points = state.record_pop(self.current.travel_secs)?;
        balloon.status = BalloonStatus::Popped;

        stage.animator.stop_all(node);
        self.climbs.retain(|_, n| *n != node);
        stage
            .animator
            .run(node, Action::rotate_by(POP_SPIN_MS, 360.0).repeat_forever());
        let shrink = stage.animator.run(node, Action::scale_to(POP_SHRINK_MS, 0.0));
        self.releases.insert(shrink, node);

        log::debug!("Popped {node:?} for {points} points, lives {}", state.lives);
        Some(points)
    }

    /// Feed back an animation completion. Anything not owned here is ignored.
    pub fn on_completion<E: Engine>(
        &mut self,
        stage: &mut Stage<E>,
        state: &mut GameState,
        completion: Completion,
    ) -> Option<SchedulerEvent> {
        if let Some(node) = self.climbs.remove(&completion.id) {
            let balloon = self.balloons.get_mut(&node).filter(|b| b.is_active())?;
            stage.hit_tester.detach(node);
            balloon.status = BalloonStatus::Missed;
            let outcome = state.record_miss();
            self.release(stage, node);
            log::debug!("Missed {node:?}: {outcome:?}");
            return Some(SchedulerEvent::Missed { node, outcome });
        }

        let node = self.releases.remove(&completion.id)?;
        self.release(stage, node);
        Some(SchedulerEvent::Released { node })
    }

    fn release<E: Engine>(&mut self, stage: &mut Stage<E>, node: NodeId) {
        stage.animator.stop_all(node);
        stage.hit_tester.detach(node);
        stage.engine.remove_node(node);
        self.balloons.remove(&node);
    }
}
