//! Stage: one scene plus the machinery that animates it and routes input to it

use crate::Millis;
use crate::engine::{Engine, Scene};

use super::animator::{Completion, EntityAnimator};
use super::hit_test::{HitEvent, PointerEvent, PointerHitTester};

/// Everything a screen needs to run on the cooperative timeline
#[derive(Debug)]
pub struct Stage<E: Engine = Scene> {
    pub engine: E,
    pub animator: EntityAnimator,
    pub hit_tester: PointerHitTester,
    now: Millis,
}

impl<E: Engine> Stage<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            animator: EntityAnimator::new(),
            hit_tester: PointerHitTester::new(),
            now: 0,
        }
    }

    /// Current time on this stage's timeline
    #[inline]
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Route one pointer event through the hit tester
    pub fn dispatch(&mut self, event: PointerEvent) -> Option<HitEvent> {
        self.hit_tester.dispatch(&self.engine, event)
    }

    /// Move time forward: step animations and collect held-contact events
    pub fn advance(&mut self, dt: Millis) -> (Vec<Completion>, Vec<HitEvent>) {
        self.now += dt;
        let completed = self.animator.advance(&mut self.engine, dt);
        let held = self.hit_tester.advance(self.now);
        (completed, held)
    }

    /// Stop everything and empty the scene. The clock keeps running.
    pub fn teardown(&mut self) {
        self.animator.clear();
        self.hit_tester.clear();
        self.engine.clear();
    }
}
