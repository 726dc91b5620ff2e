//! Entity animation commands
//!
//! Finite [`Action`]s (move, scale, rotate, fade, blink, delay, eased and
//! sequenced combinations) report a [`Completion`] when their duration has
//! elapsed. A [`Command::Forever`] restarts its body indefinitely and never
//! completes, so nothing should wait on it.

use glam::Vec2;

use crate::engine::{Engine, Node, NodeId};
use crate::Millis;

/// Handle returned by [`EntityAnimator::run`], echoed back on completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionId(pub u64);

/// Time curve applied to a wrapped action
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ease {
    /// Slow start: `t^rate`
    In(f32),
    /// `t^(1/rate)`; eases out (slow finish) only when `rate > 1`
    Out(f32),
    /// Overshoot and settle, like a dropped ball
    BounceOut,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::In(rate) => t.powf(rate),
            Ease::Out(rate) => t.powf(1.0 / rate),
            Ease::BounceOut => bounce_out(t),
        }
    }
}

fn bounce_out(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

/// A finite animation step
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    MoveTo { duration: Millis, target: Vec2 },
    ScaleTo { duration: Millis, scale: f32 },
    RotateBy { duration: Millis, degrees: f32 },
    FadeTo { duration: Millis, opacity: u8 },
    /// Toggle visibility `times` times over the duration
    Blink { duration: Millis, times: u32 },
    Delay(Millis),
    Ease { ease: Ease, action: Box<Action> },
    /// Steps run strictly one after another
    Sequence(Vec<Action>),
}

impl Action {
    pub fn move_to(duration: Millis, target: Vec2) -> Self {
        Action::MoveTo { duration, target }
    }

    pub fn scale_to(duration: Millis, scale: f32) -> Self {
        Action::ScaleTo { duration, scale }
    }

    pub fn rotate_by(duration: Millis, degrees: f32) -> Self {
        Action::RotateBy { duration, degrees }
    }

    pub fn fade_to(duration: Millis, opacity: u8) -> Self {
        Action::FadeTo { duration, opacity }
    }

    pub fn blink(duration: Millis, times: u32) -> Self {
        Action::Blink { duration, times }
    }

    pub fn delay(duration: Millis) -> Self {
        Action::Delay(duration)
    }

    pub fn sequence(steps: impl IntoIterator<Item = Action>) -> Self {
        Action::Sequence(steps.into_iter().collect())
    }

    pub fn eased(self, ease: Ease) -> Self {
        Action::Ease {
            ease,
            action: Box::new(self),
        }
    }

    pub fn repeat_forever(self) -> Command {
        Command::Forever(self)
    }

    /// Total duration in milliseconds
    pub fn duration(&self) -> Millis {
        match self {
            Action::MoveTo { duration, .. }
            | Action::ScaleTo { duration, .. }
            | Action::RotateBy { duration, .. }
            | Action::FadeTo { duration, .. }
            | Action::Blink { duration, .. }
            | Action::Delay(duration) => *duration,
            Action::Ease { action, .. } => action.duration(),
            Action::Sequence(steps) => steps.iter().map(Action::duration).sum(),
        }
    }
}

/// What gets handed to the animator
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Once(Action),
    Forever(Action),
}

impl From<Action> for Command {
    fn from(action: Action) -> Self {
        Command::Once(action)
    }
}

/// A finished [`Command::Once`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub id: ActionId,
    pub node: NodeId,
}

/// Live state for one finite action. Start values are captured on the first
/// update so an action always animates from wherever the node is when it begins.
#[derive(Debug, Clone)]
enum Step {
    Move { target: Vec2, start: Option<Vec2> },
    Scale { target: f32, start: Option<f32> },
    Rotate { degrees: f32, start: Option<f32> },
    Fade { target: u8, start: Option<u8> },
    Blink { times: u32, original: Option<bool> },
    Delay,
    Ease { ease: Ease, inner: Box<Runner> },
    Sequence { children: Vec<Runner>, current: usize },
}

#[derive(Debug, Clone)]
struct Runner {
    duration: Millis,
    step: Step,
}

impl Runner {
    fn new(action: &Action) -> Self {
        let step = match action {
            Action::MoveTo { target, .. } => Step::Move {
                target: *target,
                start: None,
            },
            Action::ScaleTo { scale, .. } => Step::Scale {
                target: *scale,
                start: None,
            },
            Action::RotateBy { degrees, .. } => Step::Rotate {
                degrees: *degrees,
                start: None,
            },
            Action::FadeTo { opacity, .. } => Step::Fade {
                target: *opacity,
                start: None,
            },
            Action::Blink { times, .. } => Step::Blink {
                times: *times,
                original: None,
            },
            Action::Delay(_) => Step::Delay,
            Action::Ease { ease, action } => Step::Ease {
                ease: *ease,
                inner: Box::new(Runner::new(action)),
            },
            Action::Sequence(steps) => Step::Sequence {
                children: steps.iter().map(Runner::new).collect(),
                current: 0,
            },
        };
        Self {
            duration: action.duration(),
            step,
        }
    }

    /// Apply the state at `elapsed` ms (clamped to the duration)
    fn update(&mut self, node: &mut Node, elapsed: f64) {
        let duration = self.duration as f64;
        let elapsed = elapsed.clamp(0.0, duration);
        let t = if self.duration == 0 {
            1.0
        } else {
            (elapsed / duration) as f32
        };

        match &mut self.step {
            Step::Move { target, start } => {
                let from = *start.get_or_insert(node.position);
                node.position = from + (*target - from) * t;
            }
            Step::Scale { target, start } => {
                let from = *start.get_or_insert(node.scale);
                node.scale = from + (*target - from) * t;
            }
            Step::Rotate { degrees, start } => {
                let from = *start.get_or_insert(node.rotation);
                node.rotation = from + *degrees * t;
            }
            Step::Fade { target, start } => {
                let from = f32::from(*start.get_or_insert(node.opacity));
                let value = from + (f32::from(*target) - from) * t;
                node.opacity = value.round().clamp(0.0, 255.0) as u8;
            }
            Step::Blink { times, original } => {
                let original = *original.get_or_insert(node.visible);
                if t >= 1.0 || *times == 0 {
                    node.visible = original;
                } else {
                    let slice = 1.0 / *times as f32;
                    let m = t % slice;
                    node.visible = m > slice / 2.0;
                }
            }
            Step::Delay => {}
            Step::Ease { ease, inner } => {
                let eased = f64::from(ease.apply(t)) * inner.duration as f64;
                inner.update(node, eased);
            }
            Step::Sequence { children, current } => {
                let mut child_start = 0.0;
                for child in children.iter().take(*current) {
                    child_start += child.duration as f64;
                }
                while let Some(child) = children.get_mut(*current) {
                    let child_end = child_start + child.duration as f64;
                    if elapsed >= child_end {
                        child.update(node, child.duration as f64);
                        *current += 1;
                        child_start = child_end;
                    } else {
                        child.update(node, elapsed - child_start);
                        break;
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Running {
    Once {
        runner: Runner,
        elapsed: Millis,
    },
    Forever {
        body: Action,
        runner: Runner,
        elapsed: Millis,
    },
}

impl Running {
    /// Advance by `dt`; true once a finite action has run its full duration
    fn step(&mut self, node: &mut Node, dt: Millis) -> bool {
        match self {
            Running::Once { runner, elapsed } => {
                *elapsed = (*elapsed + dt).min(runner.duration);
                runner.update(node, *elapsed as f64);
                *elapsed >= runner.duration
            }
            Running::Forever {
                body,
                runner,
                elapsed,
            } => {
                *elapsed += dt;
                if runner.duration == 0 {
                    runner.update(node, 0.0);
                    *runner = Runner::new(body);
                    *elapsed = 0;
                    return false;
                }
                while *elapsed >= runner.duration {
                    runner.update(node, runner.duration as f64);
                    *elapsed -= runner.duration;
                    *runner = Runner::new(body);
                }
                runner.update(node, *elapsed as f64);
                false
            }
        }
    }
}

#[derive(Debug, Clone)]
struct RunningAction {
    id: ActionId,
    node: NodeId,
    state: Running,
}

/// Runs commands against scene nodes, one timeline for all of them
#[derive(Debug, Default)]
pub struct EntityAnimator {
    next_id: u64,
    /// Ordered by id (start order)
    running: Vec<RunningAction>,
}

impl EntityAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a command on a node. Commands on the same node run side by side.
    pub fn run(&mut self, node: NodeId, command: impl Into<Command>) -> ActionId {
        let id = ActionId(self.next_id);
        self.next_id += 1;

        let state = match command.into() {
            Command::Once(action) => Running::Once {
                runner: Runner::new(&action),
                elapsed: 0,
            },
            Command::Forever(body) => Running::Forever {
                runner: Runner::new(&body),
                body,
                elapsed: 0,
            },
        };
        self.running.push(RunningAction { id, node, state });
        id
    }

    /// Cancel everything running on `node`. Attributes stay where they are.
    pub fn stop_all(&mut self, node: NodeId) -> usize {
        let before = self.running.len();
        self.running.retain(|r| r.node != node);
        before - self.running.len()
    }

    pub fn is_running(&self, id: ActionId) -> bool {
        self.running.iter().any(|r| r.id == id)
    }

    /// Number of in-flight actions on a node
    pub fn running_on(&self, node: NodeId) -> usize {
        self.running.iter().filter(|r| r.node == node).count()
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    pub fn clear(&mut self) {
        self.running.clear();
    }

    /// Step every action by `dt`. Actions whose node no longer exists are
    /// dropped without reporting completion.
    pub fn advance<E: Engine + ?Sized>(&mut self, engine: &mut E, dt: Millis) -> Vec<Completion> {
        let mut completed = Vec::new();
        self.running.retain_mut(|action| {
            let Some(node) = engine.node_mut(action.node) else {
                return false;
            };
            if action.state.step(node, dt) {
                completed.push(Completion {
                    id: action.id,
                    node: action.node,
                });
                false
            } else {
                true
            }
        });
        completed
    }
}
