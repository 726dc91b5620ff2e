//! Pointer hit testing
//!
//! One-by-one touch dispatch with swallowing: a pointer-down is offered to
//! subscribed nodes in registration order and the first node whose bounds
//! contain it claims the contact. Later phases of that contact (move, up,
//! cancel) go to the claimant only. Optional "held" events repeat at a fixed
//! cadence while a claimed contact stays down.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::engine::{Engine, NodeId};
use crate::Millis;

/// Identity of one physical contact (finger / mouse button)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Moved,
    Up,
    Cancelled,
}

/// Raw pointer input in world coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub channel: ChannelId,
    pub phase: PointerPhase,
    pub location: Vec2,
}

impl PointerEvent {
    pub fn down(channel: u32, location: Vec2) -> Self {
        Self {
            channel: ChannelId(channel),
            phase: PointerPhase::Down,
            location,
        }
    }

    pub fn moved(channel: u32, location: Vec2) -> Self {
        Self {
            channel: ChannelId(channel),
            phase: PointerPhase::Moved,
            location,
        }
    }

    pub fn up(channel: u32, location: Vec2) -> Self {
        Self {
            channel: ChannelId(channel),
            phase: PointerPhase::Up,
            location,
        }
    }

    pub fn cancelled(channel: u32, location: Vec2) -> Self {
        Self {
            channel: ChannelId(channel),
            phase: PointerPhase::Cancelled,
            location,
        }
    }
}

/// Events delivered to the owner of a subscription
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitEvent {
    Began { entity: NodeId, channel: ChannelId, location: Vec2 },
    Held { entity: NodeId, channel: ChannelId },
    Moved { entity: NodeId, channel: ChannelId, location: Vec2 },
    Ended { entity: NodeId, channel: ChannelId, location: Vec2 },
    Cancelled { entity: NodeId, channel: ChannelId },
}

impl HitEvent {
    pub fn entity(&self) -> NodeId {
        match *self {
            HitEvent::Began { entity, .. }
            | HitEvent::Held { entity, .. }
            | HitEvent::Moved { entity, .. }
            | HitEvent::Ended { entity, .. }
            | HitEvent::Cancelled { entity, .. } => entity,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Subscription {
    entity: NodeId,
    held_interval: Option<Millis>,
}

#[derive(Debug, Clone, Copy)]
struct HeldTimer {
    entity: NodeId,
    interval: Millis,
    next_fire: Millis,
}

/// Per-entity tap subscriptions plus per-contact ownership
#[derive(Debug, Default)]
pub struct PointerHitTester {
    /// Registration order decides who gets first refusal
    subscriptions: Vec<Subscription>,
    claims: BTreeMap<ChannelId, NodeId>,
    /// At most one timer per contact
    held: BTreeMap<ChannelId, HeldTimer>,
    now: Millis,
}

impl PointerHitTester {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `entity`. A `held_interval` of `Some(ms > 0)` turns on held events.
    /// Re-attaching an entity replaces its previous subscription in place.
    pub fn attach(&mut self, entity: NodeId, held_interval: Option<Millis>) {
        let held_interval = held_interval.filter(|ms| *ms > 0);
        if let Some(existing) = self.subscriptions.iter_mut().find(|s| s.entity == entity) {
            existing.held_interval = held_interval;
            return;
        }
        self.subscriptions.push(Subscription {
            entity,
            held_interval,
        });
    }

    /// Unsubscribe `entity` and forget any contact it owns. Returns whether
    /// it was subscribed. No event for `entity` is produced afterwards.
    pub fn detach(&mut self, entity: NodeId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.entity != entity);
        self.claims.retain(|_, owner| *owner != entity);
        self.held.retain(|_, timer| timer.entity != entity);
        before != self.subscriptions.len()
    }

    pub fn is_attached(&self, entity: NodeId) -> bool {
        self.subscriptions.iter().any(|s| s.entity == entity)
    }

    /// Current owner of a contact
    pub fn owner(&self, channel: ChannelId) -> Option<NodeId> {
        self.claims.get(&channel).copied()
    }

    pub fn active_held_timers(&self) -> usize {
        self.held.len()
    }

    pub fn clear(&mut self) {
        self.subscriptions.clear();
        self.claims.clear();
        self.held.clear();
    }

    /// Move the clock to `now` and emit held events that came due, in
    /// (deadline, channel) order.
    pub fn advance(&mut self, now: Millis) -> Vec<HitEvent> {
        self.now = self.now.max(now);
        let mut due: Vec<(Millis, ChannelId, NodeId)> = Vec::new();
        for (channel, timer) in self.held.iter_mut() {
            while timer.next_fire <= self.now {
                due.push((timer.next_fire, *channel, timer.entity));
                timer.next_fire += timer.interval;
            }
        }
        due.sort_by_key(|(at, channel, _)| (*at, *channel));
        due.into_iter()
            .map(|(_, channel, entity)| HitEvent::Held { entity, channel })
            .collect()
    }

    /// Dispatch one raw pointer event
    pub fn dispatch<E: Engine + ?Sized>(&mut self, engine: &E, event: PointerEvent) -> Option<HitEvent> {
        let channel = event.channel;
        match event.phase {
            PointerPhase::Down => self.pointer_down(engine, channel, event.location),
            PointerPhase::Moved => self.claims.get(&channel).map(|&entity| HitEvent::Moved {
                entity,
                channel,
                location: event.location,
            }),
            PointerPhase::Up => {
                self.held.remove(&channel);
                self.claims.remove(&channel).map(|entity| HitEvent::Ended {
                    entity,
                    channel,
                    location: event.location,
                })
            }
            PointerPhase::Cancelled => {
                self.held.remove(&channel);
                self.claims
                    .remove(&channel)
                    .map(|entity| HitEvent::Cancelled { entity, channel })
            }
        }
    }

    fn pointer_down<E: Engine + ?Sized>(
        &mut self,
        engine: &E,
        channel: ChannelId,
        location: Vec2,
    ) -> Option<HitEvent> {
        if self.claims.contains_key(&channel) {
            log::debug!("ignoring repeated down on claimed channel {channel:?}");
            return None;
        }

        let claimant = self
            .subscriptions
            .iter()
            .find(|sub| hits(engine, sub.entity, location))
            .copied()?;

        self.claims.insert(channel, claimant.entity);
        if let Some(interval) = claimant.held_interval {
            self.held.insert(
                channel,
                HeldTimer {
                    entity: claimant.entity,
                    interval,
                    next_fire: self.now + interval,
                },
            );
        }

        Some(HitEvent::Began {
            entity: claimant.entity,
            channel,
            location,
        })
    }
}

/// Own bounds first, then a single-level fallback to the first child's bounds
/// for containers whose own box was never sized.
fn hits<E: Engine + ?Sized>(engine: &E, entity: NodeId, location: Vec2) -> bool {
    let Some(node) = engine.node(entity) else {
        return false;
    };
    if !node.is_hittable() {
        return false;
    }
    if engine
        .world_bounds(entity)
        .is_some_and(|b| b.contains_point(location))
    {
        return true;
    }
    engine
        .first_child(entity)
        .and_then(|child| engine.world_bounds(child))
        .is_some_and(|b| b.contains_point(location))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{NodeKind, Scene, place_at};

    fn balloon(scene: &mut Scene, x: f32, y: f32) -> NodeId {
        let root = scene.root();
        let node = scene.create_node(NodeKind::Container, Vec2::new(40.0, 40.0));
        scene.add_child(root, node);
        scene.node_mut(node).unwrap().position = Vec2::new(x, y);
        node
    }

    fn scene() -> Scene {
        Scene::new(Vec2::new(400.0, 400.0))
    }

    #[test]
    fn test_overlapping_entities_only_first_receives() {
        let mut scene = scene();
        let a = balloon(&mut scene, 100.0, 100.0);
        let b = balloon(&mut scene, 110.0, 100.0);
        let mut tester = PointerHitTester::new();
        tester.attach(a, None);
        tester.attach(b, None);

        let event = tester.dispatch(&scene, PointerEvent::down(1, Vec2::new(105.0, 100.0)));
        assert!(matches!(event, Some(HitEvent::Began { entity, .. }) if entity == a));
        assert_eq!(tester.owner(ChannelId(1)), Some(a));
    }

    #[test]
    fn test_miss_produces_nothing() {
        let mut scene = scene();
        let a = balloon(&mut scene, 100.0, 100.0);
        let mut tester = PointerHitTester::new();
        tester.attach(a, None);

        assert!(tester.dispatch(&scene, PointerEvent::down(1, Vec2::new(300.0, 300.0))).is_none());
        assert!(tester.dispatch(&scene, PointerEvent::moved(1, Vec2::new(100.0, 100.0))).is_none());
        assert!(tester.dispatch(&scene, PointerEvent::up(1, Vec2::new(100.0, 100.0))).is_none());
    }

    #[test]
    fn test_transparent_entity_never_matches() {
        let mut scene = scene();
        let a = balloon(&mut scene, 100.0, 100.0);
        scene.node_mut(a).unwrap().opacity = 0;
        let mut tester = PointerHitTester::new();
        tester.attach(a, None);

        assert!(tester.dispatch(&scene, PointerEvent::down(1, Vec2::new(100.0, 100.0))).is_none());
    }

    #[test]
    fn test_first_child_fallback_is_single_level() {
        let mut scene = scene();
        let root = scene.root();
        let container = scene.create_node(NodeKind::Container, Vec2::ZERO);
        place_at(&mut scene, container, 0.5, 0.5, Some(root));
        let sprite = scene.create_node(NodeKind::Container, Vec2::new(50.0, 50.0));
        place_at(&mut scene, sprite, 0.0, 0.0, Some(container));
        let grandchild = scene.create_node(NodeKind::Panel, Vec2::new(10.0, 10.0));
        scene.add_child(sprite, grandchild);
        scene.node_mut(grandchild).unwrap().position = Vec2::new(-300.0, -300.0);

        let mut tester = PointerHitTester::new();
        tester.attach(container, None);
        assert!(tester.dispatch(&scene, PointerEvent::down(1, Vec2::new(210.0, 210.0))).is_some());

        let far = scene.world_position(grandchild).unwrap();
        assert!(tester.dispatch(&scene, PointerEvent::down(2, far)).is_none());
    }

    #[test]
    fn test_held_cadence_and_release() {
        let mut scene = scene();
        let a = balloon(&mut scene, 100.0, 100.0);
        let mut tester = PointerHitTester::new();
        tester.attach(a, Some(200));

        tester.advance(0);
        assert!(tester.dispatch(&scene, PointerEvent::down(7, Vec2::new(100.0, 100.0))).is_some());
        let held = tester.advance(650);
        assert_eq!(held.len(), 3);
        assert!(held.iter().all(|e| matches!(e, HitEvent::Held { entity, .. } if *entity == a)));

        let ended = tester.dispatch(&scene, PointerEvent::up(7, Vec2::new(100.0, 100.0)));
        assert!(matches!(ended, Some(HitEvent::Ended { .. })));
        assert!(tester.advance(5_000).is_empty());
        assert_eq!(tester.active_held_timers(), 0);
    }

    #[test]
    fn test_held_stops_on_cancel() {
        let mut scene = scene();
        let a = balloon(&mut scene, 100.0, 100.0);
        let mut tester = PointerHitTester::new();
        tester.attach(a, Some(100));

        tester.dispatch(&scene, PointerEvent::down(1, Vec2::new(100.0, 100.0)));
        assert_eq!(tester.advance(250).len(), 2);
        tester.dispatch(&scene, PointerEvent::cancelled(1, Vec2::ZERO));
        assert!(tester.advance(1_000).is_empty());
    }

    #[test]
    fn test_contacts_are_independent() {
        let mut scene = scene();
        let a = balloon(&mut scene, 100.0, 100.0);
        let b = balloon(&mut scene, 300.0, 300.0);
        let mut tester = PointerHitTester::new();
        tester.attach(a, Some(100));
        tester.attach(b, Some(100));

        tester.dispatch(&scene, PointerEvent::down(1, Vec2::new(100.0, 100.0)));
        tester.advance(50);
        tester.dispatch(&scene, PointerEvent::down(2, Vec2::new(300.0, 300.0)));
        tester.dispatch(&scene, PointerEvent::up(1, Vec2::ZERO));

        let held = tester.advance(400);
        assert_eq!(held.len(), 3);
        assert!(held.iter().all(|e| e.entity() == b));
    }

    #[test]
    fn test_detach_silences_entity() {
        let mut scene = scene();
        let a = balloon(&mut scene, 100.0, 100.0);
        let mut tester = PointerHitTester::new();
        tester.attach(a, Some(100));
        tester.dispatch(&scene, PointerEvent::down(1, Vec2::new(100.0, 100.0)));

        assert!(tester.detach(a));
        assert!(!tester.detach(a));
        assert!(tester.advance(1_000).is_empty());
        assert!(tester.dispatch(&scene, PointerEvent::up(1, Vec2::ZERO)).is_none());
        assert!(tester.dispatch(&scene, PointerEvent::down(2, Vec2::new(100.0, 100.0))).is_none());
    }

    #[test]
    fn test_second_down_on_claimed_channel_ignored() {
        let mut scene = scene();
        let a = balloon(&mut scene, 100.0, 100.0);
        let mut tester = PointerHitTester::new();
        tester.attach(a, None);

        assert!(tester.dispatch(&scene, PointerEvent::down(1, Vec2::new(100.0, 100.0))).is_some());
        assert!(tester.dispatch(&scene, PointerEvent::down(1, Vec2::new(100.0, 100.0))).is_none());
    }
}
