//! Rendering/scene seam
//!
//! The simulation never draws anything. It mutates a scene graph through the
//! [`Engine`] trait and a renderer (outside this crate) reads the same graph
//! every frame. [`Scene`] is the in-memory graph used by the game and the tests.

pub mod node;
pub mod scene;

pub use node::{Color, Node, NodeId, NodeKind, Rect, TextureId};
pub use scene::Scene;

use glam::Vec2;

/// Scene-graph operations the simulation depends on
pub trait Engine {
    /// The root layer; its content size equals the viewport
    fn root(&self) -> NodeId;

    /// Visible area in world space
    fn viewport(&self) -> Rect;

    /// Create a detached node with the given content size
    fn create_node(&mut self, kind: NodeKind, size: Vec2) -> NodeId;

    /// Attach `child` under `parent`, detaching it from any previous parent
    fn add_child(&mut self, parent: NodeId, child: NodeId);

    /// Remove a node and its whole subtree
    fn remove_node(&mut self, id: NodeId);

    fn node(&self, id: NodeId) -> Option<&Node>;

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node>;

    /// Tear down everything below the root
    fn clear(&mut self);

    fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.children.first().copied())
    }

    /// Bottom-left corner of a node's content area in world space.
    /// Children are positioned relative to this point.
    fn content_origin(&self, id: NodeId) -> Option<Vec2> {
        let node = self.node(id)?;
        let center = self.world_position(id)?;
        Some(center - node.size * node.scale * 0.5)
    }

    /// Center of a node in world space
    fn world_position(&self, id: NodeId) -> Option<Vec2> {
        let node = self.node(id)?;
        match node.parent {
            None => Some(node.position),
            Some(parent_id) => {
                let parent = self.node(parent_id)?;
                let origin = self.content_origin(parent_id)?;
                Some(origin + node.position * parent.scale)
            }
        }
    }

    /// Axis-aligned world-space box of a node, derived from its current
    /// position, scale and rotation every time it is asked for.
    fn world_bounds(&self, id: NodeId) -> Option<Rect> {
        let node = self.node(id)?;
        let center = self.world_position(id)?;
        let half = node.size * node.scale.abs() * 0.5;
        let half = if node.rotation == 0.0 {
            half
        } else {
            let (sin, cos) = node.rotation.to_radians().sin_cos();
            let (sin, cos) = (sin.abs(), cos.abs());
            Vec2::new(cos * half.x + sin * half.y, sin * half.x + cos * half.y)
        };
        Some(Rect::new(center - half, center + half))
    }
}

/// Position `node` inside `parent` by fraction of the parent's content size.
///
/// `x_pct` runs left to right, `y_pct` runs top to bottom. When `parent` is
/// `None` the node must already be attached somewhere.
pub fn place_at<E: Engine + ?Sized>(
    engine: &mut E,
    node: NodeId,
    x_pct: f32,
    y_pct: f32,
    parent: Option<NodeId>,
) -> NodeId {
    let parent = match parent {
        Some(parent) => {
            engine.add_child(parent, node);
            parent
        }
        None => {
            let Some(parent) = engine.node(node).and_then(|n| n.parent) else {
                panic!("no parent container for node {node:?} requiring place_at");
            };
            parent
        }
    };

    let parent_size = engine.node(parent).map(|p| p.size).unwrap_or(Vec2::ZERO);
    let target = Vec2::new(
        parent_size.x * x_pct,
        parent_size.y - parent_size.y * y_pct,
    );
    if let Some(n) = engine.node_mut(node) {
        n.position = target;
    }
    node
}
