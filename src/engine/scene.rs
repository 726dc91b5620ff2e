//! In-memory scene graph

use std::collections::BTreeMap;

use glam::Vec2;

use super::node::{Color, Node, NodeId, NodeKind, Rect};
use super::Engine;

/// Scene graph keyed by node id (ordered for deterministic iteration)
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: BTreeMap<NodeId, Node>,
    root: NodeId,
    viewport: Rect,
    next_id: u32,
}

impl Scene {
    /// Create a scene whose root layer covers `size`, origin at bottom-left
    pub fn new(size: Vec2) -> Self {
        let root = NodeId(0);
        let mut layer = Node::new(
            root,
            NodeKind::Layer {
                start_color: Color::BLACK,
                end_color: Color::BLACK,
            },
            size,
        );
        layer.position = size * 0.5;

        let mut nodes = BTreeMap::new();
        nodes.insert(root, layer);

        Self {
            nodes,
            root,
            viewport: Rect::new(Vec2::ZERO, size),
            next_id: 1,
        }
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All live nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    fn unlink(&mut self, id: NodeId) {
        let parent = self.nodes.get(&id).and_then(|n| n.parent);
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
    }
}

impl Engine for Scene {
    fn root(&self) -> NodeId {
        self.root
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn create_node(&mut self, kind: NodeKind, size: Vec2) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node::new(id, kind, size));
        id
    }

    fn add_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || !self.nodes.contains_key(&parent) || !self.nodes.contains_key(&child) {
            log::warn!("add_child({parent:?}, {child:?}) ignored: unknown node");
            return;
        }
        self.unlink(child);
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parent = Some(parent);
        }
    }

    fn remove_node(&mut self, id: NodeId) {
        if id == self.root {
            self.clear();
            return;
        }
        self.unlink(id);

        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                pending.extend(node.children);
            }
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    fn clear(&mut self) {
        let root = self.root;
        self.nodes.retain(|id, _| *id == root);
        if let Some(layer) = self.nodes.get_mut(&root) {
            layer.children.clear();
        }
    }
}
