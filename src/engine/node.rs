//! Scene node record and geometry helpers

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Stable node identity (never reused within a scene)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Index into the session's texture set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureId(pub usize);

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const DARK_GRAY: Color = Color::rgb(169, 169, 169);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Axis-aligned rectangle in world space (y up)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Inclusive on every edge
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

/// What a node draws as
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Full-screen gradient layer
    Layer { start_color: Color, end_color: Color },
    /// Invisible grouping node
    Container,
    /// Textured quad
    Sprite { texture: TextureId },
    /// Text
    Label { text: String, font_size: f32 },
    /// Solid rectangle filled with the node color
    Panel,
    /// Particle emitter (sun, rain)
    Particles { emission_rate: f32, speed: f32 },
}

/// A scene node: transform, appearance and hierarchy links
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    /// Children in insertion order
    pub children: Vec<NodeId>,
    /// Center, relative to the parent's content origin (bottom-left)
    pub position: Vec2,
    /// Unscaled content size
    pub size: Vec2,
    pub scale: f32,
    /// Degrees, clockwise
    pub rotation: f32,
    pub opacity: u8,
    pub visible: bool,
    pub color: Color,
    pub z_order: i32,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind, size: Vec2) -> Self {
        Self {
            id,
            kind,
            parent: None,
            children: Vec::new(),
            position: Vec2::ZERO,
            size,
            scale: 1.0,
            rotation: 0.0,
            opacity: 255,
            visible: true,
            color: Color::WHITE,
            z_order: 0,
        }
    }

    /// Replace label text (no-op for other kinds)
    pub fn set_text(&mut self, value: impl Into<String>) {
        if let NodeKind::Label { text, .. } = &mut self.kind {
            *text = value.into();
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Label { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Whether pointer input may ever land on this node
    pub fn is_hittable(&self) -> bool {
        self.visible && self.opacity > 0
    }
}
