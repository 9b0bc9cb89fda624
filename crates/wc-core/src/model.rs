//! Core data model for wireframe canvas documents.
//!
//! A document is a flat table of positioned `Entity` values extracted from a
//! generated HTML fragment, plus an inert background remainder. Entities
//! carry opaque markup content that is stored and re-emitted verbatim;
//! geometry lives in pixel coordinates relative to the canvas origin.

use crate::id::EntityId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Layout constants ────────────────────────────────────────────────────

/// Size applied when a source element reports no usable box.
pub const FALLBACK_SIZE: Size = Size {
    width: 200.0,
    height: 40.0,
};

/// Vertical spacing used by the deterministic `index * offset` position
/// fallback when neither inline styles nor measurements are available.
pub const STACK_OFFSET: f32 = 60.0;

/// Gap inserted between entities by the auto-arrange pass.
pub const ARRANGE_GAP: f32 = 20.0;

/// Palette-sourced entities stack above generated ones by default.
pub const ADDED_Z_BASE: i32 = 100;

// ─── Geometry ────────────────────────────────────────────────────────────

/// A point in canvas pixels, relative to the canvas origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Canvas coordinates are never negative.
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.max(0.0),
            y: self.y.max(0.0),
        }
    }
}

/// Width/height in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Size {
    fn default() -> Self {
        FALLBACK_SIZE
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    /// AABB overlap check.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

// ─── Markup ──────────────────────────────────────────────────────────────

/// An opaque, pre-sanitized markup fragment.
///
/// This core never interprets, validates, or escapes the wrapped string —
/// it is captured verbatim at parse time and re-emitted verbatim by the
/// serializer. Sanitization, if required, is an upstream collaborator's
/// responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Markup(String);

impl Markup {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<&str> for Markup {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ─── Entities ────────────────────────────────────────────────────────────

/// Where an entity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EntityOrigin {
    /// Extracted from the generated source fragment.
    #[default]
    Generated,
    /// Inserted from the component palette.
    Added,
}

/// One positionable, draggable unit of wireframe content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable id, unique within an editing session.
    pub id: EntityId,

    /// Inner markup, stored and re-emitted verbatim.
    pub content: Markup,

    /// Source of the entity (affects default z-order only).
    pub origin: EntityOrigin,

    /// Top-left corner, canvas-relative, always non-negative.
    pub position: Point,

    /// Box size; defaults applied when the source reports zero size.
    pub size: Size,

    /// Stacking order. Higher paints on top.
    pub z_index: i32,

    /// Deactivated entities are soft-deleted: kept in the store so ids are
    /// never renumbered, omitted entirely from serialized output.
    pub active: bool,

    /// Class names captured from the source element, re-emitted on the
    /// wrapper so class-matched entities keep their hook through round-trips.
    pub classes: SmallVec<[String; 2]>,
}

impl Entity {
    pub fn new(id: EntityId, content: Markup, origin: EntityOrigin) -> Self {
        Self {
            id,
            content,
            origin,
            position: Point::default(),
            size: Size::default(),
            z_index: 0,
            active: true,
            classes: SmallVec::new(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            x: self.position.x,
            y: self.position.y,
            width: self.size.width,
            height: self.size.height,
        }
    }
}

/// A component descriptor handed over by the external palette UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteItem {
    /// Requested id; empty means "allocate one".
    pub id: String,
    /// Markup for the component, opaque to this core.
    pub html: String,
    pub width: Option<f32>,
    pub height: Option<f32>,
    /// Drop position hint; absent means "stack below existing entities".
    pub position: Option<Point>,
}

impl PaletteItem {
    pub fn new(id: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            html: html.into(),
            width: None,
            height: None,
            position: None,
        }
    }
}

// ─── Canvas ──────────────────────────────────────────────────────────────

/// The editing canvas dimensions, used by the emitter's container shell
/// and by lint bounds checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasMeta {
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasMeta {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}
