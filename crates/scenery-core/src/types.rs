//! # Types Module
//!
//! Shared data types used across the runtime.
//!
//! ## Responsibilities
//! - **Transform**: Live display transform of a node (what the host engine draws).
//! - **Placement**: Portrait/landscape transform records of a placed instance.
//! - **Bounds**: Axis-aligned rectangles for hit areas, masks and sizing.
//!
//! ## Key Types
//! - `NodeId`: Type alias for arena indices (`usize`).
//! - `Orientation`: Portrait or landscape, derived from the viewport.
//! - `Viewport`: Current screen size in pixels.

use glam::{Affine2, Vec2};
use scenery_data::model::OrientationData;
use serde::{Deserialize, Serialize};

/// A unique identifier for a node in the scene graph.
pub type NodeId = usize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Landscape only when strictly wider than tall.
    pub fn from_size(width: f32, height: f32) -> Self {
        if width > height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

/// Screen size the scene is laid out against.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::from_size(self.width, self.height)
    }

    /// Converts a viewport fraction into a global point.
    pub fn point_at(&self, fraction_x: f32, fraction_y: f32) -> Vec2 {
        Vec2::new(fraction_x * self.width, fraction_y * self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// The live 2D transform of a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
    /// Radians.
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub pivot_x: f32,
    pub pivot_y: f32,
    pub alpha: f32,
    pub visible: bool,
}

impl Transform {
    pub fn new() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            pivot_x: 0.0,
            pivot_y: 0.0,
            alpha: 1.0,
            visible: true,
        }
    }

    /// Parent-relative matrix: `translate(pos) * rotate * scale * translate(-pivot)`.
    pub fn local_matrix(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(
            Vec2::new(self.scale_x, self.scale_y),
            self.rotation,
            Vec2::new(self.x, self.y),
        ) * Affine2::from_translation(Vec2::new(-self.pivot_x, -self.pivot_y))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// Both orientation records of a placed instance plus the active selection.
///
/// Writes through the node accessors land in `current_mut()`, so switching
/// orientation and back restores the last written values.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub portrait: OrientationData,
    pub landscape: OrientationData,
    pub orientation: Orientation,
}

impl Placement {
    pub fn new(portrait: OrientationData, landscape: OrientationData, orientation: Orientation) -> Self {
        Self {
            portrait,
            landscape,
            orientation,
        }
    }

    pub fn current(&self) -> &OrientationData {
        match self.orientation {
            Orientation::Portrait => &self.portrait,
            Orientation::Landscape => &self.landscape,
        }
    }

    pub fn current_mut(&mut self) -> &mut OrientationData {
        match self.orientation {
            Orientation::Portrait => &mut self.portrait,
            Orientation::Landscape => &mut self.landscape,
        }
    }
}

/// Axis-aligned rectangle.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self::from_xywh(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::from_min_max(
            Vec2::new(self.x.min(other.x), self.y.min(other.y)),
            Vec2::new(self.right().max(other.right()), self.bottom().max(other.bottom())),
        )
    }

    /// Overlap of two rectangles, `None` when disjoint.
    pub fn intersection(&self, other: &Bounds) -> Option<Bounds> {
        let min = Vec2::new(self.x.max(other.x), self.y.max(other.y));
        let max = Vec2::new(self.right().min(other.right()), self.bottom().min(other.bottom()));
        if max.x < min.x || max.y < min.y {
            return None;
        }
        Some(Bounds::from_min_max(min, max))
    }

    /// Bounding box of the four corners after `matrix`.
    pub fn transformed(&self, matrix: &Affine2) -> Bounds {
        let corners = [
            Vec2::new(self.x, self.y),
            Vec2::new(self.right(), self.y),
            Vec2::new(self.x, self.bottom()),
            Vec2::new(self.right(), self.bottom()),
        ];
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for corner in corners {
            let p = matrix.transform_point2(corner);
            min = min.min(p);
            max = max.max(p);
        }
        Bounds::from_min_max(min, max)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }
}
