use crate::element::{Element, ElementKind};
use crate::types::Bounds;
use std::any::Any;

// --- Container ---
/// Plain grouping node. Produced for `asset` and `fullScreen` templates and
/// for scene stages.
#[derive(Debug, Clone, Default)]
pub struct Container;

impl Container {
    pub fn new() -> Self {
        Self
    }
}

impl Element for Container {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn kind(&self) -> ElementKind {
        ElementKind::Container
    }
}

// --- Mask ---
/// Rectangular clip shape. Never painted and never counted in bounds.
#[derive(Debug, Clone)]
pub struct MaskShape {
    pub rect: Bounds,
}

impl MaskShape {
    pub fn new(rect: Bounds) -> Self {
        Self { rect }
    }
}

impl Element for MaskShape {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn kind(&self) -> ElementKind {
        ElementKind::Mask
    }
    fn content_bounds(&self) -> Option<Bounds> {
        Some(self.rect)
    }
}
