use crate::systems::display_list::Paint;
use crate::types::Bounds;
use std::any::Any;

/// Discriminates element behaviour without downcasting.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Container,
    Timeline,
    Button,
    State,
    Toggle,
    Slider,
    Scroll,
    Text,
    BitmapText,
    Sprite,
    NineSlice,
    Particles,
    Skeleton,
    Mask,
}

impl ElementKind {
    /// Kinds that can hold template children.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            ElementKind::Container
                | ElementKind::Timeline
                | ElementKind::Button
                | ElementKind::State
                | ElementKind::Toggle
                | ElementKind::Slider
                | ElementKind::Scroll
        )
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ElementKind::Text | ElementKind::BitmapText)
    }
}

/// The core trait of every node payload in the Scene Graph.
///
/// Transform, hierarchy and naming live on the `SceneNode`; an element only
/// carries what is specific to its kind.
pub trait Element: std::fmt::Debug {
    /// Returns self as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
    /// Returns mutable self as `Any` for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn kind(&self) -> ElementKind;

    /// Painted area in the element's own local space.
    ///
    /// Containers return `None`; their size comes from their children.
    fn content_bounds(&self) -> Option<Bounds> {
        None
    }

    /// Draw payload handed to the host renderer.
    fn paint(&self) -> Option<Paint> {
        None
    }

    /// Replaces the displayed string. Returns `false` for non-text elements.
    fn set_text(&mut self, _text: &str) -> bool {
        false
    }

    fn text(&self) -> Option<&str> {
        None
    }
}
