use crate::element::{Element, ElementKind};
use crate::systems::assets::TextureRef;
use crate::systems::display_list::Paint;
use crate::types::{Bounds, Orientation};
use scenery_data::model::{NineSliceData, OrientationData};
use std::any::Any;

// --- Sprite ---
/// A textured quad at its authored display size.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub texture: TextureRef,
    pub width: f32,
    pub height: f32,
}

impl Sprite {
    pub fn new(texture: TextureRef, width: f32, height: f32) -> Self {
        Self {
            texture,
            width,
            height,
        }
    }
}

impl Element for Sprite {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn kind(&self) -> ElementKind {
        ElementKind::Sprite
    }

    fn content_bounds(&self) -> Option<Bounds> {
        Some(Bounds::from_xywh(0.0, 0.0, self.width, self.height))
    }

    fn paint(&self) -> Option<Paint> {
        Some(Paint::Sprite {
            texture: self.texture.clone(),
            width: self.width,
            height: self.height,
        })
    }
}

// --- Nine Slice ---
/// Stretchable panel whose size follows the active orientation.
///
/// Unlike containers, only the panel size is orientation-aware; the node's
/// position is left alone on resize.
#[derive(Debug, Clone)]
pub struct NineSlice {
    pub texture: TextureRef,
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
    pub portrait: OrientationData,
    pub landscape: OrientationData,
    orientation: Orientation,
}

impl NineSlice {
    pub fn new(texture: TextureRef, data: &NineSliceData, orientation: Orientation) -> Self {
        let mut slice = Self {
            texture,
            left: data.left,
            right: data.right,
            top: data.top,
            bottom: data.bottom,
            width: data.orig_width,
            height: data.orig_height,
            portrait: data.portrait.clone(),
            landscape: data.landscape.clone(),
            orientation,
        };
        slice.resize(orientation);
        slice
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn resize(&mut self, orientation: Orientation) {
        self.orientation = orientation;
        let current = match orientation {
            Orientation::Portrait => &self.portrait,
            Orientation::Landscape => &self.landscape,
        };
        self.width = current.width;
        self.height = current.height;
    }
}

impl Element for NineSlice {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn kind(&self) -> ElementKind {
        ElementKind::NineSlice
    }

    fn content_bounds(&self) -> Option<Bounds> {
        Some(Bounds::from_xywh(0.0, 0.0, self.width, self.height))
    }

    fn paint(&self) -> Option<Paint> {
        Some(Paint::NineSlice {
            texture: self.texture.clone(),
            width: self.width,
            height: self.height,
            insets: [self.left, self.top, self.right, self.bottom],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nine_slice_follows_orientation() {
        let data = NineSliceData {
            left: 12.0,
            portrait: OrientationData {
                width: 100.0,
                height: 300.0,
                ..Default::default()
            },
            landscape: OrientationData {
                width: 300.0,
                height: 100.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut slice = NineSlice::new(TextureRef::named("frame"), &data, Orientation::Portrait);
        assert_eq!((slice.width, slice.height), (100.0, 300.0));

        slice.resize(Orientation::Landscape);
        assert_eq!((slice.width, slice.height), (300.0, 100.0));
        assert_eq!(slice.content_bounds().unwrap().width, 300.0);
        assert_eq!(slice.left, 12.0);
    }
}
