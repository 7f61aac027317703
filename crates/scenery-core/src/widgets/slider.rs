use super::find_part;
use crate::element::{Element, ElementKind};
use crate::scene::SceneGraph;
use crate::types::NodeId;
use std::any::Any;
use std::fmt;
use tracing::error;

/// A horizontal slider: a `handle` dragged along a `track`.
#[derive(Default)]
pub struct Slider {
    pub handle: Option<NodeId>,
    pub track: Option<NodeId>,
    /// Track width captured at init; the handle's x range is `0..=width`.
    pub width: f32,
    dragging: bool,
    on_change: Option<Box<dyn FnMut(f32)>>,
}

impl fmt::Debug for Slider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slider")
            .field("handle", &self.handle)
            .field("track", &self.track)
            .field("width", &self.width)
            .field("dragging", &self.dragging)
            .finish()
    }
}

impl Slider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn set_callback(&mut self, callback: impl FnMut(f32) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    pub fn remove_callback(&mut self) {
        self.on_change = None;
    }

    fn notify(&mut self, t: f32) {
        if let Some(cb) = self.on_change.as_mut() {
            cb(t);
        }
    }
}

impl Element for Slider {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn kind(&self) -> ElementKind {
        ElementKind::Slider
    }
}

pub fn init(graph: &mut SceneGraph, id: NodeId) {
    let handle = find_part(graph, id, "handle");
    let track = find_part(graph, id, "track");
    let (Some(handle), Some(track)) = (handle, track) else {
        error!("Slider '{}' is missing handle or track", graph.name(id).unwrap_or_default());
        return;
    };
    let width = graph.width(track);
    if let Some(slider) = graph.element_mut::<Slider>(id) {
        slider.handle = Some(handle);
        slider.track = Some(track);
        slider.width = width;
    }
}

/// Places the handle at fraction `t` of the track and reports `t`.
pub fn set_handle_position(graph: &mut SceneGraph, id: NodeId, t: f32) {
    let Some(slider) = graph.element_mut::<Slider>(id) else {
        return;
    };
    let Some(handle) = slider.handle else {
        return;
    };
    let x = t * slider.width;
    slider.notify(t);
    graph.set_x(handle, x);
}

pub fn drag_start(graph: &mut SceneGraph, id: NodeId) {
    if let Some(slider) = graph.element_mut::<Slider>(id) {
        slider.dragging = slider.handle.is_some();
    }
}

/// Moves the handle under a global pointer x. Ignored unless dragging.
/// Returns the new fraction.
pub fn drag_to(graph: &mut SceneGraph, id: NodeId, global_x: f32) -> Option<f32> {
    let slider = graph.element::<Slider>(id)?;
    if !slider.dragging {
        return None;
    }
    let handle = slider.handle?;
    let width = slider.width;
    let parent = graph.parent(handle).unwrap_or(id);
    let left = graph.bounds(parent).map(|b| b.x).unwrap_or_default();
    let x = (global_x - left).clamp(0.0, width.max(0.0));
    graph.set_x(handle, x);

    let t = if width > 0.0 { x / width } else { 0.0 };
    graph.element_mut::<Slider>(id)?.notify(t);
    Some(t)
}

pub fn drag_end(graph: &mut SceneGraph, id: NodeId) {
    if let Some(slider) = graph.element_mut::<Slider>(id) {
        slider.dragging = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Sprite;
    use crate::systems::assets::TextureRef;
    use std::cell::Cell;
    use std::rc::Rc;

    fn build(graph: &mut SceneGraph) -> NodeId {
        let slider = graph.add_named(Box::new(Slider::new()), "volume");
        let track = graph.add_named(Box::new(Sprite::new(TextureRef::named("track"), 200.0, 10.0)), "track");
        let handle = graph.add_named(Box::new(Sprite::new(TextureRef::named("knob"), 20.0, 20.0)), "handle");
        graph.add_child(slider, track);
        graph.add_child(slider, handle);
        init(graph, slider);
        slider
    }

    #[test]
    fn test_init_measures_track() {
        let mut g = SceneGraph::new();
        let s = build(&mut g);
        assert_eq!(g.element::<Slider>(s).unwrap().width, 200.0);
    }

    #[test]
    fn test_set_handle_position_reports_fraction() {
        let mut g = SceneGraph::new();
        let s = build(&mut g);
        let last = Rc::new(Cell::new(-1.0));
        let l = last.clone();
        g.element_mut::<Slider>(s).unwrap().set_callback(move |t| l.set(t));

        set_handle_position(&mut g, s, 0.25);
        let handle = g.element::<Slider>(s).unwrap().handle.unwrap();
        assert_eq!(g.x(handle), 50.0);
        assert_eq!(last.get(), 0.25);
    }

    #[test]
    fn test_drag_clamps_to_track() {
        let mut g = SceneGraph::new();
        let s = build(&mut g);
        g.set_position(s, 100.0, 0.0);
        let handle = g.element::<Slider>(s).unwrap().handle.unwrap();

        assert_eq!(drag_to(&mut g, s, 150.0), None);
        drag_start(&mut g, s);
        assert_eq!(drag_to(&mut g, s, 150.0), Some(0.25));
        assert_eq!(g.x(handle), 50.0);
        assert_eq!(drag_to(&mut g, s, 900.0), Some(1.0));
        assert_eq!(drag_to(&mut g, s, 0.0), Some(0.0));
        drag_end(&mut g, s);
        assert!(!g.element::<Slider>(s).unwrap().is_dragging());
    }
}
