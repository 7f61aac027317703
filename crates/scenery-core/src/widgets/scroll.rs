use super::find_part;
use crate::element::{Element, ElementKind};
use crate::node::MaskShape;
use crate::scene::SceneGraph;
use crate::types::{Bounds, NodeId};
use glam::Vec2;
use std::any::Any;
use tracing::warn;

/// Wheel deltas are halved before moving the beed.
const WHEEL_FACTOR: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drag {
    /// Dragging the content area; the beed moves opposite to the pointer.
    Area,
    /// Dragging the beed itself.
    Beed,
}

/// A vertical scroll pane: `scrollContent` clipped to the height of
/// `scrollBar`, with `beed` as the thumb.
#[derive(Debug, Clone)]
pub struct Scroll {
    pub beed: Option<NodeId>,
    pub bar: Option<NodeId>,
    pub content: Option<NodeId>,
    pub bar_height: f32,
    pub content_height: f32,
    pub mask: Option<NodeId>,
    /// Local rectangle that accepts drags, present only while scrolling is possible.
    pub scroll_area: Option<Bounds>,
    pub enabled: bool,
    drag: Option<Drag>,
    drag_start_y: f32,
    beed_start_y: f32,
}

impl Default for Scroll {
    fn default() -> Self {
        Self {
            beed: None,
            bar: None,
            content: None,
            bar_height: 0.0,
            content_height: 0.0,
            mask: None,
            scroll_area: None,
            enabled: true,
            drag: None,
            drag_start_y: 0.0,
            beed_start_y: 0.0,
        }
    }
}

impl Scroll {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn parts(&self) -> Option<(NodeId, NodeId, NodeId)> {
        Some((self.beed?, self.bar?, self.content?))
    }
}

impl Element for Scroll {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn kind(&self) -> ElementKind {
        ElementKind::Scroll
    }
}

pub fn init(graph: &mut SceneGraph, id: NodeId) {
    let beed = find_part(graph, id, "beed");
    let bar = find_part(graph, id, "scrollBar");
    let content = find_part(graph, id, "scrollContent");
    if beed.is_none() || bar.is_none() || content.is_none() {
        warn!(
            "Scroll '{}' requires 'beed', 'scrollBar' and 'scrollContent' children",
            graph.name(id).unwrap_or_default()
        );
        return;
    }
    if let Some(scroll) = graph.element_mut::<Scroll>(id) {
        scroll.beed = beed;
        scroll.bar = bar;
        scroll.content = content;
    }
    calculate(graph, id);
}

/// Rebuilds the clip mask and scroll area from the current bar and content
/// sizes. Content that fits hides the bar.
pub fn calculate(graph: &mut SceneGraph, id: NodeId) {
    let Some(scroll) = graph.element_mut::<Scroll>(id) else {
        return;
    };
    let old_mask = scroll.mask.take();
    scroll.scroll_area = None;
    let parts = scroll.parts();

    if let Some(mask) = old_mask {
        if graph.parent(mask) == Some(id) && graph.kind(mask) == Some(ElementKind::Mask) {
            graph.destroy_node(mask);
        }
    }
    let Some((_, bar, content)) = parts else {
        return;
    };
    graph.set_mask(content, None);

    let bar_height = graph.height(bar);
    let content_height = graph.height(content);
    if let Some(scroll) = graph.element_mut::<Scroll>(id) {
        scroll.bar_height = bar_height;
        scroll.content_height = content_height;
    }

    if content_height <= bar_height {
        graph.set_visible(bar, false);
        graph.set_y(content, 0.0);
        return;
    }

    graph.set_visible(bar, true);
    let width = graph.x(bar) - graph.x(content);
    let rect = Bounds::from_xywh(0.0, 0.0, width, bar_height);

    let mask = graph.add_named(Box::new(MaskShape::new(rect)), "scrollMask");
    graph.add_child(id, mask);
    graph.set_mask(content, Some(mask));

    graph.set_y(content, 0.0);
    graph.set_y(bar, 0.0);
    if let Some(scroll) = graph.element_mut::<Scroll>(id) {
        scroll.mask = Some(mask);
        scroll.scroll_area = Some(rect);
    }
}

/// True when a global point falls inside the drag area.
pub fn hit_test_area(graph: &SceneGraph, id: NodeId, global: Vec2) -> bool {
    let Some(area) = graph.element::<Scroll>(id).and_then(|s| s.scroll_area) else {
        return false;
    };
    area.contains(graph.to_local(id, global))
}

/// Starts a drag at global `y`, either on the beed or on the content area.
pub fn pointer_down(graph: &mut SceneGraph, id: NodeId, y: f32, on_beed: bool) {
    let Some(beed) = graph.element::<Scroll>(id).and_then(|s| s.beed) else {
        return;
    };
    let beed_y = graph.y(beed);
    let bar_height = graph
        .element::<Scroll>(id)
        .and_then(|s| s.bar)
        .map(|bar| graph.height(bar));
    if let Some(scroll) = graph.element_mut::<Scroll>(id) {
        scroll.drag = Some(if on_beed { Drag::Beed } else { Drag::Area });
        scroll.drag_start_y = y;
        scroll.beed_start_y = beed_y;
        if let Some(h) = bar_height {
            scroll.bar_height = h;
        }
    }
}

pub fn pointer_move(graph: &mut SceneGraph, id: NodeId, y: f32) {
    let Some(scroll) = graph.element::<Scroll>(id) else {
        return;
    };
    let Some(drag) = scroll.drag else {
        return;
    };
    let delta = match drag {
        Drag::Area => scroll.drag_start_y - y,
        Drag::Beed => y - scroll.drag_start_y,
    };
    let target = scroll.beed_start_y + delta;
    place_beed(graph, id, target);
}

pub fn pointer_up(graph: &mut SceneGraph, id: NodeId) {
    if let Some(scroll) = graph.element_mut::<Scroll>(id) {
        scroll.drag = None;
    }
}

/// Scrolls by a wheel delta. Positive `dy` moves the content up.
pub fn wheel(graph: &mut SceneGraph, id: NodeId, dy: f32) {
    let Some(scroll) = graph.element::<Scroll>(id) else {
        return;
    };
    if !scroll.enabled {
        return;
    }
    let (Some(beed), Some(bar)) = (scroll.beed, scroll.bar) else {
        return;
    };
    let bar_height = graph.height(bar);
    if let Some(scroll) = graph.element_mut::<Scroll>(id) {
        scroll.bar_height = bar_height;
    }
    let delta = -dy * WHEEL_FACTOR;
    let target = graph.y(beed) - delta;
    place_beed(graph, id, target);
}

/// Clamps the beed into the bar and scrolls the content proportionally.
fn place_beed(graph: &mut SceneGraph, id: NodeId, target: f32) {
    let Some(scroll) = graph.element::<Scroll>(id) else {
        return;
    };
    let Some((beed, _, content)) = scroll.parts() else {
        return;
    };
    let bar_height = scroll.bar_height;
    let travel = bar_height - graph.height(beed);
    let beed_y = target.min(travel).max(0.0);
    graph.set_y(beed, beed_y);

    let per = if travel > 0.0 { beed_y / travel } else { 0.0 };
    let overflow = graph.height(content) - bar_height;
    graph.set_y(content, -per * overflow);
}
