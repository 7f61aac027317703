//! # Widgets
//!
//! Composite containers that bind to conventionally named children once their
//! subtree exists: buttons, view states, toggles, sliders and scroll panes.
//!
//! Widgets are headless. The host forwards pointer input as [`PointerEvent`]s
//! (global coordinates plus a timestamp) and draws whatever the graph says.

use crate::element::ElementKind;
use crate::runtime::Runtime;
use crate::scene::SceneGraph;
use crate::types::NodeId;
use glam::Vec2;
use std::time::{Duration, Instant};

pub mod button;
pub mod scroll;
pub mod slider;
pub mod state;
pub mod toggle;

pub use button::{Button, LabelMode};
pub use scroll::Scroll;
pub use slider::Slider;
pub use state::StateView;
pub use toggle::Toggle;

/// A press held at least this long counts as a long press.
pub const LONG_PRESS_DURATION: Duration = Duration::from_millis(500);
/// Releases farther than this from the press point are drags, not clicks.
pub const MAX_DRAG_DISTANCE: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Over,
    Out,
    Down { position: Vec2, at: Instant },
    Up { position: Vec2, at: Instant },
}

/// What a completed press turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    Click,
    LongPress,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    start: Vec2,
    at: Instant,
    long_fired: bool,
}

/// Press bookkeeping shared by buttons and toggles.
#[derive(Debug, Clone, Default)]
pub struct ClickTracker {
    press: Option<Press>,
}

impl ClickTracker {
    pub fn down(&mut self, position: Vec2, at: Instant) {
        self.press = Some(Press {
            start: position,
            at,
            long_fired: false,
        });
    }

    /// Reports a long press once, as soon as the press has been held long enough.
    pub fn poll(&mut self, now: Instant) -> Option<PressOutcome> {
        let press = self.press.as_mut()?;
        if press.long_fired || now.saturating_duration_since(press.at) < LONG_PRESS_DURATION {
            return None;
        }
        press.long_fired = true;
        Some(PressOutcome::LongPress)
    }

    /// Ends the press. A drag, or a long press already reported by `poll`,
    /// yields nothing.
    pub fn up(&mut self, position: Vec2, at: Instant) -> Option<PressOutcome> {
        let long = self.poll(at);
        let press = self.press.take()?;
        if long.is_some() {
            return long;
        }
        if press.long_fired || press.start.distance(position) > MAX_DRAG_DISTANCE {
            return None;
        }
        Some(PressOutcome::Click)
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    pub fn cancel(&mut self) {
        self.press = None;
    }
}

/// The "all children loaded" hook, run once a widget's subtree exists.
pub fn init(rt: &mut Runtime, id: NodeId) {
    match rt.graph.kind(id) {
        Some(ElementKind::Button) => button::init(&mut rt.graph, id),
        Some(ElementKind::State) => state::init(rt, id),
        Some(ElementKind::Toggle) => toggle::init(rt, id),
        Some(ElementKind::Slider) => slider::init(&mut rt.graph, id),
        Some(ElementKind::Scroll) => scroll::init(&mut rt.graph, id),
        _ => {}
    }
}

/// Recomputes geometry that depends on the widget's own transform.
pub(crate) fn refresh_after_transform(graph: &mut SceneGraph, id: NodeId) {
    match graph.kind(id) {
        Some(ElementKind::Button) => button::update_hit_area(graph, id),
        Some(ElementKind::Scroll) => scroll::calculate(graph, id),
        _ => {}
    }
}

/// Binds a conventionally named part: direct child first, then any
/// descendant container.
pub(crate) fn find_part(graph: &SceneGraph, id: NodeId, name: &str) -> Option<NodeId> {
    graph.child_by_name(id, name).or_else(|| graph.get(id, name))
}
