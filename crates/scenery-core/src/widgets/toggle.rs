use super::{state, ClickTracker, PointerEvent, PressOutcome};
use crate::element::{Element, ElementKind};
use crate::runtime::Runtime;
use crate::types::NodeId;
use std::any::Any;
use std::fmt;

/// A two-state view flipped by clicks between `offState` and `onState`.
#[derive(Default)]
pub struct Toggle {
    pub current: Option<NodeId>,
    tracker: ClickTracker,
    on_change: Option<Box<dyn FnMut(bool)>>,
}

impl fmt::Debug for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toggle")
            .field("current", &self.current)
            .field("has_callback", &self.on_change.is_some())
            .finish()
    }
}

impl Toggle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_callback(&mut self, callback: impl FnMut(bool) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    pub fn remove_callback(&mut self) {
        self.on_change = None;
    }
}

impl Element for Toggle {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn kind(&self) -> ElementKind {
        ElementKind::Toggle
    }
}

pub fn init(rt: &mut Runtime, id: NodeId) {
    state::set_view_state(rt, id, "offState");
}

pub fn is_on(rt: &Runtime, id: NodeId) -> bool {
    state::current_state(&rt.graph, id).and_then(|c| rt.graph.name(c)) == Some("onState")
}

/// Flips the toggle and reports the new value to the callback.
pub fn toggle(rt: &mut Runtime, id: NodeId) -> bool {
    let next = if is_on(rt, id) { "offState" } else { "onState" };
    state::set_view_state(rt, id, next);
    let on = is_on(rt, id);
    if let Some(cb) = rt
        .graph
        .element_mut::<Toggle>(id)
        .and_then(|t| t.on_change.as_mut())
    {
        cb(on);
    }
    on
}

/// Flips on a completed click; long presses and drags are ignored.
pub fn handle_pointer(rt: &mut Runtime, id: NodeId, event: PointerEvent) -> Option<PressOutcome> {
    let tracker = &mut rt.graph.element_mut::<Toggle>(id)?.tracker;
    let outcome = match event {
        PointerEvent::Down { position, at } => {
            tracker.down(position, at);
            None
        }
        PointerEvent::Up { position, at } => tracker.up(position, at),
        PointerEvent::Over | PointerEvent::Out => None,
    };
    if outcome == Some(PressOutcome::Click) {
        toggle(rt, id);
    }
    outcome
}
