use super::{ClickTracker, PointerEvent, PressOutcome};
use crate::element::{Element, ElementKind};
use crate::scene::SceneGraph;
use crate::types::{Bounds, NodeId};
use glam::Vec2;
use std::any::Any;
use std::fmt;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelMode {
    #[default]
    None,
    /// One `labelContainer` on the button itself, above every state.
    Single,
    /// Each of the four states carries its own `labelContainer`.
    Multi,
}

/// The four visual states and their label containers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ButtonState {
    pub node: Option<NodeId>,
    pub label: Option<NodeId>,
    pub label2: Option<NodeId>,
}

type Callback = Box<dyn FnMut()>;

#[derive(Default)]
pub struct Button {
    pub up: ButtonState,
    pub over: ButtonState,
    pub down: ButtonState,
    pub disabled: ButtonState,
    pub top_label: Option<NodeId>,
    pub top_label2: Option<NodeId>,
    label_mode: LabelMode,
    enabled: bool,
    hit_area: Option<Bounds>,
    tracker: ClickTracker,
    on_click: Option<Callback>,
    on_long_press: Option<Callback>,
}

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("up", &self.up)
            .field("over", &self.over)
            .field("down", &self.down)
            .field("disabled", &self.disabled)
            .field("label_mode", &self.label_mode)
            .field("enabled", &self.enabled)
            .field("hit_area", &self.hit_area)
            .finish()
    }
}

impl Button {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label_mode(&self) -> LabelMode {
        self.label_mode
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Local-space hit rectangle, the union of the visible children.
    pub fn hit_area(&self) -> Option<Bounds> {
        self.hit_area
    }

    pub fn set_callback(&mut self, callback: impl FnMut() + 'static) {
        self.on_click = Some(Box::new(callback));
    }

    pub fn remove_callback(&mut self) {
        self.on_click = None;
    }

    pub fn set_long_press_callback(&mut self, callback: impl FnMut() + 'static) {
        self.on_long_press = Some(Box::new(callback));
    }

    pub fn remove_long_press_callback(&mut self) {
        self.on_long_press = None;
    }

    fn state_nodes(&self) -> [Option<NodeId>; 4] {
        [self.over.node, self.down.node, self.up.node, self.disabled.node]
    }

    fn fire(&mut self, outcome: PressOutcome) {
        let callback = match outcome {
            PressOutcome::Click => self.on_click.as_mut(),
            PressOutcome::LongPress => self.on_long_press.as_mut(),
        };
        if let Some(cb) = callback {
            cb();
        }
    }
}

impl Element for Button {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn kind(&self) -> ElementKind {
        ElementKind::Button
    }
}

fn bind_state(graph: &SceneGraph, id: NodeId, name: &str) -> ButtonState {
    let node = graph.child_by_name(id, name);
    ButtonState {
        node,
        label: node.and_then(|n| graph.child_by_name(n, "labelContainer")),
        label2: node.and_then(|n| graph.child_by_name(n, "labelContainer2")),
    }
}

/// Binds states and labels, picks the label mode and enables the button.
pub fn init(graph: &mut SceneGraph, id: NodeId) {
    let up = bind_state(graph, id, "upState");
    let over = bind_state(graph, id, "overState");
    let down = bind_state(graph, id, "downState");
    let disabled = bind_state(graph, id, "disabledState");
    let top_label = graph.child_by_name(id, "labelContainer");
    let top_label2 = graph.child_by_name(id, "labelContainer2");

    let label_mode = if top_label.is_some() {
        LabelMode::Single
    } else if [up, over, down, disabled]
        .iter()
        .all(|s| s.node.is_some() && s.label.is_some())
    {
        LabelMode::Multi
    } else {
        LabelMode::None
    };

    let Some(button) = graph.element_mut::<Button>(id) else {
        return;
    };
    button.up = up;
    button.over = over;
    button.down = down;
    button.disabled = disabled;
    button.top_label = top_label;
    button.top_label2 = top_label2;
    button.label_mode = label_mode;
    enable(graph, id);
}

fn hide_all_states(graph: &mut SceneGraph, states: [Option<NodeId>; 4]) {
    for state in states.into_iter().flatten() {
        graph.set_visible(state, false);
    }
}

fn show(graph: &mut SceneGraph, node: NodeId) {
    graph.set_visible(node, true);
    graph.bring_to_top(node);
}

fn raise_top_labels(graph: &mut SceneGraph, labels: [Option<NodeId>; 2], alpha: f32) {
    for label in labels.into_iter().flatten() {
        graph.bring_to_top(label);
        graph.set_alpha(label, alpha);
    }
}

/// Shows `pick`'s state (when bound) and sets the top label alpha.
fn switch_to(graph: &mut SceneGraph, id: NodeId, pick: fn(&Button) -> Option<NodeId>, label_alpha: f32) {
    let Some(button) = graph.element::<Button>(id) else {
        return;
    };
    let target = pick(button);
    let states = button.state_nodes();
    let labels = [button.top_label, button.top_label2];
    if let Some(target) = target {
        hide_all_states(graph, states);
        show(graph, target);
    }
    raise_top_labels(graph, labels, label_alpha);
}

pub fn enable(graph: &mut SceneGraph, id: NodeId) {
    let Some(button) = graph.element_mut::<Button>(id) else {
        return;
    };
    button.enabled = true;
    button.tracker.cancel();
    let states = button.state_nodes();
    let up = button.up.node;
    let labels = if button.label_mode == LabelMode::Single {
        [button.top_label, button.top_label2]
    } else {
        [None, None]
    };

    hide_all_states(graph, states);
    if let Some(up) = up {
        show(graph, up);
    }
    raise_top_labels(graph, labels, 1.0);
    update_hit_area(graph, id);
}

pub fn disable(graph: &mut SceneGraph, id: NodeId) {
    let Some(button) = graph.element_mut::<Button>(id) else {
        return;
    };
    button.enabled = false;
    button.tracker.cancel();
    let states = button.state_nodes();
    let disabled = button.disabled.node;
    let labels = [button.top_label, button.top_label2];

    hide_all_states(graph, states);
    if let Some(disabled) = disabled {
        show(graph, disabled);
    }
    raise_top_labels(graph, labels, 0.5);
}

pub fn on_over(graph: &mut SceneGraph, id: NodeId) {
    switch_to(graph, id, |b| b.over.node, 1.0);
}

pub fn on_down(graph: &mut SceneGraph, id: NodeId) {
    switch_to(graph, id, |b| b.down.node, 0.5);
}

pub fn on_out(graph: &mut SceneGraph, id: NodeId) {
    switch_to(graph, id, |b| b.up.node, 1.0);
}

/// Feeds one pointer event to an enabled button. Returns the completed
/// press, after its callback ran.
pub fn handle_pointer(graph: &mut SceneGraph, id: NodeId, event: PointerEvent) -> Option<PressOutcome> {
    if !graph.element::<Button>(id)?.enabled {
        return None;
    }
    match event {
        PointerEvent::Over => {
            on_over(graph, id);
            None
        }
        PointerEvent::Out => {
            on_out(graph, id);
            None
        }
        PointerEvent::Down { position, at } => {
            on_down(graph, id);
            graph.element_mut::<Button>(id)?.tracker.down(position, at);
            None
        }
        PointerEvent::Up { position, at } => {
            on_out(graph, id);
            let button = graph.element_mut::<Button>(id)?;
            let outcome = button.tracker.up(position, at)?;
            button.fire(outcome);
            Some(outcome)
        }
    }
}

/// Fires the long-press callback once the press has been held long enough.
pub fn poll_long_press(graph: &mut SceneGraph, id: NodeId, now: Instant) -> bool {
    let Some(button) = graph.element_mut::<Button>(id) else {
        return false;
    };
    match button.tracker.poll(now) {
        Some(outcome) => {
            button.fire(outcome);
            true
        }
        None => false,
    }
}

fn set_labels(graph: &mut SceneGraph, id: NodeId, text: &str, second: bool) {
    let Some(button) = graph.element::<Button>(id) else {
        return;
    };
    let targets: Vec<NodeId> = match button.label_mode {
        LabelMode::Single => {
            let top = if second { button.top_label2 } else { button.top_label };
            top.into_iter().collect()
        }
        LabelMode::Multi => [button.over, button.disabled, button.down, button.up]
            .iter()
            .filter_map(|s| if second { s.label2 } else { s.label })
            .collect(),
        LabelMode::None => Vec::new(),
    };
    for label in targets {
        graph.set_visible(label, true);
        graph.set_text(label, text);
    }
}

pub fn set_label(graph: &mut SceneGraph, id: NodeId, text: &str) {
    set_labels(graph, id, text, false);
}

pub fn set_label2(graph: &mut SceneGraph, id: NodeId, text: &str) {
    set_labels(graph, id, text, true);
}

/// Rebuilds the hit area from the visible children, falling back to a unit
/// square when nothing is visible.
pub fn update_hit_area(graph: &mut SceneGraph, id: NodeId) {
    let area = graph
        .local_bounds(id)
        .unwrap_or(Bounds::from_xywh(0.0, 0.0, 1.0, 1.0));
    if let Some(button) = graph.element_mut::<Button>(id) {
        button.hit_area = Some(area);
    }
}

/// True when a global point falls inside the button's hit area.
pub fn hit_test(graph: &SceneGraph, id: NodeId, global: Vec2) -> bool {
    let Some(area) = graph.element::<Button>(id).and_then(|b| b.hit_area) else {
        return false;
    };
    area.contains(graph.to_local(id, global))
}
