use crate::element::{Element, ElementKind};
use crate::runtime::Runtime;
use crate::scene::SceneGraph;
use crate::timeline;
use crate::types::NodeId;
use std::any::Any;

/// A container showing exactly one of its children at a time.
#[derive(Debug, Clone, Default)]
pub struct StateView {
    pub current: Option<NodeId>,
}

impl StateView {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Element for StateView {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn kind(&self) -> ElementKind {
        ElementKind::State
    }
}

pub fn init(rt: &mut Runtime, id: NodeId) {
    set_view_state(rt, id, "idle");
}

/// The "current state" slot of a state view or toggle.
fn current_slot(graph: &mut SceneGraph, id: NodeId) -> Option<&mut Option<NodeId>> {
    match graph.kind(id)? {
        ElementKind::State => graph.element_mut::<StateView>(id).map(|s| &mut s.current),
        ElementKind::Toggle => graph
            .element_mut::<super::Toggle>(id)
            .map(|t| &mut t.current),
        _ => None,
    }
}

/// Shows the state named `name`, falling back to `idle` and then to the
/// first child. Every other child is hidden and its timeline stopped; a
/// chosen timeline starts playing.
pub fn set_view_state(rt: &mut Runtime, id: NodeId, name: &str) -> Option<NodeId> {
    let chosen = rt
        .graph
        .get(id, name)
        .or_else(|| rt.graph.get(id, "idle"))
        .or_else(|| rt.graph.children(id).first().copied());

    for child in rt.graph.children(id).to_vec() {
        rt.graph.set_visible(child, false);
        timeline::stop(rt, child);
    }

    let chosen = chosen?;
    rt.graph.set_visible(chosen, true);
    if let Some(slot) = current_slot(&mut rt.graph, id) {
        *slot = Some(chosen);
    }
    rt.graph.bring_to_top(chosen);
    timeline::play(rt, chosen);
    Some(chosen)
}

pub fn has_state(graph: &SceneGraph, id: NodeId, name: &str) -> bool {
    graph.child_by_name(id, name).is_some()
}

pub fn current_state(graph: &SceneGraph, id: NodeId) -> Option<NodeId> {
    match graph.kind(id)? {
        ElementKind::State => graph.element::<StateView>(id)?.current,
        ElementKind::Toggle => graph.element::<super::Toggle>(id)?.current,
        _ => None,
    }
}

pub fn all_state_names(graph: &SceneGraph, id: NodeId) -> Vec<String> {
    graph
        .children(id)
        .iter()
        .filter_map(|&c| graph.name(c).map(str::to_string))
        .collect()
}
