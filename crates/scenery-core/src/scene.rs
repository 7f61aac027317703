use crate::element::{Element, ElementKind};
use crate::timeline::Timeline;
use crate::types::{Bounds, NodeId, Orientation, Placement, Transform, Viewport};
use glam::{Affine2, Vec2};
use scenery_data::model::{AnimTrackData, InstanceData, OrientationData};
use std::collections::VecDeque;
use tracing::warn;

/// Guards parent walks and bounds recursion against corrupted hierarchies.
const MAX_DEPTH: usize = 256;

/// A wrapper around an `Element` that adds hierarchy, naming and the
/// orientation-aware transform state.
#[derive(Debug)]
pub struct SceneNode {
    /// The payload (container, text, sprite, widget, ...).
    pub element: Box<dyn Element>,
    /// Instance name used by named lookups.
    pub name: String,
    /// Indices of child nodes, in draw order.
    pub children: Vec<NodeId>,
    /// Index of parent node.
    pub parent: Option<NodeId>,
    /// The live transform the host draws.
    pub transform: Transform,
    /// Portrait/landscape records, present once instance data was applied.
    pub placement: Option<Placement>,
    /// When false, orientation changes never touch the live transform.
    pub resizeable: bool,
    pub fit_to_screen: bool,
    /// Node whose shape clips this subtree.
    pub mask: Option<NodeId>,
}

impl SceneNode {
    /// Creates a new SceneNode wrapping the given Element.
    pub fn new(element: Box<dyn Element>) -> Self {
        Self {
            element,
            name: String::new(),
            children: Vec::new(),
            parent: None,
            transform: Transform::new(),
            placement: None,
            resizeable: true,
            fit_to_screen: false,
            mask: None,
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.element.kind()
    }
}

/// The Scene Graph data structure.
///
/// Manages the arena of nodes, their relationships and the viewport that
/// anchoring and fit-to-screen are computed against.
#[derive(Debug)]
pub struct SceneGraph {
    /// The Arena of all nodes. `None` marks a freed slot.
    pub nodes: Vec<Option<SceneNode>>,
    /// Indices of nodes that have been removed and can be reused.
    pub free_indices: Vec<usize>,
    pub viewport: Viewport,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free_indices: Vec::new(),
            viewport: Viewport::default(),
        }
    }

    /// Adds a new element to the scene graph and returns its ID.
    pub fn add_node(&mut self, element: Box<dyn Element>) -> NodeId {
        if let Some(id) = self.free_indices.pop() {
            self.nodes[id] = Some(SceneNode::new(element));
            id
        } else {
            let id = self.nodes.len();
            self.nodes.push(Some(SceneNode::new(element)));
            id
        }
    }

    pub fn add_named(&mut self, element: Box<dyn Element>, name: &str) -> NodeId {
        let id = self.add_node(element);
        self.set_name(id, name);
        id
    }

    /// Recursively destroys a node and its children, freeing their indices for reuse.
    pub fn destroy_node(&mut self, id: NodeId) {
        let (parent_id, children_ids) = match self.get_node(id) {
            Some(node) => (node.parent, node.children.clone()),
            None => return,
        };

        if let Some(pid) = parent_id {
            self.remove_child(pid, id);
        }

        for child_id in children_ids {
            self.destroy_node(child_id);
        }

        self.nodes[id] = None;
        self.free_indices.push(id);
    }

    /// Appends `child` to `parent`, detaching it from any previous parent.
    ///
    /// Refuses to create a cycle.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.is_ancestor(child, parent) {
            warn!("Refusing to parent node {} under its own descendant {}", child, parent);
            return;
        }
        if self.get_node(parent).is_none() {
            return;
        }
        if let Some(old) = self.get_node(child).and_then(|n| n.parent) {
            self.remove_child(old, child);
        }
        if let Some(c_node) = self.get_node_mut(child) {
            c_node.parent = Some(parent);
        } else {
            return;
        }
        if let Some(p_node) = self.get_node_mut(parent) {
            p_node.children.push(child);
        }
    }

    /// Removes a child from a parent node's children list and clears its parent link.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(p_node) = self.get_node_mut(parent) {
            if let Some(pos) = p_node.children.iter().position(|&x| x == child) {
                p_node.children.remove(pos);
            }
        }
        if let Some(c_node) = self.get_node_mut(child) {
            if c_node.parent == Some(parent) {
                c_node.parent = None;
            }
        }
    }

    /// Returns a mutable reference to the SceneNode.
    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id).and_then(|n| n.as_mut())
    }

    /// Returns a shared reference to the SceneNode.
    pub fn get_node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id).and_then(|n| n.as_ref())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get_node(id).is_some()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Downcasts the element of `id`.
    pub fn element<T: 'static>(&self, id: NodeId) -> Option<&T> {
        self.get_node(id)?.element.as_any().downcast_ref::<T>()
    }

    pub fn element_mut<T: 'static>(&mut self, id: NodeId) -> Option<&mut T> {
        self.get_node_mut(id)?.element.as_any_mut().downcast_mut::<T>()
    }

    pub fn kind(&self, id: NodeId) -> Option<ElementKind> {
        self.get_node(id).map(|n| n.kind())
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.get_node(id).map(|n| n.name.as_str())
    }

    pub fn set_name(&mut self, id: NodeId, name: &str) {
        if let Some(node) = self.get_node_mut(id) {
            node.name = name.to_string();
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get_node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// True when `ancestor` is `id` or one of its parents.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        let mut depth = 0;
        while let Some(cur) = current {
            if cur == ancestor {
                return true;
            }
            depth += 1;
            if depth > MAX_DEPTH {
                return false;
            }
            current = self.parent(cur);
        }
        false
    }

    /// `id` followed by all of its descendants, depth-first.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if !self.contains(cur) {
                continue;
            }
            out.push(cur);
            stack.extend(self.children(cur).iter().rev());
        }
        out
    }

    // --- Named lookup ---

    /// Direct child by name, any element kind.
    pub fn child_by_name(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.name(c) == Some(name))
    }

    /// Breadth-first search over descendant containers. First match wins.
    pub fn get(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let mut found = None;
        self.walk_containers(id, |c, n| {
            if n == name {
                found = Some(c);
                return false;
            }
            true
        });
        found
    }

    /// Every descendant container named `name`, in breadth-first order.
    pub fn get_all(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.walk_containers(id, |c, n| {
            if n == name {
                found.push(c);
            }
            true
        });
        found
    }

    fn walk_containers(&self, id: NodeId, mut visit: impl FnMut(NodeId, &str) -> bool) {
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        let push_children = |queue: &mut VecDeque<NodeId>, of: NodeId| {
            for &c in self.children(of) {
                if self.kind(c).is_some_and(|k| k.is_container()) {
                    queue.push_back(c);
                }
            }
        };
        push_children(&mut queue, id);
        while let Some(current) = queue.pop_front() {
            let name = self.name(current).unwrap_or_default();
            if !visit(current, name) {
                return;
            }
            push_children(&mut queue, current);
        }
    }

    /// Moves `id` to the end of its parent's children so it draws on top.
    pub fn bring_to_top(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(p_node) = self.get_node_mut(parent) {
            if let Some(pos) = p_node.children.iter().position(|&x| x == id) {
                let child = p_node.children.remove(pos);
                p_node.children.push(child);
            }
        }
    }

    pub fn set_mask(&mut self, id: NodeId, mask: Option<NodeId>) {
        if let Some(node) = self.get_node_mut(id) {
            node.mask = mask;
        }
    }

    // --- Transform accessors ---

    pub fn transform(&self, id: NodeId) -> Option<&Transform> {
        self.get_node(id).map(|n| &n.transform)
    }

    fn read(&self, id: NodeId, f: impl FnOnce(&Transform) -> f32) -> f32 {
        self.transform(id).map(f).unwrap_or_default()
    }

    /// Sets a live field and mirrors it into the current orientation record.
    fn write_through(
        &mut self,
        id: NodeId,
        apply: impl FnOnce(&mut Transform),
        mirror: impl FnOnce(&mut OrientationData),
    ) {
        if let Some(node) = self.get_node_mut(id) {
            apply(&mut node.transform);
            if let Some(placement) = node.placement.as_mut() {
                mirror(placement.current_mut());
            }
        }
    }

    pub fn x(&self, id: NodeId) -> f32 {
        self.read(id, |t| t.x)
    }

    pub fn y(&self, id: NodeId) -> f32 {
        self.read(id, |t| t.y)
    }

    pub fn rotation(&self, id: NodeId) -> f32 {
        self.read(id, |t| t.rotation)
    }

    pub fn scale_x(&self, id: NodeId) -> f32 {
        self.read(id, |t| t.scale_x)
    }

    pub fn scale_y(&self, id: NodeId) -> f32 {
        self.read(id, |t| t.scale_y)
    }

    pub fn pivot_x(&self, id: NodeId) -> f32 {
        self.read(id, |t| t.pivot_x)
    }

    pub fn pivot_y(&self, id: NodeId) -> f32 {
        self.read(id, |t| t.pivot_y)
    }

    pub fn alpha(&self, id: NodeId) -> f32 {
        self.read(id, |t| t.alpha)
    }

    pub fn visible(&self, id: NodeId) -> bool {
        self.transform(id).is_some_and(|t| t.visible)
    }

    pub fn set_x(&mut self, id: NodeId, value: f32) {
        self.write_through(id, |t| t.x = value, |o| o.x = value);
    }

    pub fn set_y(&mut self, id: NodeId, value: f32) {
        self.write_through(id, |t| t.y = value, |o| o.y = value);
    }

    pub fn set_position(&mut self, id: NodeId, x: f32, y: f32) {
        self.set_x(id, x);
        self.set_y(id, y);
    }

    pub fn set_rotation(&mut self, id: NodeId, value: f32) {
        self.write_through(id, |t| t.rotation = value, |o| o.rotation = value);
    }

    pub fn set_scale_x(&mut self, id: NodeId, value: f32) {
        self.write_through(id, |t| t.scale_x = value, |o| o.scale_x = value);
    }

    pub fn set_scale_y(&mut self, id: NodeId, value: f32) {
        self.write_through(id, |t| t.scale_y = value, |o| o.scale_y = value);
    }

    pub fn set_pivot_x(&mut self, id: NodeId, value: f32) {
        self.write_through(id, |t| t.pivot_x = value, |o| o.pivot_x = value);
    }

    pub fn set_pivot_y(&mut self, id: NodeId, value: f32) {
        self.write_through(id, |t| t.pivot_y = value, |o| o.pivot_y = value);
    }

    /// Live only; orientation records keep their authored alpha.
    pub fn set_alpha(&mut self, id: NodeId, value: f32) {
        if let Some(node) = self.get_node_mut(id) {
            node.transform.alpha = value;
        }
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.get_node_mut(id) {
            node.transform.visible = visible;
        }
    }

    /// Scaled width in parent space.
    pub fn width(&self, id: NodeId) -> f32 {
        self.local_bounds(id)
            .map(|b| b.width * self.scale_x(id).abs())
            .unwrap_or_default()
    }

    pub fn height(&self, id: NodeId) -> f32 {
        self.local_bounds(id)
            .map(|b| b.height * self.scale_y(id).abs())
            .unwrap_or_default()
    }

    /// Scales the node so its parent-space width becomes `value`.
    ///
    /// The resulting scale is what gets mirrored into the orientation record.
    pub fn set_width(&mut self, id: NodeId, value: f32) {
        let local = self.local_bounds(id).map(|b| b.width).unwrap_or_default();
        let sign = if self.scale_x(id) < 0.0 { -1.0 } else { 1.0 };
        let scale = if local != 0.0 { value / local * sign } else { 1.0 };
        self.set_scale_x(id, scale);
    }

    pub fn set_height(&mut self, id: NodeId, value: f32) {
        let local = self.local_bounds(id).map(|b| b.height).unwrap_or_default();
        let sign = if self.scale_y(id) < 0.0 { -1.0 } else { 1.0 };
        let scale = if local != 0.0 { value / local * sign } else { 1.0 };
        self.set_scale_y(id, scale);
    }

    // --- Spatial math ---

    pub fn local_matrix(&self, id: NodeId) -> Affine2 {
        self.transform(id)
            .map(|t| t.local_matrix())
            .unwrap_or(Affine2::IDENTITY)
    }

    /// Node-to-global matrix, composed from the root down.
    pub fn world_transform(&self, id: NodeId) -> Affine2 {
        let mut matrix = Affine2::IDENTITY;
        let mut current = Some(id);
        let mut depth = 0;
        while let Some(cur) = current {
            matrix = self.local_matrix(cur) * matrix;
            depth += 1;
            if depth > MAX_DEPTH {
                warn!("Parent chain of node {} exceeds {} levels", id, MAX_DEPTH);
                break;
            }
            current = self.parent(cur);
        }
        matrix
    }

    /// Converts a global point into `id`'s local space.
    pub fn to_local(&self, id: NodeId, global: Vec2) -> Vec2 {
        self.world_transform(id).inverse().transform_point2(global)
    }

    pub fn to_global(&self, id: NodeId, local: Vec2) -> Vec2 {
        self.world_transform(id).transform_point2(local)
    }

    /// Bounds of the node's content and visible children in its own space.
    ///
    /// Masks and hidden children do not count.
    pub fn local_bounds(&self, id: NodeId) -> Option<Bounds> {
        self.subtree_bounds(id, 0)
    }

    fn subtree_bounds(&self, id: NodeId, depth: usize) -> Option<Bounds> {
        if depth > MAX_DEPTH {
            return None;
        }
        let node = self.get_node(id)?;
        let mut bounds = node.element.content_bounds();
        for &child in &node.children {
            let Some(c) = self.get_node(child) else {
                continue;
            };
            if !c.transform.visible || c.kind() == ElementKind::Mask {
                continue;
            }
            if let Some(cb) = self.subtree_bounds(child, depth + 1) {
                let cb = cb.transformed(&c.transform.local_matrix());
                bounds = Some(match bounds {
                    Some(b) => b.union(&cb),
                    None => cb,
                });
            }
        }
        bounds
    }

    /// Global axis-aligned bounds.
    pub fn bounds(&self, id: NodeId) -> Option<Bounds> {
        self.local_bounds(id)
            .map(|b| b.transformed(&self.world_transform(id)))
    }

    // --- Orientation model ---

    pub fn placement(&self, id: NodeId) -> Option<&Placement> {
        self.get_node(id).and_then(|n| n.placement.as_ref())
    }

    pub fn placement_mut(&mut self, id: NodeId) -> Option<&mut Placement> {
        self.get_node_mut(id).and_then(|n| n.placement.as_mut())
    }

    /// Stores both orientation records, selects the current one, applies it,
    /// names the node and honours `attrs.fitToScreen`.
    pub fn set_instance_data(&mut self, id: NodeId, data: &InstanceData, orientation: Orientation) {
        let Some(node) = self.get_node_mut(id) else {
            return;
        };
        node.placement = Some(Placement::new(
            data.portrait.clone(),
            data.landscape.clone(),
            orientation,
        ));
        self.apply_transform(id);
        self.set_name(id, &data.instance_name);

        if let Some(fit) = data.attrs.as_ref().and_then(|a| a.fit_to_screen) {
            self.set_fit_to_screen(id, fit);
        }
    }

    pub fn set_fit_to_screen(&mut self, id: NodeId, value: bool) {
        if let Some(node) = self.get_node_mut(id) {
            node.fit_to_screen = value;
        }
        if value {
            self.execute_fit_to_screen(id);
            crate::widgets::refresh_after_transform(self, id);
        } else {
            self.apply_transform(id);
        }
    }

    pub fn set_resizeable(&mut self, id: NodeId, value: bool) {
        if let Some(node) = self.get_node_mut(id) {
            node.resizeable = value;
        }
    }

    pub fn is_anchored(&self, id: NodeId) -> bool {
        self.placement(id).is_some_and(|p| p.current().is_anchored)
    }

    /// Copies the current orientation record onto the live transform.
    pub fn apply_transform(&mut self, id: NodeId) {
        let Some(node) = self.get_node(id) else {
            return;
        };
        if node.fit_to_screen {
            self.execute_fit_to_screen(id);
            crate::widgets::refresh_after_transform(self, id);
            return;
        }
        let Some(placement) = &node.placement else {
            return;
        };
        if !node.resizeable {
            return;
        }
        // Children of a timeline that has left frame 0 belong to the keyframes.
        if let Some(parent) = node.parent {
            if self
                .element::<Timeline>(parent)
                .is_some_and(|t| t.current_frame > 0)
            {
                return;
            }
        }

        let current = placement.current().clone();
        if let Some(node) = self.get_node_mut(id) {
            let t = &mut node.transform;
            t.x = current.x;
            t.y = current.y;
            t.rotation = current.rotation;
            t.alpha = current.alpha;
            t.scale_x = current.scale_x;
            t.scale_y = current.scale_y;
            t.pivot_x = current.pivot_x;
            t.pivot_y = current.pivot_y;
        }
        self.apply_anchor(id);
        crate::widgets::refresh_after_transform(self, id);
    }

    /// Moves an anchored node onto its viewport fraction, in parent space.
    pub fn apply_anchor(&mut self, id: NodeId) {
        let Some(node) = self.get_node(id) else {
            return;
        };
        let (Some(parent), Some(placement)) = (node.parent, node.placement.as_ref()) else {
            return;
        };
        let current = placement.current();
        if !current.is_anchored {
            return;
        }
        let pct = current.anchor_percentage.unwrap_or_default();
        let global = self.viewport.point_at(pct.x, pct.y);
        let local = self.to_local(parent, global);
        self.set_position(id, local.x, local.y);
    }

    /// Stretches the node across the viewport along its tighter axis,
    /// keeping aspect, and centres it. Assumes a top-left pivot.
    pub fn execute_fit_to_screen(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let vp = self.viewport;
        self.set_pivot_x(id, 0.0);
        self.set_pivot_y(id, 0.0);
        let pos = self.to_local(parent, Vec2::ZERO);
        self.set_position(id, pos.x, pos.y);

        let far = self.to_local(parent, Vec2::new(vp.width, vp.height));
        if vp.width > vp.height {
            self.set_width(id, far.x - pos.x);
            self.set_scale_y(id, self.scale_x(id));
        } else {
            self.set_height(id, far.y - pos.y);
            self.set_scale_x(id, self.scale_y(id));
        }

        let mid = self.to_local(parent, Vec2::new(vp.width / 2.0, vp.height / 2.0));
        let (w, h) = (self.width(id), self.height(id));
        self.set_position(id, mid.x - w / 2.0, mid.y - h / 2.0);
    }

    /// Selects the record for `orientation` and re-applies it. Nine-slices
    /// refresh their panel size instead.
    pub fn resize(&mut self, id: NodeId, orientation: Orientation) {
        if let Some(slice) = self.element_mut::<crate::node::NineSlice>(id) {
            slice.resize(orientation);
            return;
        }
        if let Some(placement) = self.placement_mut(id) {
            placement.orientation = orientation;
        }
        self.apply_transform(id);
    }

    /// Applies the fields present on a keyframe. Absent fields are untouched.
    ///
    /// Position and rotation go through the write-through setters; pivot,
    /// scale and alpha only touch the live transform.
    pub fn apply_keyframe(&mut self, id: NodeId, frame: &AnimTrackData) {
        let Some(node) = self.get_node_mut(id) else {
            return;
        };
        let t = &mut node.transform;
        if let Some(v) = frame.pivot_x {
            t.pivot_x = v;
        }
        if let Some(v) = frame.pivot_y {
            t.pivot_y = v;
        }
        if let Some(v) = frame.scale_x {
            t.scale_x = v;
        }
        if let Some(v) = frame.scale_y {
            t.scale_y = v;
        }
        if let Some(v) = frame.alpha {
            t.alpha = v;
        }
        if let Some(v) = frame.x {
            self.set_x(id, v);
        }
        if let Some(v) = frame.y {
            self.set_y(id, v);
        }
        if let Some(v) = frame.rotation {
            self.set_rotation(id, v);
        }
    }

    // --- Text ---

    /// Sets the text of `id` itself, or of its `label` child, or of its first
    /// text child. Returns false when nothing could take the text.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> bool {
        let Some(target) = self.text_field(id) else {
            return false;
        };
        self.get_node_mut(target)
            .is_some_and(|n| n.element.set_text(text))
    }

    /// The node that displays text for `id`.
    pub fn text_field(&self, id: NodeId) -> Option<NodeId> {
        if self.kind(id)?.is_text() {
            return Some(id);
        }
        if let Some(label) = self.child_by_name(id, "label") {
            if self.kind(label).is_some_and(|k| k.is_text()) {
                return Some(label);
            }
        }
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.kind(c).is_some_and(|k| k.is_text()))
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        let target = self.text_field(id)?;
        self.get_node(target)?.element.text()
    }
}
