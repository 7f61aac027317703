//! # Scene Manager
//!
//! Owns one scene: its data file, textures, stage node and the set of nodes
//! that follow viewport changes.

use crate::errors::SceneError;
use crate::node::Container;
use crate::resolver::TemplateResolver;
use crate::runtime::Runtime;
use crate::systems::assets::AssetManager;
use crate::systems::attachments::AttachmentLoader;
use crate::types::{NodeId, Orientation, Viewport};
use crate::LoadOptions;
use scenery_data::model::{InstanceData, SceneData};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Nodes re-laid out on every resize, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ResizeMap {
    nodes: Vec<NodeId>,
}

impl ResizeMap {
    /// Registers `id` once; repeated inserts keep the first position.
    pub fn insert(&mut self, id: NodeId) {
        if !self.nodes.contains(&id) {
            self.nodes.push(id);
        }
    }

    pub fn remove(&mut self, id: NodeId) {
        self.nodes.retain(|&n| n != id);
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    fn retain(&mut self, keep: impl FnMut(&NodeId) -> bool) {
        self.nodes.retain(keep);
    }
}

#[derive(Debug)]
pub struct SceneManager {
    id: String,
    data: Option<SceneData>,
    stage: Option<NodeId>,
    orientation: Orientation,
    resize_map: ResizeMap,
    assets: AssetManager,
    attachments: AttachmentLoader,
}

impl SceneManager {
    pub fn new(id: &str, assets: AssetManager) -> Self {
        Self {
            id: id.to_string(),
            data: None,
            stage: None,
            orientation: Orientation::default(),
            resize_map: ResizeMap::default(),
            assets,
            attachments: AttachmentLoader::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fetches the scene file, its textures and bitmap fonts, then stores
    /// the data. Nothing is stored when any required file fails.
    #[instrument(level = "info", skip(self, options), fields(scene = %self.id))]
    pub fn load(&mut self, options: &LoadOptions) -> Result<(), SceneError> {
        let data: SceneData = self.assets.load_json(&options.placements)?;

        if options.atlas.unwrap_or(data.atlas) {
            self.assets
                .load_atlas(&options.atlas_descriptor, &options.atlas_image)?;
        } else {
            self.assets.use_individual_images();
        }
        for font in &data.fonts {
            self.assets.load_bitmap_font(font, &options.font_extension);
        }

        info!(
            "Loaded scene '{}': {} templates at {} fps",
            self.id,
            data.templates.len(),
            data.fps
        );
        self.init_scene(data);
        Ok(())
    }

    pub fn init_scene(&mut self, data: SceneData) {
        self.data = Some(data);
    }

    pub fn data(&self) -> Option<&SceneData> {
        self.data.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    pub fn assets(&self) -> &AssetManager {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut AssetManager {
        &mut self.assets
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn stage(&self) -> Option<NodeId> {
        self.stage
    }

    /// Spawns every stage child under a fresh stage node and lays the scene
    /// out for the current viewport.
    pub fn load_stage(&mut self, rt: &mut Runtime) -> Result<NodeId, SceneError> {
        let children: Vec<InstanceData> = self
            .data
            .as_ref()
            .ok_or_else(|| SceneError::NotLoaded(self.id.clone()))?
            .stage
            .iter()
            .flat_map(|stage| stage.children.iter())
            .filter_map(|child| child.instance().cloned())
            .collect();

        if let Some(old) = self.stage.take() {
            self.destroy_instance(rt, old);
        }
        let stage = rt.graph.add_named(Box::new(Container::new()), "stage");
        self.stage = Some(stage);
        self.orientation = rt.graph.viewport.orientation();

        for child in &children {
            let Some(id) = self.spawn(rt, &child.name) else {
                debug!("Stage child '{}' names no template", child.instance_name);
                continue;
            };
            rt.graph.add_child(stage, id);
            rt.graph.set_instance_data(id, child, self.orientation);
            self.add_to_resize_map(id);
        }

        let Viewport { width, height } = rt.graph.viewport;
        self.resize(rt, width, height);
        Ok(stage)
    }

    /// Fits the design resolution into `width` x `height` and re-applies
    /// every registered node's record for the new orientation.
    ///
    /// Nodes are visited parents first, so anchored children measure against
    /// an already updated parent.
    pub fn resize(&mut self, rt: &mut Runtime, width: f32, height: f32) {
        let Some(data) = self.data.as_ref() else {
            return;
        };
        rt.graph.viewport = Viewport::new(width, height);
        self.orientation = Orientation::from_size(width, height);

        let (mut base_w, mut base_h) = (data.resolution.x, data.resolution.y);
        if self.orientation == Orientation::Portrait {
            std::mem::swap(&mut base_w, &mut base_h);
        }
        if let Some(stage) = self.stage {
            if base_w > 0.0 && base_h > 0.0 {
                let scale = (width / base_w).min(height / base_h);
                rt.graph.set_scale_x(stage, scale);
                rt.graph.set_scale_y(stage, scale);
                rt.graph
                    .set_position(stage, (width - base_w * scale) / 2.0, (height - base_h * scale) / 2.0);
            }
        }

        let graph = &rt.graph;
        self.resize_map.retain(|&id| graph.contains(id));
        let mut order: Vec<(usize, NodeId)> = self
            .resize_map
            .nodes()
            .iter()
            .map(|&id| (depth_of(graph, id), id))
            .collect();
        order.sort_by_key(|&(depth, _)| depth);

        for (_, id) in order {
            rt.graph.resize(id, self.orientation);
        }
    }

    /// Builds a detached instance of `name` from this scene's templates.
    pub fn spawn(&mut self, rt: &mut Runtime, name: &str) -> Option<NodeId> {
        let data = self.data.as_ref()?;
        let mut resolver = TemplateResolver {
            data,
            assets: &self.assets,
            orientation: self.orientation,
            resize_map: &mut self.resize_map,
            attachments: &mut self.attachments,
        };
        resolver.spawn(rt, name)
    }

    pub fn add_to_resize_map(&mut self, id: NodeId) {
        self.resize_map.insert(id);
    }

    pub fn remove_from_resize_map(&mut self, id: NodeId) {
        self.resize_map.remove(id);
    }

    pub fn resize_map(&self) -> &ResizeMap {
        &self.resize_map
    }

    /// Every live node below the stage, depth-first in draw order.
    pub fn all_assets(&self, rt: &Runtime) -> Vec<NodeId> {
        self.stage
            .map(|stage| rt.graph.descendants(stage).into_iter().skip(1).collect())
            .unwrap_or_default()
    }

    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .data
            .iter()
            .flat_map(|d| d.templates.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.data
            .as_ref()
            .is_some_and(|d| d.templates.contains_key(name))
    }

    /// Detaches and frees an instance: its timelines stop and it leaves the
    /// resize map.
    pub fn destroy_instance(&mut self, rt: &mut Runtime, id: NodeId) {
        for node in rt.graph.descendants(id) {
            rt.scheduler.remove(node);
            self.resize_map.remove(node);
        }
        rt.graph.destroy_node(id);
    }

    /// Destroys the stage and everything on it.
    pub fn teardown(&mut self, rt: &mut Runtime) {
        if let Some(stage) = self.stage.take() {
            self.destroy_instance(rt, stage);
        }
        self.resize_map.clear();
    }

    /// Attaches finished particle and skeleton loads.
    pub fn poll_attachments(&mut self, rt: &mut Runtime) -> usize {
        self.attachments.poll(&mut rt.graph)
    }

    pub fn wait_attachments(&mut self, rt: &mut Runtime, timeout: Duration) -> usize {
        self.attachments.wait(&mut rt.graph, timeout)
    }

    pub fn pending_attachments(&self) -> usize {
        self.attachments.in_flight()
    }
}

fn depth_of(graph: &crate::scene::SceneGraph, id: NodeId) -> usize {
    let mut depth = 0;
    let mut current = graph.parent(id);
    while let Some(p) = current {
        depth += 1;
        current = graph.parent(p);
    }
    depth
}
