use crate::cue::{CueEvent, ListenerId};
use crate::errors::SceneError;
use crate::pool::ObjectPool;
use crate::runtime::Runtime;
use crate::scene::SceneGraph;
use crate::scene_manager::SceneManager;
use crate::stack::SceneStack;
use crate::systems::assets::AssetManager;
use crate::systems::display_list::{self, DrawCommand};
use crate::timeline;
use crate::types::{NodeId, Viewport};
use crate::{AssetLoader, LoadOptions};
use scenery_data::model::SceneData;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument};

/// The entry point: owns the runtime services, the scene stack and the
/// object pool.
pub struct Director {
    /// Display tree, update scheduler and cue dispatcher.
    pub runtime: Runtime,
    /// Loaded scenes, bottom to top.
    pub scenes: SceneStack,
    pub pool: ObjectPool,
    loader: Arc<dyn AssetLoader>,
}

impl std::fmt::Debug for Director {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Director")
            .field("runtime", &self.runtime)
            .field("scenes", &self.scenes)
            .field("pool", &self.pool)
            .finish()
    }
}

impl Director {
    /// Creates a director for a `width` x `height` viewport.
    ///
    /// The frame rate starts at the scene default and follows the `fps` of
    /// each loaded scene.
    pub fn new(loader: Arc<dyn AssetLoader>, width: f32, height: f32) -> Self {
        let mut runtime = Runtime::new(scenery_data::model::DEFAULT_FPS);
        runtime.graph.viewport = Viewport::new(width, height);
        Self {
            runtime,
            scenes: SceneStack::new(),
            pool: ObjectPool::new(),
            loader,
        }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.runtime.graph
    }

    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.runtime.graph
    }

    pub fn loader(&self) -> Arc<dyn AssetLoader> {
        self.loader.clone()
    }

    /// Loads the scene under `base_path` and pushes it on top of the stack.
    #[instrument(level = "info", skip(self, options))]
    pub fn load_scene(&mut self, id: &str, base_path: &str, options: &LoadOptions) -> Result<(), SceneError> {
        let mut scene = SceneManager::new(id, AssetManager::new(self.loader.clone(), base_path));
        scene.load(options)?;
        self.push_scene(scene);
        Ok(())
    }

    /// Pushes a scene from already parsed data. Textures resolve as
    /// individual images under `base_path`.
    pub fn load_scene_data(&mut self, id: &str, base_path: &str, data: SceneData) {
        let mut assets = AssetManager::new(self.loader.clone(), base_path);
        assets.use_individual_images();
        let mut scene = SceneManager::new(id, assets);
        scene.init_scene(data);
        self.push_scene(scene);
    }

    fn push_scene(&mut self, scene: SceneManager) {
        if let Some(data) = scene.data() {
            self.runtime.scheduler.set_fps(data.fps);
        }
        info!("Scene '{}' pushed ({} on stack)", scene.id(), self.scenes.len() + 1);
        self.scenes.push(scene);
    }

    /// Removes the top scene and destroys its stage.
    pub fn pop_scene(&mut self) -> Option<SceneManager> {
        let mut scene = self.scenes.pop()?;
        scene.teardown(&mut self.runtime);
        Some(scene)
    }

    /// Builds the stage of the top scene.
    pub fn load_stage(&mut self) -> Result<NodeId, SceneError> {
        let scene = self
            .scenes
            .peek_mut()
            .ok_or_else(|| SceneError::NotLoaded("<empty stack>".to_string()))?;
        scene.load_stage(&mut self.runtime)
    }

    /// Spawns `name` from the topmost scene defining it.
    pub fn spawn(&mut self, name: &str) -> Option<NodeId> {
        self.scenes.spawn(&mut self.runtime, name)
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.runtime.graph.viewport = Viewport::new(width, height);
        self.scenes.resize(&mut self.runtime, width, height);
    }

    /// Attaches finished background loads, then steps if a frame is due.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.poll_attachments();
        self.runtime.tick(now)
    }

    /// Advances every playing timeline by one frame.
    pub fn step(&mut self) {
        self.runtime.step();
    }

    pub fn poll_attachments(&mut self) -> usize {
        let rt = &mut self.runtime;
        self.scenes.iter_mut().map(|s| s.poll_attachments(rt)).sum()
    }

    /// Blocks until every scene's background loads are attached or
    /// `timeout` elapses for a scene.
    pub fn wait_attachments(&mut self, timeout: Duration) -> usize {
        let rt = &mut self.runtime;
        self.scenes.iter_mut().map(|s| s.wait_attachments(rt, timeout)).sum()
    }

    pub fn display_list(&self, root: NodeId) -> Result<Vec<DrawCommand>, SceneError> {
        display_list::collect(&self.runtime.graph, root)
    }

    pub fn play(&mut self, id: NodeId) {
        timeline::play(&mut self.runtime, id);
    }

    pub fn stop(&mut self, id: NodeId) {
        timeline::stop(&mut self.runtime, id);
    }

    pub fn goto_and_play(&mut self, id: NodeId, frame: usize) {
        timeline::goto_and_play(&mut self.runtime, id, frame);
    }

    pub fn goto_and_stop(&mut self, id: NodeId, frame: usize) {
        timeline::goto_and_stop(&mut self.runtime.graph, id, frame);
    }

    pub fn is_playing(&self, id: NodeId) -> bool {
        timeline::is_playing(&self.runtime, id)
    }

    /// Listens for cue `name` on every timeline. The callback gets the
    /// runtime and may stop or move the timeline named in the event.
    pub fn add_cue_listener(
        &mut self,
        name: &str,
        callback: impl FnMut(&CueEvent, &mut Runtime) + 'static,
    ) -> ListenerId {
        self.runtime.cues.add_listener(name, callback)
    }

    pub fn remove_cue_listener(&mut self, name: &str, id: ListenerId) -> bool {
        self.runtime.cues.remove_listener(name, id)
    }

    /// Fills the pool for `kind` with `count` instances of `template`.
    pub fn init_pool(&mut self, count: usize, template: &str, kind: &str) -> usize {
        self.pool.init(&mut self.scenes, &mut self.runtime, count, template, kind)
    }

    pub fn pool_get(&mut self, kind: &str) -> Result<NodeId, SceneError> {
        self.pool.get(kind)
    }

    pub fn pool_put_back(&mut self, id: NodeId, kind: &str) -> Result<(), SceneError> {
        self.pool.put_back(id, kind)
    }
}
