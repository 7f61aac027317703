use crate::runtime::Runtime;
use crate::scene_manager::SceneManager;
use crate::types::NodeId;

/// Scenes layered bottom to top. Spawning searches from the top, so an
/// overlay's templates shadow same-named templates below it.
#[derive(Debug, Default)]
pub struct SceneStack {
    scenes: Vec<SceneManager>,
}

impl SceneStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, scene: SceneManager) {
        self.scenes.push(scene);
    }

    pub fn pop(&mut self) -> Option<SceneManager> {
        self.scenes.pop()
    }

    pub fn peek(&self) -> Option<&SceneManager> {
        self.scenes.last()
    }

    pub fn peek_mut(&mut self) -> Option<&mut SceneManager> {
        self.scenes.last_mut()
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn clear(&mut self) {
        self.scenes.clear();
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut SceneManager> {
        self.scenes.iter_mut().find(|s| s.id() == id)
    }

    /// Bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &SceneManager> {
        self.scenes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SceneManager> {
        self.scenes.iter_mut()
    }

    /// Spawns from the topmost scene that defines `name`.
    pub fn spawn(&mut self, rt: &mut Runtime, name: &str) -> Option<NodeId> {
        self.scenes
            .iter_mut()
            .rev()
            .find_map(|scene| scene.spawn(rt, name))
    }

    /// Resizes every scene, not just the top one.
    pub fn resize(&mut self, rt: &mut Runtime, width: f32, height: f32) {
        for scene in self.scenes.iter_mut().rev() {
            scene.resize(rt, width, height);
        }
    }
}
