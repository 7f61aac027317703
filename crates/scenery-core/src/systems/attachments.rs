//! Background loading of particle emitters and skeleton rigs.
//!
//! Resolution never waits on these: the resolver files a request, a worker
//! thread reads and parses the files, and the finished element is attached
//! to its parent the next time the owner polls.

use crate::errors::SceneError;
use crate::node::{texture_key, ParticleEmitter, SkeletonRig};
use crate::scene::SceneGraph;
use crate::systems::assets::AssetManager;
use crate::types::NodeId;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use scenery_data::model::{ParticleData, SpineData};
use scenery_data::particle::{is_legacy_emitter_config, EmitterConfig};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// A finished element waiting to be attached.
#[derive(Debug)]
pub enum Attachment {
    Particles(ParticleEmitter),
    Skeleton(SkeletonRig),
}

/// Sent back by a loader thread.
#[derive(Debug)]
pub struct AttachmentResponse {
    pub parent: NodeId,
    pub name: String,
    pub result: Result<Attachment, SceneError>,
}

/// Turns a raw emitter config into a playing emitter.
///
/// Configs in the retired schema are refused; the caller abandons that one
/// emitter.
pub fn build_emitter(
    assets: &AssetManager,
    data: &ParticleData,
    config: serde_json::Value,
) -> Result<ParticleEmitter, SceneError> {
    if is_legacy_emitter_config(&config) {
        warn!(
            "Particle '{}' uses the legacy emitter schema. Convert it to 'behaviors' before loading.",
            data.name
        );
        return Err(SceneError::LegacyParticleConfig(data.name.clone()));
    }
    let mut config: EmitterConfig = serde_json::from_value(config)?;

    let texture = data.png_paths.first().and_then(|png| {
        let file = png.rsplit('/').next().unwrap_or(png);
        let key = texture_key(file, ".png");
        let texture = assets.texture(key);
        if texture.is_none() {
            warn!("Particle texture '{}' not found", key);
        }
        texture
    });
    if let (Some(texture), Some(behavior)) = (&texture, config.texture_behavior_mut()) {
        if let Some(obj) = behavior.config.as_object_mut() {
            obj.insert("texture".to_string(), serde_json::Value::String(texture.key.clone()));
        }
    }

    let mut emitter = ParticleEmitter::new(config, texture);
    emitter.play();
    Ok(emitter)
}

fn load_particles(assets: &AssetManager, data: &ParticleData) -> Result<Attachment, SceneError> {
    let config: serde_json::Value = match (&data.emitter_config, &data.json_path) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => assets.load_json(path)?,
        (None, None) => {
            return Err(SceneError::AssetNotFound(format!(
                "particle '{}' has neither emitterConfig nor jsonPath",
                data.name
            )))
        }
    };
    build_emitter(assets, data, config).map(Attachment::Particles)
}

fn load_skeleton(assets: &AssetManager, data: &SpineData) -> Result<Attachment, SceneError> {
    let skeleton: serde_json::Value = assets.load_json(&data.spine_json)?;
    let atlas = String::from_utf8_lossy(&assets.load_bytes(&data.spine_atlas)?).into_owned();

    let mut rig = SkeletonRig::from_skeleton_json(
        &data.spine_json,
        &data.spine_atlas,
        &skeleton,
        &data.animations,
    );
    // Atlas pages are the bare image file lines.
    rig.pages = atlas
        .lines()
        .map(str::trim)
        .filter(|l| l.ends_with(".png") && !l.contains(':'))
        .map(str::to_string)
        .collect();
    rig.skin = data.skin.clone();
    if let Some(first) = rig.animations.first().cloned() {
        rig.set_animation(&first, true);
    }
    Ok(Attachment::Skeleton(rig))
}

/// Owns the worker channel and counts requests still in flight.
#[derive(Debug)]
pub struct AttachmentLoader {
    tx: Sender<AttachmentResponse>,
    rx: Receiver<AttachmentResponse>,
    in_flight: usize,
}

impl Default for AttachmentLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AttachmentLoader {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx, in_flight: 0 }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    fn spawn_load(
        &mut self,
        parent: NodeId,
        name: String,
        load: impl FnOnce() -> Result<Attachment, SceneError> + Send + 'static,
    ) {
        let tx = self.tx.clone();
        self.in_flight += 1;
        thread::spawn(move || {
            let result = load();
            // The receiver is gone when the scene was torn down first.
            let _ = tx.send(AttachmentResponse { parent, name, result });
        });
    }

    pub fn request_particles(&mut self, assets: &AssetManager, parent: NodeId, data: &ParticleData) {
        debug!("Loading particle '{}' for node {}", data.name, parent);
        let assets = assets.clone();
        let data = data.clone();
        self.spawn_load(parent, data.name.clone(), move || load_particles(&assets, &data));
    }

    pub fn request_skeleton(&mut self, assets: &AssetManager, parent: NodeId, data: &SpineData) {
        debug!("Loading skeleton '{}' for node {}", data.name, parent);
        let assets = assets.clone();
        let data = data.clone();
        self.spawn_load(parent, data.name.clone(), move || load_skeleton(&assets, &data));
    }

    /// Attaches every finished load without blocking. Returns how many
    /// elements were attached.
    pub fn poll(&mut self, graph: &mut SceneGraph) -> usize {
        let mut attached = 0;
        while let Ok(response) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            if attach(graph, response) {
                attached += 1;
            }
        }
        attached
    }

    /// Blocks until every in-flight load has finished or `timeout` elapses.
    pub fn wait(&mut self, graph: &mut SceneGraph, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut attached = 0;
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(response) => {
                    self.in_flight -= 1;
                    if attach(graph, response) {
                        attached += 1;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    warn!("{} attachment loads still pending after {:?}", self.in_flight, timeout);
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        attached
    }
}

/// Adds a loaded element under its parent. Failed loads are logged and
/// dropped; so are loads whose parent was destroyed meanwhile.
pub fn attach(graph: &mut SceneGraph, response: AttachmentResponse) -> bool {
    let AttachmentResponse { parent, name, result } = response;
    let element: Box<dyn crate::element::Element> = match result {
        Ok(Attachment::Particles(emitter)) => Box::new(emitter),
        Ok(Attachment::Skeleton(rig)) => Box::new(rig),
        Err(e) => {
            error!("Abandoning '{}': {}", name, e);
            return false;
        }
    };
    if !graph.contains(parent) {
        debug!("Parent {} of '{}' is gone, dropping it", parent, name);
        return false;
    }
    let id = graph.add_named(element, &name);
    graph.add_child(parent, id);
    true
}

/// Starts every emitter below `id`.
pub fn play_particles(graph: &mut SceneGraph, id: NodeId) {
    set_emitting(graph, id, true);
}

pub fn stop_particles(graph: &mut SceneGraph, id: NodeId) {
    set_emitting(graph, id, false);
}

fn set_emitting(graph: &mut SceneGraph, id: NodeId, emitting: bool) {
    for node in graph.descendants(id) {
        if let Some(emitter) = graph.element_mut::<ParticleEmitter>(node) {
            if emitting {
                emitter.play();
            } else {
                emitter.stop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Container;
    use crate::MemoryAssetLoader;
    use serde_json::json;
    use std::sync::Arc;

    fn particle(name: &str, json_path: Option<&str>, inline: Option<serde_json::Value>) -> ParticleData {
        ParticleData {
            name: name.to_string(),
            json_path: json_path.map(str::to_string),
            png_paths: vec!["fx/spark.png".to_string()],
            emitter_config: inline,
        }
    }

    fn assets(loader: MemoryAssetLoader) -> AssetManager {
        let mut assets = AssetManager::new(Arc::new(loader), "scene");
        assets.use_individual_images();
        assets
    }

    #[test]
    fn test_legacy_config_is_refused() {
        let assets = assets(MemoryAssetLoader::new());
        let data = particle("sparks", None, None);
        let result = build_emitter(&assets, &data, json!({ "alpha": { "start": 1 }, "speed": 10 }));
        assert!(matches!(result, Err(SceneError::LegacyParticleConfig(name)) if name == "sparks"));
    }

    #[test]
    fn test_emitter_gets_texture_and_plays() {
        let assets = assets(MemoryAssetLoader::new());
        let data = particle("sparks", None, None);
        let config = json!({
            "lifetime": { "min": 0.1, "max": 0.5 },
            "behaviors": [{ "type": "textureSingle", "config": {} }]
        });
        let emitter = build_emitter(&assets, &data, config).unwrap();
        assert!(emitter.emitting);
        assert_eq!(emitter.texture.as_ref().unwrap().key, "spark");
        assert_eq!(emitter.config.behaviors[0].config["texture"], "spark");
    }

    #[test]
    fn test_background_load_attaches_on_wait() {
        let mut loader = MemoryAssetLoader::new();
        loader.insert(
            "scene/fx/sparks.json",
            br#"{ "behaviors": [{ "type": "textureSingle", "config": {} }] }"#.to_vec(),
        );
        let assets = assets(loader);
        let mut graph = SceneGraph::new();
        let parent = graph.add_named(Box::new(Container::new()), "holder");

        let mut queue = AttachmentLoader::new();
        queue.request_particles(&assets, parent, &particle("sparks", Some("fx/sparks.json"), None));
        queue.request_particles(&assets, parent, &particle("broken", Some("fx/missing.json"), None));
        assert_eq!(queue.in_flight(), 2);

        let attached = queue.wait(&mut graph, Duration::from_secs(5));
        assert_eq!(attached, 1);
        assert_eq!(queue.in_flight(), 0);
        let sparks = graph.child_by_name(parent, "sparks").unwrap();
        assert!(graph.element::<ParticleEmitter>(sparks).is_some());

        stop_particles(&mut graph, parent);
        assert!(!graph.element::<ParticleEmitter>(sparks).unwrap().emitting);
    }

    #[test]
    fn test_skeleton_reads_pages_and_animations() {
        let mut loader = MemoryAssetLoader::new();
        loader.insert(
            "scene/hero.json",
            br#"{ "bones": [{}, {}], "animations": { "walk": {}, "idle": {} } }"#.to_vec(),
        );
        loader.insert("scene/hero.atlas", b"hero.png\nsize: 512,512\nformat: RGBA8888\n".to_vec());
        let assets = assets(loader);
        let data = SpineData {
            name: "hero".to_string(),
            spine_json: "hero.json".to_string(),
            spine_atlas: "hero.atlas".to_string(),
            png_files: vec!["hero.png".to_string()],
            animations: Vec::new(),
            skin: Some("default".to_string()),
        };
        let Attachment::Skeleton(rig) = load_skeleton(&assets, &data).unwrap() else {
            panic!("expected a skeleton");
        };
        assert_eq!(rig.bone_count, 2);
        assert_eq!(rig.pages, vec!["hero.png"]);
        assert_eq!(rig.animations, vec!["idle", "walk"]);
        assert_eq!(rig.current_animation.as_deref(), Some("idle"));
    }
}
