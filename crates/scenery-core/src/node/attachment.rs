use crate::element::{Element, ElementKind};
use crate::systems::assets::TextureRef;
use crate::systems::display_list::Paint;
use scenery_data::particle::EmitterConfig;
use std::any::Any;
use tracing::warn;

// --- Particle Emitter ---
/// A behaviour-based emitter. Simulation belongs to the host; the runtime
/// keeps the config and the emit switch.
#[derive(Debug, Clone)]
pub struct ParticleEmitter {
    pub config: EmitterConfig,
    pub texture: Option<TextureRef>,
    pub emitting: bool,
}

impl ParticleEmitter {
    pub fn new(config: EmitterConfig, texture: Option<TextureRef>) -> Self {
        Self {
            config,
            texture,
            emitting: false,
        }
    }

    pub fn play(&mut self) {
        self.emitting = true;
    }

    pub fn stop(&mut self) {
        self.emitting = false;
    }
}

impl Element for ParticleEmitter {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn kind(&self) -> ElementKind {
        ElementKind::Particles
    }

    fn paint(&self) -> Option<Paint> {
        Some(Paint::Particles {
            texture: self.texture.clone(),
            emitting: self.emitting,
            config: self.config.clone(),
        })
    }
}

// --- Skeleton ---
/// A skeletal animation rig loaded from a skeleton JSON and its atlas.
#[derive(Debug, Clone)]
pub struct SkeletonRig {
    pub skeleton_path: String,
    pub atlas_path: String,
    pub pages: Vec<String>,
    pub animations: Vec<String>,
    pub bone_count: usize,
    pub skin: Option<String>,
    pub current_animation: Option<String>,
    pub looping: bool,
}

impl SkeletonRig {
    /// Reads bone and animation names out of the skeleton JSON. Animation
    /// names listed in the scene file take precedence.
    pub fn from_skeleton_json(
        skeleton_path: &str,
        atlas_path: &str,
        skeleton: &serde_json::Value,
        declared_animations: &[String],
    ) -> Self {
        let bone_count = skeleton
            .get("bones")
            .and_then(|b| b.as_array())
            .map(|b| b.len())
            .unwrap_or(0);
        let animations = if declared_animations.is_empty() {
            let mut names: Vec<String> = skeleton
                .get("animations")
                .and_then(|a| a.as_object())
                .map(|a| a.keys().cloned().collect())
                .unwrap_or_default();
            names.sort();
            names
        } else {
            declared_animations.to_vec()
        };

        Self {
            skeleton_path: skeleton_path.to_string(),
            atlas_path: atlas_path.to_string(),
            pages: Vec::new(),
            animations,
            bone_count,
            skin: None,
            current_animation: None,
            looping: false,
        }
    }

    /// Selects an animation by name. Unknown names are ignored with a warning.
    pub fn set_animation(&mut self, name: &str, looping: bool) -> bool {
        if !self.animations.iter().any(|a| a == name) {
            warn!("Skeleton '{}' has no animation '{}'", self.skeleton_path, name);
            return false;
        }
        self.current_animation = Some(name.to_string());
        self.looping = looping;
        true
    }
}

impl Element for SkeletonRig {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn kind(&self) -> ElementKind {
        ElementKind::Skeleton
    }

    fn paint(&self) -> Option<Paint> {
        Some(Paint::Skeleton {
            skeleton: self.skeleton_path.clone(),
            skin: self.skin.clone(),
            animation: self.current_animation.clone(),
        })
    }
}
