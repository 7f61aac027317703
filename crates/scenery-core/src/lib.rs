//! # Scenery Core
//!
//! `scenery-core` turns declarative scene files into live display trees and
//! plays them back frame by frame.
//!
//! A scene file describes named templates, their children and per-orientation
//! placement records, plus optional keyframe tracks and cue points. The core
//! resolves templates into nodes, keeps them laid out as the viewport flips
//! between portrait and landscape, and steps timelines at the scene's frame
//! rate.
//!
//! ## Core Features
//!
//! *   **Template Resolution**: Templates nest by name; keyframed templates become timelines.
//! *   **Orientation Layout**: Every instance carries a portrait and a landscape record.
//! *   **Timelines**: Sparse keyframe tracks, looping, cue points and end listeners.
//! *   **Scene Stack**: Overlay scenes shadow templates of the scenes below them.
//! *   **Widgets**: Headless buttons, state views, toggles, sliders and scroll panes.
//! *   **Display List**: A flat, serialisable list of draw commands for the host renderer.
//!
//! ## Usage
//!
//! The entry point is the [`Director`], which owns the display tree, the
//! update scheduler, the cue dispatcher, the scene stack and the object pool.
//!
//! ```rust,no_run
//! use scenery_core::{DefaultAssetLoader, Director, LoadOptions};
//! use std::sync::Arc;
//!
//! let mut director = Director::new(Arc::new(DefaultAssetLoader), 1920.0, 1080.0);
//! director.load_scene("lobby", "scenes/lobby", &LoadOptions::default()).unwrap();
//! director.load_stage().unwrap();
//! ```

/// Shared data structures used across the runtime.
pub mod types;

pub mod errors;

/// Defines the base `Element` trait that all display nodes implement.
pub mod element;

/// Concrete display nodes (containers, sprites, text, attachments).
pub mod node;

/// The display tree arena.
pub mod scene;

/// Cue-point listener registry.
pub mod cue;

/// Fixed-step ticker for playing timelines.
pub mod scheduler;

pub mod runtime;

/// Keyframed timelines and their transport.
pub mod timeline;

/// Headless interactive widgets.
pub mod widgets;

/// Maps template type tags to elements.
pub mod registry;

/// Template name to live subtree.
pub mod resolver;

pub mod scene_manager;

pub mod stack;

pub mod pool;

/// The top-level owner of every runtime service.
pub mod director;

/// Core systems (assets, attachments, display list).
pub mod systems;

pub use director::Director;
pub use element::{Element, ElementKind};
pub use errors::SceneError;
pub use pool::ObjectPool;
pub use runtime::Runtime;
pub use scene::SceneGraph;
pub use scene_manager::SceneManager;
pub use stack::SceneStack;
pub use timeline::Timeline;
pub use types::{NodeId, Orientation, Viewport};

use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::instrument;

/// A trait for abstracting file system access.
///
/// Scenes never touch the filesystem directly, so they can be served from an
/// archive, a network cache or memory. Loaders are shared with background
/// loading threads and must be `Send + Sync`.
pub trait AssetLoader: Send + Sync {
    /// Loads the raw bytes of an asset from the given path.
    fn load_bytes(&self, path: &str) -> Result<Vec<u8>>;
}

/// Reads assets from the local filesystem.
///
/// Paths that do not exist as given are retried under the directory named by
/// `SCENERY_ASSET_ROOT`, then under `assets/`.
pub struct DefaultAssetLoader;

impl AssetLoader for DefaultAssetLoader {
    #[instrument(level = "debug", skip(self), fields(path = path))]
    fn load_bytes(&self, path: &str) -> Result<Vec<u8>> {
        if let Ok(bytes) = std::fs::read(path) {
            return Ok(bytes);
        }
        let root = std::env::var("SCENERY_ASSET_ROOT").unwrap_or_else(|_| "assets".to_string());
        let alt: PathBuf = [root.as_str(), path].iter().collect();
        std::fs::read(&alt).map_err(|e| {
            anyhow::anyhow!(
                "Asset not found: {} (checked '{}' and '{}'): {}",
                path,
                path,
                alt.display(),
                e
            )
        })
    }
}

/// Serves assets from memory. Handy for tests and embedded scenes.
#[derive(Debug, Default, Clone)]
pub struct MemoryAssetLoader {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(path.into(), bytes);
    }

    pub fn with(mut self, path: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(path, bytes);
        self
    }
}

impl AssetLoader for MemoryAssetLoader {
    fn load_bytes(&self, path: &str) -> Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Asset not found: {}", path))
    }
}

/// File names used when loading a scene directory.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// The scene data file.
    pub placements: String,
    /// Forces atlas or individual-image texture loading. `None` follows the
    /// scene file's `atlas` flag.
    pub atlas: Option<bool>,
    pub atlas_descriptor: String,
    pub atlas_image: String,
    /// Extension of bitmap font descriptors, without the dot.
    pub font_extension: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            placements: "placements.json".to_string(),
            atlas: None,
            atlas_descriptor: "ta.json".to_string(),
            atlas_image: "ta.png".to_string(),
            font_extension: "fnt".to_string(),
        }
    }
}
