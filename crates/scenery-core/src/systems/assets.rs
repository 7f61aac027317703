use crate::errors::SceneError;
use crate::AssetLoader;
use scenery_data::atlas::{AtlasDescriptor, FrameRect};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// A resolved texture: the image it lives in plus its sub-rectangle, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextureRef {
    pub key: String,
    pub source: String,
    pub frame: Option<FrameRect>,
}

impl TextureRef {
    /// A standalone image named after its key.
    pub fn named(key: &str) -> Self {
        Self {
            key: key.to_string(),
            source: format!("{}.png", key),
            frame: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureMode {
    /// Frames are looked up in a loaded atlas descriptor.
    Atlas,
    /// Every texture key maps to its own `<key>.png`.
    Individual,
}

/// Per-scene texture and font registry.
///
/// Each scene loads its own atlas, so overlay scenes never see the base
/// scene's frames unless they ship the same names.
#[derive(Clone)]
pub struct AssetManager {
    /// Asset loader for resolving file paths to bytes.
    pub loader: Arc<dyn AssetLoader>,
    base_path: String,
    mode: TextureMode,
    atlas_image: String,
    frames: HashMap<String, FrameRect>,
    bitmap_fonts: HashSet<String>,
}

impl fmt::Debug for AssetManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetManager")
            .field("base_path", &self.base_path)
            .field("mode", &self.mode)
            .field("frames", &self.frames.len())
            .field("bitmap_fonts", &self.bitmap_fonts)
            .finish()
    }
}

impl AssetManager {
    pub fn new(loader: Arc<dyn AssetLoader>, base_path: &str) -> Self {
        let mut base_path = base_path.to_string();
        if !base_path.is_empty() && !base_path.ends_with('/') {
            base_path.push('/');
        }
        Self {
            loader,
            base_path,
            mode: TextureMode::Atlas,
            atlas_image: String::new(),
            frames: HashMap::new(),
            bitmap_fonts: HashSet::new(),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn mode(&self) -> TextureMode {
        self.mode
    }

    /// Joins `file` onto the scene's base path.
    pub fn resolve(&self, file: &str) -> String {
        format!("{}{}", self.base_path, file)
    }

    pub fn load_bytes(&self, file: &str) -> Result<Vec<u8>, SceneError> {
        let path = self.resolve(file);
        self.loader
            .load_bytes(&path)
            .map_err(|e| SceneError::AssetNotFound(format!("{}: {}", path, e)))
    }

    pub fn load_json<T: DeserializeOwned>(&self, file: &str) -> Result<T, SceneError> {
        let bytes = self.load_bytes(file)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Loads an atlas descriptor and registers its frames.
    ///
    /// Frames are reachable by their full name and by the name without its
    /// image extension, so `wheel.png` answers to `wheel`.
    #[instrument(level = "debug", skip(self))]
    pub fn load_atlas(&mut self, descriptor: &str, image: &str) -> Result<usize, SceneError> {
        let atlas: AtlasDescriptor = self.load_json(descriptor)?;
        self.mode = TextureMode::Atlas;
        self.atlas_image = atlas
            .meta
            .as_ref()
            .and_then(|m| m.image.clone())
            .unwrap_or_else(|| image.to_string());

        let mut count = 0;
        for (name, frame) in atlas.entries() {
            self.register_frame(name, frame.frame);
            if let Some((stem, _)) = name.rsplit_once('.') {
                self.frames.entry(stem.to_string()).or_insert(frame.frame);
            }
            count += 1;
        }
        debug!("Registered {} atlas frames from {}", count, descriptor);
        Ok(count)
    }

    pub fn use_individual_images(&mut self) {
        self.mode = TextureMode::Individual;
        self.frames.clear();
    }

    pub fn register_frame(&mut self, key: &str, rect: FrameRect) {
        self.frames.insert(key.to_string(), rect);
    }

    /// Looks up a texture by key. In atlas mode an unknown key is `None`.
    pub fn texture(&self, key: &str) -> Option<TextureRef> {
        match self.mode {
            TextureMode::Atlas => self.frames.get(key).map(|rect| TextureRef {
                key: key.to_string(),
                source: self.resolve(&self.atlas_image),
                frame: Some(*rect),
            }),
            TextureMode::Individual => Some(TextureRef {
                key: key.to_string(),
                source: self.resolve(&format!("{}.png", key)),
                frame: None,
            }),
        }
    }

    pub fn frame_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.frames.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn register_bitmap_font(&mut self, name: &str) {
        self.bitmap_fonts.insert(name.to_string());
    }

    pub fn has_bitmap_font(&self, name: &str) -> bool {
        self.bitmap_fonts.contains(name)
    }

    /// Registers `name` when its `<name>.<extension>` descriptor can be read.
    ///
    /// A missing font is not fatal: text falls back to vector rendering.
    pub fn load_bitmap_font(&mut self, name: &str, extension: &str) -> bool {
        let file = format!("{}.{}", name, extension);
        match self.load_bytes(&file) {
            Ok(_) => {
                self.register_bitmap_font(name);
                true
            }
            Err(e) => {
                warn!("Bitmap font '{}' not registered: {}", name, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryAssetLoader;

    fn rect(x: f32) -> FrameRect {
        FrameRect {
            x,
            y: 0.0,
            w: 10.0,
            h: 10.0,
        }
    }

    #[test]
    fn test_atlas_frames_answer_to_stem() {
        let mut loader = MemoryAssetLoader::new();
        loader.insert(
            "lobby/ta.json",
            br#"{ "frames": { "wheel.png": { "frame": { "x": 4, "y": 0, "w": 10, "h": 10 } } },
                 "meta": { "image": "ta.png" } }"#
                .to_vec(),
        );
        let mut assets = AssetManager::new(Arc::new(loader), "lobby");
        assert_eq!(assets.load_atlas("ta.json", "ta.png").unwrap(), 1);

        let tex = assets.texture("wheel").unwrap();
        assert_eq!(tex.frame, Some(rect(4.0)));
        assert_eq!(tex.source, "lobby/ta.png");
        assert!(assets.texture("wheel.png").is_some());
        assert!(assets.texture("missing").is_none());
    }

    #[test]
    fn test_individual_mode_resolves_any_key() {
        let mut assets = AssetManager::new(Arc::new(MemoryAssetLoader::new()), "");
        assets.register_frame("old", rect(0.0));
        assets.use_individual_images();
        let tex = assets.texture("logo").unwrap();
        assert_eq!(tex.source, "logo.png");
        assert!(tex.frame.is_none());
    }

    #[test]
    fn test_missing_bitmap_font_is_not_registered() {
        let mut loader = MemoryAssetLoader::new();
        loader.insert("Digits.fnt", b"<font/>".to_vec());
        let mut assets = AssetManager::new(Arc::new(loader), "");
        assert!(assets.load_bitmap_font("Digits", "fnt"));
        assert!(!assets.load_bitmap_font("Serif", "fnt"));
        assert!(assets.has_bitmap_font("Digits"));
        assert!(!assets.has_bitmap_font("Serif"));
    }
}
