use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Texture atlas descriptor (`ta.json`) in TexturePacker hash or array layout.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AtlasDescriptor {
    pub frames: AtlasFrames,
    #[serde(default)]
    pub meta: Option<AtlasMeta>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum AtlasFrames {
    Hash(HashMap<String, AtlasFrame>),
    Array(Vec<NamedAtlasFrame>),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NamedAtlasFrame {
    pub filename: String,
    #[serde(flatten)]
    pub frame: AtlasFrame,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AtlasFrame {
    pub frame: FrameRect,
    #[serde(default)]
    pub rotated: bool,
    #[serde(default)]
    pub trimmed: bool,
    #[serde(default)]
    pub source_size: Option<FrameSize>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct FrameRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct FrameSize {
    pub w: f32,
    pub h: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AtlasMeta {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub size: Option<FrameSize>,
}

impl AtlasDescriptor {
    /// Flattens both layouts into `(frame name, frame)` pairs.
    pub fn entries(&self) -> Vec<(&str, &AtlasFrame)> {
        match &self.frames {
            AtlasFrames::Hash(map) => map.iter().map(|(k, v)| (k.as_str(), v)).collect(),
            AtlasFrames::Array(list) => list
                .iter()
                .map(|f| (f.filename.as_str(), &f.frame))
                .collect(),
        }
    }
}
