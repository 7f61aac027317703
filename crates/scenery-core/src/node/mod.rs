//! Leaf and container payloads stored in the scene graph.
//!
//! Widgets with behaviour (buttons, states, scrolls) live in `crate::widgets`;
//! timelines in `crate::timeline`.

pub mod container;
pub use container::{Container, MaskShape};

pub mod text;
pub use text::{BitmapText, TextField, TextStyle};

pub mod sprite;
pub use sprite::{NineSlice, Sprite};

pub mod attachment;
pub use attachment::{ParticleEmitter, SkeletonRig};

/// Strips an authoring suffix such as `_IMG` or `_9S` from an asset name.
pub fn texture_key<'a>(name: &'a str, suffix: &str) -> &'a str {
    name.strip_suffix(suffix).unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_key() {
        assert_eq!(texture_key("wheel_IMG", "_IMG"), "wheel");
        assert_eq!(texture_key("frame_9S", "_9S"), "frame");
        assert_eq!(texture_key("plain", "_IMG"), "plain");
        // Only a trailing suffix is stripped.
        assert_eq!(texture_key("my_IMG_bg", "_IMG"), "my_IMG_bg");
    }
}
