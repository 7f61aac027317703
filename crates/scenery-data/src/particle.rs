use serde::{Deserialize, Serialize};

/// Behaviour-based particle emitter configuration.
///
/// Only the fields the runtime inspects are typed; everything else is kept
/// verbatim in `rest` and handed to the host emitter.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EmitterConfig {
    pub behaviors: Vec<EmitterBehavior>,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EmitterBehavior {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub config: serde_json::Value,
}

/// Top-level keys of the retired emitter schema.
pub const LEGACY_EMITTER_KEYS: &[&str] = &["alpha", "scale", "speed", "color", "startRotation"];

impl EmitterConfig {
    pub fn texture_behavior_mut(&mut self) -> Option<&mut EmitterBehavior> {
        self.behaviors.iter_mut().find(|b| b.kind == "textureSingle")
    }
}

/// True when `value` looks like an emitter config in the retired schema.
pub fn is_legacy_emitter_config(value: &serde_json::Value) -> bool {
    match value.as_object() {
        Some(obj) => {
            !obj.contains_key("behaviors") && LEGACY_EMITTER_KEYS.iter().any(|k| obj.contains_key(*k))
        }
        None => false,
    }
}
