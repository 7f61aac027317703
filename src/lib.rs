//! # Scenery
//!
//! Declarative 2D scenes: templates resolved into display trees, laid out for
//! portrait and landscape viewports and animated by frame-stepped timelines.
//!
//! This crate re-exports the runtime from `scenery-core` and the scene file
//! model from `scenery-data`.
//!
//! ```rust,no_run
//! use scenery::{DefaultAssetLoader, Director, LoadOptions};
//! use std::sync::Arc;
//!
//! let mut director = Director::new(Arc::new(DefaultAssetLoader), 1280.0, 720.0);
//! director.load_scene("lobby", "assets/lobby", &LoadOptions::default()).unwrap();
//! let stage = director.load_stage().unwrap();
//! director.resize(720.0, 1280.0);
//! # let _ = stage;
//! ```

pub use scenery_core::*;

/// Serde model of scene files, atlas descriptors and emitter configs.
pub use scenery_data as data;
