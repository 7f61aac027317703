// scenery-data: Serde structs for scene files, atlas descriptors and emitter configs
pub mod atlas;
pub mod model;
pub mod particle;
