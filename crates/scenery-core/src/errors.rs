use thiserror::Error;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Asset not found: {0}")]
    AssetNotFound(String),
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Scene '{0}' has no data loaded")]
    NotLoaded(String),
    #[error("Pool '{0}' does not exist")]
    UnknownPool(String),
    #[error("Pool '{pool}' limit exceeded at index {index}")]
    PoolExhausted { pool: String, index: usize },
    #[error("Pool '{0}' has nothing checked out")]
    PoolUnderflow(String),
    #[error("Particle config for '{0}' uses the legacy schema; convert it to 'behaviors'")]
    LegacyParticleConfig(String),
    #[error("Recursion depth limit exceeded")]
    RecursionLimit,
}
