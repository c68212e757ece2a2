use std::path::PathBuf;

use soarscape_common::BodyId;
use soarscape_kernel::ClockError;
use soarscape_render::SceneError;

/// Errors from building or driving a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("reading config {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no body {0:?} in the simulation")]
    UnknownBody(BodyId),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Clock(#[from] ClockError),
}
