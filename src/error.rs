use thiserror::Error;

use crate::config::ConfigError;
use crate::store::StoreError;

/// Failures that abort a batch run.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not draw a seed from the operating system: {0}")]
    Entropy(getrandom::Error),
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
