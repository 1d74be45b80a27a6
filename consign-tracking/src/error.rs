use consign_core::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
