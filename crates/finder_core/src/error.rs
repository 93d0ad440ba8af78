use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("job not found: {0}")]
    NotFound(String),
    #[error("url is not part of this job: {0}")]
    UnknownUrl(String),
    #[error("all outcomes for this job were already recorded")]
    AlreadyComplete,
}
