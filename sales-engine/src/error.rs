use core_types::types::UnknownOperation;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// The engine's closed error taxonomy. Both kinds are caller errors; neither
/// is retryable with the same input.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid product type: must not be blank")]
    InvalidProductType,
    #[error(transparent)]
    UnknownOperation(#[from] UnknownOperation),
}
