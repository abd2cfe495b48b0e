use std::{
    collections::TryReserveError,
    fmt,
};

/// Possible errors encountered while building a model. The tables backing
/// a predictor total several hundred MiB, so a failed reservation is
/// reported rather than aborting the process. Once construction succeeds,
/// no operation fails.
#[derive(Debug)]
pub enum ModelError {
    OutOfMemory(TryReserveError),
}
impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::OutOfMemory(err) => {
                write!(f, "Could not allocate model tables: {err}")
            }
        }
    }
}
impl std::error::Error for ModelError {}

impl From<TryReserveError> for ModelError {
    fn from(err: TryReserveError) -> ModelError {
        ModelError::OutOfMemory(err)
    }
}
