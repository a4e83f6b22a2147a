//! Error types for Passforge

use crate::ir::BlockId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0} argument missing")]
    MissingOption(&'static str),

    #[error("Unknown pass: {0}")]
    UnknownPass(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Unknown block {block} in function {function}")]
    UnknownBlock { function: String, block: BlockId },

    #[error("Duplicate function: {0}")]
    DuplicateFunction(String),

    #[error("Invalid module: {0}")]
    InvalidModule(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
