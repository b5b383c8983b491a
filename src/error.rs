// src/error.rs

use std::io;

use thiserror::Error;

/// Reasons a ring accessor refuses to be built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ring buffer is empty")]
    EmptyBuffer,
    #[error("start offset {offset} is outside a ring of {len} bytes")]
    OffsetOutOfRange { offset: usize, len: usize },
}

/// Errors surfaced by the `ringcat` commands.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid ring: {0}")]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid settings: {0}")]
    Settings(String),
}

impl Error {
    /// Maps the error to the process exit status.
    pub fn to_status_code(&self) -> u8 {
        match self {
            Error::Io(_) => 1,
            Error::Config(_) => 2,
            Error::Settings(_) => 3,
        }
    }
}
