//! Error types for texdraft
//!
//! Editing operations never fail; these cover the edges of the crate where
//! text comes in from outside (configuration files, edit scripts, deserialized
//! tables).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Config(#[source] toml::de::Error),

    #[error("Invalid edit script: {0}")]
    Script(#[source] toml::de::Error),

    #[error("Duplicate node id: {0}")]
    DuplicateId(String),

    #[error("Invalid table grid: {0}")]
    TableShape(String),
}

pub type Result<T> = std::result::Result<T, Error>;
