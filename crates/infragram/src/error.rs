//! Error types for infragram operations.
//!
//! [`InfragramError`] wraps every failure the render pipeline can raise.
//! Validation problems are never errors; they are reported through
//! [`ValidationReport`](crate::validate::ValidationReport).

use std::io;

use thiserror::Error;

use infragram_core::error::ConstructionError;

use crate::{export::raster::RasterError, xml::SerializationError};

/// The main error type for infragram operations.
#[derive(Debug, Error)]
pub enum InfragramError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Schema parse error: {}", .err.message())]
    Parse { err: toml::de::Error, src: String },

    #[error("Invalid schema: {0}")]
    Construction(#[from] ConstructionError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    #[error("Raster error: {0}")]
    Raster(#[from] RasterError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl InfragramError {
    /// Create a new `Parse` error with the schema source it refers to.
    pub fn new_parse_error(err: toml::de::Error, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
