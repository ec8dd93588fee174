//! Error types for editing, the external service and configuration

use crate::validation::ValidationReport;
use std::path::PathBuf;
use usr_model::{EntryId, Layer, ModelError};

/// Errors from the consistency engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Section not granted in this session
    #[error("{0} section is read-only in this session")]
    PermissionDenied(Layer),

    /// No entry with the id (and occurrence) in the layer
    #[error("no {layer} entry with id {id} (occurrence {occurrence})")]
    EntryNotFound {
        layer: Layer,
        id: EntryId,
        occurrence: usize,
    },

    /// Lexical position past the end of the layer
    #[error("no lexical entry at position {0}")]
    PositionOutOfRange(usize),

    /// Field does not exist on entries of the layer
    #[error("field '{field}' does not belong to the {layer} layer")]
    FieldNotInLayer { layer: Layer, field: &'static str },

    /// Operation needs a dependency, discourse or construction layer
    #[error("{0} is not a linking layer")]
    NotALinkingLayer(Layer),

    /// Another lexical entry already has the index
    #[error("lexical index {0} is already in use")]
    DuplicateIndex(usr_model::TokenIndex),

    /// Unknown field name
    #[error("unknown field: '{0}'")]
    UnknownField(String),

    /// Value could not be read for the field
    #[error("invalid value for {field}: '{value}'")]
    BadFieldValue { field: &'static str, value: String },

    /// Model-level violation, e.g. a value outside its vocabulary
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Blocking validation issues remain
    #[error("commit blocked by {} issue(s)", .0.blocking_count())]
    CommitBlocked(ValidationReport),
}

impl EngineError {
    /// Create entry-not-found error
    pub fn not_found(layer: Layer, id: &EntryId, occurrence: usize) -> Self {
        Self::EntryNotFound {
            layer,
            id: id.clone(),
            occurrence,
        }
    }

    /// Create bad-value error
    pub fn bad_value(field: &'static str, value: impl Into<String>) -> Self {
        Self::BadFieldValue {
            field,
            value: value.into(),
        }
    }
}

/// Errors from the external USR service
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Transport failure
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Unknown record
    #[error("usr not found: {0}")]
    NotFound(String),

    /// Unknown chapter
    #[error("chapter not found: {0}")]
    ChapterNotFound(String),

    /// Request rejected by the service
    #[error("rejected: {0}")]
    Rejected(String),

    /// Payload could not be (de)serialized
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Client is not configured
    #[error("service not configured: {0}")]
    NotConfigured(String),
}

impl ServiceError {
    /// Create status error
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }
}

/// Errors from an edit session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Service call failed
    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    /// Engine rejected the operation
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// A newer load superseded this one
    #[error("load of usr {usr_id} superseded (generation {generation}, current {current})")]
    Stale {
        usr_id: String,
        generation: u64,
        current: u64,
    },
}

/// Errors while reading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for the schema
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
