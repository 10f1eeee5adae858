//! Errors raised while loading or validating descriptor tables.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from descriptor loading and validation.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// The table file could not be read.
    #[error("Failed to read descriptor table '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The table is not valid JSON for the descriptor model.
    #[error("Invalid JSON descriptor table: {0}")]
    Json(#[from] serde_json::Error),

    /// The table is not valid YAML for the descriptor model.
    #[error("Invalid YAML descriptor table: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document root is not a map of operation id to descriptor.
    #[error("Descriptor table must be a map of operations, found {found}")]
    InvalidRoot { found: &'static str },

    /// An operation entry is not a descriptor object.
    #[error("Operation '{operation}' must be an object, found {found}")]
    InvalidOperation {
        operation: String,
        found: &'static str,
    },

    /// The file extension does not map to a supported format.
    #[error("Unsupported descriptor table format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// A template placeholder has no required `path` parameter behind it.
    #[error("Placeholder '{{{placeholder}}}' in '{template}' has no required path parameter")]
    UnmatchedPlaceholder {
        placeholder: String,
        template: String,
    },

    /// Two parameters of one endpoint share a name.
    #[error("Duplicate parameter name: {name}")]
    DuplicateParameter { name: String },

    /// Wraps a violation with the operation it was found in.
    #[error("Operation '{operation}': {source}")]
    InOperation {
        operation: String,
        #[source]
        source: Box<DefinitionError>,
    },
}

impl DefinitionError {
    /// Attaches the operation id to a validation error.
    pub fn in_operation(operation: impl Into<String>, source: DefinitionError) -> Self {
        Self::InOperation {
            operation: operation.into(),
            source: Box::new(source),
        }
    }
}
