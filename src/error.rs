//! Failures that happen before validation: reading, size checks and parsing.
//!
//! Validators never return these. A file that parses but breaks the schema is
//! reported through a validation report instead.

/// Errors raised while turning a file or payload into a document.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Please select a YAML file (.yaml or .yml)")]
    UnsupportedExtension,

    #[error("File size must be less than 1MB (found {size} bytes)")]
    TooLarge { size: u64 },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML format: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON format: {0}")]
    Json(#[from] serde_json::Error),

    #[error("content must be a mapping with items and locations")]
    NotAMapping,

    #[error("{path} must be {expected}")]
    InvalidGroup { path: String, expected: &'static str },

    #[error("{path} entry {index} must be a string (found {found})")]
    InvalidEntry {
        path: String,
        index: usize,
        found: &'static str,
    },
}

impl LoadError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Short JSON type name used in error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
