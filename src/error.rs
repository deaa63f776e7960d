use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the qbatch library
#[derive(Error, Debug)]
pub enum QbatchError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path:?}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid configuration value
    #[error("Invalid configuration value at {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// Corpus, embedding or annotation line with the wrong field count
    #[error("Malformed record at {path:?}:{line}: expected {expected} fields, found {found}")]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// The same word appeared twice in the embedding file
    #[error("Duplicate word in embeddings: {word}")]
    DuplicateWord { word: String },

    /// An embedding value failed to parse as a float
    #[error("Invalid embedding value at {path:?}:{line}: {value}")]
    InvalidEmbeddingValue {
        path: PathBuf,
        line: usize,
        value: String,
    },

    /// An embedding row whose dimension differs from the first row
    #[error("Embedding dimension mismatch at {path:?}:{line}: expected {expected}, found {found}")]
    EmbeddingDimMismatch {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// The embedding file contained no rows
    #[error("Embedding file is empty: {path:?}")]
    EmptyEmbeddings { path: PathBuf },

    /// Batch construction errors
    #[error("Batch error: {0}")]
    Batch(#[from] crate::batch::BatchError),

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for qbatch operations
pub type Result<T> = std::result::Result<T, QbatchError>;
