use thiserror::Error;

#[derive(Error, Debug)]
pub enum NumLabError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Singular matrix: zero pivot in column {column}")]
    SingularMatrix { column: usize },

    #[error("Linear algebra error: {0}")]
    LinAlg(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type NumLabResult<T> = Result<T, NumLabError>;
