use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid path query '{query}' at offset {offset}: {reason}")]
    InvalidPathQuery { query: String, offset: usize, reason: String },

    #[error("Unsupported path query construct: {0}")]
    UnsupportedPathQuery(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
