use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Two incoming items produced the same node key.
    #[error("duplicate node key in incoming items: {key}")]
    DuplicateKey { key: String },

    #[error("unknown transaction: {0}")]
    UnknownItem(String),

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("category already exists: {0}")]
    DuplicateCategory(String),

    #[error("category name must not be empty")]
    EmptyCategoryName,

    #[error("invalid board configuration: {0}")]
    Config(#[from] serde_json::Error),
}
