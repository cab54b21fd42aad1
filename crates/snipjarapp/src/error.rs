use crate::model::ItemId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnipError {
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Ambiguous item id '{0}': matches {1} items")]
    AmbiguousId(String, usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SnipError>;
