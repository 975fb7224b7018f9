use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkError {
    // Store errors
    #[error("store error: {source}")]
    Store {
        #[from]
        source: redis::RedisError,
    },

    // Record (de)serialization errors
    #[error("record encoding error: {source}")]
    Record {
        #[from]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, LinkError>;
