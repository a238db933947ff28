//! Errors raised at the host boundary.
//!
//! The engine itself never fails on numeric anomalies; these only cover
//! datasets that cannot be turned into a node set at all.

#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    #[error("dataset could not be decoded: {0}")]
    Decode(String),
    #[error("value could not be encoded for the host: {0}")]
    Encode(String),
    #[error("duplicate node id in dataset: {id}")]
    DuplicateNodeId { id: String },
    #[error("stack node id collides with the root id: {id}")]
    RootIdCollision { id: String },
}

pub type Result<T> = std::result::Result<T, CloudError>;
