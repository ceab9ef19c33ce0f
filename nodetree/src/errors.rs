use thiserror::Error;

use crate::arena::NodeId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A branch-only operation was attempted on a leaf, a root was split,
    /// or an insertion would make a node its own ancestor.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Index {index} out of range for {len} children")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Node not found in tree: {0}")]
    NodeNotFound(NodeId),

    /// Neither the branch nor the leaf form of `content` could be decoded.
    #[error("Data corrupted: {0}")]
    DataCorruption(String),

    #[error("Failed to encode node: {0}")]
    Encode(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl TreeError {
    pub(crate) fn invalid(detail: impl Into<String>) -> Self {
        Self::InvalidOperation(detail.into())
    }
}

pub type TreeResult<T> = Result<T, TreeError>;
