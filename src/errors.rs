use thiserror::Error;

use crate::arena::NodeId;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Cannot set parent: {0} cannot be parent of itself")]
    SelfParent(NodeId),

    #[error("Cannot set parent: {node} is an ancestor of {parent}")]
    Loop { node: NodeId, parent: NodeId },

    #[error("Cannot add node {0} multiple times as child")]
    DuplicateChild(NodeId),

    #[error("Unknown or removed node: {0}")]
    InvalidNode(NodeId),

    #[error("Structural change vetoed: {0}")]
    Vetoed(String),

    #[error("Tree is corrupt: {0}")]
    Corrupted(String),

    #[error("Invalid settings: {0}")]
    Config(String),
}

impl TreeError {
    /// Convenience constructor for hook implementations rejecting an edit.
    pub fn vetoed(reason: impl Into<String>) -> Self {
        Self::Vetoed(reason.into())
    }

    /// True for both flavours of cycle: self-parenting and ancestor loops.
    pub fn is_loop(&self) -> bool {
        matches!(self, Self::SelfParent(_) | Self::Loop { .. })
    }
}

impl From<config::ConfigError> for TreeError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

pub type TreeResult<T> = Result<T, TreeError>;
