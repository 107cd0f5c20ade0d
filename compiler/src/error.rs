//! Errors raised by the tree layer.
//!
//! Everything here signals a defect in whoever built the tree (or in the
//! configuration), never an ill-typed user program.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AstError {
    #[error("unexpected nil in {context}")]
    UnexpectedNil { context: String },

    #[error("empty name for {context}")]
    EmptyName { context: String },

    #[error("empty index group in {context}")]
    EmptyIndexGroup { context: String },

    #[error("tree nesting exceeds limit of {limit} at {context}")]
    DepthExceeded { limit: usize, context: String },

    #[error("invalid operator: {0:?}")]
    InvalidOperator(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AstError {
    pub fn unexpected_nil(context: impl Into<String>) -> Self {
        Self::UnexpectedNil {
            context: context.into(),
        }
    }

    pub fn empty_name(context: impl Into<String>) -> Self {
        Self::EmptyName {
            context: context.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AstError>;
