//! Error types for taskscope.

use thiserror::Error;

/// Main error type for all taskscope operations.
#[derive(Debug, Error)]
pub enum ContextError {
    /// Strict read on a slot with no value in the calling context.
    #[error("no current instance of `{type_name}` in this context")]
    Unset {
        /// Type the empty slot belongs to.
        type_name: &'static str,
    },

    /// Erased write with a value that is not an instance of the slot's type.
    ///
    /// Detected before any mutation; the slot keeps its prior value.
    #[error("value should be an instance of `{expected}`, not `{actual}`")]
    InvalidInstanceType {
        /// Type the slot was declared for.
        expected: &'static str,
        /// Concrete type of the rejected value.
        actual: &'static str,
    },

    /// `AttachedData::delete` on a key with no entry.
    #[error("no attached value under key `{0}`")]
    KeyNotFound(String),
}

/// Result type alias using ContextError.
pub type Result<T> = std::result::Result<T, ContextError>;
