//! Error type shared by the trackers and binding parsers.

use thiserror::Error;

/// Errors surfaced by lookout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A resize notification for a size tracker did not carry exactly one
    /// entry. A size tracker observes a single element, so any other count
    /// means the host broke its contract.
    #[error("resize notification carried {entries} entries, expected exactly one")]
    IntegrityViolation {
        /// Number of entries in the offending batch.
        entries: usize,
    },

    /// A key binding string could not be parsed.
    #[error("invalid key binding `{binding}`: {reason}")]
    InvalidBinding {
        /// The binding as written.
        binding: String,
        /// What was wrong with it.
        reason: &'static str,
    },
}

/// Result type for lookout operations.
pub type Result<T> = std::result::Result<T, Error>;
