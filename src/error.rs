//! Error types of rbtree_rs.

use std::{error, fmt};

/// Error type used for this library.
///
/// Operations that can only fail through caller misuse return
/// `Result<_, TreeError>`; operations for which "nothing there" is an
/// ordinary outcome return `bool` or `Option` instead (see the per-method
/// documentation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// An argument violated a documented requirement, for example a zero
    /// multiplicity passed to a bag or a linked payload that is already
    /// bound to a tree.
    InvalidArgument(String),
    /// A rank passed to a select-style operation was outside `[0, len)`.
    OutOfRange(String),
    /// A partial queue operation (`element`, `remove_first`) was called on
    /// an empty tree.
    NoSuchElement(String),
    /// A linked `swap` left an element out of order with respect to its
    /// chain neighbors.  The tree state is unspecified after this error.
    InvariantViolation(String),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            TreeError::OutOfRange(msg) => write!(f, "Out of range: {}", msg),
            TreeError::NoSuchElement(msg) => write!(f, "No such element: {}", msg),
            TreeError::InvariantViolation(msg) => write!(f, "Invariant violation: {}", msg),
        }
    }
}

impl error::Error for TreeError {}
