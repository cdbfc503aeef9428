//! Error types for the Galaxy3D culling engine
//!
//! Configuration problems (e.g. an unknown backend mode) are NOT errors:
//! they are recovered locally and reported as a `Diagnostic`.
//! Everything here is either a programmer error (contract violation) or
//! a lifetime violation of an observed collaborator. Nothing is retried.

use std::fmt;

/// Result type for culling operations
pub type Result<T> = std::result::Result<T, Error>;

/// Culling engine errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A precondition of the culling contract was broken
    /// (duplicate object, unknown object, result bound to another group, ...)
    ContractViolation(String),

    /// Malformed input data (matrix array too short, stride too small, ...)
    InvalidArgument(String),

    /// The observed scene graph was destroyed while still subscribed
    SubjectDestroyed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ContractViolation(msg) => write!(f, "Contract violation: {}", msg),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::SubjectDestroyed(msg) => write!(f, "Observed subject destroyed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an ERROR (with file:line) and build an `Error::ContractViolation`.
///
/// # Example
///
/// ```ignore
/// let key = lookup(index)
///     .ok_or_else(|| engine_err!("galaxy3d::culling::Group", "Unknown object {:?}", key))?;
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::galaxy3d::Error::ContractViolation(message)
    }};
}

/// Log an ERROR (with file:line) and return `Err(Error::ContractViolation)`.
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
