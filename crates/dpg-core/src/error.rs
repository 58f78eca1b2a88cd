use core::fmt;

use thiserror::Error;

use crate::container::Layout;

/// All errors returned by `dpg-core`.
///
/// None of these are transient: each one is either resource exhaustion or a
/// programming error, so callers propagate them and nothing in the crate
/// retries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A buffer request could not be satisfied.
    #[error("{container}: cannot allocate storage for extents {extents:?}: {reason}")]
    Allocation {
        container: &'static str,
        extents: Vec<usize>,
        reason: String,
    },

    /// A checked element access was out of range.
    #[error("{container}: index {index:?} out of range for extents {extents:?}")]
    Index {
        container: &'static str,
        index: Vec<usize>,
        extents: Vec<usize>,
    },

    /// Malformed container data (CSR buffers, extents, nested extents, kernel
    /// duality). Only checked with `debug_assertions` enabled.
    #[error("{container}: invariant violated: {reason}")]
    InvariantViolation {
        container: &'static str,
        reason: String,
    },

    /// Operand extents do not fit together.
    #[error("{op}: dimension mismatch: expected {expected:?}, got {got:?}")]
    DimensionMismatch {
        op: &'static str,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// The operation needs contiguous data in a particular layout.
    #[error("{op}: requires layout '{required}', got '{got}'")]
    LayoutMismatch {
        op: &'static str,
        required: Layout,
        got: Layout,
    },

    /// The operation is not supported for the given input.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: &'static str },

    /// A configuration could not be parsed or failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CoreError {
    pub(crate) fn invariant(container: &'static str, reason: impl fmt::Display) -> Self {
        Self::InvariantViolation {
            container,
            reason: reason.to_string(),
        }
    }

    /// Name of the container or operation the error was raised for.
    pub fn context(&self) -> &str {
        match self {
            Self::Allocation { container, .. }
            | Self::Index { container, .. }
            | Self::InvariantViolation { container, .. } => container,
            Self::DimensionMismatch { op, .. } | Self::LayoutMismatch { op, .. } => op,
            Self::InvalidArgument { .. } => "argument",
            Self::Config(_) => "config",
        }
    }
}

/// Convenience alias used throughout `dpg-core`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Process-boundary policy for errors that cannot be handled locally.
///
/// Logs the failing operation and the violated condition, then panics with
/// the same text.
pub trait OrFatal<T> {
    fn or_fatal(self, operation: &str) -> T;
}

impl<T> OrFatal<T> for Result<T> {
    #[track_caller]
    fn or_fatal(self, operation: &str) -> T {
        match self {
            Ok(v) => v,
            Err(err) => {
                tracing::error!(operation, context = err.context(), %err, "fatal container error");
                panic!("{operation} failed: {err}");
            }
        }
    }
}

/// Return an [`CoreError::InvariantViolation`] when `cond` is false. The check
/// is compiled in only with `debug_assertions`.
macro_rules! ensure_invariant {
    ($cond:expr, $container:expr, $($arg:tt)+) => {
        if cfg!(debug_assertions) && !($cond) {
            return Err($crate::error::CoreError::InvariantViolation {
                container: $container,
                reason: format!($($arg)+),
            });
        }
    };
}

pub(crate) use ensure_invariant;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_container() {
        let err = CoreError::Index {
            container: "Matrix",
            index: vec![3, 0],
            extents: vec![2, 2],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Matrix:"));
        assert!(msg.contains("[3, 0]"));
        assert_eq!(err.context(), "Matrix");
    }

    #[test]
    fn test_layout_mismatch_message() {
        let err = CoreError::LayoutMismatch {
            op: "Matrix::row",
            required: Layout::Row,
            got: Layout::Col,
        };
        assert_eq!(
            err.to_string(),
            "Matrix::row: requires layout 'R', got 'C'"
        );
    }

    #[test]
    fn test_or_fatal_passes_ok_through() {
        let r: Result<i32> = Ok(4);
        assert_eq!(r.or_fatal("noop"), 4);
    }

    #[test]
    #[should_panic(expected = "csr construct failed")]
    fn test_or_fatal_panics_with_context() {
        let r: Result<()> = Err(CoreError::invariant("CsrOperator", "row_index[0] != 0"));
        r.or_fatal("csr construct");
    }
}
