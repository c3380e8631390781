//! Runtime errors raised by evaluation.
//!
//! Only two classes of failure are errors here: conditions a well-typed
//! program can still hit at run time (bad index, overflow, empty reduce) and
//! failures inside native builtins. Internal invariant violations are defects
//! and go through [`slate_types::defect`] instead.
//!
//! Factory functions (e.g. [`index_out_of_bounds`]) are the public way to
//! build errors; they are `#[cold]` so the happy path stays tight.

use std::fmt;

use crate::value::Value;

/// Result of evaluation.
pub type EvalResult<T = Value> = Result<T, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalErrorKind {
    // Access
    #[error("index {index} out of bounds for sequence of length {len}")]
    IndexOutOfBounds { index: i64, len: usize },
    #[error("slice bound {bound} out of range for sequence of length {len}")]
    InvalidSlice { bound: i64, len: usize },
    #[error("step must be non-zero")]
    ZeroStep,
    #[error("cannot iterate open-ended range {range}")]
    OpenRange { range: String },

    // Arithmetic
    #[error("integer overflow in {operation}")]
    IntegerOverflow { operation: &'static str },
    #[error("division by zero")]
    DivisionByZero,
    #[error("{function}: {message}")]
    DomainError { function: String, message: String },

    // Sequences
    #[error("{function} of an empty sequence")]
    EmptyReduce { function: String },

    // Native code
    #[error("builtin {builtin} failed: {message}")]
    HostFailure { builtin: String, message: String },
}

/// Where an error originated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorOrigin {
    /// Raised by the evaluator itself.
    Evaluator,
    /// Raised by the host implementation of a native builtin.
    Host,
}

impl EvalErrorKind {
    pub fn origin(&self) -> ErrorOrigin {
        match self {
            Self::HostFailure { .. } => ErrorOrigin::Host,
            _ => ErrorOrigin::Evaluator,
        }
    }
}

/// A single call in an evaluation backtrace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    /// Function name, or `<anonymous>`.
    pub name: String,
}

/// Evaluation error returned to the host.
///
/// Terminates the current top-level evaluation but never the process.
#[derive(Clone, Debug, thiserror::Error)]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Calls the error propagated through, innermost first.
    backtrace: Vec<BacktraceFrame>,
}

impl EvalError {
    fn from_kind(kind: EvalErrorKind) -> Self {
        EvalError {
            kind,
            backtrace: Vec::new(),
        }
    }

    /// Record that the error propagated out of a call to `name`.
    #[must_use]
    pub fn with_frame(mut self, name: &str) -> Self {
        self.backtrace.push(BacktraceFrame {
            name: name.to_string(),
        });
        self
    }

    pub fn backtrace(&self) -> &[BacktraceFrame] {
        &self.backtrace
    }

    /// Whether the error was raised by a native builtin rather than the
    /// evaluator. Both are ordinary runtime errors to the host.
    #[inline]
    pub fn is_host_failure(&self) -> bool {
        self.kind.origin() == ErrorOrigin::Host
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.backtrace.is_empty() {
            f.write_str("\nstack backtrace:")?;
            for (i, frame) in self.backtrace.iter().enumerate() {
                write!(f, "\n  {i}: {}", frame.name)?;
            }
        }
        Ok(())
    }
}

impl PartialEq<EvalErrorKind> for EvalError {
    fn eq(&self, other: &EvalErrorKind) -> bool {
        self.kind == *other
    }
}

// Access Errors

/// One-based index outside a sequence.
#[cold]
pub fn index_out_of_bounds(index: i64, len: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfBounds { index, len })
}

/// Slice bound outside the sliced sequence.
#[cold]
pub fn invalid_slice_bound(bound: i64, len: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidSlice { bound, len })
}

#[cold]
pub fn zero_step() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ZeroStep)
}

#[cold]
pub fn open_range(range: &dyn fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::OpenRange {
        range: range.to_string(),
    })
}

// Arithmetic Errors

#[cold]
pub fn integer_overflow(operation: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IntegerOverflow { operation })
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

/// Argument outside the mathematical domain of a function.
#[cold]
pub fn domain_error(function: &str, message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DomainError {
        function: function.to_string(),
        message: message.into(),
    })
}

// Sequence Errors

#[cold]
pub fn empty_reduce(function: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::EmptyReduce {
        function: function.to_string(),
    })
}

// Native Errors

/// Wrap a failure raised inside a builtin's native implementation.
#[cold]
pub fn host_failure(builtin: &str, cause: &dyn fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::HostFailure {
        builtin: builtin.to_string(),
        message: cause.to_string(),
    })
}
