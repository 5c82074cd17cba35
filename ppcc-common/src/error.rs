//! Error handling for the PPC32 assembly emitter
//!
//! This module defines the error types produced while printing a compiled
//! program as textual assembly. Emission distinguishes exactly two failure
//! classes: a configuration problem detected before any output is produced,
//! and an internal-consistency violation signalling a broken upstream
//! contract. Neither is recoverable; the whole emission is abandoned.

use thiserror::Error;

/// Errors raised during assembly emission
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmitError {
    #[error("unknown target dialect '{0}'")]
    UnknownTarget(String),

    #[error("internal emitter error: {message}")]
    Internal { message: String },
}

impl EmitError {
    /// Create an internal-consistency error
    ///
    /// These indicate that an instruction or section value reached a
    /// rendering point the upstream passes guarantee it cannot legally
    /// reach, e.g. a pseudo-instruction that should have been expanded
    /// before register allocation.
    pub fn internal(message: impl Into<String>) -> Self {
        EmitError::Internal {
            message: message.into(),
        }
    }
}

/// Convert from String (for simple error cases)
impl From<String> for EmitError {
    fn from(message: String) -> Self {
        EmitError::Internal { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EmitError::UnknownTarget("vax".to_string());
        assert_eq!(err.to_string(), "unknown target dialect 'vax'");

        let err = EmitError::internal("frame pseudo reached the printer");
        assert_eq!(
            err.to_string(),
            "internal emitter error: frame pseudo reached the printer"
        );
    }

    #[test]
    fn test_from_string() {
        let err: EmitError = "boom".to_string().into();
        assert!(matches!(err, EmitError::Internal { .. }));
    }
}
