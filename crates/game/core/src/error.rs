//! Common error infrastructure for encounter-core.
//!
//! Domain-specific errors (`ActionError`, `DirectiveError`, `SnapshotError`)
//! live next to the code that produces them and implement [`GameError`] so the
//! session layer can classify them uniformly.
//!
//! Expected game conditions (no living target, empty order, inactive
//! encounter) are never errors; they are ordinary branches producing a patch.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the same request may succeed once the encounter moves on
/// - **Validation**: malformed input, rejected with no state mutation
/// - **Internal**: an invariant was found broken and had to be repaired
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - retry later or with a different request.
    ///
    /// Examples: acting out of turn
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: unknown action name, modifier on an action that takes none
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// Examples: snapshot with an unsupported version
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal inconsistency.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for all encounter-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
/// - Keep `error_code` stable; it is used in logs and tests
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
