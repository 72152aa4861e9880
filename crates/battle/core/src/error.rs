//! Common error infrastructure for battle-core.
//!
//! Domain errors ([`ActionError`](crate::action::ActionError),
//! [`OracleError`](crate::env::OracleError)) live next to the code that raises
//! them and share the classification provided here.

/// How a caller should react to an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The same intent may succeed later or with another choice
    /// (not enough time units, path blocked).
    Recoverable,

    /// Invalid input; retrying unchanged will fail again.
    Validation,

    /// Inconsistent engine state. Indicates a bug.
    Internal,

    /// A required collaborator is missing; the engine cannot proceed.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Uniform classification for every battle-core error.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable identifier, also used as the localisation key of UI warnings.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
