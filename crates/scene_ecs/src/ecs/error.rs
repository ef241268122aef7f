//! ECS error types

use super::registry::TypeTag;

/// Errors raised by systems, the orchestrator and the type registry
///
/// Every failure is reported before any state is touched.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// An argument violated a precondition (sentinel entity, missing
    /// transform, cycle, payload type mismatch, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No system is registered for the component tag
    #[error("No system handles component type {0}")]
    NotHandled(TypeTag),

    /// The tag or type name is already claimed
    #[error("Duplicate registration of {name} ({tag})")]
    DuplicateRegistration {
        /// Tag that was already taken
        tag: TypeTag,
        /// Type or system name involved in the clash
        name: String,
    },
}

impl EcsError {
    /// Shorthand for [`EcsError::InvalidArgument`]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Result alias for ECS operations
pub type EcsResult<T> = Result<T, EcsError>;
