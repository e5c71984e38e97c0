use thiserror::Error;

use crate::types::DynError;

/// Errors when declaring an injected dependency
///
/// These signal a mistake in the declaration itself and can't be fixed by retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeclarationError {
    /// Neither a callback nor a type was given
    #[error("Must specify one of `callback` or `type`")]
    MissingStrategy,
    /// Both a callback and a type were given
    #[error("Only one of `callback` or `type` can be specified")]
    ConflictingStrategy,
    /// A union was declared without any member types
    #[error("A union type request needs at least one member type")]
    EmptyUnion,
}

/// Errors while resolving an injected dependency
#[derive(Error, Debug)]
pub enum InjectError {
    /// None of the requested types are registered and there is no default
    #[error("{message}")]
    MissingDependency {
        message: String,
        /// Human readable representation of the requested type(s)
        dependency_type: String,
    },
    /// A blocking resolution reached a callback which can only run asynchronously
    #[error("Callback '{callback}' is asynchronous and can't be resolved synchronously")]
    AsyncOnly { callback: &'static str },
    /// A callback requires itself, directly or through other callbacks
    #[error("Circular callback dependency: {}", chain.join(" -> "))]
    CircularDependency { chain: Vec<&'static str> },
    /// Callbacks nested deeper than the client allows
    #[error("Callback dependencies nested deeper than the limit of {limit}")]
    DepthExceeded { limit: usize },
    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
    /// No client is available in the current thread
    #[error(transparent)]
    Local(#[from] LocalError),
    /// Error raised by a callback itself
    #[error("Error during injection: {0}")]
    Other(DynError),
}

impl InjectError {
    pub(crate) fn missing(dependency_type: impl Into<String>) -> Self {
        let dependency_type = dependency_type.into();
        InjectError::MissingDependency {
            message: format!("Couldn't resolve injected type(s) {dependency_type} to actual value"),
            dependency_type,
        }
    }

    /// Wraps an arbitrary error raised inside a callback
    pub fn other(error: impl Into<DynError>) -> Self {
        InjectError::Other(error.into())
    }

    /// Whether this is a missing dependency error
    pub fn is_missing(&self) -> bool {
        matches!(self, InjectError::MissingDependency { .. })
    }
}

/// Errors of the thread local client slot
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocalError {
    #[error("Client already initialised in the current context")]
    AlreadyInitialized,
    #[error("Client not initialised in the current context")]
    NotInitialized,
}
