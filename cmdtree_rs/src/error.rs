//! Error taxonomy for the routing pipeline.
//!
//! Three layers, each producing exactly one typed error:
//!
//! - [`MatchFailure`] - the route could not be resolved; carries the deepest
//!   valid prefix so a suggestion set can be computed
//! - [`BindingError`] - one or more parameters are invalid; carries every
//!   problem found, never only the first
//! - [`ExecutionError`] - the resolved method (or its receiver) failed
//!
//! [`CliError`] unifies them for callers that only need `?`.

use std::fmt;

use thiserror::Error;

/// Why a route failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchFailureReason {
    #[error("no routes recognized")]
    NoRoute,

    #[error("'{0}' is neither a route term nor a flag")]
    InvalidToken(String),

    #[error("'{0}' is not a known module")]
    UnknownModule(String),

    #[error("'{0}' is not a method or sub module of this module")]
    UnknownTerm(String),

    #[error("method '{0}' must be the last route term")]
    TrailingTerms(String),

    #[error("route ends at a module; choose a method or sub module")]
    Incomplete,

    #[error("help requested")]
    HelpRequested,
}

/// A route that could not be resolved to a method.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct MatchFailure {
    /// Longest leading run of route terms that named real modules
    pub deepest_valid_terms: Vec<String>,
    pub reason: MatchFailureReason,
}

impl MatchFailure {
    pub fn new(deepest_valid_terms: Vec<String>, reason: MatchFailureReason) -> Self {
        Self {
            deepest_valid_terms,
            reason,
        }
    }

    /// Failure before any route term was recognized.
    pub fn unrouted(reason: MatchFailureReason) -> Self {
        Self::new(Vec::new(), reason)
    }
}

/// What went wrong with a single parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingErrorKind {
    #[error("missing")]
    Missing,

    #[error("duplicate")]
    Duplicate,

    #[error("unrecognised")]
    Unrecognised,

    #[error("not an array; given more than one value")]
    NotArray,

    #[error("cannot convert '{value}' to {target}")]
    CannotConvert { value: String, target: String },

    #[error("'{value}' not in enum {target}")]
    NotInEnum { value: String, target: String },

    #[error("cannot parse guid '{0}'")]
    CannotParseGuid(String),

    #[error("cannot deserialize: {0}")]
    CannotDeserialize(String),

    #[error("unsupported parameter type {0}")]
    Unsupported(String),
}

/// One entry of a [`BindingError`], keyed by a readable parameter reference
/// such as `--numbers (-n)` or, for unknown flags, the literal flag text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamError {
    pub reference: String,
    pub kind: BindingErrorKind,
}

/// Every parameter problem found for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingError {
    pub errors: Vec<ParamError>,
}

impl BindingError {
    /// Error recorded for the given reference, if any.
    pub fn get(&self, reference: &str) -> Option<&BindingErrorKind> {
        self.errors
            .iter()
            .find(|error| error.reference == reference)
            .map(|error| &error.kind)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|error| format!("{}: {}", error.reference, error.kind))
            .collect();
        write!(f, "invalid parameters: {}", parts.join("; "))
    }
}

impl std::error::Error for BindingError {}

/// The resolved method, or its receiver, failed.
#[derive(Debug)]
pub struct ExecutionError {
    /// Name of the method that failed
    pub method: String,
    pub cause: anyhow::Error,
}

impl ExecutionError {
    pub fn new(method: impl Into<String>, cause: anyhow::Error) -> Self {
        Self {
            method: method.into(),
            cause,
        }
    }

    /// Cause messages from outermost to innermost.
    pub fn cause_chain(&self) -> Vec<String> {
        self.cause.chain().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "method '{}' failed: {}", self.method, self.cause)
    }
}

impl std::error::Error for ExecutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let cause: &(dyn std::error::Error + 'static) = self.cause.as_ref();
        Some(cause)
    }
}

/// Any failure of a resolve-bind-execute cycle.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Route(#[from] MatchFailure),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}
