//! Typed failure signals for the lifecycle.
//!
//! Two kinds of things go wrong during an invocation, and they never mix:
//!
//! - **Declared validation outcomes** become [`ErrorSet`] entries and, from
//!   the strict entry point, surface as [`ValidationFailure`] or
//!   [`RequestFailure`].
//! - **Programming errors** — an unimplemented `call`, a hook or rule body
//!   that itself fails — are a [`Fault`] and propagate unchanged through
//!   both entry points. The core performs no catch-and-convert for these.
//!
//! `anyhow` is the internal transport for user-supplied hook/rule bodies;
//! the typed errors here are the only thing the public surface reports.
//!
//! # Example
//!
//! ```ignore
//! use camshaft::{invoke_strict, InvokeError};
//!
//! match invoke_strict(CreateAccount { email }) {
//!     Ok(op) => println!("created: {:?}", op.response()),
//!     Err(InvokeError::Validation(e)) => println!("rejected: {}", e.message),
//!     Err(InvokeError::Request(e)) => println!("failed after execute: {}", e.message),
//!     Err(InvokeError::Fault(f)) => panic!("bug: {f}"),
//! }
//! ```

use std::fmt;

use thiserror::Error;

use crate::error_set::ErrorSet;

const VALIDATION_FAILED: &str = "Validation failed";
const REQUEST_FAILED: &str = "Request failed";

fn derive_message(errors: &ErrorSet, fallback: &str) -> String {
    if errors.is_empty() {
        fallback.to_string()
    } else {
        errors.to_sentence()
    }
}

/// A fatal programming error. Never translated into an [`ErrorSet`] entry.
#[derive(Debug, Error)]
pub enum Fault {
    /// A concrete service type did not provide `call` and is not marked
    /// as an abstract base.
    #[error("`call` is not implemented for {service}")]
    NotImplemented {
        /// Type name of the offending service.
        service: &'static str,
    },

    /// A before/after hook body returned an error.
    #[error("hook `{hook}` failed")]
    Hook {
        /// Declared name of the hook.
        hook: &'static str,
        /// The hook's own error, carried through unchanged.
        #[source]
        source: anyhow::Error,
    },

    /// A validation rule body returned an error (as opposed to recording
    /// a validation failure, which is normal flow).
    #[error("validation rule `{rule}` failed")]
    Rule {
        /// Declared name of the rule.
        rule: &'static str,
        /// The rule's own error, carried through unchanged.
        #[source]
        source: anyhow::Error,
    },

    /// A `call` implementation returned an error other than a [`Fault`].
    #[error("`call` failed for {service}")]
    Call {
        /// Type name of the service whose `call` failed.
        service: &'static str,
        /// The underlying error.
        #[source]
        source: anyhow::Error,
    },
}

/// The strict entry point's report for a failure at the initial
/// (default-phase) validation gate. Always response-less: `call` never ran.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ValidationFailure {
    /// The errors recorded up to the failing gate.
    pub errors: ErrorSet,
    /// Rendered summary: the errors joined into a sentence, or
    /// `"Validation failed"` when the set is empty.
    pub message: String,
}

impl ValidationFailure {
    /// Build a failure with the message derived from `errors`.
    pub fn new(errors: ErrorSet) -> Self {
        let message = derive_message(&errors, VALIDATION_FAILED);
        Self { errors, message }
    }

    /// Build a failure with a caller-supplied message.
    pub fn with_message(errors: ErrorSet, message: impl Into<String>) -> Self {
        Self {
            errors,
            message: message.into(),
        }
    }
}

/// The strict entry point's report for a failure at or after the request
/// gate. Carries the response when Execute already ran.
#[derive(Error)]
#[error("{message}")]
pub struct RequestFailure<R> {
    /// The computed response, present only when the response-validation
    /// gate (or a later state) is where things went wrong.
    pub response: Option<R>,
    /// The errors recorded up to the failing gate.
    pub errors: ErrorSet,
    /// Rendered summary: the errors joined into a sentence, or
    /// `"Request failed"` when the set is empty.
    pub message: String,
}

impl<R> RequestFailure<R> {
    /// Build a failure with the message derived from `errors`.
    pub fn new(response: Option<R>, errors: ErrorSet) -> Self {
        let message = derive_message(&errors, REQUEST_FAILED);
        Self {
            response,
            errors,
            message,
        }
    }

    /// Build a failure with a caller-supplied message.
    pub fn with_message(response: Option<R>, errors: ErrorSet, message: impl Into<String>) -> Self {
        Self {
            response,
            errors,
            message: message.into(),
        }
    }
}

// Manual Debug: the response type is deliberately unconstrained, so only
// its presence is printed.
impl<R> fmt::Debug for RequestFailure<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestFailure")
            .field("response_present", &self.response.is_some())
            .field("errors", &self.errors)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Everything the strict entry point can report.
#[derive(Error)]
pub enum InvokeError<R> {
    /// The initial (default-phase) gate failed; `call` never ran.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// The request gate, the response gate, or the final success check
    /// failed.
    #[error(transparent)]
    Request(#[from] RequestFailure<R>),

    /// A programming error propagated unchanged.
    #[error(transparent)]
    Fault(#[from] Fault),
}

impl<R> InvokeError<R> {
    /// The errors carried by a validation/request failure, if any.
    pub fn errors(&self) -> Option<&ErrorSet> {
        match self {
            InvokeError::Validation(e) => Some(&e.errors),
            InvokeError::Request(e) => Some(&e.errors),
            InvokeError::Fault(_) => None,
        }
    }
}

impl<R> fmt::Debug for InvokeError<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvokeError::Validation(e) => f.debug_tuple("Validation").field(e).finish(),
            InvokeError::Request(e) => f.debug_tuple("Request").field(e).finish(),
            InvokeError::Fault(e) => f.debug_tuple("Fault").field(e).finish(),
        }
    }
}
