//! The in-flight operation instance.
//!
//! An [`Op`] wraps one constructed service value for one trip through the
//! lifecycle: the user state, the [`ErrorSet`] every rule and hook appends
//! to, the response slot, and a record of which entry point started the
//! run. Instances are single-use — the engine builds one per invocation,
//! drives it to completion or failure, and hands it back; there is no
//! caching and no reuse.
//!
//! # `success` vs `valid`
//!
//! [`Op::success`] answers "did it succeed": `errors.is_empty()`,
//! re-evaluated at every read. Appending an error after the run changes
//! what the next read reports.
//!
//! [`Op::valid`] answers the narrower "was this eligible to execute". Once
//! the response has been set it is unconditionally true, whatever the
//! error set contains; before Execute it re-runs the default-phase rules
//! against a scratch set and reports their outcome, leaving the instance's
//! own errors untouched.

use std::any::type_name;
use std::fmt;
use std::mem;

use crate::error::Fault;
use crate::error_set::ErrorSet;
use crate::registry;
use crate::rule::{self, Phase};
use crate::service::Service;

/// One service invocation in flight (or completed).
pub struct Op<S: Service> {
    state: S,
    errors: ErrorSet,
    response: Option<S::Response>,
    strict: bool,
}

impl<S: Service> Op<S> {
    pub(crate) fn new(state: S, strict: bool) -> Self {
        Self {
            state,
            errors: ErrorSet::new(),
            response: None,
            strict,
        }
    }

    /// The user-defined service state.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Mutable access to the service state. Hooks use this to normalize
    /// input before Execute.
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// The recorded validation failures.
    pub fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    /// Append to the validation failures. Open to hooks and rules during
    /// the run, and to callers inspecting a returned instance.
    pub fn errors_mut(&mut self) -> &mut ErrorSet {
        &mut self.errors
    }

    /// The computed response, if Execute has produced one.
    pub fn response(&self) -> Option<&S::Response> {
        self.response.as_ref()
    }

    /// Take ownership of the response, leaving the slot empty.
    pub fn take_response(&mut self) -> Option<S::Response> {
        self.response.take()
    }

    /// Record a response from outside the engine.
    ///
    /// This is the write path for streaming producers (`S::STREAMING`),
    /// whose element-production steps set the response themselves —
    /// typically to a running accumulation, so the last write wins. For
    /// ordinary services the engine is the only writer.
    pub fn record_response(&mut self, response: S::Response) {
        self.response = Some(response);
    }

    pub(crate) fn set_response(&mut self, response: S::Response) {
        self.response = Some(response);
    }

    /// "Did it succeed": the error set is empty, re-evaluated now.
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }

    /// "Was this eligible to execute" (see module docs).
    ///
    /// A default-phase rule body that itself fails is a programming error
    /// and propagates as a [`Fault`] rather than reading as `false`.
    pub fn valid(&mut self) -> Result<bool, Fault> {
        if self.response.is_some() {
            return Ok(true);
        }
        let blueprint = registry::resolved::<S>();
        let saved = mem::take(&mut self.errors);
        let outcome = rule::run_phase(&blueprint.rules, self, Phase::Default);
        let scratch = mem::replace(&mut self.errors, saved);
        outcome?;
        Ok(scratch.is_empty())
    }

    /// True when this instance was driven by the strict (throwing) entry
    /// point. Instrumentation only; nothing in the lifecycle branches on it.
    pub fn invoked_strictly(&self) -> bool {
        self.strict
    }

    /// Dismantle the instance into state, errors, and response.
    pub fn into_parts(self) -> (S, ErrorSet, Option<S::Response>) {
        (self.state, self.errors, self.response)
    }
}

// Manual Debug: neither the state nor the response type is Debug-bound.
impl<S: Service> fmt::Debug for Op<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Op")
            .field("service", &type_name::<S>())
            .field("errors", &self.errors)
            .field("response_present", &self.response.is_some())
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_set::kind;

    struct Plain;

    impl Service for Plain {
        type Response = u32;
    }

    #[test]
    fn test_success_recomputed_at_read_time() {
        let mut op = Op::new(Plain, false);
        assert!(op.success());

        op.errors_mut().add("x", kind::INVALID);
        assert!(!op.success());
    }

    #[test]
    fn test_valid_true_once_response_set_regardless_of_errors() {
        let mut op = Op::new(Plain, false);
        op.set_response(7);
        op.errors_mut().add("x", kind::INVALID);

        assert!(op.valid().unwrap());
        assert!(!op.success());
    }

    #[test]
    fn test_record_response_last_write_wins() {
        let mut op = Op::new(Plain, false);
        op.record_response(1);
        op.record_response(2);
        assert_eq!(op.response(), Some(&2));
    }

    #[test]
    fn test_take_response_empties_slot() {
        let mut op = Op::new(Plain, false);
        op.set_response(9);
        assert_eq!(op.take_response(), Some(9));
        assert_eq!(op.response(), None);
    }

    #[test]
    fn test_into_parts() {
        let mut op = Op::new(Plain, true);
        op.errors_mut().add("x", kind::BLANK);
        op.set_response(3);

        let (_state, errors, response) = op.into_parts();
        assert_eq!(errors.len(), 1);
        assert_eq!(response, Some(3));
    }

    #[test]
    fn test_debug_omits_payloads() {
        let mut op = Op::new(Plain, false);
        op.set_response(42);
        let debug = format!("{op:?}");
        assert!(debug.contains("response_present: true"));
        assert!(debug.contains("Plain"));
    }
}
