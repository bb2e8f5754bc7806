//! The invocation engine: one state machine, two entry points.
//!
//! Every invocation walks the same ordered states:
//!
//! ```text
//! Construct
//!     │
//!     ▼
//! InitialValidate   (default-phase rules)   ── not empty ──► stop
//!     │
//!     ▼
//! BeforeHooks       (no gate of its own; errors surface at the next gate)
//!     │
//!     ▼
//! RequestValidate   (request-phase rules)   ── not empty ──► stop
//!     │
//!     ▼
//! Execute           (`call`; response captured unless STREAMING)
//!     │
//!     ▼
//! ResponseValidate  (response-phase rules)  ── not empty ──► stop
//!     │
//!     ▼
//! AfterHooks
//!     │
//!     ▼
//! Return
//! ```
//!
//! The gate predicate is always the same: the error set is empty, checked
//! right now, never cached. The two entry points share this machine
//! exactly and differ only in how a stopped run is reported:
//!
//! | gate failing      | [`invoke`]                             | [`invoke_strict`]                       |
//! |-------------------|----------------------------------------|-----------------------------------------|
//! | InitialValidate   | `Ok(op)` — errors set, no response     | `Err(Validation(..))`                   |
//! | RequestValidate   | `Ok(op)` — errors set, no response     | `Err(Request(..))`, response absent     |
//! | ResponseValidate  | `Ok(op)` — errors set, response set    | `Err(Request(..))`, response present    |
//! | Return, not empty | `Ok(op)` — errors set, response set    | `Err(Request(..))`, response present    |
//! | fault anywhere    | `Err(fault)`                           | `Err(Fault(..))`                        |
//!
//! There is no retry anywhere: a stopped or failed invocation is final,
//! and `call` runs at most once per invocation.

use std::any::type_name;

use tracing::{debug, debug_span, trace};
use uuid::Uuid;

use crate::error::{Fault, InvokeError, RequestFailure, ValidationFailure};
use crate::hook::{self, HookKind};
use crate::op::Op;
use crate::registry;
use crate::rule::{self, Phase};
use crate::service::Service;

/// Which gate stopped a run short of completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Initial,
    Request,
    Response,
}

/// Drive the instance through the state machine.
///
/// `Ok(None)` means every state ran; `Ok(Some(gate))` names the gate that
/// stopped execution; `Err` is a fault from a hook, rule, or `call`.
fn drive<S: Service>(op: &mut Op<S>) -> Result<Option<Gate>, Fault> {
    let blueprint = registry::resolved::<S>();

    rule::run_phase(&blueprint.rules, op, Phase::Default)?;
    if !op.success() {
        debug!(gate = "initial_validate", "stopping: default-phase validation failed");
        return Ok(Some(Gate::Initial));
    }

    hook::run_hooks(&blueprint.before, op, HookKind::Before)?;

    rule::run_phase(&blueprint.rules, op, Phase::Request)?;
    if !op.success() {
        debug!(gate = "request_validate", "stopping: request-phase validation failed");
        return Ok(Some(Gate::Request));
    }

    trace!("executing `call`");
    match S::call(op) {
        Ok(response) => {
            if !S::STREAMING {
                if let Some(response) = response {
                    op.set_response(response);
                }
            }
        }
        Err(err) => return Err(call_fault::<S>(err)),
    }

    rule::run_phase(&blueprint.rules, op, Phase::Response)?;
    if !op.success() {
        debug!(gate = "response_validate", "stopping: response-phase validation failed");
        return Ok(Some(Gate::Response));
    }

    hook::run_hooks(&blueprint.after, op, HookKind::After)?;

    Ok(None)
}

/// A `call` error is either a [`Fault`] already (the unimplemented
/// default, or a deliberate signal) or some other failure, which wraps as
/// `Fault::Call` with the original as source.
fn call_fault<S: Service>(err: anyhow::Error) -> Fault {
    match err.downcast::<Fault>() {
        Ok(fault) => fault,
        Err(err) => Fault::Call {
            service: type_name::<S>(),
            source: err,
        },
    }
}

/// The non-throwing entry point.
///
/// Business-rule failures never surface as `Err` here: the instance comes
/// back with its errors recorded and the response set or unset according
/// to where the run stopped. Only faults — unimplemented `call`, a hook
/// or rule body that itself failed — break out as `Err`.
pub fn invoke<S: Service>(state: S) -> Result<Op<S>, Fault> {
    let mut op = Op::new(state, false);
    let span = debug_span!(
        "invoke",
        service = type_name::<S>(),
        op_id = %Uuid::new_v4(),
        strict = false,
    );
    let _guard = span.enter();

    drive(&mut op)?;
    Ok(op)
}

/// The throwing entry point.
///
/// Same state machine as [`invoke`]; a gate failure is converted into the
/// typed failure the table in the module docs prescribes, while faults
/// propagate unchanged inside [`InvokeError::Fault`].
pub fn invoke_strict<S: Service>(state: S) -> Result<Op<S>, InvokeError<S::Response>> {
    let mut op = Op::new(state, true);
    let span = debug_span!(
        "invoke",
        service = type_name::<S>(),
        op_id = %Uuid::new_v4(),
        strict = true,
    );
    let _guard = span.enter();

    match drive(&mut op) {
        Err(fault) => Err(InvokeError::Fault(fault)),
        Ok(Some(Gate::Initial)) => Err(InvokeError::Validation(ValidationFailure::new(
            op.errors().clone(),
        ))),
        Ok(Some(Gate::Request)) => Err(InvokeError::Request(RequestFailure::new(
            None,
            op.errors().clone(),
        ))),
        Ok(Some(Gate::Response)) => {
            let response = op.take_response();
            Err(InvokeError::Request(RequestFailure::new(
                response,
                op.errors().clone(),
            )))
        }
        Ok(None) => {
            if op.success() {
                Ok(op)
            } else {
                // After hooks appended errors past the last gate; the
                // strict entry still refuses to hand back a failed
                // instance as Ok.
                let response = op.take_response();
                Err(InvokeError::Request(RequestFailure::new(
                    response,
                    op.errors().clone(),
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::Blueprint;
    use crate::error_set::kind;

    struct AlwaysInvalid;

    impl Service for AlwaysInvalid {
        type Response = ();

        fn blueprint() -> Blueprint<Self> {
            Blueprint::new().validate("doomed", |op| {
                op.errors_mut().add_to_base(kind::INVALID);
                Ok(())
            })
        }

        fn call(_op: &mut Op<Self>) -> anyhow::Result<Option<()>> {
            panic!("call must not run when the initial gate fails");
        }
    }

    #[test]
    fn test_initial_gate_stops_before_call() {
        let op = invoke(AlwaysInvalid).unwrap();
        assert!(!op.success());
        assert!(op.response().is_none());
        assert!(!op.invoked_strictly());
    }

    #[test]
    fn test_initial_gate_strict_reports_validation_failure() {
        let err = invoke_strict(AlwaysInvalid).unwrap_err();
        match err {
            InvokeError::Validation(failure) => {
                assert_eq!(failure.errors.len(), 1);
                assert_eq!(failure.message, "is invalid");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    struct Unimplemented;

    impl Service for Unimplemented {
        type Response = ();
    }

    #[test]
    fn test_missing_call_is_not_implemented_from_both_entries() {
        let err = invoke(Unimplemented).unwrap_err();
        assert!(matches!(err, Fault::NotImplemented { .. }));

        let err = invoke_strict(Unimplemented).unwrap_err();
        assert!(matches!(
            err,
            InvokeError::Fault(Fault::NotImplemented { .. })
        ));
    }

    struct CustomCallError;

    impl Service for CustomCallError {
        type Response = ();

        fn call(_op: &mut Op<Self>) -> anyhow::Result<Option<()>> {
            Err(anyhow::anyhow!("connection reset"))
        }
    }

    #[test]
    fn test_call_error_wraps_as_call_fault() {
        let err = invoke(CustomCallError).unwrap_err();
        match err {
            Fault::Call { service, source } => {
                assert!(service.contains("CustomCallError"));
                assert_eq!(source.to_string(), "connection reset");
            }
            other => panic!("expected Fault::Call, got {other:?}"),
        }
    }

    struct Marked;

    impl Service for Marked {
        type Response = bool;

        fn call(op: &mut Op<Self>) -> anyhow::Result<Option<bool>> {
            Ok(Some(op.invoked_strictly()))
        }
    }

    #[test]
    fn test_entry_point_recorded_on_instance() {
        let op = invoke(Marked).unwrap();
        assert_eq!(op.response(), Some(&false));

        let op = invoke_strict(Marked).unwrap();
        assert_eq!(op.response(), Some(&true));
        assert!(op.invoked_strictly());
    }
}
