//! Validation rule descriptors and phase execution.
//!
//! Rules are declared on a [`crate::Blueprint`] and tagged with the
//! [`Phase`] they run in. Execution of a phase is a plain iteration over
//! the declared list, in declaration order, running every rule whose phase
//! matches — a failing rule appends to the instance's `ErrorSet` and the
//! iteration continues, so one phase can report every violation at once.
//!
//! A rule body that returns `Err` is a different thing entirely: that is a
//! fault in the rule itself and it propagates unchanged as
//! [`Fault::Rule`], aborting the lifecycle.

use std::sync::Arc;

use tracing::trace;

use crate::error::Fault;
use crate::op::Op;
use crate::service::Service;

/// The validation stage a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Runs at the initial gate, before any hook. Also what `valid()`
    /// re-runs for pre-execution inspection.
    Default,
    /// Runs after the before hooks, immediately ahead of Execute.
    Request,
    /// Runs after Execute; rules here may inspect the response.
    Response,
}

pub(crate) type RuleFn<S> = Arc<dyn Fn(&mut Op<S>) -> anyhow::Result<()> + Send + Sync>;

/// A declared validation rule: a phase tag, a name for diagnostics, and
/// the check itself.
pub(crate) struct Rule<S: Service> {
    pub(crate) phase: Phase,
    pub(crate) name: &'static str,
    pub(crate) check: RuleFn<S>,
}

impl<S: Service> Clone for Rule<S> {
    fn clone(&self) -> Self {
        Self {
            phase: self.phase,
            name: self.name,
            check: Arc::clone(&self.check),
        }
    }
}

/// Run every rule of `phase`, in declaration order.
///
/// Never short-circuits on a recorded validation failure; only a rule body
/// that itself errors stops execution.
pub(crate) fn run_phase<S: Service>(
    rules: &[Rule<S>],
    op: &mut Op<S>,
    phase: Phase,
) -> Result<(), Fault> {
    for rule in rules.iter().filter(|rule| rule.phase == phase) {
        trace!(rule = rule.name, ?phase, "running validation rule");
        (rule.check)(op).map_err(|source| Fault::Rule {
            rule: rule.name,
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::Blueprint;
    use crate::engine::invoke;
    use crate::error_set::kind;

    struct Strict;

    impl Service for Strict {
        type Response = ();

        fn blueprint() -> Blueprint<Self> {
            Blueprint::new()
                .validate("first", |op| {
                    op.errors_mut().add("a", kind::BLANK);
                    Ok(())
                })
                .validate("second", |op| {
                    op.errors_mut().add("b", kind::INVALID);
                    Ok(())
                })
                .validate_on(Phase::Request, "never_reached", |op| {
                    op.errors_mut().add("c", kind::INVALID);
                    Ok(())
                })
        }
    }

    #[test]
    fn test_phase_runs_all_rules_accumulating() {
        // Both default-phase rules record, even though the first already
        // failed; the request-phase rule never runs because the initial
        // gate stops execution.
        let op = invoke(Strict).unwrap();
        let attributes: Vec<_> = op.errors().iter().map(|e| e.attribute).collect();
        assert_eq!(attributes, vec![Some("a"), Some("b")]);
    }

    struct Broken;

    impl Service for Broken {
        type Response = ();

        fn blueprint() -> Blueprint<Self> {
            Blueprint::new()
                .validate("exploding", |_op| Err(anyhow::anyhow!("lookup table missing")))
                .validate("after_explosion", |op| {
                    op.errors_mut().add("x", kind::INVALID);
                    Ok(())
                })
        }
    }

    #[test]
    fn test_rule_fault_propagates_and_stops_phase() {
        let err = invoke(Broken).unwrap_err();
        match err {
            Fault::Rule { rule, source } => {
                assert_eq!(rule, "exploding");
                assert_eq!(source.to_string(), "lookup table missing");
            }
            other => panic!("expected Fault::Rule, got {other:?}"),
        }
    }
}
