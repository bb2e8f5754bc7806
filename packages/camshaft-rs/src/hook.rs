//! Before/after hooks and their execution.
//!
//! Hooks are instance-bound callables declared on a [`crate::Blueprint`].
//! They receive no phase outcome as a parameter; whatever they want to
//! know about the run so far they read from the instance itself
//! (`op.errors()`, `op.response()`), and whatever they want to say they
//! write back the same way.
//!
//! A hook that returns `Err` is an unrecovered fault, not a validation
//! failure: it propagates unchanged as [`Fault::Hook`] and aborts the
//! remaining lifecycle, including any later hooks of the same kind.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::error::Fault;
use crate::op::Op;
use crate::service::Service;

/// Which side of Execute a hook runs on. Carried for diagnostics only;
/// the lists themselves are kept separate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HookKind {
    Before,
    After,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookKind::Before => write!(f, "before"),
            HookKind::After => write!(f, "after"),
        }
    }
}

pub(crate) type HookFn<S> = Arc<dyn Fn(&mut Op<S>) -> anyhow::Result<()> + Send + Sync>;

/// A declared hook: a name for diagnostics plus the callable.
pub(crate) struct Hook<S: Service> {
    pub(crate) name: &'static str,
    pub(crate) run: HookFn<S>,
}

impl<S: Service> Clone for Hook<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            run: Arc::clone(&self.run),
        }
    }
}

/// Run hooks in registration order. The first `Err` aborts the rest.
pub(crate) fn run_hooks<S: Service>(
    hooks: &[Hook<S>],
    op: &mut Op<S>,
    kind: HookKind,
) -> Result<(), Fault> {
    for hook in hooks {
        trace!(hook = hook.name, kind = %kind, "running hook");
        (hook.run)(op).map_err(|source| Fault::Hook {
            hook: hook.name,
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

    struct Tracked {
        journal: Vec<&'static str>,
    }

    impl Service for Tracked {
        type Response = ();

        fn blueprint() -> Blueprint<Self> {
            Blueprint::new()
                .before("first", |op: &mut Op<Self>| {
                    op.state_mut().journal.push("first");
                    Ok(())
                })
                .before("second", |op| {
                    op.state_mut().journal.push("second");
                    Ok(())
                })
        }

        fn call(op: &mut Op<Self>) -> anyhow::Result<Option<()>> {
            op.state_mut().journal.push("call");
            Ok(Some(()))
        }
    }

    #[test]
    fn test_hooks_run_in_registration_order() {
        let op = invoke(Tracked { journal: Vec::new() }).unwrap();
        assert_eq!(op.state().journal, vec!["first", "second", "call"]);
    }

    static LATER_RAN: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);

    struct Exploding;

    impl Service for Exploding {
        type Response = ();

        fn blueprint() -> Blueprint<Self> {
            Blueprint::new()
                .before("explode", |_op| Err(anyhow::anyhow!("boom")))
                .before("later", |_op| {
                    LATER_RAN.store(true, std::sync::atomic::Ordering::SeqCst);
                    Ok(())
                })
        }

        fn call(_op: &mut Op<Self>) -> anyhow::Result<Option<()>> {
            Ok(Some(()))
        }
    }

    #[test]
    fn test_hook_fault_aborts_remaining_hooks() {
        let err = invoke(Exploding).unwrap_err();
        match err {
            Fault::Hook { hook, source } => {
                assert_eq!(hook, "explode");
                assert_eq!(source.to_string(), "boom");
            }
            other => panic!("expected Fault::Hook, got {other:?}"),
        }
        assert!(!LATER_RAN.load(std::sync::atomic::Ordering::SeqCst));
    }
}
