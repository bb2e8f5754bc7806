//! Per-service declaration of rules and hooks.
//!
//! A [`Blueprint`] is a plain value: ordered rule and hook lists built with
//! chained registration calls, returned from [`crate::Service::blueprint`].
//! The engine resolves it once per service type at first use and caches the
//! flattened result (see `registry`).
//!
//! # Inheritance by composition
//!
//! There is no class hierarchy to walk. A "base class" is a function that
//! builds a blueprint, usually generic over a capability trait, and a
//! "subclass" extends it by appending — so base rules and hooks always run
//! before the ones declared on the concrete service:
//!
//! ```ignore
//! trait Named { fn name(&self) -> &str; }
//!
//! fn named_base<S: Service + Named>() -> Blueprint<S> {
//!     Blueprint::new().validates_presence("name", |s: &S| !s.name().trim().is_empty())
//! }
//!
//! impl Service for RenameTeam {
//!     type Response = Team;
//!
//!     fn blueprint() -> Blueprint<Self> {
//!         named_base::<Self>()
//!             .validate_on(Phase::Request, "team_exists", |op| { /* ... */ Ok(()) })
//!             .before("normalize", |op| { /* ... */ Ok(()) })
//!     }
//! }
//! ```

use std::sync::Arc;

use smallvec::SmallVec;

use crate::error_set::{kind, ErrorEntry};
use crate::hook::{Hook, HookFn};
use crate::op::Op;
use crate::rule::{Phase, Rule, RuleFn};
use crate::service::Service;

/// Ordered rules and hooks for one service type.
pub struct Blueprint<S: Service> {
    pub(crate) rules: SmallVec<[Rule<S>; 4]>,
    pub(crate) before: SmallVec<[Hook<S>; 2]>,
    pub(crate) after: SmallVec<[Hook<S>; 2]>,
}

impl<S: Service> Blueprint<S> {
    /// An empty blueprint: no rules, no hooks.
    pub fn new() -> Self {
        Self {
            rules: SmallVec::new(),
            before: SmallVec::new(),
            after: SmallVec::new(),
        }
    }

    /// Declare a default-phase rule.
    ///
    /// The check records validation failures by appending to
    /// `op.errors_mut()` and returns `Ok(())`; returning `Err` signals a
    /// fault in the rule itself and aborts the lifecycle.
    pub fn validate<F>(self, name: &'static str, check: F) -> Self
    where
        F: Fn(&mut Op<S>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.validate_on(Phase::Default, name, check)
    }

    /// Declare a rule in an explicit phase.
    pub fn validate_on<F>(mut self, phase: Phase, name: &'static str, check: F) -> Self
    where
        F: Fn(&mut Op<S>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.rules.push(Rule {
            phase,
            name,
            check: Arc::new(check) as RuleFn<S>,
        });
        self
    }

    /// Declare a default-phase presence rule: when `present` reports
    /// false, a `blank` error is recorded against `attribute`.
    pub fn validates_presence<F>(self, attribute: &'static str, present: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.validate(attribute, move |op| {
            if !present(op.state()) {
                op.errors_mut().push(ErrorEntry::new(attribute, kind::BLANK));
            }
            Ok(())
        })
    }

    /// Register a before hook. Before hooks run between the initial and
    /// request validation gates, in registration order.
    pub fn before<F>(mut self, name: &'static str, hook: F) -> Self
    where
        F: Fn(&mut Op<S>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.before.push(Hook {
            name,
            run: Arc::new(hook) as HookFn<S>,
        });
        self
    }

    /// Register an after hook. After hooks run last; errors they append
    /// are final (no further gate re-checks them before Return).
    pub fn after<F>(mut self, name: &'static str, hook: F) -> Self
    where
        F: Fn(&mut Op<S>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.after.push(Hook {
            name,
            run: Arc::new(hook) as HookFn<S>,
        });
        self
    }

    /// Append everything declared on `other` after this blueprint's own
    /// declarations. Useful when a base blueprint is built separately.
    pub fn merge(mut self, other: Blueprint<S>) -> Self {
        self.rules.extend(other.rules);
        self.before.extend(other.before);
        self.after.extend(other.after);
        self
    }
}

impl<S: Service> Default for Blueprint<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Service> Clone for Blueprint<S> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
            before: self.before.clone(),
            after: self.after.clone(),
        }
    }
}
