//! # Camshaft
//!
//! A thin service-object lifecycle: validations gate, hooks observe, and
//! one `call` does the work.
//!
//! ## Core Concepts
//!
//! Camshaft wraps a single domain operation in a standardized lifecycle.
//! You declare a plain struct holding the operation's input, describe its
//! rules and hooks in a [`Blueprint`], and implement [`Service::call`];
//! the engine drives everything in a fixed order:
//!
//! ```text
//! Construct
//!     │
//!     ▼
//! InitialValidate ──► BeforeHooks ──► RequestValidate ──► Execute
//!                                                             │
//!                                                             ▼
//!              Return ◄── AfterHooks ◄── ResponseValidate ◄───┘
//! ```
//!
//! Each validation state is a **gate**: if the instance's [`ErrorSet`] is
//! not empty afterwards, execution stops and the remaining states are
//! skipped. The same state machine backs two entry points that differ only
//! in reporting: [`invoke`] hands back the instance with its errors
//! recorded, [`invoke_strict`] converts a stopped run into a typed failure.
//!
//! ## Key Invariants
//!
//! 1. **One instance, one run** — every invocation constructs a fresh
//!    [`Op`]; nothing is cached or retried.
//! 2. **Gates read, never cache** — success is "the error set is empty",
//!    re-evaluated at every gate and at every later read.
//! 3. **Declared outcomes vs faults** — validation failures accumulate in
//!    the [`ErrorSet`]; an error *raised by* a hook, rule, or `call` body
//!    is a [`Fault`] and propagates unchanged through both entry points.
//! 4. **Order is declaration order** — rules and hooks run in the order
//!    declared, base blueprints ahead of the declarations appended to them.
//! 5. **Execute runs at most once** — and not at all behind a failed gate.
//!
//! ## Example
//!
//! ```ignore
//! use camshaft::{invoke, Blueprint, Op, Phase, Service, kind};
//!
//! struct RegisterHandle {
//!     handle: String,
//! }
//!
//! impl Service for RegisterHandle {
//!     type Response = String;
//!
//!     fn blueprint() -> Blueprint<Self> {
//!         Blueprint::new()
//!             .validates_presence("handle", |s: &Self| !s.handle.is_empty())
//!             .before("normalize", |op| {
//!                 let normalized = op.state().handle.trim().to_lowercase();
//!                 op.state_mut().handle = normalized;
//!                 Ok(())
//!             })
//!             .validate_on(Phase::Response, "not_reserved", |op| {
//!                 if op.response().is_some_and(|h| h == "admin") {
//!                     op.errors_mut().add("handle", kind::TAKEN);
//!                 }
//!                 Ok(())
//!             })
//!     }
//!
//!     fn call(op: &mut Op<Self>) -> anyhow::Result<Option<String>> {
//!         Ok(Some(op.state().handle.clone()))
//!     }
//! }
//!
//! let op = invoke(RegisterHandle { handle: " Ada ".into() })?;
//! assert!(op.success());
//! assert_eq!(op.response(), Some(&"ada".to_string()));
//! ```
//!
//! ## What This Is Not
//!
//! Camshaft is **not**:
//! - A job runner or scheduler
//! - A retry/backoff framework
//! - A network client or persistence layer
//!
//! Camshaft **is**:
//! > A thin service-object lifecycle where validations gate, hooks
//! > observe, and one `call` does the work.

// Core modules
mod blueprint;
mod engine;
mod error;
mod error_set;
mod hook;
mod op;
mod registry;
mod rule;
mod service;

// Per-service-type configuration values
pub mod settings;


// Re-export the declaration surface
pub use blueprint::Blueprint;
pub use rule::Phase;
pub use service::Service;

// Re-export the invocation surface
pub use engine::{invoke, invoke_strict};
pub use op::Op;

// Re-export error types
pub use error::{Fault, InvokeError, RequestFailure, ValidationFailure};
pub use error_set::{kind, ErrorEntry, ErrorSet};
