//! The `Service` trait: one domain operation with a declared lifecycle.
//!
//! Implementors hold their own input as plain struct fields and describe
//! everything else declaratively: validation rules and hooks via
//! [`Service::blueprint`], the work itself via [`Service::call`].
//!
//! ```ignore
//! struct PromoteMember {
//!     member_id: Uuid,
//! }
//!
//! impl Service for PromoteMember {
//!     type Response = Membership;
//!
//!     fn blueprint() -> Blueprint<Self> {
//!         Blueprint::new().validates_presence("member_id", |s: &Self| !s.member_id.is_nil())
//!     }
//!
//!     fn call(op: &mut Op<Self>) -> anyhow::Result<Option<Membership>> {
//!         let membership = promote(op.state().member_id)?;
//!         Ok(Some(membership))
//!     }
//! }
//!
//! let op = camshaft::invoke(PromoteMember { member_id })?;
//! ```

use std::any::type_name;

use crate::blueprint::Blueprint;
use crate::error::Fault;
use crate::op::Op;

/// A single domain operation driven through the standard lifecycle.
pub trait Service: Send + Sized + 'static {
    /// What a successful `call` produces.
    type Response: Send + 'static;

    /// Marks a type meant only as a base for composition. Abstract bases
    /// are exempt from providing `call`: Execute becomes a no-op that
    /// leaves the response unset, and the lifecycle continues normally.
    const ABSTRACT_BASE: bool = false;

    /// Marks a lazy-sequence producer. The engine then skips capturing
    /// `call`'s return value into the response; iteration code records the
    /// response itself via [`Op::record_response`] as elements are
    /// produced. Response-phase rules may legitimately observe the
    /// response still unset for such services — that is an accepted
    /// limitation, not a bug. Before hooks run as usual.
    const STREAMING: bool = false;

    /// Declared rules and hooks. Resolved once per type at first use.
    fn blueprint() -> Blueprint<Self> {
        Blueprint::new()
    }

    /// The operation itself. Return `Ok(Some(response))`; `Ok(None)` is
    /// the province of abstract bases and streaming producers.
    ///
    /// An `Err` here is a fault, not a validation failure: it aborts the
    /// lifecycle and propagates through both entry points. Business-rule
    /// rejections belong in validation phases, not in `call`'s error path.
    fn call(op: &mut Op<Self>) -> anyhow::Result<Option<Self::Response>> {
        let _ = op;
        if Self::ABSTRACT_BASE {
            Ok(None)
        } else {
            Err(Fault::NotImplemented {
                service: type_name::<Self>(),
            }
            .into())
        }
    }
}
