//! Subscription handles and cancellation guards.
//!
//! A [`Subscription`] is the live binding between one publisher and one
//! subscriber. The subscriber receives it in `on_subscribe` as a
//! [`SubscriptionHandle`] and uses it to raise demand or cancel.
//! [`Cancellable`] wraps a handle so that dropping it cancels.

mod conduit;
mod dynamic;

use std::{
  cell::Cell,
  fmt::{Debug, Formatter},
  rc::Rc,
};

pub use conduit::{Conduit, ConduitState};
pub use dynamic::DynamicSubscriptions;
use futures::future::AbortHandle;

use crate::{demand::Demand, rc::MutRc};

pub trait Subscription {
  /// Adds `demand` to the outstanding demand. May deliver pending values
  /// before returning. Requesting zero demand, or requesting on a closed
  /// subscription, does nothing.
  fn request(&self, demand: Demand);

  /// Stops all further delivery and releases the subscriber. Idempotent.
  fn cancel(&self);

  /// `true` once the subscription was cancelled or completed.
  fn is_closed(&self) -> bool;

  /// Short name of the publisher behind this subscription, used by `print`.
  fn name(&self) -> &'static str { "Subscription" }
}

/// Shared handle to a live subscription.
pub type SubscriptionHandle = Rc<dyn Subscription>;

/// A subscription that is already closed.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptySubscription;

impl Subscription for EmptySubscription {
  fn request(&self, _demand: Demand) {}

  fn cancel(&self) {}

  fn is_closed(&self) -> bool { true }

  fn name(&self) -> &'static str { "Empty" }
}

/// Subscription backed by a spawned task. Cancelling aborts the task.
pub struct TaskSubscription {
  abort: AbortHandle,
  closed: Cell<bool>,
  name: &'static str,
}

impl TaskSubscription {
  pub fn new(abort: AbortHandle, name: &'static str) -> Self {
    Self { abort, closed: Cell::new(false), name }
  }
}

impl Subscription for TaskSubscription {
  fn request(&self, _demand: Demand) {}

  fn cancel(&self) {
    if !self.closed.replace(true) {
      self.abort.abort();
      tracing::debug!(task = self.name, "task cancelled");
    }
  }

  fn is_closed(&self) -> bool { self.closed.get() || self.abort.is_aborted() }

  fn name(&self) -> &'static str { self.name }
}

/// A RAII guard over a subscription: cancels it when dropped.
///
/// Returned by `sink`, `assign` and `connect`. Keep it alive for as long as
/// values should flow, or [`store`](Cancellable::store) it in a collection.
///
/// **Attention:** binding the result to `_` drops it immediately, which
/// cancels the subscription right away.
#[must_use]
pub struct Cancellable {
  slot: MutRc<Option<SubscriptionHandle>>,
}

impl Cancellable {
  /// Guards an existing handle.
  pub fn new(handle: SubscriptionHandle) -> Self { Self { slot: MutRc::own(Some(handle)) } }

  /// A guard whose handle is filled in later, once the subscriber receives
  /// it in `on_subscribe`.
  pub(crate) fn pending() -> Self { Self { slot: MutRc::own(None) } }

  pub(crate) fn slot(&self) -> MutRc<Option<SubscriptionHandle>> { self.slot.clone() }

  /// The guarded handle, if the subscription has started.
  pub fn handle(&self) -> Option<SubscriptionHandle> { self.slot.rc_deref().clone() }

  /// Cancels the guarded subscription. Calling it again does nothing.
  pub fn cancel(&self) {
    let handle = self.slot.rc_deref_mut().take();
    if let Some(handle) = handle {
      handle.cancel();
    }
  }

  pub fn is_cancelled(&self) -> bool {
    self
      .slot
      .rc_deref()
      .as_ref()
      .map_or(true, |handle| handle.is_closed())
  }

  /// Moves this guard into `bag`, tying the subscription to the bag's
  /// lifetime.
  pub fn store<B: Extend<Cancellable>>(self, bag: &mut B) { bag.extend(Some(self)); }
}

impl Debug for Cancellable {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Cancellable")
      .field("is_cancelled", &self.is_cancelled())
      .finish()
  }
}

impl Drop for Cancellable {
  fn drop(&mut self) { self.cancel() }
}
