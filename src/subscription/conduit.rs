use std::cell::{Cell, RefCell};

use crate::{
  completion::Completion,
  demand::Demand,
  subscriber::{BoxedSubscriber, Subscriber},
  subscription::SubscriptionHandle,
};

/// Lifecycle of a [`Conduit`]. Both terminal states are one-way.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ConduitState {
  Active,
  Cancelled,
  Completed,
}

/// Per-subscription delivery state shared by every publisher in this crate.
///
/// A conduit owns the subscriber and its outstanding demand, and enforces the
/// subscriber contract: values only while demand is positive, completion at
/// most once, nothing after cancel.
///
/// No borrow is held while a subscriber callback runs. The subscriber is
/// moved out of the conduit for the duration of the call and put back
/// afterwards, so callbacks may freely `request`, `cancel` or trigger more
/// sends. A value offered to a subscriber that is currently inside one of its
/// own callbacks is dropped rather than delivered recursively. A completion
/// that arrives at that moment is held and delivered as soon as the callback
/// returns.
pub struct Conduit<Item, Err> {
  subscriber: RefCell<Option<BoxedSubscriber<Item, Err>>>,
  demand: Cell<Demand>,
  state: Cell<ConduitState>,
  pending_completion: RefCell<Option<Completion<Err>>>,
}

impl<Item, Err> Default for Conduit<Item, Err> {
  fn default() -> Self {
    Self {
      subscriber: RefCell::new(None),
      demand: Cell::new(Demand::NONE),
      state: Cell::new(ConduitState::Active),
      pending_completion: RefCell::new(None),
    }
  }
}

impl<Item, Err> Conduit<Item, Err> {
  pub fn new() -> Self { Self::default() }

  #[inline]
  pub fn demand(&self) -> Demand { self.demand.get() }

  #[inline]
  pub fn state(&self) -> ConduitState { self.state.get() }

  #[inline]
  pub fn is_active(&self) -> bool { self.state.get() == ConduitState::Active }

  /// Whether [`offer`](Conduit::offer) would reach the subscriber right now.
  pub fn is_ready(&self) -> bool {
    self.is_active()
      && self.demand.get().has_demand()
      && self
        .subscriber
        .try_borrow()
        .map_or(false, |subscriber| subscriber.is_some())
  }

  /// Calls `on_subscribe` with `handle`, then takes ownership of the
  /// subscriber. Demand requested inside `on_subscribe` is recorded; delivery
  /// can start once this returns.
  pub fn open<S>(&self, mut subscriber: S, handle: SubscriptionHandle)
  where
    S: Subscriber<Item, Err> + 'static,
  {
    subscriber.on_subscribe(handle);
    self.restore(Box::new(subscriber));
  }

  /// Adds demand. Does nothing once the conduit is closed.
  pub fn add_demand(&self, demand: Demand) {
    if self.is_active() {
      self.demand.set(self.demand.get() + demand);
    }
  }

  /// Delivers `value` if the subscriber can take it. Returns whether it was
  /// delivered; an undelivered value is dropped.
  pub fn offer(&self, value: Item) -> bool {
    if !self.is_active() || !self.demand.get().has_demand() {
      return false;
    }
    let Some(mut subscriber) = self.subscriber.borrow_mut().take() else {
      return false;
    };
    self.demand.set(self.demand.get().consume_one());
    let additional = subscriber.on_value(value);
    self.add_demand(additional);
    self.restore(subscriber);
    true
  }

  /// Delivers the terminal signal. Returns `false` when the conduit was
  /// already closed.
  pub fn complete(&self, completion: Completion<Err>) -> bool {
    if !self.is_active() {
      return false;
    }
    self.state.set(ConduitState::Completed);
    self.demand.set(Demand::NONE);
    let subscriber = self.subscriber.borrow_mut().take();
    match subscriber {
      Some(mut subscriber) => subscriber.on_completion(completion),
      None => *self.pending_completion.borrow_mut() = Some(completion),
    }
    true
  }

  /// Closes the conduit and drops the subscriber. Returns `false` when it
  /// was already closed.
  pub fn cancel(&self) -> bool {
    if !self.is_active() {
      return false;
    }
    self.state.set(ConduitState::Cancelled);
    self.demand.set(Demand::NONE);
    let subscriber = self.subscriber.borrow_mut().take();
    drop(subscriber);
    true
  }

  fn restore(&self, mut subscriber: BoxedSubscriber<Item, Err>) {
    match self.state.get() {
      ConduitState::Active => *self.subscriber.borrow_mut() = Some(subscriber),
      ConduitState::Cancelled => {}
      ConduitState::Completed => {
        let pending = self.pending_completion.borrow_mut().take();
        if let Some(completion) = pending {
          subscriber.on_completion(completion);
        }
      }
    }
  }
}
