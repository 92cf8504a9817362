use std::{
  cell::{Cell, RefCell},
  rc::Rc,
};

use crate::{
  completion::Completion,
  demand::Demand,
  rc::{MutRc, WeakMutRc},
  subscriber::Subscriber,
  subscription::{Conduit, DynamicSubscriptions, Subscription, SubscriptionHandle},
};

// ============================================================================
// Shared state
// ============================================================================

struct SubjectState<Item, Err> {
  subscriptions: DynamicSubscriptions<Rc<SubjectSubscription<Item, Err>>>,
  completion: Option<Completion<Err>>,
}

/// Broadcast machinery shared by the subject types.
///
/// The state borrow is released before any subscriber is called: `send`
/// snapshots the attached subscriptions first, so subscribers may subscribe,
/// cancel or send again from inside their callbacks.
pub struct SubjectCore<Item, Err> {
  state: MutRc<SubjectState<Item, Err>>,
}

impl<Item, Err> Clone for SubjectCore<Item, Err> {
  fn clone(&self) -> Self { Self { state: self.state.clone() } }
}

impl<Item, Err> Default for SubjectCore<Item, Err> {
  fn default() -> Self {
    Self {
      state: MutRc::own(SubjectState { subscriptions: DynamicSubscriptions::new(), completion: None }),
    }
  }
}

impl<Item, Err> SubjectCore<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  pub fn new() -> Self { Self::default() }

  /// Attaches `subscriber`. `replay` is delivered first, as soon as the
  /// subscriber has demand for it.
  pub fn subscribe_with<S>(&self, subscriber: S, replay: Option<Item>, name: &'static str)
  where
    S: Subscriber<Item, Err> + 'static,
  {
    let subscription = Rc::new(SubjectSubscription {
      conduit: Conduit::new(),
      replay: RefCell::new(replay),
      subject: self.state.downgrade(),
      id: Cell::new(None),
      name,
    });
    let handle: SubscriptionHandle = subscription.clone();

    let completion = self.state.rc_deref().completion.clone();
    if let Some(completion) = completion {
      // Late subscriber: `on_subscribe`, then the stored completion.
      subscription.conduit.complete(completion);
      subscription.conduit.open(subscriber, handle);
      return;
    }

    let id = self.state.rc_deref_mut().subscriptions.add(subscription.clone());
    subscription.id.set(Some(id));
    subscription.conduit.open(subscriber, handle);
    subscription.flush_replay();
  }

  pub fn send(&self, value: Item) {
    let targets: Vec<_> = {
      let mut state = self.state.rc_deref_mut();
      if state.completion.is_some() {
        tracing::warn!("value sent to a completed subject is ignored");
        return;
      }
      state.subscriptions.retain(|s| s.conduit.is_active());
      state.subscriptions.iter().cloned().collect()
    };
    tracing::trace!(subscribers = targets.len(), "subject send");

    if let Some((last, rest)) = targets.split_last() {
      for subscription in rest {
        subscription.deliver(value.clone());
      }
      last.deliver(value);
    }
  }

  pub fn send_completion(&self, completion: Completion<Err>) {
    let targets: Vec<_> = {
      let mut state = self.state.rc_deref_mut();
      if state.completion.is_some() {
        tracing::warn!("subject already completed");
        return;
      }
      state.completion = Some(completion.clone());
      state.subscriptions.drain().collect()
    };
    tracing::debug!(subscribers = targets.len(), "subject completed");

    for subscription in targets {
      subscription.id.set(None);
      subscription.conduit.complete(completion.clone());
    }
  }

  /// Number of attached subscriptions that are still active.
  pub fn subscriber_count(&self) -> usize {
    self
      .state
      .rc_deref()
      .subscriptions
      .iter()
      .filter(|s| s.conduit.is_active())
      .count()
  }

  pub fn is_completed(&self) -> bool { self.state.rc_deref().completion.is_some() }
}

// ============================================================================
// Per-subscriber subscription
// ============================================================================

struct SubjectSubscription<Item, Err> {
  conduit: Conduit<Item, Err>,
  replay: RefCell<Option<Item>>,
  subject: WeakMutRc<SubjectState<Item, Err>>,
  id: Cell<Option<usize>>,
  name: &'static str,
}

impl<Item, Err> SubjectSubscription<Item, Err> {
  fn deliver(&self, value: Item) {
    {
      let mut replay = self.replay.borrow_mut();
      if replay.is_some() {
        *replay = Some(value);
        return;
      }
    }
    self.conduit.offer(value);
  }

  fn flush_replay(&self) {
    if !self.conduit.is_ready() {
      return;
    }
    let replay = self.replay.borrow_mut().take();
    if let Some(value) = replay {
      self.conduit.offer(value);
    }
  }

  fn detach(&self) {
    let Some(id) = self.id.take() else { return };
    if let Some(state) = self.subject.upgrade() {
      // A busy subject prunes inactive entries on its next send.
      if let Some(mut state) = state.try_rc_deref_mut() {
        state.subscriptions.remove(id);
      }
    }
  }
}

impl<Item, Err> Subscription for SubjectSubscription<Item, Err> {
  fn request(&self, demand: Demand) {
    if !demand.has_demand() {
      return;
    }
    self.conduit.add_demand(demand);
    self.flush_replay();
  }

  fn cancel(&self) {
    if self.conduit.cancel() {
      self.replay.borrow_mut().take();
      self.detach();
    }
  }

  fn is_closed(&self) -> bool { !self.conduit.is_active() }

  fn name(&self) -> &'static str { self.name }
}
