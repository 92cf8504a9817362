use std::{cell::Cell, rc::Rc};

use crate::{
  completion::Completion,
  demand::Demand,
  publisher::Publisher,
  rc::MutRc,
  subject::Subject,
  subscriber::Subscriber,
  subscription::{Cancellable, EmptySubscription, Subscription, SubscriptionHandle},
};

/// A publisher whose upstream work starts on an explicit `connect`.
pub trait ConnectablePublisher: Publisher {
  /// Starts the upstream. While a connection is live, calling it again
  /// returns a guard over that same connection.
  fn connect(&self) -> Cancellable;

  /// Connects automatically on the first subscription.
  fn autoconnect(self) -> Autoconnect<Self>
  where
    Self: Sized,
  {
    Autoconnect { inner: self, state: MutRc::own(AutoconnectState::default()) }
  }
}

/// Shares one upstream subscription among the subscribers of a subject.
///
/// Subscribing attaches to the subject only. The upstream is subscribed once,
/// on [`connect`](ConnectablePublisher::connect), with unlimited demand, and
/// everything it emits is sent through the subject.
///
/// ```rust
/// use std::convert::Infallible;
///
/// use rxdemand::prelude::*;
///
/// let shared = from_iter(1..=3).multicast(PassthroughSubject::<i32, Infallible>::new());
/// let _a = shared.sink_value(|v| println!("a: {v}"));
/// let _b = shared.sink_value(|v| println!("b: {v}"));
/// let _connection = shared.connect();
/// ```
pub struct Multicast<P, S> {
  source: P,
  subject: S,
  connection: MutRc<Option<SubscriptionHandle>>,
}

impl<P, S> Multicast<P, S> {
  pub(crate) fn new(source: P, subject: S) -> Self { Self { source, subject, connection: MutRc::own(None) } }

  fn live_connection(&self) -> Option<SubscriptionHandle> {
    self
      .connection
      .rc_deref()
      .as_ref()
      .filter(|handle| !handle.is_closed())
      .cloned()
  }
}

impl<P, S> Publisher for Multicast<P, S>
where
  S: Subject,
{
  type Item = S::Item;
  type Err = S::Err;

  fn subscribe<O>(&self, subscriber: O)
  where
    O: Subscriber<S::Item, S::Err> + 'static,
  {
    self.subject.subscribe(subscriber)
  }
}

impl<P, S> ConnectablePublisher for Multicast<P, S>
where
  P: Publisher<Item = S::Item, Err = S::Err>,
  S: Subject + Clone + 'static,
{
  fn connect(&self) -> Cancellable {
    if let Some(live) = self.live_connection() {
      tracing::debug!("multicast already connected");
      return Cancellable::new(live);
    }
    tracing::debug!("multicast connect");
    self
      .source
      .subscribe(SubjectForwarder { subject: self.subject.clone(), connection: self.connection.clone() });
    let handle = self.connection.rc_deref().clone();
    Cancellable::new(handle.unwrap_or_else(|| Rc::new(EmptySubscription)))
  }
}

/// Upstream subscriber of a connected [`Multicast`].
struct SubjectForwarder<S> {
  subject: S,
  connection: MutRc<Option<SubscriptionHandle>>,
}

impl<S: Subject> Subscriber<S::Item, S::Err> for SubjectForwarder<S> {
  fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
    *self.connection.rc_deref_mut() = Some(subscription.clone());
    subscription.request(Demand::unlimited())
  }

  fn on_value(&mut self, value: S::Item) -> Demand {
    self.subject.send(value);
    Demand::NONE
  }

  fn on_completion(&mut self, completion: Completion<S::Err>) {
    self.connection.rc_deref_mut().take();
    self.subject.send_completion(completion)
  }
}

/// Publisher returned by [`autoconnect`](ConnectablePublisher::autoconnect).
///
/// The first subscriber connects the upstream. The connection is owned by
/// the subscriptions, not by this value, so a chain built from a temporary
/// `autoconnect()` keeps running. It is cancelled once the last subscriber
/// cancels or completes, and the next subscriber connects again.
pub struct Autoconnect<C> {
  inner: C,
  state: MutRc<AutoconnectState>,
}

#[derive(Default)]
struct AutoconnectState {
  connection: Option<Cancellable>,
  subscribers: usize,
}

impl<C: Clone> Clone for Autoconnect<C> {
  fn clone(&self) -> Self { Self { inner: self.inner.clone(), state: self.state.clone() } }
}

impl<C: ConnectablePublisher> Publisher for Autoconnect<C> {
  type Item = C::Item;
  type Err = C::Err;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<C::Item, C::Err> + 'static,
  {
    self.state.rc_deref_mut().subscribers += 1;
    let ticket = Rc::new(Ticket { state: self.state.clone(), released: Cell::new(false) });
    self.inner.subscribe(Counted { downstream: subscriber, ticket });

    let connect = {
      let state = self.state.rc_deref();
      state.subscribers > 0 && state.connection.as_ref().map_or(true, Cancellable::is_cancelled)
    };
    if connect {
      let connection = self.inner.connect();
      let mut state = self.state.rc_deref_mut();
      // A synchronous upstream may already have finished every subscriber.
      if state.subscribers > 0 {
        state.connection = Some(connection);
      }
    }
  }
}

/// One subscriber's share of an [`Autoconnect`] connection.
struct Ticket {
  state: MutRc<AutoconnectState>,
  released: Cell<bool>,
}

impl Ticket {
  fn release(&self) {
    if self.released.replace(true) {
      return;
    }
    let last = {
      let mut state = self.state.rc_deref_mut();
      state.subscribers = state.subscribers.saturating_sub(1);
      if state.subscribers == 0 { state.connection.take() } else { None }
    };
    if let Some(connection) = last {
      tracing::debug!("autoconnect released by its last subscriber");
      connection.cancel();
    }
  }
}

struct Counted<S> {
  downstream: S,
  ticket: Rc<Ticket>,
}

impl<S, Item, Err> Subscriber<Item, Err> for Counted<S>
where
  S: Subscriber<Item, Err>,
{
  fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
    self
      .downstream
      .on_subscribe(Rc::new(CountedSubscription { upstream: subscription, ticket: self.ticket.clone() }))
  }

  fn on_value(&mut self, value: Item) -> Demand { self.downstream.on_value(value) }

  fn on_completion(&mut self, completion: Completion<Err>) {
    self.downstream.on_completion(completion);
    self.ticket.release()
  }
}

/// Handed downstream in place of the subject's subscription. Holding it
/// keeps the shared connection alive.
struct CountedSubscription {
  upstream: SubscriptionHandle,
  ticket: Rc<Ticket>,
}

impl Subscription for CountedSubscription {
  fn request(&self, demand: Demand) { self.upstream.request(demand) }

  fn cancel(&self) {
    self.upstream.cancel();
    self.ticket.release()
  }

  fn is_closed(&self) -> bool { self.upstream.is_closed() }

  fn name(&self) -> &'static str { self.upstream.name() }
}
