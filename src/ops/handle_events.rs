use std::{cell::Cell, rc::Rc};

use crate::{
  completion::Completion,
  demand::Demand,
  publisher::Publisher,
  subscriber::Subscriber,
  subscription::{Subscription, SubscriptionHandle},
};

/// Side effects run by [`handle_events`](crate::publisher::PublisherExt::handle_events).
///
/// Every hook is optional. Hooks run before the event is passed on.
///
/// ```rust
/// use rxdemand::prelude::*;
///
/// let handlers = EventHandlers::new()
///   .on_output(|v: &i32| println!("got {v}"))
///   .on_completion(|c: &Completion<Infallible>| println!("done: {c}"));
/// let _guard = from_iter(1..=3).handle_events(handlers).sink_value(|_| {});
/// ```
pub struct EventHandlers<Item, Err> {
  receive_subscription: Option<Rc<dyn Fn(&SubscriptionHandle)>>,
  receive_output: Option<Rc<dyn Fn(&Item)>>,
  receive_completion: Option<Rc<dyn Fn(&Completion<Err>)>>,
  receive_cancel: Option<Rc<dyn Fn()>>,
  receive_request: Option<Rc<dyn Fn(Demand)>>,
}

impl<Item, Err> Default for EventHandlers<Item, Err> {
  fn default() -> Self {
    Self {
      receive_subscription: None,
      receive_output: None,
      receive_completion: None,
      receive_cancel: None,
      receive_request: None,
    }
  }
}

impl<Item, Err> Clone for EventHandlers<Item, Err> {
  fn clone(&self) -> Self {
    Self {
      receive_subscription: self.receive_subscription.clone(),
      receive_output: self.receive_output.clone(),
      receive_completion: self.receive_completion.clone(),
      receive_cancel: self.receive_cancel.clone(),
      receive_request: self.receive_request.clone(),
    }
  }
}

impl<Item, Err> EventHandlers<Item, Err> {
  pub fn new() -> Self { Self::default() }

  pub fn on_subscription(mut self, f: impl Fn(&SubscriptionHandle) + 'static) -> Self {
    self.receive_subscription = Some(Rc::new(f));
    self
  }

  pub fn on_output(mut self, f: impl Fn(&Item) + 'static) -> Self {
    self.receive_output = Some(Rc::new(f));
    self
  }

  pub fn on_completion(mut self, f: impl Fn(&Completion<Err>) + 'static) -> Self {
    self.receive_completion = Some(Rc::new(f));
    self
  }

  pub fn on_cancel(mut self, f: impl Fn() + 'static) -> Self {
    self.receive_cancel = Some(Rc::new(f));
    self
  }

  /// Called for `request` calls and for non-zero demand returned from
  /// `on_value`.
  pub fn on_request(mut self, f: impl Fn(Demand) + 'static) -> Self {
    self.receive_request = Some(Rc::new(f));
    self
  }
}

/// Publisher returned by
/// [`handle_events`](crate::publisher::PublisherExt::handle_events).
pub struct HandleEvents<P: Publisher> {
  source: P,
  handlers: EventHandlers<P::Item, P::Err>,
}

impl<P: Publisher> HandleEvents<P> {
  pub(crate) fn new(source: P, handlers: EventHandlers<P::Item, P::Err>) -> Self { Self { source, handlers } }
}

impl<P> Publisher for HandleEvents<P>
where
  P: Publisher,
  P::Item: 'static,
  P::Err: 'static,
{
  type Item = P::Item;
  type Err = P::Err;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<P::Item, P::Err> + 'static,
  {
    self
      .source
      .subscribe(HandleEventsSubscriber { downstream: subscriber, handlers: self.handlers.clone() })
  }
}

struct HandleEventsSubscriber<S, Item, Err> {
  downstream: S,
  handlers: EventHandlers<Item, Err>,
}

impl<S, Item, Err> Subscriber<Item, Err> for HandleEventsSubscriber<S, Item, Err>
where
  S: Subscriber<Item, Err>,
{
  fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
    if let Some(f) = &self.handlers.receive_subscription {
      f(&subscription);
    }
    let interceptor = Rc::new(Interceptor {
      upstream: subscription,
      receive_cancel: self.handlers.receive_cancel.clone(),
      receive_request: self.handlers.receive_request.clone(),
      cancelled: Cell::new(false),
    });
    self.downstream.on_subscribe(interceptor)
  }

  fn on_value(&mut self, value: Item) -> Demand {
    if let Some(f) = &self.handlers.receive_output {
      f(&value);
    }
    let demand = self.downstream.on_value(value);
    if demand.has_demand() {
      if let Some(f) = &self.handlers.receive_request {
        f(demand);
      }
    }
    demand
  }

  fn on_completion(&mut self, completion: Completion<Err>) {
    if let Some(f) = &self.handlers.receive_completion {
      f(&completion);
    }
    self.downstream.on_completion(completion)
  }
}

struct Interceptor {
  upstream: SubscriptionHandle,
  receive_cancel: Option<Rc<dyn Fn()>>,
  receive_request: Option<Rc<dyn Fn(Demand)>>,
  cancelled: Cell<bool>,
}

impl Subscription for Interceptor {
  fn request(&self, demand: Demand) {
    if self.is_closed() {
      return;
    }
    if let Some(f) = &self.receive_request {
      f(demand);
    }
    self.upstream.request(demand)
  }

  fn cancel(&self) {
    if self.cancelled.replace(true) {
      return;
    }
    if let Some(f) = &self.receive_cancel {
      f();
    }
    self.upstream.cancel()
  }

  fn is_closed(&self) -> bool { self.cancelled.get() || self.upstream.is_closed() }

  fn name(&self) -> &'static str { self.upstream.name() }
}
