use std::rc::Rc;

use crate::{
  completion::Completion,
  demand::Demand,
  publisher::Publisher,
  subscriber::Subscriber,
  subscription::SubscriptionHandle,
  type_hint::TypeHint,
};

/// Publisher returned by [`map_err`](crate::publisher::PublisherExt::map_err).
pub struct MapErr<P, F, E> {
  source: P,
  func: Rc<F>,
  _hint: TypeHint<E>,
}

impl<P, F, E> MapErr<P, F, E> {
  pub(crate) fn new(source: P, func: F) -> Self { Self { source, func: Rc::new(func), _hint: TypeHint::new() } }
}

impl<P, F, E> Publisher for MapErr<P, F, E>
where
  P: Publisher,
  F: Fn(P::Err) -> E + 'static,
{
  type Item = P::Item;
  type Err = E;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<P::Item, E> + 'static,
  {
    self
      .source
      .subscribe(MapErrSubscriber { downstream: subscriber, func: self.func.clone() })
  }
}

pub struct MapErrSubscriber<S, F> {
  downstream: S,
  func: Rc<F>,
}

impl<Item, Err, E, S, F> Subscriber<Item, Err> for MapErrSubscriber<S, F>
where
  S: Subscriber<Item, E>,
  F: Fn(Err) -> E,
{
  fn on_subscribe(&mut self, subscription: SubscriptionHandle) { self.downstream.on_subscribe(subscription) }

  fn on_value(&mut self, value: Item) -> Demand { self.downstream.on_value(value) }

  fn on_completion(&mut self, completion: Completion<Err>) {
    let func = &self.func;
    self.downstream.on_completion(completion.map_failure(|err| func(err)))
  }
}
