use std::rc::Rc;

use crate::{
  completion::Completion,
  demand::Demand,
  publisher::Publisher,
  subscriber::Subscriber,
  subscription::SubscriptionHandle,
  type_hint::TypeHint,
};

/// Publisher returned by [`map`](crate::publisher::PublisherExt::map).
pub struct Map<P, F, Out> {
  source: P,
  func: Rc<F>,
  _hint: TypeHint<Out>,
}

impl<P, F, Out> Map<P, F, Out> {
  pub(crate) fn new(source: P, func: F) -> Self { Self { source, func: Rc::new(func), _hint: TypeHint::new() } }
}

impl<P: Clone, F, Out> Clone for Map<P, F, Out> {
  fn clone(&self) -> Self { Self { source: self.source.clone(), func: self.func.clone(), _hint: TypeHint::new() } }
}

impl<P, F, Out> Publisher for Map<P, F, Out>
where
  P: Publisher,
  F: Fn(P::Item) -> Out + 'static,
{
  type Item = Out;
  type Err = P::Err;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<Out, P::Err> + 'static,
  {
    self
      .source
      .subscribe(MapSubscriber { downstream: subscriber, func: self.func.clone() })
  }
}

pub struct MapSubscriber<S, F> {
  downstream: S,
  func: Rc<F>,
}

impl<Item, Err, Out, S, F> Subscriber<Item, Err> for MapSubscriber<S, F>
where
  S: Subscriber<Out, Err>,
  F: Fn(Item) -> Out,
{
  #[inline]
  fn on_subscribe(&mut self, subscription: SubscriptionHandle) { self.downstream.on_subscribe(subscription) }

  #[inline]
  fn on_value(&mut self, value: Item) -> Demand { self.downstream.on_value((self.func)(value)) }

  #[inline]
  fn on_completion(&mut self, completion: Completion<Err>) { self.downstream.on_completion(completion) }
}
