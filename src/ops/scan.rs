use std::rc::Rc;

use crate::{
  completion::Completion,
  demand::Demand,
  publisher::Publisher,
  subscriber::Subscriber,
  subscription::SubscriptionHandle,
};

/// Publisher returned by [`scan`](crate::publisher::PublisherExt::scan).
///
/// Every subscription starts from a clone of `initial`.
pub struct Scan<P, Acc, F> {
  source: P,
  initial: Acc,
  func: Rc<F>,
}

impl<P, Acc, F> Scan<P, Acc, F> {
  pub(crate) fn new(source: P, initial: Acc, func: F) -> Self { Self { source, initial, func: Rc::new(func) } }
}

impl<P, Acc, F> Publisher for Scan<P, Acc, F>
where
  P: Publisher,
  Acc: Clone + 'static,
  F: Fn(Acc, P::Item) -> Acc + 'static,
{
  type Item = Acc;
  type Err = P::Err;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<Acc, P::Err> + 'static,
  {
    self.source.subscribe(ScanSubscriber {
      downstream: subscriber,
      acc: Some(self.initial.clone()),
      func: self.func.clone(),
    })
  }
}

pub struct ScanSubscriber<S, Acc, F> {
  downstream: S,
  acc: Option<Acc>,
  func: Rc<F>,
}

impl<Item, Err, S, Acc, F> Subscriber<Item, Err> for ScanSubscriber<S, Acc, F>
where
  S: Subscriber<Acc, Err>,
  Acc: Clone,
  F: Fn(Acc, Item) -> Acc,
{
  fn on_subscribe(&mut self, subscription: SubscriptionHandle) { self.downstream.on_subscribe(subscription) }

  fn on_value(&mut self, value: Item) -> Demand {
    let Some(acc) = self.acc.take() else { return Demand::NONE };
    let next = (self.func)(acc, value);
    self.acc = Some(next.clone());
    self.downstream.on_value(next)
  }

  fn on_completion(&mut self, completion: Completion<Err>) { self.downstream.on_completion(completion) }
}
