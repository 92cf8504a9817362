use std::rc::Rc;

use crate::{
  publisher::Publisher,
  subscriber::{BoxedSubscriber, Subscriber},
};

/// Object-safe counterpart of [`Publisher`], implemented for every
/// publisher.
pub trait DynPublisher<Item, Err> {
  fn dyn_subscribe(&self, subscriber: BoxedSubscriber<Item, Err>);
}

impl<P> DynPublisher<P::Item, P::Err> for P
where
  P: Publisher,
  P::Item: 'static,
  P::Err: 'static,
{
  #[inline]
  fn dyn_subscribe(&self, subscriber: BoxedSubscriber<P::Item, P::Err>) { self.subscribe(subscriber) }
}

/// A publisher whose concrete type is hidden.
///
/// Cloning is cheap and every clone subscribes to the same wrapped
/// publisher. Behavior is exactly that of the wrapped publisher.
///
/// ```rust
/// use std::convert::Infallible;
///
/// use rxdemand::prelude::*;
///
/// fn numbers(even: bool) -> AnyPublisher<i32, Infallible> {
///   if even {
///     from_iter(vec![0, 2, 4]).erase()
///   } else {
///     from_iter(vec![1, 3, 5]).map(|v| v * 10).erase()
///   }
/// }
///
/// let _print = numbers(false).sink_value(|v| println!("{v}"));
/// ```
pub struct AnyPublisher<Item, Err>(Rc<dyn DynPublisher<Item, Err>>);

impl<Item, Err> AnyPublisher<Item, Err> {
  pub fn new<P>(publisher: P) -> Self
  where
    P: Publisher<Item = Item, Err = Err> + 'static,
    Item: 'static,
    Err: 'static,
  {
    AnyPublisher(Rc::new(publisher))
  }
}

impl<Item, Err> Clone for AnyPublisher<Item, Err> {
  fn clone(&self) -> Self { AnyPublisher(self.0.clone()) }
}

impl<Item, Err> Publisher for AnyPublisher<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<Item, Err> + 'static,
  {
    self.0.dyn_subscribe(Box::new(subscriber))
  }
}
