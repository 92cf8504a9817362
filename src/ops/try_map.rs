use std::rc::Rc;

use crate::{
  completion::Completion,
  demand::Demand,
  publisher::Publisher,
  subscriber::Subscriber,
  subscription::SubscriptionHandle,
  type_hint::TypeHint,
};

/// Publisher returned by [`try_map`](crate::publisher::PublisherExt::try_map).
pub struct TryMap<P, F, Out, E> {
  source: P,
  func: Rc<F>,
  _hint: TypeHint<(Out, E)>,
}

impl<P, F, Out, E> TryMap<P, F, Out, E> {
  pub(crate) fn new(source: P, func: F) -> Self { Self { source, func: Rc::new(func), _hint: TypeHint::new() } }
}

impl<P, F, Out, E> Publisher for TryMap<P, F, Out, E>
where
  P: Publisher,
  P::Err: Into<E>,
  F: Fn(P::Item) -> Result<Out, E> + 'static,
{
  type Item = Out;
  type Err = E;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<Out, E> + 'static,
  {
    self.source.subscribe(TryMapSubscriber::new(subscriber, self.func.clone()))
  }
}

/// Forwards mapped values until the first failed mapping. That failure
/// cancels the upstream and completes the downstream; anything the upstream
/// still delivers afterwards is ignored.
pub struct TryMapSubscriber<S, F> {
  downstream: S,
  func: Rc<F>,
  upstream: Option<SubscriptionHandle>,
  done: bool,
}

impl<S, F> TryMapSubscriber<S, F> {
  pub(crate) fn new(downstream: S, func: Rc<F>) -> Self { Self { downstream, func, upstream: None, done: false } }
}

impl<Item, Err, Out, E, S, F> Subscriber<Item, Err> for TryMapSubscriber<S, F>
where
  S: Subscriber<Out, E>,
  F: Fn(Item) -> Result<Out, E>,
  Err: Into<E>,
{
  fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
    self.upstream = Some(subscription.clone());
    self.downstream.on_subscribe(subscription)
  }

  fn on_value(&mut self, value: Item) -> Demand {
    if self.done {
      return Demand::NONE;
    }
    match (self.func)(value) {
      Ok(out) => self.downstream.on_value(out),
      Err(err) => {
        self.done = true;
        if let Some(upstream) = self.upstream.take() {
          upstream.cancel();
        }
        self.downstream.on_completion(Completion::Failure(err));
        Demand::NONE
      }
    }
  }

  fn on_completion(&mut self, completion: Completion<Err>) {
    if self.done {
      return;
    }
    self.done = true;
    self.upstream = None;
    self.downstream.on_completion(completion.map_failure(Into::into))
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[derive(Debug, Clone, PartialEq)]
  struct TooBig(i32);

  impl From<Infallible> for TooBig {
    fn from(never: Infallible) -> Self { match never {} }
  }

  #[test]
  fn first_error_fails_and_stops() {
    let seen = Rc::new(RefCell::new(vec![]));
    let completions = Rc::new(RefCell::new(vec![]));
    let (c_seen, c_completions) = (seen.clone(), completions.clone());
    let _guard = from_iter(1..=5)
      .try_map(|v| if v < 3 { Ok(v * 2) } else { Err(TooBig(v)) })
      .sink(
        move |c| c_completions.borrow_mut().push(c),
        move |v| c_seen.borrow_mut().push(v),
      );
    assert_eq!(*seen.borrow(), vec![2, 4]);
    assert_eq!(*completions.borrow(), vec![Completion::Failure(TooBig(3))]);
  }

  #[test]
  fn cancels_the_upstream() {
    let subject = PassthroughSubject::<i32, Infallible>::new();
    let completions = Rc::new(RefCell::new(0));
    let c_completions = completions.clone();
    let _guard = subject
      .clone()
      .try_map(|v| if v > 0 { Ok(v) } else { Err(TooBig(v)) })
      .sink(move |_| *c_completions.borrow_mut() += 1, |_| {});

    subject.send(1);
    subject.send(-1);
    assert_eq!(subject.subscriber_count(), 0);
    subject.send(2);
    subject.send_completion(Completion::Finished);
    assert_eq!(*completions.borrow(), 1);
  }

  #[test]
  fn upstream_finish_passes_through() {
    let completions = Rc::new(RefCell::new(vec![]));
    let c_completions = completions.clone();
    let _guard = just(1)
      .try_map(|v| Ok::<_, TooBig>(v))
      .sink(move |c| c_completions.borrow_mut().push(c), |_| {});
    assert_eq!(*completions.borrow(), vec![Completion::Finished]);
  }
}
