use std::rc::Rc;

use crate::{
  completion::Completion,
  demand::Demand,
  publisher::Publisher,
  subscriber::Subscriber,
  subscription::SubscriptionHandle,
};

type OutputCheck<Item> = Rc<dyn Fn(&Item) -> bool>;
type CompletionCheck<Err> = Rc<dyn Fn(&Completion<Err>) -> bool>;

/// Publisher returned by [`breakpoint`](crate::publisher::PublisherExt::breakpoint)
/// and [`breakpoint_on_error`](crate::publisher::PublisherExt::breakpoint_on_error).
///
/// Stands in for a debugger trap: when a check holds, the current thread
/// panics with `breakpoint hit`.
pub struct Breakpoint<P: Publisher> {
  source: P,
  receive_output: Option<OutputCheck<P::Item>>,
  receive_completion: Option<CompletionCheck<P::Err>>,
}

impl<P: Publisher> Breakpoint<P> {
  pub(crate) fn on_output<F>(source: P, receive_output: F) -> Self
  where
    F: Fn(&P::Item) -> bool + 'static,
  {
    Self { source, receive_output: Some(Rc::new(receive_output)), receive_completion: None }
  }

  pub(crate) fn on_error(source: P) -> Self {
    let is_failure = |completion: &Completion<P::Err>| !completion.is_finished();
    Self { source, receive_output: None, receive_completion: Some(Rc::new(is_failure)) }
  }
}

impl<P> Publisher for Breakpoint<P>
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
    self.source.subscribe(BreakpointSubscriber {
      downstream: subscriber,
      receive_output: self.receive_output.clone(),
      receive_completion: self.receive_completion.clone(),
    })
  }
}

struct BreakpointSubscriber<S, Item, Err> {
  downstream: S,
  receive_output: Option<OutputCheck<Item>>,
  receive_completion: Option<CompletionCheck<Err>>,
}

fn trap(event: &str) -> ! {
  tracing::error!(event, "breakpoint hit");
  panic!("breakpoint hit on {event}")
}

impl<S, Item, Err> Subscriber<Item, Err> for BreakpointSubscriber<S, Item, Err>
where
  S: Subscriber<Item, Err>,
{
  fn on_subscribe(&mut self, subscription: SubscriptionHandle) { self.downstream.on_subscribe(subscription) }

  fn on_value(&mut self, value: Item) -> Demand {
    if self.receive_output.as_ref().is_some_and(|check| check(&value)) {
      trap("output");
    }
    self.downstream.on_value(value)
  }

  fn on_completion(&mut self, completion: Completion<Err>) {
    if self.receive_completion.as_ref().is_some_and(|check| check(&completion)) {
      trap("completion");
    }
    self.downstream.on_completion(completion)
  }
}
