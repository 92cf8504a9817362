use std::{cell::Cell, fmt::Debug, rc::Rc};

use crate::{
  completion::Completion,
  demand::Demand,
  publisher::Publisher,
  rc::MutRc,
  subscriber::Subscriber,
  subscription::{Subscription, SubscriptionHandle},
  text_output::TextOutput,
};

/// Publisher returned by [`print`](crate::publisher::PublisherExt::print)
/// and [`print_to`](crate::publisher::PublisherExt::print_to).
///
/// Writes one line per lifecycle event:
///
/// ```text
/// numbers: receive subscription: (Sequence)
/// numbers: request unlimited
/// numbers: receive value: (1)
/// numbers: receive finished
/// ```
pub struct Print<P> {
  source: P,
  printer: Rc<Printer>,
}

impl<P> Print<P> {
  pub(crate) fn new<W: TextOutput + 'static>(source: P, prefix: String, output: W) -> Self {
    let output: Box<dyn TextOutput> = Box::new(output);
    Self { source, printer: Rc::new(Printer { prefix, output: MutRc::own(output) }) }
  }
}

struct Printer {
  prefix: String,
  output: MutRc<Box<dyn TextOutput>>,
}

impl Printer {
  fn line(&self, text: &str) {
    let line = if self.prefix.is_empty() { text.to_owned() } else { format!("{}: {text}", self.prefix) };
    // Output re-entered from its own write is dropped.
    if let Some(mut output) = self.output.try_rc_deref_mut() {
      output.write(&line);
    }
  }

  fn request(&self, demand: Demand, synchronous: bool) {
    let mut text = match demand {
      Demand::Unlimited => "request unlimited".to_owned(),
      Demand::Max(n) => format!("request max: ({n})"),
    };
    if synchronous {
      text.push_str(" (synchronous)");
    }
    self.line(&text);
  }
}

impl<P> Publisher for Print<P>
where
  P: Publisher,
  P::Item: Debug,
  P::Err: Debug,
{
  type Item = P::Item;
  type Err = P::Err;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<P::Item, P::Err> + 'static,
  {
    self
      .source
      .subscribe(PrintSubscriber { downstream: subscriber, printer: self.printer.clone() })
  }
}

struct PrintSubscriber<S> {
  downstream: S,
  printer: Rc<Printer>,
}

impl<Item, Err, S> Subscriber<Item, Err> for PrintSubscriber<S>
where
  S: Subscriber<Item, Err>,
  Item: Debug,
  Err: Debug,
{
  fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
    self.printer.line(&format!("receive subscription: ({})", subscription.name()));
    let printing = Rc::new(PrintSubscription {
      upstream: subscription,
      printer: self.printer.clone(),
      cancelled: Cell::new(false),
    });
    self.downstream.on_subscribe(printing)
  }

  fn on_value(&mut self, value: Item) -> Demand {
    self.printer.line(&format!("receive value: ({value:?})"));
    let demand = self.downstream.on_value(value);
    if demand.has_demand() {
      self.printer.request(demand, true);
    }
    demand
  }

  fn on_completion(&mut self, completion: Completion<Err>) {
    match &completion {
      Completion::Finished => self.printer.line("receive finished"),
      Completion::Failure(err) => self.printer.line(&format!("receive error: ({err:?})")),
    }
    self.downstream.on_completion(completion)
  }
}

struct PrintSubscription {
  upstream: SubscriptionHandle,
  printer: Rc<Printer>,
  cancelled: Cell<bool>,
}

impl Subscription for PrintSubscription {
  fn request(&self, demand: Demand) {
    if self.is_closed() {
      return;
    }
    self.printer.request(demand, false);
    self.upstream.request(demand)
  }

  fn cancel(&self) {
    if self.cancelled.replace(true) {
      return;
    }
    self.printer.line("receive cancel");
    self.upstream.cancel()
  }

  fn is_closed(&self) -> bool { self.cancelled.get() || self.upstream.is_closed() }

  fn name(&self) -> &'static str { self.upstream.name() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn prints_the_lifecycle() {
    let lines = Rc::new(RefCell::new(Vec::<String>::new()));
    let _guard = from_iter(1..=2).print_to("numbers", lines.clone()).sink_value(|_| {});
    assert_eq!(
      *lines.borrow(),
      vec![
        "numbers: receive subscription: (Sequence)",
        "numbers: request unlimited",
        "numbers: receive value: (1)",
        "numbers: receive value: (2)",
        "numbers: receive finished",
      ]
    );
  }

  struct OneByOne;

  impl Subscriber<i32, &'static str> for OneByOne {
    fn on_subscribe(&mut self, subscription: SubscriptionHandle) { subscription.request(Demand::max(1)) }

    fn on_value(&mut self, _value: i32) -> Demand { Demand::max(1) }

    fn on_completion(&mut self, _completion: Completion<&'static str>) {}
  }

  #[test]
  fn prints_synchronous_demand_and_errors() {
    let lines = Rc::new(RefCell::new(Vec::<String>::new()));
    let subject = PassthroughSubject::<i32, &'static str>::new();
    subject.clone().print_to("", lines.clone()).subscribe(OneByOne);
    subject.send(5);
    subject.send_completion(Completion::Failure("boom"));
    assert_eq!(
      *lines.borrow(),
      vec![
        "receive subscription: (PassthroughSubject)",
        "request max: (1)",
        "receive value: (5)",
        "request max: (1) (synchronous)",
        "receive error: (\"boom\")",
      ]
    );
  }

  #[test]
  fn prints_cancel_once() {
    let lines = Rc::new(RefCell::new(Vec::<String>::new()));
    let subject = PassthroughSubject::<i32, Infallible>::new();
    let guard = subject.clone().print_to("p", lines.clone()).sink_value(|_| {});
    drop(guard);
    assert_eq!(lines.borrow().last().map(String::as_str), Some("p: receive cancel"));
    assert_eq!(lines.borrow().len(), 3);
  }

  #[test]
  fn request_after_cancel_prints_nothing() {
    let lines = Rc::new(RefCell::new(Vec::<String>::new()));
    let subject = PassthroughSubject::<i32, Infallible>::new();
    let guard = subject.clone().print_to("p", lines.clone()).sink_value(|_| {});
    let handle = guard.handle().unwrap();
    guard.cancel();
    handle.request(Demand::max(2));
    assert_eq!(
      *lines.borrow(),
      vec!["p: receive subscription: (PassthroughSubject)", "p: request unlimited", "p: receive cancel"]
    );
  }
}
