//! Publishers over finite (or lazy) sequences.
//!
//! Every subscription walks its own clone of the sequence, delivering exactly
//! as many elements as the subscriber demanded. Once the sequence runs out
//! the subscription completes, even if demand is left over or is zero at
//! that moment.

use std::{
  cell::{Cell, RefCell},
  convert::Infallible,
  iter::{Empty, Once, Peekable},
  rc::Rc,
};

use crate::{
  completion::Completion,
  demand::Demand,
  publisher::Publisher,
  subscriber::Subscriber,
  subscription::{Conduit, Subscription, SubscriptionHandle},
};

/// Publisher emitting the elements of an iterable, then a fixed completion.
#[derive(Clone)]
pub struct Sequence<I, E = Infallible> {
  iter: I,
  end: Completion<E>,
  name: &'static str,
}

/// Publisher of a single value.
pub type Just<T> = Sequence<Once<T>>;

/// Creates a publisher that emits the items of `iter` and then finishes.
///
/// ```rust
/// use rxdemand::prelude::*;
///
/// let _all = from_iter(vec![1, 2, 3]).sink_value(|v| println!("{v}"));
/// ```
pub fn from_iter<I>(iter: I) -> Sequence<I>
where
  I: IntoIterator + Clone,
{
  Sequence { iter, end: Completion::Finished, name: "Sequence" }
}

/// Creates a publisher that emits `value` once and then finishes.
pub fn just<T: Clone>(value: T) -> Just<T> {
  Sequence { iter: std::iter::once(value), end: Completion::Finished, name: "Just" }
}

/// Creates a publisher that finishes without emitting.
pub fn empty<T>() -> Sequence<Empty<T>> {
  Sequence { iter: std::iter::empty(), end: Completion::Finished, name: "Empty" }
}

/// Creates a publisher that fails with `err` without emitting.
pub fn fail<T, E: Clone>(err: E) -> Sequence<Empty<T>, E> {
  Sequence { iter: std::iter::empty(), end: Completion::Failure(err), name: "Fail" }
}

impl<I, E> Publisher for Sequence<I, E>
where
  I: IntoIterator + Clone,
  I::IntoIter: 'static,
  I::Item: 'static,
  E: Clone + 'static,
{
  type Item = I::Item;
  type Err = E;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<Self::Item, Self::Err> + 'static,
  {
    SequenceSubscription::start(self.iter.clone().into_iter(), self.end.clone(), self.name, subscriber);
  }
}

struct SequenceSubscription<It: Iterator, E> {
  conduit: Conduit<It::Item, E>,
  iter: RefCell<Peekable<It>>,
  end: RefCell<Option<Completion<E>>>,
  draining: Cell<bool>,
  name: &'static str,
}

impl<It, E> SequenceSubscription<It, E>
where
  It: Iterator + 'static,
  It::Item: 'static,
  E: 'static,
{
  fn start<S>(iter: It, end: Completion<E>, name: &'static str, subscriber: S)
  where
    S: Subscriber<It::Item, E> + 'static,
  {
    let subscription = Rc::new(SequenceSubscription {
      conduit: Conduit::new(),
      iter: RefCell::new(iter.peekable()),
      end: RefCell::new(Some(end)),
      draining: Cell::new(false),
      name,
    });
    let handle: SubscriptionHandle = subscription.clone();
    subscription.conduit.open(subscriber, handle);
    subscription.drain();
  }

  /// Delivers while there is demand. Re-entrant requests from inside
  /// `on_value` only raise demand; the running loop picks it up.
  fn drain(&self) {
    if self.draining.replace(true) {
      return;
    }
    while self.conduit.is_active() {
      let exhausted = self.iter.borrow_mut().peek().is_none();
      if exhausted {
        let end = self.end.borrow_mut().take();
        if let Some(end) = end {
          self.conduit.complete(end);
        }
        break;
      }
      if !self.conduit.is_ready() {
        break;
      }
      let next = self.iter.borrow_mut().next();
      if let Some(value) = next {
        self.conduit.offer(value);
      }
    }
    self.draining.set(false);
  }
}

impl<It, E> Subscription for SequenceSubscription<It, E>
where
  It: Iterator + 'static,
  It::Item: 'static,
  E: 'static,
{
  fn request(&self, demand: Demand) {
    if !demand.has_demand() {
      return;
    }
    self.conduit.add_demand(demand);
    self.drain();
  }

  fn cancel(&self) { self.conduit.cancel(); }

  fn is_closed(&self) -> bool { !self.conduit.is_active() }

  fn name(&self) -> &'static str { self.name }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[derive(Default)]
  struct Log {
    values: Vec<i32>,
    completions: Vec<Completion<Infallible>>,
  }

  /// Requests `initial` on subscribe and returns `more(value)` per value.
  struct IntSubscriber<F> {
    log: Rc<RefCell<Log>>,
    initial: Demand,
    more: F,
  }

  impl<F: FnMut(i32) -> Demand> Subscriber<i32, Infallible> for IntSubscriber<F> {
    fn on_subscribe(&mut self, subscription: SubscriptionHandle) { subscription.request(self.initial); }

    fn on_value(&mut self, value: i32) -> Demand {
      self.log.borrow_mut().values.push(value);
      (self.more)(value)
    }

    fn on_completion(&mut self, completion: Completion<Infallible>) {
      self.log.borrow_mut().completions.push(completion);
    }
  }

  fn run<F: FnMut(i32) -> Demand + 'static>(initial: Demand, more: F) -> Rc<RefCell<Log>> {
    let log = Rc::new(RefCell::new(Log::default()));
    from_iter(1..=6).subscribe(IntSubscriber { log: log.clone(), initial, more });
    log
  }

  #[test]
  fn stops_when_demand_is_exhausted() {
    let log = run(Demand::max(3), |_| Demand::NONE);
    assert_eq!(log.borrow().values, vec![1, 2, 3]);
    assert!(log.borrow().completions.is_empty());
  }

  #[test]
  fn returned_demand_keeps_it_going() {
    let log = run(Demand::max(3), |_| Demand::max(1));
    assert_eq!(log.borrow().values, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(log.borrow().completions, vec![Completion::Finished]);
  }

  #[test]
  fn unlimited_delivers_all_then_finishes_once() {
    let log = run(Demand::unlimited(), |_| Demand::NONE);
    assert_eq!(log.borrow().values, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(log.borrow().completions, vec![Completion::Finished]);
  }

  #[test]
  fn finishes_right_after_the_last_element() {
    let log = run(Demand::max(6), |_| Demand::NONE);
    assert_eq!(log.borrow().values.len(), 6);
    assert_eq!(log.borrow().completions, vec![Completion::Finished]);
  }

  #[test]
  fn empty_finishes_without_demand() {
    let log = Rc::new(RefCell::new(Log::default()));
    from_iter(Vec::<i32>::new()).subscribe(IntSubscriber {
      log: log.clone(),
      initial: Demand::NONE,
      more: |_| Demand::NONE,
    });
    assert_eq!(log.borrow().completions, vec![Completion::Finished]);
  }

  struct Resumable {
    log: Rc<RefCell<Log>>,
    handle: Rc<RefCell<Option<SubscriptionHandle>>>,
  }

  impl Subscriber<i32, Infallible> for Resumable {
    fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
      subscription.request(Demand::max(2));
      *self.handle.borrow_mut() = Some(subscription);
    }

    fn on_value(&mut self, value: i32) -> Demand {
      self.log.borrow_mut().values.push(value);
      Demand::NONE
    }

    fn on_completion(&mut self, completion: Completion<Infallible>) {
      self.log.borrow_mut().completions.push(completion);
    }
  }

  #[test]
  fn request_resumes_delivery() {
    let log = Rc::new(RefCell::new(Log::default()));
    let handle = Rc::new(RefCell::new(None));
    from_iter(1..=6).subscribe(Resumable { log: log.clone(), handle: handle.clone() });
    assert_eq!(log.borrow().values, vec![1, 2]);

    let subscription = handle.borrow().clone().unwrap();
    subscription.request(Demand::max(3));
    assert_eq!(log.borrow().values, vec![1, 2, 3, 4, 5]);

    subscription.cancel();
    subscription.cancel();
    subscription.request(Demand::unlimited());
    assert_eq!(log.borrow().values, vec![1, 2, 3, 4, 5]);
    assert!(log.borrow().completions.is_empty());
    assert!(subscription.is_closed());
  }

  struct CancelAt {
    at: i32,
    log: Rc<RefCell<Log>>,
    handle: Option<SubscriptionHandle>,
  }

  impl Subscriber<i32, Infallible> for CancelAt {
    fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
      subscription.request(Demand::unlimited());
      self.handle = Some(subscription);
    }

    fn on_value(&mut self, value: i32) -> Demand {
      self.log.borrow_mut().values.push(value);
      if value == self.at {
        if let Some(handle) = self.handle.take() {
          handle.cancel();
        }
      }
      Demand::NONE
    }

    fn on_completion(&mut self, completion: Completion<Infallible>) {
      self.log.borrow_mut().completions.push(completion);
    }
  }

  #[test]
  fn cancel_mid_sequence_stops_delivery() {
    let log = Rc::new(RefCell::new(Log::default()));
    from_iter(1..=6).subscribe(CancelAt { at: 3, log: log.clone(), handle: None });
    assert_eq!(log.borrow().values, vec![1, 2, 3]);
    assert!(log.borrow().completions.is_empty());
  }

  #[test]
  fn just_is_reusable() {
    let just = just(7);
    let hits = Rc::new(RefCell::new(vec![]));
    for _ in 0..2 {
      let c_hits = hits.clone();
      let _done = just.sink_value(move |v| c_hits.borrow_mut().push(v));
    }
    assert_eq!(*hits.borrow(), vec![7, 7]);
  }

  #[test]
  fn fail_delivers_failure() {
    let completions = Rc::new(RefCell::new(vec![]));
    let c_completions = completions.clone();
    let _done = fail::<i32, _>("boom").sink(move |c| c_completions.borrow_mut().push(c), |_| {});
    assert_eq!(*completions.borrow(), vec![Completion::Failure("boom")]);
  }
}
