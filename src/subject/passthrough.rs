use crate::{
  completion::Completion,
  publisher::Publisher,
  subject::{Subject, SubjectCore},
  subscriber::Subscriber,
};

/// A subject that broadcasts values to its current subscribers and keeps
/// nothing.
///
/// ```rust
/// use std::convert::Infallible;
///
/// use rxdemand::prelude::*;
///
/// let subject = PassthroughSubject::<&str, Infallible>::new();
/// let _guard = subject.sink_value(|v| println!("{v}"));
/// subject.send("A");
/// subject.send_completion(Completion::Finished);
/// ```
pub struct PassthroughSubject<Item, Err> {
  core: SubjectCore<Item, Err>,
}

impl<Item, Err> Clone for PassthroughSubject<Item, Err> {
  fn clone(&self) -> Self { Self { core: self.core.clone() } }
}

impl<Item, Err> Default for PassthroughSubject<Item, Err> {
  fn default() -> Self { Self { core: SubjectCore::default() } }
}

impl<Item, Err> PassthroughSubject<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  pub fn new() -> Self { Self::default() }

  #[inline]
  pub fn subscriber_count(&self) -> usize { self.core.subscriber_count() }

  #[inline]
  pub fn is_completed(&self) -> bool { self.core.is_completed() }
}

impl<Item, Err> Publisher for PassthroughSubject<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  type Item = Item;
  type Err = Err;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<Item, Err> + 'static,
  {
    self.core.subscribe_with(subscriber, None, "PassthroughSubject")
  }
}

impl<Item, Err> Subject for PassthroughSubject<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  #[inline]
  fn send(&self, value: Item) { self.core.send(value) }

  #[inline]
  fn send_completion(&self, completion: Completion<Err>) { self.core.send_completion(completion) }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  type Events = Rc<RefCell<Vec<String>>>;

  /// Records events; requests `initial` and nothing more.
  struct Recorder {
    tag: &'static str,
    events: Events,
    initial: Demand,
  }

  impl Subscriber<&'static str, &'static str> for Recorder {
    fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
      self.events.borrow_mut().push(format!("{} subscribed", self.tag));
      subscription.request(self.initial);
    }

    fn on_value(&mut self, value: &'static str) -> Demand {
      self.events.borrow_mut().push(format!("{} {}", self.tag, value));
      Demand::NONE
    }

    fn on_completion(&mut self, completion: Completion<&'static str>) {
      self.events.borrow_mut().push(format!("{} {}", self.tag, completion));
    }
  }

  #[test]
  fn demand_limits_each_subscriber() {
    let subject = PassthroughSubject::<&'static str, &'static str>::new();
    let events = Events::default();
    subject.subscribe(Recorder { tag: "limited", events: events.clone(), initial: Demand::max(2) });
    subject.subscribe(Recorder { tag: "all", events: events.clone(), initial: Demand::unlimited() });

    subject.send("A");
    subject.send("B");
    subject.send("C");

    let limited: Vec<_> = events
      .borrow()
      .iter()
      .filter(|e| e.starts_with("limited "))
      .cloned()
      .collect();
    assert_eq!(limited, vec!["limited subscribed", "limited A", "limited B"]);
    let all: Vec<_> = events.borrow().iter().filter(|e| e.starts_with("all ")).cloned().collect();
    assert_eq!(all, vec!["all subscribed", "all A", "all B", "all C"]);
  }

  #[test]
  fn zero_demand_drops_values() {
    let subject = PassthroughSubject::<&'static str, &'static str>::new();
    let events = Events::default();
    subject.subscribe(Recorder { tag: "idle", events: events.clone(), initial: Demand::NONE });
    subject.send("A");
    assert_eq!(*events.borrow(), vec!["idle subscribed"]);
  }

  #[test]
  fn completion_reaches_everyone_once() {
    let subject = PassthroughSubject::<&'static str, &'static str>::new();
    let events = Events::default();
    subject.subscribe(Recorder { tag: "a", events: events.clone(), initial: Demand::NONE });
    subject.subscribe(Recorder { tag: "b", events: events.clone(), initial: Demand::unlimited() });

    subject.send_completion(Completion::Failure("boom"));
    subject.send_completion(Completion::Finished);
    subject.send("late");

    assert_eq!(
      *events.borrow(),
      vec!["a subscribed", "b subscribed", "a failure(boom)", "b failure(boom)"]
    );
    assert_eq!(subject.subscriber_count(), 0);
  }

  #[test]
  fn late_subscriber_gets_stored_completion() {
    let subject = PassthroughSubject::<&'static str, &'static str>::new();
    subject.send_completion(Completion::Finished);

    let events = Events::default();
    subject.subscribe(Recorder { tag: "late", events: events.clone(), initial: Demand::unlimited() });
    assert_eq!(*events.borrow(), vec!["late subscribed", "late finished"]);
    assert!(subject.is_completed());
  }

  #[test]
  fn clones_share_subscribers() {
    let subject = PassthroughSubject::<i32, Infallible>::new();
    let other = subject.clone();
    let seen = Rc::new(RefCell::new(vec![]));
    let c_seen = seen.clone();
    let _guard = subject.sink_value(move |v| c_seen.borrow_mut().push(v));
    other.send(1);
    assert_eq!(*seen.borrow(), vec![1]);
  }

  #[test]
  fn reentrant_send_is_dropped_for_the_busy_subscriber() {
    let subject = PassthroughSubject::<i32, Infallible>::new();
    let seen = Rc::new(RefCell::new(vec![]));
    let (c_seen, c_subject) = (seen.clone(), subject.clone());
    let _guard = subject.sink_value(move |v| {
      c_seen.borrow_mut().push(v);
      if v == 1 {
        c_subject.send(2);
      }
    });
    subject.send(1);
    subject.send(3);
    assert_eq!(*seen.borrow(), vec![1, 3]);
  }

  #[test]
  fn subscribe_from_inside_a_callback() {
    let subject = PassthroughSubject::<i32, Infallible>::new();
    let inner_seen = Rc::new(RefCell::new(vec![]));
    let guards = Rc::new(RefCell::new(vec![]));
    let (c_subject, c_inner, c_guards) = (subject.clone(), inner_seen.clone(), guards.clone());
    let _outer = subject.sink_value(move |v| {
      if v == 1 {
        let c_inner = c_inner.clone();
        let guard = c_subject.sink_value(move |v| c_inner.borrow_mut().push(v));
        c_guards.borrow_mut().push(guard);
      }
    });
    subject.send(1);
    subject.send(2);
    assert_eq!(*inner_seen.borrow(), vec![2]);
    assert_eq!(subject.subscriber_count(), 2);
  }
}
