use crate::{
  completion::Completion,
  publisher::Publisher,
  rc::MutRc,
  subject::{Subject, SubjectCore},
  subscriber::Subscriber,
};

/// A subject that holds a current value and hands it to every new
/// subscriber.
///
/// The current value reaches a new subscriber as soon as it has demand. If it
/// subscribes without demand, the value is held until its first request; a
/// `send` in between replaces the held value.
pub struct CurrentValueSubject<Item, Err> {
  core: SubjectCore<Item, Err>,
  value: MutRc<Item>,
}

impl<Item, Err> Clone for CurrentValueSubject<Item, Err> {
  fn clone(&self) -> Self { Self { core: self.core.clone(), value: self.value.clone() } }
}

impl<Item, Err> CurrentValueSubject<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  pub fn new(initial: Item) -> Self { Self { core: SubjectCore::new(), value: MutRc::own(initial) } }

  pub fn value(&self) -> Item { self.value.rc_deref().clone() }

  /// Same as [`send`](Subject::send).
  #[inline]
  pub fn set_value(&self, value: Item) { self.send(value) }

  #[inline]
  pub fn subscriber_count(&self) -> usize { self.core.subscriber_count() }

  #[inline]
  pub fn is_completed(&self) -> bool { self.core.is_completed() }
}

impl<Item, Err> Publisher for CurrentValueSubject<Item, Err>
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
    self.core.subscribe_with(subscriber, Some(self.value()), "CurrentValueSubject")
  }
}

impl<Item, Err> Subject for CurrentValueSubject<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  fn send(&self, value: Item) {
    if self.core.is_completed() {
      tracing::warn!("value sent to a completed subject is ignored");
      return;
    }
    *self.value.rc_deref_mut() = value.clone();
    self.core.send(value);
  }

  #[inline]
  fn send_completion(&self, completion: Completion<Err>) { self.core.send_completion(completion) }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  struct Lazy {
    seen: Rc<RefCell<Vec<i32>>>,
    handle: Rc<RefCell<Option<SubscriptionHandle>>>,
  }

  impl Subscriber<i32, Infallible> for Lazy {
    fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
      *self.handle.borrow_mut() = Some(subscription);
    }

    fn on_value(&mut self, value: i32) -> Demand {
      self.seen.borrow_mut().push(value);
      Demand::NONE
    }

    fn on_completion(&mut self, _completion: Completion<Infallible>) {}
  }

  #[test]
  fn new_subscriber_receives_current_value() {
    let subject = CurrentValueSubject::<i32, Infallible>::new(5);
    let seen = Rc::new(RefCell::new(vec![]));
    let c_seen = seen.clone();
    let _guard = subject.sink_value(move |v| c_seen.borrow_mut().push(v));
    assert_eq!(*seen.borrow(), vec![5]);

    subject.set_value(6);
    assert_eq!(*seen.borrow(), vec![5, 6]);
    assert_eq!(subject.value(), 6);
  }

  #[test]
  fn held_value_is_replaced_until_requested() {
    let subject = CurrentValueSubject::<i32, Infallible>::new(1);
    let seen = Rc::new(RefCell::new(vec![]));
    let handle = Rc::new(RefCell::new(None));
    subject.subscribe(Lazy { seen: seen.clone(), handle: handle.clone() });
    subject.send(2);
    subject.send(3);
    assert!(seen.borrow().is_empty());

    let subscription = handle.borrow().clone().unwrap();
    subscription.request(Demand::max(1));
    assert_eq!(*seen.borrow(), vec![3]);

    subject.send(4);
    assert_eq!(*seen.borrow(), vec![3]);
    subscription.request(Demand::max(1));
    subject.send(5);
    assert_eq!(*seen.borrow(), vec![3, 5]);
    subscription.cancel();
  }

  #[test]
  fn send_after_completion_keeps_value() {
    let subject = CurrentValueSubject::<i32, Infallible>::new(1);
    subject.send_completion(Completion::Finished);
    subject.send(2);
    assert_eq!(subject.value(), 1);

    let seen = Rc::new(RefCell::new(vec![]));
    let finished = Rc::new(RefCell::new(false));
    let (c_seen, c_finished) = (seen.clone(), finished.clone());
    let _guard = subject.sink(
      move |_| *c_finished.borrow_mut() = true,
      move |v| c_seen.borrow_mut().push(v),
    );
    assert!(seen.borrow().is_empty());
    assert!(*finished.borrow());
  }
}
