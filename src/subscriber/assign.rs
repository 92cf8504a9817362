use std::{cell::RefCell, convert::Infallible, rc::Rc};

use crate::{
  completion::Completion,
  demand::Demand,
  rc::MutRc,
  subject::Published,
  subscriber::Subscriber,
  subscription::{Cancellable, SubscriptionHandle},
};

/// Subscriber writing every value into a field of a shared object.
///
/// `field` plays the role of a key path: it projects the object onto the
/// field to overwrite.
pub struct Assign<O, Item> {
  object: Rc<RefCell<O>>,
  field: fn(&mut O) -> &mut Item,
  slot: Option<MutRc<Option<SubscriptionHandle>>>,
}

impl<O, Item> Assign<O, Item> {
  pub fn new(object: Rc<RefCell<O>>, field: fn(&mut O) -> &mut Item) -> (Self, Cancellable) {
    let cancellable = Cancellable::pending();
    (Assign { object, field, slot: Some(cancellable.slot()) }, cancellable)
  }
}

impl<O, Item> Subscriber<Item, Infallible> for Assign<O, Item> {
  fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
    subscription.request(Demand::unlimited());
    if let Some(slot) = self.slot.take() {
      *slot.rc_deref_mut() = Some(subscription);
    }
  }

  fn on_value(&mut self, value: Item) -> Demand {
    let mut object = self.object.borrow_mut();
    *(self.field)(&mut *object) = value;
    Demand::NONE
  }

  fn on_completion(&mut self, _completion: Completion<Infallible>) {}
}

/// Subscriber republishing every value through a [`Published`] property.
pub struct AssignToPublished<Item> {
  target: Published<Item>,
  slot: Option<MutRc<Option<SubscriptionHandle>>>,
}

impl<Item> AssignToPublished<Item> {
  pub fn new(target: Published<Item>) -> (Self, Cancellable) {
    let cancellable = Cancellable::pending();
    (AssignToPublished { target, slot: Some(cancellable.slot()) }, cancellable)
  }
}

impl<Item> Subscriber<Item, Infallible> for AssignToPublished<Item>
where
  Item: Clone + 'static,
{
  fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
    subscription.request(Demand::unlimited());
    if let Some(slot) = self.slot.take() {
      *slot.rc_deref_mut() = Some(subscription);
    }
  }

  fn on_value(&mut self, value: Item) -> Demand {
    self.target.set(value);
    Demand::NONE
  }

  fn on_completion(&mut self, _completion: Completion<Infallible>) {}
}
