use crate::{
  completion::Completion,
  demand::Demand,
  rc::MutRc,
  subscriber::Subscriber,
  subscription::{Cancellable, SubscriptionHandle},
};

/// Subscriber that requests unlimited demand and hands every event to a
/// closure.
///
/// Created by [`PublisherExt::sink`](crate::publisher::PublisherExt::sink)
/// and [`PublisherExt::sink_value`](crate::publisher::PublisherExt::sink_value).
pub struct Sink<V, C> {
  receive_value: V,
  receive_completion: C,
  slot: Option<MutRc<Option<SubscriptionHandle>>>,
}

impl<V, C> Sink<V, C> {
  /// Builds the sink together with the guard that will own its
  /// subscription.
  pub fn new(receive_completion: C, receive_value: V) -> (Self, Cancellable) {
    let cancellable = Cancellable::pending();
    let sink = Sink { receive_value, receive_completion, slot: Some(cancellable.slot()) };
    (sink, cancellable)
  }
}

impl<Item, Err, V, C> Subscriber<Item, Err> for Sink<V, C>
where
  V: FnMut(Item),
  C: FnMut(Completion<Err>),
{
  fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
    subscription.request(Demand::unlimited());
    if let Some(slot) = self.slot.take() {
      *slot.rc_deref_mut() = Some(subscription);
    }
  }

  fn on_value(&mut self, value: Item) -> Demand {
    (self.receive_value)(value);
    Demand::NONE
  }

  fn on_completion(&mut self, completion: Completion<Err>) { (self.receive_completion)(completion) }
}
