//! Subscriber trait and the closure-based subscribers.
//!
//! A subscriber is the consuming side of a subscription. It receives exactly
//! one `on_subscribe`, then any number of `on_value` calls bounded by the
//! demand it granted, then at most one `on_completion`.

mod assign;
mod sink;

pub use assign::{Assign, AssignToPublished};
pub use sink::Sink;

use crate::{completion::Completion, demand::Demand, subscription::SubscriptionHandle};

/// Subscriber trait: the consumer of a demand-driven stream.
///
/// ```rust
/// use std::convert::Infallible;
///
/// use rxdemand::prelude::*;
///
/// struct Collect(Vec<i32>);
///
/// impl Subscriber<i32, Infallible> for Collect {
///   fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
///     subscription.request(Demand::max(3));
///   }
///
///   fn on_value(&mut self, value: i32) -> Demand {
///     self.0.push(value);
///     Demand::NONE
///   }
///
///   fn on_completion(&mut self, _completion: Completion<Infallible>) {}
/// }
///
/// from_iter(1..=6).subscribe(Collect(vec![]));
/// ```
pub trait Subscriber<Item, Err> {
  /// Called once, before any value. Typically requests the initial demand.
  fn on_subscribe(&mut self, subscription: SubscriptionHandle);

  /// Receives one value and returns the *additional* demand to grant, which
  /// is added to the outstanding demand. Return [`Demand::NONE`] to keep it
  /// as it is.
  fn on_value(&mut self, value: Item) -> Demand;

  /// Receives the terminal signal. Nothing follows it.
  fn on_completion(&mut self, completion: Completion<Err>);
}

/// Type-erased subscriber.
pub type BoxedSubscriber<Item, Err> = Box<dyn Subscriber<Item, Err>>;

impl<Item, Err> Subscriber<Item, Err> for BoxedSubscriber<Item, Err> {
  #[inline]
  fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
    (**self).on_subscribe(subscription)
  }

  #[inline]
  fn on_value(&mut self, value: Item) -> Demand { (**self).on_value(value) }

  #[inline]
  fn on_completion(&mut self, completion: Completion<Err>) { (**self).on_completion(completion) }
}
