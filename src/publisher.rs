//! The producing side of a subscription.
//!
//! [`Publisher`] is the one required trait; everything else a publisher can
//! do lives on the blanket [`PublisherExt`] extension so that every publisher,
//! including user-defined ones, gets the operators for free.

mod any;
mod sequence;

use std::{cell::RefCell, convert::Infallible, rc::Rc};

pub use any::{AnyPublisher, DynPublisher};
use serde::de::DeserializeOwned;
pub use sequence::{empty, fail, from_iter, just, Just, Sequence};

use crate::{
  completion::Completion,
  decoder::Decoder,
  error::StreamError,
  ops::{
    breakpoint::Breakpoint,
    decode::Decode,
    handle_events::{EventHandlers, HandleEvents},
    map::Map,
    map_err::MapErr,
    multicast::Multicast,
    print::Print,
    scan::Scan,
    try_map::TryMap,
    values::Values,
  },
  subject::{Published, Subject},
  subscriber::{Assign, AssignToPublished, Sink, Subscriber},
  subscription::Cancellable,
  text_output::{StdoutOutput, TextOutput},
};

/// A source of values that delivers them on demand.
///
/// Subscribing attaches a subscriber and hands it a subscription in
/// `on_subscribe`. Nothing is delivered until the subscriber requests demand
/// through that subscription. Each call to `subscribe` creates an independent
/// subscription.
pub trait Publisher {
  type Item;
  type Err;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<Self::Item, Self::Err> + 'static;
}

impl<P: Publisher + ?Sized> Publisher for Rc<P> {
  type Item = P::Item;
  type Err = P::Err;

  #[inline]
  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<Self::Item, Self::Err> + 'static,
  {
    (**self).subscribe(subscriber)
  }
}

/// Operators and terminal subscribers available on every [`Publisher`].
pub trait PublisherExt: Publisher + Sized {
  // ==================== Transformations ====================

  /// Transforms every value with `f`.
  ///
  /// ```rust
  /// use rxdemand::prelude::*;
  ///
  /// let _doubled = from_iter(1..=3).map(|v| v * 2).sink_value(|v| println!("{v}"));
  /// ```
  fn map<F, Out>(self, f: F) -> Map<Self, F, Out>
  where
    F: Fn(Self::Item) -> Out,
  {
    Map::new(self, f)
  }

  /// Transforms every value with a fallible `f`. The first `Err` cancels the
  /// upstream and fails downstream.
  fn try_map<F, Out, E>(self, f: F) -> TryMap<Self, F, Out, E>
  where
    F: Fn(Self::Item) -> Result<Out, E>,
    Self::Err: Into<E>,
  {
    TryMap::new(self, f)
  }

  /// Converts the failure type with `f`.
  fn map_err<F, E>(self, f: F) -> MapErr<Self, F, E>
  where
    F: Fn(Self::Err) -> E,
  {
    MapErr::new(self, f)
  }

  /// Folds every value into an accumulator and emits each intermediate
  /// result.
  fn scan<Acc, F>(self, initial: Acc, f: F) -> Scan<Self, Acc, F>
  where
    Acc: Clone,
    F: Fn(Acc, Self::Item) -> Acc,
  {
    Scan::new(self, initial, f)
  }

  /// Decodes every byte buffer into a `T` with `decoder`.
  fn decode<T, D>(self, decoder: D) -> Decode<Self, D, T>
  where
    Self::Item: AsRef<[u8]>,
    Self::Err: Into<StreamError>,
    D: Decoder,
    T: DeserializeOwned,
  {
    Decode::new(self, decoder)
  }

  // ==================== Debugging ====================

  /// Runs the given side effects on every lifecycle event, passing events
  /// through unchanged.
  fn handle_events(self, handlers: EventHandlers<Self::Item, Self::Err>) -> HandleEvents<Self> {
    HandleEvents::new(self, handlers)
  }

  /// Logs every lifecycle event to stdout, each line prefixed with `prefix`.
  fn print(self, prefix: impl Into<String>) -> Print<Self> {
    Print::new(self, prefix.into(), StdoutOutput)
  }

  /// Logs every lifecycle event to `output`.
  fn print_to<W>(self, prefix: impl Into<String>, output: W) -> Print<Self>
  where
    W: TextOutput + 'static,
  {
    Print::new(self, prefix.into(), output)
  }

  /// Panics when `receive_output` returns `true` for a value.
  fn breakpoint<F>(self, receive_output: F) -> Breakpoint<Self>
  where
    F: Fn(&Self::Item) -> bool + 'static,
  {
    Breakpoint::on_output(self, receive_output)
  }

  /// Panics when the upstream fails.
  fn breakpoint_on_error(self) -> Breakpoint<Self> { Breakpoint::on_error(self) }

  // ==================== Sharing ====================

  /// Shares one upstream subscription among all subscribers of `subject`.
  /// The upstream is subscribed on `connect`.
  fn multicast<S>(self, subject: S) -> Multicast<Self, S>
  where
    S: Subject<Item = Self::Item, Err = Self::Err>,
  {
    Multicast::new(self, subject)
  }

  /// Like [`multicast`](PublisherExt::multicast), creating the subject
  /// with `factory`.
  fn multicast_with<S, F>(self, factory: F) -> Multicast<Self, S>
  where
    S: Subject<Item = Self::Item, Err = Self::Err>,
    F: FnOnce() -> S,
  {
    Multicast::new(self, factory())
  }

  /// Hides the concrete publisher type.
  fn erase(self) -> AnyPublisher<Self::Item, Self::Err>
  where
    Self: 'static,
  {
    AnyPublisher::new(self)
  }

  // ==================== Terminal subscribers ====================

  /// Subscribes with unlimited demand, calling `receive_value` for every
  /// value and `receive_completion` once at the end.
  fn sink<C, V>(&self, receive_completion: C, receive_value: V) -> Cancellable
  where
    C: FnMut(Completion<Self::Err>) + 'static,
    V: FnMut(Self::Item) + 'static,
  {
    let (sink, cancellable) = Sink::new(receive_completion, receive_value);
    self.subscribe(sink);
    cancellable
  }

  /// Subscribes with unlimited demand to a publisher that cannot fail.
  fn sink_value<V>(&self, receive_value: V) -> Cancellable
  where
    Self: Publisher<Err = Infallible>,
    V: FnMut(Self::Item) + 'static,
  {
    self.sink(|_: Completion<Infallible>| {}, receive_value)
  }

  /// Writes every value into the field of `object` selected by `field`.
  fn assign<O>(&self, object: Rc<RefCell<O>>, field: fn(&mut O) -> &mut Self::Item) -> Cancellable
  where
    Self: Publisher<Err = Infallible>,
    O: 'static,
    Self::Item: 'static,
  {
    let (assign, cancellable) = Assign::new(object, field);
    self.subscribe(assign);
    cancellable
  }

  /// Republishes every value through `target`.
  fn assign_to(&self, target: &Published<Self::Item>) -> Cancellable
  where
    Self: Publisher<Err = Infallible>,
    Self::Item: Clone + 'static,
  {
    let (assign, cancellable) = AssignToPublished::new(target.clone());
    self.subscribe(assign);
    cancellable
  }

  /// Bridges into an async [`Stream`](futures::Stream) of results, pulling one
  /// value per poll. A failure is yielded as a final `Err` item.
  fn values(&self) -> Values<Self::Item, Self::Err>
  where
    Self::Item: 'static,
    Self::Err: 'static,
  {
    Values::new(self)
  }
}

impl<P: Publisher> PublisherExt for P {}
