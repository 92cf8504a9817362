use std::convert::Infallible;

use crate::{
  publisher::{AnyPublisher, PublisherExt},
  subject::{CurrentValueSubject, Subject},
};

/// A property that publishes every write.
///
/// Writes go through [`set`](Published::set), which updates the value and
/// notifies the subscribers of [`publisher`](Published::publisher). A new
/// subscriber first receives the current value.
///
/// ```rust
/// use rxdemand::prelude::*;
///
/// let temperature = Published::new(20);
/// let _watch = temperature.publisher().sink_value(|t| println!("now {t}"));
/// temperature.set(21);
/// assert_eq!(temperature.get(), 21);
/// ```
pub struct Published<T> {
  subject: CurrentValueSubject<T, Infallible>,
}

impl<T> Clone for Published<T> {
  fn clone(&self) -> Self { Self { subject: self.subject.clone() } }
}

impl<T: Clone + 'static> Published<T> {
  pub fn new(initial: T) -> Self { Self { subject: CurrentValueSubject::new(initial) } }

  pub fn get(&self) -> T { self.subject.value() }

  pub fn set(&self, value: T) { self.subject.send(value) }

  /// Publisher of the current value followed by every later write.
  pub fn publisher(&self) -> AnyPublisher<T, Infallible> { self.subject.clone().erase() }
}

impl<T: Clone + Default + 'static> Default for Published<T> {
  fn default() -> Self { Self::new(T::default()) }
}
