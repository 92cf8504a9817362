use std::rc::Rc;

use serde::de::DeserializeOwned;

use crate::{
  decoder::Decoder,
  error::StreamError,
  ops::try_map::TryMapSubscriber,
  publisher::Publisher,
  subscriber::Subscriber,
  type_hint::TypeHint,
};

/// Publisher returned by [`decode`](crate::publisher::PublisherExt::decode).
///
/// A payload that fails to decode behaves like a failed `try_map`: the
/// upstream is cancelled and the downstream fails with
/// [`StreamError::Decode`].
pub struct Decode<P, D, T> {
  source: P,
  decoder: Rc<D>,
  _hint: TypeHint<T>,
}

impl<P, D, T> Decode<P, D, T> {
  pub(crate) fn new(source: P, decoder: D) -> Self {
    Self { source, decoder: Rc::new(decoder), _hint: TypeHint::new() }
  }
}

impl<P, D, T> Publisher for Decode<P, D, T>
where
  P: Publisher,
  P::Item: AsRef<[u8]>,
  P::Err: Into<StreamError>,
  D: Decoder + 'static,
  T: DeserializeOwned,
{
  type Item = T;
  type Err = StreamError;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<T, StreamError> + 'static,
  {
    let decoder = self.decoder.clone();
    let decode = move |payload: P::Item| decoder.decode::<T>(payload.as_ref()).map_err(StreamError::from);
    self.source.subscribe(TryMapSubscriber::new(subscriber, Rc::new(decode)))
  }
}
