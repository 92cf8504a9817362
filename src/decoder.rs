//! Payload decoders used by the `decode` operator.

use serde::de::DeserializeOwned;

use crate::error::DecodeError;

/// Turns a raw payload into a typed value.
pub trait Decoder {
  fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, DecodeError>;
}

/// JSON decoder backed by `serde_json`.
#[cfg(feature = "json")]
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonDecoder;

#[cfg(feature = "json")]
impl Decoder for JsonDecoder {
  fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, DecodeError> {
    serde_json::from_slice(bytes).map_err(DecodeError::from)
  }
}

impl<D: Decoder + ?Sized> Decoder for &D {
  fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, DecodeError> { (**self).decode(bytes) }
}
