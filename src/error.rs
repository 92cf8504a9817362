//! Error types carried by [`Completion::Failure`](crate::completion::Completion).
//!
//! - [`TransportError`]: a fetch failed before any payload was produced.
//! - [`DecodeError`]: a payload could not be turned into a typed value.
//! - [`StreamError`]: the union used by chains that mix both, plus
//!   consumer-defined failures.

use std::convert::Infallible;

use thiserror::Error;

/// Failure of the external request issuer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
  /// The request URL is not an absolute `http`/`https` URL.
  #[error("invalid url `{0}`")]
  InvalidUrl(String),
  /// The request could not be completed.
  #[error("request failed: {0}")]
  RequestFailed(String),
  /// The server answered with a non-success status.
  #[error("bad server response: status {0}")]
  BadStatus(u16),
}

/// Malformed payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to decode payload: {message}")]
pub struct DecodeError {
  message: String,
}

impl DecodeError {
  pub fn new(message: impl Into<String>) -> Self { Self { message: message.into() } }

  pub fn message(&self) -> &str { &self.message }
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for DecodeError {
  fn from(err: serde_json::Error) -> Self { Self::new(err.to_string()) }
}

/// Failure of a composed chain.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
  #[error(transparent)]
  Transport(#[from] TransportError),
  #[error(transparent)]
  Decode(#[from] DecodeError),
  /// Domain-specific failure raised by the consumer.
  #[error("{0}")]
  Custom(String),
}

impl StreamError {
  pub fn custom(message: impl Into<String>) -> Self { StreamError::Custom(message.into()) }

  /// Returns a short stable label for logs.
  pub fn as_label(&self) -> &'static str {
    match self {
      StreamError::Transport(_) => "stream_transport",
      StreamError::Decode(_) => "stream_decode",
      StreamError::Custom(_) => "stream_custom",
    }
  }
}

impl From<Infallible> for StreamError {
  fn from(never: Infallible) -> Self { match never {} }
}
