//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

pub use std::convert::Infallible;

// Core vocabulary
pub use crate::{completion::Completion, demand::Demand};
// Decoding
#[cfg(feature = "json")]
pub use crate::decoder::JsonDecoder;
pub use crate::decoder::Decoder;
// Errors
pub use crate::error::{DecodeError, StreamError, TransportError};
// Collaborators
pub use crate::network::{DataTaskOutput, DataTaskPublisher, Fetcher, Request, Response, Session};
pub use crate::notification::{Notification, NotificationCenter, NotificationName, ObserverToken};
// Operators
pub use crate::ops::{ConnectablePublisher, EventHandlers};
// Publishers
pub use crate::publisher::{empty, fail, from_iter, just, AnyPublisher, Publisher, PublisherExt};
#[cfg(feature = "timer")]
pub use crate::scheduler::Scheduler;
// Subjects
pub use crate::subject::{CurrentValueSubject, PassthroughSubject, Published, Subject};
// Subscribers
pub use crate::subscriber::{BoxedSubscriber, Subscriber};
// Subscription
pub use crate::subscription::{Cancellable, Subscription, SubscriptionHandle};
// Debug output
pub use crate::text_output::{StdoutOutput, TextOutput, TimeLogger, TracingOutput};
#[cfg(feature = "timer")]
pub use crate::timer::Timer;
