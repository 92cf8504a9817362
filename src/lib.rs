//! # rxdemand: demand-driven reactive streams
//!
//! Publishers deliver values only as fast as their subscribers ask for them.
//! A subscriber grants [`Demand`](demand::Demand) through the subscription
//! it receives, and every value it accepts may grant more.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxdemand::prelude::*;
//!
//! let subject = PassthroughSubject::<i32, Infallible>::new();
//! let _guard = subject
//!   .clone()
//!   .map(|v| v * 2)
//!   .sink_value(|v| println!("Value: {v}"));
//!
//! subject.send(1);
//! subject.send_completion(Completion::Finished);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Publisher`] | Produces values on demand |
//! | [`Subscriber`] | Consumes values and grants demand |
//! | [`Subscription`] | Binding between the two: `request` and `cancel` |
//! | [`Cancellable`] | Guard that cancels a subscription when dropped |
//! | [`PassthroughSubject`] / [`CurrentValueSubject`] | Publishers you push values into |
//!
//! ## Feature Flags
//!
//! - **`timer`** (default): [`Timer`](timer::Timer) and [`Scheduler`](scheduler::Scheduler),
//!   built on `futures-time`
//! - **`json`** (default): [`JsonDecoder`](decoder::JsonDecoder) for the
//!   `decode` operator
//!
//! Everything runs on one thread: shared state is `Rc`/`RefCell`, and async
//! producers run on a caller-supplied `LocalSpawn` executor.
//!
//! [`Publisher`]: publisher::Publisher
//! [`Subscriber`]: subscriber::Subscriber
//! [`Subscription`]: subscription::Subscription
//! [`Cancellable`]: subscription::Cancellable
//! [`PassthroughSubject`]: subject::PassthroughSubject
//! [`CurrentValueSubject`]: subject::CurrentValueSubject

pub mod completion;
pub mod decoder;
pub mod demand;
pub mod error;
pub mod network;
pub mod notification;
pub mod ops;
pub mod prelude;
pub mod publisher;
pub mod rc;
#[cfg(feature = "timer")]
pub mod scheduler;
pub mod subject;
pub mod subscriber;
pub mod subscription;
pub mod text_output;
#[cfg(feature = "timer")]
pub mod timer;
pub mod type_hint;

// Re-export the prelude module
pub use prelude::*;

// Bring the README into Cargo-driven doctests.
#[cfg(doctest)]
mod __markdown_doctests {
  mod readme {
    #![doc = include_str!("../README.md")]
  }
}
