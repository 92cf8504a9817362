//! Subjects: publishers you push values into.
//!
//! A subject is both a [`Publisher`] and an imperative entry point. Values
//! passed to [`Subject::send`] are broadcast to every attached subscriber
//! that currently has demand; subscribers without demand miss the value.
//! Cloning a subject yields another handle to the same subject.

mod current_value;
mod passthrough;
mod published;
mod subject_core;

pub use current_value::CurrentValueSubject;
pub use passthrough::PassthroughSubject;
pub use published::Published;
pub use subject_core::SubjectCore;

use crate::{completion::Completion, publisher::Publisher};

pub trait Subject: Publisher {
  /// Broadcasts `value` to the subscribers with outstanding demand.
  fn send(&self, value: Self::Item);

  /// Completes every attached subscriber and closes the subject. Later
  /// sends are ignored.
  fn send_completion(&self, completion: Completion<Self::Err>);
}
