use std::fmt::{Display, Formatter};

/// Terminal signal of a subscription.
///
/// Delivered at most once; nothing follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<E> {
  /// The publisher ended normally.
  Finished,
  /// The publisher ended with an error.
  Failure(E),
}

impl<E> Completion<E> {
  #[inline]
  pub fn is_finished(&self) -> bool { matches!(self, Completion::Finished) }

  /// The error carried by a failure.
  #[inline]
  pub fn failure(&self) -> Option<&E> {
    match self {
      Completion::Finished => None,
      Completion::Failure(err) => Some(err),
    }
  }

  pub fn map_failure<F, E2>(self, f: F) -> Completion<E2>
  where
    F: FnOnce(E) -> E2,
  {
    match self {
      Completion::Finished => Completion::Finished,
      Completion::Failure(err) => Completion::Failure(f(err)),
    }
  }

  pub fn into_result(self) -> Result<(), E> {
    match self {
      Completion::Finished => Ok(()),
      Completion::Failure(err) => Err(err),
    }
  }
}

impl<E: Display> Display for Completion<E> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Completion::Finished => f.write_str("finished"),
      Completion::Failure(err) => write!(f, "failure({err})"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn map_failure_keeps_finished() {
    let finished: Completion<i32> = Completion::Finished;
    assert_eq!(finished.map_failure(|e| e * 2), Completion::Finished);
    assert_eq!(Completion::Failure(2).map_failure(|e| e * 2), Completion::Failure(4));
  }

  #[test]
  fn display_and_result() {
    assert_eq!(Completion::<&str>::Finished.to_string(), "finished");
    assert_eq!(Completion::Failure("boom").to_string(), "failure(boom)");
    assert_eq!(Completion::Failure("boom").into_result(), Err("boom"));
    assert_eq!(Completion::Failure("boom").failure(), Some(&"boom"));
  }
}
