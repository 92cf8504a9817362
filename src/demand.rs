//! Demand: how many more values a subscriber is willing to receive.

use std::{
  fmt::{Display, Formatter},
  ops::{Add, AddAssign},
};

/// Outstanding demand of a subscription.
///
/// Demand only grows through addition and shrinks one unit per delivered
/// value. Addition saturates at [`Demand::Unlimited`]: adding anything to an
/// unlimited demand leaves it unlimited, and a finite sum that would overflow
/// becomes unlimited.
///
/// ```rust
/// use rxdemand::prelude::*;
///
/// assert_eq!(Demand::max(2) + Demand::max(3), Demand::max(5));
/// assert_eq!(Demand::unlimited() + Demand::max(3), Demand::unlimited());
/// assert_eq!(Demand::max(1).consume_one(), Demand::NONE);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Demand {
  /// No upper bound on the number of values.
  Unlimited,
  /// At most this many more values.
  Max(usize),
}

impl Demand {
  /// Zero demand. Returned from `on_value` when the subscriber does not want
  /// to raise its demand.
  pub const NONE: Demand = Demand::Max(0);

  #[inline]
  pub const fn unlimited() -> Self { Demand::Unlimited }

  #[inline]
  pub const fn max(count: usize) -> Self { Demand::Max(count) }

  #[inline]
  pub const fn is_unlimited(&self) -> bool { matches!(self, Demand::Unlimited) }

  /// Whether at least one more value may be delivered.
  #[inline]
  pub const fn has_demand(&self) -> bool { !matches!(self, Demand::Max(0)) }

  /// The finite bound, `None` when unlimited.
  #[inline]
  pub const fn remaining(&self) -> Option<usize> {
    match self {
      Demand::Unlimited => None,
      Demand::Max(count) => Some(*count),
    }
  }

  /// Demand left after one value was delivered. Never goes below zero.
  #[inline]
  #[must_use]
  pub const fn consume_one(self) -> Self {
    match self {
      Demand::Unlimited => Demand::Unlimited,
      Demand::Max(count) => Demand::Max(count.saturating_sub(1)),
    }
  }
}

impl Default for Demand {
  fn default() -> Self { Demand::NONE }
}

impl From<usize> for Demand {
  fn from(count: usize) -> Self { Demand::Max(count) }
}

impl Add for Demand {
  type Output = Demand;

  fn add(self, rhs: Demand) -> Demand {
    match (self, rhs) {
      (Demand::Max(a), Demand::Max(b)) => a.checked_add(b).map_or(Demand::Unlimited, Demand::Max),
      _ => Demand::Unlimited,
    }
  }
}

impl AddAssign for Demand {
  fn add_assign(&mut self, rhs: Demand) { *self = *self + rhs; }
}

impl Display for Demand {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Demand::Unlimited => f.write_str("unlimited"),
      Demand::Max(count) => write!(f, "max({count})"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn finite_addition() {
    let mut demand = Demand::max(2);
    demand += Demand::max(1);
    assert_eq!(demand, Demand::max(3));
    assert_eq!(demand + Demand::NONE, Demand::max(3));
  }

  #[test]
  fn unlimited_is_sticky() {
    assert_eq!(Demand::unlimited() + Demand::max(4), Demand::Unlimited);
    assert_eq!(Demand::max(4) + Demand::unlimited(), Demand::Unlimited);
    assert_eq!(Demand::unlimited().consume_one(), Demand::Unlimited);
  }

  #[test]
  fn overflow_saturates_to_unlimited() {
    assert_eq!(Demand::max(usize::MAX) + Demand::max(1), Demand::Unlimited);
  }

  #[test]
  fn consume_never_goes_negative() {
    assert_eq!(Demand::max(1).consume_one(), Demand::NONE);
    assert_eq!(Demand::NONE.consume_one(), Demand::NONE);
    assert!(!Demand::NONE.has_demand());
    assert!(Demand::max(1).has_demand());
  }

  #[test]
  fn display() {
    assert_eq!(Demand::unlimited().to_string(), "unlimited");
    assert_eq!(Demand::max(3).to_string(), "max(3)");
    assert_eq!(Demand::max(3).remaining(), Some(3));
    assert_eq!(Demand::Unlimited.remaining(), None);
  }
}
