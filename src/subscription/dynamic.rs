use smallvec::SmallVec;

/// A container for items with ID-based removal, kept in insertion order.
///
/// Subjects use it for their attached subscriptions: fan-out walks the items
/// in the order they were added, and a cancelled subscription removes itself
/// by the ID it was given.
///
/// # Examples
///
/// ```rust
/// use rxdemand::subscription::DynamicSubscriptions;
///
/// let mut subs: DynamicSubscriptions<&str> = DynamicSubscriptions::default();
/// let a = subs.add("a");
/// subs.add("b");
/// assert_eq!(subs.len(), 2);
///
/// assert_eq!(subs.remove(a), Some("a"));
/// assert_eq!(subs.iter().copied().collect::<Vec<_>>(), vec!["b"]);
/// ```
pub struct DynamicSubscriptions<U> {
  next_id: usize,
  items: SmallVec<[(usize, U); 2]>,
}

impl<U> Default for DynamicSubscriptions<U> {
  fn default() -> Self { Self { next_id: 0, items: SmallVec::new() } }
}

impl<U> DynamicSubscriptions<U> {
  #[inline]
  pub fn new() -> Self { Self::default() }

  /// Add an item and return its unique ID.
  #[inline]
  pub fn add(&mut self, item: U) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    self.items.push((id, item));
    id
  }

  /// Remove an item by ID.
  pub fn remove(&mut self, id: usize) -> Option<U> {
    self
      .items
      .iter()
      .position(|(i, _)| *i == id)
      .map(|pos| self.items.remove(pos).1)
  }

  #[inline]
  pub fn contains(&self, id: usize) -> bool { self.items.iter().any(|(i, _)| *i == id) }

  /// Keep only the items matching `keep`, preserving order.
  pub fn retain<F>(&mut self, mut keep: F)
  where
    F: FnMut(&U) -> bool,
  {
    self.items.retain(|(_, item)| keep(&*item));
  }

  #[inline]
  pub fn len(&self) -> usize { self.items.len() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  /// Drain all items in insertion order.
  #[inline]
  pub fn drain(&mut self) -> impl Iterator<Item = U> + '_ {
    self.items.drain(..).map(|(_, item)| item)
  }

  #[inline]
  pub fn iter(&self) -> impl Iterator<Item = &U> { self.items.iter().map(|(_, item)| item) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ids_are_not_reused() {
    let mut subs = DynamicSubscriptions::new();
    let a = subs.add(1);
    assert_eq!(subs.remove(a), Some(1));
    let b = subs.add(2);
    assert_ne!(a, b);
    assert!(!subs.contains(a));
    assert!(subs.contains(b));
  }

  #[test]
  fn retain_keeps_order() {
    let mut subs = DynamicSubscriptions::new();
    for v in 0..5 {
      subs.add(v);
    }
    subs.retain(|v| v % 2 == 0);
    assert_eq!(subs.iter().copied().collect::<Vec<_>>(), vec![0, 2, 4]);
    assert_eq!(subs.drain().collect::<Vec<_>>(), vec![0, 2, 4]);
    assert!(subs.is_empty());
  }
}
