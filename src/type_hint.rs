use std::marker::PhantomData;

/// Zero-sized marker recording a type an operator produces without storing
/// it.
pub struct TypeHint<T>(PhantomData<fn() -> T>);

impl<T> TypeHint<T> {
  #[inline]
  pub fn new() -> Self { Self::default() }
}

impl<T> Default for TypeHint<T> {
  fn default() -> Self { TypeHint(PhantomData) }
}

impl<T> Clone for TypeHint<T> {
  #[inline]
  fn clone(&self) -> Self { Self::new() }
}

impl<T> Copy for TypeHint<T> {}
