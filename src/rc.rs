//! Shared mutable cells.
//!
//! Everything in this crate runs on one thread, so shared state is an
//! `Rc<RefCell<T>>`. `MutRc` names that pairing and adds the non-panicking
//! accessors used on re-entrant paths.

use std::{
  cell::{Ref, RefCell, RefMut},
  rc::{Rc, Weak},
};

#[derive(Default)]
pub struct MutRc<T>(Rc<RefCell<T>>);

pub struct WeakMutRc<T>(Weak<RefCell<T>>);

impl<T> MutRc<T> {
  pub fn own(t: T) -> Self { Self(Rc::new(RefCell::new(t))) }

  #[inline]
  pub fn rc_deref(&self) -> Ref<'_, T> { self.0.borrow() }

  #[inline]
  pub fn rc_deref_mut(&self) -> RefMut<'_, T> { self.0.borrow_mut() }

  /// Mutable access, or `None` while the cell is already borrowed.
  #[inline]
  pub fn try_rc_deref_mut(&self) -> Option<RefMut<'_, T>> { self.0.try_borrow_mut().ok() }

  #[inline]
  pub fn downgrade(&self) -> WeakMutRc<T> { WeakMutRc(Rc::downgrade(&self.0)) }

  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.0, &other.0) }
}

impl<T> WeakMutRc<T> {
  #[inline]
  pub fn upgrade(&self) -> Option<MutRc<T>> { self.0.upgrade().map(MutRc) }
}

impl<T> Clone for MutRc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> Clone for WeakMutRc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> From<T> for MutRc<T> {
  fn from(t: T) -> Self { Self::own(t) }
}
