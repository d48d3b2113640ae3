use std::marker::PhantomData;

/// Pins a type parameter that only shows up in trait bounds.
///
/// `fn() -> T` keeps the hint `Send + Sync` whatever `T` is.
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
  fn clone(&self) -> Self { *self }
}

impl<T> Copy for TypeHint<T> {}
