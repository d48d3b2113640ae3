mod bag;
mod disposable;

pub use bag::*;
pub use disposable::*;

/// A handle to the resources of a live stream.
///
/// Every subscription in this crate is a [`Disposable`]; the trait exists so
/// generic code and [`SubscriptionGuard`] can talk about "something that can
/// be unsubscribed" without naming it.
pub trait Subscription {
  /// Releases the resources held by the stream. Calling it on an already
  /// closed subscription does nothing.
  fn unsubscribe(self);

  fn is_closed(&self) -> bool;

  /// Activates "RAII" behavior for this subscription. That means
  /// `unsubscribe()` will be called automatically as soon as the returned
  /// value goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `unsubscribe()` is called immediately, which is probably not what you
  /// want!
  fn unsubscribe_when_dropped(self) -> SubscriptionGuard<Self>
  where
    Self: Sized,
  {
    SubscriptionGuard::new(self)
  }
}

impl Subscription for Disposable {
  #[inline]
  fn unsubscribe(self) { self.dispose() }

  #[inline]
  fn is_closed(&self) -> bool { self.is_disposed() }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
///
/// Implements [`must_use`](
/// https://doc.rust-lang.org/reference/attributes/diagnostics.html
/// #the-must_use-attribute)
/// to prevent immediate unsubscription.
#[must_use]
#[derive(Debug)]
pub struct SubscriptionGuard<T: Subscription>(Option<T>);

impl<T: Subscription> SubscriptionGuard<T> {
  /// Wraps an existing subscription with a guard to enable RAII behavior for
  /// it.
  pub fn new(subscription: T) -> SubscriptionGuard<T> { SubscriptionGuard(Some(subscription)) }

  /// Gives the subscription back without unsubscribing it.
  pub fn into_inner(mut self) -> T {
    match self.0.take() {
      Some(subscription) => subscription,
      None => unreachable!("a guard always holds its subscription until dropped"),
    }
  }
}

impl<T: Subscription> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) {
    if let Some(subscription) = self.0.take() {
      subscription.unsubscribe()
    }
  }
}
