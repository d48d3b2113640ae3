use std::sync::Arc;

use parking_lot::ReentrantMutex;

use crate::{observer::Observer, subscription::Disposable};

/// The live sink at the end of every subscription chain.
///
/// All observers get wrapped in a Subscriber when subscribed, which gives
/// them the subscription's [`Disposable`]. Every delivery checks the disposed
/// flag first and a terminal event disposes the whole chain after it was
/// delivered.
///
/// Deliveries go through a re-entrant gate. Disposing acquires the same gate
/// once, so `dispose` called on another thread returns only after a delivery
/// in flight has finished, while a callback may still dispose its own
/// subscription.
pub struct Subscriber<O> {
  observer: Option<O>,
  subscription: Disposable,
  gate: Arc<ReentrantMutex<()>>,
}

impl<O> Subscriber<O> {
  pub fn new(observer: O) -> Self {
    let subscription = Disposable::new();
    let gate = Arc::new(ReentrantMutex::new(()));
    let barrier = gate.clone();
    subscription.add_disposed_callback(move || drop(barrier.lock()));
    Subscriber { observer: Some(observer), subscription, gate }
  }

  #[inline]
  pub fn subscription(&self) -> Disposable { self.subscription.clone() }
}

impl<Item, Err, O> Observer<Item, Err> for Subscriber<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    let _gate = self.gate.lock();
    if self.subscription.is_disposed() {
      return;
    }
    if let Some(observer) = self.observer.as_mut() {
      observer.next(value);
    }
  }

  fn error(mut self, err: Err) {
    {
      let _gate = self.gate.lock();
      if !self.subscription.is_disposed() {
        if let Some(observer) = self.observer.take() {
          observer.error(err);
        }
      }
    }
    self.subscription.dispose();
  }

  fn complete(mut self) {
    {
      let _gate = self.gate.lock();
      if !self.subscription.is_disposed() {
        if let Some(observer) = self.observer.take() {
          observer.complete();
        }
      }
    }
    self.subscription.dispose();
  }

  fn is_closed(&self) -> bool {
    self.subscription.is_disposed() || self.observer.as_ref().map_or(true, O::is_closed)
  }
}
