use super::Disposable;
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

type Members = Arc<Mutex<HashMap<usize, Disposable>>>;

/// Owns a group of [`Disposable`]s and disposes them together.
///
/// Members are keyed by identity, so adding the same handle twice keeps one
/// entry. A member that gets disposed elsewhere removes itself from the bag.
/// Dropping the bag disposes whatever is still inside.
///
/// ```
/// use rxcore::prelude::*;
///
/// let bag = DisposeBag::new();
/// let a = Disposable::new();
/// let b = Disposable::new();
/// bag.add(a.clone());
/// bag.add(b.clone());
/// a.dispose();
/// assert_eq!(bag.count(), 1);
/// bag.clear();
/// assert!(b.is_disposed());
/// ```
#[derive(Default)]
pub struct DisposeBag {
  members: Members,
}

/// Every subscription in this crate is a [`Disposable`], so a bag of
/// subscriptions is a [`DisposeBag`].
pub type SubscriptionBag = DisposeBag;

impl DisposeBag {
  pub fn new() -> Self { Self::default() }

  pub fn add(&self, disposable: Disposable) {
    if disposable.is_disposed() {
      return;
    }
    let id = disposable.id();
    {
      let mut members = self.members.lock();
      if members.contains_key(&id) {
        return;
      }
      members.insert(id, disposable.clone());
    }
    let members = Arc::downgrade(&self.members);
    disposable.add_disposed_callback(move || {
      if let Some(members) = members.upgrade() {
        let removed = members.lock().remove(&id);
        drop(removed);
      }
    });
  }

  /// Disposes every member. The set is swapped out under the lock and the
  /// members are disposed after it is released.
  pub fn clear(&self) {
    let members = std::mem::take(&mut *self.members.lock());
    for (_, disposable) in members {
      disposable.dispose();
    }
  }

  pub fn count(&self) -> usize { self.members.lock().len() }

  pub fn is_empty(&self) -> bool { self.members.lock().is_empty() }
}

impl Drop for DisposeBag {
  fn drop(&mut self) { self.clear() }
}

impl std::fmt::Debug for DisposeBag {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("DisposeBag")
      .field("count", &self.count())
      .finish()
  }
}
