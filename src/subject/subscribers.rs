use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc,
};

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::observer::{BoxedObserver, Observer};

/// One subscribed observer.
///
/// The slot is detached when its subscription is disposed; a broadcast that
/// already took a snapshot of the list skips detached slots.
pub(crate) struct Slot<Item, Err> {
  observer: Mutex<Option<BoxedObserver<Item, Err>>>,
  detached: AtomicBool,
}

impl<Item, Err> Slot<Item, Err> {
  pub(crate) fn new(observer: BoxedObserver<Item, Err>) -> Arc<Self> {
    Arc::new(Slot { observer: Mutex::new(Some(observer)), detached: AtomicBool::new(false) })
  }

  #[inline]
  pub(crate) fn detach(&self) { self.detached.store(true, Ordering::Release) }

  #[inline]
  pub(crate) fn is_detached(&self) -> bool { self.detached.load(Ordering::Acquire) }

  pub(crate) fn next(&self, value: Item) {
    if self.is_detached() {
      return;
    }
    if let Some(observer) = self.observer.lock().as_mut() {
      observer.next(value);
    }
  }

  pub(crate) fn error(&self, err: Err) {
    let observer = self.observer.lock().take();
    if let Some(observer) = observer.filter(|_| !self.is_detached()) {
      observer.error(err);
    }
  }

  pub(crate) fn complete(&self) {
    let observer = self.observer.lock().take();
    if let Some(observer) = observer.filter(|_| !self.is_detached()) {
      observer.complete();
    }
  }
}

pub(crate) type Snapshot<Item, Err> = SmallVec<[Arc<Slot<Item, Err>>; 2]>;

/// Subscribers of a subject, keyed by a monotonic id and kept in
/// subscription order.
pub(crate) struct Subscribers<Item, Err> {
  next_id: usize,
  slots: SmallVec<[(usize, Arc<Slot<Item, Err>>); 2]>,
}

impl<Item, Err> Default for Subscribers<Item, Err> {
  fn default() -> Self { Self { next_id: 0, slots: SmallVec::new() } }
}

impl<Item, Err> Subscribers<Item, Err> {
  /// Add a slot and return its id.
  pub(crate) fn add(&mut self, slot: Arc<Slot<Item, Err>>) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    self.slots.push((id, slot));
    id
  }

  pub(crate) fn remove(&mut self, id: usize) -> Option<Arc<Slot<Item, Err>>> {
    let idx = self.slots.iter().position(|(slot_id, _)| *slot_id == id)?;
    Some(self.slots.remove(idx).1)
  }

  #[inline]
  pub(crate) fn len(&self) -> usize { self.slots.len() }

  /// Clones the current slots for a broadcast run outside the lock.
  pub(crate) fn snapshot(&self) -> Snapshot<Item, Err> {
    self.slots.iter().map(|(_, slot)| slot.clone()).collect()
  }

  /// Removes every slot, for a terminal broadcast.
  pub(crate) fn drain(&mut self) -> Snapshot<Item, Err> {
    self.slots.drain(..).map(|(_, slot)| slot).collect()
  }
}
