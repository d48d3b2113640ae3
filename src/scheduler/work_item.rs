use std::{cmp::Ordering, sync::Arc, time::Instant};

use parking_lot::Mutex;

use super::Task;
use crate::subscription::Disposable;

/// A task together with the handle that cancels it.
///
/// Disposing the handle drops the task. Running the item claims the task
/// and disposes the handle before the task is invoked, so a panicking task
/// leaves nothing registered behind it.
pub(crate) struct WorkItem {
  task: Arc<Mutex<Option<Task>>>,
  handle: Disposable,
}

impl WorkItem {
  pub(crate) fn new(task: Task) -> Self {
    let task = Arc::new(Mutex::new(Some(task)));
    let handle = Disposable::new();
    let weak = Arc::downgrade(&task);
    handle.add_disposed_callback(move || {
      if let Some(task) = weak.upgrade() {
        let dropped = task.lock().take();
        drop(dropped);
      }
    });
    WorkItem { task, handle }
  }

  #[inline]
  pub(crate) fn handle(&self) -> Disposable { self.handle.clone() }

  #[inline]
  pub(crate) fn is_cancelled(&self) -> bool { self.handle.is_disposed() }

  pub(crate) fn run(self) {
    let task = self.task.lock().take();
    self.handle.dispose();
    if let Some(task) = task {
      task();
    }
  }
}

/// A work item ordered by due time, then by submission order.
///
/// The ordering is reversed so a `BinaryHeap` pops the earliest entry.
pub(crate) struct TimedItem {
  pub(crate) due: Instant,
  pub(crate) seq: u64,
  pub(crate) item: WorkItem,
}

impl PartialEq for TimedItem {
  fn eq(&self, other: &Self) -> bool { self.due == other.due && self.seq == other.seq }
}

impl Eq for TimedItem {}

impl PartialOrd for TimedItem {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for TimedItem {
  fn cmp(&self, other: &Self) -> Ordering {
    other.due.cmp(&self.due).then_with(|| other.seq.cmp(&self.seq))
  }
}
