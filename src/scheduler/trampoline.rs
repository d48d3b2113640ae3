use std::{
  cell::{Cell, RefCell},
  collections::BinaryHeap,
  thread,
  time::{Duration, Instant},
};

use super::{Scheduler, Task, TimedItem, WorkItem};
use crate::{error::SchedulerError, subscription::Disposable, util::defer};

thread_local! {
  static QUEUE: RefCell<BinaryHeap<TimedItem>> = RefCell::new(BinaryHeap::new());
  static SEQ: Cell<u64> = const { Cell::new(0) };
  static DRAINING: Cell<bool> = const { Cell::new(false) };
}

/// Queues work on the calling thread.
///
/// The first `schedule` on a thread drains the queue before returning. Work
/// scheduled from inside a running item is queued behind it and behind
/// everything queued before, instead of running re-entrantly. Delayed items
/// are ordered by due time, then first in first out; the draining thread
/// sleeps until the next one is due.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrampolineScheduler;

impl Scheduler for TrampolineScheduler {
  fn schedule(&self, task: Task, delay: Option<Duration>) -> Result<Disposable, SchedulerError> {
    let item = WorkItem::new(task);
    let handle = item.handle();
    let seq = SEQ.with(|seq| {
      let v = seq.get();
      seq.set(v + 1);
      v
    });
    let due = Instant::now() + delay.unwrap_or_default();
    QUEUE.with(|q| q.borrow_mut().push(TimedItem { due, seq, item }));

    if !DRAINING.with(|d| d.replace(true)) {
      let _reset = defer(|| DRAINING.with(|d| d.set(false)));
      drain();
    }
    Ok(handle)
  }
}

fn drain() {
  while let Some(entry) = QUEUE.with(|q| q.borrow_mut().pop()) {
    if entry.item.is_cancelled() {
      continue;
    }
    let now = Instant::now();
    if entry.due > now {
      thread::sleep(entry.due - now);
    }
    entry.item.run();
  }
}
