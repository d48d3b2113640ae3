use std::{thread, time::Duration};

use super::{Scheduler, Task, WorkItem};
use crate::{error::SchedulerError, subscription::Disposable};

/// Runs work synchronously, before `schedule` returns.
///
/// Delayed work blocks the calling thread for the delay first. The returned
/// handle is already disposed: by the time the caller holds it there is
/// nothing left to cancel.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
  fn schedule(&self, task: Task, delay: Option<Duration>) -> Result<Disposable, SchedulerError> {
    if let Some(delay) = delay {
      thread::sleep(delay);
    }
    WorkItem::new(task).run();
    Ok(Disposable::empty())
  }
}
