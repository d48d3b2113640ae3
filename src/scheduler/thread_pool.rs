use std::time::Duration;

use futures::{executor::ThreadPool, future};

use super::{Scheduler, Task, TimerManager, WorkItem};
use crate::{error::SchedulerError, subscription::Disposable};

/// Spreads work over a `futures` thread pool.
///
/// Work items may run concurrently and in any order; combine with
/// `observe_on` to get ordered delivery. Delayed work waits on the global
/// [`TimerManager`] and is handed to the pool when due.
#[derive(Clone)]
pub struct ThreadPoolScheduler {
  pool: ThreadPool,
}

/// Configures a [`ThreadPoolScheduler`].
#[derive(Clone, Debug, Default)]
pub struct ThreadPoolBuilder {
  pool_size: Option<usize>,
  name_prefix: Option<String>,
}

impl ThreadPoolBuilder {
  /// Number of worker threads; defaults to the number of CPUs.
  pub fn pool_size(self, size: usize) -> Self { Self { pool_size: Some(size), ..self } }

  /// Worker threads are named `{prefix}{index}`.
  pub fn name_prefix<N: Into<String>>(self, prefix: N) -> Self {
    Self { name_prefix: Some(prefix.into()), ..self }
  }

  pub fn build(self) -> Result<ThreadPoolScheduler, SchedulerError> {
    let mut builder = ThreadPool::builder();
    match self.pool_size {
      Some(0) => return Err(SchedulerError::Precondition("a thread pool needs at least one thread")),
      Some(size) => {
        builder.pool_size(size);
      }
      None => {}
    }
    if let Some(prefix) = self.name_prefix {
      builder.name_prefix(prefix);
    }
    Ok(ThreadPoolScheduler { pool: builder.create()? })
  }
}

impl ThreadPoolScheduler {
  pub fn new() -> Result<Self, SchedulerError> { Self::builder().build() }

  #[inline]
  pub fn builder() -> ThreadPoolBuilder { ThreadPoolBuilder::default() }
}

impl Scheduler for ThreadPoolScheduler {
  fn schedule(&self, task: Task, delay: Option<Duration>) -> Result<Disposable, SchedulerError> {
    let item = WorkItem::new(task);
    let handle = item.handle();
    match delay {
      None => self.pool.spawn_ok(future::lazy(move |_| item.run())),
      Some(delay) => {
        let timers = TimerManager::global();
        let id = timers.set_timer_after(delay, self.clone(), move || item.run())?;
        handle.add(Disposable::from_fn(move || {
          timers.cancel_timer(id);
        }));
      }
    }
    Ok(handle)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use std::{
    sync::{mpsc, Arc, Mutex},
    thread,
    time::Instant,
  };

  #[test]
  fn zero_threads_is_rejected() {
    let err = ThreadPoolScheduler::builder().pool_size(0).build().err().unwrap();
    assert!(matches!(err, SchedulerError::Precondition(_)));
  }

  #[test]
  fn runs_off_the_calling_thread() {
    let pool = ThreadPoolScheduler::builder().pool_size(2).name_prefix("pool-").build().unwrap();
    let (tx, rx) = mpsc::channel();
    pool
      .schedule_work(move || {
        let _ = tx.send(thread::current().name().map(str::to_string));
      })
      .unwrap();
    let name = rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
    assert!(name.starts_with("pool-"));
  }

  #[test]
  fn delayed_work_and_cancel() {
    let pool = ThreadPoolScheduler::new().unwrap();
    let fired = Arc::new(Mutex::new(vec![]));
    let (tx, rx) = mpsc::channel();
    let c_fired = fired.clone();
    let cancelled = pool
      .schedule_delayed_work(move || c_fired.lock().unwrap().push("cancelled"), Duration::from_millis(10))
      .unwrap();
    cancelled.dispose();
    let start = Instant::now();
    pool
      .schedule_delayed_work(move || { let _ = tx.send(start.elapsed()); }, Duration::from_millis(20))
      .unwrap();
    assert!(rx.recv_timeout(Duration::from_secs(5)).unwrap() >= Duration::from_millis(20));
    assert!(fired.lock().unwrap().is_empty());
  }
}
