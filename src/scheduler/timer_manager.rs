use std::{
  collections::{BTreeMap, HashMap},
  mem,
  sync::Arc,
  thread::{self, JoinHandle},
  time::{Duration, Instant},
};

use once_cell::sync::Lazy;
use parking_lot::{Condvar, Mutex, MutexGuard};

use super::{Scheduler, Task};
use crate::{error::SchedulerError, util::defer};

static GLOBAL: Lazy<TimerManager> = Lazy::new(TimerManager::new);

/// Identifies a timer set on a [`TimerManager`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

struct Timer {
  scheduler: Box<dyn Scheduler>,
  callback: Task,
}

#[derive(Default)]
struct TimerQueue {
  timers: BTreeMap<(Instant, u64), Timer>,
  due: HashMap<u64, Instant>,
  next_id: u64,
  stopped: bool,
}

#[derive(Default)]
struct Shared {
  queue: Mutex<TimerQueue>,
  wakeup: Condvar,
}

impl Shared {
  fn run(&self) {
    let mut queue = self.queue.lock();
    loop {
      if queue.stopped {
        break;
      }
      let first = queue.timers.keys().next().copied();
      let Some((due, id)) = first else {
        self.wakeup.wait(&mut queue);
        continue;
      };
      if due > Instant::now() {
        self.wakeup.wait_until(&mut queue, due);
        continue;
      }
      queue.due.remove(&id);
      if let Some(timer) = queue.timers.remove(&(due, id)) {
        MutexGuard::unlocked(&mut queue, || {
          if let Err(err) = timer.scheduler.schedule(timer.callback, None) {
            log::warn!("timer {id} could not be dispatched: {err}");
          }
        });
      }
    }
  }
}

/// A shared background thread firing callbacks at their due time.
///
/// Each timer names the scheduler its callback is dispatched through when it
/// fires, so the timer thread itself never runs user work. The thread is
/// started by the first timer. [`TimerManager::global`] is the process-wide
/// instance the schedulers without a clock of their own use.
pub struct TimerManager {
  shared: Arc<Shared>,
  thread: Mutex<Option<JoinHandle<()>>>,
}

impl Default for TimerManager {
  fn default() -> Self { Self::new() }
}

impl TimerManager {
  pub fn new() -> Self { TimerManager { shared: Arc::default(), thread: Mutex::new(None) } }

  pub fn global() -> &'static TimerManager { &GLOBAL }

  /// Fires `callback` through `scheduler` at `due`.
  ///
  /// Fails with [`SchedulerError::Precondition`] once the manager was
  /// stopped.
  pub fn set_timer<SD, F>(&self, due: Instant, scheduler: SD, callback: F) -> Result<TimerId, SchedulerError>
  where
    SD: Scheduler + 'static,
    F: FnOnce() + Send + 'static,
  {
    self.ensure_thread()?;
    let mut queue = self.shared.queue.lock();
    if queue.stopped {
      return Err(SchedulerError::Precondition("the timer manager is stopped"));
    }
    let id = queue.next_id;
    queue.next_id += 1;
    let earliest = queue.timers.keys().next().map_or(true, |(first, _)| due < *first);
    let timer = Timer { scheduler: Box::new(scheduler), callback: Box::new(callback) };
    queue.timers.insert((due, id), timer);
    queue.due.insert(id, due);
    drop(queue);
    if earliest {
      self.shared.wakeup.notify_one();
    }
    Ok(TimerId(id))
  }

  #[inline]
  pub fn set_timer_after<SD, F>(&self, delay: Duration, scheduler: SD, callback: F) -> Result<TimerId, SchedulerError>
  where
    SD: Scheduler + 'static,
    F: FnOnce() + Send + 'static,
  {
    self.set_timer(Instant::now() + delay, scheduler, callback)
  }

  /// Removes a pending timer. Returns `false` if it already fired or was
  /// cancelled.
  pub fn cancel_timer(&self, id: TimerId) -> bool {
    let timer = {
      let mut queue = self.shared.queue.lock();
      let Some(due) = queue.due.remove(&id.0) else { return false };
      queue.timers.remove(&(due, id.0))
    };
    timer.is_some()
  }

  /// Number of timers waiting to fire.
  pub fn pending(&self) -> usize { self.shared.queue.lock().timers.len() }

  /// Drops every pending timer and stops the thread. Later timers are
  /// rejected.
  pub fn stop(&self) {
    let pending = {
      let mut queue = self.shared.queue.lock();
      queue.stopped = true;
      queue.due.clear();
      mem::take(&mut queue.timers)
    };
    self.shared.wakeup.notify_one();
    drop(pending);
    let thread = self.thread.lock().take();
    if let Some(thread) = thread {
      if thread.thread().id() != thread::current().id() {
        let _ = thread.join();
      }
    }
  }

  fn ensure_thread(&self) -> Result<(), SchedulerError> {
    let mut thread = self.thread.lock();
    if thread.is_some() || self.shared.queue.lock().stopped {
      return Ok(());
    }
    let shared = self.shared.clone();
    let handle = thread::Builder::new().name("rxcore-timer".to_string()).spawn(move || {
      log::trace!("timer thread starting");
      let _guard = defer(|| log::trace!("timer thread exiting"));
      shared.run();
    })?;
    *thread = Some(handle);
    Ok(())
  }
}

impl Drop for TimerManager {
  fn drop(&mut self) { self.stop() }
}
