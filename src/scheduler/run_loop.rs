use std::{
  collections::BinaryHeap,
  mem,
  panic::resume_unwind,
  sync::Arc,
  thread::{self, JoinHandle, ThreadId},
  time::{Duration, Instant},
};

use parking_lot::{Condvar, Mutex, MutexGuard};

use super::{HostRunLoop, Scheduler, Task, TimedItem, WorkItem};
use crate::{error::SchedulerError, subscription::Disposable, util::defer};

struct LoopQueue {
  items: BinaryHeap<TimedItem>,
  seq: u64,
  stopping: bool,
}

struct Shared {
  queue: Mutex<LoopQueue>,
  wakeup: Condvar,
}

impl Shared {
  fn post(&self, task: Task, delay: Option<Duration>) -> Result<Disposable, SchedulerError> {
    let item = WorkItem::new(task);
    let handle = item.handle();
    let due = Instant::now() + delay.unwrap_or_default();
    let mut queue = self.queue.lock();
    if queue.stopping {
      return Err(SchedulerError::ExecutionStopped);
    }
    let seq = queue.seq;
    queue.seq += 1;
    let earliest = queue.items.peek().map_or(true, |first| due < first.due);
    queue.items.push(TimedItem { due, seq, item });
    drop(queue);
    if earliest {
      self.wakeup.notify_one();
    }
    Ok(handle)
  }

  fn stop(&self) {
    let pending = {
      let mut queue = self.queue.lock();
      queue.stopping = true;
      mem::take(&mut queue.items)
    };
    self.wakeup.notify_one();
    drop(pending);
  }

  fn run(&self) {
    let _stop = defer(|| self.stop());
    let mut queue = self.queue.lock();
    loop {
      if queue.stopping {
        break;
      }
      let now = Instant::now();
      let due = match queue.items.peek() {
        None => None,
        Some(first) if first.item.is_cancelled() => {
          queue.items.pop();
          continue;
        }
        Some(first) => Some(first.due),
      };
      match due {
        None => self.wakeup.wait(&mut queue),
        Some(due) if due > now => {
          self.wakeup.wait_until(&mut queue, due);
        }
        Some(_) => {
          if let Some(entry) = queue.items.pop() {
            MutexGuard::unlocked(&mut queue, || entry.item.run());
          }
        }
      }
    }
  }
}

/// Configures and spawns a [`RunLoopThread`].
#[derive(Clone, Debug, Default)]
pub struct RunLoopBuilder {
  name: Option<String>,
}

impl RunLoopBuilder {
  /// Sets the name of the run loop thread.
  pub fn name<N: Into<String>>(self, name: N) -> Self { Self { name: Some(name.into()) } }

  pub fn spawn(self) -> Result<RunLoopThread, SchedulerError> {
    let shared = Arc::new(Shared {
      queue: Mutex::new(LoopQueue { items: BinaryHeap::new(), seq: 0, stopping: false }),
      wakeup: Condvar::new(),
    });
    let mut builder = thread::Builder::new();
    if let Some(name) = self.name.clone() {
      builder = builder.name(name);
    }
    let c_shared = shared.clone();
    let handle = builder.spawn(move || {
      let name = self.name.unwrap_or_else(|| "run loop".to_string());
      log::trace!("run loop '{name}' starting");
      let _guard = defer(move || log::trace!("run loop '{name}' exiting"));
      c_shared.run();
    })?;
    Ok(RunLoopThread { shared, thread: Some(handle) })
  }
}

/// A dedicated thread that runs posted work in due-time order.
///
/// Dropping it stops the loop, discards the pending work and joins the
/// thread. If the thread panicked the panic is forwarded to the dropping
/// thread. Dropped from its own thread (from inside a task) it detaches
/// instead of joining.
pub struct RunLoopThread {
  shared: Arc<Shared>,
  thread: Option<JoinHandle<()>>,
}

impl RunLoopThread {
  #[inline]
  pub fn builder() -> RunLoopBuilder { RunLoopBuilder::default() }

  /// A cloneable posting handle that does not keep the thread alive.
  pub fn handle(&self) -> RunLoopHandle { RunLoopHandle { shared: self.shared.clone() } }

  pub fn thread_id(&self) -> Option<ThreadId> { self.thread.as_ref().map(|t| t.thread().id()) }

  #[inline]
  pub fn post_work(&self, work: impl FnOnce() + Send + 'static) -> Result<Disposable, SchedulerError> {
    self.shared.post(Box::new(work), None)
  }

  #[inline]
  pub fn post_delayed_work(
    &self,
    work: impl FnOnce() + Send + 'static,
    delay: Duration,
  ) -> Result<Disposable, SchedulerError> {
    self.shared.post(Box::new(work), Some(delay))
  }
}

impl Drop for RunLoopThread {
  fn drop(&mut self) {
    self.shared.stop();
    let Some(handle) = self.thread.take() else { return };
    if handle.thread().id() == thread::current().id() {
      return;
    }
    if let Err(payload) = handle.join() {
      if !thread::panicking() {
        resume_unwind(payload);
      }
    }
  }
}

/// Posts work to a [`RunLoopThread`] without owning it.
///
/// Once the loop began stopping every post fails with
/// [`SchedulerError::ExecutionStopped`].
#[derive(Clone)]
pub struct RunLoopHandle {
  shared: Arc<Shared>,
}

impl RunLoopHandle {
  #[inline]
  pub fn post_work(&self, work: impl FnOnce() + Send + 'static) -> Result<Disposable, SchedulerError> {
    self.shared.post(Box::new(work), None)
  }

  #[inline]
  pub fn post_delayed_work(
    &self,
    work: impl FnOnce() + Send + 'static,
    delay: Duration,
  ) -> Result<Disposable, SchedulerError> {
    self.shared.post(Box::new(work), Some(delay))
  }

  pub fn is_stopped(&self) -> bool { self.shared.queue.lock().stopping }
}

impl Scheduler for RunLoopHandle {
  #[inline]
  fn schedule(&self, task: Task, delay: Option<Duration>) -> Result<Disposable, SchedulerError> {
    self.shared.post(task, delay)
  }
}

impl HostRunLoop for RunLoopHandle {
  fn post_work(&self, work: Task) -> Result<(), SchedulerError> {
    self.shared.post(work, None).map(|_| ())
  }

  fn post_delayed_work(&self, work: Task, delay: Duration) -> Result<Disposable, SchedulerError> {
    self.shared.post(work, Some(delay))
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use std::sync::mpsc;

  #[test]
  fn runs_in_order_on_its_thread() {
    let run_loop = RunLoopThread::builder().name("order").spawn().unwrap();
    let (tx, rx) = mpsc::channel();
    for i in 0..5 {
      let tx = tx.clone();
      run_loop
        .post_work(move || {
          let _ = tx.send((i, thread::current().name().map(str::to_string)));
        })
        .unwrap();
    }
    let got: Vec<_> = (0..5).map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap()).collect();
    assert_eq!(got.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    assert!(got.iter().all(|(_, name)| name.as_deref() == Some("order")));
  }

  #[test]
  fn delayed_work_waits_its_turn() {
    let run_loop = RunLoopThread::builder().spawn().unwrap();
    let (tx, rx) = mpsc::channel();
    let c_tx = tx.clone();
    run_loop
      .post_delayed_work(move || { let _ = c_tx.send("late"); }, Duration::from_millis(30))
      .unwrap();
    run_loop.post_work(move || { let _ = tx.send("early"); }).unwrap();
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok("early"));
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok("late"));
  }

  #[test]
  fn disposed_work_does_not_run() {
    let run_loop = RunLoopThread::builder().spawn().unwrap();
    let (tx, rx) = mpsc::channel();
    let c_tx = tx.clone();
    let pending = run_loop
      .post_delayed_work(move || { let _ = c_tx.send("cancelled"); }, Duration::from_millis(20))
      .unwrap();
    pending.dispose();
    run_loop
      .post_delayed_work(move || { let _ = tx.send("kept"); }, Duration::from_millis(40))
      .unwrap();
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok("kept"));
  }

  #[test]
  fn post_after_drop_is_rejected() {
    let run_loop = RunLoopThread::builder().spawn().unwrap();
    let handle = run_loop.handle();
    drop(run_loop);
    assert!(handle.is_stopped());
    let err = handle.post_work(|| {}).unwrap_err();
    assert!(err.is_stopped());
  }

  #[test]
  fn drop_from_own_thread_detaches() {
    let run_loop = RunLoopThread::builder().spawn().unwrap();
    let handle = run_loop.handle();
    let (tx, rx) = mpsc::channel();
    let slot = Arc::new(Mutex::new(Some(run_loop)));
    let c_slot = slot.clone();
    handle
      .post_work(move || {
        drop(c_slot.lock().take());
        let _ = tx.send(());
      })
      .unwrap();
    rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(handle.is_stopped());
  }
}
