use std::time::Duration;

use super::{RunLoopHandle, RunLoopThread, Scheduler, Task};
use crate::{error::SchedulerError, subscription::Disposable};

/// Runs all work on one thread.
///
/// The scheduler either owns its [`RunLoopThread`], which stops when the
/// scheduler is dropped, or posts to a loop owned elsewhere through a
/// [`RunLoopHandle`]. Work scheduled after the loop began stopping fails
/// with [`SchedulerError::ExecutionStopped`], including work scheduled by a
/// task still running while the scheduler is dropped.
pub struct SingleThreadScheduler {
  handle: RunLoopHandle,
  _run_loop: Option<RunLoopThread>,
}

impl SingleThreadScheduler {
  pub fn new() -> Result<Self, SchedulerError> {
    let run_loop = RunLoopThread::builder().name("rxcore-single-thread").spawn()?;
    Ok(Self::with_run_loop(run_loop))
  }

  /// Takes ownership of `run_loop`.
  pub fn with_run_loop(run_loop: RunLoopThread) -> Self {
    SingleThreadScheduler { handle: run_loop.handle(), _run_loop: Some(run_loop) }
  }

  /// Posts to a loop owned elsewhere.
  pub fn from_handle(handle: RunLoopHandle) -> Self {
    SingleThreadScheduler { handle, _run_loop: None }
  }

  /// A cloneable scheduler posting to the same thread.
  #[inline]
  pub fn handle(&self) -> RunLoopHandle { self.handle.clone() }
}

impl Scheduler for SingleThreadScheduler {
  #[inline]
  fn schedule(&self, task: Task, delay: Option<Duration>) -> Result<Disposable, SchedulerError> {
    self.handle.schedule(task, delay)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use std::{
    sync::mpsc,
    thread,
    time::Instant,
  };

  #[test]
  fn every_task_runs_on_the_same_thread() {
    let scheduler = SingleThreadScheduler::new().unwrap();
    let (tx, rx) = mpsc::channel();
    for _ in 0..3 {
      let tx = tx.clone();
      scheduler
        .schedule_work(move || {
          let _ = tx.send(thread::current().id());
        })
        .unwrap();
    }
    let ids: Vec<_> = (0..3).map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap()).collect();
    assert!(ids.iter().all(|id| *id == ids[0]));
    assert_ne!(ids[0], thread::current().id());
  }

  #[test]
  fn running_task_sees_stop_when_dropped() {
    let scheduler = SingleThreadScheduler::new().unwrap();
    let handle = scheduler.handle();
    let (tx, rx) = mpsc::channel();
    let (started_tx, started_rx) = mpsc::channel();
    scheduler
      .schedule_work(move || {
        let _ = started_tx.send(());
        let deadline = Instant::now() + Duration::from_secs(5);
        while !handle.is_stopped() && Instant::now() < deadline {
          thread::sleep(Duration::from_millis(1));
        }
        let _ = tx.send(handle.schedule_work(|| {}).map(|_| ()));
      })
      .unwrap();
    started_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    drop(scheduler);

    let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(matches!(result, Err(SchedulerError::ExecutionStopped)));
  }

  #[test]
  fn borrowed_loop_outlives_scheduler() {
    let run_loop = RunLoopThread::builder().spawn().unwrap();
    let scheduler = SingleThreadScheduler::from_handle(run_loop.handle());
    drop(scheduler);
    let (tx, rx) = mpsc::channel();
    run_loop.post_work(move || { let _ = tx.send(1); }).unwrap();
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(1));
  }
}
