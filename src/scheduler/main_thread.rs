use std::{
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
  thread::{self, ThreadId},
  time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use super::{ImmediateScheduler, Scheduler, Task, TimerManager, WorkItem};
use crate::{error::SchedulerError, subscription::Disposable};

/// A run loop owned by the host application, usually its main thread.
///
/// The host accepts posted closures and runs them in arrival order on its
/// own thread.
pub trait HostRunLoop: Send + Sync {
  fn post_work(&self, work: Task) -> Result<(), SchedulerError>;

  /// Posts `work` to run after `delay`. Disposing the returned handle
  /// cancels the host timer.
  fn post_delayed_work(&self, work: Task, delay: Duration) -> Result<Disposable, SchedulerError>;
}

/// Schedules work onto a [`HostRunLoop`].
///
/// A pending item that is disposed never runs: the host may still fire it,
/// but the task was already dropped.
#[derive(Clone)]
pub struct MainThreadScheduler<H> {
  host: H,
}

impl<H: HostRunLoop> MainThreadScheduler<H> {
  pub fn new(host: H) -> Self { MainThreadScheduler { host } }

  #[inline]
  pub fn host(&self) -> &H { &self.host }
}

impl<H: HostRunLoop> Scheduler for MainThreadScheduler<H> {
  fn schedule(&self, task: Task, delay: Option<Duration>) -> Result<Disposable, SchedulerError> {
    let item = WorkItem::new(task);
    let handle = item.handle();
    match delay {
      None => self.host.post_work(Box::new(move || item.run()))?,
      Some(delay) => {
        let timer = self.host.post_delayed_work(Box::new(move || item.run()), delay)?;
        handle.add(timer);
      }
    }
    Ok(handle)
  }
}

/// A message pump driven by the thread that owns it.
///
/// Posted work queues up until the owner pumps it with
/// [`pump_pending`](MessagePump::pump_pending) or
/// [`run_until`](MessagePump::run_until). Delayed work is held by the global
/// [`TimerManager`] and enters the queue when due. After
/// [`close`](MessagePump::close), posting fails with
/// [`SchedulerError::ExecutionStopped`].
#[derive(Clone)]
pub struct MessagePump {
  sender: Sender<Task>,
  receiver: Receiver<Task>,
  owner: ThreadId,
  closed: Arc<AtomicBool>,
}

impl Default for MessagePump {
  fn default() -> Self { Self::new() }
}

impl MessagePump {
  /// Creates a pump owned by the calling thread.
  pub fn new() -> Self {
    let (sender, receiver) = crossbeam_channel::unbounded();
    MessagePump {
      sender,
      receiver,
      owner: thread::current().id(),
      closed: Arc::new(AtomicBool::new(false)),
    }
  }

  #[inline]
  pub fn owner(&self) -> ThreadId { self.owner }

  /// Stops accepting work and drops whatever is still queued. Every clone
  /// of the pump sees the close.
  pub fn close(&self) {
    if !self.closed.swap(true, Ordering::AcqRel) {
      let dropped = self.receiver.try_iter().count();
      log::debug!("message pump closed, {dropped} queued items dropped");
    }
  }

  #[inline]
  pub fn is_closed(&self) -> bool { self.closed.load(Ordering::Acquire) }

  /// Runs the work already queued and returns how many items ran.
  pub fn pump_pending(&self) -> usize {
    debug_assert_eq!(thread::current().id(), self.owner, "pumped from a foreign thread");
    let mut ran = 0;
    while let Ok(work) = self.receiver.try_recv() {
      if self.is_closed() {
        return ran;
      }
      work();
      ran += 1;
    }
    ran
  }

  /// Runs queued work as it arrives until `deadline`, then returns how many
  /// items ran.
  pub fn run_until(&self, deadline: Instant) -> usize {
    debug_assert_eq!(thread::current().id(), self.owner, "pumped from a foreign thread");
    let mut ran = 0;
    loop {
      match self.receiver.recv_deadline(deadline) {
        Ok(_) if self.is_closed() => return ran,
        Ok(work) => {
          work();
          ran += 1;
        }
        Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => return ran,
      }
    }
  }
}

impl HostRunLoop for MessagePump {
  fn post_work(&self, work: Task) -> Result<(), SchedulerError> {
    if self.is_closed() {
      return Err(SchedulerError::ExecutionStopped);
    }
    self.sender.send(work).map_err(|_| SchedulerError::ExecutionStopped)
  }

  fn post_delayed_work(&self, work: Task, delay: Duration) -> Result<Disposable, SchedulerError> {
    if self.is_closed() {
      return Err(SchedulerError::ExecutionStopped);
    }
    let pump = self.clone();
    let timers = TimerManager::global();
    let id = timers.set_timer_after(delay, ImmediateScheduler, move || {
      if pump.post_work(work).is_err() {
        log::warn!("message pump closed, delayed work dropped");
      }
    })?;
    Ok(Disposable::from_fn(move || {
      timers.cancel_timer(id);
    }))
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn work_runs_on_the_pumping_thread() {
    let pump = MessagePump::new();
    let scheduler = MainThreadScheduler::new(pump.clone());
    let ran_on = Arc::new(Mutex::new(vec![]));
    let c_ran_on = ran_on.clone();
    thread::spawn(move || {
      for _ in 0..3 {
        let ran_on = c_ran_on.clone();
        scheduler
          .schedule_work(move || ran_on.lock().unwrap().push(thread::current().id()))
          .unwrap();
      }
    })
    .join()
    .unwrap();

    assert!(ran_on.lock().unwrap().is_empty());
    assert_eq!(pump.pump_pending(), 3);
    assert_eq!(*ran_on.lock().unwrap(), vec![thread::current().id(); 3]);
  }

  #[test]
  fn disposed_item_is_a_no_op() {
    let pump = MessagePump::new();
    let scheduler = MainThreadScheduler::new(pump.clone());
    let hits = Arc::new(Mutex::new(0));
    let c_hits = hits.clone();
    let handle = scheduler.schedule_work(move || *c_hits.lock().unwrap() += 1).unwrap();
    handle.dispose();
    assert_eq!(pump.pump_pending(), 1);
    assert_eq!(*hits.lock().unwrap(), 0);
  }

  #[test]
  fn delayed_work_arrives_when_due() {
    let pump = MessagePump::new();
    let scheduler = MainThreadScheduler::new(pump.clone());
    let (tx, rx) = std::sync::mpsc::channel();
    let c_tx = tx.clone();
    let start = Instant::now();
    scheduler
      .schedule_delayed_work(move || { let _ = c_tx.send(start.elapsed()); }, Duration::from_millis(20))
      .unwrap();
    let cancelled = scheduler
      .schedule_delayed_work(move || { let _ = tx.send(Duration::ZERO); }, Duration::from_millis(10))
      .unwrap();
    cancelled.dispose();

    pump.run_until(Instant::now() + Duration::from_millis(200));
    let elapsed: Vec<_> = rx.try_iter().collect();
    assert_eq!(elapsed.len(), 1);
    assert!(elapsed[0] >= Duration::from_millis(20));
  }

  #[test]
  fn closed_pump_rejects_work() {
    let pump = MessagePump::new();
    let scheduler = MainThreadScheduler::new(pump.clone());
    let hits = Arc::new(Mutex::new(0));
    let c_hits = hits.clone();
    scheduler.schedule_work(move || *c_hits.lock().unwrap() += 1).unwrap();

    pump.close();
    assert!(pump.is_closed());
    assert!(matches!(
      scheduler.schedule_work(|| {}),
      Err(SchedulerError::ExecutionStopped)
    ));
    assert!(matches!(
      scheduler.schedule_delayed_work(|| {}, Duration::from_millis(5)),
      Err(SchedulerError::ExecutionStopped)
    ));
    assert_eq!(pump.pump_pending(), 0);
    assert_eq!(*hits.lock().unwrap(), 0);
  }

  #[test]
  fn delayed_work_due_after_close_is_dropped() {
    let pump = MessagePump::new();
    let scheduler = MainThreadScheduler::new(pump.clone());
    let hits = Arc::new(Mutex::new(0));
    let c_hits = hits.clone();
    scheduler
      .schedule_delayed_work(move || *c_hits.lock().unwrap() += 1, Duration::from_millis(10))
      .unwrap();
    pump.close();
    assert_eq!(pump.run_until(Instant::now() + Duration::from_millis(100)), 0);
    assert_eq!(*hits.lock().unwrap(), 0);
  }

  #[test]
  fn run_loop_handle_is_a_host() {
    let run_loop = crate::scheduler::RunLoopThread::builder().spawn().unwrap();
    let scheduler = MainThreadScheduler::new(run_loop.handle());
    let (tx, rx) = std::sync::mpsc::channel();
    scheduler.schedule_work(move || { let _ = tx.send(thread::current().id()); }).unwrap();
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).ok(), run_loop.thread_id());
  }
}
