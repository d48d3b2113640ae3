//! Where and when work runs.
//!
//! A [`Scheduler`] accepts a [`Task`], optionally delayed, and returns the
//! [`Disposable`] that cancels it while it is pending. The concrete
//! schedulers:
//!
//! | Scheduler | Runs work |
//! |-----------|-----------|
//! | [`ImmediateScheduler`] | synchronously, blocking for delays |
//! | [`TrampolineScheduler`] | on the calling thread, queued behind the work already running |
//! | [`SingleThreadScheduler`] | on one dedicated [`RunLoopThread`] |
//! | [`MainThreadScheduler`] | on a host run loop, see [`HostRunLoop`] |
//! | `ThreadPoolScheduler` | on a `futures` thread pool (feature `futures-scheduler`) |
//!
//! Delayed work for schedulers without a clock of their own goes through
//! the shared [`TimerManager`].

mod immediate;
mod main_thread;
mod run_loop;
mod single_thread;
#[cfg(feature = "futures-scheduler")]
mod thread_pool;
mod timer_manager;
mod trampoline;
mod work_item;

use std::sync::Arc;

pub use immediate::*;
pub use main_thread::*;
pub use run_loop::*;
pub use single_thread::*;
pub use std::time::{Duration, Instant};
#[cfg(feature = "futures-scheduler")]
pub use thread_pool::*;
pub use timer_manager::*;
pub use trampoline::*;
pub(crate) use work_item::*;

use crate::{error::SchedulerError, subscription::Disposable};

/// A unit of work handed to a scheduler.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

pub trait Scheduler: Send + Sync {
  /// Runs `task` after `delay` (as soon as possible with `None`).
  ///
  /// Disposing the returned handle before the task starts cancels it. Fails
  /// with [`SchedulerError::ExecutionStopped`] once the scheduler stopped
  /// accepting work.
  fn schedule(&self, task: Task, delay: Option<Duration>) -> Result<Disposable, SchedulerError>;

  #[inline]
  fn schedule_work<F>(&self, work: F) -> Result<Disposable, SchedulerError>
  where
    F: FnOnce() + Send + 'static,
    Self: Sized,
  {
    self.schedule(Box::new(work), None)
  }

  #[inline]
  fn schedule_delayed_work<F>(&self, work: F, delay: Duration) -> Result<Disposable, SchedulerError>
  where
    F: FnOnce() + Send + 'static,
    Self: Sized,
  {
    self.schedule(Box::new(work), Some(delay))
  }
}

impl<S: Scheduler + ?Sized> Scheduler for Arc<S> {
  #[inline]
  fn schedule(&self, task: Task, delay: Option<Duration>) -> Result<Disposable, SchedulerError> {
    (**self).schedule(task, delay)
  }
}

impl<S: Scheduler + ?Sized> Scheduler for Box<S> {
  #[inline]
  fn schedule(&self, task: Task, delay: Option<Duration>) -> Result<Disposable, SchedulerError> {
    (**self).schedule(task, delay)
  }
}
