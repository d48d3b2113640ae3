use std::io;

/// Failures reported by schedulers and the timer thread.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
  /// The target scheduler has begun shutting down and accepts no more work.
  #[error("the scheduler has stopped accepting work")]
  ExecutionStopped,
  /// The call violated a documented precondition.
  #[error("precondition violated: {0}")]
  Precondition(&'static str),
  /// A worker thread could not be started.
  #[error("failed to spawn a scheduler thread")]
  Spawn(#[from] io::Error),
}

impl SchedulerError {
  #[inline]
  pub fn is_stopped(&self) -> bool { matches!(self, SchedulerError::ExecutionStopped) }
}
