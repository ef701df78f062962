//! Library-level errors.
//!
//! Stream errors are always the user's own `Err` type and travel through
//! `Observer::error`. The types here only describe failures of the host
//! environment a source depends on, such as an executor refusing a task.

use futures::task::SpawnError;
use thiserror::Error;

/// Failure to hand a task over to a [`Scheduler`](crate::scheduler::Scheduler).
#[derive(Debug, Error)]
pub enum ScheduleError {
  /// The underlying executor refused the task, usually because it has been
  /// shut down.
  #[error("executor refused to spawn task: {0}")]
  Spawn(#[from] SpawnError),

  /// `TestScheduler::init()` has not been called on this thread.
  #[error("TestScheduler::init() must be called before scheduling")]
  Uninitialized,
}
