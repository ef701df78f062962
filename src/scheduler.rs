//! Timer and task capabilities used by time-based sources.
//!
//! `interval` and `from_future` never touch an executor directly; they go
//! through a [`Scheduler`], which makes them deterministic under
//! [`TestScheduler`] and lets applications pick their runtime.

use futures::future::{AbortHandle, FutureExt, LocalBoxFuture};
pub use std::time::Duration;

use crate::{
  error::ScheduleError,
  subscription::{SubscriptionLike, Teardown},
};

mod test_scheduler;
pub use test_scheduler::TestScheduler;

#[cfg(feature = "futures-scheduler")]
mod local_pool;
#[cfg(feature = "futures-scheduler")]
pub use local_pool::LocalPoolScheduler;

#[cfg(feature = "tokio-scheduler")]
mod tokio_scheduler;
#[cfg(feature = "tokio-scheduler")]
pub use tokio_scheduler::TokioScheduler;

/// Shortest period [`Scheduler::schedule_repeating`] runs at. Shorter
/// periods, including zero, are raised to it so a repeating task always
/// waits on the clock between runs.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// A Scheduler runs single-threaded tasks and provides sleeps on its own
/// clock.
pub trait Scheduler: Clone + 'static {
  /// Hand `task` to the executor. The returned handle aborts it.
  fn spawn(&self, task: LocalBoxFuture<'static, ()>) -> Result<TaskHandle, ScheduleError>;

  /// A future resolving after `duration` has elapsed on this scheduler's
  /// clock.
  fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;

  /// Run `task` every `period`, starting one period from now, until the
  /// returned handle is cancelled. `period` is at least [`MIN_PERIOD`].
  fn schedule_repeating(
    &self, period: Duration, mut task: impl FnMut() + 'static,
  ) -> Result<TaskHandle, ScheduleError> {
    let period = period.max(MIN_PERIOD);
    let scheduler = self.clone();
    self.spawn(
      async move {
        loop {
          scheduler.sleep(period).await;
          task();
        }
      }
      .boxed_local(),
    )
  }
}

/// Cancel handle of a spawned task.
#[derive(Clone, Debug)]
pub struct TaskHandle(AbortHandle);

impl TaskHandle {
  /// Make `task` abortable, returning the wrapped future and its handle.
  ///
  /// Scheduler implementations spawn the returned future in place of the
  /// original one.
  pub fn wrap(task: LocalBoxFuture<'static, ()>) -> (LocalBoxFuture<'static, ()>, TaskHandle) {
    let (task, handle) = futures::future::abortable(task);
    (task.map(|_| ()).boxed_local(), TaskHandle(handle))
  }

  #[inline]
  pub fn cancel(&self) { self.0.abort() }

  #[inline]
  pub fn is_cancelled(&self) -> bool { self.0.is_aborted() }
}

impl SubscriptionLike for TaskHandle {
  #[inline]
  fn unsubscribe(&self) { self.cancel() }

  #[inline]
  fn is_closed(&self) -> bool { self.is_cancelled() }
}

impl From<TaskHandle> for Teardown {
  #[inline]
  fn from(handle: TaskHandle) -> Self { Teardown::child(handle) }
}
