use futures::{
  executor::LocalSpawner,
  future::{FutureExt, LocalBoxFuture},
  task::LocalSpawnExt,
};

use super::{Duration, Scheduler, TaskHandle};
use crate::error::ScheduleError;

/// Runs tasks on a `futures` [`LocalPool`](futures::executor::LocalPool).
///
/// Sleeps are real-time timers from `futures-time`, so the pool must be
/// driven (`run`, `run_until`, ...) for anything to happen.
#[derive(Clone, Debug)]
pub struct LocalPoolScheduler(LocalSpawner);

impl LocalPoolScheduler {
  pub fn new(spawner: LocalSpawner) -> Self { LocalPoolScheduler(spawner) }
}

impl From<LocalSpawner> for LocalPoolScheduler {
  fn from(spawner: LocalSpawner) -> Self { LocalPoolScheduler(spawner) }
}

impl Scheduler for LocalPoolScheduler {
  fn spawn(&self, task: LocalBoxFuture<'static, ()>) -> Result<TaskHandle, ScheduleError> {
    let (task, handle) = TaskHandle::wrap(task);
    self.0.spawn_local(task)?;
    Ok(handle)
  }

  fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
    futures_time::task::sleep(duration.into()).map(|_| ()).boxed_local()
  }
}
