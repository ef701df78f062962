use futures::future::{FutureExt, LocalBoxFuture};

use super::{Duration, Scheduler, TaskHandle};
use crate::error::ScheduleError;

/// Spawns onto the current tokio [`LocalSet`](tokio::task::LocalSet).
///
/// Subscribing a source that uses this scheduler outside of a `LocalSet`
/// panics inside tokio.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
  fn spawn(&self, task: LocalBoxFuture<'static, ()>) -> Result<TaskHandle, ScheduleError> {
    let (task, handle) = TaskHandle::wrap(task);
    tokio::task::spawn_local(task);
    Ok(handle)
  }

  fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
    tokio::time::sleep(duration).boxed_local()
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use tokio::task::LocalSet;

  use super::*;

  #[tokio::test]
  async fn repeating_on_local_set() {
    let ticks = Rc::new(Cell::new(0));
    let c_ticks = ticks.clone();
    LocalSet::new()
      .run_until(async move {
        let handle = TokioScheduler
          .schedule_repeating(Duration::from_millis(1), move || c_ticks.set(c_ticks.get() + 1))
          .unwrap();
        while ticks.get() < 3 {
          tokio::time::sleep(Duration::from_millis(1)).await;
        }
        handle.cancel();
      })
      .await;
  }
}
