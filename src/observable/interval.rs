use std::convert::Infallible;

use crate::{
  observable::{Observable, Subscribable},
  observer::Observer,
  scheduler::{Duration, Scheduler},
  subscriber::Subscriber,
  subscription::Teardown,
};

/// Creates an observable which will fire at `period` time into the future,
/// and will repeat every `period` interval after.
///
/// Tick `i` delivers `i`, starting from 0. The stream never completes; the
/// timer is cancelled when the subscription is released. Periods below
/// [`MIN_PERIOD`](crate::scheduler::MIN_PERIOD) tick at that minimum.
pub fn interval<S>(period: Duration, scheduler: S) -> Observable<usize, Infallible>
where
  S: Scheduler,
{
  Observable::new(IntervalObservable { period, scheduler })
}

#[derive(Clone)]
pub struct IntervalObservable<S> {
  period: Duration,
  scheduler: S,
}

impl<S: Scheduler> Subscribable<usize, Infallible> for IntervalObservable<S> {
  fn actual_subscribe(&self, mut subscriber: Subscriber<usize, Infallible>) -> Teardown {
    let mut seq = 0;
    let tick = move || {
      subscriber.next(seq);
      seq += 1;
    };
    match self.scheduler.schedule_repeating(self.period, tick) {
      Ok(handle) => handle.into(),
      Err(err) => {
        tracing::error!(%err, "interval could not schedule its timer");
        Teardown::noop()
      }
    }
  }
}
