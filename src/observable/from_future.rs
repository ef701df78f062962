use std::{cell::Cell, future::Future, rc::Rc};

use futures::future::{FutureExt, Shared};

use crate::{
  observable::{Observable, Subscribable},
  observer::Observer,
  scheduler::Scheduler,
  subscriber::Subscriber,
  subscription::Teardown,
};

/// Converts a `Future` resolving to a [`Result`] into an observable.
///
/// `Ok(v)` is emitted as `next(v)` followed by `complete`, `Err(e)` as
/// `error(e)`. The future is polled at most once no matter how many
/// subscribers there are; every subscriber observes the same settlement.
/// Releasing a subscription before the future settles suppresses both
/// outcomes for that subscriber.
///
/// ```rust
/// use rxlite::prelude::*;
///
/// TestScheduler::init();
/// let value = std::rc::Rc::new(std::cell::Cell::new(0));
/// let c_value = value.clone();
/// observable::from_future(futures::future::ready(Ok::<_, ()>(1)), TestScheduler)
///   .subscribe_all(move |v| c_value.set(v), |_| {}, || {});
/// TestScheduler::flush();
/// assert_eq!(value.get(), 1);
/// ```
pub fn from_future<F, Item, Err, S>(future: F, scheduler: S) -> Observable<Item, Err>
where
  F: Future<Output = Result<Item, Err>> + 'static,
  Item: Clone + 'static,
  Err: Clone + 'static,
  S: Scheduler,
{
  Observable::new(FromFutureObservable { future: future.shared(), scheduler })
}

pub struct FromFutureObservable<F: Future, S> {
  future: Shared<F>,
  scheduler: S,
}

impl<F, Item, Err, S> Subscribable<Item, Err> for FromFutureObservable<F, S>
where
  F: Future<Output = Result<Item, Err>> + 'static,
  Item: Clone + 'static,
  Err: Clone + 'static,
  S: Scheduler,
{
  fn actual_subscribe(&self, subscriber: Subscriber<Item, Err>) -> Teardown {
    let closed = Rc::new(Cell::new(false));
    let c_closed = closed.clone();
    let future = self.future.clone();
    let task = async move {
      let settled = future.await;
      if c_closed.get() {
        return;
      }
      match settled {
        Ok(v) => {
          let mut subscriber = subscriber;
          subscriber.next(v);
          subscriber.complete();
        }
        Err(e) => subscriber.error(e),
      }
    };

    match self.scheduler.spawn(task.boxed_local()) {
      Ok(handle) => Teardown::new(move || {
        closed.set(true);
        handle.cancel();
      }),
      Err(err) => {
        tracing::error!(%err, "from_future could not schedule its task");
        Teardown::noop()
      }
    }
  }
}
