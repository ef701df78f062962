use std::{cell::RefCell, rc::Rc};

use crate::{
  observable::Observable,
  observer::Observer,
  subscriber::Subscriber,
  subscription::{Subscription, SubscriptionLike, Teardown},
};

/// Waits for every source to complete, then emits the last value of each,
/// in source order, as one `Vec`.
///
/// - If any source errors, the error is forwarded once and every other
///   source is released.
/// - If some source completes without emitting, the result completes without
///   a value.
/// - An empty list of sources emits an empty `Vec` and completes.
///
/// ```rust
/// use rxlite::prelude::*;
///
/// observable::fork_join(vec![observable::of(1), observable::from_iter(vec![2, 3])])
///   .subscribe(FnMutObserver(|v| assert_eq!(v, vec![1, 3])));
/// ```
pub fn fork_join<Item, Err>(sources: Vec<Observable<Item, Err>>) -> Observable<Vec<Item>, Err>
where
  Item: 'static,
  Err: 'static,
{
  Observable::create(move |subscriber| {
    let total = sources.len();
    if total == 0 {
      let mut subscriber = subscriber;
      subscriber.next(Vec::new());
      subscriber.complete();
      return Teardown::noop();
    }

    let state = Rc::new(RefCell::new(ForkJoinState {
      values: (0..total).map(|_| None).collect(),
      completed: 0,
      downstream: Some(subscriber),
    }));
    let siblings = Subscription::new();
    for (index, source) in sources.iter().enumerate() {
      // A synchronous error already released everything.
      if siblings.is_closed() {
        break;
      }
      let observer = ForkJoinObserver { index, state: state.clone(), siblings: siblings.clone() };
      siblings.add(source.subscribe(observer));
    }

    Teardown::new(move || {
      tracing::trace!(sources = total, "fork_join releasing its sources");
      siblings.unsubscribe();
    })
  })
}

struct ForkJoinState<Item, Err> {
  values: Vec<Option<Item>>,
  completed: usize,
  downstream: Option<Subscriber<Vec<Item>, Err>>,
}

struct ForkJoinObserver<Item, Err> {
  index: usize,
  state: Rc<RefCell<ForkJoinState<Item, Err>>>,
  siblings: Subscription,
}

impl<Item, Err> Observer<Item, Err> for ForkJoinObserver<Item, Err> {
  fn next(&mut self, value: Item) {
    let mut state = self.state.borrow_mut();
    if state.downstream.is_some() {
      state.values[self.index] = Some(value);
    }
  }

  fn error(self, err: Err) {
    let downstream = self.state.borrow_mut().downstream.take();
    if let Some(downstream) = downstream {
      self.siblings.unsubscribe();
      downstream.error(err);
    }
  }

  fn complete(self) {
    let finished = {
      let mut state = self.state.borrow_mut();
      state.completed += 1;
      if state.completed < state.values.len() {
        return;
      }
      let values: Option<Vec<Item>> = state.values.drain(..).collect();
      state.downstream.take().map(|downstream| (downstream, values))
    };

    if let Some((mut downstream, values)) = finished {
      if let Some(values) = values {
        downstream.next(values);
      }
      downstream.complete();
    }
  }

  fn is_closed(&self) -> bool {
    self.state.borrow().downstream.as_ref().is_none_or(|d| d.is_closed())
  }
}
