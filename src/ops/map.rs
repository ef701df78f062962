use crate::{
  observable::{Observable, Subscribable},
  observer::Observer,
  ops::Operator,
  subscriber::Subscriber,
  subscription::Teardown,
};

/// Creates an operator which calls a closure on each element and uses its
/// return as the value.
///
/// Every subscription gets its own clone of the closure, so state captured by
/// value is not shared between subscribers.
pub fn map<F>(func: F) -> MapOp<F> { MapOp { func } }

#[derive(Clone)]
pub struct MapOp<F> {
  func: F,
}

impl<Item, Err, B, F> Operator<Item, Err> for MapOp<F>
where
  Item: 'static,
  Err: 'static,
  B: 'static,
  F: FnMut(Item) -> B + Clone + 'static,
{
  type OutItem = B;
  type OutErr = Err;

  fn apply(self, source: Observable<Item, Err>) -> Observable<B, Err> {
    Observable::new(MapObservable { source, func: self.func })
  }
}

pub struct MapObservable<Item, Err, F> {
  source: Observable<Item, Err>,
  func: F,
}

impl<Item, Err, B, F> Subscribable<B, Err> for MapObservable<Item, Err, F>
where
  Item: 'static,
  Err: 'static,
  B: 'static,
  F: FnMut(Item) -> B + Clone + 'static,
{
  fn actual_subscribe(&self, subscriber: Subscriber<B, Err>) -> Teardown {
    self.source.subscribe(MapObserver { observer: subscriber, func: self.func.clone() }).into()
  }
}

pub struct MapObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, Err, B, O, F> Observer<Item, Err> for MapObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> B,
{
  fn next(&mut self, value: Item) { self.observer.next((self.func)(value)) }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, convert::Infallible, rc::Rc};

  use crate::{
    observable::{from_iter, of_result, Observable},
    observer::{FnMutObserver, FnObserver},
    subscription::{SubscriptionLike, Teardown},
  };

  #[test]
  fn primitive_type() {
    let mut sum = 0;
    let total = Rc::new(RefCell::new(0));
    let c_total = total.clone();
    from_iter(100..101)
      .map(|v| v * 2)
      .subscribe(FnMutObserver(move |v| *c_total.borrow_mut() += v));
    sum += *total.borrow();
    assert_eq!(sum, 200);
  }

  #[test]
  fn reference_lifetime_should_work() {
    let seen = Rc::new(RefCell::new(String::new()));
    let c_seen = seen.clone();
    from_iter(vec!["a", "b"])
      .map(|s: &str| s.to_uppercase())
      .subscribe(FnMutObserver(move |s: String| c_seen.borrow_mut().push_str(&s)));
    assert_eq!(*seen.borrow(), "AB");
  }

  #[test]
  fn closure_state_is_per_subscription() {
    let counted = from_iter(vec!['a', 'b']).map({
      let mut n = 0;
      move |c| {
        n += 1;
        format!("{c}{n}")
      }
    });
    let seen = Rc::new(RefCell::new(vec![]));
    for _ in 0..2 {
      let c_seen = seen.clone();
      counted.subscribe(FnMutObserver(move |v| c_seen.borrow_mut().push(v)));
    }
    assert_eq!(*seen.borrow(), vec!["a1", "b2", "a1", "b2"]);
  }

  #[test]
  fn forwards_error_once() {
    let log = Rc::new(RefCell::new(vec![]));
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    of_result(Err::<i32, _>("bad")).map(|v| v + 1).subscribe(FnObserver::new(
      move |v: i32| l1.borrow_mut().push(format!("next {v}")),
      move |e: &str| l2.borrow_mut().push(format!("error {e}")),
      move || l3.borrow_mut().push("complete".to_string()),
    ));
    assert_eq!(*log.borrow(), vec!["error bad"]);
  }

  #[test]
  fn teardown_reaches_upstream() {
    let released = Rc::new(RefCell::new(false));
    let c_released = released.clone();
    let source = Observable::<i32, Infallible>::create(move |_| {
      let c_released = c_released.clone();
      Teardown::new(move || *c_released.borrow_mut() = true)
    });
    let subscription = source.map(|v| v + 1).subscribe(FnMutObserver(|_| {}));
    assert!(!*released.borrow());
    subscription.unsubscribe();
    assert!(*released.borrow());
  }
}
