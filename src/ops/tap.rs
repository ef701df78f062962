use crate::{
  observable::{Observable, Subscribable},
  observer::Observer,
  ops::Operator,
  subscriber::Subscriber,
  subscription::Teardown,
};

/// Creates an operator that invokes `func` with a reference to each element
/// for its side effect and passes the element on unchanged.
pub fn tap<F>(func: F) -> TapOp<F> { TapOp { func } }

#[derive(Clone)]
pub struct TapOp<F> {
  func: F,
}

impl<Item, Err, F> Operator<Item, Err> for TapOp<F>
where
  Item: 'static,
  Err: 'static,
  F: FnMut(&Item) + Clone + 'static,
{
  type OutItem = Item;
  type OutErr = Err;

  fn apply(self, source: Observable<Item, Err>) -> Observable<Item, Err> {
    Observable::new(TapObservable { source, func: self.func })
  }
}

pub struct TapObservable<Item, Err, F> {
  source: Observable<Item, Err>,
  func: F,
}

impl<Item, Err, F> Subscribable<Item, Err> for TapObservable<Item, Err, F>
where
  Item: 'static,
  Err: 'static,
  F: FnMut(&Item) + Clone + 'static,
{
  fn actual_subscribe(&self, subscriber: Subscriber<Item, Err>) -> Teardown {
    self.source.subscribe(TapObserver { observer: subscriber, func: self.func.clone() }).into()
  }
}

pub struct TapObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, Err, O, F> Observer<Item, Err> for TapObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item),
{
  fn next(&mut self, value: Item) {
    (self.func)(&value);
    self.observer.next(value)
  }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
