use crate::{
  observable::{Observable, Subscribable},
  observer::Observer,
  ops::Operator,
  subscriber::Subscriber,
  subscription::Teardown,
};

/// Creates an operator that emits a clone of `value` for every source
/// element.
pub fn map_to<B>(value: B) -> MapToOp<B> { MapToOp { value } }

#[derive(Clone)]
pub struct MapToOp<B> {
  value: B,
}

impl<Item, Err, B> Operator<Item, Err> for MapToOp<B>
where
  Item: 'static,
  Err: 'static,
  B: Clone + 'static,
{
  type OutItem = B;
  type OutErr = Err;

  fn apply(self, source: Observable<Item, Err>) -> Observable<B, Err> {
    Observable::new(MapToObservable { source, value: self.value })
  }
}

pub struct MapToObservable<Item, Err, B> {
  source: Observable<Item, Err>,
  value: B,
}

impl<Item, Err, B> Subscribable<B, Err> for MapToObservable<Item, Err, B>
where
  Item: 'static,
  Err: 'static,
  B: Clone + 'static,
{
  fn actual_subscribe(&self, subscriber: Subscriber<B, Err>) -> Teardown {
    self.source.subscribe(MapToObserver { observer: subscriber, value: self.value.clone() }).into()
  }
}

pub struct MapToObserver<O, B> {
  observer: O,
  value: B,
}

impl<Item, Err, O, B> Observer<Item, Err> for MapToObserver<O, B>
where
  O: Observer<B, Err>,
  B: Clone,
{
  fn next(&mut self, _: Item) { self.observer.next(self.value.clone()) }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
