use std::convert::Infallible;

use crate::{
  observable::Observable,
  observer::Observer,
  subscription::Teardown,
};

/// Creates an observable producing a multiple values.
///
/// Completes immediately after emitting the values given. Never emits an error.
///
/// # Examples
///
/// ```
/// use rxlite::{of_sequence, prelude::*};
///
/// of_sequence!(1, 2, 3).subscribe(FnMutObserver(|v| println!("{},", v)));
///
/// // print log:
/// // 1
/// // 2
/// // 3
/// ```
#[macro_export]
macro_rules! of_sequence {
  ( $( $item:expr ),* $(,)? ) => {
    $crate::observable::from_iter([ $( $item ),* ])
  };
}

/// Creates an observable producing a single value.
///
/// Completes immediately after emitting the value given. Never emits an error.
///
/// ```
/// use rxlite::prelude::*;
///
/// observable::of(123).subscribe(FnMutObserver(|v| println!("{},", v)));
/// ```
pub fn of<Item>(v: Item) -> Observable<Item, Infallible>
where
  Item: Clone + 'static,
{
  Observable::create(move |mut subscriber| {
    subscriber.next(v.clone());
    subscriber.complete();
    Teardown::noop()
  })
}

/// Creates an observable that produces values from an iterator.
///
/// Completes when all elements have been emitted. Never emits an error. The
/// iterable is cloned for every subscription, so each subscriber sees the
/// whole sequence. Emission stops early once the subscriber is closed.
///
/// ```
/// use rxlite::prelude::*;
///
/// observable::from_iter(vec![0, 1, 2, 3])
///   .subscribe(FnMutObserver(|v| println!("{},", v)));
/// ```
pub fn from_iter<Iter>(iter: Iter) -> Observable<Iter::Item, Infallible>
where
  Iter: IntoIterator + Clone + 'static,
  Iter::Item: 'static,
{
  Observable::create(move |mut subscriber| {
    for v in iter.clone() {
      if subscriber.is_closed() {
        return Teardown::noop();
      }
      subscriber.next(v);
    }
    subscriber.complete();
    Teardown::noop()
  })
}

/// Creates an observable that emits value or the error from a [`Result`]
/// given.
///
/// Completes immediately after emitting the value.
pub fn of_result<Item, Err>(r: Result<Item, Err>) -> Observable<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  Observable::create(move |mut subscriber| {
    match r.clone() {
      Ok(v) => {
        subscriber.next(v);
        subscriber.complete();
      }
      Err(e) => subscriber.error(e),
    }
    Teardown::noop()
  })
}

/// Creates an observable that completes immediately without emitting.
pub fn empty<Item: 'static>() -> Observable<Item, Infallible> {
  Observable::create(|subscriber| {
    subscriber.complete();
    Teardown::noop()
  })
}

/// Creates an observable that emits no items, just terminates with an error.
pub fn throw_err<Item, Err>(e: Err) -> Observable<Item, Err>
where
  Item: 'static,
  Err: Clone + 'static,
{
  Observable::create(move |subscriber| {
    subscriber.error(e.clone());
    Teardown::noop()
  })
}
