//! Observer trait and implementations
//!
//! The Observer trait defines the consumer of data in the reactive pattern.
//! It provides three methods: next (for values), error (for errors), and
//! complete (for stream completion).

use std::convert::Infallible;

// ============================================================================
// Observer Trait
// ============================================================================

/// Observer trait: The consumer of data in reactive programming
///
/// An Observer receives values, errors, and completion notifications from
/// an Observable.
pub trait Observer<Item, Err> {
  /// Receive the next value from the observable
  fn next(&mut self, value: Item);

  /// Handle an error from the observable
  ///
  /// This consumes the observer, as no more values can be emitted after an
  /// error
  fn error(self, err: Err);

  /// Handle completion of the observable
  ///
  /// This consumes the observer, as no more values can be emitted after
  /// completion
  fn complete(self);

  /// Checks if the observer is closed.
  ///
  /// Sources consult this to stop producing early once nobody is listening
  /// any more.
  fn is_closed(&self) -> bool;
}

// ============================================================================
// DynObserver Trait - Object-safe Observer
// ============================================================================

/// Helper trait to enable object-safe Observers (Box<dyn Observer>)
///
/// Standard Observer trait is not object-safe because `error` and `complete`
/// take `self` by value. DynObserver mirrors the interface but adapts it for
/// vtables.
pub trait DynObserver<Item, Err> {
  fn box_next(&mut self, value: Item);
  fn box_error(self: Box<Self>, err: Err);
  fn box_complete(self: Box<Self>);
  fn box_is_closed(&self) -> bool;
}

impl<T, Item, Err> DynObserver<Item, Err> for T
where
  T: Observer<Item, Err>,
{
  fn box_next(&mut self, value: Item) { self.next(value); }
  fn box_error(self: Box<Self>, err: Err) { self.error(err); }
  fn box_complete(self: Box<Self>) { self.complete(); }
  fn box_is_closed(&self) -> bool { self.is_closed() }
}

/// Boxed value observer (single-threaded, no Send bound)
pub type BoxedObserver<Item, Err> = Box<dyn DynObserver<Item, Err>>;

impl<Item, Err> Observer<Item, Err> for BoxedObserver<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { (**self).box_next(value) }

  #[inline]
  fn error(self, err: Err) { self.box_error(err) }

  #[inline]
  fn complete(self) { self.box_complete() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).box_is_closed() }
}

// ============================================================================
// FnMutObserver - Closure adapter
// ============================================================================

/// Closure adapter for streams that cannot fail.
///
/// The closure becomes the `next` handler. Only implemented for
/// `Err = Infallible` so that a fallible stream cannot silently drop its
/// errors; use [`FnObserver`] to handle all three channels.
#[derive(Clone)]
pub struct FnMutObserver<F>(pub F);

impl<F, Item> Observer<Item, Infallible> for FnMutObserver<F>
where
  F: FnMut(Item),
{
  #[inline]
  fn next(&mut self, v: Item) { (self.0)(v); }

  #[inline]
  fn error(self, err: Infallible) { match err {} }

  #[inline]
  fn complete(self) {}

  #[inline]
  fn is_closed(&self) -> bool { false }
}

/// Observer assembled from three closures, one per channel.
///
/// ```rust
/// use rxlite::prelude::*;
///
/// let obs = FnObserver::new(
///   |v: i32| println!("next {v}"),
///   |e: String| println!("error {e}"),
///   || println!("complete"),
/// );
/// observable::of_result(Ok::<_, String>(1)).subscribe(obs);
/// ```
#[derive(Clone)]
pub struct FnObserver<N, E, C> {
  next: N,
  error: E,
  complete: C,
}

impl<N, E, C> FnObserver<N, E, C> {
  pub fn new(next: N, error: E, complete: C) -> Self { FnObserver { next, error, complete } }
}

impl<Item, Err, N, E, C> Observer<Item, Err> for FnObserver<N, E, C>
where
  N: FnMut(Item),
  E: FnOnce(Err),
  C: FnOnce(),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value) }

  #[inline]
  fn error(self, err: Err) { (self.error)(err) }

  #[inline]
  fn complete(self) { (self.complete)() }

  #[inline]
  fn is_closed(&self) -> bool { false }
}

/// Option observer - None ignores all events, Some delegates to inner
impl<O, Item, Err> Observer<Item, Err> for Option<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if let Some(inner) = self {
      inner.next(value);
    }
  }

  fn error(self, err: Err) {
    if let Some(inner) = self {
      inner.error(err);
    }
  }

  fn complete(self) {
    if let Some(inner) = self {
      inner.complete();
    }
  }

  fn is_closed(&self) -> bool { self.as_ref().is_none_or(|inner| inner.is_closed()) }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;

  struct TestObserver {
    values: Vec<i32>,
  }

  impl Observer<i32, ()> for TestObserver {
    fn next(&mut self, value: i32) { self.values.push(value); }

    fn error(self, _: ()) {}

    fn complete(self) {}

    fn is_closed(&self) -> bool { false }
  }

  #[test]
  fn observer_trait() {
    let mut obs = TestObserver { values: vec![] };
    obs.next(1);
    obs.next(2);
    assert_eq!(obs.values, vec![1, 2]);
    assert!(!obs.is_closed());
  }

  #[test]
  fn closure_as_observer() {
    let mut count = 0;
    let mut closure_obs = FnMutObserver(|v: i32| {
      count += v;
    });

    closure_obs.next(10);
    closure_obs.next(20);
    assert_eq!(count, 30);
  }

  #[test]
  fn fn_observer_routes_every_channel() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    let mut obs = FnObserver::new(
      move |v: i32| l1.borrow_mut().push(format!("next {v}")),
      move |e: &str| l2.borrow_mut().push(format!("error {e}")),
      move || l3.borrow_mut().push("complete".to_string()),
    );
    obs.next(1);
    obs.clone().error("boom");
    obs.complete();

    assert_eq!(*log.borrow(), vec!["next 1", "error boom", "complete"]);
  }

  #[test]
  fn boxed_observer_delegates() {
    let hits = Rc::new(RefCell::new(0));
    let c_hits = hits.clone();
    let mut boxed: BoxedObserver<i32, Infallible> =
      Box::new(FnMutObserver(move |v| *c_hits.borrow_mut() += v));
    boxed.next(3);
    boxed.next(4);
    assert!(!boxed.is_closed());
    boxed.complete();
    assert_eq!(*hits.borrow(), 7);
  }

  #[test]
  fn none_observer_is_closed() {
    let none: Option<TestObserver> = None;
    assert!(none.is_closed());
    let some = Some(TestObserver { values: vec![] });
    assert!(!some.is_closed());
  }
}
