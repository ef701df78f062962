//! The [`Observable`] type and its creation functions.

use std::{fmt::Debug, rc::Rc};

use crate::{
  observer::{FnObserver, Observer},
  ops::{self, Operator},
  subscriber::Subscriber,
  subscription::{Subscription, Teardown},
};

mod of;
pub use of::*;
mod interval;
pub use interval::*;
mod from_future;
pub use from_future::*;
mod fork_join;
pub use fork_join::*;

/// A concrete source of values.
///
/// Sources and operators are plain structs implementing this trait; an
/// [`Observable`] erases one of them so that operator chains keep a single
/// nameable type. Closures `Fn(Subscriber) -> Teardown` are sources too.
pub trait Subscribable<Item, Err> {
  /// Start one execution, delivering into `subscriber`. The returned
  /// teardown stops it.
  fn actual_subscribe(&self, subscriber: Subscriber<Item, Err>) -> Teardown;
}

impl<Item, Err, F> Subscribable<Item, Err> for F
where
  F: Fn(Subscriber<Item, Err>) -> Teardown,
{
  fn actual_subscribe(&self, subscriber: Subscriber<Item, Err>) -> Teardown { self(subscriber) }
}

/// A representation of any set of values over any amount of time.
///
/// An `Observable` is lazy: its source runs once per `subscribe` and every
/// subscription is an independent execution. Cloning is cheap and shares the
/// source.
pub struct Observable<Item, Err> {
  source: Rc<dyn Subscribable<Item, Err>>,
}

impl<Item, Err> Clone for Observable<Item, Err> {
  fn clone(&self) -> Self { Observable { source: self.source.clone() } }
}

impl<Item, Err> Debug for Observable<Item, Err> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("Observable")
  }
}

impl<Item: 'static, Err: 'static> Observable<Item, Err> {
  /// Erase a concrete source.
  pub fn new<S>(source: S) -> Self
  where
    S: Subscribable<Item, Err> + 'static,
  {
    Observable { source: Rc::new(source) }
  }

  /// param `producer`: the function that is called when the Observable is
  /// subscribed to. It receives a [`Subscriber`], to which new values can be
  /// `next`ed, or an `error` method can be called to raise an error, or
  /// `complete` can be called to notify of a successful completion. The
  /// returned [`Teardown`] runs when the subscription is released.
  ///
  /// ```rust
  /// use rxlite::prelude::*;
  ///
  /// let numbers = Observable::<i32, ()>::create(|mut subscriber| {
  ///   subscriber.next(1);
  ///   subscriber.next(2);
  ///   subscriber.complete();
  ///   Teardown::noop()
  /// });
  /// numbers.subscribe_all(|v| println!("{v}"), |_| {}, || println!("done"));
  /// ```
  pub fn create<F>(producer: F) -> Self
  where
    F: Fn(Subscriber<Item, Err>) -> Teardown + 'static,
  {
    Observable::new(producer)
  }

  /// Run the producer for `observer`.
  ///
  /// The returned subscription first detaches the observer, so anything the
  /// producer emits afterwards is dropped, then runs the producer's teardown.
  pub fn subscribe<O>(&self, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + 'static,
  {
    let subscriber = Subscriber::new(observer);
    let subscription = Subscription::new();
    let c_subscriber = subscriber.clone();
    subscription.add_teardown(move || c_subscriber.close());
    subscription.add(self.produce(subscriber));
    subscription
  }

  // Runs the producer alone; the caller owns closing `subscriber`.
  pub(crate) fn produce(&self, subscriber: Subscriber<Item, Err>) -> Teardown {
    self.source.actual_subscribe(subscriber)
  }

  /// Subscribe with one closure per channel.
  pub fn subscribe_all<N, E, C>(&self, next: N, error: E, complete: C) -> Subscription
  where
    N: FnMut(Item) + 'static,
    E: FnOnce(Err) + 'static,
    C: FnOnce() + 'static,
  {
    self.subscribe(FnObserver::new(next, error, complete))
  }

  /// Apply `operator`, or a tuple of operators from left to right.
  ///
  /// Nothing is subscribed here; the returned observable subscribes upstream
  /// when it is subscribed itself.
  pub fn pipe<Op>(self, operator: Op) -> Observable<Op::OutItem, Op::OutErr>
  where
    Op: Operator<Item, Err>,
  {
    operator.apply(self)
  }

  /// Creates a new stream which calls a closure on each element and uses
  /// its return as the value.
  pub fn map<B, F>(self, f: F) -> Observable<B, Err>
  where
    B: 'static,
    F: FnMut(Item) -> B + Clone + 'static,
  {
    self.pipe(ops::map(f))
  }

  /// Invokes `f` with a reference to each element and passes the element on
  /// unchanged.
  pub fn tap<F>(self, f: F) -> Observable<Item, Err>
  where
    F: FnMut(&Item) + Clone + 'static,
  {
    self.pipe(ops::tap(f))
  }

  /// Replaces every element with a clone of `value`.
  pub fn map_to<B>(self, value: B) -> Observable<B, Err>
  where
    B: Clone + 'static,
  {
    self.pipe(ops::map_to(value))
  }

  /// Multicast this observable through one upstream subscription, connected
  /// while at least one subscriber is present.
  pub fn share(self) -> Observable<Item, Err>
  where
    Item: Clone,
    Err: Clone,
  {
    self.pipe(ops::share())
  }
}
