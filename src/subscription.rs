//! Subscriptions: composite, idempotent cancellation tokens.
//!
//! A [`Subscription`] owns an ordered list of [`Teardown`]s. Unsubscribing
//! runs them once, first-in first-out, and leaves the subscription closed.

use std::{
  cell::RefCell,
  fmt::{Debug, Formatter},
  rc::Rc,
};

use smallvec::SmallVec;

/// Anything that can be cancelled.
///
/// Implemented by [`Subscription`], by scheduler task handles and by `()`
/// (a handle to nothing, always closed).
pub trait SubscriptionLike {
  /// Release the resources held by this handle. Calling it more than once
  /// has no further effect.
  fn unsubscribe(&self);

  fn is_closed(&self) -> bool;

  #[doc(hidden)]
  fn as_subscription(&self) -> Option<&Subscription> { None }
}

impl SubscriptionLike for () {
  #[inline]
  fn unsubscribe(&self) {}

  #[inline]
  fn is_closed(&self) -> bool { true }
}

impl<T: SubscriptionLike + ?Sized> SubscriptionLike for Box<T> {
  #[inline]
  fn unsubscribe(&self) { (**self).unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }

  fn as_subscription(&self) -> Option<&Subscription> { (**self).as_subscription() }
}

impl<T: SubscriptionLike + ?Sized> SubscriptionLike for Rc<T> {
  #[inline]
  fn unsubscribe(&self) { (**self).unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }

  fn as_subscription(&self) -> Option<&Subscription> { (**self).as_subscription() }
}

// ============================================================================
// Teardown
// ============================================================================

/// A cleanup step run when a subscription is released.
pub enum Teardown {
  /// Nothing to release, e.g. a source that finished synchronously.
  Noop,
  /// A raw cleanup action.
  Action(Box<dyn FnOnce()>),
  /// Unsubscribe a nested handle. The parent owns the cancellation, not the
  /// child's storage.
  Child(Box<dyn SubscriptionLike>),
}

impl Teardown {
  #[inline]
  pub fn noop() -> Self { Teardown::Noop }

  #[inline]
  pub fn new(action: impl FnOnce() + 'static) -> Self { Teardown::Action(Box::new(action)) }

  #[inline]
  pub fn child(child: impl SubscriptionLike + 'static) -> Self { Teardown::Child(Box::new(child)) }

  fn run(self) {
    match self {
      Teardown::Noop => {}
      Teardown::Action(action) => action(),
      Teardown::Child(child) => child.unsubscribe(),
    }
  }

  fn is_closed(&self) -> bool {
    match self {
      Teardown::Noop => true,
      Teardown::Action(_) => false,
      Teardown::Child(child) => child.is_closed(),
    }
  }
}

impl Default for Teardown {
  fn default() -> Self { Teardown::Noop }
}

impl From<()> for Teardown {
  #[inline]
  fn from(_: ()) -> Self { Teardown::Noop }
}

impl From<Subscription> for Teardown {
  #[inline]
  fn from(subscription: Subscription) -> Self { Teardown::child(subscription) }
}

impl Debug for Teardown {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Teardown::Noop => f.write_str("Teardown::Noop"),
      Teardown::Action(_) => f.write_str("Teardown::Action"),
      Teardown::Child(child) => {
        f.debug_struct("Teardown::Child").field("is_closed", &child.is_closed()).finish()
      }
    }
  }
}

// ============================================================================
// Subscription
// ============================================================================

/// Subscription returned from `Observable::subscribe` to allow unsubscribing.
///
/// Cloning yields another handle to the same token; unsubscribing through any
/// clone releases it for all of them.
#[derive(Clone, Default)]
pub struct Subscription(Rc<RefCell<Inner>>);

#[derive(Default)]
struct Inner {
  closed: bool,
  teardown: SmallVec<[Teardown; 2]>,
}

impl Subscription {
  pub fn new() -> Self { Self::default() }

  /// Create a subscription owning a single teardown.
  pub fn from_teardown(teardown: impl Into<Teardown>) -> Self {
    let subscription = Self::new();
    subscription.add(teardown);
    subscription
  }

  /// Register `child` to be released when this subscription is.
  ///
  /// If this subscription is already closed the teardown runs immediately.
  /// Adding a subscription to itself is ignored.
  pub fn add(&self, child: impl Into<Teardown>) {
    let teardown = child.into();
    if let Teardown::Noop = teardown {
      return;
    }
    if let Teardown::Child(c) = &teardown {
      if self.is_same(&**c) {
        return;
      }
    }

    let mut inner = self.0.borrow_mut();
    if inner.closed {
      drop(inner);
      teardown.run();
    } else {
      inner.teardown.retain(|t| !t.is_closed());
      inner.teardown.push(teardown);
    }
  }

  /// Register a raw cleanup action.
  pub fn add_teardown(&self, action: impl FnOnce() + 'static) { self.add(Teardown::new(action)) }

  /// Number of pending teardowns.
  pub fn teardown_size(&self) -> usize { self.0.borrow().teardown.len() }

  fn is_same(&self, other: &dyn SubscriptionLike) -> bool {
    other.as_subscription().is_some_and(|other| Rc::ptr_eq(&self.0, &other.0))
  }

  /// Activates "RAII" behavior for this subscription. That means
  /// `unsubscribe()` will be called automatically as soon as the returned
  /// value goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `unsubscribe()` is called immediately, which is probably not what you
  /// want!
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard<Self> { SubscriptionGuard(self) }
}

impl SubscriptionLike for Subscription {
  fn unsubscribe(&self) {
    let teardown = {
      let mut inner = self.0.borrow_mut();
      if inner.closed {
        return;
      }
      inner.closed = true;
      std::mem::take(&mut inner.teardown)
    };
    // The borrow is released first: teardowns may re-enter this subscription.
    for t in teardown {
      t.run();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.borrow().closed }

  fn as_subscription(&self) -> Option<&Subscription> { Some(self) }
}

impl Debug for Subscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let inner = self.0.borrow();
    f.debug_struct("Subscription")
      .field("closed", &inner.closed)
      .field("teardown_count", &inner.teardown.len())
      .finish()
  }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
///
/// If you want to drop it immediately, wrap it in its own scope
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard<T: SubscriptionLike>(pub(crate) T);

impl<T: SubscriptionLike> SubscriptionGuard<T> {
  /// Wraps an existing subscription with a guard to enable RAII behavior for
  /// it.
  pub fn new(subscription: T) -> SubscriptionGuard<T> { SubscriptionGuard(subscription) }
}

impl<T: SubscriptionLike> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) { self.0.unsubscribe() }
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use super::*;

  fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Teardown) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let c_log = log.clone();
    let make = move |name: &'static str| {
      let log = c_log.clone();
      Teardown::new(move || log.borrow_mut().push(name))
    };
    (log, make)
  }

  #[test]
  fn teardowns_run_in_registration_order() {
    let (log, make) = recorder();
    let subscription = Subscription::new();
    subscription.add(make("a"));
    subscription.add(make("b"));
    subscription.add(make("c"));

    subscription.unsubscribe();
    assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    assert_eq!(subscription.teardown_size(), 0);
  }

  #[test]
  fn unsubscribe_is_idempotent() {
    let count = Rc::new(Cell::new(0));
    let c_count = count.clone();
    let subscription = Subscription::from_teardown(Teardown::new(move || c_count.set(c_count.get() + 1)));

    subscription.unsubscribe();
    subscription.unsubscribe();
    subscription.clone().unsubscribe();

    assert_eq!(count.get(), 1);
    assert!(subscription.is_closed());
  }

  #[test]
  fn add_child_unsubscribes_child() {
    let parent = Subscription::new();
    let child = Subscription::new();
    parent.add(child.clone());

    assert!(!child.is_closed());
    parent.unsubscribe();
    assert!(child.is_closed());
  }

  #[test]
  fn already_closed_child_is_safe() {
    let parent = Subscription::new();
    let child = Subscription::new();
    child.unsubscribe();
    parent.add(child.clone());
    parent.unsubscribe();
    assert!(child.is_closed());
  }

  #[test]
  fn add_after_close_runs_immediately() {
    let (log, make) = recorder();
    let subscription = Subscription::new();
    subscription.unsubscribe();

    subscription.add(make("late"));
    assert_eq!(*log.borrow(), vec!["late"]);
  }

  #[test]
  fn adding_self_is_ignored() {
    let subscription = Subscription::new();
    subscription.add(subscription.clone());
    assert_eq!(subscription.teardown_size(), 0);
    subscription.unsubscribe();
  }

  #[test]
  fn closed_children_are_pruned_on_add() {
    let parent = Subscription::new();
    let l1 = Subscription::new();
    let l2 = Subscription::new();
    parent.add(l1.clone());
    parent.add(l2);
    assert_eq!(parent.teardown_size(), 2);

    l1.unsubscribe();
    parent.add(Subscription::new());
    assert_eq!(parent.teardown_size(), 2);
  }

  #[test]
  fn teardown_may_reenter() {
    let subscription = Subscription::new();
    let c_subscription = subscription.clone();
    let hits = Rc::new(Cell::new(0));
    let c_hits = hits.clone();
    subscription.add_teardown(move || {
      c_hits.set(c_hits.get() + 1);
      c_subscription.unsubscribe();
    });

    subscription.unsubscribe();
    assert_eq!(hits.get(), 1);
  }

  #[test]
  fn guard_unsubscribes_on_drop() {
    let subscription = Subscription::new();
    {
      let _guard = subscription.clone().unsubscribe_when_dropped();
      assert!(!subscription.is_closed());
    }
    assert!(subscription.is_closed());
  }

  #[test]
  fn guard_wraps_any_handle() {
    let child = Subscription::new();
    let parent = Subscription::from_teardown(child.clone());
    drop(SubscriptionGuard::new(parent));
    assert!(child.is_closed());
  }
}
