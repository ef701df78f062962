//! Hot multicast [`Subject`].

use std::{
  cell::RefCell,
  panic::{catch_unwind, AssertUnwindSafe},
  rc::{Rc, Weak},
};

use crate::{
  observable::Observable,
  observer::Observer,
  subscriber::Subscriber,
  subscription::{Subscription, Teardown},
};

mod subscribers;
use subscribers::Subscribers;

/// A Subject is both an observer and an observable: every value it receives
/// is broadcast to the observers registered at that moment.
///
/// - Broadcasts go out in registration order, over a snapshot taken when the
///   broadcast starts. Observers registered during a broadcast only see the
///   next one; observers released during a broadcast see nothing more.
/// - A panicking observer is detached and logged; the others still receive
///   the notification.
/// - After `error` or `complete` the subject is stopped. Late subscribers
///   receive the terminal notification right away.
///
/// Clones share the same observer list.
pub struct Subject<Item, Err>(Rc<RefCell<SubjectState<Item, Err>>>);

struct SubjectState<Item, Err> {
  subscribers: Subscribers<Item, Err>,
  stopped: Option<Stopped<Err>>,
}

#[derive(Clone)]
enum Stopped<Err> {
  Errored(Err),
  Completed,
}

impl<Item, Err> Clone for Subject<Item, Err> {
  fn clone(&self) -> Self { Subject(self.0.clone()) }
}

impl<Item, Err> Default for Subject<Item, Err> {
  fn default() -> Self {
    Subject(Rc::new(RefCell::new(SubjectState {
      subscribers: Subscribers::default(),
      stopped: None,
    })))
  }
}

impl<Item, Err> Subject<Item, Err> {
  pub fn new() -> Self { Self::default() }

  /// Number of currently registered observers.
  pub fn observer_count(&self) -> usize { self.0.borrow().subscribers.len() }

  /// Whether `error` or `complete` has been received.
  pub fn is_stopped(&self) -> bool { self.0.borrow().stopped.is_some() }

  fn detach(&self, id: usize) {
    let removed = self.0.borrow_mut().subscribers.remove(id);
    if let Some(subscriber) = removed {
      subscriber.close();
    }
  }

  // Runs one delivery, isolating a panicking observer from the others.
  fn deliver(&self, id: usize, delivery: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(delivery)).is_err() {
      tracing::error!(observer = id, "observer panicked during broadcast; detaching it");
      self.detach(id);
    }
  }
}

impl<Item: 'static, Err: Clone + 'static> Subject<Item, Err> {
  /// Register `observer`. The returned subscription removes exactly this
  /// registration.
  pub fn subscribe<O>(&self, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + 'static,
  {
    let subscriber = Subscriber::new(observer);
    let subscription = Subscription::new();
    let c_subscriber = subscriber.clone();
    subscription.add_teardown(move || c_subscriber.close());
    subscription.add(self.register(subscriber));
    subscription
  }

  /// View this subject as an [`Observable`]; subscribing to it registers
  /// with the subject.
  pub fn to_observable(&self) -> Observable<Item, Err> {
    let subject = self.clone();
    Observable::create(move |subscriber| subject.register(subscriber))
  }

  pub(crate) fn register(&self, subscriber: Subscriber<Item, Err>) -> Teardown {
    let stopped = self.0.borrow().stopped.clone();
    match stopped {
      Some(Stopped::Errored(err)) => {
        subscriber.error(err);
        return Teardown::noop();
      }
      Some(Stopped::Completed) => {
        subscriber.complete();
        return Teardown::noop();
      }
      None => {}
    }

    let id = self.0.borrow_mut().subscribers.add(subscriber);
    let state: Weak<_> = Rc::downgrade(&self.0);
    Teardown::new(move || {
      if let Some(state) = state.upgrade() {
        Subject(state).detach(id);
      }
    })
  }
}

impl<Item, Err> Observer<Item, Err> for Subject<Item, Err>
where
  Item: Clone,
  Err: Clone,
{
  fn next(&mut self, value: Item) {
    let snapshot = {
      let state = self.0.borrow();
      if state.stopped.is_some() {
        return;
      }
      state.subscribers.snapshot()
    };

    for (id, mut subscriber) in snapshot {
      if !self.0.borrow().subscribers.contains(id) {
        continue;
      }
      let value = value.clone();
      self.deliver(id, move || subscriber.next(value));
    }
  }

  fn error(self, err: Err) {
    let drained = {
      let mut state = self.0.borrow_mut();
      if state.stopped.is_some() {
        return;
      }
      state.stopped = Some(Stopped::Errored(err.clone()));
      state.subscribers.drain()
    };
    for (id, subscriber) in drained {
      let err = err.clone();
      self.deliver(id, move || subscriber.error(err));
    }
  }

  fn complete(self) {
    let drained = {
      let mut state = self.0.borrow_mut();
      if state.stopped.is_some() {
        return;
      }
      state.stopped = Some(Stopped::Completed);
      state.subscribers.drain()
    };
    for (id, subscriber) in drained {
      self.deliver(id, move || subscriber.complete());
    }
  }

  fn is_closed(&self) -> bool { self.is_stopped() }
}

impl<Item, Err> From<Subject<Item, Err>> for Observable<Item, Err>
where
  Item: 'static,
  Err: Clone + 'static,
{
  fn from(subject: Subject<Item, Err>) -> Self { subject.to_observable() }
}

impl<Item, Err> std::fmt::Debug for Subject<Item, Err> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let state = self.0.borrow();
    f.debug_struct("Subject")
      .field("observers", &state.subscribers.len())
      .field("stopped", &state.stopped.is_some())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use tracing_test::traced_test;

  use super::*;
  use crate::{observer::FnObserver, subscription::SubscriptionLike};

  type Log = Rc<RefCell<Vec<String>>>;

  fn logged(name: &'static str, log: &Log) -> impl Observer<i32, String> + 'static {
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    FnObserver::new(
      move |v: i32| l1.borrow_mut().push(format!("{name} next {v}")),
      move |e: String| l2.borrow_mut().push(format!("{name} error {e}")),
      move || l3.borrow_mut().push(format!("{name} complete")),
    )
  }

  #[test]
  fn broadcasts_in_registration_order() {
    let mut subject = Subject::<i32, String>::new();
    let log = Log::default();
    subject.subscribe(logged("a", &log));
    subject.subscribe(logged("b", &log));

    subject.next(1);
    subject.clone().complete();
    subject.next(2);

    assert_eq!(*log.borrow(), vec!["a next 1", "b next 1", "a complete", "b complete"]);
    assert_eq!(subject.observer_count(), 0);
    assert!(subject.is_stopped());
  }

  #[test]
  fn unsubscribe_removes_only_that_registration() {
    let mut subject = Subject::<i32, String>::new();
    let log = Log::default();
    let first = subject.subscribe(logged("x", &log));
    let _second = subject.subscribe(logged("x", &log));
    assert_eq!(subject.observer_count(), 2);

    first.unsubscribe();
    first.unsubscribe();
    assert_eq!(subject.observer_count(), 1);

    subject.next(5);
    assert_eq!(*log.borrow(), vec!["x next 5"]);
  }

  #[test]
  fn subscriber_added_during_broadcast_waits_for_next_value() {
    let mut subject = Subject::<i32, String>::new();
    let log = Log::default();
    let added = Rc::new(Cell::new(false));
    let (c_subject, c_log, c_added) = (subject.clone(), log.clone(), added.clone());
    subject.subscribe(FnObserver::new(
      move |v: i32| {
        c_log.borrow_mut().push(format!("outer next {v}"));
        if !c_added.replace(true) {
          c_subject.subscribe(logged("inner", &c_log));
        }
      },
      |_: String| {},
      || {},
    ));

    subject.next(1);
    subject.next(2);
    assert_eq!(*log.borrow(), vec!["outer next 1", "outer next 2", "inner next 2"]);
  }

  #[test]
  fn subscriber_removed_during_broadcast_sees_nothing() {
    let mut subject = Subject::<i32, String>::new();
    let log = Log::default();
    let victim: Rc<RefCell<Option<Subscription>>> = Rc::default();
    let (c_victim, c_log) = (victim.clone(), log.clone());
    subject.subscribe(FnObserver::new(
      move |v: i32| {
        c_log.borrow_mut().push(format!("first next {v}"));
        if let Some(s) = c_victim.borrow_mut().take() {
          s.unsubscribe();
        }
      },
      |_: String| {},
      || {},
    ));
    *victim.borrow_mut() = Some(subject.subscribe(logged("second", &log)));

    subject.next(1);
    subject.next(2);
    assert_eq!(*log.borrow(), vec!["first next 1", "first next 2"]);
  }

  #[test]
  fn value_emitted_by_an_observer_reaches_it_after_the_current_one() {
    let mut subject = Subject::<i32, String>::new();
    let log = Log::default();
    let (c_subject, c_log) = (subject.clone(), log.clone());
    subject.subscribe(FnObserver::new(
      move |v: i32| {
        c_log.borrow_mut().push(format!("echo next {v}"));
        if v == 1 {
          c_subject.clone().next(2);
          c_log.borrow_mut().push("echo handled 1".into());
        }
      },
      |_: String| {},
      || {},
    ));

    subject.next(1);
    assert_eq!(*log.borrow(), vec!["echo next 1", "echo handled 1", "echo next 2"]);
  }

  #[test]
  #[traced_test]
  fn panicking_observer_is_isolated() {
    let mut subject = Subject::<i32, String>::new();
    let log = Log::default();
    subject.subscribe(FnObserver::new(|_: i32| panic!("bad observer"), |_: String| {}, || {}));
    subject.subscribe(logged("good", &log));

    subject.next(1);
    subject.next(2);

    assert_eq!(*log.borrow(), vec!["good next 1", "good next 2"]);
    assert_eq!(subject.observer_count(), 1);
    assert!(logs_contain("observer panicked during broadcast"));
  }

  #[test]
  fn late_subscriber_gets_terminal() {
    let subject = Subject::<i32, String>::new();
    subject.clone().error("closed".into());
    let log = Log::default();
    let subscription = subject.subscribe(logged("late", &log));

    assert_eq!(*log.borrow(), vec!["late error closed"]);
    assert_eq!(subject.observer_count(), 0);
    subscription.unsubscribe();
  }

  #[test]
  fn observable_view_registers() {
    let mut subject = Subject::<i32, String>::new();
    let log = Log::default();
    let observable: Observable<i32, String> = subject.clone().into();
    let subscription = observable.subscribe(logged("view", &log));
    assert_eq!(subject.observer_count(), 1);

    subject.next(3);
    subscription.unsubscribe();
    assert_eq!(subject.observer_count(), 0);
    subject.next(4);
    assert_eq!(*log.borrow(), vec!["view next 3"]);
  }
}
