//! The producer-side handle of one subscription.
//!
//! Every observer handed to `Observable::subscribe` is wrapped in a
//! [`Subscriber`]. The wrapper carries the per-subscription closed flag, so a
//! producer can never deliver after a terminal notification or after the
//! subscription was released, whatever the producer itself does.

use std::{cell::RefCell, collections::VecDeque, fmt::Debug, rc::Rc};

use crate::observer::{BoxedObserver, Observer};

/// Shared handle to a downstream observer.
///
/// Clones point at the same observer, which lets asynchronous producers move
/// a handle into callbacks. `error` and `complete` through any clone close all
/// of them.
pub struct Subscriber<Item, Err>(Rc<RefCell<State<Item, Err>>>);

struct State<Item, Err> {
  observer: Option<BoxedObserver<Item, Err>>,
  closed: bool,
  // The observer is moved out of `observer` while a `next` runs.
  delivering: bool,
  // Values emitted while the observer is handling another one, in order.
  queued: VecDeque<Item>,
  pending: Option<Terminal<Err>>,
}

enum Terminal<Err> {
  Error(Err),
  Complete,
}

impl<Item, Err> Subscriber<Item, Err> {
  pub fn new<O>(observer: O) -> Self
  where
    O: Observer<Item, Err> + 'static,
  {
    Subscriber(Rc::new(RefCell::new(State {
      observer: Some(Box::new(observer)),
      closed: false,
      delivering: false,
      queued: VecDeque::new(),
      pending: None,
    })))
  }

  /// Detach the observer without notifying it.
  ///
  /// Values or terminal notifications arriving afterwards are dropped.
  pub fn close(&self) {
    let (observer, queued) = {
      let mut state = self.0.borrow_mut();
      state.closed = true;
      state.pending = None;
      (state.observer.take(), std::mem::take(&mut state.queued))
    };
    drop(queued);
    drop(observer);
  }

  // Hands out the next queued value, unless the subscriber was closed
  // without a terminal to deliver.
  fn next_queued(&self) -> Option<Item> {
    let mut state = self.0.borrow_mut();
    if state.closed && state.pending.is_none() {
      state.queued.clear();
      return None;
    }
    state.queued.pop_front()
  }

  fn finish_delivery(&self, observer: BoxedObserver<Item, Err>) {
    let mut state = self.0.borrow_mut();
    state.delivering = false;
    let pending = state.pending.take();
    if pending.is_none() && !state.closed {
      state.observer = Some(observer);
      return;
    }
    drop(state);
    match pending {
      Some(Terminal::Error(err)) => observer.error(err),
      Some(Terminal::Complete) => observer.complete(),
      None => drop(observer),
    }
  }

  fn terminate(&self, terminal: Terminal<Err>) {
    let observer = {
      let mut state = self.0.borrow_mut();
      if state.closed {
        return;
      }
      state.closed = true;
      if state.delivering {
        // Delivered once the in-flight `next` returns.
        state.pending = Some(terminal);
        return;
      }
      state.observer.take()
    };
    if let Some(observer) = observer {
      match terminal {
        Terminal::Error(err) => observer.error(err),
        Terminal::Complete => observer.complete(),
      }
    }
  }
}

impl<Item, Err> Clone for Subscriber<Item, Err> {
  fn clone(&self) -> Self { Subscriber(self.0.clone()) }
}

impl<Item, Err> Observer<Item, Err> for Subscriber<Item, Err> {
  fn next(&mut self, value: Item) {
    let observer = {
      let mut state = self.0.borrow_mut();
      if state.closed {
        return;
      }
      if state.delivering {
        state.queued.push_back(value);
        drop(state);
        tracing::trace!("queueing value emitted while the observer is handling another one");
        return;
      }
      match state.observer.take() {
        Some(observer) => {
          state.delivering = true;
          observer
        }
        None => return,
      }
    };
    let mut observer = observer;
    observer.next(value);
    while let Some(value) = self.next_queued() {
      observer.next(value);
    }
    self.finish_delivery(observer);
  }

  fn error(self, err: Err) { self.terminate(Terminal::Error(err)) }

  fn complete(self) { self.terminate(Terminal::Complete) }

  fn is_closed(&self) -> bool {
    let state = self.0.borrow();
    state.closed || state.observer.as_ref().is_some_and(|o| o.is_closed())
  }
}

impl<Item, Err> Debug for Subscriber<Item, Err> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let state = self.0.borrow();
    f.debug_struct("Subscriber")
      .field("closed", &state.closed)
      .field("delivering", &state.delivering)
      .field("queued", &state.queued.len())
      .finish()
  }
}
