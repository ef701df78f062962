//! Make a cold observable hot, with reference counting.
//!
//! Internally it counts the subscriptions to the shared observable and
//! subscribes (only once) to the source when the first one arrives. Values
//! are multicast through a [`Subject`]. When the count drops back to zero
//! the source subscription is released, unless the operator was configured
//! to keep it.

use std::{cell::RefCell, rc::Rc};

use crate::{
  observable::Observable,
  ops::Operator,
  subject::Subject,
  subscription::{Subscription, SubscriptionLike, Teardown},
};

/// Behaviour of [`share_with`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShareConfig {
  /// Release the source when the last subscriber leaves, so the next
  /// subscriber restarts it from scratch. Defaults to `true`.
  pub reset_on_ref_count_zero: bool,
}

impl Default for ShareConfig {
  fn default() -> Self { ShareConfig { reset_on_ref_count_zero: true } }
}

impl ShareConfig {
  #[must_use]
  pub fn reset_on_ref_count_zero(mut self, reset: bool) -> Self {
    self.reset_on_ref_count_zero = reset;
    self
  }
}

/// Share with the default configuration.
///
/// Once the source has completed or errored, the stopped subject stays in
/// place until every current subscriber has left: a subscriber arriving in
/// that window only receives the terminal notification again. After the
/// count drops to zero the next subscriber restarts the source.
pub fn share() -> ShareOp { share_with(ShareConfig::default()) }

pub fn share_with(config: ShareConfig) -> ShareOp { ShareOp { config } }

#[derive(Clone, Copy, Debug, Default)]
pub struct ShareOp {
  config: ShareConfig,
}

struct ShareState<Item, Err> {
  subject: Subject<Item, Err>,
  connection: Option<Subscription>,
  ref_count: usize,
}

impl<Item, Err> Operator<Item, Err> for ShareOp
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  type OutItem = Item;
  type OutErr = Err;

  fn apply(self, source: Observable<Item, Err>) -> Observable<Item, Err> {
    let reset = self.config.reset_on_ref_count_zero;
    let state = Rc::new(RefCell::new(ShareState {
      subject: Subject::new(),
      connection: None,
      ref_count: 0,
    }));

    Observable::create(move |subscriber| {
      let subject = {
        let mut state = state.borrow_mut();
        state.ref_count += 1;
        state.subject.clone()
      };
      // Registered before connecting so a synchronous source reaches the
      // first subscriber too.
      let inner = Subscription::from_teardown(subject.register(subscriber));

      let connect = state.borrow().connection.is_none();
      if connect {
        // Stored before subscribing: a subscriber leaving during the
        // synchronous part of the connect must be able to release it.
        let connection = Subscription::new();
        state.borrow_mut().connection = Some(connection.clone());
        tracing::debug!("share connecting to its source");
        connection.add(source.subscribe(subject));
      }

      let state = state.clone();
      Teardown::new(move || {
        inner.unsubscribe();
        let released = {
          let mut state = state.borrow_mut();
          state.ref_count = state.ref_count.saturating_sub(1);
          if state.ref_count == 0 && reset {
            state.subject = Subject::new();
            state.connection.take()
          } else {
            None
          }
        };
        if let Some(connection) = released {
          tracing::debug!("share disconnecting from its source");
          connection.unsubscribe();
        }
      })
    })
  }
}
