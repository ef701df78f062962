//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

pub use crate::{
  error::ScheduleError,
  observable::{self, Observable, Subscribable},
  observer::{BoxedObserver, FnMutObserver, FnObserver, Observer},
  ops::{self, Operator, ShareConfig},
  scheduler::{Duration, Scheduler, TaskHandle, TestScheduler, MIN_PERIOD},
  subject::Subject,
  subscriber::Subscriber,
  subscription::{Subscription, SubscriptionGuard, SubscriptionLike, Teardown},
};
#[cfg(feature = "futures-scheduler")]
pub use crate::scheduler::LocalPoolScheduler;
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::TokioScheduler;
