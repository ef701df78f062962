//! # rxlite: a minimal single-threaded Reactive Extensions runtime
//!
//! ```rust
//! use rxlite::prelude::*;
//!
//! observable::from_iter(0..10)
//!   .map(|v| v * 2)
//!   .tap(|v| assert!(v % 2 == 0))
//!   .subscribe(FnMutObserver(|v| println!("Value: {}", v)));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | Lazy producer, executed once per subscription |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`Subscription`] | Handle to cancel an active subscription |
//! | [`Subject`] | Hot multicast hub, both observer and observable |
//! | [`Scheduler`] | Timers and task spawning for asynchronous sources |
//!
//! Everything is single-threaded (`Rc`/`RefCell`); observables, observers
//! and subscriptions are not `Send`.
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): [`LocalPoolScheduler`] on top of
//!   `futures::executor::LocalPool`
//! - **`tokio-scheduler`**: [`TokioScheduler`] for tokio's `LocalSet`
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Subscription`]: subscription::Subscription
//! [`Subject`]: subject::Subject
//! [`Scheduler`]: scheduler::Scheduler
//! [`LocalPoolScheduler`]: scheduler::LocalPoolScheduler
//! [`TokioScheduler`]: scheduler::TokioScheduler

pub mod error;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod scheduler;
pub mod subject;
pub mod subscriber;
pub mod subscription;
