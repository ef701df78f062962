//! Test Scheduler for deterministic testing of time-based sources.
//!
//! Provides virtual time that only advances when explicitly instructed.
//! Tasks run on a thread-local `LocalPool`; sleeps register a timer on the
//! virtual clock and wake when `advance_by` or `flush` reaches their
//! deadline.
//!
//! # Usage
//!
//! ```rust
//! use rxlite::prelude::*;
//!
//! // Initialize the test scheduler (required before use)
//! TestScheduler::init();
//!
//! let ticks = std::rc::Rc::new(std::cell::Cell::new(0));
//! let c_ticks = ticks.clone();
//! let subscription = observable::interval(Duration::from_millis(100), TestScheduler)
//!   .subscribe(FnMutObserver(move |_| c_ticks.set(c_ticks.get() + 1)));
//!
//! // Advance virtual time to trigger emissions
//! TestScheduler::advance_by(Duration::from_millis(250));
//! assert_eq!(ticks.get(), 2);
//! subscription.unsubscribe();
//! ```
//!
//! # Thread Safety
//!
//! State is thread-local, so each test thread has its own independent clock
//! and task pool. Driving the scheduler from inside one of its own tasks is
//! not supported.

use std::{
  cell::{Cell, RefCell},
  cmp::Ordering,
  collections::BinaryHeap,
  future::Future,
  pin::Pin,
  rc::Rc,
  task::{Context, Poll, Waker},
};

use futures::{
  executor::{LocalPool, LocalSpawner},
  future::{FutureExt, LocalBoxFuture},
  task::LocalSpawnExt,
};

use super::{Duration, Scheduler, TaskHandle};
use crate::error::ScheduleError;

// ==================== Internal State ====================

#[derive(Default)]
struct Clock {
  now: Duration,
  timers: BinaryHeap<Timer>,
  next_seq: usize,
  spawner: Option<LocalSpawner>,
}

struct Timer {
  deadline: Duration,
  seq: usize,
  waker: Waker,
  live: Rc<Cell<bool>>,
}

impl PartialEq for Timer {
  fn eq(&self, other: &Self) -> bool { self.deadline == other.deadline && self.seq == other.seq }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for Timer {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier deadlines first, then FIFO by registration
    other.deadline.cmp(&self.deadline).then_with(|| other.seq.cmp(&self.seq))
  }
}

thread_local! {
  static CLOCK: RefCell<Clock> = RefCell::new(Clock::default());
  static POOL: RefCell<Option<LocalPool>> = const { RefCell::new(None) };
}

// ==================== Virtual sleep ====================

struct VirtualSleep {
  deadline: Duration,
  live: Option<Rc<Cell<bool>>>,
}

impl Future for VirtualSleep {
  type Output = ();

  fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
    let deadline = self.deadline;
    let registered = self.live.is_some();
    let live = CLOCK.with(|clock| {
      let mut clock = clock.borrow_mut();
      if clock.now >= deadline {
        return None;
      }
      if registered {
        return Some(None);
      }
      let live = Rc::new(Cell::new(true));
      let seq = clock.next_seq;
      clock.next_seq += 1;
      clock.timers.push(Timer { deadline, seq, waker: cx.waker().clone(), live: live.clone() });
      Some(Some(live))
    });

    match live {
      None => {
        self.release();
        Poll::Ready(())
      }
      Some(fresh) => {
        if fresh.is_some() {
          self.live = fresh;
        }
        Poll::Pending
      }
    }
  }
}

impl VirtualSleep {
  fn release(&mut self) {
    if let Some(live) = self.live.take() {
      live.set(false);
    }
  }
}

impl Drop for VirtualSleep {
  fn drop(&mut self) { self.release() }
}

// ==================== TestScheduler ====================

/// A virtual time scheduler for deterministic testing.
///
/// This is a zero-sized type that accesses thread-local state.
/// All instances in the same thread share the same clock and task pool.
#[derive(Clone, Copy, Debug, Default)]
pub struct TestScheduler;

impl TestScheduler {
  /// Initialize or reset the test scheduler state.
  ///
  /// Call this at the start of each test. It resets virtual time to zero and
  /// drops every task spawned before.
  pub fn init() {
    let pool = LocalPool::new();
    let spawner = pool.spawner();
    let stale = POOL.with(|slot| slot.borrow_mut().replace(pool));
    // Dropping old tasks can run arbitrary teardown code; no borrow is held.
    drop(stale);
    CLOCK.with(|clock| {
      *clock.borrow_mut() = Clock { spawner: Some(spawner), ..Clock::default() };
    });
  }

  /// Get the current virtual time.
  pub fn now() -> Duration { CLOCK.with(|clock| clock.borrow().now) }

  /// Number of sleeps still waiting for their deadline.
  pub fn pending_timers() -> usize {
    CLOCK.with(|clock| clock.borrow().timers.iter().filter(|t| t.live.get()).count())
  }

  /// Advance virtual time by `duration`, running every task that becomes
  /// ready on the way, in deadline order.
  pub fn advance_by(duration: Duration) {
    let target = Self::now() + duration;
    Self::run_until(Some(target));
    CLOCK.with(|clock| {
      let mut clock = clock.borrow_mut();
      if clock.now < target {
        clock.now = target;
      }
    });
    Self::run_ready();
  }

  /// Run tasks and fire timers until nothing is left.
  ///
  /// A source that keeps rescheduling itself, such as an unbounded interval,
  /// makes this loop forever; use `advance_by` for those.
  pub fn flush() { Self::run_until(None) }

  fn run_ready() {
    POOL.with(|slot| {
      if let Some(pool) = slot.borrow_mut().as_mut() {
        pool.run_until_stalled();
      }
    });
  }

  fn run_until(limit: Option<Duration>) {
    Self::run_ready();
    loop {
      let due = CLOCK.with(|clock| {
        let mut clock = clock.borrow_mut();
        let ready = clock
          .timers
          .peek()
          .is_some_and(|timer| limit.is_none_or(|limit| timer.deadline <= limit));
        if !ready {
          return None;
        }
        let timer = clock.timers.pop()?;
        if clock.now < timer.deadline {
          clock.now = timer.deadline;
        }
        Some(timer)
      });

      let Some(timer) = due else {
        break;
      };
      if timer.live.get() {
        timer.waker.wake();
        Self::run_ready();
      }
    }
  }
}

impl Scheduler for TestScheduler {
  fn spawn(&self, task: LocalBoxFuture<'static, ()>) -> Result<TaskHandle, ScheduleError> {
    let spawner =
      CLOCK.with(|clock| clock.borrow().spawner.clone()).ok_or(ScheduleError::Uninitialized)?;
    let (task, handle) = TaskHandle::wrap(task);
    spawner.spawn_local(task)?;
    Ok(handle)
  }

  fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
    VirtualSleep { deadline: Self::now() + duration, live: None }.boxed_local()
  }
}

#[cfg(test)]
mod tests {
  use std::mem;

  use super::*;

  #[test]
  fn zero_sized_and_copy() {
    assert_eq!(mem::size_of::<TestScheduler>(), 0);
    let s1 = TestScheduler;
    let _s2 = s1;
    let _s3 = s1;
  }

  #[test]
  fn init_resets_clock() {
    TestScheduler::init();
    TestScheduler::advance_by(Duration::from_millis(100));
    assert_eq!(TestScheduler::now(), Duration::from_millis(100));

    TestScheduler::init();
    assert_eq!(TestScheduler::now(), Duration::ZERO);
    assert_eq!(TestScheduler::pending_timers(), 0);
  }

  #[test]
  fn spawn_requires_init() {
    std::thread::spawn(|| {
      let res = TestScheduler.spawn(async {}.boxed_local());
      assert!(matches!(res, Err(ScheduleError::Uninitialized)));
    })
    .join()
    .unwrap();
  }

  #[test]
  fn advance_by_is_cumulative() {
    TestScheduler::init();
    TestScheduler::advance_by(Duration::from_millis(100));
    TestScheduler::advance_by(Duration::from_millis(50));
    assert_eq!(TestScheduler::now(), Duration::from_millis(150));
  }

  #[test]
  fn sleeps_wake_in_deadline_order() {
    TestScheduler::init();
    let log = Rc::new(RefCell::new(Vec::new()));
    for (name, ms) in [("late", 30), ("early", 10), ("middle", 20)] {
      let log = log.clone();
      TestScheduler
        .spawn(
          async move {
            TestScheduler.sleep(Duration::from_millis(ms)).await;
            log.borrow_mut().push((name, TestScheduler::now()));
          }
          .boxed_local(),
        )
        .unwrap();
    }

    TestScheduler::advance_by(Duration::from_millis(15));
    assert_eq!(*log.borrow(), vec![("early", Duration::from_millis(10))]);

    TestScheduler::flush();
    assert_eq!(
      *log.borrow(),
      vec![
        ("early", Duration::from_millis(10)),
        ("middle", Duration::from_millis(20)),
        ("late", Duration::from_millis(30)),
      ]
    );
  }

  #[test]
  fn cancelled_sleep_releases_timer() {
    TestScheduler::init();
    let handle = TestScheduler
      .spawn(
        async {
          TestScheduler.sleep(Duration::from_secs(1)).await;
        }
        .boxed_local(),
      )
      .unwrap();
    TestScheduler::advance_by(Duration::ZERO);
    assert_eq!(TestScheduler::pending_timers(), 1);

    handle.cancel();
    TestScheduler::advance_by(Duration::ZERO);
    assert_eq!(TestScheduler::pending_timers(), 0);
  }

  #[test]
  fn flush_on_empty_pool() {
    TestScheduler::init();
    TestScheduler::flush();
    assert_eq!(TestScheduler::now(), Duration::ZERO);
  }
}
