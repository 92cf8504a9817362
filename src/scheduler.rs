//! Delayed and repeating work on a `LocalSpawn` executor.

use std::{rc::Rc, time::Duration};

use futures::{
  future::abortable,
  task::{LocalSpawn, LocalSpawnExt},
  Future,
};

use crate::subscription::{Cancellable, EmptySubscription, TaskSubscription};

/// Schedules closures on an executor. Every scheduled action returns a
/// [`Cancellable`]; dropping it cancels the action.
#[derive(Clone)]
pub struct Scheduler<Sp> {
  spawner: Sp,
}

impl<Sp: LocalSpawn> Scheduler<Sp> {
  pub fn new(spawner: Sp) -> Self { Self { spawner } }

  /// Runs `action` once, after `delay`.
  pub fn schedule_after<F>(&self, delay: Duration, action: F) -> Cancellable
  where
    F: FnOnce() + 'static,
  {
    self.spawn("scheduled", async move {
      futures_time::task::sleep(delay.into()).await;
      action();
    })
  }

  /// Runs `action` after `after`, then every `interval`.
  pub fn schedule_repeating<F>(&self, after: Duration, interval: Duration, mut action: F) -> Cancellable
  where
    F: FnMut() + 'static,
  {
    self.spawn("repeating", async move {
      futures_time::task::sleep(after.into()).await;
      loop {
        action();
        futures_time::task::sleep(interval.into()).await;
      }
    })
  }

  fn spawn(&self, name: &'static str, work: impl Future<Output = ()> + 'static) -> Cancellable {
    let (work, abort) = abortable(work);
    match self.spawner.spawn_local(async move {
      let _ = work.await;
    }) {
      Ok(()) => Cancellable::new(Rc::new(TaskSubscription::new(abort, name))),
      Err(err) => {
        tracing::warn!(%err, task = name, "scheduler could not spawn");
        Cancellable::new(Rc::new(EmptySubscription))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc, time::Duration};

  use futures::executor::LocalPool;

  use super::*;

  fn wait(pool: &mut LocalPool, millis: u64) {
    pool.run_until(futures_time::task::sleep(Duration::from_millis(millis).into()));
  }

  #[test]
  fn runs_once_after_delay() {
    let mut pool = LocalPool::new();
    let scheduler = Scheduler::new(pool.spawner());
    let hits = Rc::new(RefCell::new(0));
    let c_hits = hits.clone();
    let _guard = scheduler.schedule_after(Duration::from_millis(5), move || *c_hits.borrow_mut() += 1);

    assert_eq!(*hits.borrow(), 0);
    pool.run();
    assert_eq!(*hits.borrow(), 1);
  }

  #[test]
  fn dropped_guard_cancels() {
    let mut pool = LocalPool::new();
    let scheduler = Scheduler::new(pool.spawner());
    let hits = Rc::new(RefCell::new(0));
    let c_hits = hits.clone();
    drop(scheduler.schedule_after(Duration::from_millis(5), move || *c_hits.borrow_mut() += 1));
    pool.run();
    assert_eq!(*hits.borrow(), 0);
  }

  #[test]
  fn repeats_until_cancelled() {
    let mut pool = LocalPool::new();
    let scheduler = Scheduler::new(pool.spawner());
    let hits = Rc::new(RefCell::new(0));
    let c_hits = hits.clone();
    let guard = scheduler.schedule_repeating(Duration::ZERO, Duration::from_millis(5), move || {
      *c_hits.borrow_mut() += 1
    });
    wait(&mut pool, 40);
    guard.cancel();
    let at_cancel = *hits.borrow();
    assert!(at_cancel >= 2, "only {at_cancel} runs");
    wait(&mut pool, 20);
    assert_eq!(*hits.borrow(), at_cancel);
  }
}
