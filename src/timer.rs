//! Periodic tick publisher.

use std::{
  convert::Infallible,
  rc::Rc,
  time::{Duration, Instant},
};

use futures::{
  future::abortable,
  task::{LocalSpawn, LocalSpawnExt},
};

use crate::{
  ops::ConnectablePublisher,
  publisher::Publisher,
  rc::MutRc,
  subject::{PassthroughSubject, Subject},
  subscriber::Subscriber,
  subscription::{Cancellable, EmptySubscription, SubscriptionHandle, TaskSubscription},
};

/// Entry point for timer publishers.
pub struct Timer;

impl Timer {
  /// A connectable publisher emitting the current [`Instant`] every `every`.
  ///
  /// Ticks are produced by a task spawned on `spawner` at `connect`, so
  /// they only advance while that executor runs. Subscribers without demand
  /// miss ticks.
  pub fn publish<Sp>(every: Duration, spawner: Sp) -> TimerPublisher<Sp>
  where
    Sp: LocalSpawn + Clone + 'static,
  {
    TimerPublisher { every, spawner, subject: PassthroughSubject::new(), connection: MutRc::own(None) }
  }
}

pub struct TimerPublisher<Sp> {
  every: Duration,
  spawner: Sp,
  subject: PassthroughSubject<Instant, Infallible>,
  connection: MutRc<Option<SubscriptionHandle>>,
}

impl<Sp: Clone> Clone for TimerPublisher<Sp> {
  fn clone(&self) -> Self {
    Self {
      every: self.every,
      spawner: self.spawner.clone(),
      subject: self.subject.clone(),
      connection: self.connection.clone(),
    }
  }
}

impl<Sp> Publisher for TimerPublisher<Sp> {
  type Item = Instant;
  type Err = Infallible;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<Instant, Infallible> + 'static,
  {
    self.subject.subscribe(subscriber)
  }
}

impl<Sp> ConnectablePublisher for TimerPublisher<Sp>
where
  Sp: LocalSpawn + Clone + 'static,
{
  fn connect(&self) -> Cancellable {
    let live = self.connection.rc_deref().as_ref().filter(|h| !h.is_closed()).cloned();
    if let Some(live) = live {
      return Cancellable::new(live);
    }

    let (every, subject) = (self.every, self.subject.clone());
    let (ticks, abort) = abortable(async move {
      loop {
        futures_time::task::sleep(every.into()).await;
        subject.send(Instant::now());
      }
    });
    if let Err(err) = self.spawner.spawn_local(async move {
      let _ = ticks.await;
    }) {
      tracing::warn!(%err, "timer could not be spawned");
      return Cancellable::new(Rc::new(EmptySubscription));
    }
    tracing::debug!(?every, "timer connected");

    let handle: SubscriptionHandle = Rc::new(TaskSubscription::new(abort, "Timer"));
    *self.connection.rc_deref_mut() = Some(handle.clone());
    Cancellable::new(handle)
  }
}
