//! A named-event bus with a publisher per event name.
//!
//! Posting a notification delivers it to the closures registered with
//! [`NotificationCenter::add_observer`] and to the subscribers of
//! [`NotificationCenter::publisher`] for the same name.

use std::{
  collections::{BTreeMap, HashMap},
  convert::Infallible,
  fmt::{Display, Formatter},
};

use crate::{
  publisher::{Publisher, PublisherExt},
  rc::MutRc,
  subject::{PassthroughSubject, Subject},
  subscriber::Subscriber,
  subscription::Cancellable,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationName(String);

impl NotificationName {
  pub fn new(name: impl Into<String>) -> Self { Self(name.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl From<&str> for NotificationName {
  fn from(name: &str) -> Self { Self::new(name) }
}

impl Display for NotificationName {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}

/// A posted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  pub name: NotificationName,
  pub user_info: BTreeMap<String, String>,
}

/// Identifies an observer registered with `add_observer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObserverToken(u64);

#[derive(Default)]
struct CenterState {
  subjects: HashMap<NotificationName, PassthroughSubject<Notification, Infallible>>,
  observers: BTreeMap<ObserverToken, Cancellable>,
  next_token: u64,
}

/// Dispatches notifications by name. Cloning yields another handle to the
/// same center.
#[derive(Clone, Default)]
pub struct NotificationCenter(MutRc<CenterState>);

thread_local! {
  static DEFAULT_CENTER: NotificationCenter = NotificationCenter::new();
}

impl NotificationCenter {
  pub fn new() -> Self { Self::default() }

  /// The default center of the current thread.
  pub fn default_center() -> Self { DEFAULT_CENTER.with(Clone::clone) }

  /// Posts a notification to everyone observing `name`.
  pub fn post(&self, name: impl Into<NotificationName>, user_info: BTreeMap<String, String>) {
    let name = name.into();
    let subject = self.0.rc_deref().subjects.get(&name).cloned();
    match subject {
      Some(subject) => {
        tracing::trace!(%name, "post notification");
        subject.send(Notification { name, user_info })
      }
      None => tracing::trace!(%name, "notification without observers"),
    }
  }

  /// Calls `f` for every notification named `name` until the returned token
  /// is passed to [`remove_observer`](NotificationCenter::remove_observer).
  pub fn add_observer<F>(&self, name: impl Into<NotificationName>, mut f: F) -> ObserverToken
  where
    F: FnMut(&Notification) + 'static,
  {
    let guard = self.publisher(name).sink_value(move |notification| f(&notification));
    let mut state = self.0.rc_deref_mut();
    let token = ObserverToken(state.next_token);
    state.next_token += 1;
    state.observers.insert(token, guard);
    token
  }

  /// Stops the observer. Unknown tokens are ignored.
  pub fn remove_observer(&self, token: ObserverToken) {
    let guard = self.0.rc_deref_mut().observers.remove(&token);
    drop(guard);
  }

  /// Publisher of the notifications named `name`.
  pub fn publisher(&self, name: impl Into<NotificationName>) -> NotificationPublisher {
    NotificationPublisher { center: self.clone(), name: name.into() }
  }

  fn subject(&self, name: &NotificationName) -> PassthroughSubject<Notification, Infallible> {
    self
      .0
      .rc_deref_mut()
      .subjects
      .entry(name.clone())
      .or_default()
      .clone()
  }
}

/// Publisher returned by [`NotificationCenter::publisher`].
#[derive(Clone)]
pub struct NotificationPublisher {
  center: NotificationCenter,
  name: NotificationName,
}

impl Publisher for NotificationPublisher {
  type Item = Notification;
  type Err = Infallible;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<Notification, Infallible> + 'static,
  {
    let subject = self.center.subject(&self.name);
    subject.subscribe(subscriber)
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;

  #[test]
  fn observer_receives_until_removed() {
    let center = NotificationCenter::new();
    let hits = Rc::new(RefCell::new(vec![]));
    let c_hits = hits.clone();
    let token = center.add_observer("MyNotification", move |n| {
      c_hits.borrow_mut().push(n.user_info.get("k").cloned())
    });

    center.post("MyNotification", BTreeMap::from([("k".to_string(), "v".to_string())]));
    center.post("Other", BTreeMap::new());
    center.remove_observer(token);
    center.post("MyNotification", BTreeMap::new());

    assert_eq!(*hits.borrow(), vec![Some("v".to_string())]);
  }

  #[test]
  fn publisher_delivers_posts() {
    let center = NotificationCenter::new();
    let names = Rc::new(RefCell::new(vec![]));
    let c_names = names.clone();
    let subscription = center
      .publisher("MyNotification")
      .sink_value(move |n| c_names.borrow_mut().push(n.name.to_string()));

    center.post("MyNotification", BTreeMap::new());
    subscription.cancel();
    center.post("MyNotification", BTreeMap::new());

    assert_eq!(*names.borrow(), vec!["MyNotification"]);
  }

  #[test]
  fn default_center_is_shared_per_thread() {
    let hits = Rc::new(RefCell::new(0));
    let c_hits = hits.clone();
    let token = NotificationCenter::default_center().add_observer("Shared", move |_| *c_hits.borrow_mut() += 1);
    NotificationCenter::default_center().post("Shared", BTreeMap::new());
    NotificationCenter::default_center().remove_observer(token);
    assert_eq!(*hits.borrow(), 1);
  }
}
