//! Data-task publishers over an external request issuer.
//!
//! The crate does not speak HTTP itself. A [`Fetcher`] performs the request
//! and a [`Session`] turns each request into a [`DataTaskPublisher`] whose
//! fetch runs on the caller's `LocalSpawn` executor.

use std::{
  cell::{Cell, RefCell},
  collections::HashMap,
  rc::{Rc, Weak},
};

use futures::{
  future::{abortable, AbortHandle, LocalBoxFuture},
  task::{LocalSpawn, LocalSpawnExt},
  FutureExt,
};

use crate::{
  completion::Completion,
  demand::Demand,
  error::TransportError,
  publisher::Publisher,
  rc::MutRc,
  subscriber::Subscriber,
  subscription::{Conduit, Subscription, SubscriptionHandle},
};

// ============================================================================
// Request / response values
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Request {
  url: String,
}

impl Request {
  /// Accepts absolute `http` and `https` URLs with a non-empty host.
  pub fn new(url: impl Into<String>) -> Result<Self, TransportError> {
    let url = url.into();
    let rest = url
      .strip_prefix("https://")
      .or_else(|| url.strip_prefix("http://"));
    match rest {
      Some(rest) if !rest.is_empty() && !rest.starts_with('/') => Ok(Self { url }),
      _ => Err(TransportError::InvalidUrl(url)),
    }
  }

  pub fn url(&self) -> &str { &self.url }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
  pub url: String,
  pub status: u16,
}

impl Response {
  pub fn is_success(&self) -> bool { (200..300).contains(&self.status) }
}

/// The value a data task delivers: the payload and the response metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTaskOutput {
  pub data: Vec<u8>,
  pub response: Response,
}

impl DataTaskOutput {
  /// Turns a non-2xx response into [`TransportError::BadStatus`].
  pub fn ensure_success(self) -> Result<Self, TransportError> {
    if self.response.is_success() {
      Ok(self)
    } else {
      Err(TransportError::BadStatus(self.response.status))
    }
  }
}

impl AsRef<[u8]> for DataTaskOutput {
  fn as_ref(&self) -> &[u8] { &self.data }
}

// ============================================================================
// Fetchers
// ============================================================================

/// Performs requests. Implemented by the embedding application.
pub trait Fetcher {
  fn fetch(&self, request: &Request) -> LocalBoxFuture<'static, Result<DataTaskOutput, TransportError>>;
}

/// A fetcher answering from an in-memory route table. Unknown URLs fail with
/// [`TransportError::RequestFailed`].
#[derive(Clone, Default)]
pub struct StaticFetcher {
  routes: MutRc<HashMap<String, Result<(u16, Vec<u8>), TransportError>>>,
  hits: MutRc<usize>,
}

impl StaticFetcher {
  pub fn new() -> Self { Self::default() }

  pub fn with_response(self, url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
    self.routes.rc_deref_mut().insert(url.into(), Ok((status, body.into())));
    self
  }

  pub fn with_error(self, url: impl Into<String>, err: TransportError) -> Self {
    self.routes.rc_deref_mut().insert(url.into(), Err(err));
    self
  }

  /// Number of fetches performed so far.
  pub fn hits(&self) -> usize { *self.hits.rc_deref() }
}

impl Fetcher for StaticFetcher {
  fn fetch(&self, request: &Request) -> LocalBoxFuture<'static, Result<DataTaskOutput, TransportError>> {
    *self.hits.rc_deref_mut() += 1;
    let url = request.url().to_owned();
    let result = match self.routes.rc_deref().get(&url) {
      Some(Ok((status, body))) => {
        Ok(DataTaskOutput { data: body.clone(), response: Response { url, status: *status } })
      }
      Some(Err(err)) => Err(err.clone()),
      None => Err(TransportError::RequestFailed(format!("no route for {url}"))),
    };
    futures::future::ready(result).boxed_local()
  }
}

impl<F: Fetcher + ?Sized> Fetcher for Rc<F> {
  fn fetch(&self, request: &Request) -> LocalBoxFuture<'static, Result<DataTaskOutput, TransportError>> {
    (**self).fetch(request)
  }
}

// ============================================================================
// Session and data task publisher
// ============================================================================

/// Binds a fetcher to the executor its requests run on.
pub struct Session<F, Sp> {
  fetcher: Rc<F>,
  spawner: Sp,
}

impl<F, Sp: Clone> Clone for Session<F, Sp> {
  fn clone(&self) -> Self { Self { fetcher: self.fetcher.clone(), spawner: self.spawner.clone() } }
}

impl<F, Sp> Session<F, Sp>
where
  F: Fetcher + 'static,
  Sp: LocalSpawn + Clone + 'static,
{
  pub fn new(fetcher: F, spawner: Sp) -> Self { Self { fetcher: Rc::new(fetcher), spawner } }

  pub fn data_task_publisher(&self, request: Request) -> DataTaskPublisher<F, Sp> {
    DataTaskPublisher { request, fetcher: self.fetcher.clone(), spawner: self.spawner.clone() }
  }
}

/// Publishes the outcome of one request per subscription: a single
/// [`DataTaskOutput`] followed by `Finished`, or a
/// [`TransportError`] failure.
///
/// The fetch starts on the first positive demand. Cancelling aborts it.
pub struct DataTaskPublisher<F, Sp> {
  request: Request,
  fetcher: Rc<F>,
  spawner: Sp,
}

impl<F, Sp: Clone> Clone for DataTaskPublisher<F, Sp> {
  fn clone(&self) -> Self {
    Self { request: self.request.clone(), fetcher: self.fetcher.clone(), spawner: self.spawner.clone() }
  }
}

impl<F, Sp> Publisher for DataTaskPublisher<F, Sp>
where
  F: Fetcher + 'static,
  Sp: LocalSpawn + Clone + 'static,
{
  type Item = DataTaskOutput;
  type Err = TransportError;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<DataTaskOutput, TransportError> + 'static,
  {
    let subscription = Rc::new_cyclic(|me| DataTaskSubscription {
      me: me.clone(),
      conduit: Conduit::new(),
      request: self.request.clone(),
      fetcher: self.fetcher.clone(),
      spawner: self.spawner.clone(),
      started: Cell::new(false),
      abort: RefCell::new(None),
    });
    let handle: SubscriptionHandle = subscription.clone();
    subscription.conduit.open(subscriber, handle);
  }
}

struct DataTaskSubscription<F, Sp> {
  me: Weak<DataTaskSubscription<F, Sp>>,
  conduit: Conduit<DataTaskOutput, TransportError>,
  request: Request,
  fetcher: Rc<F>,
  spawner: Sp,
  started: Cell<bool>,
  abort: RefCell<Option<AbortHandle>>,
}

impl<F, Sp> DataTaskSubscription<F, Sp>
where
  F: Fetcher + 'static,
  Sp: LocalSpawn + 'static,
{
  fn start(&self) {
    if self.started.replace(true) {
      return;
    }
    let Some(me) = self.me.upgrade() else { return };
    tracing::debug!(url = self.request.url(), "data task started");

    let (fetch, abort) = abortable(self.fetcher.fetch(&self.request));
    *self.abort.borrow_mut() = Some(abort);
    // The in-flight task keeps the subscription alive until it settles.
    let task = async move {
      if let Ok(result) = fetch.await {
        me.settle(result);
      }
    };
    if let Err(err) = self.spawner.spawn_local(task) {
      tracing::warn!(url = self.request.url(), %err, "data task could not be spawned");
      self.conduit.complete(Completion::Failure(TransportError::RequestFailed(err.to_string())));
    }
  }

  fn settle(&self, result: Result<DataTaskOutput, TransportError>) {
    self.abort.borrow_mut().take();
    match result {
      Ok(output) => {
        tracing::debug!(url = self.request.url(), status = output.response.status, "data task finished");
        self.conduit.offer(output);
        self.conduit.complete(Completion::Finished);
      }
      Err(err) => {
        tracing::debug!(url = self.request.url(), %err, "data task failed");
        self.conduit.complete(Completion::Failure(err));
      }
    }
  }
}

impl<F, Sp> Subscription for DataTaskSubscription<F, Sp>
where
  F: Fetcher + 'static,
  Sp: LocalSpawn + 'static,
{
  fn request(&self, demand: Demand) {
    if !demand.has_demand() || !self.conduit.is_active() {
      return;
    }
    self.conduit.add_demand(demand);
    self.start();
  }

  fn cancel(&self) {
    if self.conduit.cancel() {
      if let Some(abort) = self.abort.borrow_mut().take() {
        abort.abort();
        tracing::debug!(url = self.request.url(), "data task cancelled");
      }
    }
  }

  fn is_closed(&self) -> bool { !self.conduit.is_active() }

  fn name(&self) -> &'static str { "DataTaskPublisher" }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use futures::executor::LocalPool;

  use super::*;
  use crate::prelude::*;

  const URL: &str = "https://dummyjson.com/products/1";

  fn session(pool: &LocalPool, fetcher: StaticFetcher) -> Session<StaticFetcher, futures::executor::LocalSpawner> {
    Session::new(fetcher, pool.spawner())
  }

  #[test]
  fn request_validates_scheme() {
    assert!(Request::new(URL).is_ok());
    assert_eq!(Request::new("ftp://x"), Err(TransportError::InvalidUrl("ftp://x".into())));
    assert!(Request::new("https://").is_err());
    assert!(Request::new("not a url").is_err());
  }

  #[test]
  fn delivers_output_then_finished() {
    let mut pool = LocalPool::new();
    let fetcher = StaticFetcher::new().with_response(URL, 200, r#"{"id":1}"#);
    let session = session(&pool, fetcher.clone());

    let outputs = Rc::new(RefCell::new(vec![]));
    let completions = Rc::new(RefCell::new(vec![]));
    let (c_outputs, c_completions) = (outputs.clone(), completions.clone());
    let _guard = session.data_task_publisher(Request::new(URL).unwrap()).sink(
      move |c| c_completions.borrow_mut().push(c),
      move |o: DataTaskOutput| c_outputs.borrow_mut().push(o.response.status),
    );
    assert!(outputs.borrow().is_empty());

    pool.run();
    assert_eq!(*outputs.borrow(), vec![200]);
    assert_eq!(*completions.borrow(), vec![Completion::Finished]);
    assert_eq!(fetcher.hits(), 1);
  }

  #[test]
  fn transport_errors_fail() {
    let mut pool = LocalPool::new();
    let session = session(&pool, StaticFetcher::new());

    let completions = Rc::new(RefCell::new(vec![]));
    let c_completions = completions.clone();
    let _guard = session
      .data_task_publisher(Request::new(URL).unwrap())
      .sink(move |c| c_completions.borrow_mut().push(c), |_| {});
    pool.run();

    let completions = completions.borrow();
    assert!(matches!(completions[..], [Completion::Failure(TransportError::RequestFailed(_))]));
  }

  #[test]
  fn cancel_aborts_the_fetch() {
    let mut pool = LocalPool::new();
    let session = session(&pool, StaticFetcher::new().with_response(URL, 200, "x"));

    let hits = Rc::new(RefCell::new(0));
    let c_hits = hits.clone();
    let guard = session
      .data_task_publisher(Request::new(URL).unwrap())
      .sink(move |_| *c_hits.borrow_mut() += 1, move |_| {});
    guard.cancel();
    pool.run();
    assert_eq!(*hits.borrow(), 0);
  }

  #[test]
  fn decode_and_share_one_fetch() {
    #[derive(Debug, Clone, PartialEq, serde::Deserialize)]
    struct Sample {
      id: u32,
      title: String,
    }

    let mut pool = LocalPool::new();
    let fetcher = StaticFetcher::new().with_response(URL, 200, r#"{"id":1,"title":"phone"}"#);
    let session = session(&pool, fetcher.clone());

    let shared = session
      .data_task_publisher(Request::new(URL).unwrap())
      .map(|output| output.data)
      .decode::<Sample, _>(JsonDecoder)
      .multicast_with(PassthroughSubject::new);

    let seen = Rc::new(RefCell::new(vec![]));
    let (c1, c2) = (seen.clone(), seen.clone());
    let _a = shared.sink(|_| {}, move |s: Sample| c1.borrow_mut().push(s));
    let _b = shared.sink(|_| {}, move |s: Sample| c2.borrow_mut().push(s));
    let _connection = shared.connect();
    pool.run();

    let phone = Sample { id: 1, title: "phone".into() };
    assert_eq!(*seen.borrow(), vec![phone.clone(), phone]);
    assert_eq!(fetcher.hits(), 1);
  }

  #[test]
  fn bad_status_through_try_map() {
    let mut pool = LocalPool::new();
    let session = session(&pool, StaticFetcher::new().with_response(URL, 404, ""));
    let completions = Rc::new(RefCell::new(vec![]));
    let c_completions = completions.clone();
    let _guard = session
      .data_task_publisher(Request::new(URL).unwrap())
      .try_map(DataTaskOutput::ensure_success)
      .sink(move |c| c_completions.borrow_mut().push(c), |_| {});
    pool.run();
    assert_eq!(*completions.borrow(), vec![Completion::Failure(TransportError::BadStatus(404))]);
  }
}
