use std::{
  collections::VecDeque,
  pin::Pin,
  task::{Context, Poll, Waker},
};

use futures::Stream;

use crate::{
  completion::Completion,
  demand::Demand,
  publisher::Publisher,
  rc::MutRc,
  subscriber::Subscriber,
  subscription::{Cancellable, SubscriptionHandle},
};

struct ValuesState<Item, Err> {
  queue: VecDeque<Result<Item, Err>>,
  waker: Option<Waker>,
  subscription: Option<SubscriptionHandle>,
  awaiting: bool,
  closed: bool,
}

/// Async stream over a publisher's values, returned by
/// [`values`](crate::publisher::PublisherExt::values).
///
/// Demand is pulled one value at a time: a poll that finds nothing buffered
/// requests `max(1)` and waits for it. Like any subscriber without demand,
/// the stream misses subject values sent while nobody is awaiting it. A
/// failure is yielded as the last item. Dropping the stream cancels the
/// subscription.
///
/// ```rust
/// use futures::{executor::block_on, StreamExt};
/// use rxdemand::prelude::*;
///
/// let all: Vec<_> = block_on(from_iter(1..=3).values().collect());
/// assert_eq!(all, vec![Ok(1), Ok(2), Ok(3)]);
/// ```
pub struct Values<Item, Err> {
  state: MutRc<ValuesState<Item, Err>>,
  _subscription: Cancellable,
}

impl<Item: 'static, Err: 'static> Values<Item, Err> {
  pub(crate) fn new<P>(publisher: &P) -> Self
  where
    P: Publisher<Item = Item, Err = Err> + ?Sized,
  {
    let state = MutRc::own(ValuesState {
      queue: VecDeque::new(),
      waker: None,
      subscription: None,
      awaiting: false,
      closed: false,
    });
    let subscription = Cancellable::pending();
    publisher.subscribe(ValuesSubscriber { state: state.clone(), slot: Some(subscription.slot()) });
    Self { state, _subscription: subscription }
  }

  fn take_ready(&self) -> Option<Option<Result<Item, Err>>> {
    let mut state = self.state.rc_deref_mut();
    if let Some(next) = state.queue.pop_front() {
      Some(Some(next))
    } else if state.closed {
      Some(None)
    } else {
      None
    }
  }
}

impl<Item: 'static, Err: 'static> Stream for Values<Item, Err> {
  type Item = Result<Item, Err>;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    if let Some(ready) = self.take_ready() {
      return Poll::Ready(ready);
    }

    let pull = {
      let mut state = self.state.rc_deref_mut();
      state.waker = Some(cx.waker().clone());
      if state.awaiting {
        None
      } else {
        state.awaiting = true;
        state.subscription.clone()
      }
    };
    // Synchronous publishers deliver inside this call.
    if let Some(subscription) = pull {
      subscription.request(Demand::max(1));
      if let Some(ready) = self.take_ready() {
        self.state.rc_deref_mut().waker = None;
        return Poll::Ready(ready);
      }
    }
    Poll::Pending
  }
}

struct ValuesSubscriber<Item, Err> {
  state: MutRc<ValuesState<Item, Err>>,
  slot: Option<MutRc<Option<SubscriptionHandle>>>,
}

impl<Item, Err> ValuesSubscriber<Item, Err> {
  fn push(&self, event: Option<Result<Item, Err>>) {
    let waker = {
      let mut state = self.state.rc_deref_mut();
      state.awaiting = false;
      match event {
        Some(event) => state.queue.push_back(event),
        None => {
          state.closed = true;
          state.subscription = None;
        }
      }
      state.waker.take()
    };
    if let Some(waker) = waker {
      waker.wake();
    }
  }
}

impl<Item, Err> Subscriber<Item, Err> for ValuesSubscriber<Item, Err> {
  fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
    self.state.rc_deref_mut().subscription = Some(subscription.clone());
    if let Some(slot) = self.slot.take() {
      *slot.rc_deref_mut() = Some(subscription);
    }
  }

  fn on_value(&mut self, value: Item) -> Demand {
    self.push(Some(Ok(value)));
    Demand::NONE
  }

  fn on_completion(&mut self, completion: Completion<Err>) {
    if let Completion::Failure(err) = completion {
      self.push(Some(Err(err)));
    }
    self.push(None);
  }
}
