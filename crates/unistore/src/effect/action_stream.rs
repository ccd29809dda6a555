//! Outgoing action stream of a store
//!
//! Every subscriber owns an unbounded queue, so each one sees every action
//! emitted after it subscribed, in order, and never lags behind into loss.
//! Nothing is replayed: a fresh subscription starts empty.

use crate::action::Action;
use futures::stream::{BoxStream, Stream, StreamExt};
use parking_lot::Mutex;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Multicast fan-out of dispatched actions
pub(crate) struct ActionBroadcast<A> {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<A>>>,
}

impl<A: Action> ActionBroadcast<A> {
    pub(crate) fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn subscribe(&self) -> ActionStream<A> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().push(tx);
        ActionStream::from_stream(UnboundedReceiverStream::new(rx))
    }

    /// Send `action` to every live subscriber, forgetting dropped ones
    pub(crate) fn emit(&self, action: &A) {
        self.subscribers
            .lock()
            .retain(|tx| tx.send(action.clone()).is_ok());
    }

    /// End every subscriber's stream
    pub(crate) fn close(&self) {
        self.subscribers.lock().clear();
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

/// Stream of actions as rebroadcast by a store after each commit
///
/// This is what effects are built from. It is a regular [`Stream`], so all of
/// `futures::StreamExt` applies; `of_id` and `filter_map_sync` cover the common
/// matching cases.
pub struct ActionStream<A> {
    inner: BoxStream<'static, A>,
}

impl<A: Action> ActionStream<A> {
    /// Wrap any stream of actions
    pub fn from_stream<St>(stream: St) -> Self
    where
        St: Stream<Item = A> + Send + 'static,
    {
        Self {
            inner: stream.boxed(),
        }
    }

    /// Only actions whose identifier equals `id`
    pub fn of_id(self, id: impl Into<String>) -> Self {
        let id = id.into();
        Self::from_stream(
            self.inner
                .filter(move |action| futures::future::ready(action.id() == id)),
        )
    }

    /// Keep and transform the actions for which `f` returns `Some`
    pub fn filter_map_sync<T, F>(self, mut f: F) -> impl Stream<Item = T> + Send + 'static
    where
        T: Send + 'static,
        F: FnMut(A) -> Option<T> + Send + 'static,
    {
        self.inner
            .filter_map(move |action| futures::future::ready(f(action)))
    }
}

impl<A> Stream for ActionStream<A> {
    type Item = A;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<A>> {
        self.inner.poll_next_unpin(cx)
    }
}
