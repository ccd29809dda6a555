//! Dispatcher funnels actions onto the store's dispatch loop

use crate::action::Action;
use tokio::sync::mpsc;

/// Dispatcher allows effects (and any other thread or task) to dispatch
/// actions back to the store
///
/// Actions are queued on the store's dispatch loop, a single task that runs
/// their transactions one after another. A batch sent with `dispatch_all`
/// is dispatched contiguously, in order: no other dispatch, re-entrant ones
/// included, commits between two of its actions.
#[derive(Clone, Debug)]
pub struct Dispatcher<A> {
    tx: mpsc::UnboundedSender<Vec<A>>,
}

impl<A: Action> Dispatcher<A> {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Vec<A>>) -> Self {
        Self { tx }
    }

    /// Queue an action
    ///
    /// Returns `false` when the store is gone.
    pub fn dispatch(&self, action: A) -> bool {
        self.dispatch_all(vec![action])
    }

    /// Queue a batch of actions, dispatched back to back
    pub fn dispatch_all(&self, actions: Vec<A>) -> bool {
        if actions.is_empty() {
            return true;
        }
        match self.tx.send(actions) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Dispatcher: store is gone, dropping {} action(s)", e.0.len());
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
