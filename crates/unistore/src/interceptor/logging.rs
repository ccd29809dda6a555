//! LogInterceptor - logs all transitions for debugging

use super::Interceptor;
use crate::action::Action;
use std::fmt::Debug;

type SkipFn<A> = Box<dyn Fn(&A) -> bool + Send + Sync>;

/// LogInterceptor - forwards every transition to the `log` facade
///
/// Actions are logged at debug level, the state change at trace level.
pub struct LogInterceptor<A> {
    skip: Option<SkipFn<A>>,
}

impl<A> LogInterceptor<A> {
    pub fn new() -> Self {
        Self { skip: None }
    }

    /// Don't log actions matching `predicate` (to reduce noise)
    pub fn skipping<F>(predicate: F) -> Self
    where
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        Self {
            skip: Some(Box::new(predicate)),
        }
    }

    fn should_log(&self, action: &A) -> bool {
        !self.skip.as_ref().is_some_and(|skip| skip(action))
    }
}

impl<A> Default for LogInterceptor<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Debug, A: Action> Interceptor<S, A> for LogInterceptor<A> {
    fn on_transition(&self, action: &A, old_state: &S, new_state: &S) {
        if !self.should_log(action) {
            return;
        }
        log::debug!("Action: {:?}", action);
        log::trace!("State: {:?} -> {:?}", old_state, new_state);
    }
}
