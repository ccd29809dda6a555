//! TestInterceptor - records transitions for assertions

use super::Interceptor;
use parking_lot::Mutex;
use std::sync::Arc;

/// One observed state transition
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<S, A> {
    pub action: A,
    pub old_state: S,
    pub new_state: S,
}

/// Appends every transition to an in-memory, ordered log
///
/// Clones share the log: register one clone with the store and keep another
/// for assertions.
pub struct TestInterceptor<S, A> {
    log: Arc<Mutex<Vec<Transition<S, A>>>>,
}

impl<S, A> Clone for TestInterceptor<S, A> {
    fn clone(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
        }
    }
}

impl<S: Clone, A: Clone> TestInterceptor<S, A> {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Copy of everything recorded so far
    pub fn transitions(&self) -> Vec<Transition<S, A>> {
        self.log.lock().clone()
    }

    /// Recorded actions, in order
    pub fn actions(&self) -> Vec<A> {
        self.log.lock().iter().map(|t| t.action.clone()).collect()
    }

    pub fn last(&self) -> Option<Transition<S, A>> {
        self.log.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.log.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.lock().is_empty()
    }
}

impl<S: Clone, A: Clone> Default for TestInterceptor<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A> Interceptor<S, A> for TestInterceptor<S, A>
where
    S: Clone + Send,
    A: Clone + Send,
{
    fn on_transition(&self, action: &A, old_state: &S, new_state: &S) {
        self.log.lock().push(Transition {
            action: action.clone(),
            old_state: old_state.clone(),
            new_state: new_state.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_records_in_order_through_clones() {
        let interceptor: TestInterceptor<i32, &str> = TestInterceptor::new();
        let registered = interceptor.clone();

        registered.on_transition(&"a", &0, &1);
        registered.on_transition(&"b", &1, &3);

        assert_eq!(interceptor.len(), 2);
        assert_eq!(interceptor.actions(), vec!["a", "b"]);
        assert_eq!(
            interceptor.last(),
            Some(Transition {
                action: "b",
                old_state: 1,
                new_state: 3,
            })
        );
    }

    #[test]
    fn test_starts_empty() {
        let interceptor: TestInterceptor<(), ()> = TestInterceptor::default();
        assert!(interceptor.is_empty());
        assert!(interceptor.last().is_none());
    }
}
