//! Interceptors - observers of committed transitions
//!
//! An interceptor is notified synchronously, inside the dispatch transaction,
//! after the new state has been committed:
//!
//! ```text
//! Action → Reducers → Commit → Interceptors → Action stream
//! ```
//!
//! Interceptors run in registration order. They only observe: they cannot
//! veto an action or change the state. A panicking interceptor aborts the
//! dispatch call.
//!
//! ## Example
//!
//! ```rust
//! use unistore::{Action, Interceptor};
//!
//! struct CountingInterceptor(std::sync::atomic::AtomicUsize);
//!
//! impl<S, A: Action> Interceptor<S, A> for CountingInterceptor {
//!     fn on_transition(&self, _action: &A, _old_state: &S, _new_state: &S) {
//!         self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
//!     }
//! }
//! ```

mod logging;
mod print;
mod test_interceptor;

pub use logging::LogInterceptor;
pub use print::{PrintInterceptor, Sink};
pub use test_interceptor::{TestInterceptor, Transition};

/// Interceptor trait - observes every `(action, old_state, new_state)` transition
pub trait Interceptor<S, A>: Send + Sync {
    fn on_transition(&self, action: &A, old_state: &S, new_state: &S);
}

impl<S, A, F> Interceptor<S, A> for F
where
    F: Fn(&A, &S, &S) + Send + Sync,
{
    fn on_transition(&self, action: &A, old_state: &S, new_state: &S) {
        self(action, old_state, new_state)
    }
}
