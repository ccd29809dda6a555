//! # unistore
//!
//! A unidirectional-data-flow state container (Redux style).
//!
//! ```text
//! caller ─ dispatch(action) ─▶ Reducers ─▶ Commit ─▶ Interceptors ─▶ Action stream
//!    ▲                                                                   │
//!    └──────────── Dispatcher ◀── dispatch loop ◀── Effects ◀────────────┘
//! ```
//!
//! - [`Store`] owns the state and runs the dispatch transaction
//! - [`Reducer`]s turn `(draft, action)` into the next state, in registration order
//! - [`Interceptor`]s observe every committed `(action, old, new)` transition
//! - [`Effect`]s watch the [`ActionStream`] and dispatch follow-up actions,
//!   always through the store's single dispatch loop
//! - [`Selector`]s memoize derived values against the store's [`FreshnessToken`]
//! - [`MockStore`] adds state injection and selector overrides for tests

pub mod action;
pub mod effect;
pub mod error;
pub mod interceptor;
pub mod mock;
pub mod reducer;
pub mod selector;
pub mod store;

// Re-export main types for convenience
pub use action::{Action, is_action};
pub use effect::{ActionStream, Dispatcher, Effect, EffectKind, Effects};
pub use error::StoreError;
pub use interceptor::{Interceptor, LogInterceptor, PrintInterceptor, TestInterceptor, Transition};
pub use mock::{MockAction, MockStore};
pub use reducer::{Reducer, Reducers};
pub use selector::{FreshnessToken, Selector};
pub use store::{SelectionStream, Snapshot, Store};
