//! Action identity
//!
//! Actions describe "something happened". The store never inspects an action
//! beyond its identifier, which effects and reducers use for matching.

use std::fmt::Debug;

/// An action that can be dispatched to a [`Store`](crate::Store).
///
/// Actions are usually a plain enum where `id` returns the variant name:
///
/// ```rust
/// use unistore::Action;
///
/// #[derive(Debug, Clone, PartialEq)]
/// enum CounterAction {
///     Increment(i64),
///     Decrement(i64),
/// }
///
/// impl Action for CounterAction {
///     fn id(&self) -> &str {
///         match self {
///             CounterAction::Increment(_) => "Increment",
///             CounterAction::Decrement(_) => "Decrement",
///         }
///     }
/// }
///
/// assert_eq!(CounterAction::Increment(1).id(), "Increment");
/// ```
pub trait Action: Debug + Clone + Send + Sync + 'static {
    /// Identifier used for dispatch-time matching
    fn id(&self) -> &str;
}

/// Was this action created with the given identifier?
pub fn is_action<A: Action>(action: &A, id: &str) -> bool {
    action.id() == id
}
