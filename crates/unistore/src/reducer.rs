//! Reducers - pure state transitions
//!
//! A reducer mutates a draft of the state in place. Reducers registered on the
//! same store run in registration order against one evolving draft, so later
//! reducers see what earlier ones wrote.

use std::sync::Arc;

/// Reducer trait - applies an action to a draft state
///
/// Any `Fn(&mut S, &A)` closure is a reducer:
///
/// ```rust
/// use unistore::Reducer;
///
/// let double = |state: &mut i64, _action: &()| *state *= 2;
/// let mut state = 21;
/// double.reduce(&mut state, &());
/// assert_eq!(state, 42);
/// ```
pub trait Reducer<S, A>: Send + Sync {
    fn reduce(&self, state: &mut S, action: &A);
}

impl<S, A, F> Reducer<S, A> for F
where
    F: Fn(&mut S, &A) + Send + Sync,
{
    fn reduce(&self, state: &mut S, action: &A) {
        self(state, action)
    }
}

/// Shared, type-erased reducer as stored by the store
pub(crate) type SharedReducer<S, A> = Arc<dyn Reducer<S, A>>;

/// An ordered list of reducers, composed by concatenation
pub struct Reducers<S, A> {
    reducers: Vec<SharedReducer<S, A>>,
}

impl<S, A> Reducers<S, A> {
    pub fn new() -> Self {
        Self {
            reducers: Vec::new(),
        }
    }

    /// Append a reducer; it runs after every reducer already in the list
    pub fn then<R: Reducer<S, A> + 'static>(mut self, reducer: R) -> Self {
        self.reducers.push(Arc::new(reducer));
        self
    }

    /// Concatenate two lists, `self` first
    pub fn chain(mut self, other: Reducers<S, A>) -> Self {
        self.reducers.extend(other.reducers);
        self
    }

    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }

    pub(crate) fn into_inner(self) -> Vec<SharedReducer<S, A>> {
        self.reducers
    }
}

impl<S, A> Default for Reducers<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A> Reducer<S, A> for Reducers<S, A> {
    fn reduce(&self, state: &mut S, action: &A) {
        for reducer in &self.reducers {
            reducer.reduce(state, action);
        }
    }
}
