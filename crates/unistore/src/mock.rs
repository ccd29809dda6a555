//! Test double for [`Store`]
//!
//! A `MockStore` is a regular store whose action type is [`MockAction`]: the
//! caller's actions plus a synthetic `SetState`. State injection therefore
//! goes through the same reduce/commit/intercept/rebroadcast transaction as
//! everything else, and interceptors see it as one transition.

use crate::action::Action;
use crate::effect::{ActionStream, Effect, Effects};
use crate::error::StoreError;
use crate::interceptor::Interceptor;
use crate::reducer::Reducer;
use crate::selector::{FreshnessToken, Selector};
use crate::store::{SelectionStream, Snapshot, Store};
use std::fmt::Debug;

/// Identifier of the synthetic state-injection action
pub const SET_STATE: &str = "SetState";

/// Action type of a [`MockStore`]
#[derive(Debug, Clone, PartialEq)]
pub enum MockAction<S, A> {
    /// Replace the whole state
    SetState(S),
    Action(A),
}

impl<S, A> MockAction<S, A> {
    pub fn is_set_state(&self) -> bool {
        matches!(self, MockAction::SetState(_))
    }

    /// The wrapped caller action, if this is one
    pub fn action(&self) -> Option<&A> {
        match self {
            MockAction::Action(action) => Some(action),
            MockAction::SetState(_) => None,
        }
    }

    pub fn into_action(self) -> Option<A> {
        match self {
            MockAction::Action(action) => Some(action),
            MockAction::SetState(_) => None,
        }
    }
}

impl<S, A> Action for MockAction<S, A>
where
    S: Debug + Clone + Send + Sync + 'static,
    A: Action,
{
    fn id(&self) -> &str {
        match self {
            MockAction::SetState(_) => SET_STATE,
            MockAction::Action(action) => action.id(),
        }
    }
}

/// Store with direct state injection and selector overrides, for tests
pub struct MockStore<S, A> {
    store: Store<S, MockAction<S, A>>,
}

impl<S, A> Clone for MockStore<S, A> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S, A> MockStore<S, A>
where
    S: Debug + Clone + Send + Sync + 'static,
    A: Action,
{
    pub fn new(initial_state: S) -> Self {
        let store = Store::new(initial_state);
        store.register_reducer(|state: &mut S, action: &MockAction<S, A>| {
            if let MockAction::SetState(injected) = action {
                *state = injected.clone();
            }
        });
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &Store<S, MockAction<S, A>> {
        &self.store
    }

    pub fn dispatch(&self, action: A) {
        self.store.dispatch(MockAction::Action(action));
    }

    /// Replace the state through the regular transaction as a `SetState` action
    pub fn set_state(&self, state: S) {
        self.store.dispatch(MockAction::SetState(state));
    }

    /// Add a reducer for the caller's actions; `SetState` never reaches it
    pub fn register_reducer<R: Reducer<S, A> + 'static>(&self, reducer: R) {
        self.store
            .register_reducer(move |state: &mut S, action: &MockAction<S, A>| {
                if let MockAction::Action(action) = action {
                    reducer.reduce(state, action);
                }
            });
    }

    /// Interceptors see every transition, `SetState` included
    pub fn register_interceptor<I>(&self, interceptor: I)
    where
        I: Interceptor<S, MockAction<S, A>> + 'static,
    {
        self.store.register_interceptor(interceptor);
    }

    /// Effects written against the caller's action type
    ///
    /// They never observe `SetState`.
    pub fn register_effects<E: Effects<A>>(&self, effects: E) -> Result<(), StoreError> {
        let adapted: Vec<Effect<MockAction<S, A>>> = effects
            .into_effects()
            .into_iter()
            .map(|effect| effect.adapt(MockAction::into_action, MockAction::Action))
            .collect();
        self.store.register_effects(adapted)
    }

    /// Pin `selector` to `value` until [`MockStore::clear_override`]
    pub fn override_selector<V>(&self, selector: &Selector<S, V>, value: V)
    where
        V: Clone + Send + 'static,
    {
        selector.force(value);
    }

    pub fn clear_override<V>(&self, selector: &Selector<S, V>)
    where
        V: Clone + Send + 'static,
    {
        selector.clear_override();
    }

    pub fn state(&self) -> S {
        self.store.state()
    }

    pub fn snapshot(&self) -> Snapshot<S> {
        self.store.snapshot()
    }

    pub fn token(&self) -> FreshnessToken {
        self.store.token()
    }

    pub fn select_current<V>(&self, selector: &Selector<S, V>) -> V
    where
        V: Clone + Send + 'static,
    {
        self.store.select_current(selector)
    }

    pub fn select_current_with<V, F>(&self, accessor: F) -> V
    where
        F: FnOnce(&S) -> V,
    {
        self.store.select_current_with(accessor)
    }

    pub fn select<V>(&self, selector: &Selector<S, V>) -> SelectionStream<V>
    where
        V: Clone + PartialEq + Send + 'static,
    {
        self.store.select(selector)
    }

    pub fn select_with<V, F>(&self, accessor: F) -> SelectionStream<V>
    where
        V: Clone + PartialEq + Send + 'static,
        F: Fn(&S) -> V + Send + Sync + 'static,
    {
        self.store.select_with(accessor)
    }

    pub fn actions(&self) -> ActionStream<MockAction<S, A>> {
        self.store.actions()
    }
}
