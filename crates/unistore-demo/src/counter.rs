//! Counter state, actions, reducer, effects and selectors

use futures::StreamExt;
use serde::Serialize;
use std::time::Duration;
use unistore::{Action, ActionStream, Effect, Reducers, Selector};

/// Value reported by the simulated fetch
pub const FETCHED_AMOUNT: i64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterState {
    pub counter: i64,
    pub last_fetched: Option<i64>,
    pub milestones: Vec<i64>,
}

impl CounterState {
    pub fn new(counter: i64) -> Self {
        Self {
            counter,
            last_fetched: None,
            milestones: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CounterAction {
    Increment(i64),
    Decrement(i64),
    Reset,
    /// Ask the fetch effect for an amount
    Fetch,
    Fetched(i64),
    Milestone(i64),
}

impl Action for CounterAction {
    fn id(&self) -> &str {
        match self {
            CounterAction::Increment(_) => "Increment",
            CounterAction::Decrement(_) => "Decrement",
            CounterAction::Reset => "Reset",
            CounterAction::Fetch => "Fetch",
            CounterAction::Fetched(_) => "Fetched",
            CounterAction::Milestone(_) => "Milestone",
        }
    }
}

fn counter_reducer(state: &mut CounterState, action: &CounterAction) {
    match action {
        CounterAction::Increment(by) => state.counter += by,
        CounterAction::Decrement(by) => state.counter -= by,
        CounterAction::Reset => state.counter = 0,
        _ => {}
    }
}

fn fetch_reducer(state: &mut CounterState, action: &CounterAction) {
    match action {
        CounterAction::Fetched(amount) => state.last_fetched = Some(*amount),
        CounterAction::Milestone(counter) => state.milestones.push(*counter),
        _ => {}
    }
}

pub fn reducers() -> Reducers<CounterState, CounterAction> {
    Reducers::new().then(counter_reducer).then(fetch_reducer)
}

/// Fetch → (delay) → Fetched → [Increment, Milestone] → log line
pub fn effects(response_delay: Duration) -> Vec<Effect<CounterAction>> {
    vec![
        Effect::dispatching_one(move |actions: ActionStream<CounterAction>| {
            actions.of_id("Fetch").then(move |_| async move {
                tokio::time::sleep(response_delay).await;
                CounterAction::Fetched(FETCHED_AMOUNT)
            })
        }),
        Effect::dispatching_many(|actions: ActionStream<CounterAction>| {
            actions.filter_map_sync(|action| match action {
                CounterAction::Fetched(amount) => Some(vec![
                    CounterAction::Increment(amount),
                    CounterAction::Milestone(amount),
                ]),
                _ => None,
            })
        }),
        Effect::non_dispatching(|actions: ActionStream<CounterAction>| {
            actions.of_id("Milestone").for_each(|action| {
                log::info!("Milestone reached: {:?}", action);
                futures::future::ready(())
            })
        }),
    ]
}

pub fn counter() -> Selector<CounterState, i64> {
    Selector::new(|state: &CounterState| state.counter)
}

pub fn milestone_count() -> Selector<CounterState, usize> {
    Selector::new(|state: &CounterState| state.milestones.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use unistore::{MockStore, Reducer, Store, TestInterceptor};

    #[test]
    fn test_reducers() {
        let reducers = reducers();
        let mut state = CounterState::new(1337);

        reducers.reduce(&mut state, &CounterAction::Increment(42));
        reducers.reduce(&mut state, &CounterAction::Decrement(1));
        assert_eq!(state.counter, 1378);

        reducers.reduce(&mut state, &CounterAction::Fetched(3));
        reducers.reduce(&mut state, &CounterAction::Milestone(1378));
        reducers.reduce(&mut state, &CounterAction::Reset);
        assert_eq!(
            state,
            CounterState {
                counter: 0,
                last_fetched: Some(3),
                milestones: vec![1378],
            }
        );
    }

    #[test]
    fn test_selectors_with_overrides() {
        let store = MockStore::new(CounterState::new(5));
        store.register_reducer(reducers());
        let counter = counter();

        store.override_selector(&counter, -1);
        assert_eq!(store.select_current(&counter), -1);

        store.clear_override(&counter);
        store.dispatch(CounterAction::Increment(1));
        assert_eq!(store.select_current(&counter), 6);
    }

    #[tokio::test]
    async fn test_fetch_flow() {
        let store = Store::with(CounterState::new(0), reducers(), effects(Duration::ZERO)).unwrap();
        let interceptor = TestInterceptor::new();
        store.register_interceptor(interceptor.clone());
        let mut milestones = store.select(&milestone_count());
        assert_eq!(milestones.next().await, Some(0));

        store.dispatch(CounterAction::Fetch);

        let reached = tokio::time::timeout(Duration::from_secs(2), milestones.next()).await;
        assert_eq!(reached.ok().flatten(), Some(1));
        assert_eq!(store.state().counter, FETCHED_AMOUNT);
        assert_eq!(
            interceptor.actions(),
            vec![
                CounterAction::Fetch,
                CounterAction::Fetched(FETCHED_AMOUNT),
                CounterAction::Increment(FETCHED_AMOUNT),
                CounterAction::Milestone(FETCHED_AMOUNT),
            ]
        );
    }
}
