use futures::StreamExt;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use unistore::{
    Action, ActionStream, Dispatcher, Effect, MockAction, MockStore, Reducers, Store,
    TestInterceptor,
};

#[derive(Debug, Clone, PartialEq)]
enum TestAction {
    Test,
    Response,
    Generate(u32),
    Unrelated,
    /// Marks the end of a test run, no effect reacts to it
    Sentinel,
}

impl Action for TestAction {
    fn id(&self) -> &str {
        match self {
            TestAction::Test => "Test",
            TestAction::Response => "Response",
            TestAction::Generate(_) => "Generate",
            TestAction::Unrelated => "Unrelated",
            TestAction::Sentinel => "Sentinel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
struct TestState {
    generated: Option<u32>,
    seen: usize,
}

fn reducers() -> Reducers<TestState, TestAction> {
    Reducers::new()
        .then(|state: &mut TestState, _: &TestAction| state.seen += 1)
        .then(|state: &mut TestState, action: &TestAction| {
            if let TestAction::Generate(n) = action {
                state.generated = Some(*n);
            }
        })
}

/// The three effect shapes; the non-dispatching one reports the last payload
fn effects(observed: Arc<Mutex<Option<u32>>>) -> Vec<Effect<TestAction>> {
    vec![
        Effect::dispatching_one(|actions: ActionStream<TestAction>| {
            actions.of_id("Test").map(|_| TestAction::Response)
        }),
        Effect::dispatching_many(|actions: ActionStream<TestAction>| {
            actions
                .of_id(TestAction::Response.id())
                .map(|_| vec![TestAction::Generate(42), TestAction::Unrelated])
        }),
        Effect::non_dispatching(move |actions: ActionStream<TestAction>| {
            actions
                .filter_map_sync(|action| match action {
                    TestAction::Generate(n) => Some(n),
                    _ => None,
                })
                .for_each(move |n| {
                    *observed.lock() = Some(n);
                    futures::future::ready(())
                })
        }),
    ]
}

async fn wait_until<F: Fn() -> bool>(condition: F) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// Queue `marker` behind everything effects have dispatched so far and wait
/// until it is committed
async fn drain<S, A>(dispatcher: Dispatcher<A>, interceptor: &TestInterceptor<S, A>, marker: A)
where
    S: Clone,
    A: Action + PartialEq,
{
    assert!(dispatcher.dispatch(marker.clone()));
    wait_until(|| interceptor.last().map(|t| t.action).as_ref() == Some(&marker)).await;
}

async fn run_effect_chain() {
    let observed = Arc::new(Mutex::new(None));
    let store = Store::with(TestState::default(), reducers(), effects(observed.clone())).unwrap();
    let interceptor = TestInterceptor::new();
    store.register_interceptor(interceptor.clone());

    store.dispatch(TestAction::Test);

    wait_until(|| interceptor.len() >= 4).await;
    wait_until(|| observed.lock().is_some()).await;
    drain(store.dispatcher().unwrap(), &interceptor, TestAction::Sentinel).await;

    assert_eq!(
        interceptor.actions(),
        vec![
            TestAction::Test,
            TestAction::Response,
            TestAction::Generate(42),
            TestAction::Unrelated,
            TestAction::Sentinel,
        ]
    );
    assert_eq!(*observed.lock(), Some(42));
    assert_eq!(
        store.state(),
        TestState {
            generated: Some(42),
            seen: 5,
        }
    );
}

#[tokio::test]
async fn test_effect_chain_on_current_thread() {
    run_effect_chain().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_effect_chain_on_thread_pool() {
    run_effect_chain().await;
}

#[tokio::test]
async fn test_transitions_are_consistent_across_effect_dispatches() {
    let observed = Arc::new(Mutex::new(None));
    let store = Store::with(TestState::default(), reducers(), effects(observed)).unwrap();
    let interceptor = TestInterceptor::new();
    store.register_interceptor(interceptor.clone());

    for _ in 0..3 {
        store.dispatch(TestAction::Test);
    }

    wait_until(|| interceptor.len() >= 12).await;
    drain(store.dispatcher().unwrap(), &interceptor, TestAction::Sentinel).await;

    let transitions = interceptor.transitions();
    assert_eq!(transitions.len(), 13);
    for pair in transitions.windows(2) {
        assert_eq!(pair[0].new_state, pair[1].old_state);
    }
}

#[tokio::test]
async fn test_effects_built_from_another_task() {
    let store: Store<TestState, TestAction> = Store::new(TestState::default());
    store.register_reducer(reducers());
    store
        .register_effects(Effect::dispatching_one(|actions: ActionStream<TestAction>| {
            actions.of_id("Test").then(|_| async {
                // produced from a separate blocking thread
                tokio::task::spawn_blocking(|| TestAction::Generate(7))
                    .await
                    .unwrap()
            })
        }))
        .unwrap();

    store.dispatch(TestAction::Test);

    let store_ref = store.clone();
    wait_until(move || store_ref.state().generated == Some(7)).await;
}

#[tokio::test]
async fn test_dropping_the_store_ends_effects() {
    let observed = Arc::new(Mutex::new(None));
    let store = Store::with(TestState::default(), reducers(), effects(observed)).unwrap();
    let dispatcher = store.dispatcher().unwrap();

    drop(store);

    wait_until(|| dispatcher.is_closed()).await;
    assert!(!dispatcher.dispatch(TestAction::Test));
}

#[tokio::test]
async fn test_mock_store_effects_never_see_set_state() {
    let observed = Arc::new(Mutex::new(None));
    let store = MockStore::new(TestState::default());
    store.register_reducer(reducers());
    store.register_effects(effects(observed.clone())).unwrap();
    let interceptor = TestInterceptor::new();
    store.register_interceptor(interceptor.clone());

    store.set_state(TestState {
        generated: None,
        seen: 100,
    });
    store.dispatch(TestAction::Test);

    wait_until(|| interceptor.len() >= 5).await;
    wait_until(|| observed.lock().is_some()).await;
    drain(
        store.store().dispatcher().unwrap(),
        &interceptor,
        MockAction::Action(TestAction::Sentinel),
    )
    .await;

    let actions = interceptor.actions();
    assert_eq!(actions.len(), 6);
    assert!(actions[0].is_set_state());
    assert_eq!(
        actions[1..].to_vec(),
        vec![
            MockAction::Action(TestAction::Test),
            MockAction::Action(TestAction::Response),
            MockAction::Action(TestAction::Generate(42)),
            MockAction::Action(TestAction::Unrelated),
            MockAction::Action(TestAction::Sentinel),
        ]
    );
    assert_eq!(store.state().seen, 105);
    assert_eq!(*observed.lock(), Some(42));
}

#[derive(Debug, Clone, PartialEq)]
enum Step {
    Go,
    Boom,
    First,
    Second,
    Interjection,
    Ping,
    Pong,
}

impl Action for Step {
    fn id(&self) -> &str {
        match self {
            Step::Go => "Go",
            Step::Boom => "Boom",
            Step::First => "First",
            Step::Second => "Second",
            Step::Interjection => "Interjection",
            Step::Ping => "Ping",
            Step::Pong => "Pong",
        }
    }
}

#[tokio::test]
async fn test_effect_batch_is_not_interleaved_with_reentrant_dispatch() {
    let store: Store<u32, Step> = Store::new(0);
    store
        .register_effects(Effect::dispatching_many(|actions: ActionStream<Step>| {
            actions
                .of_id("Go")
                .map(|_| vec![Step::First, Step::Second])
        }))
        .unwrap();
    let handle = store.clone();
    store.register_interceptor(move |step: &Step, _: &u32, _: &u32| {
        if *step == Step::First {
            handle.dispatch(Step::Interjection);
        }
    });
    let interceptor = TestInterceptor::new();
    store.register_interceptor(interceptor.clone());

    store.dispatch(Step::Go);

    wait_until(|| interceptor.len() >= 4).await;
    assert_eq!(
        interceptor.actions(),
        vec![Step::Go, Step::First, Step::Second, Step::Interjection]
    );
}

#[tokio::test]
async fn test_panicking_effect_dispatch_keeps_the_loop_running() {
    let booms = Arc::new(AtomicUsize::new(0));
    let counted = booms.clone();
    let store: Store<u32, Step> = Store::new(0);
    store.register_reducer(move |state: &mut u32, step: &Step| match step {
        Step::Boom => {
            counted.fetch_add(1, Ordering::SeqCst);
            panic!("reducer failure");
        }
        Step::Pong => *state += 1,
        _ => {}
    });
    store
        .register_effects(vec![
            Effect::dispatching_one(|actions: ActionStream<Step>| {
                actions.of_id("Go").map(|_| Step::Boom)
            }),
            Effect::dispatching_one(|actions: ActionStream<Step>| {
                actions.of_id("Ping").map(|_| Step::Pong)
            }),
        ])
        .unwrap();
    let dispatcher = store.dispatcher().unwrap();

    store.dispatch(Step::Go);
    wait_until(|| booms.load(Ordering::SeqCst) == 1).await;
    store.dispatch(Step::Ping);

    let store_ref = store.clone();
    wait_until(move || store_ref.state() == 1).await;
    assert!(!dispatcher.is_closed());
}
