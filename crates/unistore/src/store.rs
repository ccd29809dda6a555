use crate::action::Action;
use crate::effect::{ActionBroadcast, ActionStream, Dispatcher, Effects};
use crate::error::StoreError;
use crate::interceptor::Interceptor;
use crate::reducer::{Reducer, Reducers, SharedReducer};
use crate::selector::{FreshnessToken, Selector};
use futures::stream::{BoxStream, Stream, StreamExt};
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use std::thread::{self, ThreadId};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;

type SharedInterceptor<S, A> = Arc<dyn Interceptor<S, A>>;

/// A committed state together with the token it was committed under
#[derive(Debug)]
pub struct Snapshot<S> {
    pub state: Arc<S>,
    pub token: FreshnessToken,
}

impl<S> Clone for Snapshot<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            token: self.token,
        }
    }
}

impl<S> Snapshot<S> {
    fn new(state: S) -> Self {
        Self {
            state: Arc::new(state),
            token: FreshnessToken::fresh(),
        }
    }
}

struct StoreInner<S, A> {
    /// Authoritative state; doubles as the "new state committed" broadcast
    committed: watch::Sender<Snapshot<S>>,
    reducers: RwLock<Vec<SharedReducer<S, A>>>,
    interceptors: RwLock<Vec<SharedInterceptor<S, A>>>,
    actions: ActionBroadcast<A>,

    /// Held for the whole transaction, serializes dispatch across threads
    transaction: Mutex<()>,
    /// Thread currently inside a transaction
    owner: Mutex<Option<ThreadId>>,
    /// Actions dispatched re-entrantly from inside a transaction
    deferred: Mutex<VecDeque<A>>,

    runtime: Mutex<Option<Handle>>,
    dispatcher: Mutex<Option<Dispatcher<A>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    torn_down: AtomicBool,
}

impl<S, A> Drop for StoreInner<S, A> {
    fn drop(&mut self) {
        for task in self.tasks.get_mut().drain(..) {
            task.abort();
        }
    }
}

/// Store - holds application state and runs the dispatch loop
///
/// The Store follows the Redux pattern:
/// - One authoritative state, replaced (never shared mutably) on each dispatch
/// - Reducers fold every action into a draft, in registration order
/// - Interceptors observe each committed transition
/// - Effects watch the action stream and dispatch follow-up actions
/// - Selectors derive memoized values from the state
///
/// `Store` is a handle: clones refer to the same state.
///
/// # Dispatch transaction
///
/// ```text
/// dispatch(action)
///   → draft = clone(state)
///   → reducers (in order) mutate draft
///   → commit draft, fresh token
///   → interceptors (in order) see (action, old, new)
///   → action rebroadcast to effects
/// ```
///
/// Transactions never interleave: dispatch from another thread waits for the
/// running one, and dispatch from inside a transaction on the same thread
/// (for example from an interceptor) is queued and runs right after it.
///
/// # Example
///
/// ```rust
/// use unistore::{Action, Store};
///
/// #[derive(Debug, Clone)]
/// enum CounterAction {
///     Increment(i64),
/// }
///
/// impl Action for CounterAction {
///     fn id(&self) -> &str {
///         "Increment"
///     }
/// }
///
/// let store = Store::new(0i64);
/// store.register_reducer(|state: &mut i64, action: &CounterAction| match action {
///     CounterAction::Increment(by) => *state += by,
/// });
///
/// store.dispatch(CounterAction::Increment(42));
/// assert_eq!(store.state(), 42);
/// ```
pub struct Store<S, A> {
    inner: Arc<StoreInner<S, A>>,
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, A> Store<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Action,
{
    /// Create a new store with initial state and nothing registered
    pub fn new(initial_state: S) -> Self {
        let (committed, _) = watch::channel(Snapshot::new(initial_state));
        Self {
            inner: Arc::new(StoreInner {
                committed,
                reducers: RwLock::new(Vec::new()),
                interceptors: RwLock::new(Vec::new()),
                actions: ActionBroadcast::new(),
                transaction: Mutex::new(()),
                owner: Mutex::new(None),
                deferred: Mutex::new(VecDeque::new()),
                runtime: Mutex::new(None),
                dispatcher: Mutex::new(None),
                tasks: Mutex::new(Vec::new()),
                torn_down: AtomicBool::new(false),
            }),
        }
    }

    /// Create a store with reducers and effects registered up front
    ///
    /// Effects need a tokio runtime, see [`Store::register_effects`].
    pub fn with<E: Effects<A>>(
        initial_state: S,
        reducers: Reducers<S, A>,
        effects: E,
    ) -> Result<Self, StoreError> {
        let store = Self::new(initial_state);
        store.inner.reducers.write().extend(reducers.into_inner());
        store.register_effects(effects)?;
        Ok(store)
    }

    /// Run effects and the dispatch loop on `runtime` instead of the
    /// runtime current at registration time
    pub fn on_runtime(self, runtime: Handle) -> Self {
        *self.inner.runtime.lock() = Some(runtime);
        self
    }

    /// Add a reducer; it runs after every reducer already registered
    pub fn register_reducer<R: Reducer<S, A> + 'static>(&self, reducer: R) {
        self.inner.reducers.write().push(Arc::new(reducer));
    }

    /// Add an interceptor; it is notified after every interceptor already registered
    pub fn register_interceptor<I: Interceptor<S, A> + 'static>(&self, interceptor: I) {
        self.inner.interceptors.write().push(Arc::new(interceptor));
    }

    /// Subscribe a bundle of effects to the action stream
    ///
    /// Each effect is built right away and runs as a task for the lifetime of
    /// the store. Actions it produces are dispatched by the store's dispatch
    /// loop.
    pub fn register_effects<E: Effects<A>>(&self, effects: E) -> Result<(), StoreError> {
        let effects = effects.into_effects();
        if effects.is_empty() {
            return Ok(());
        }

        let runtime = self.runtime()?;
        let dispatcher = self.dispatcher()?;

        let mut tasks = Vec::with_capacity(effects.len());
        for effect in effects {
            log::debug!("Store: registering {:?} effect", effect.kind());
            tasks.push(effect.spawn(self.actions(), dispatcher.clone(), &runtime));
        }
        self.track(tasks)
    }

    /// Keep `tasks` for teardown, or abort them if teardown already ran
    fn track(&self, tasks: Vec<JoinHandle<()>>) -> Result<(), StoreError> {
        let mut tracked = self.inner.tasks.lock();
        if self.inner.torn_down.load(Ordering::SeqCst) {
            for task in tasks {
                task.abort();
            }
            return Err(StoreError::TornDown);
        }
        tracked.extend(tasks);
        Ok(())
    }

    /// Dispatch an action
    ///
    /// Runs the whole transaction synchronously. Reducer and interceptor
    /// panics propagate to the caller; a panicking reducer leaves the
    /// committed state untouched.
    pub fn dispatch(&self, action: A) {
        self.dispatch_batch(vec![action]);
    }

    /// Dispatch `batch` back to back
    ///
    /// Nothing else is dispatched in between: actions dispatched re-entrantly
    /// while the batch runs are queued until its last action committed.
    fn dispatch_batch(&self, batch: Vec<A>) {
        let me = thread::current().id();
        if *self.inner.owner.lock() == Some(me) {
            log::trace!("Store: deferring {} re-entrant action(s)", batch.len());
            self.inner.deferred.lock().extend(batch);
            return;
        }

        let _transaction = self.inner.transaction.lock();
        *self.inner.owner.lock() = Some(me);
        scopeguard::defer! {
            self.inner.deferred.lock().clear();
            *self.inner.owner.lock() = None;
        }

        for action in &batch {
            self.transact(action);
        }
        loop {
            let Some(action) = self.inner.deferred.lock().pop_front() else {
                break;
            };
            self.transact(&action);
        }
    }

    fn transact(&self, action: &A) {
        let old = self.snapshot();
        let mut draft = S::clone(&old.state);

        // Cloned so reducers and interceptors may register more of their kind
        let reducers = self.inner.reducers.read().clone();
        for reducer in &reducers {
            reducer.reduce(&mut draft, action);
        }

        let new = Snapshot::new(draft);
        self.inner.committed.send_replace(new.clone());
        log::trace!("Store: committed {} as {:?}", action.id(), new.token);

        let interceptors = self.inner.interceptors.read().clone();
        for interceptor in &interceptors {
            interceptor.on_transition(action, &old.state, &new.state);
        }

        self.inner.actions.emit(action);
    }

    /// Get a clone of the current state
    pub fn state(&self) -> S {
        S::clone(&self.snapshot().state)
    }

    /// Current state and the token it was committed under
    pub fn snapshot(&self) -> Snapshot<S> {
        self.inner.committed.borrow().clone()
    }

    pub fn token(&self) -> FreshnessToken {
        self.inner.committed.borrow().token
    }

    /// Value of `selector` for the current state, memoized on the current token
    pub fn select_current<V>(&self, selector: &Selector<S, V>) -> V
    where
        V: Clone + Send + 'static,
    {
        let snapshot = self.snapshot();
        selector.select(&snapshot.state, snapshot.token)
    }

    /// Project the current state through an accessor, without memoization
    pub fn select_current_with<V, F>(&self, accessor: F) -> V
    where
        F: FnOnce(&S) -> V,
    {
        accessor(&self.snapshot().state)
    }

    /// Stream of `selector`'s value: the current one, then one per commit,
    /// skipping consecutive duplicates
    pub fn select<V>(&self, selector: &Selector<S, V>) -> SelectionStream<V>
    where
        V: Clone + PartialEq + Send + 'static,
    {
        let selector = selector.clone();
        let values = WatchStream::new(self.inner.committed.subscribe())
            .map(move |snapshot| selector.select(&snapshot.state, snapshot.token));
        SelectionStream::distinct(values)
    }

    /// Like [`Store::select`] with an accessor in place of a selector
    pub fn select_with<V, F>(&self, accessor: F) -> SelectionStream<V>
    where
        V: Clone + PartialEq + Send + 'static,
        F: Fn(&S) -> V + Send + Sync + 'static,
    {
        self.select(&Selector::new(accessor))
    }

    /// Single-slot broadcast of committed snapshots, for adapter layers
    pub fn changes(&self) -> watch::Receiver<Snapshot<S>> {
        self.inner.committed.subscribe()
    }

    /// Fresh subscription to the outgoing action stream
    pub fn actions(&self) -> ActionStream<A> {
        self.inner.actions.subscribe()
    }

    /// Handle to dispatch actions through the store's dispatch loop
    ///
    /// Use it to dispatch from contexts that should not run the transaction
    /// themselves. Starts the loop on first use.
    pub fn dispatcher(&self) -> Result<Dispatcher<A>, StoreError> {
        if self.inner.torn_down.load(Ordering::SeqCst) {
            return Err(StoreError::TornDown);
        }

        let mut slot = self.inner.dispatcher.lock();
        if let Some(dispatcher) = slot.as_ref().filter(|dispatcher| !dispatcher.is_closed()) {
            return Ok(dispatcher.clone());
        }
        if slot.is_some() {
            log::warn!("Store: dispatch loop is gone, starting a new one");
        }

        let runtime = self.runtime()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let task = runtime.spawn(run_dispatch_loop(Arc::downgrade(&self.inner), rx));
        self.track(vec![task])?;

        let dispatcher = Dispatcher::new(tx);
        *slot = Some(dispatcher.clone());
        Ok(dispatcher)
    }

    /// Cancel all effects and stop the dispatch loop
    ///
    /// Dispatching keeps working, but nothing reacts to it anymore and no
    /// effects can be registered.
    pub fn teardown(&self) {
        if self.inner.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        log::debug!("Store: tearing down");

        self.inner.dispatcher.lock().take();
        for task in self.inner.tasks.lock().drain(..) {
            task.abort();
        }
        self.inner.actions.close();
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.torn_down.load(Ordering::SeqCst)
    }

    fn runtime(&self) -> Result<Handle, StoreError> {
        if self.inner.torn_down.load(Ordering::SeqCst) {
            return Err(StoreError::TornDown);
        }
        match self.inner.runtime.lock().as_ref() {
            Some(runtime) => Ok(runtime.clone()),
            None => Ok(Handle::try_current()?),
        }
    }
}

/// The designated context for effect-produced actions
///
/// Only a weak reference is held, so the loop never keeps a store alive.
/// A batch whose reducers or interceptors panic is logged and dropped; the
/// loop keeps serving the following batches.
async fn run_dispatch_loop<S, A>(
    store: Weak<StoreInner<S, A>>,
    mut rx: mpsc::UnboundedReceiver<Vec<A>>,
) where
    S: Clone + Send + Sync + 'static,
    A: Action,
{
    log::debug!("Dispatch loop started");

    while let Some(batch) = rx.recv().await {
        let Some(inner) = store.upgrade() else {
            break;
        };
        let store = Store { inner };
        let ids: Vec<String> = batch.iter().map(|action| action.id().to_string()).collect();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            store.dispatch_batch(batch);
        }));
        if let Err(panic) = result {
            log::error!(
                "Dispatch loop: dispatching {:?} panicked: {}",
                ids,
                panic_message(panic.as_ref())
            );
        }
    }

    log::debug!("Dispatch loop stopped");
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic payload>"
    }
}

/// Stream of selected values, see [`Store::select`]
pub struct SelectionStream<V> {
    inner: BoxStream<'static, V>,
}

impl<V> SelectionStream<V>
where
    V: Clone + PartialEq + Send + 'static,
{
    fn distinct<St>(values: St) -> Self
    where
        St: Stream<Item = V> + Send + 'static,
    {
        let mut last: Option<V> = None;
        let inner = values
            .filter_map(move |value| {
                let changed = last.as_ref() != Some(&value);
                if changed {
                    last = Some(value.clone());
                }
                futures::future::ready(changed.then_some(value))
            })
            .boxed();
        Self { inner }
    }
}

impl<V> Stream for SelectionStream<V> {
    type Item = V;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<V>> {
        self.inner.poll_next_unpin(cx)
    }
}
