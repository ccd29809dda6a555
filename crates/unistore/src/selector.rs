//! Memoized selectors
//!
//! A selector projects the state into a derived value and caches the result
//! against the store's freshness token. The token is replaced on every commit,
//! so invalidation is token-based: a commit forces recomputation even when the
//! projected value would come out the same.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Opaque marker identifying one committed state of one store
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FreshnessToken(Uuid);

impl FreshnessToken {
    /// A token no other commit (of any store) has ever used
    pub(crate) fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Debug for FreshnessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FreshnessToken({})", self.0.simple())
    }
}

enum Slot<V> {
    Empty,
    Memo { token: FreshnessToken, value: V },
    /// Forced by a mock store, wins over any token
    Override(V),
}

type Compute<S, V> = Arc<dyn Fn(&S, FreshnessToken) -> V + Send + Sync>;

/// A memoized projection `S -> V`
///
/// Clones share the same cache, so a selector can be created once and handed
/// to as many `select` calls and streams as needed.
///
/// ```rust
/// use unistore::{Selector, Store};
///
/// #[derive(Debug, Clone)]
/// struct Noop;
/// impl unistore::Action for Noop {
///     fn id(&self) -> &str { "Noop" }
/// }
///
/// let store: Store<(u32, String), Noop> = Store::new((7, "seven".to_string()));
/// let number = Selector::new(|state: &(u32, String)| state.0);
/// let doubled = number.map(|n| n * 2);
///
/// assert_eq!(store.select_current(&doubled), 14);
/// ```
pub struct Selector<S, V> {
    compute: Compute<S, V>,
    slot: Arc<Mutex<Slot<V>>>,
}

impl<S, V> Clone for Selector<S, V> {
    fn clone(&self) -> Self {
        Self {
            compute: Arc::clone(&self.compute),
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<S, V> Selector<S, V>
where
    S: 'static,
    V: Clone + Send + 'static,
{
    /// Create a selector from a pure projection
    pub fn new<F>(project: F) -> Self
    where
        F: Fn(&S) -> V + Send + Sync + 'static,
    {
        Self::from_compute(move |state, _| project(state))
    }

    fn from_compute<F>(compute: F) -> Self
    where
        F: Fn(&S, FreshnessToken) -> V + Send + Sync + 'static,
    {
        Self {
            compute: Arc::new(compute),
            slot: Arc::new(Mutex::new(Slot::Empty)),
        }
    }

    /// Derive a selector from this one; the inner cache is reused
    pub fn map<W, F>(&self, project: F) -> Selector<S, W>
    where
        W: Clone + Send + 'static,
        F: Fn(&V) -> W + Send + Sync + 'static,
    {
        let inner = self.clone();
        Selector::from_compute(move |state, token| project(&inner.select(state, token)))
    }

    /// Derive a selector from two inner selectors
    pub fn combine<V2, W, F>(&self, other: &Selector<S, V2>, project: F) -> Selector<S, W>
    where
        V2: Clone + Send + 'static,
        W: Clone + Send + 'static,
        F: Fn(&V, &V2) -> W + Send + Sync + 'static,
    {
        let left = self.clone();
        let right = other.clone();
        Selector::from_compute(move |state, token| {
            project(&left.select(state, token), &right.select(state, token))
        })
    }

    /// Value for `state` as committed under `token`
    ///
    /// Returns the cached value when `token` matches the cached token,
    /// otherwise recomputes and caches.
    pub fn select(&self, state: &S, token: FreshnessToken) -> V {
        match &*self.slot.lock() {
            Slot::Override(value) => return value.clone(),
            Slot::Memo {
                token: cached,
                value,
            } if *cached == token => return value.clone(),
            _ => {}
        }

        // Computed without holding the lock, projections may consult other selectors
        let value = (self.compute)(state, token);

        let mut slot = self.slot.lock();
        if !matches!(*slot, Slot::Override(_)) {
            *slot = Slot::Memo {
                token,
                value: value.clone(),
            };
        }
        value
    }

    /// Pin the selector to `value` regardless of token
    pub(crate) fn force(&self, value: V) {
        *self.slot.lock() = Slot::Override(value);
    }

    /// Drop a pinned value; the next `select` recomputes
    pub(crate) fn clear_override(&self) {
        let mut slot = self.slot.lock();
        if matches!(*slot, Slot::Override(_)) {
            *slot = Slot::Empty;
        }
    }

    pub fn is_overridden(&self) -> bool {
        matches!(*self.slot.lock(), Slot::Override(_))
    }
}
