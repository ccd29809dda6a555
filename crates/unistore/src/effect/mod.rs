//! Effects - side effects driven by the action stream
//!
//! An effect is built once from the store's [`ActionStream`] and turns it into
//! one of three things:
//!
//! ```text
//! DispatchingOne   ActionStream → Stream<Action>       each item is dispatched
//! DispatchingMany  ActionStream → Stream<Vec<Action>>  each batch is dispatched in order
//! NonDispatching   ActionStream → Future<()>           consumed for side effects only
//! ```
//!
//! Effects run as tokio tasks and may produce actions from any context; the
//! store delivers everything they produce through its single dispatch loop.
//!
//! ## Example
//!
//! ```rust
//! use futures::StreamExt;
//! use unistore::{Action, Effect};
//!
//! #[derive(Debug, Clone)]
//! enum AppAction {
//!     Load,
//!     Loaded(u32),
//! }
//!
//! impl Action for AppAction {
//!     fn id(&self) -> &str {
//!         match self {
//!             AppAction::Load => "Load",
//!             AppAction::Loaded(_) => "Loaded",
//!         }
//!     }
//! }
//!
//! let load: Effect<AppAction> = Effect::dispatching_one(|actions| {
//!     actions.of_id("Load").then(|_| async {
//!         // fetch something...
//!         AppAction::Loaded(42)
//!     })
//! });
//! assert_eq!(load.kind(), unistore::EffectKind::DispatchingOne);
//! ```

mod action_stream;
mod dispatcher;

pub use action_stream::ActionStream;
pub(crate) use action_stream::ActionBroadcast;
pub use dispatcher::Dispatcher;

use crate::action::Action;
use futures::future::{BoxFuture, Future, FutureExt};
use futures::stream::{BoxStream, Stream, StreamExt};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

type BuildOne<A> = Box<dyn FnOnce(ActionStream<A>) -> BoxStream<'static, A> + Send>;
type BuildMany<A> = Box<dyn FnOnce(ActionStream<A>) -> BoxStream<'static, Vec<A>> + Send>;
type BuildNone<A> = Box<dyn FnOnce(ActionStream<A>) -> BoxFuture<'static, ()> + Send>;

enum Build<A> {
    One(BuildOne<A>),
    Many(BuildMany<A>),
    None(BuildNone<A>),
}

/// How many actions an effect dispatches per upstream event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    DispatchingOne,
    DispatchingMany,
    NonDispatching,
}

/// A declarative "action stream in, actions or side effect out" description
pub struct Effect<A> {
    build: Build<A>,
}

impl<A: Action> Effect<A> {
    /// At most one action per upstream event, each dispatched
    pub fn dispatching_one<F, St>(build: F) -> Self
    where
        F: FnOnce(ActionStream<A>) -> St + Send + 'static,
        St: Stream<Item = A> + Send + 'static,
    {
        Self {
            build: Build::One(Box::new(move |actions| build(actions).boxed())),
        }
    }

    /// An ordered batch of actions per upstream event
    pub fn dispatching_many<F, St>(build: F) -> Self
    where
        F: FnOnce(ActionStream<A>) -> St + Send + 'static,
        St: Stream<Item = Vec<A>> + Send + 'static,
    {
        Self {
            build: Build::Many(Box::new(move |actions| build(actions).boxed())),
        }
    }

    /// Consume the action stream for a side effect; nothing is dispatched
    pub fn non_dispatching<F, Fut>(build: F) -> Self
    where
        F: FnOnce(ActionStream<A>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            build: Build::None(Box::new(move |actions| build(actions).boxed())),
        }
    }

    pub fn kind(&self) -> EffectKind {
        match self.build {
            Build::One(_) => EffectKind::DispatchingOne,
            Build::Many(_) => EffectKind::DispatchingMany,
            Build::None(_) => EffectKind::NonDispatching,
        }
    }

    /// Build the derived stream and run it on `runtime`
    ///
    /// Produced actions go to `dispatcher`; the task ends when the action
    /// stream ends or the dispatcher's store is gone.
    pub(crate) fn spawn(
        self,
        actions: ActionStream<A>,
        dispatcher: Dispatcher<A>,
        runtime: &Handle,
    ) -> JoinHandle<()> {
        match self.build {
            Build::One(build) => {
                let mut produced = build(actions);
                runtime.spawn(async move {
                    while let Some(action) = produced.next().await {
                        if !dispatcher.dispatch(action) {
                            break;
                        }
                    }
                })
            }
            Build::Many(build) => {
                let mut produced = build(actions);
                runtime.spawn(async move {
                    while let Some(batch) = produced.next().await {
                        if !dispatcher.dispatch_all(batch) {
                            break;
                        }
                    }
                })
            }
            Build::None(build) => runtime.spawn(build(actions)),
        }
    }

    /// Run this effect inside a store whose action type `B` wraps `A`
    ///
    /// `unwrap` picks the `A`s out of the outer stream, `wrap` lifts produced
    /// actions back into `B`.
    pub(crate) fn adapt<B, U, W>(self, unwrap: U, wrap: W) -> Effect<B>
    where
        B: Action,
        U: Fn(B) -> Option<A> + Send + Sync + 'static,
        W: Fn(A) -> B + Send + Sync + 'static,
    {
        let narrow = move |outer: ActionStream<B>| {
            ActionStream::from_stream(outer.filter_map_sync(unwrap))
        };

        match self.build {
            Build::One(build) => Effect::<B>::dispatching_one(move |outer: ActionStream<B>| {
                build(narrow(outer)).map(wrap)
            }),
            Build::Many(build) => Effect::<B>::dispatching_many(move |outer: ActionStream<B>| {
                build(narrow(outer))
                    .map(move |batch| batch.into_iter().map(&wrap).collect::<Vec<B>>())
            }),
            Build::None(build) => {
                Effect::<B>::non_dispatching(move |outer: ActionStream<B>| build(narrow(outer)))
            }
        }
    }
}

/// A bundle of effects registered together
pub trait Effects<A> {
    fn into_effects(self) -> Vec<Effect<A>>;
}

impl<A> Effects<A> for Effect<A> {
    fn into_effects(self) -> Vec<Effect<A>> {
        vec![self]
    }
}

impl<A> Effects<A> for Vec<Effect<A>> {
    fn into_effects(self) -> Vec<Effect<A>> {
        self
    }
}

impl<A, const N: usize> Effects<A> for [Effect<A>; N] {
    fn into_effects(self) -> Vec<Effect<A>> {
        self.into()
    }
}
