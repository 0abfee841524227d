//! # CartFlow Core
//!
//! Core traits and types for the CartFlow unidirectional state container.
//!
//! This crate provides the fundamental abstractions for building features
//! around a single source of truth: actions flow into a pure reducer, state
//! is replaced wholesale, and all side effects are returned as descriptions
//! to be executed by the store runtime.
//!
//! The pieces:
//!
//! - **State**: owned, `Clone`-able domain data for a feature
//! - **Action**: a closed sum type of everything that can happen
//! - **Reducer**: pure step from `(state, action, environment)` to effects
//! - **Effect**: a value describing a side effect, never its execution
//! - **Environment**: dependencies injected behind traits
//!
//! Business logic stays in the functional core; everything impure is pushed
//! out to the runtime shell through effect descriptions.
//!
//! ## Example
//!
//! ```
//! use cartflow_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct CounterState {
//!     count: i64,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum CounterAction {
//!     Increment,
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         action: CounterAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         match action {
//!             CounterAction::Increment => {
//!                 state.count += 1;
//!                 smallvec![Effect::None]
//!             }
//!         }
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// Reducer composition utilities (`scope_reducer`)
pub mod composition;

pub use effect::{Effect, Effects};
pub use reducer::Reducer;

/// The reducer seam - where all business logic lives
///
/// A reducer is deterministic and performs no I/O; anything impure leaves it
/// as an [`Effect`](crate::effect::Effect) description for the runtime to
/// execute.
pub mod reducer {
    use super::effect::Effects;

    /// A pure state transition over a closed action type
    ///
    /// Because actions form a closed enum, the match inside `reduce` is
    /// exhaustive and checked at compile time; there is no "unknown action"
    /// fallthrough at runtime. A reducer must be total and must never fail:
    /// replaying the same `(state, action)` pair always lands in the same
    /// place.
    pub trait Reducer {
        /// Domain state the reducer transitions
        type State;

        /// Closed sum of the events this reducer handles
        type Action;

        /// Injected dependencies available during a step
        type Environment;

        /// Apply one action: update `state` in place and describe any side
        /// effects the runtime should execute afterwards.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> Effects<Self::Action>;
    }
}

/// Effect module - side effect descriptions
///
/// Effects describe side effects to be performed by the runtime. They are
/// values (not execution), composable, and the only way impure work enters
/// the system.
pub mod effect {
    use smallvec::SmallVec;
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// The effects returned from a single reducer invocation.
    ///
    /// Inline storage for the common case of zero or one effect per action.
    pub type Effects<Action> = SmallVec<[Effect<Action>; 4]>;

    /// A description of impure work, returned by reducers and executed by
    /// the store runtime
    ///
    /// Nothing runs when an `Effect` is constructed. An executed effect may
    /// yield a follow-up action, which the runtime dispatches back through
    /// the reducer; this feedback loop is how an asynchronous fetch
    /// eventually lands as a success or failure action.
    pub enum Effect<Action> {
        /// Nothing to do
        None,

        /// Execute all children concurrently
        Parallel(Vec<Effect<Action>>),

        /// Execute children one after another, each waiting for the previous
        Sequential(Vec<Effect<Action>>),

        /// Dispatch `action` after `duration` (timers, polling)
        Delay {
            /// Time to wait before dispatching
            duration: Duration,
            /// What to dispatch once the delay elapses
            action: Box<Action>,
        },

        /// An arbitrary async computation; a `Some` result is fed back into
        /// the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Futures are opaque, so Debug is written by hand
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine several effects into one that runs them concurrently
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Combine several effects into one that runs them in order
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Box and pin an async computation into an [`Effect::Future`]
        pub fn future<F>(fut: F) -> Effect<Action>
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }
    }
}

/// Dependency traits injected through reducer environments
///
/// Production wires real implementations; tests wire deterministic doubles.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Source of the current time
    ///
    /// ```
    /// use cartflow_core::environment::Clock;
    /// use chrono::{DateTime, Utc};
    ///
    /// struct SystemClock;
    ///
    /// impl Clock for SystemClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         Utc::now()
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// The current wall-clock time
        fn now(&self) -> DateTime<Utc>;
    }

    impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
        fn now(&self) -> DateTime<Utc> {
            (**self).now()
        }
    }
}
