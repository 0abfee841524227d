//! Reducer composition utilities
//!
//! The store owns the root state tree, but feature reducers are written
//! against their own slice. [`scope_reducer`] bridges the two: it lifts a
//! reducer over a sub-state into a reducer over the parent state by reading
//! the slice out, reducing, and writing the result back.
//!
//! # Example
//!
//! ```
//! use cartflow_core::{Reducer, Effect, smallvec, SmallVec};
//! use cartflow_core::composition::scope_reducer;
//!
//! #[derive(Clone, Default)]
//! struct CounterState {
//!     count: i64,
//! }
//!
//! #[derive(Clone, Default)]
//! struct AppState {
//!     counter: CounterState,
//! }
//!
//! #[derive(Clone)]
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
//!
//! let scoped = scope_reducer(
//!     CounterReducer,
//!     |app: &AppState| &app.counter,
//!     |app: &mut AppState, counter| app.counter = counter,
//! );
//!
//! let mut state = AppState::default();
//! let _effects = scoped.reduce(&mut state, CounterAction::Increment, &());
//! assert_eq!(state.counter.count, 1);
//! ```

use crate::effect::Effects;
use crate::reducer::Reducer;

/// Focus a reducer onto a subset of a larger state tree.
///
/// The returned reducer has the same action and environment types as the
/// inner reducer but operates on the parent state `S`, touching only the
/// slice selected by `get_state`/`set_state`.
pub fn scope_reducer<S, SubS, A, E, R>(
    reducer: R,
    get_state: fn(&S) -> &SubS,
    set_state: fn(&mut S, SubS),
) -> ScopedReducer<S, SubS, A, E, R>
where
    S: 'static,
    SubS: Clone + 'static,
    A: 'static,
    E: 'static,
    R: Reducer<State = SubS, Action = A, Environment = E>,
{
    ScopedReducer {
        reducer,
        get_state,
        set_state,
        _phantom: std::marker::PhantomData,
    }
}

/// A scoped reducer that operates on a subset of state.
///
/// Created by [`scope_reducer`].
pub struct ScopedReducer<S, SubS, A, E, R>
where
    S: 'static,
    SubS: Clone + 'static,
    A: 'static,
    E: 'static,
    R: Reducer<State = SubS, Action = A, Environment = E>,
{
    reducer: R,
    get_state: fn(&S) -> &SubS,
    set_state: fn(&mut S, SubS),
    _phantom: std::marker::PhantomData<(A, E)>,
}

impl<S, SubS, A, E, R> Clone for ScopedReducer<S, SubS, A, E, R>
where
    S: 'static,
    SubS: Clone + 'static,
    A: 'static,
    E: 'static,
    R: Reducer<State = SubS, Action = A, Environment = E> + Clone,
{
    fn clone(&self) -> Self {
        Self {
            reducer: self.reducer.clone(),
            get_state: self.get_state,
            set_state: self.set_state,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<S, SubS, A, E, R> Reducer for ScopedReducer<S, SubS, A, E, R>
where
    S: 'static,
    SubS: Clone + 'static,
    A: 'static,
    E: 'static,
    R: Reducer<State = SubS, Action = A, Environment = E>,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects<Self::Action> {
        // Read the slice out, reduce, write back
        let mut sub_state = (self.get_state)(state).clone();
        let effects = self.reducer.reduce(&mut sub_state, action, env);
        (self.set_state)(state, sub_state);

        effects
    }
}
