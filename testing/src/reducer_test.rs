//! Given/When/Then harness for exercising reducers in unit tests.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use cartflow_core::{effect::Effect, reducer::Reducer};

/// Scripts a single reducer step and checks its outcome.
///
/// Exactly one action per test: set up the starting state, dispatch, then
/// assert on the resulting state and the returned effect descriptions.
///
/// ```ignore
/// ReducerTest::new(CatalogReducer::new())
///     .with_env(test_environment())
///     .given_state(ProductState::default())
///     .when_action(ProductAction::AddToCart { product })
///     .then_state(|state| assert_eq!(state.cart.len(), 1))
///     .then_effects(assertions::assert_no_effects)
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    action: Option<A>,
    state_checks: Vec<Box<dyn FnOnce(&S)>>,
    effect_checks: Vec<Box<dyn FnOnce(&[Effect<A>])>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Start a script for the given reducer.
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            action: None,
            state_checks: Vec::new(),
            effect_checks: Vec::new(),
        }
    }

    /// Inject the environment the reducer will see.
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Given: the state before the dispatch.
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// When: the action to dispatch.
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.action = Some(action);
        self
    }

    /// Then: a check against the state after the dispatch. May be chained.
    #[must_use]
    pub fn then_state(mut self, check: impl FnOnce(&S) + 'static) -> Self {
        self.state_checks.push(Box::new(check));
        self
    }

    /// Then: a check against the returned effects. May be chained.
    #[must_use]
    pub fn then_effects(mut self, check: impl FnOnce(&[Effect<A>]) + 'static) -> Self {
        self.effect_checks.push(Box::new(check));
        self
    }

    /// Dispatch the action and run every registered check.
    ///
    /// # Panics
    ///
    /// Panics if any of `given_state`, `when_action`, or `with_env` was
    /// skipped, or if a check fails.
    #[allow(clippy::panic, clippy::expect_used)] // test harness
    pub fn run(self) {
        let mut state = self.initial_state.expect("given_state() was never called");
        let action = self.action.expect("when_action() was never called");
        let env = self.environment.expect("with_env() was never called");

        let effects = self.reducer.reduce(&mut state, action, &env);

        for check in self.state_checks {
            check(&state);
        }
        for check in self.effect_checks {
            check(&effects);
        }
    }
}

/// Checks over the effect list returned by a reducer step.
pub mod assertions {
    use cartflow_core::effect::Effect;

    /// The step must be effect-free.
    ///
    /// A lone `Effect::None` counts as effect-free.
    ///
    /// # Panics
    ///
    /// Panics when a real effect was returned.
    #[allow(clippy::panic)] // test assertion
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        let real = effects
            .iter()
            .filter(|e| !matches!(e, Effect::None))
            .count();
        assert!(real == 0, "wanted an effect-free step, got {effects:?}");
    }

    /// The step must return exactly `expected` effects.
    ///
    /// # Panics
    ///
    /// Panics on a count mismatch.
    #[allow(clippy::panic)] // test assertion
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert!(
            effects.len() == expected,
            "wanted {expected} effects, got {}",
            effects.len()
        );
    }

    /// The step must schedule at least one asynchronous computation.
    ///
    /// # Panics
    ///
    /// Panics when no `Effect::Future` is present.
    #[allow(clippy::panic)] // test assertion
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        let found = effects.iter().any(|e| matches!(e, Effect::Future(_)));
        assert!(found, "wanted a scheduled future effect, found none");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartflow_core::effect::Effects;
    use cartflow_core::{Effect, smallvec};

    #[derive(Clone, Debug, Default)]
    struct Tally {
        total: i64,
        entries: u32,
    }

    #[derive(Clone, Debug)]
    enum TallyAction {
        Record(i64),
        Clear,
        Flush,
    }

    struct TallyReducer;

    impl Reducer for TallyReducer {
        type State = Tally;
        type Action = TallyAction;
        type Environment = ();

        fn reduce(&self, state: &mut Tally, action: TallyAction, _env: &()) -> Effects<TallyAction> {
            match action {
                TallyAction::Record(amount) => {
                    state.total += amount;
                    state.entries += 1;
                    smallvec![Effect::None]
                },
                TallyAction::Clear => {
                    *state = Tally::default();
                    smallvec![Effect::None]
                },
                TallyAction::Flush => {
                    smallvec![Effect::future(async { Some(TallyAction::Clear) })]
                },
            }
        }
    }

    #[test]
    fn harness_runs_checks_against_the_new_state() {
        ReducerTest::new(TallyReducer)
            .with_env(())
            .given_state(Tally::default())
            .when_action(TallyAction::Record(40))
            .then_state(|state| {
                assert_eq!(state.total, 40);
                assert_eq!(state.entries, 1);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn harness_exposes_returned_effects() {
        ReducerTest::new(TallyReducer)
            .with_env(())
            .given_state(Tally {
                total: 9,
                entries: 3,
            })
            .when_action(TallyAction::Flush)
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn effect_free_check_tolerates_a_lone_none() {
        assertions::assert_no_effects::<TallyAction>(&[Effect::None]);
        assertions::assert_no_effects::<TallyAction>(&[]);
    }
}
