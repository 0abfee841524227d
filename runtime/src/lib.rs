//! # CartFlow Runtime
//!
//! Runtime implementation for the CartFlow state container.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: owns the state tree, serializes dispatch, executes effects
//! - **Selection**: push-based projected view of state with equality dedup
//! - **`EffectHandle`**: lets callers wait for an action's effects to finish
//!
//! ## Example
//!
//! ```ignore
//! use cartflow_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Dispatch an action
//! let handle = store.send(Action::Refresh).await?;
//! handle.wait().await;
//!
//! // Read state
//! let count = store.state(|s| s.items.len()).await;
//!
//! // Observe a projection
//! let mut items = store.select(|s| s.items.clone());
//! while let Some(items) = items.next().await {
//!     println!("items changed: {items:?}");
//! }
//! ```

use cartflow_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, watch};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Failures surfaced by store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// New actions are rejected because shutdown has begun
        ///
        /// Returned when `send()` is called after shutdown was initiated.
        /// Effects that complete after shutdown hit this path too, which is
        /// what makes their follow-up dispatch a safe no-op.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// The shutdown deadline passed with effects still in flight
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for a terminal action
        ///
        /// Returned by `send_and_wait_for` and `EffectHandle::wait_with_timeout`
        /// when the timeout expires first.
        #[error("Timeout waiting for action")]
        Timeout,

        /// The action broadcast channel has closed
        ///
        /// Typically means the store is shutting down.
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the effects spawned by
/// that action to complete. The handle covers the action's immediate effects,
/// including the feedback dispatch of any action an effect produces.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(Action::Refresh).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // All effects from Action::Refresh are now complete
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new effect handle together with its tracking side
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: tx,
        };

        (handle, tracking)
    }

    /// A handle with nothing left to wait for
    ///
    /// Useful for initialization in loops where you need a `last_handle`.
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        let _ = tx.send(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Wait for all effects to complete
    ///
    /// Returns immediately if the action produced no asynchronous effects.
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            let _ = self.completion.changed().await;
        }
    }

    /// Wait for all effects to complete, bounded by a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all
    /// effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: effect tracking context passed through effect execution
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl EffectTracking {
    /// An effect started
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// An effect finished; the last one out notifies waiters
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Last effect just finished; wake waiters
            let _ = self.notifier.send(());
        }
    }
}

impl Clone for EffectTracking {
    fn clone(&self) -> Self {
        Self {
            counter: Arc::clone(&self.counter),
            notifier: self.notifier.clone(),
        }
    }
}

/// Internal: RAII guard that decrements the effect counter on drop
///
/// Ensures the counter is always decremented, even if the effect panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// A live, push-based view of a projection over store state
///
/// Created by [`Store::select`]. Emits the projected value whenever it
/// changes; values equal to the last emission are suppressed, so unrelated
/// state changes do not wake subscribers. Dropping the `Selection`
/// unsubscribes.
///
/// Note that observation is level-triggered: if several dispatches land
/// between two polls, intermediate values may be skipped and only the
/// latest is observed.
pub struct Selection<S, T> {
    rx: watch::Receiver<S>,
    project: Box<dyn Fn(&S) -> T + Send>,
    last: Option<T>,
}

impl<S, T> Selection<S, T>
where
    T: Clone + PartialEq,
{
    /// Read the projected value from the current state snapshot
    #[must_use]
    pub fn current(&self) -> T {
        (self.project)(&self.rx.borrow())
    }

    /// Wait for the next distinct projected value
    ///
    /// Returns `None` once the store has been dropped and no further state
    /// changes can occur.
    pub async fn next(&mut self) -> Option<T> {
        loop {
            if self.rx.changed().await.is_err() {
                return None;
            }

            let value = (self.project)(&self.rx.borrow_and_update());
            if self.last.as_ref() != Some(&value) {
                self.last = Some(value.clone());
                return Some(value);
            }
        }
    }
}

impl<S, T> std::fmt::Debug for Selection<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection").finish_non_exhaustive()
    }
}

/// Store module - the runtime for reducers
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicUsize, DecrementGuard, Duration, Effect, EffectHandle,
        EffectTracking, Ordering, Reducer, RwLock, Selection, StoreError, watch,
    };
    use tokio::sync::broadcast;

    /// Runtime coordinator for a reducer
    ///
    /// Owns the state tree behind an `RwLock`, runs the reducer under the
    /// write lock, and executes returned effect descriptions on spawned
    /// tasks, feeding any actions they produce back through `send`.
    ///
    /// The state is exclusively owned by the store; mutation happens by
    /// replacement under the write lock, never in place from outside, so
    /// concurrent readers never observe a partially updated tree. Dispatches
    /// serialize in `send` call order; effect completions are unordered.
    ///
    /// The store is constructed explicitly and passed by handle (`Clone`
    /// shares the same underlying state) - there is no ambient global.
    /// It lives from startup until [`shutdown`](Store::shutdown) or drop.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        shutdown: Arc<AtomicBool>,
        /// Counts every in-flight effect task, store-wide; its notifier
        /// fires when the count drains to zero.
        pending_effects: EffectTracking,
        /// Waiter side of `pending_effects`, used by `shutdown`.
        pending_handle: EffectHandle,
        /// Broadcasts effect-produced actions to observers.
        action_broadcast: broadcast::Sender<A>,
        /// Carries the latest state snapshot to subscribers.
        state_watch: watch::Sender<S>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + Clone + 'static,
        E: Send + Sync + 'static,
    {
        /// Build a store from initial state, reducer, and environment
        ///
        /// Action broadcast capacity defaults to 16; use
        /// [`with_broadcast_capacity`](Store::with_broadcast_capacity) for
        /// high-throughput observers.
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_broadcast_capacity(initial_state, reducer, environment, 16)
        }

        /// Build a store with a custom action broadcast capacity
        #[must_use]
        pub fn with_broadcast_capacity(
            initial_state: S,
            reducer: R,
            environment: E,
            capacity: usize,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(capacity);
            let (state_watch, _) = watch::channel(initial_state.clone());
            let (pending_handle, pending_effects) = EffectHandle::new();

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects,
                pending_handle,
                action_broadcast,
                state_watch,
            }
        }

        /// Dispatch an action
        ///
        /// The primary entry point. One dispatch:
        /// 1. Acquires the write lock on state
        /// 2. Calls the reducer with (state, action, environment)
        /// 3. Publishes the new state snapshot to subscribers
        /// 4. Executes returned effects asynchronously
        /// 5. Effects may produce more actions (feedback loop)
        ///
        /// `send` returns after starting effect execution, not completion;
        /// use the returned [`EffectHandle`] to wait. Multiple concurrent
        /// `send` calls serialize at the reducer, in call order.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is
        /// shutting down.
        ///
        /// # Panics
        ///
        /// If the reducer panics, the panic propagates. Reducers are pure
        /// functions and must not panic.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError>
        where
            R: Clone,
            E: Clone,
        {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Dropping action, shutdown in progress");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            tracing::debug!("Dispatching action");
            metrics::counter!("store.actions.total").increment(1);

            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let mut state = self.state.write().await;

                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut state, action, &self.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                tracing::trace!(count = effects.len(), "Reducer returned effects");

                // Publish the new snapshot while still holding the write
                // lock, so subscribers observe snapshots in dispatch order
                let _ = self.state_watch.send(state.clone());

                effects
            };

            for effect in effects {
                self.execute_effect_internal(effect, tracking.clone());
            }

            Ok(handle)
        }

        /// Dispatch an action and wait for a matching feedback action
        ///
        /// Designed for request-response flows: subscribes to the action
        /// broadcast BEFORE sending (avoiding a race), sends the action,
        /// then resolves with the first effect-produced action matching the
        /// predicate.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: no matching action within `timeout`
        /// - [`StoreError::ChannelClosed`]: broadcast channel closed
        /// - [`StoreError::ShutdownInProgress`]: store is shutting down
        ///
        /// # Example
        ///
        /// ```ignore
        /// let result = store.send_and_wait_for(
        ///     ProductAction::LoadProducts,
        ///     |a| matches!(a,
        ///         ProductAction::LoadProductsSuccess { .. } |
        ///         ProductAction::LoadProductsFailed { .. }
        ///     ),
        ///     Duration::from_secs(10),
        /// ).await?;
        /// ```
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            R: Clone,
            E: Clone,
            F: Fn(&A) -> bool,
        {
            // Subscribe BEFORE sending to avoid a race
            let mut rx = self.action_broadcast.subscribe();

            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {}, // Not the action we want, keep waiting
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            // Slow consumer; if the terminal action was
                            // dropped the timeout catches it
                            tracing::warn!(skipped, "Action observer lagged");
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Read a snapshot of state through a closure
        ///
        /// Access state through a closure so the read lock is released
        /// promptly:
        ///
        /// ```ignore
        /// let cart_len = store.state(|s| s.products.cart.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&state)
        }

        /// Observe a projection of state as a live, push-based view
        ///
        /// The returned [`Selection`] emits whenever the projected value
        /// changes, suppressing emissions equal (by `PartialEq`) to the last
        /// one. Dropping the selection unsubscribes.
        pub fn select<T, F>(&self, projector: F) -> Selection<S, T>
        where
            F: Fn(&S) -> T + Send + 'static,
            T: Clone + PartialEq + 'static,
        {
            let rx = self.state_watch.subscribe();
            let last = Some(projector(&rx.borrow()));

            Selection {
                rx,
                project: Box::new(projector),
                last,
            }
        }

        /// Subscribe to raw state snapshots
        ///
        /// Returns a watch receiver carrying every published state snapshot.
        /// Dropping the receiver is the unsubscribe.
        #[must_use]
        pub fn watch_state(&self) -> watch::Receiver<S> {
            self.state_watch.subscribe()
        }

        /// Subscribe to all actions produced by effects
        ///
        /// Only effect-produced actions are broadcast, not the initial
        /// actions passed to [`send`](Store::send). If the receiver lags it
        /// skips old actions and observes `RecvError::Lagged`.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Begin graceful shutdown
        ///
        /// Sets the shutdown flag (new sends are rejected, so follow-up
        /// dispatches from in-flight effects become no-ops), then waits on
        /// the store-wide completion notifier until every pending effect
        /// task has drained. Returns immediately when nothing is pending.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires
        /// with effects still running.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Beginning graceful shutdown");
            metrics::counter!("store.shutdown.initiated").increment(1);

            self.shutdown.store(true, Ordering::Release);

            let mut drained = self.pending_handle.clone();
            if drained.wait_with_timeout(timeout).await.is_ok() {
                tracing::info!("Shutdown complete, no effects pending");
                metrics::counter!("store.shutdown.completed").increment(1);
                Ok(())
            } else {
                let pending = self.pending_effects.counter.load(Ordering::SeqCst);
                tracing::error!(pending, "Shutdown gave up with effects still running");
                metrics::counter!("store.shutdown.timeout").increment(1);
                Err(StoreError::ShutdownTimeout(pending))
            }
        }

        /// Run one effect description
        ///
        /// Uses [`DecrementGuard`] so the effect counter is decremented even
        /// if the effect panics; effect task panics are contained to their
        /// task and do not halt the store.
        #[allow(clippy::needless_pass_by_value)] // tracking is cloned into tasks
        #[tracing::instrument(skip(self, effect, tracking), name = "execute_effect")]
        fn execute_effect_internal(&self, effect: Effect<A>, tracking: EffectTracking)
        where
            R: Clone,
            E: Clone,
        {
            match effect {
                Effect::None => {
                    tracing::trace!("No-op effect");
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    tracing::trace!("Spawning future effect");
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    tracking.increment();

                    self.pending_effects.increment();
                    let pending_guard = DecrementGuard(self.pending_effects.clone());

                    let tracking_clone = tracking.clone();
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = DecrementGuard(tracking_clone);
                        let _pending_guard = pending_guard;

                        if let Some(action) = fut.await {
                            tracing::trace!("Future effect produced a feedback action");

                            // Broadcast to observers, then feed back; a
                            // closed store drops the action silently
                            let _ = store.action_broadcast.send(action.clone());
                            let _ = store.send(action).await;
                        } else {
                            tracing::trace!("Future effect finished without an action");
                        }
                    });
                },
                Effect::Delay { duration, action } => {
                    tracing::trace!(?duration, "Scheduling delayed action");
                    metrics::counter!("store.effects.executed", "type" => "delay").increment(1);
                    tracking.increment();

                    self.pending_effects.increment();
                    let pending_guard = DecrementGuard(self.pending_effects.clone());

                    let tracking_clone = tracking.clone();
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = DecrementGuard(tracking_clone);
                        let _pending_guard = pending_guard;

                        tokio::time::sleep(duration).await;

                        let _ = store.action_broadcast.send((*action).clone());
                        let _ = store.send(*action).await;
                    });
                },
                Effect::Parallel(effects) => {
                    tracing::trace!(count = effects.len(), "Fanning out parallel effects");
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);

                    for effect in effects {
                        self.execute_effect_internal(effect, tracking.clone());
                    }
                },
                Effect::Sequential(effects) => {
                    let effect_count = effects.len();
                    tracing::trace!(count = effect_count, "Starting sequential effect chain");
                    metrics::counter!("store.effects.executed", "type" => "sequential").increment(1);

                    tracking.increment();

                    self.pending_effects.increment();
                    let pending_guard = DecrementGuard(self.pending_effects.clone());

                    let tracking_clone = tracking.clone();
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = DecrementGuard(tracking_clone);
                        let _pending_guard = pending_guard;

                        // Execute effects one by one, waiting for each to
                        // complete before starting the next
                        for (idx, effect) in effects.into_iter().enumerate() {
                            tracing::trace!(step = idx + 1, of = effect_count, "Running sequential step");

                            let (sub_tx, mut sub_rx) = watch::channel(());
                            let sub_tracking = EffectTracking {
                                counter: Arc::new(AtomicUsize::new(0)),
                                notifier: sub_tx,
                            };

                            store.execute_effect_internal(effect, sub_tracking.clone());

                            if sub_tracking.counter.load(Ordering::SeqCst) > 0 {
                                let _ = sub_rx.changed().await;
                            }
                        }
                        tracing::trace!("Sequential effect chain finished");
                    });
                },
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: self.pending_effects.clone(),
                pending_handle: self.pending_handle.clone(),
                action_broadcast: self.action_broadcast.clone(),
                state_watch: self.state_watch.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;
