//! The auto-navigation state machine.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use painel_session::ExpiryGate;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::{NavigationConfig, RouteCatalog, SequencerConfig};

type Navigate = Arc<dyn Fn(&str) + Send + Sync>;

// ---------------------------------------------------------------------------
// Public state types
// ---------------------------------------------------------------------------

/// Where the sequencer is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RunState {
    /// No run. `start` may be called.
    Idle,
    /// A run is active and its timer is armed.
    Running,
    /// `stop` is tearing the run down. Only observable inside `stop`.
    Stopping,
}

impl RunState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Running,
            2 => Self::Stopping,
            _ => Self::Idle,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Running => write!(f, "Running"),
            Self::Stopping => write!(f, "Stopping"),
        }
    }
}

/// What [`Sequencer::start`] did. None of the no-op cases are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A run started over these routes.
    Started { routes: Vec<String> },
    /// A run is already active; it was left alone.
    AlreadyRunning,
    /// No category selected.
    EmptySelection,
    /// Categories were selected, but none of them produced a route.
    EmptySequence,
}

impl StartOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started { .. })
    }
}

// ---------------------------------------------------------------------------
// Internal run state
// ---------------------------------------------------------------------------

struct Run {
    id: u64,
    routes: Vec<String>,
    /// Index of the next route to navigate to.
    index: usize,
    looping: bool,
    navigate: Navigate,
    cancel_requested: bool,
    task: Option<JoinHandle<()>>,
}

struct Inner {
    run: Option<Run>,
    next_id: u64,
}

/// `state` and `current` mirror the run outside `inner`, so the navigation
/// callback can read them while `inner` is held.
struct Shared<G> {
    config: SequencerConfig,
    gate: G,
    inner: Mutex<Inner>,
    state: AtomicU8,
    current: Mutex<Option<String>>,
}

enum Step {
    Continue,
    Done,
}

impl<G: ExpiryGate> Shared<G> {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Only called with `inner` held.
    fn set_state(&self, state: RunState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    fn set_current(&self, route: Option<&str>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = route.map(str::to_string);
    }

    /// One timer step of run `id`. Navigation happens with the lock held,
    /// so a concurrent `stop` either runs entirely before (and the run id
    /// no longer matches) or entirely after.
    fn step(&self, id: u64) -> Step {
        let mut inner = self.lock();
        let Some(run) = inner.run.as_mut().filter(|r| r.id == id && !r.cancel_requested) else {
            return Step::Done;
        };

        if run.index >= run.routes.len() {
            if !run.looping {
                let run = inner.run.take();
                self.finish(run, "completed");
                return Step::Done;
            }
            debug!(run = id, "sequence exhausted, looping");
            run.index = 0;
        }

        let route = run.routes[run.index].as_str();
        debug!(run = id, index = run.index, %route, "navigating");
        self.set_current(Some(route));
        (run.navigate)(route);
        run.index += 1;
        Step::Continue
    }

    /// Moves to Idle and settles a deferred expiry, if any. Called with
    /// `inner` held.
    fn finish(&self, run: Option<Run>, reason: &str) {
        self.set_state(RunState::Idle);
        self.set_current(None);
        let Some(run) = run else {
            return;
        };
        info!(run = run.id, reason, "auto-navigation run ended");
        if self.gate.settle_expired() {
            info!(route = %self.config.login_route, "session expired during run, redirecting");
            (run.navigate)(self.config.login_route.as_str());
        }
    }
}

async fn drive<G: ExpiryGate>(shared: Arc<Shared<G>>, id: u64, interval: Duration) {
    time::sleep(shared.config.debounce).await;
    if let Step::Done = shared.step(id) {
        return;
    }

    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if let Step::Done = shared.step(id) {
            return;
        }
    }
}

// ---------------------------------------------------------------------------
// Sequencer
// ---------------------------------------------------------------------------

/// Walks a derived route list on a timer.
///
/// Each run owns one spawned Tokio task. [`stop`](Self::stop) is
/// synchronous: once it returns, the run's callback is never invoked again
/// (apart from the login redirect `stop` itself may issue).
///
/// The navigation callback runs while the sequencer's run lock is held.
/// From inside it, [`state`](Self::state), [`is_running`](Self::is_running)
/// and [`current_route`](Self::current_route) are safe; `start` and `stop`
/// would deadlock.
pub struct Sequencer<G: ExpiryGate> {
    catalog: Arc<RouteCatalog>,
    shared: Arc<Shared<G>>,
}

impl<G: ExpiryGate> Sequencer<G> {
    pub fn new(catalog: impl Into<Arc<RouteCatalog>>, config: SequencerConfig, gate: G) -> Self {
        let config = config.validated();
        debug!(
            debounce_ms = config.debounce.as_millis() as u64,
            login_route = %config.login_route,
            "sequencer created"
        );
        Self {
            catalog: catalog.into(),
            shared: Arc::new(Shared {
                config,
                gate,
                inner: Mutex::new(Inner {
                    run: None,
                    next_id: 0,
                }),
                state: AtomicU8::new(RunState::Idle as u8),
                current: Mutex::new(None),
            }),
        }
    }

    pub fn catalog(&self) -> &RouteCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.shared.config
    }

    /// Starts a run over the routes derived from `nav`.
    ///
    /// The first navigation happens after [`SequencerConfig::debounce`],
    /// then one per [`NavigationConfig::interval`]. With looping off the
    /// run ends one interval after the last route.
    ///
    /// `navigate` is invoked with the run lock held: it may query
    /// [`state`](Self::state), [`is_running`](Self::is_running) and
    /// [`current_route`](Self::current_route), but must not call `start`
    /// or `stop`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start<F>(&self, nav: &NavigationConfig, navigate: F) -> StartOutcome
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let mut inner = self.shared.lock();
        let state = self.shared.state();
        if state != RunState::Idle {
            debug!(%state, "start ignored, run already active");
            return StartOutcome::AlreadyRunning;
        }
        if nav.selected_categories.is_empty() {
            debug!("start ignored, nothing selected");
            return StartOutcome::EmptySelection;
        }
        let routes = self.catalog.expand(nav);
        if routes.is_empty() {
            debug!(categories = ?nav.selected_categories, "start ignored, selection yields no routes");
            return StartOutcome::EmptySequence;
        }

        inner.next_id += 1;
        let id = inner.next_id;
        let interval = nav.interval();
        let task = tokio::spawn(drive(Arc::clone(&self.shared), id, interval));

        info!(
            run = id,
            routes = routes.len(),
            interval_secs = interval.as_secs(),
            looping = nav.looping,
            "auto-navigation run started"
        );
        inner.run = Some(Run {
            id,
            routes: routes.clone(),
            index: 0,
            looping: nav.looping,
            navigate: Arc::new(navigate),
            cancel_requested: false,
            task: Some(task),
        });
        self.shared.set_state(RunState::Running);
        StartOutcome::Started { routes }
    }

    /// Stops the active run, if any. Returns whether there was one.
    ///
    /// The timer task is aborted before this returns, and the session's
    /// deferred expiry is settled (possibly navigating to the login route).
    pub fn stop(&self) -> bool {
        let mut inner = self.shared.lock();
        let Some(mut run) = inner.run.take() else {
            return false;
        };
        self.shared.set_state(RunState::Stopping);
        run.cancel_requested = true;
        if let Some(task) = run.task.take() {
            task.abort();
        }
        self.shared.finish(Some(run), "stopped");
        true
    }

    /// Lock-free; safe to call from the navigation callback.
    pub fn state(&self) -> RunState {
        self.shared.state()
    }

    pub fn is_running(&self) -> bool {
        self.state() == RunState::Running
    }

    /// The route most recently navigated to by the active run.
    pub fn current_route(&self) -> Option<String> {
        self.shared
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<G: ExpiryGate> Drop for Sequencer<G> {
    fn drop(&mut self) {
        let mut inner = self.shared.lock();
        if let Some(task) = inner.run.as_mut().and_then(|r| r.task.take()) {
            task.abort();
        }
    }
}
