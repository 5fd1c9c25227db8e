//! Reactive request driver shared by the search and detail fetchers.
//!
//! A driver task watches an input channel. Every input change starts a new
//! cycle: the cycle callback runs, the previous request's token is cancelled,
//! and either the state is reset (no request needed) or exactly one new
//! request is spawned with its own token. A request only commits its outcome
//! if its token is still live at commit time, and that check runs under the
//! state channel's lock, so a superseded request can never overwrite newer
//! state.

use async_trait::async_trait;
use popcorn_sources::FetchError;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Callback run synchronously at the start of every cycle
pub type CycleCallback = Arc<dyn Fn() + Send + Sync>;

/// Request-scoped state published by a fetcher.
///
/// `error` and `data` are exclusive after a request settles: an error resets
/// `data` to its default. Starting a request clears `error` but keeps the
/// previous `data` until the new result arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<I, T> {
    /// Input this state reflects
    pub input: I,
    pub data: T,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl<I, T: Default> FetchState<I, T> {
    pub fn idle(input: I) -> Self {
        Self {
            input,
            data: T::default(),
            is_loading: false,
            error: None,
        }
    }
}

/// One kind of reactive request.
#[async_trait]
pub trait FetchCycle: Send + Sync + 'static {
    type Input: Clone + PartialEq + Default + Send + Sync + 'static;
    type Output: Clone + Default + Send + Sync + 'static;

    /// Request key for `input`, or `None` to reset state without a request
    fn request_key(&self, input: &Self::Input) -> Option<String>;

    async fn fetch(
        &self,
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<Self::Output, FetchError>;
}

/// Handle to a running driver. Dropping it tears the driver down: the
/// in-flight request is cancelled and nothing is published afterwards.
pub struct ReactiveFetch<C: FetchCycle> {
    input_rx: watch::Receiver<C::Input>,
    state_rx: watch::Receiver<FetchState<C::Input, C::Output>>,
    shutdown: CancellationToken,
    driver: JoinHandle<()>,
}

impl<C: FetchCycle> ReactiveFetch<C> {
    /// Start driving `cycle` from `input_rx`. The current input value is
    /// processed as the first cycle before this returns.
    pub fn spawn(
        cycle: C,
        input_rx: watch::Receiver<C::Input>,
        on_cycle: Option<CycleCallback>,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(FetchState::idle(C::Input::default()));
        let shutdown = CancellationToken::new();

        let mut driver = Driver {
            cycle: Arc::new(cycle),
            state_tx: Arc::new(state_tx),
            shutdown: shutdown.clone(),
            on_cycle,
            current: None,
        };

        let mut driver_rx = input_rx.clone();
        let initial = driver_rx.borrow_and_update().clone();
        driver.run_cycle(initial);
        let driver = tokio::spawn(driver.run(driver_rx));

        Self {
            input_rx,
            state_rx,
            shutdown,
            driver,
        }
    }

    /// Snapshot of the published state
    pub fn state(&self) -> FetchState<C::Input, C::Output> {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<C::Input, C::Output>> {
        self.state_rx.clone()
    }

    /// Wait until the published state reflects the current input and is not
    /// loading. Never resolves while a request for the current input hangs.
    pub async fn wait_settled(&self) -> FetchState<C::Input, C::Output> {
        let mut state_rx = self.state_rx.clone();
        loop {
            {
                let state = state_rx.borrow_and_update();
                if !state.is_loading && state.input == *self.input_rx.borrow() {
                    return state.clone();
                }
            }
            if state_rx.changed().await.is_err() {
                return self.state();
            }
        }
    }
}

impl<C: FetchCycle> Drop for ReactiveFetch<C> {
    fn drop(&mut self) {
        self.shutdown.cancel();
        self.driver.abort();
    }
}

struct Driver<C: FetchCycle> {
    cycle: Arc<C>,
    state_tx: Arc<watch::Sender<FetchState<C::Input, C::Output>>>,
    shutdown: CancellationToken,
    on_cycle: Option<CycleCallback>,
    /// Token of the request in flight, if any
    current: Option<CancellationToken>,
}

impl<C: FetchCycle> Driver<C> {
    fn run_cycle(&mut self, input: C::Input) {
        if let Some(callback) = &self.on_cycle {
            callback();
        }

        if let Some(previous) = self.current.take() {
            previous.cancel();
        }

        let Some(key) = self.cycle.request_key(&input) else {
            self.state_tx.send_replace(FetchState::idle(input));
            return;
        };

        let token = self.shutdown.child_token();
        self.state_tx.send_modify(|state| {
            state.input = input;
            state.error = None;
            state.is_loading = true;
        });
        self.current = Some(token.clone());
        tokio::spawn(run_request(
            Arc::clone(&self.cycle),
            key,
            token,
            Arc::clone(&self.state_tx),
        ));
    }

    async fn run(mut self, mut input_rx: watch::Receiver<C::Input>) {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                changed = input_rx.changed() => {
                    if changed.is_err() {
                        debug!("Input channel closed, stopping fetch driver");
                        break;
                    }
                    let input = input_rx.borrow_and_update().clone();
                    self.run_cycle(input);
                }
            }
        }

        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }
}

async fn run_request<C: FetchCycle>(
    cycle: Arc<C>,
    key: String,
    token: CancellationToken,
    state_tx: Arc<watch::Sender<FetchState<C::Input, C::Output>>>,
) {
    let result = cycle.fetch(&key, &token).await;

    let committed = state_tx.send_if_modified(|state| {
        // Checked under the channel lock: a newer cycle may have cancelled us
        if token.is_cancelled() {
            return false;
        }
        match result {
            Ok(data) => {
                state.data = data;
                state.error = None;
            }
            Err(err) if err.is_cancelled() => {}
            Err(err) => {
                warn!("Request for '{}' failed: {}", key, err);
                state.data = C::Output::default();
                state.error = Some(err.to_string());
            }
        }
        state.is_loading = false;
        true
    });

    if !committed {
        debug!("Discarded result of superseded request '{}'", key);
    }
}
