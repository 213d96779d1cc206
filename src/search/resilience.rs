//! Retry and circuit-breaker policy for provider calls.
//!
//! Every outbound provider request runs through a [`Resilience`] wrapper:
//! a bounded retry loop with doubling backoff for transient failures, inside
//! a per-provider circuit breaker. The breaker is a small explicit state
//! machine (closed / open / half-open), not a library decorator:
//!
//! - **Closed**: calls pass through; consecutive failures are counted.
//! - **Open**: entered when the failure count crosses the threshold. Calls
//!   short-circuit immediately to [`SearchError::CircuitOpen`] without
//!   touching the network.
//! - **Half-open**: entered after the cool-down elapses. The next call is a
//!   probe - success closes the breaker, failure re-opens it.
//!
//! Breaker state doubles as the provider health signal for
//! [`crate::search::aggregator::SearchAggregator::health_status`].

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::domain::SearchError;

/// Bounded retry with doubling backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first (so 3 = 1 call + 2 retries)
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent retry
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(250),
        }
    }
}

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Per-provider circuit breaker.
#[derive(Debug)]
pub struct CircuitBreaker {
    provider: &'static str,
    failure_threshold: u32,
    cooldown: Duration,
    inner: Mutex<BreakerInner>,
}

/// Failures in a row before the circuit opens.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;

/// How long an open circuit rejects calls before admitting a probe.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30);

impl CircuitBreaker {
    /// Create a closed breaker with the given thresholds.
    pub fn new(provider: &'static str, failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            provider,
            failure_threshold,
            cooldown,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
            }),
        }
    }

    /// Ask permission to make a call.
    ///
    /// Returns `false` while the circuit is open and the cool-down has not
    /// elapsed. When the cool-down has elapsed the breaker transitions to
    /// half-open and admits the call as a probe.
    pub fn try_acquire(&self) -> bool {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let cooled = inner
                    .opened_at
                    .is_some_and(|t| t.elapsed() >= self.cooldown);
                if cooled {
                    tracing::debug!(provider = self.provider, "circuit half-open, admitting probe");
                    inner.state = CircuitState::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record a successful call: resets the failure count and closes the circuit.
    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        if inner.state != CircuitState::Closed {
            tracing::info!(provider = self.provider, "circuit closed");
        }
        inner.state = CircuitState::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
    }

    /// Record a failed call.
    ///
    /// Opens the circuit when the threshold is crossed, or immediately when
    /// a half-open probe fails.
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock();
        inner.consecutive_failures += 1;
        let should_open = inner.state == CircuitState::HalfOpen
            || inner.consecutive_failures >= self.failure_threshold;
        if should_open && inner.state != CircuitState::Open {
            tracing::warn!(
                provider = self.provider,
                failures = inner.consecutive_failures,
                "circuit opened"
            );
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
        }
    }

    /// Current state, accounting for an elapsed cool-down (an open circuit
    /// whose cool-down has passed reports half-open without mutating).
    pub fn state(&self) -> CircuitState {
        let inner = self.inner.lock();
        match inner.state {
            CircuitState::Open
                if inner
                    .opened_at
                    .is_some_and(|t| t.elapsed() >= self.cooldown) =>
            {
                CircuitState::HalfOpen
            }
            s => s,
        }
    }

    /// A provider is considered healthy unless its circuit is open.
    pub fn is_healthy(&self) -> bool {
        self.state() != CircuitState::Open
    }
}

/// Combined retry + circuit-breaker wrapper for one provider.
#[derive(Debug)]
pub struct Resilience {
    retry: RetryPolicy,
    breaker: CircuitBreaker,
}

impl Resilience {
    /// Default policy: 3 attempts, 250 ms doubling backoff, breaker opens
    /// after 5 consecutive failures with a 30 s cool-down.
    pub fn new(provider: &'static str) -> Self {
        Self::with_policy(
            provider,
            RetryPolicy::default(),
            DEFAULT_FAILURE_THRESHOLD,
            DEFAULT_COOLDOWN,
        )
    }

    /// Fully custom policy (used by tests and config overrides).
    pub fn with_policy(
        provider: &'static str,
        retry: RetryPolicy,
        failure_threshold: u32,
        cooldown: Duration,
    ) -> Self {
        Self {
            retry,
            breaker: CircuitBreaker::new(provider, failure_threshold, cooldown),
        }
    }

    /// The breaker, for health reporting.
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Run `op` under the full policy.
    ///
    /// Short-circuits with [`SearchError::CircuitOpen`] when the breaker
    /// rejects the call. Otherwise retries transient failures up to the
    /// attempt budget, then records the outcome on the breaker. One logical
    /// call counts as one breaker success/failure regardless of how many
    /// retries it took.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, SearchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SearchError>>,
    {
        if !self.breaker.try_acquire() {
            return Err(SearchError::CircuitOpen(self.breaker.provider));
        }

        let mut backoff = self.retry.initial_backoff;
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => {
                    self.breaker.record_success();
                    return Ok(value);
                }
                Err(err) if err.is_transient() && attempt < self.retry.max_attempts => {
                    tracing::debug!(
                        provider = self.breaker.provider,
                        attempt,
                        error = %err,
                        "transient failure, retrying after {:?}",
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                }
                Err(err) => {
                    self.breaker.record_failure();
                    return Err(err);
                }
            }
        }
    }
}
