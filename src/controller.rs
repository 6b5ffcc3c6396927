// src/controller.rs

use std::{
    fmt,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    config::{Config, OverlapPolicy},
    error::SubmitError,
    fetch::Transport,
    payload::unwrap_payload,
    render::DisplayLocale,
    surface::{Fragment, RenderTarget, SurfaceId},
    views::{self, ViewKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
}

#[derive(Debug, Default)]
struct State {
    in_flight: usize,
    /// Bumped by every accepted submission; only the latest may commit.
    generation: u64,
}

/// Decrements the in-flight count even when the submit future is dropped.
struct InFlight<'a> {
    state: &'a Mutex<State>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    pub symbol: String,
    pub rows: Vec<(ViewKind, usize)>,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub enum Outcome {
    /// All surfaces were replaced with the new results.
    Rendered(RenderSummary),
    /// Nothing but the ticker echo changed.
    Failed(SubmitError),
    /// Another submission was in flight.
    Ignored,
    /// A newer submission started before this one finished.
    Superseded,
}

impl Outcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, Outcome::Rendered(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Rendered(summary) => {
                write!(f, "rendered")?;
                for (kind, rows) in &summary.rows {
                    write!(f, " {}={}", kind.as_str(), rows)?;
                }
                write!(f, " in {:?}", summary.elapsed)
            }
            Outcome::Failed(err) => write!(f, "failed ({}): {}", err.kind().as_str(), err),
            Outcome::Ignored => write!(f, "ignored: a submission is already in flight"),
            Outcome::Superseded => write!(f, "superseded by a newer submission"),
        }
    }
}

struct Rendered {
    updates: Vec<(SurfaceId, Fragment)>,
    rows: Vec<(ViewKind, usize)>,
}

/// Owns one request lifecycle per submitted symbol: echo the symbol, fetch,
/// unwrap, project the four views, render them, and commit the whole batch
/// to the render target. Failures are logged and returned as an [`Outcome`];
/// they never leave a partially replaced set of tables behind.
pub struct SubmissionController<T, R> {
    transport: T,
    target: Mutex<R>,
    state: Mutex<State>,
    policy: OverlapPolicy,
    timeout: Duration,
    locale: DisplayLocale,
}

impl<T: Transport, R: RenderTarget> SubmissionController<T, R> {
    pub fn new(transport: T, target: R, config: &Config) -> Self {
        Self {
            transport,
            target: Mutex::new(target),
            state: Mutex::new(State::default()),
            policy: config.overlap,
            timeout: config.timeout(),
            locale: config.locale.clone(),
        }
    }

    pub fn phase(&self) -> Phase {
        if self.lock_state().in_flight > 0 {
            Phase::Submitting
        } else {
            Phase::Idle
        }
    }

    /// The render target, e.g. to read back what was committed.
    pub fn target(&self) -> MutexGuard<'_, R> {
        self.target.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> Option<u64> {
        let mut state = self.lock_state();
        if state.in_flight > 0 && self.policy == OverlapPolicy::RejectWhilePending {
            return None;
        }
        state.in_flight += 1;
        state.generation += 1;
        Some(state.generation)
    }

    fn fail(&self, err: SubmitError) -> Outcome {
        error!(kind = err.kind().as_str(), error = %err, "submission failed");
        Outcome::Failed(err)
    }

    #[instrument(level = "info", skip(self))]
    pub async fn submit(&self, symbol: &str) -> Outcome {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return self.fail(SubmitError::EmptySymbol);
        }

        let Some(generation) = self.begin() else {
            warn!("submission already in flight; ignored");
            return Outcome::Ignored;
        };
        let _in_flight = InFlight { state: &self.state };

        if let Err(e) = self
            .target()
            .replace(SurfaceId::Ticker, Fragment::Text(symbol.to_string()))
        {
            warn!(error = %e, "could not echo ticker");
        }

        let started = Instant::now();
        let result = self.run(symbol).await;

        // decided under the state lock so a newer submission cannot slip in between
        let state = self.lock_state();
        if state.generation != generation {
            info!(generation, latest = state.generation, "result discarded");
            return Outcome::Superseded;
        }

        let rendered = match result {
            Ok(rendered) => rendered,
            Err(err) => return self.fail(err),
        };
        if let Err(e) = self.target().replace_all(rendered.updates) {
            return self.fail(SubmitError::Surface(e));
        }
        drop(state);

        let elapsed = started.elapsed();
        info!(elapsed = ?elapsed, "rendered");
        Outcome::Rendered(RenderSummary {
            symbol: symbol.to_string(),
            rows: rendered.rows,
            elapsed,
        })
    }

    /// Submit each symbol in turn, waiting for one to finish before the next
    /// starts, so none of them is turned away as overlapping.
    pub async fn submit_all<I, S>(&self, symbols: I) -> Vec<(String, Outcome)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut outcomes = Vec::new();
        for symbol in symbols {
            let symbol = symbol.as_ref();
            let outcome = self.submit(symbol).await;
            outcomes.push((symbol.to_string(), outcome));
        }
        outcomes
    }

    async fn run(&self, symbol: &str) -> Result<Rendered, SubmitError> {
        let response = tokio::time::timeout(self.timeout, self.transport.fetch(symbol))
            .await
            .map_err(|_| SubmitError::Timeout(self.timeout))??;

        let data = unwrap_payload(response)?;
        let tables = views::project_all(&data, &self.locale)?;

        let mut updates = Vec::with_capacity(tables.len() + 1);
        updates.push((SurfaceId::Message, Fragment::Text(views::message(&data))));
        let mut rows = Vec::with_capacity(tables.len());
        for (kind, table) in &tables {
            debug!(view = kind.as_str(), rows = table.rows.len(), "rendering");
            rows.push((*kind, table.rows.len()));
            updates.push((kind.surface(), Fragment::Html(table.render(&self.locale))));
        }

        Ok(Rendered { updates, rows })
    }
}
