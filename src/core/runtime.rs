//! Executes dashboard effects and feeds their results back as events.

use super::dashboard::{DashboardState, Effect, Event, reduce};
use super::rates::{RateSource, Rates};
use crate::providers::caching::CachingRateSource;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Owns the dashboard state. Fetches run as spawned tasks and report back
/// through a channel; completions are applied in arrival order, and the
/// reducer drops search completions that are no longer the latest.
pub struct DashboardRuntime<S: RateSource + 'static> {
    state: DashboardState,
    source: Arc<CachingRateSource<S>>,
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
    in_flight: usize,
}

impl<S: RateSource + 'static> DashboardRuntime<S> {
    pub fn new(source: S) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: DashboardState::default(),
            source: Arc::new(CachingRateSource::new(source)),
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn has_pending(&self) -> bool {
        self.in_flight > 0
    }

    pub fn dispatch(&mut self, event: Event) {
        let state = std::mem::take(&mut self.state);
        let (next, effect) = reduce(state, event);
        self.state = next;
        if let Some(effect) = effect {
            self.spawn(effect);
        }
    }

    fn spawn(&mut self, effect: Effect) {
        debug!(?effect, "Spawning effect");
        self.in_flight += 1;
        let tx = self.tx.clone();
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            // A panicking fetch still has to report back, or `settle` never returns.
            let event = match tokio::spawn(run_effect(effect.clone(), source)).await {
                Ok(event) => event,
                Err(e) => failed(effect, format!("Rate fetch aborted: {e}")),
            };
            // The runtime may be gone by now; the result is simply dropped.
            let _ = tx.send(event);
        });
    }

    /// Waits for one in-flight effect to finish and applies its result.
    /// Returns `false` immediately when nothing is in flight.
    pub async fn apply_next_completion(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.rx.recv().await {
            Some(event) => {
                self.in_flight -= 1;
                self.dispatch(event);
                true
            }
            None => false,
        }
    }

    /// Applies completions until no effect is in flight.
    pub async fn settle(&mut self) {
        while self.apply_next_completion().await {}
    }
}

async fn run_effect<S: RateSource>(
    effect: Effect,
    source: Arc<CachingRateSource<S>>,
) -> Event {
    match effect {
        Effect::LoadRates => Event::RatesLoaded(fetch(&source).await),
        Effect::Reload => {
            source.invalidate().await;
            Event::RatesLoaded(fetch(&source).await)
        }
        Effect::Search { seq, query } => Event::SearchCompleted {
            seq,
            query,
            outcome: fetch(&source).await,
        },
    }
}

fn failed(effect: Effect, error: String) -> Event {
    match effect {
        Effect::LoadRates | Effect::Reload => Event::RatesLoaded(Err(error)),
        Effect::Search { seq, query } => Event::SearchCompleted {
            seq,
            query,
            outcome: Err(error),
        },
    }
}

async fn fetch<S: RateSource>(source: &CachingRateSource<S>) -> Result<Rates, String> {
    source.fetch_rates().await.map_err(|e| e.to_string())
}
