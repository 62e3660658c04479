//! Sparkline feed: one bootstrap read plus one kline stream per selection.
//!
//! [`FeedController`] is the synchronous state machine that owns the quote
//! buffer. Async work lives in [`driver::FeedDriver`]; every result it posts
//! back carries the generation it was started for, and the controller drops
//! anything that does not match its current generation.

pub mod driver;

use crate::config::parse_interval_ms;
use crate::curve::{self, CurveGeometry, Dimensions};
use crate::error::AppError;
use crate::event::WsConnectionStatus;
use crate::model::kline::{Kline, KlineSample};
use crate::model::quote_buffer::{LiveBarPolicy, QuoteBuffer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub pair: String,
    pub interval: String,
    pub capacity: usize,
}

impl Selection {
    pub fn new(pair: &str, interval: &str, capacity: usize) -> Result<Self, AppError> {
        let pair = pair.trim().to_ascii_uppercase();
        if pair.is_empty() || !pair.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AppError::InvalidSelection(format!(
                "'{}' is not a trading pair",
                pair
            )));
        }
        if let Err(e) = parse_interval_ms(interval) {
            return Err(AppError::InvalidSelection(e.to_string()));
        }
        if capacity == 0 {
            return Err(AppError::InvalidCapacity(capacity));
        }
        Ok(Self {
            pair,
            interval: interval.to_string(),
            capacity,
        })
    }
}

#[derive(Debug, Clone)]
pub enum FeedEvent {
    Bootstrap {
        generation: u64,
        result: Result<Vec<Kline>, AppError>,
    },
    Sample {
        generation: u64,
        sample: KlineSample,
    },
    Status {
        generation: u64,
        status: WsConnectionStatus,
    },
}

impl FeedEvent {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Bootstrap { generation, .. }
            | Self::Sample { generation, .. }
            | Self::Status { generation, .. } => *generation,
        }
    }
}

pub struct FeedController {
    generation: u64,
    selection: Option<Selection>,
    buffer: Option<QuoteBuffer>,
    loading: bool,
    stream_status: WsConnectionStatus,
    last_error: Option<AppError>,
    policy: LiveBarPolicy,
}

impl FeedController {
    pub fn new(policy: LiveBarPolicy) -> Self {
        Self {
            generation: 0,
            selection: None,
            buffer: None,
            loading: false,
            stream_status: WsConnectionStatus::Disconnected,
            last_error: None,
            policy,
        }
    }

    /// Switch to `selection`, discarding the previous buffer. Returns the
    /// generation the driver must tag its bootstrap and stream with.
    pub fn select(&mut self, selection: Selection) -> Result<u64, AppError> {
        let buffer = QuoteBuffer::new(&selection.pair, &selection.interval, selection.capacity)?;
        self.generation += 1;
        tracing::info!(
            pair = %selection.pair,
            interval = %selection.interval,
            generation = self.generation,
            "Feed selection changed"
        );
        self.selection = Some(selection);
        self.buffer = Some(buffer);
        self.loading = true;
        self.stream_status = WsConnectionStatus::Disconnected;
        self.last_error = None;
        Ok(self.generation)
    }

    /// Fold one driver event into state. Returns whether anything visible changed.
    pub fn apply(&mut self, event: FeedEvent) -> bool {
        if event.generation() != self.generation || self.buffer.is_none() {
            tracing::debug!(
                event_generation = event.generation(),
                current = self.generation,
                "Dropping stale feed event"
            );
            return false;
        }

        match event {
            FeedEvent::Bootstrap { result, .. } => {
                self.loading = false;
                match result {
                    Ok(bars) => {
                        if let Some(buffer) = self.buffer.as_mut() {
                            buffer.bootstrap_bars(&bars);
                            tracing::info!(
                                pair = buffer.pair(),
                                count = buffer.len(),
                                "Sparkline bootstrapped"
                            );
                        }
                        if bars.is_empty() {
                            self.last_error =
                                Some(AppError::EmptyResult("no klines returned".to_string()));
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Sparkline bootstrap failed");
                        self.last_error = Some(e);
                    }
                }
                true
            }
            FeedEvent::Sample { sample, .. } => match self.buffer.as_mut() {
                Some(buffer) => {
                    buffer.merge_sample(&sample, self.policy);
                    true
                }
                None => false,
            },
            FeedEvent::Status { status, .. } => {
                let changed = self.stream_status != status;
                self.stream_status = status;
                changed
            }
        }
    }

    /// Tear down: nothing issued before this call can touch state afterwards.
    pub fn unmount(&mut self) {
        self.generation += 1;
        self.selection = None;
        self.buffer = None;
        self.loading = false;
        self.stream_status = WsConnectionStatus::Disconnected;
    }

    pub fn geometry(&self, dims: Dimensions) -> Result<CurveGeometry, AppError> {
        match &self.buffer {
            Some(buffer) => Ok(curve::build_for(buffer, dims)),
            None => Err(AppError::InvalidSelection(
                "no pair selected for the sparkline".to_string(),
            )),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn buffer(&self) -> Option<&QuoteBuffer> {
        self.buffer.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn stream_status(&self) -> &WsConnectionStatus {
        &self.stream_status
    }

    pub fn last_error(&self) -> Option<&AppError> {
        self.last_error.as_ref()
    }

    pub fn policy(&self) -> LiveBarPolicy {
        self.policy
    }
}
