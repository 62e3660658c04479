use std::collections::VecDeque;

use serde::Deserialize;

use crate::error::AppError;
use crate::model::kline::{Kline, KlineSample};

/// How a streamed sample for the bar already at the end of the buffer is merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveBarPolicy {
    /// Update the forming bar in place; only a new bar advances the window.
    #[default]
    ReplaceForming,
    /// Every sample advances the window, even repeats of the forming bar.
    AppendEvery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Replaced,
    Appended,
}

/// Fixed-capacity sliding window of closing prices for one pair/interval.
///
/// Values are oldest first. Once full, every append evicts the oldest.
/// The ring is kept contiguous after each mutation so [`values`](Self::values)
/// can hand out a plain slice.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteBuffer {
    pair: String,
    interval: String,
    capacity: usize,
    values: VecDeque<f64>,
    last_open_time: Option<u64>,
    revision: u64,
}

impl QuoteBuffer {
    pub fn new(pair: &str, interval: &str, capacity: usize) -> Result<Self, AppError> {
        if capacity == 0 {
            return Err(AppError::InvalidCapacity(capacity));
        }
        Ok(Self {
            pair: pair.to_string(),
            interval: interval.to_string(),
            capacity,
            // twice the window, so make_contiguous shifts at most once per `capacity` appends
            values: VecDeque::with_capacity(capacity.saturating_mul(2)),
            last_open_time: None,
            revision: 0,
        })
    }

    /// Build a buffer holding the last `capacity` entries of `closes`.
    pub fn initialize(
        pair: &str,
        interval: &str,
        closes: &[f64],
        capacity: usize,
    ) -> Result<Self, AppError> {
        let mut buffer = Self::new(pair, interval, capacity)?;
        buffer.bootstrap(closes);
        Ok(buffer)
    }

    /// Replace the whole contents with the most recent `capacity` closes.
    pub fn bootstrap(&mut self, closes: &[f64]) {
        let start = closes.len().saturating_sub(self.capacity);
        self.values.clear();
        self.values.extend(&closes[start..]);
        self.values.make_contiguous();
        self.last_open_time = None;
        self.revision += 1;
    }

    /// Same as [`bootstrap`](Self::bootstrap) but remembers the last bar's
    /// open time so streamed updates to that bar can replace it.
    pub fn bootstrap_bars(&mut self, bars: &[Kline]) {
        let closes: Vec<f64> = bars.iter().map(|k| k.close).collect();
        self.bootstrap(&closes);
        self.last_open_time = bars.last().map(|k| k.open_time);
    }

    pub fn append(&mut self, value: f64) {
        if self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
        self.values.make_contiguous();
        self.revision += 1;
    }

    pub fn merge_sample(&mut self, sample: &KlineSample, policy: LiveBarPolicy) -> MergeOutcome {
        let same_bar = self.last_open_time == Some(sample.open_time) && !self.values.is_empty();
        if policy == LiveBarPolicy::ReplaceForming && same_bar {
            if let Some(last) = self.values.back_mut() {
                *last = sample.close;
            }
            self.revision += 1;
            return MergeOutcome::Replaced;
        }
        self.append(sample.close);
        self.last_open_time = Some(sample.open_time);
        MergeOutcome::Appended
    }

    pub fn values(&self) -> &[f64] {
        let (front, back) = self.values.as_slices();
        debug_assert!(back.is_empty());
        front
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn pair(&self) -> &str {
        &self.pair
    }

    pub fn interval(&self) -> &str {
        &self.interval
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    pub fn previous(&self) -> Option<f64> {
        self.values
            .len()
            .checked_sub(2)
            .and_then(|i| self.values.get(i).copied())
    }

    pub fn last_open_time(&self) -> Option<u64> {
        self.last_open_time
    }

    /// Bumped on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
