use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use serde_json::Value;

use crate::error::AppError;
use crate::model::kline::Kline;

use super::types::{parse_klines, ApiErrorResponse};

/// Binance public request weight per minute for a single IP.
const WEIGHT_LIMIT_PER_MINUTE: u64 = 6000;

pub struct BinanceRestClient {
    http: reqwest::Client,
    base_url: String,
    // Simple rate limiter: request count in current minute window
    request_count: AtomicU64,
    window_start: Mutex<Instant>,
}

impl BinanceRestClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            request_count: AtomicU64::new(0),
            window_start: Mutex::new(Instant::now()),
        }
    }

    fn check_rate_limit(&self) {
        if let Ok(mut start) = self.window_start.lock() {
            if start.elapsed().as_secs() >= 60 {
                *start = Instant::now();
                self.request_count.store(0, Ordering::Relaxed);
            }
        }
        let count = self.request_count.fetch_add(1, Ordering::Relaxed);
        if count > WEIGHT_LIMIT_PER_MINUTE * 8 / 10 {
            tracing::warn!(count, "Approaching Binance request budget (80%)");
        }
    }

    pub fn klines_url(&self) -> String {
        format!("{}/api/v3/klines", self.base_url)
    }

    /// Fetch up to `limit` most recent bars, oldest first.
    pub async fn get_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Kline>, AppError> {
        self.check_rate_limit();
        let limit = limit.clamp(1, 1000).to_string();

        let resp = self
            .http
            .get(self.klines_url())
            .query(&[
                ("symbol", symbol),
                ("interval", interval),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(AppError::network)?;

        let status = resp.status();
        let body = resp.text().await.map_err(AppError::network)?;
        if !status.is_success() {
            if let Ok(err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(AppError::NetworkFailure(format!(
                    "binance {} (code {}): {}",
                    status.as_u16(),
                    err.code,
                    err.msg
                )));
            }
            let snippet: String = body.chars().take(200).collect();
            return Err(AppError::NetworkFailure(format!(
                "binance {}: {}",
                status.as_u16(),
                snippet
            )));
        }

        let root: Value = serde_json::from_str(&body)?;
        let mut klines = parse_klines(&root)?;
        klines.sort_by_key(|k| k.open_time);
        tracing::debug!(symbol, interval, count = klines.len(), "Fetched klines");
        Ok(klines)
    }
}
