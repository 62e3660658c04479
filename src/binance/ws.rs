use futures_util::StreamExt;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite;

use super::types::KlineStreamEvent;
use crate::error::AppError;
use crate::event::{AppEvent, WsConnectionStatus};
use crate::feed::FeedEvent;
use crate::model::kline::KlineSample;

/// Exponential backoff for reconnection.
pub struct ExponentialBackoff {
    current: Duration,
    initial: Duration,
    max: Duration,
    factor: f64,
}

impl ExponentialBackoff {
    pub fn new(initial: Duration, max: Duration, factor: f64) -> Self {
        Self {
            current: initial,
            initial,
            max,
            factor,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = Duration::from_secs_f64(
            (self.current.as_secs_f64() * self.factor).min(self.max.as_secs_f64()),
        );
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Stream name for a pair's kline feed, e.g. `btcusdt@kline_1m`.
pub fn stream_name(pair: &str, interval: &str) -> String {
    format!("{}@kline_{}", pair.to_ascii_lowercase(), interval)
}

/// Queue a sample, waiting for room in the channel.
/// Returns `false` once the receiver is gone or shutdown is requested.
async fn forward_sample(
    app_tx: &mpsc::Sender<AppEvent>,
    shutdown: &mut watch::Receiver<bool>,
    generation: u64,
    sample: KlineSample,
) -> bool {
    let evt = AppEvent::Feed(FeedEvent::Sample { generation, sample });
    tokio::select! {
        sent = app_tx.send(evt) => sent.is_ok(),
        _ = shutdown.changed() => false,
    }
}

#[derive(Clone)]
pub struct BinanceWsClient {
    ws_base_url: String,
}

impl BinanceWsClient {
    pub fn new(ws_base_url: &str) -> Self {
        Self {
            ws_base_url: ws_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn stream_url(&self, pair: &str, interval: &str) -> Result<url::Url, AppError> {
        let raw = format!("{}/{}", self.ws_base_url, stream_name(pair, interval));
        url::Url::parse(&raw).map_err(|e| AppError::InvalidSelection(format!("{}: {}", raw, e)))
    }

    /// Connect and run the kline stream with automatic reconnection until
    /// `shutdown` flips. Every event is tagged with `generation`.
    pub async fn connect_and_run(
        &self,
        pair: &str,
        interval: &str,
        generation: u64,
        app_tx: mpsc::Sender<AppEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), AppError> {
        let url = self.stream_url(pair, interval)?;
        let mut backoff = ExponentialBackoff::new(
            Duration::from_secs(1),
            Duration::from_secs(60),
            2.0,
        );
        let mut attempt: u32 = 0;
        let status = |status: WsConnectionStatus| {
            AppEvent::Feed(FeedEvent::Status { generation, status })
        };

        loop {
            if *shutdown.borrow() {
                break;
            }
            attempt += 1;
            match self
                .connect_once(&url, generation, &app_tx, &mut shutdown, &mut backoff)
                .await
            {
                Ok(()) => {
                    // Clean shutdown requested
                    let _ = app_tx.send(status(WsConnectionStatus::Disconnected)).await;
                    break;
                }
                Err(e) => {
                    tracing::warn!(pair, interval, attempt, error = %e, "Kline stream dropped");
                    let _ = app_tx.send(status(WsConnectionStatus::Disconnected)).await;
                    let _ = app_tx
                        .send(AppEvent::LogMessage(format!("WS error ({}): {}", pair, e)))
                        .await;

                    let delay = backoff.next_delay();
                    let _ = app_tx
                        .send(status(WsConnectionStatus::Reconnecting {
                            attempt,
                            delay_ms: delay.as_millis() as u64,
                        }))
                        .await;

                    tokio::select! {
                        _ = tokio::time::sleep(delay) => continue,
                        _ = shutdown.changed() => break,
                    }
                }
            }
        }
        Ok(())
    }

    async fn connect_once(
        &self,
        url: &url::Url,
        generation: u64,
        app_tx: &mpsc::Sender<AppEvent>,
        shutdown: &mut watch::Receiver<bool>,
        backoff: &mut ExponentialBackoff,
    ) -> Result<(), AppError> {
        tracing::info!(url = %url, generation, "Connecting kline stream");

        let (ws_stream, _resp) = tokio::select! {
            res = tokio_tungstenite::connect_async(url.as_str()) => {
                res.map_err(|e| AppError::network(format!("WebSocket connect failed: {}", e)))?
            }
            _ = shutdown.changed() => return Ok(()),
        };

        // Send Connected AFTER successful connection
        backoff.reset();
        let _ = app_tx
            .send(AppEvent::Feed(FeedEvent::Status {
                generation,
                status: WsConnectionStatus::Connected,
            }))
            .await;

        let (_write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(tungstenite::Message::Text(text))) => {
                            match serde_json::from_str::<KlineStreamEvent>(&text) {
                                Ok(event) => {
                                    let sample = event.into_sample();
                                    if !forward_sample(app_tx, shutdown, generation, sample).await {
                                        return Ok(());
                                    }
                                }
                                Err(e) => {
                                    tracing::debug!(error = %e, "Failed to parse kline message");
                                }
                            }
                        }
                        Some(Ok(tungstenite::Message::Ping(_))) => {
                            // tokio-tungstenite handles pong automatically
                        }
                        Some(Ok(tungstenite::Message::Close(_))) => {
                            return Err(AppError::network("WebSocket closed by server"));
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            return Err(AppError::network(format!("WebSocket read error: {}", e)));
                        }
                        None => {
                            return Err(AppError::network("WebSocket stream ended"));
                        }
                    }
                }
                _ = shutdown.changed() => {
                    return Ok(());
                }
            }
        }
    }
}
