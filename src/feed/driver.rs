use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::{FeedEvent, Selection};
use crate::binance::rest::BinanceRestClient;
use crate::binance::ws::BinanceWsClient;
use crate::event::AppEvent;

struct ActiveFeed {
    generation: u64,
    stop_tx: watch::Sender<bool>,
    bootstrap: JoinHandle<()>,
    stream: JoinHandle<()>,
}

/// Workers of a feed that has been stopped. Both tasks were signalled and
/// aborted; [`finished`](Self::finished) waits for them to wind down.
pub struct StoppedFeed {
    pub generation: u64,
    bootstrap: JoinHandle<()>,
    stream: JoinHandle<()>,
}

impl StoppedFeed {
    pub async fn finished(self) {
        let _ = self.bootstrap.await;
        let _ = self.stream.await;
    }
}

/// Spawns and tears down the bootstrap/stream tasks behind a [`super::FeedController`].
pub struct FeedDriver {
    rest: Arc<BinanceRestClient>,
    ws: BinanceWsClient,
    app_tx: mpsc::Sender<AppEvent>,
    active: Option<ActiveFeed>,
}

impl FeedDriver {
    pub fn new(
        rest: Arc<BinanceRestClient>,
        ws: BinanceWsClient,
        app_tx: mpsc::Sender<AppEvent>,
    ) -> Self {
        Self {
            rest,
            ws,
            app_tx,
            active: None,
        }
    }

    /// Stop whatever runs now, then bootstrap and subscribe for `selection`.
    /// The two tasks are independent; their results may arrive in any order.
    /// Returns the feed that was replaced, if any.
    pub fn start(&mut self, generation: u64, selection: &Selection) -> Option<StoppedFeed> {
        let replaced = self.stop();

        let (stop_tx, stop_rx) = watch::channel(false);

        let rest = self.rest.clone();
        let tx = self.app_tx.clone();
        let sel = selection.clone();
        let bootstrap = tokio::spawn(async move {
            let result = rest.get_klines(&sel.pair, &sel.interval, sel.capacity).await;
            if let Err(e) = &result {
                let _ = tx
                    .send(AppEvent::LogMessage(format!(
                        "[WARN] Kline fetch failed ({}): {}",
                        sel.pair, e
                    )))
                    .await;
            }
            let _ = tx
                .send(AppEvent::Feed(FeedEvent::Bootstrap { generation, result }))
                .await;
        });

        let ws = self.ws.clone();
        let tx = self.app_tx.clone();
        let sel = selection.clone();
        let stream = tokio::spawn(async move {
            if let Err(e) = ws
                .connect_and_run(&sel.pair, &sel.interval, generation, tx.clone(), stop_rx)
                .await
            {
                tracing::warn!(pair = %sel.pair, error = %e, "Kline stream worker failed");
                let _ = tx
                    .send(AppEvent::Error(format!(
                        "Kline stream failed ({}): {}",
                        sel.pair, e
                    )))
                    .await;
            }
        });

        tracing::info!(pair = %selection.pair, interval = %selection.interval, generation, "Feed started");
        self.active = Some(ActiveFeed {
            generation,
            stop_tx,
            bootstrap,
            stream,
        });
        replaced
    }

    pub fn stop(&mut self) -> Option<StoppedFeed> {
        let active = self.active.take()?;
        let _ = active.stop_tx.send(true);
        active.bootstrap.abort();
        // abort also ends a connect that is still pending
        active.stream.abort();
        tracing::info!(generation = active.generation, "Feed stopped");
        Some(StoppedFeed {
            generation: active.generation,
            bootstrap: active.bootstrap,
            stream: active.stream,
        })
    }

    pub fn active_generation(&self) -> Option<u64> {
        self.active.as_ref().map(|a| a.generation)
    }
}

impl Drop for FeedDriver {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
