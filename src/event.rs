use crate::feed::FeedEvent;
use crate::model::coin::Coin;

#[derive(Debug, Clone, PartialEq)]
pub enum WsConnectionStatus {
    Connected,
    Disconnected,
    Reconnecting { attempt: u32, delay_ms: u64 },
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    CoinsLoaded(Result<Vec<Coin>, String>),
    Feed(FeedEvent),
    Suggestion {
        request_id: u64,
        result: Result<String, String>,
    },
    LogMessage(String),
    Error(String),
}
