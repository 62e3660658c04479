pub mod dashboard;
pub mod picker;
pub mod sparkline;

use std::time::{Duration, Instant};

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::Frame;

use crate::curve::Dimensions;
use crate::debounce::Debouncer;
use crate::error::AppError;
use crate::event::{AppEvent, WsConnectionStatus};
use crate::feed::{FeedController, FeedEvent, Selection};
use crate::model::coin::{filter_coins, Coin};
use crate::model::quote_buffer::LiveBarPolicy;
use crate::suggestion::SUGGESTION_ERROR;
use crate::theme::ThemeMode;

use dashboard::{CoinCard, KeybindBar, LogPanel, StatusBar, SuggestionPanel};
use picker::CoinPicker;
use sparkline::SparklineChart;

const MAX_LOG_MESSAGES: usize = 200;

/// Static settings the screen is built with.
#[derive(Debug, Clone)]
pub struct ScreenSettings {
    pub theme: ThemeMode,
    pub interval: String,
    pub capacity: usize,
    pub dims: Dimensions,
    pub quote_asset: String,
    pub default_pair: String,
    pub live_bar_policy: LiveBarPolicy,
    pub search_debounce: Duration,
}

pub struct AppState {
    pub theme: ThemeMode,
    pub interval: String,
    pub capacity: usize,
    pub dims: Dimensions,
    pub quote_asset: String,
    pub default_pair: String,
    pub coins: Vec<Coin>,
    pub filtered_coins: Vec<Coin>,
    pub selected_coin: Option<Coin>,
    pub coins_loading: bool,
    pub picker_open: bool,
    pub search_text: String,
    pub picker_index: usize,
    search: Debouncer<String>,
    pub suggestion_loading: bool,
    pub suggestion: Option<String>,
    suggestion_request: u64,
    pub feed: FeedController,
    pub log_messages: Vec<String>,
}

impl AppState {
    pub fn new(settings: ScreenSettings) -> Self {
        Self {
            theme: settings.theme,
            interval: settings.interval,
            capacity: settings.capacity,
            dims: settings.dims,
            quote_asset: settings.quote_asset,
            default_pair: settings.default_pair,
            coins: Vec::new(),
            filtered_coins: Vec::new(),
            selected_coin: None,
            coins_loading: true,
            picker_open: false,
            search_text: String::new(),
            picker_index: 0,
            search: Debouncer::new(settings.search_debounce),
            suggestion_loading: false,
            suggestion: None,
            suggestion_request: 0,
            feed: FeedController::new(settings.live_bar_policy),
            log_messages: Vec::new(),
        }
    }

    pub fn push_log(&mut self, msg: String) {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        self.log_messages.push(format!("{} {}", stamp, msg));
        if self.log_messages.len() > MAX_LOG_MESSAGES {
            self.log_messages.remove(0);
        }
    }

    /// Pair the sparkline should follow: the selected coin's, else the default.
    pub fn desired_pair(&self) -> String {
        self.selected_coin
            .as_ref()
            .map(|c| c.pair(&self.quote_asset))
            .unwrap_or_else(|| self.default_pair.clone())
    }

    pub fn desired_selection(&self) -> Result<Selection, AppError> {
        Selection::new(&self.desired_pair(), &self.interval, self.capacity)
    }

    /// True when the running feed no longer matches what the screen shows.
    pub fn feed_out_of_date(&self) -> bool {
        match self.desired_selection() {
            Ok(want) => self.feed.selection() != Some(&want),
            Err(_) => false,
        }
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::CoinsLoaded(result) => {
                self.coins_loading = false;
                match result {
                    Ok(coins) => {
                        self.push_log(format!("Loaded {} coins", coins.len()));
                        if self.selected_coin.is_none() {
                            self.selected_coin = coins.first().cloned();
                        }
                        self.coins = coins;
                        let query = self.search_text.clone();
                        self.apply_search(&query);
                    }
                    Err(e) => {
                        self.push_log(format!("[ERR] Coin list unavailable: {}", e));
                    }
                }
            }
            AppEvent::Feed(evt) => {
                let status = match &evt {
                    FeedEvent::Status { generation, status }
                        if *generation == self.feed.generation() =>
                    {
                        Some(status.clone())
                    }
                    _ => None,
                };
                if self.feed.apply(evt) {
                    match status {
                        Some(WsConnectionStatus::Connected) => {
                            self.push_log("WebSocket Connected".to_string());
                        }
                        Some(WsConnectionStatus::Reconnecting { attempt, delay_ms }) => {
                            self.push_log(format!(
                                "[WARN] Reconnecting (attempt {}, wait {}ms)",
                                attempt, delay_ms
                            ));
                        }
                        _ => {}
                    }
                }
            }
            AppEvent::Suggestion { request_id, result } => {
                if request_id != self.suggestion_request {
                    return;
                }
                self.suggestion_loading = false;
                let text = match result {
                    Ok(text) => text,
                    Err(e) => {
                        self.push_log(format!("[ERR] Suggestion failed: {}", e));
                        SUGGESTION_ERROR.to_string()
                    }
                };
                self.suggestion = Some(text);
            }
            AppEvent::LogMessage(msg) => {
                self.push_log(msg);
            }
            AppEvent::Error(msg) => {
                self.push_log(format!("[ERR] {}", msg));
            }
        }
    }

    pub fn apply_search(&mut self, query: &str) {
        self.filtered_coins = filter_coins(&self.coins, query);
        let max = self.filtered_coins.len().saturating_sub(1);
        self.picker_index = self.picker_index.min(max);
    }

    /// Release a debounced search once it settles.
    pub fn tick(&mut self, now: Instant) {
        if let Some(query) = self.search.poll(now) {
            self.apply_search(&query);
        }
    }

    pub fn open_picker(&mut self) {
        self.picker_open = true;
        self.picker_index = self
            .selected_coin
            .as_ref()
            .and_then(|sel| self.filtered_coins.iter().position(|c| c.id == sel.id))
            .unwrap_or(0);
    }

    pub fn close_picker(&mut self) {
        self.picker_open = false;
    }

    pub fn picker_move(&mut self, delta: isize) {
        if self.filtered_coins.is_empty() {
            self.picker_index = 0;
            return;
        }
        let max = self.filtered_coins.len() - 1;
        self.picker_index = self.picker_index.saturating_add_signed(delta).min(max);
    }

    pub fn picker_input(&mut self, c: char, now: Instant) {
        self.search_text.push(c);
        self.search.push(self.search_text.clone(), now);
    }

    pub fn picker_backspace(&mut self, now: Instant) {
        if self.search_text.pop().is_some() {
            self.search.push(self.search_text.clone(), now);
        }
    }

    pub fn picker_clear(&mut self) {
        self.search_text.clear();
        self.search.cancel();
        self.apply_search("");
    }

    pub fn picker_selected(&self) -> Option<&Coin> {
        self.filtered_coins.get(self.picker_index)
    }

    pub fn is_search_pending(&self) -> bool {
        self.search.is_pending()
    }

    pub fn select_coin(&mut self, coin: Coin) {
        self.push_log(format!("Selected {} ({})", coin.name, coin.symbol.to_uppercase()));
        self.selected_coin = Some(coin);
        self.picker_open = false;
        self.picker_clear();
        self.suggestion = None;
        self.suggestion_loading = false;
        // results of an in-flight request belong to the old coin
        self.suggestion_request += 1;
    }

    /// Start a suggestion request for the selected coin. Returns the request
    /// id to tag the result with, or `None` when there is nothing selected.
    pub fn begin_suggestion(&mut self) -> Option<(u64, Coin)> {
        let Some(coin) = self.selected_coin.clone() else {
            self.push_log(format!(
                "[WARN] {}",
                AppError::InvalidSelection("no coin selected".to_string())
            ));
            return None;
        };
        self.suggestion_request += 1;
        self.suggestion_loading = true;
        self.suggestion = None;
        Some((self.suggestion_request, coin))
    }

    pub fn set_interval(&mut self, interval: &str) {
        if self.interval != interval {
            self.interval = interval.to_string();
            self.push_log(format!("Interval {}", interval));
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggle();
    }
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

pub fn render(frame: &mut Frame, state: &AppState) {
    let palette = state.theme.palette();
    frame.render_widget(
        Block::default().style(Style::default().bg(palette.container_bg)),
        frame.area(),
    );

    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // status bar
            Constraint::Length(5),  // coin card
            Constraint::Min(8),     // sparkline
            Constraint::Length(4),  // suggestion
            Constraint::Length(6),  // system log
            Constraint::Length(1),  // keybinds
        ])
        .split(frame.area());

    let pair = state
        .feed
        .selection()
        .map(|s| s.pair.clone())
        .unwrap_or_else(|| state.desired_pair());

    frame.render_widget(
        StatusBar {
            pair: &pair,
            interval: &state.interval,
            stream: state.feed.stream_status(),
            theme: state.theme,
            palette,
        },
        outer[0],
    );

    frame.render_widget(
        CoinCard::new(state.selected_coin.as_ref(), state.coins_loading, palette),
        outer[1],
    );

    let geometry = state.feed.geometry(state.dims).ok();
    let latest = state.feed.buffer().and_then(|b| b.latest());
    frame.render_widget(
        SparklineChart::new(geometry.as_ref(), state.dims, palette)
            .pair(&pair)
            .latest(latest)
            .loading(state.feed.is_loading())
            .error(state.feed.last_error().map(|e| e.to_string())),
        outer[2],
    );

    frame.render_widget(
        SuggestionPanel::new(
            state.suggestion.as_deref(),
            state.suggestion_loading,
            palette,
        ),
        outer[3],
    );

    frame.render_widget(LogPanel::new(&state.log_messages, palette), outer[4]);
    frame.render_widget(KeybindBar { palette }, outer[5]);

    if state.picker_open {
        frame.render_widget(
            CoinPicker::new(
                &state.filtered_coins,
                state.picker_index,
                &state.search_text,
                palette,
            ),
            centered(frame.area(), 70, 80),
        );
    }
}
