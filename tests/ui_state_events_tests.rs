use std::time::{Duration, Instant};

use coin_spark::curve::Dimensions;
use coin_spark::event::{AppEvent, WsConnectionStatus};
use coin_spark::feed::FeedEvent;
use coin_spark::model::coin::Coin;
use coin_spark::model::kline::Kline;
use coin_spark::model::quote_buffer::LiveBarPolicy;
use coin_spark::suggestion::SUGGESTION_ERROR;
use coin_spark::theme::ThemeMode;
use coin_spark::ui::{AppState, ScreenSettings};

fn state() -> AppState {
    AppState::new(ScreenSettings {
        theme: ThemeMode::Dark,
        interval: "1m".to_string(),
        capacity: 60,
        dims: Dimensions::new(300.0, 84.0, 6.0),
        quote_asset: "USDT".to_string(),
        default_pair: "BTCUSDT".to_string(),
        live_bar_policy: LiveBarPolicy::ReplaceForming,
        search_debounce: Duration::from_millis(240),
    })
}

fn coin(id: &str, symbol: &str, name: &str) -> Coin {
    Coin {
        id: id.to_string(),
        symbol: symbol.to_string(),
        name: name.to_string(),
        current_price: 1.0,
        image: None,
    }
}

fn loaded() -> AppState {
    let mut s = state();
    s.apply(AppEvent::CoinsLoaded(Ok(vec![
        coin("bitcoin", "btc", "Bitcoin"),
        coin("ethereum", "eth", "Ethereum"),
    ])));
    s
}

/// Mirror of the reconciliation the event loop performs.
fn sync(s: &mut AppState) -> u64 {
    let sel = s.desired_selection().unwrap();
    s.feed.select(sel).unwrap()
}

#[test]
fn default_pair_is_used_before_coins_load() {
    let s = state();
    assert!(s.coins_loading);
    assert_eq!(s.desired_pair(), "BTCUSDT");
    assert!(s.feed_out_of_date());
}

#[test]
fn first_loaded_coin_becomes_selection() {
    let s = loaded();
    assert!(!s.coins_loading);
    assert_eq!(s.selected_coin.as_ref().map(|c| c.id.as_str()), Some("bitcoin"));
    assert_eq!(s.filtered_coins.len(), 2);
}

#[test]
fn failed_coin_list_clears_loading_and_logs() {
    let mut s = state();
    s.apply(AppEvent::CoinsLoaded(Err("network failure: timeout".to_string())));
    assert!(!s.coins_loading);
    assert!(s.coins.is_empty());
    assert!(s.log_messages.iter().any(|m| m.contains("[ERR]")));
}

#[test]
fn selecting_a_coin_switches_the_feed() {
    let mut s = loaded();
    let btc = sync(&mut s);
    assert!(!s.feed_out_of_date());

    s.open_picker();
    s.picker_move(1);
    let eth = s.picker_selected().cloned().unwrap();
    s.select_coin(eth);
    assert!(!s.picker_open);
    assert_eq!(s.desired_pair(), "ETHUSDT");
    assert!(s.feed_out_of_date());

    let eth_gen = sync(&mut s);
    s.apply(AppEvent::Feed(FeedEvent::Bootstrap {
        generation: btc,
        result: Ok(vec![Kline {
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 27_000.0,
            open_time: 0,
            close_time: 59_999,
        }]),
    }));
    assert!(s.feed.buffer().unwrap().is_empty());
    assert_eq!(s.feed.generation(), eth_gen);
}

#[test]
fn interval_change_marks_feed_stale() {
    let mut s = loaded();
    sync(&mut s);
    s.set_interval("5m");
    assert!(s.feed_out_of_date());
    sync(&mut s);
    assert_eq!(s.feed.selection().unwrap().interval, "5m");
}

#[test]
fn connected_status_is_logged_once() {
    let mut s = loaded();
    let gen = sync(&mut s);
    for _ in 0..2 {
        s.apply(AppEvent::Feed(FeedEvent::Status {
            generation: gen,
            status: WsConnectionStatus::Connected,
        }));
    }
    let n = s
        .log_messages
        .iter()
        .filter(|m| m.contains("WebSocket Connected"))
        .count();
    assert_eq!(n, 1);
}

#[test]
fn search_is_applied_after_debounce() {
    let mut s = loaded();
    let t0 = Instant::now();
    s.open_picker();
    s.picker_input('e', t0);
    s.picker_input('t', t0 + Duration::from_millis(100));
    assert!(s.is_search_pending());

    s.tick(t0 + Duration::from_millis(200));
    assert_eq!(s.filtered_coins.len(), 2);

    s.tick(t0 + Duration::from_millis(340));
    assert_eq!(s.filtered_coins.len(), 1);
    assert_eq!(s.filtered_coins[0].id, "ethereum");
}

#[test]
fn clearing_search_restores_full_list() {
    let mut s = loaded();
    let t0 = Instant::now();
    s.picker_input('z', t0);
    s.tick(t0 + Duration::from_secs(1));
    assert!(s.filtered_coins.is_empty());
    assert!(s.picker_selected().is_none());

    s.picker_clear();
    assert_eq!(s.search_text, "");
    assert_eq!(s.filtered_coins.len(), 2);
}

#[test]
fn suggestion_result_is_stored() {
    let mut s = loaded();
    let (id, coin) = s.begin_suggestion().unwrap();
    assert_eq!(coin.symbol, "btc");
    assert!(s.suggestion_loading);

    s.apply(AppEvent::Suggestion {
        request_id: id,
        result: Ok("Enter: 26,900-27,100\nExit: 27,800-28,000".to_string()),
    });
    assert!(!s.suggestion_loading);
    assert!(s.suggestion.as_deref().unwrap().starts_with("Enter:"));
}

#[test]
fn failed_suggestion_shows_error_text() {
    let mut s = loaded();
    let (id, _) = s.begin_suggestion().unwrap();
    s.apply(AppEvent::Suggestion {
        request_id: id,
        result: Err("config error: GEMINI_API_KEY is not set".to_string()),
    });
    assert_eq!(s.suggestion.as_deref(), Some(SUGGESTION_ERROR));
    assert!(!s.suggestion_loading);
}

#[test]
fn suggestion_for_previous_coin_is_dropped() {
    let mut s = loaded();
    let (id, _) = s.begin_suggestion().unwrap();
    s.select_coin(coin("ethereum", "eth", "Ethereum"));
    s.apply(AppEvent::Suggestion {
        request_id: id,
        result: Ok("stale".to_string()),
    });
    assert_eq!(s.suggestion, None);
}

#[test]
fn suggestion_without_selection_is_refused() {
    let mut s = state();
    assert!(s.begin_suggestion().is_none());
    assert!(!s.suggestion_loading);
}

#[test]
fn log_is_bounded() {
    let mut s = state();
    for i in 0..250 {
        s.push_log(format!("line {}", i));
    }
    assert_eq!(s.log_messages.len(), 200);
    assert!(s.log_messages[199].ends_with("line 249"));
}

#[test]
fn theme_toggles() {
    let mut s = state();
    s.toggle_theme();
    assert_eq!(s.theme, ThemeMode::Light);
    s.toggle_theme();
    assert_eq!(s.theme, ThemeMode::Dark);
}
