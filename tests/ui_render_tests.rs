use std::time::{Duration, Instant};

use ratatui::backend::TestBackend;
use ratatui::Terminal;

use coin_spark::curve::Dimensions;
use coin_spark::event::AppEvent;
use coin_spark::feed::FeedEvent;
use coin_spark::model::coin::Coin;
use coin_spark::model::kline::Kline;
use coin_spark::model::quote_buffer::LiveBarPolicy;
use coin_spark::theme::ThemeMode;
use coin_spark::ui::{self, AppState, ScreenSettings};

fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
    let buf = terminal.backend().buffer();
    let area = buf.area;
    let mut out = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            out.push_str(buf[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

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

fn draw(state: &AppState) -> String {
    let backend = TestBackend::new(100, 36);
    let mut terminal = Terminal::new(backend).expect("test terminal");
    terminal
        .draw(|frame| ui::render(frame, state))
        .expect("render should succeed");
    buffer_text(&terminal)
}

fn with_coins() -> AppState {
    let mut s = state();
    s.apply(AppEvent::CoinsLoaded(Ok(vec![Coin {
        id: "bitcoin".to_string(),
        symbol: "btc".to_string(),
        name: "Bitcoin".to_string(),
        current_price: 27_450.5,
        image: None,
    }])));
    s
}

#[test]
fn render_loading_card_before_coins_arrive() {
    let text = draw(&state());
    assert!(text.contains("Loading coins..."));
    assert!(text.contains("BTCUSDT"));
}

#[test]
fn render_card_for_selected_coin() {
    let text = draw(&with_coins());
    assert!(text.contains("Bitcoin"));
    assert!(text.contains("$27,450.50"));
    assert!(text.contains("BTC • Live"));
    assert!(text.contains("Press [N] for a short educational suggestion."));
}

#[test]
fn render_sparkline_after_bootstrap() {
    let mut s = with_coins();
    let sel = s.desired_selection().unwrap();
    let generation = s.feed.select(sel).unwrap();
    let bars: Vec<Kline> = (0..30u64)
        .map(|i| {
            let close = 27_000.0 + (i as f64 * 0.7).sin() * 150.0;
            Kline {
                open: close,
                high: close,
                low: close,
                close,
                open_time: i * 60_000,
                close_time: i * 60_000 + 59_999,
            }
        })
        .collect();
    let latest = bars[29].close;
    s.apply(AppEvent::Feed(FeedEvent::Bootstrap {
        generation,
        result: Ok(bars),
    }));

    let text = draw(&s);
    assert!(!text.contains("loading..."));
    assert!(text.contains(&coin_spark::model::coin::format_price(latest)));
    // braille cells come from the canvas
    assert!(text.chars().any(|c| ('\u{2801}'..='\u{28FF}').contains(&c)));
}

#[test]
fn render_picker_with_no_matches() {
    let mut s = with_coins();
    s.open_picker();
    let t0 = Instant::now();
    s.picker_input('z', t0);
    s.tick(t0 + Duration::from_secs(1));

    let text = draw(&s);
    assert!(text.contains("Select coin"));
    assert!(text.contains("No coins found"));
}

#[test]
fn render_light_theme_label() {
    let mut s = state();
    s.toggle_theme();
    let text = draw(&s);
    assert!(text.contains(ThemeMode::Light.label()));
}
