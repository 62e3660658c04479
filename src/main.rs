use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEventKind};
use tokio::sync::{mpsc, watch};

use coin_spark::binance::rest::BinanceRestClient;
use coin_spark::binance::ws::BinanceWsClient;
use coin_spark::coingecko::{CoinGeckoClient, MarketQuery};
use coin_spark::config::Config;
use coin_spark::curve::Dimensions;
use coin_spark::event::AppEvent;
use coin_spark::feed::driver::FeedDriver;
use coin_spark::input::{parse_main_command, parse_picker_command, PickerCommand, UiCommand};
use coin_spark::suggestion::SuggestionClient;
use coin_spark::ui::{self, AppState, ScreenSettings};

fn spawn_coin_list(config: &Config, app_tx: &mpsc::Sender<AppEvent>) {
    let client = CoinGeckoClient::new(&config.market.coingecko_base_url);
    let query = MarketQuery {
        vs_currency: config.market.vs_currency.clone(),
        order: config.market.order.clone(),
        per_page: config.market.per_page,
        page: config.market.page,
    };
    let tx = app_tx.clone();
    tokio::spawn(async move {
        let result = client.markets(&query).await.map_err(|e| {
            tracing::warn!(error = %e, "Coin list fetch failed");
            e.to_string()
        });
        let _ = tx.send(AppEvent::CoinsLoaded(result)).await;
    });
}

fn spawn_suggestion(
    client: &Arc<SuggestionClient>,
    app_state: &mut AppState,
    app_tx: &mpsc::Sender<AppEvent>,
) {
    let Some((request_id, coin)) = app_state.begin_suggestion() else {
        return;
    };
    let client = client.clone();
    let tx = app_tx.clone();
    tokio::spawn(async move {
        let result = client.suggest(&coin).await.map_err(|e| {
            tracing::warn!(symbol = %coin.symbol, error = %e, "Suggestion request failed");
            e.to_string()
        });
        let _ = tx.send(AppEvent::Suggestion { request_id, result }).await;
    });
}

fn handle_picker_command(cmd: PickerCommand, app_state: &mut AppState) {
    let now = Instant::now();
    match cmd {
        PickerCommand::Up => app_state.picker_move(-1),
        PickerCommand::Down => app_state.picker_move(1),
        PickerCommand::Select => {
            if let Some(coin) = app_state.picker_selected().cloned() {
                app_state.select_coin(coin);
            }
        }
        PickerCommand::Close => app_state.close_picker(),
        PickerCommand::Clear => app_state.picker_clear(),
        PickerCommand::Backspace => app_state.picker_backspace(now),
        PickerCommand::Input(c) => app_state.picker_input(c, now),
    }
}

/// Returns true when the key asks to quit.
fn handle_key(
    code: KeyCode,
    app_state: &mut AppState,
    suggestion_client: &Arc<SuggestionClient>,
    app_tx: &mpsc::Sender<AppEvent>,
) -> bool {
    if app_state.picker_open {
        // q is search input while the picker is open
        if let Some(cmd) = parse_picker_command(&code) {
            handle_picker_command(cmd, app_state);
        }
        return false;
    }
    if matches!(code, KeyCode::Char('q') | KeyCode::Char('Q')) {
        return true;
    }
    match parse_main_command(&code) {
        Some(UiCommand::OpenPicker) => app_state.open_picker(),
        Some(UiCommand::NeedHelp) => spawn_suggestion(suggestion_client, app_state, app_tx),
        Some(UiCommand::ToggleTheme) => app_state.toggle_theme(),
        Some(UiCommand::SwitchInterval(interval)) => app_state.set_interval(interval),
        None => {}
    }
    false
}

/// Restart the feed when the selected pair or interval changed.
fn sync_feed(app_state: &mut AppState, driver: &mut FeedDriver) {
    if !app_state.feed_out_of_date() {
        return;
    }
    let selection = match app_state.desired_selection() {
        Ok(s) => s,
        Err(e) => {
            app_state.push_log(format!("[ERR] {}", e));
            return;
        }
    };
    match app_state.feed.select(selection.clone()) {
        Ok(generation) => {
            app_state.push_log(format!(
                "Subscribing {} @ {}",
                selection.pair, selection.interval
            ));
            driver.start(generation, &selection);
        }
        Err(e) => app_state.push_log(format!("[ERR] {}", e)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (required by rustls 0.23+)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("Failed to install rustls crypto provider");
        std::process::exit(1);
    }

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Check config/default.toml (GEMINI_API_KEY in .env is optional)");
            std::process::exit(1);
        }
    };

    // Log to file so it doesn't interfere with TUI
    let log_file = std::fs::File::create("coin-spark.log")?;
    let fallback = config.logging.level.clone();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .init();

    tracing::info!(
        pair = %config.binance.default_pair,
        rest_url = %config.binance.rest_base_url,
        ws_url = %config.binance.ws_base_url,
        "Starting coin-spark"
    );
    if config.suggestion.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set, suggestions are disabled");
    }

    let (app_tx, mut app_rx) = mpsc::channel::<AppEvent>(256);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let rest_client = Arc::new(BinanceRestClient::new(&config.binance.rest_base_url));
    let ws_client = BinanceWsClient::new(&config.binance.ws_base_url);
    let mut driver = FeedDriver::new(rest_client, ws_client, app_tx.clone());

    let suggestion_client = Arc::new(SuggestionClient::new(
        &config.suggestion.base_url,
        &config.suggestion.model,
        config.suggestion.api_key.clone(),
        config.suggestion.timeout(),
    ));

    spawn_coin_list(&config, &app_tx);

    let ctrl_c_shutdown = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Ctrl+C received");
        let _ = ctrl_c_shutdown.send(true);
    });

    let mut app_state = AppState::new(ScreenSettings {
        theme: config.ui.theme,
        interval: config.binance.kline_interval.clone(),
        capacity: config.sparkline.points,
        dims: Dimensions::new(
            config.sparkline.width,
            config.sparkline.height,
            config.sparkline.padding,
        ),
        quote_asset: config.market.quote_asset.clone(),
        default_pair: config.binance.default_pair.clone(),
        live_bar_policy: config.sparkline.live_bar_policy,
        search_debounce: config.ui.search_debounce(),
    });
    app_state.push_log("coin-spark started".to_string());
    if !suggestion_client.is_configured() {
        app_state.push_log("[WARN] GEMINI_API_KEY not set; Need Help is disabled".to_string());
    }

    let mut terminal = ratatui::init();

    loop {
        sync_feed(&mut app_state, &mut driver);

        terminal.draw(|frame| ui::render(frame, &app_state))?;

        if crossterm::event::poll(Duration::from_millis(config.ui.refresh_rate_ms))? {
            if let Event::Key(key) = crossterm::event::read()? {
                if key.kind == KeyEventKind::Press
                    && handle_key(key.code, &mut app_state, &suggestion_client, &app_tx)
                {
                    tracing::info!("User quit");
                    let _ = shutdown_tx.send(true);
                    break;
                }
            }
        }

        while let Ok(evt) = app_rx.try_recv() {
            app_state.apply(evt);
        }
        app_state.tick(Instant::now());

        if *shutdown_rx.borrow() {
            break;
        }
    }

    if let Some(feed) = driver.stop() {
        feed.finished().await;
    }
    app_state.feed.unmount();
    ratatui::restore();
    tracing::info!("Shutdown complete");
    println!("Goodbye! Check coin-spark.log for details.");
    Ok(())
}
