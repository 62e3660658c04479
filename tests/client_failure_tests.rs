use std::time::Duration;

use coin_spark::binance::rest::BinanceRestClient;
use coin_spark::coingecko::{CoinGeckoClient, MarketQuery};
use coin_spark::error::AppError;
use coin_spark::model::coin::Coin;
use coin_spark::suggestion::SuggestionClient;

// Nothing listens on the discard port locally.
const DEAD_URL: &str = "http://127.0.0.1:9";

#[test]
fn kline_fetch_against_dead_host_is_network_failure() {
    let client = BinanceRestClient::new(DEAD_URL);
    let result = tokio_test::block_on(client.get_klines("BTCUSDT", "1m", 60));
    assert!(matches!(result, Err(AppError::NetworkFailure(_))));
}

#[test]
fn market_fetch_against_dead_host_is_network_failure() {
    let client = CoinGeckoClient::new(DEAD_URL);
    let query = MarketQuery {
        vs_currency: "usd".to_string(),
        order: "market_cap_desc".to_string(),
        per_page: 100,
        page: 1,
    };
    let result = tokio_test::block_on(client.markets(&query));
    assert!(matches!(result, Err(AppError::NetworkFailure(_))));
}

#[test]
fn suggestion_without_key_is_config_error() {
    let client = SuggestionClient::new(DEAD_URL, "gemini-2.5-flash", None, Duration::from_secs(1));
    assert!(!client.is_configured());
    let btc = Coin {
        id: "bitcoin".to_string(),
        symbol: "btc".to_string(),
        name: "Bitcoin".to_string(),
        current_price: 27_450.5,
        image: None,
    };
    let result = tokio_test::block_on(client.suggest(&btc));
    assert!(matches!(result, Err(AppError::Config(_))));
}
