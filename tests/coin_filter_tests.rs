use coin_spark::model::coin::{filter_coins, format_price, Coin};

fn coin(id: &str, symbol: &str, name: &str, price: f64) -> Coin {
    Coin {
        id: id.to_string(),
        symbol: symbol.to_string(),
        name: name.to_string(),
        current_price: price,
        image: None,
    }
}

fn sample_coins() -> Vec<Coin> {
    vec![
        coin("bitcoin", "btc", "Bitcoin", 27_450.5),
        coin("ethereum", "eth", "Ethereum", 1_830.0),
        coin("tether", "usdt", "Tether", 1.0),
    ]
}

#[test]
fn filter_matches_symbol_case_insensitively() {
    let hits = filter_coins(&sample_coins(), "BT");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "bitcoin");
}

#[test]
fn filter_matches_name_substring() {
    let hits = filter_coins(&sample_coins(), "ther");
    let ids: Vec<&str> = hits.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["ethereum", "tether"]);
}

#[test]
fn blank_query_keeps_everything_in_order() {
    let coins = sample_coins();
    assert_eq!(filter_coins(&coins, ""), coins);
    assert_eq!(filter_coins(&coins, "   "), coins);
}

#[test]
fn no_match_gives_empty_list() {
    assert!(filter_coins(&sample_coins(), "doge").is_empty());
}

#[test]
fn pair_is_upper_symbol_plus_quote() {
    let c = coin("bitcoin", "btc", "Bitcoin", 1.0);
    assert_eq!(c.pair("USDT"), "BTCUSDT");
    assert_eq!(c.pair("usdt"), "BTCUSDT");
}

#[test]
fn initials_fall_back_for_blank_symbol() {
    assert_eq!(coin("x", "eth", "Ethereum", 1.0).initials(2), "ET");
    assert_eq!(coin("x", "", "Nameless", 1.0).initials(2), "?");
}

#[test]
fn prices_are_grouped_with_adaptive_decimals() {
    assert_eq!(format_price(27_450.5), "27,450.50");
    assert_eq!(format_price(1_234_567.891), "1,234,567.89");
    assert_eq!(format_price(1.0), "1.00");
    assert_eq!(format_price(0.067), "0.067");
    assert_eq!(format_price(0.0), "0");
}

#[test]
fn sub_dollar_prices_keep_six_significant_digits() {
    assert_eq!(format_price(0.000012345), "0.000012345");
    assert_eq!(format_price(0.12345678), "0.123457");
    assert_eq!(format_price(0.00001234567), "0.0000123457");
}

#[test]
fn market_record_deserializes_without_image() {
    let c: Coin = serde_json::from_str(
        r#"{"id":"ethereum","symbol":"eth","name":"Ethereum","current_price":1830.25}"#,
    )
    .unwrap();
    assert_eq!(c.image, None);
    assert_eq!(c.pair("USDT"), "ETHUSDT");
}
