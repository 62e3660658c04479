use serde_json::Value;

use crate::error::AppError;
use crate::model::coin::Coin;

#[derive(Debug, Clone, PartialEq)]
pub struct MarketQuery {
    pub vs_currency: String,
    pub order: String,
    pub per_page: u32,
    pub page: u32,
}

pub struct CoinGeckoClient {
    http: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn markets_url(&self) -> String {
        format!("{}/coins/markets", self.base_url)
    }

    /// `GET /coins/markets`, one page of the market-cap ranking.
    pub async fn markets(&self, query: &MarketQuery) -> Result<Vec<Coin>, AppError> {
        let per_page = query.per_page.to_string();
        let page = query.page.to_string();
        let resp = self
            .http
            .get(self.markets_url())
            .query(&[
                ("vs_currency", query.vs_currency.as_str()),
                ("order", query.order.as_str()),
                ("per_page", per_page.as_str()),
                ("page", page.as_str()),
                ("sparkline", "false"),
            ])
            .send()
            .await
            .map_err(AppError::network)?;

        let status = resp.status();
        let body = resp.text().await.map_err(AppError::network)?;
        if !status.is_success() {
            let snippet: String = body.chars().take(200).collect();
            return Err(AppError::NetworkFailure(format!(
                "coingecko {}: {}",
                status.as_u16(),
                snippet
            )));
        }

        let root: Value = serde_json::from_str(&body)?;
        parse_markets(root)
    }
}

/// Validate a markets response. Records that do not fit [`Coin`] are skipped.
pub fn parse_markets(root: Value) -> Result<Vec<Coin>, AppError> {
    let Value::Array(rows) = root else {
        return Err(AppError::parse("markets response is not an array"));
    };

    let total = rows.len();
    let mut coins = Vec::with_capacity(total);
    for row in rows {
        match serde_json::from_value::<Coin>(row) {
            Ok(coin) => coins.push(coin),
            Err(e) => tracing::warn!(error = %e, "Skipping malformed market record"),
        }
    }

    if coins.is_empty() {
        return Err(AppError::EmptyResult(format!(
            "no usable coins in {} market records",
            total
        )));
    }
    Ok(coins)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_markets_keeps_valid_records() {
        let root: Value = serde_json::from_str(
            r#"[
                {"id":"bitcoin","symbol":"btc","name":"Bitcoin","current_price":27450.5,
                 "image":"https://example.invalid/btc.png","market_cap":1},
                {"id":"broken","symbol":"brk","name":"Broken","current_price":null},
                {"id":"ethereum","symbol":"eth","name":"Ethereum","current_price":1830}
            ]"#,
        )
        .unwrap();
        let coins = parse_markets(root).unwrap();
        assert_eq!(coins.len(), 2);
        assert_eq!(coins[0].id, "bitcoin");
        assert_eq!(coins[1].image, None);
        assert!((coins[1].current_price - 1830.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_markets_errors() {
        let obj: Value = serde_json::from_str(r#"{"status":{"error_code":429}}"#).unwrap();
        assert!(matches!(parse_markets(obj), Err(AppError::ParseFailure(_))));

        let empty: Value = serde_json::from_str("[]").unwrap();
        assert!(matches!(parse_markets(empty), Err(AppError::EmptyResult(_))));
    }
}
