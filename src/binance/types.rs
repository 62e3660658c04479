use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;
use crate::model::kline::{Kline, KlineSample};

/// Deserialize Binance string-encoded numbers to f64.
pub fn string_to_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse::<f64>().map_err(serde::de::Error::custom)
}

/// Binance kline stream event (`<symbol>@kline_<interval>`).
#[derive(Debug, Deserialize)]
pub struct KlineStreamEvent {
    #[serde(rename = "e")]
    pub event_type: String,
    #[serde(rename = "E")]
    pub event_time: u64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "k")]
    pub kline: KlinePayload,
}

#[derive(Debug, Deserialize)]
pub struct KlinePayload {
    #[serde(rename = "t")]
    pub open_time: u64,
    #[serde(rename = "T")]
    pub close_time: u64,
    #[serde(rename = "i")]
    pub interval: String,
    #[serde(rename = "o", deserialize_with = "string_to_f64")]
    pub open: f64,
    #[serde(rename = "c", deserialize_with = "string_to_f64")]
    pub close: f64,
    #[serde(rename = "h", deserialize_with = "string_to_f64")]
    pub high: f64,
    #[serde(rename = "l", deserialize_with = "string_to_f64")]
    pub low: f64,
    #[serde(rename = "x")]
    pub is_closed: bool,
}

impl KlineStreamEvent {
    pub fn into_sample(self) -> KlineSample {
        KlineSample {
            pair: self.symbol,
            interval: self.kline.interval,
            open_time: self.kline.open_time,
            close: self.kline.close,
            is_closed: self.kline.is_closed,
        }
    }
}

/// Binance API error response.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub code: i64,
    pub msg: String,
}

fn num_field(row: &[Value], idx: usize, name: &str) -> Result<f64, AppError> {
    match row.get(idx) {
        Some(Value::String(s)) => s
            .parse::<f64>()
            .map_err(|e| AppError::parse(format!("kline {} '{}': {}", name, s, e))),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| AppError::parse(format!("kline {} out of range", name))),
        other => Err(AppError::parse(format!(
            "kline {} has unexpected shape: {:?}",
            name, other
        ))),
    }
}

fn time_field(row: &[Value], idx: usize, name: &str) -> Result<u64, AppError> {
    row.get(idx)
        .and_then(Value::as_u64)
        .ok_or_else(|| AppError::parse(format!("kline {} is not a timestamp", name)))
}

/// Parse one row of `GET /api/v3/klines`:
/// `[openTime, open, high, low, close, volume, closeTime, ...]`.
pub fn parse_kline_row(row: &Value) -> Result<Kline, AppError> {
    let row = row
        .as_array()
        .ok_or_else(|| AppError::parse("kline row is not an array"))?;
    if row.len() < 7 {
        return Err(AppError::parse(format!(
            "kline row has {} fields, expected at least 7",
            row.len()
        )));
    }
    Ok(Kline {
        open_time: time_field(row, 0, "open time")?,
        open: num_field(row, 1, "open")?,
        high: num_field(row, 2, "high")?,
        low: num_field(row, 3, "low")?,
        close: num_field(row, 4, "close")?,
        close_time: time_field(row, 6, "close time")?,
    })
}

pub fn parse_klines(body: &Value) -> Result<Vec<Kline>, AppError> {
    let rows = body
        .as_array()
        .ok_or_else(|| AppError::parse("klines response is not an array"))?;
    rows.iter().map(parse_kline_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_kline_event() {
        let json = r#"{
            "e": "kline",
            "E": 1672515782136,
            "s": "BTCUSDT",
            "k": {
                "t": 1672515780000,
                "T": 1672515839999,
                "s": "BTCUSDT",
                "i": "1m",
                "f": 100,
                "L": 200,
                "o": "42000.00",
                "c": "42010.50",
                "h": "42020.00",
                "l": "41990.00",
                "v": "10.5",
                "n": 100,
                "x": false,
                "q": "441000.0",
                "V": "5.0",
                "Q": "210000.0",
                "B": "0"
            }
        }"#;
        let event: KlineStreamEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, "kline");
        let sample = event.into_sample();
        assert_eq!(sample.pair, "BTCUSDT");
        assert_eq!(sample.interval, "1m");
        assert_eq!(sample.open_time, 1672515780000);
        assert!((sample.close - 42010.50).abs() < f64::EPSILON);
        assert!(!sample.is_closed);
    }

    #[test]
    fn kline_event_missing_close_is_rejected() {
        let json = r#"{"e":"kline","E":1,"s":"BTCUSDT","k":{"t":0,"T":1,"i":"1m","o":"1","h":"1","l":"1","x":true}}"#;
        assert!(serde_json::from_str::<KlineStreamEvent>(json).is_err());
    }

    #[test]
    fn parse_rest_kline_rows() {
        let body: Value = serde_json::from_str(
            r#"[
                [1499040000000, "0.01634790", "0.80000000", "0.01575800", "0.01577100",
                 "148976.11427815", 1499644799999, "2434.19055334", 308, "1756.87402397",
                 "28.46694368", "0"],
                [1499644800000, "0.01577100", "0.02000000", "0.01500000", "0.01900000",
                 "100.0", 1500249599999, "2.0", 10, "1.0", "1.0", "0"]
            ]"#,
        )
        .unwrap();
        let klines = parse_klines(&body).unwrap();
        assert_eq!(klines.len(), 2);
        assert_eq!(klines[0].open_time, 1499040000000);
        assert!((klines[1].close - 0.019).abs() < 1e-12);
        assert_eq!(klines[1].close_time, 1500249599999);
    }

    #[test]
    fn parse_rejects_short_or_malformed_rows() {
        let short: Value = serde_json::from_str(r#"[[1, "1", "1"]]"#).unwrap();
        assert!(matches!(parse_klines(&short), Err(AppError::ParseFailure(_))));

        let bad_close: Value =
            serde_json::from_str(r#"[[1, "1", "1", "1", "abc", "1", 2]]"#).unwrap();
        assert!(matches!(
            parse_klines(&bad_close),
            Err(AppError::ParseFailure(_))
        ));

        let not_array: Value = serde_json::from_str(r#"{"code": -1121}"#).unwrap();
        assert!(parse_klines(&not_array).is_err());
    }
}
