use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::model::quote_buffer::LiveBarPolicy;
use crate::theme::ThemeMode;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub market: MarketConfig,
    pub binance: BinanceConfig,
    pub sparkline: SparklineConfig,
    pub suggestion: SuggestionConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    pub coingecko_base_url: String,
    pub vs_currency: String,
    pub order: String,
    pub per_page: u32,
    pub page: u32,
    pub quote_asset: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BinanceConfig {
    pub rest_base_url: String,
    pub ws_base_url: String,
    pub default_pair: String,
    pub kline_interval: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SparklineConfig {
    pub points: usize,
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    #[serde(default)]
    pub live_bar_policy: LiveBarPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_ms: u64,
    #[serde(skip)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    pub refresh_rate_ms: u64,
    pub search_debounce_ms: u64,
    #[serde(default)]
    pub theme: ThemeMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Parse a Binance kline interval string (e.g. "1s", "1m", "1h", "1d", "1w", "1M") into milliseconds.
pub fn parse_interval_ms(s: &str) -> Result<u64> {
    let split = match s.char_indices().last() {
        Some((i, _)) if i > 0 => i,
        _ => bail!("invalid interval '{}': expected format like '1m'", s),
    };

    let (num_str, suffix) = s.split_at(split);
    let n: u64 = num_str.parse().with_context(|| {
        format!(
            "invalid interval '{}': quantity must be a positive integer",
            s
        )
    })?;
    if n == 0 {
        bail!("invalid interval '{}': quantity must be > 0", s);
    }

    let unit_ms = match suffix {
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        "d" => 86_400_000,
        "w" => 7 * 86_400_000,
        "M" => 30 * 86_400_000,
        _ => bail!(
            "invalid interval '{}': unsupported suffix '{}', expected one of s/m/h/d/w/M",
            s,
            suffix
        ),
    };

    n.checked_mul(unit_ms)
        .with_context(|| format!("invalid interval '{}': value is too large", s))
}

impl SuggestionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl UiConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = Path::new("config/default.toml");
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;

        let mut config: Config =
            toml::from_str(&config_str).context("failed to parse config/default.toml")?;

        config.suggestion.api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        parse_interval_ms(&self.binance.kline_interval)
            .context("binance.kline_interval is invalid")?;
        for (name, raw) in [
            ("market.coingecko_base_url", &self.market.coingecko_base_url),
            ("binance.rest_base_url", &self.binance.rest_base_url),
            ("binance.ws_base_url", &self.binance.ws_base_url),
            ("suggestion.base_url", &self.suggestion.base_url),
        ] {
            url::Url::parse(raw).with_context(|| format!("{} is not a valid URL", name))?;
        }
        if self.sparkline.points == 0 {
            bail!("sparkline.points must be > 0");
        }
        let sp = &self.sparkline;
        if sp.width <= 2.0 * sp.padding || sp.height <= 2.0 * sp.padding || sp.padding < 0.0 {
            bail!(
                "sparkline dimensions {}x{} leave no drawing area with padding {}",
                sp.width,
                sp.height,
                sp.padding
            );
        }
        if self.market.quote_asset.trim().is_empty() {
            bail!("market.quote_asset must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_interval_valid() {
        assert_eq!(parse_interval_ms("1m").unwrap(), 60_000);
        assert_eq!(parse_interval_ms("15m").unwrap(), 900_000);
        assert_eq!(parse_interval_ms("2h").unwrap(), 7_200_000);
        assert_eq!(parse_interval_ms("1M").unwrap(), 2_592_000_000);
    }

    #[test]
    fn parse_interval_rejects_invalid_inputs() {
        assert!(parse_interval_ms("").is_err());
        assert!(parse_interval_ms("m").is_err());
        assert!(parse_interval_ms("0m").is_err());
        assert!(parse_interval_ms("1x").is_err());
        assert!(parse_interval_ms("1é").is_err());
        assert!(parse_interval_ms("é").is_err());
        assert!(parse_interval_ms("１m").is_err());
    }
}
