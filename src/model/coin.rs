use serde::Deserialize;

/// Market snapshot record for one coin.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Coin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    #[serde(default)]
    pub image: Option<String>,
}

impl Coin {
    /// Binance pair for this coin against `quote_asset`, e.g. `BTCUSDT`.
    pub fn pair(&self, quote_asset: &str) -> String {
        format!(
            "{}{}",
            self.symbol.trim().to_ascii_uppercase(),
            quote_asset.trim().to_ascii_uppercase()
        )
    }

    /// Fallback logo text when no image is available.
    pub fn initials(&self, n: usize) -> String {
        let s: String = self.symbol.trim().chars().take(n).collect();
        if s.is_empty() {
            "?".to_string()
        } else {
            s.to_uppercase()
        }
    }

    pub fn matches(&self, query_lower: &str) -> bool {
        self.symbol.to_lowercase().contains(query_lower)
            || self.name.to_lowercase().contains(query_lower)
    }
}

/// Case-insensitive substring search on symbol or name. Blank query keeps everything.
pub fn filter_coins(coins: &[Coin], query: &str) -> Vec<Coin> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return coins.to_vec();
    }
    coins.iter().filter(|c| c.matches(&q)).cloned().collect()
}

/// Display price with thousands separators.
pub fn format_price(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let abs = value.abs();
    let decimals = if abs >= 1.0 || abs == 0.0 {
        2
    } else {
        // six significant digits for sub-dollar prices
        let lead = (-abs.log10()).floor() as usize;
        (lead + 6).min(12)
    };
    let raw = format!("{:.*}", decimals, abs);
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    match frac_part {
        Some(f) if abs < 1.0 => {
            let f = f.trim_end_matches('0');
            if f.is_empty() {
                format!("{}{}", sign, grouped)
            } else {
                format!("{}{}.{}", sign, grouped, f)
            }
        }
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(symbol: &str) -> Coin {
        Coin {
            id: symbol.to_string(),
            symbol: symbol.to_string(),
            name: String::new(),
            current_price: 1.0,
            image: None,
        }
    }

    #[test]
    fn initials_fallback() {
        assert_eq!(coin("doge").initials(3), "DOG");
        assert_eq!(coin("").initials(3), "?");
    }

    #[test]
    fn format_price_groups_thousands() {
        assert_eq!(format_price(27450.0), "27,450.00");
        assert_eq!(format_price(1234567.891), "1,234,567.89");
        assert_eq!(format_price(0.067), "0.067");
        assert_eq!(format_price(0.0), "0");
    }
}
