//! Market data for the dashboard.
//!
//! `MarketSnapshot` is what the API returns and is kept as raw JSON. The
//! ticker banner, RVOL heatmap, stat cards and alert feed are presentation
//! models with a built-in demo data set.

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum relative drift applied to a ticker price per tick (±0.05%).
const MAX_TICK_DRIFT: f64 = 0.0005;

/// RVOL at which a symbol counts as surging.
const SURGE_RVOL: f64 = 2.0;

/// RVOL at which a symbol counts as elevated.
const ELEVATED_RVOL: f64 = 1.5;

/// RVOL that fills the intensity bar.
const FULL_BAR_RVOL: f64 = 3.0;

/// Symbols and tickers as returned by the market endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbols: Vec<Value>,
    pub tickers: Vec<Value>,
}

impl MarketSnapshot {
    /// Ticker quotes parsed from the snapshot, skipping entries that don't fit.
    pub fn quotes(&self) -> Vec<TickerQuote> {
        self.tickers.iter().filter_map(TickerQuote::from_value).collect()
    }
}

// ============================================================================
// Ticker banner
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TickerQuote {
    pub symbol: String,
    pub price: f64,
    /// 24h change in percent
    pub change_pct: f64,
}

impl TickerQuote {
    pub fn new(symbol: &str, price: f64, change_pct: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            price,
            change_pct,
        }
    }

    /// Parse a ticker object. Accepts `price` / `lastPrice` and
    /// `change` / `priceChangePercent`, as numbers or numeric strings.
    pub fn from_value(value: &Value) -> Option<Self> {
        let symbol = value.get("symbol")?.as_str()?.to_string();
        let price = ["price", "lastPrice"]
            .iter()
            .find_map(|k| value.get(*k).and_then(as_f64))?;
        let change_pct = ["change", "priceChangePercent"]
            .iter()
            .find_map(|k| value.get(*k).and_then(as_f64))
            .unwrap_or(0.0);
        Some(Self {
            symbol,
            price,
            change_pct,
        })
    }

    pub fn is_up(&self) -> bool {
        self.change_pct >= 0.0
    }

    /// Price with thousands separators and two decimals, e.g. `96,240.50`
    pub fn price_display(&self) -> String {
        format_thousands(self.price)
    }

    /// Signed percentage, e.g. `+2.4%` or `-1.2%`
    pub fn change_display(&self) -> String {
        format_change(self.change_pct)
    }

    /// Nudge the price by a random factor within ±0.05%.
    pub fn drift<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let factor = 1.0 + rng.gen_range(-MAX_TICK_DRIFT..MAX_TICK_DRIFT);
        self.price *= factor;
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.replace(',', "").parse().ok(),
        _ => None,
    }
}

/// Format a number with thousands separators and two decimals.
pub fn format_thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Signed percentage at two decimals. Values that round to zero print unsigned.
fn format_change(change_pct: f64) -> String {
    let rounded = (change_pct * 100.0).round() / 100.0;
    if rounded > 0.0 {
        format!("+{:.2}%", rounded)
    } else if rounded < 0.0 {
        format!("{:.2}%", rounded)
    } else {
        "0.00%".to_string()
    }
}

pub fn demo_tickers() -> Vec<TickerQuote> {
    vec![
        TickerQuote::new("BTC/USDT", 96_240.50, 2.4),
        TickerQuote::new("ETH/USDT", 2_450.12, -1.2),
        TickerQuote::new("SOL/USDT", 142.85, 5.7),
        TickerQuote::new("XRP/USDT", 1.12, 0.8),
        TickerQuote::new("ADA/USDT", 0.58, -2.1),
        TickerQuote::new("DOGE/USDT", 0.38, 12.4),
    ]
}

// ============================================================================
// RVOL heatmap
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RvolTier {
    Normal,
    Elevated,
    Surge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RvolEntry {
    pub symbol: String,
    pub rvol: f64,
    pub change_pct: f64,
    pub volume: String,
}

impl RvolEntry {
    pub fn new(symbol: &str, rvol: f64, change_pct: f64, volume: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            rvol,
            change_pct,
            volume: volume.to_string(),
        }
    }

    pub fn tier(&self) -> RvolTier {
        if self.rvol >= SURGE_RVOL {
            RvolTier::Surge
        } else if self.rvol >= ELEVATED_RVOL {
            RvolTier::Elevated
        } else {
            RvolTier::Normal
        }
    }

    /// Intensity bar fill in `0.0..=1.0`
    pub fn bar_fraction(&self) -> f64 {
        (self.rvol / FULL_BAR_RVOL).clamp(0.0, 1.0)
    }

    /// RVOL as a multiplier, e.g. `2.5x`
    pub fn rvol_display(&self) -> String {
        format!("{:.1}x", self.rvol)
    }

    pub fn change_display(&self) -> String {
        format_change(self.change_pct)
    }
}

pub fn demo_heatmap() -> Vec<RvolEntry> {
    vec![
        RvolEntry::new("BTC", 1.2, 2.4, "1.2B"),
        RvolEntry::new("ETH", 0.8, -1.2, "800M"),
        RvolEntry::new("SOL", 2.5, 5.7, "450M"),
        RvolEntry::new("XRP", 1.1, 0.8, "200M"),
        RvolEntry::new("DOGE", 3.2, 12.4, "150M"),
        RvolEntry::new("ADA", 0.7, -2.1, "100M"),
        RvolEntry::new("AVAX", 1.8, 3.2, "90M"),
        RvolEntry::new("DOT", 0.9, 1.5, "80M"),
        RvolEntry::new("LINK", 1.4, -0.5, "75M"),
        RvolEntry::new("MATIC", 1.0, 0.2, "70M"),
        RvolEntry::new("UNI", 0.6, -3.4, "65M"),
        RvolEntry::new("LTC", 1.3, 1.8, "60M"),
    ]
}

// ============================================================================
// Stat cards and alerts
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
    pub change: String,
}

impl StatCard {
    fn new(title: &'static str, value: impl Into<String>, change: impl Into<String>) -> Self {
        Self {
            title,
            value: value.into(),
            change: change.into(),
        }
    }

    pub fn is_positive(&self) -> bool {
        !self.change.starts_with('-')
    }
}

/// Overview cards. Live counts replace the demo values when available.
pub fn stat_cards(snapshot: Option<&MarketSnapshot>, heatmap: &[RvolEntry]) -> Vec<StatCard> {
    let active_symbols = snapshot
        .map(|s| s.symbols.len())
        .filter(|n| *n > 0)
        .map(format_count)
        .unwrap_or_else(|| "1,248".to_string());

    let high_rvol = heatmap.iter().filter(|e| e.tier() == RvolTier::Surge).count();

    vec![
        StatCard::new("Active Symbols", active_symbols, "+12"),
        StatCard::new("24h Volume", "$42.5B", "+8.4%"),
        StatCard::new("High RVOL", high_rvol.to_string(), "-3"),
        StatCard::new("System Health", "Optimal", "99.9%"),
    ]
}

fn format_count(n: usize) -> String {
    let formatted = format_thousands(n as f64);
    formatted
        .strip_suffix(".00")
        .map(str::to_string)
        .unwrap_or(formatted)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Surge,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertItem {
    pub symbol: String,
    pub message: String,
    pub age: String,
    pub kind: AlertKind,
}

impl AlertItem {
    fn new(symbol: &str, message: &str, age: &str, kind: AlertKind) -> Self {
        Self {
            symbol: symbol.to_string(),
            message: message.to_string(),
            age: age.to_string(),
            kind,
        }
    }
}

pub fn demo_alerts() -> Vec<AlertItem> {
    vec![
        AlertItem::new("BTC/USDT", "Volume surge detected (RVOL 2.4)", "Just now", AlertKind::Surge),
        AlertItem::new("ETH/USDT", "New 24h high reached", "2m ago", AlertKind::Info),
        AlertItem::new("SOL/USDT", "Significant bid wall at $124.50", "5m ago", AlertKind::Info),
        AlertItem::new("DOGE/USDT", "Volume surge detected (RVOL 3.1)", "12m ago", AlertKind::Surge),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(96_240.5), "96,240.50");
        assert_eq!(format_thousands(2_450.12), "2,450.12");
        assert_eq!(format_thousands(0.38), "0.38");
        assert_eq!(format_thousands(1_234_567.0), "1,234,567.00");
        assert_eq!(format_thousands(-1_000.0), "-1,000.00");
    }

    #[test]
    fn test_change_display() {
        assert_eq!(TickerQuote::new("X", 1.0, 2.4).change_display(), "+2.40%");
        assert_eq!(TickerQuote::new("X", 1.0, -1.2).change_display(), "-1.20%");
        assert_eq!(TickerQuote::new("X", 1.0, 0.0).change_display(), "0.00%");
        assert_eq!(TickerQuote::new("X", 1.0, 2.345678912).change_display(), "+2.35%");
        assert_eq!(TickerQuote::new("X", 1.0, 0.1 + 0.2).change_display(), "+0.30%");
        assert_eq!(RvolEntry::new("X", 1.0, -0.004, "1M").change_display(), "0.00%");
    }

    #[test]
    fn test_drift_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut quote = TickerQuote::new("BTC/USDT", 100_000.0, 1.0);
        for _ in 0..100 {
            let before = quote.price;
            quote.drift(&mut rng);
            let ratio = quote.price / before;
            assert!((ratio - 1.0).abs() <= MAX_TICK_DRIFT);
        }
    }

    #[test]
    fn test_quote_from_value() {
        let quote = TickerQuote::from_value(&json!({
            "symbol": "BTCUSDT",
            "lastPrice": "96,240.50",
            "priceChangePercent": "-1.5"
        }))
        .unwrap();
        assert_eq!(quote.symbol, "BTCUSDT");
        assert_eq!(quote.price, 96_240.5);
        assert_eq!(quote.change_pct, -1.5);

        assert!(TickerQuote::from_value(&json!({"symbol": "ETH"})).is_none());
        assert!(TickerQuote::from_value(&json!("BTC")).is_none());
    }

    #[test]
    fn test_snapshot_quotes_skip_unparseable() {
        let snapshot = MarketSnapshot {
            symbols: vec![],
            tickers: vec![json!({"symbol": "SOL", "price": 142.85, "change": 5.7}), json!(42)],
        };
        assert_eq!(snapshot.quotes(), vec![TickerQuote::new("SOL", 142.85, 5.7)]);
    }

    #[test]
    fn test_rvol_tiers() {
        assert_eq!(RvolEntry::new("DOGE", 3.2, 0.0, "").tier(), RvolTier::Surge);
        assert_eq!(RvolEntry::new("SOL", 2.0, 0.0, "").tier(), RvolTier::Surge);
        assert_eq!(RvolEntry::new("AVAX", 1.8, 0.0, "").tier(), RvolTier::Elevated);
        assert_eq!(RvolEntry::new("BTC", 1.2, 0.0, "").tier(), RvolTier::Normal);
    }

    #[test]
    fn test_rvol_bar_fraction_caps() {
        assert_eq!(RvolEntry::new("A", 1.5, 0.0, "").bar_fraction(), 0.5);
        assert_eq!(RvolEntry::new("B", 4.0, 0.0, "").bar_fraction(), 1.0);
        assert_eq!(RvolEntry::new("C", 2.5, 0.0, "").rvol_display(), "2.5x");
    }

    #[test]
    fn test_stat_cards_use_live_counts() {
        let snapshot = MarketSnapshot {
            symbols: vec![json!("BTC"); 1500],
            tickers: vec![],
        };
        let cards = stat_cards(Some(&snapshot), &demo_heatmap());
        assert_eq!(cards[0].value, "1,500");
        // SOL and DOGE are the surging demo symbols
        assert_eq!(cards[2].value, "2");
        assert!(!cards[2].is_positive());
    }

    #[test]
    fn test_stat_cards_fall_back_to_demo() {
        let cards = stat_cards(None, &[]);
        assert_eq!(cards[0].value, "1,248");
        assert_eq!(cards[2].value, "0");
    }
}
