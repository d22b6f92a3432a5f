//! Value objects for the footwear catalog

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// EU size range carried by every color variant (inclusive).
pub const EU_MIN: u8 = 35;
pub const EU_MAX: u8 = 45;

/// Hard ceiling on any per-size stock counter.
pub const MAX_STOCK: u32 = 9999;

/// All EU sizes a color variant tracks, ascending.
pub fn eu_sizes() -> impl Iterator<Item = u8> {
    EU_MIN..=EU_MAX
}

pub fn is_valid_eu(eu: u8) -> bool {
    (EU_MIN..=EU_MAX).contains(&eu)
}

/// Clamp a stock counter into the storable range.
pub fn clamp_stock(stock: u32) -> u32 {
    stock.min(MAX_STOCK)
}

/// SKU (Stock Keeping Unit) value object.
///
/// Generated SKUs have the shape `SP-BBB-MMMM-XXXX`: a fixed prefix, a
/// 3-letter brand code, a 4-letter model code and a 4-char random tail.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sku(String);

const SKU_PREFIX: &str = "SP";

impl Sku {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Generate a SKU unique with respect to `is_taken`. On collision the
    /// base is suffixed with `-1`, `-2`, ... until it clears.
    pub fn generate(brand: &str, model: &str, is_taken: impl Fn(&str) -> bool) -> Self {
        let base = format!(
            "{}-{}-{}-{}",
            SKU_PREFIX,
            code_segment(brand, 3),
            code_segment(model, 4),
            random_segment(4)
        );
        if !is_taken(&base) {
            return Self(base);
        }
        let mut i = 1;
        loop {
            let candidate = format!("{base}-{i}");
            if !is_taken(&candidate) {
                return Self(candidate);
            }
            i += 1;
        }
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Uppercase, strip non-alphanumerics, pad short codes with `X`.
fn code_segment(raw: &str, len: usize) -> String {
    let mut s: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    while s.len() < len {
        s.push('X');
    }
    s.truncate(len);
    s
}

fn random_segment(len: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// Product pricing. Amounts are in pesos, never negative.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    #[serde(default)]
    pub original: Decimal,
    #[serde(default)]
    pub sale: Decimal,
    #[serde(default)]
    pub cost: Decimal,
}

impl Pricing {
    pub fn new(original: Decimal, sale: Decimal, cost: Decimal) -> Self {
        Self {
            original: original.max(Decimal::ZERO),
            sale: sale.max(Decimal::ZERO),
            cost: cost.max(Decimal::ZERO),
        }
    }

    /// The price a sale defaults to: sale price when set, else original.
    pub fn effective(&self) -> Decimal {
        if self.sale > Decimal::ZERO {
            self.sale
        } else {
            self.original
        }
    }
}

/// Three-way stock classification. This is the single policy used by the
/// product listing, the alerts view and every report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Out,
    Low,
    In,
}

impl StockStatus {
    pub fn classify(total: u32, threshold: u32) -> Self {
        if total == 0 {
            Self::Out
        } else if total <= threshold {
            Self::Low
        } else {
            Self::In
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Out => write!(f, "out"),
            Self::Low => write!(f, "low"),
            Self::In => write!(f, "in"),
        }
    }
}

/// Process-wide settings document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub low_stock_threshold: u32,
}

pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 3;

impl Settings {
    /// Threshold is kept in 1..=999; anything else is pulled back in.
    pub fn clamped(threshold: u32) -> Self {
        Self {
            low_stock_threshold: threshold.clamp(1, 999),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sku_segments_are_cleaned_and_padded() {
        let sku = Sku::generate("Nike", "Air Max 90", |_| false);
        let parts: Vec<&str> = sku.as_str().split('-').collect();
        assert_eq!(parts[0], "SP");
        assert_eq!(parts[1], "NIK");
        assert_eq!(parts[2], "AIRM");
        assert_eq!(parts[3].len(), 4);
        assert!(parts[3].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn sku_pads_short_codes_with_x() {
        let sku = Sku::generate("Fila", "X2", |_| false);
        let parts: Vec<&str> = sku.as_str().split('-').collect();
        assert_eq!(parts[1], "FIL");
        assert_eq!(parts[2], "X2XX");
    }

    #[test]
    fn sku_empty_inputs_become_placeholders() {
        let sku = Sku::generate("", "", |_| false);
        let parts: Vec<&str> = sku.as_str().split('-').collect();
        assert_eq!(parts[1], "XXX");
        assert_eq!(parts[2], "XXXX");
    }

    #[test]
    fn sku_collision_appends_counter() {
        // Everything without a numeric suffix is taken, as is "-1".
        let sku = Sku::generate("Nike", "Air", |candidate| {
            candidate.matches('-').count() < 4 || candidate.ends_with("-1")
        });
        assert!(sku.as_str().ends_with("-2"), "got {sku}");
    }

    #[test]
    fn stock_status_boundaries() {
        assert_eq!(StockStatus::classify(0, 3), StockStatus::Out);
        assert_eq!(StockStatus::classify(1, 3), StockStatus::Low);
        assert_eq!(StockStatus::classify(3, 3), StockStatus::Low);
        assert_eq!(StockStatus::classify(4, 3), StockStatus::In);
    }

    #[test]
    fn settings_threshold_is_clamped() {
        assert_eq!(Settings::clamped(0).low_stock_threshold, 1);
        assert_eq!(Settings::clamped(5).low_stock_threshold, 5);
        assert_eq!(Settings::clamped(5000).low_stock_threshold, 999);
    }

    #[test]
    fn effective_price_prefers_sale() {
        let p = Pricing::new(Decimal::from(100), Decimal::from(80), Decimal::ZERO);
        assert_eq!(p.effective(), Decimal::from(80));
        let p = Pricing::new(Decimal::from(100), Decimal::ZERO, Decimal::ZERO);
        assert_eq!(p.effective(), Decimal::from(100));
    }
}
