//! Read-only derived views over the catalog and the sales log.
//!
//! Every aggregation here is a full rescan, O(products × colors × sizes +
//! sales) per call. Fine for a single shop's volumes; past thousands of
//! sales this wants incremental maintenance.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;

use crate::domain::aggregates::product::Catalog;
use crate::domain::aggregates::sales::Sale;
use crate::domain::value_objects::StockStatus;

/// Sales window for the timeframe-scoped reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
pub enum Timeframe {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
}

impl Timeframe {
    /// Inclusive lower bound on sale timestamps; `None` means unbounded.
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::All => None,
            Self::Last7Days => Some(now - Duration::days(7)),
            Self::Last30Days => Some(now - Duration::days(30)),
        }
    }
}

fn in_window<'a>(
    sales: &'a [Sale],
    timeframe: Timeframe,
    now: DateTime<Utc>,
) -> impl Iterator<Item = &'a Sale> {
    let cutoff = timeframe.cutoff(now);
    sales
        .iter()
        .filter(move |s| cutoff.map_or(true, |c| s.date >= c))
}

/// One low- or out-of-stock (product, color, size) triple.
#[derive(Clone, Debug, Serialize)]
pub struct StockAlert {
    pub product_id: String,
    pub brand: String,
    pub model: String,
    pub color: String,
    pub eu: u8,
    pub stock: u32,
    pub status: StockStatus,
}

/// Every triple classified `low` or `out`, catalog order. This backs both
/// the low-stock report and the alerts view; the classification policy
/// itself lives on [`StockStatus`].
pub fn stock_alerts(catalog: &Catalog, threshold: u32) -> Vec<StockAlert> {
    let mut alerts = Vec::new();
    for p in &catalog.products {
        for c in &p.colors {
            for s in &c.sizes {
                let status = StockStatus::classify(s.stock, threshold);
                if status != StockStatus::In {
                    alerts.push(StockAlert {
                        product_id: p.id.clone(),
                        brand: p.brand.clone(),
                        model: p.model.clone(),
                        color: c.name.clone(),
                        eu: s.eu,
                        stock: s.stock,
                        status,
                    });
                }
            }
        }
    }
    alerts
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SizeSales {
    pub eu: u8,
    pub units: u32,
}

/// Units sold per EU size within the timeframe, best first. Ties keep the
/// order sizes first appeared in the log.
pub fn best_sizes(sales: &[Sale], timeframe: Timeframe, now: DateTime<Utc>) -> Vec<SizeSales> {
    let mut tally: Vec<SizeSales> = Vec::new();
    for sale in in_window(sales, timeframe, now) {
        match tally.iter_mut().find(|t| t.eu == sale.eu) {
            Some(t) => t.units += sale.qty,
            None => tally.push(SizeSales { eu: sale.eu, units: sale.qty }),
        }
    }
    tally.sort_by(|a, b| b.units.cmp(&a.units));
    tally
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BrandRevenue {
    pub brand: String,
    pub revenue: Decimal,
}

/// Revenue per brand within the timeframe, best first, stable ties.
/// Sales whose product has since been deleted are skipped.
pub fn best_brands(
    catalog: &Catalog,
    sales: &[Sale],
    timeframe: Timeframe,
    now: DateTime<Utc>,
) -> Vec<BrandRevenue> {
    let mut tally: Vec<BrandRevenue> = Vec::new();
    for sale in in_window(sales, timeframe, now) {
        let Some(product) = catalog.find(&sale.product_id) else {
            continue;
        };
        let amount = sale.price * Decimal::from(sale.qty);
        match tally.iter_mut().find(|t| t.brand == product.brand) {
            Some(t) => t.revenue += amount,
            None => tally.push(BrandRevenue { brand: product.brand.clone(), revenue: amount }),
        }
    }
    tally.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    tally
}

#[derive(Clone, Debug, Serialize)]
pub struct DeadStockItem {
    pub product_id: String,
    pub brand: String,
    pub model: String,
    pub color_id: String,
    pub color: String,
    pub eu: u8,
    pub stock: u32,
}

/// Triples with stock on hand that have never sold, over the whole life
/// of the log. Identity is (product, color, eu); never timeframe-scoped.
pub fn dead_stock(catalog: &Catalog, sales: &[Sale]) -> Vec<DeadStockItem> {
    let sold: HashSet<(&str, &str, u8)> = sales
        .iter()
        .map(|s| (s.product_id.as_str(), s.color_id.as_str(), s.eu))
        .collect();
    let mut dead = Vec::new();
    for p in &catalog.products {
        for c in &p.colors {
            for s in &c.sizes {
                if s.stock > 0 && !sold.contains(&(p.id.as_str(), c.id.as_str(), s.eu)) {
                    dead.push(DeadStockItem {
                        product_id: p.id.clone(),
                        brand: p.brand.clone(),
                        model: p.model.clone(),
                        color_id: c.id.clone(),
                        color: c.name.clone(),
                        eu: s.eu,
                        stock: s.stock,
                    });
                }
            }
        }
    }
    dead
}

#[derive(Clone, Debug, Serialize)]
pub struct Overview {
    pub active_products: usize,
    pub total_units: u32,
    pub revenue: Decimal,
}

/// Headline numbers: active products, units on hand, revenue in window.
pub fn overview(
    catalog: &Catalog,
    sales: &[Sale],
    timeframe: Timeframe,
    now: DateTime<Utc>,
) -> Overview {
    let revenue = in_window(sales, timeframe, now)
        .fold(Decimal::ZERO, |acc, s| acc + s.price * Decimal::from(s.qty));
    Overview {
        active_products: catalog.active_count(),
        total_units: catalog.total_units(),
        revenue,
    }
}
