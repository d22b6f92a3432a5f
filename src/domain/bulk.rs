//! Bulk operations over a selected subset of catalog products.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;

use crate::domain::aggregates::product::{Catalog, ProductStatus};
use crate::domain::value_objects::{clamp_stock, is_valid_eu};
use crate::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceField {
    Original,
    Sale,
    Cost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum PriceMethod {
    #[serde(rename = "set")]
    Set,
    #[serde(rename = "inc_pct")]
    IncreasePercent,
    #[serde(rename = "dec_pct")]
    DecreasePercent,
    #[serde(rename = "inc_num")]
    IncreaseAmount,
    #[serde(rename = "dec_num")]
    DecreaseAmount,
}

/// Which size slots a bulk restock touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "scope", rename_all = "lowercase")]
pub enum RestockScope {
    All,
    Low,
    Out,
    Size { eu: u8 },
}

/// Apply a price transform to the selected products' target field.
///
/// Each new value is computed from that product's current value, floored
/// at zero and rounded to two decimals. Returns how many products were
/// updated; unselected products are untouched.
pub fn apply_price(
    catalog: &mut Catalog,
    ids: &[String],
    field: PriceField,
    method: PriceMethod,
    value: Decimal,
) -> Result<usize> {
    if method != PriceMethod::Set && value < Decimal::ZERO {
        return Err(Error::NegativeAdjustment);
    }
    let hundred = Decimal::from(100);
    let mut touched = 0;
    for p in &mut catalog.products {
        if !ids.contains(&p.id) {
            continue;
        }
        let current = match field {
            PriceField::Original => p.pricing.original,
            PriceField::Sale => p.pricing.sale,
            PriceField::Cost => p.pricing.cost,
        };
        let next = match method {
            PriceMethod::Set => value,
            PriceMethod::IncreasePercent => current * (Decimal::ONE + value / hundred),
            PriceMethod::DecreasePercent => current * (Decimal::ONE - value / hundred),
            PriceMethod::IncreaseAmount => current + value,
            PriceMethod::DecreaseAmount => current - value,
        };
        let next = next
            .max(Decimal::ZERO)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        match field {
            PriceField::Original => p.pricing.original = next,
            PriceField::Sale => p.pricing.sale = next,
            PriceField::Cost => p.pricing.cost = next,
        }
        touched += 1;
    }
    Ok(touched)
}

/// Add `qty` units to every size slot the scope selects, clamped to the
/// storable range. Returns how many products were touched.
pub fn apply_restock(
    catalog: &mut Catalog,
    ids: &[String],
    scope: RestockScope,
    qty: u32,
    threshold: u32,
) -> Result<usize> {
    if let RestockScope::Size { eu } = scope {
        if !is_valid_eu(eu) {
            return Err(Error::UnknownSize(eu));
        }
    }
    let qty = clamp_stock(qty);
    let mut touched = 0;
    for p in &mut catalog.products {
        if !ids.contains(&p.id) {
            continue;
        }
        for c in &mut p.colors {
            for s in &mut c.sizes {
                let selected = match scope {
                    RestockScope::All => true,
                    RestockScope::Low => s.stock > 0 && s.stock <= threshold,
                    RestockScope::Out => s.stock == 0,
                    RestockScope::Size { eu } => s.eu == eu,
                };
                if selected {
                    s.stock = clamp_stock(s.stock + qty);
                }
            }
        }
        touched += 1;
    }
    Ok(touched)
}

/// Set status on the selected products. Already-matching members are
/// no-ops, applied idempotently rather than rejected.
pub fn set_status(catalog: &mut Catalog, ids: &[String], status: ProductStatus) -> usize {
    let mut touched = 0;
    for p in &mut catalog.products {
        if ids.contains(&p.id) {
            p.status = status;
            touched += 1;
        }
    }
    touched
}
