//! Sales aggregate: recording completed sales against the catalog and the
//! append-only sales log that feeds reporting.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::aggregates::product::Catalog;
use crate::domain::value_objects::clamp_stock;
use crate::{Error, Result};

/// An immutable record of one completed sale. Never mutated or deleted.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub product_id: String,
    pub color_id: String,
    pub eu: u8,
    pub qty: u32,
    pub price: Decimal,
    pub date: DateTime<Utc>,
}

/// Parameters for recording a sale. `price` defaults to the product's
/// effective price (sale when set, else original).
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSale {
    pub product_id: String,
    pub color_id: String,
    pub eu: u8,
    #[serde(default = "one")]
    pub qty: u32,
    #[serde(default)]
    pub price: Option<Decimal>,
}

fn one() -> u32 {
    1
}

/// Record a sale: decrement the size's stock and append to the log.
///
/// Quantity is clamped to 1..=9999 before the stock check; selling more
/// than the size has on hand is an error, not a clamp.
pub fn record_sale(catalog: &mut Catalog, sales: &mut Vec<Sale>, req: RecordSale) -> Result<Sale> {
    let product = catalog
        .find_mut(&req.product_id)
        .ok_or_else(|| Error::ProductNotFound(req.product_id.clone()))?;
    let price = req.price.unwrap_or_else(|| product.pricing.effective());
    let product_id = product.id.clone();
    let color = product
        .find_color_mut(&req.color_id)
        .ok_or_else(|| Error::ColorNotFound(req.color_id.clone()))?;
    let color_id = color.id.clone();
    let qty = clamp_stock(req.qty).max(1);
    let slot = color.slot_mut(req.eu).ok_or(Error::UnknownSize(req.eu))?;
    if slot.stock < qty {
        return Err(Error::InsufficientStock { have: slot.stock, want: qty });
    }
    slot.stock -= qty;
    let sale = Sale {
        id: Uuid::new_v4().to_string(),
        product_id,
        color_id,
        eu: req.eu,
        qty,
        price,
        date: Utc::now(),
    };
    sales.push(sale.clone());
    Ok(sale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::{NewProduct, Product};
    use crate::domain::value_objects::Pricing;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::default();
        let mut p = Product::create(
            NewProduct {
                brand: "Nike".into(),
                model: "Air Max 90".into(),
                images: vec!["a.avif".into(), "b.avif".into()],
                pricing: Pricing::new(Decimal::from(4500), Decimal::from(3990), Decimal::ZERO),
                ..NewProduct::default()
            },
            &catalog,
        )
        .unwrap();
        p.add_color("White", "#ffffff");
        p.colors[0].set_stock(42, 5).unwrap();
        catalog.push(p);
        catalog
    }

    fn req(catalog: &Catalog, qty: u32) -> RecordSale {
        let p = &catalog.products[0];
        RecordSale {
            product_id: p.id.clone(),
            color_id: p.colors[0].id.clone(),
            eu: 42,
            qty,
            price: None,
        }
    }

    #[test]
    fn sale_decrements_stock_and_appends() {
        let mut catalog = catalog();
        let mut sales = Vec::new();
        let r = req(&catalog, 2);
        let sale = record_sale(&mut catalog, &mut sales, r).unwrap();
        assert_eq!(sale.qty, 2);
        assert_eq!(sale.price, Decimal::from(3990)); // sale price wins
        assert_eq!(catalog.products[0].colors[0].slot(42).unwrap().stock, 3);
        assert_eq!(sales.len(), 1);
    }

    #[test]
    fn insufficient_stock_is_an_error() {
        let mut catalog = catalog();
        let mut sales = Vec::new();
        let r = req(&catalog, 6);
        assert!(matches!(
            record_sale(&mut catalog, &mut sales, r),
            Err(Error::InsufficientStock { have: 5, want: 6 })
        ));
        assert!(sales.is_empty());
        assert_eq!(catalog.products[0].colors[0].slot(42).unwrap().stock, 5);
    }

    #[test]
    fn zero_qty_is_bumped_to_one() {
        let mut catalog = catalog();
        let mut sales = Vec::new();
        let r = req(&catalog, 0);
        let sale = record_sale(&mut catalog, &mut sales, r).unwrap();
        assert_eq!(sale.qty, 1);
    }

    #[test]
    fn explicit_price_overrides_pricing() {
        let mut catalog = catalog();
        let mut sales = Vec::new();
        let mut r = req(&catalog, 1);
        r.price = Some(Decimal::from(1000));
        let sale = record_sale(&mut catalog, &mut sales, r).unwrap();
        assert_eq!(sale.price, Decimal::from(1000));
    }

    #[test]
    fn unknown_ids_are_errors() {
        let mut catalog = catalog();
        let mut sales = Vec::new();
        let mut r = req(&catalog, 1);
        r.color_id = "nope".into();
        assert!(matches!(
            record_sale(&mut catalog, &mut sales, r),
            Err(Error::ColorNotFound(_))
        ));
        let mut r = req(&catalog, 1);
        r.product_id = "nope".into();
        assert!(matches!(
            record_sale(&mut catalog, &mut sales, r),
            Err(Error::ProductNotFound(_))
        ));
    }
}
