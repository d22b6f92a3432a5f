//! Persistent document store.
//!
//! One `documents` table holds whole JSON documents keyed by name:
//! the inventory catalog, the sales log, the settings object and one
//! cart per storefront session. Every read fetches and deserializes the
//! full document; every write replaces it. No transactions span
//! documents, and concurrent writers are last-write-wins.
//!
//! This module is also the tolerant-read boundary: malformed persisted
//! data is normalized into neutral defaults HERE, with a warning, so the
//! domain layer can assume well-formed input everywhere else.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;
use tracing::warn;

use crate::domain::aggregates::cart::{Cart, CartLine};
use crate::domain::aggregates::product::Catalog;
use crate::domain::aggregates::sales::Sale;
use crate::domain::value_objects::Settings;
use crate::Result;

pub const DOC_INVENTORY: &str = "inventory";
pub const DOC_SALES: &str = "sales";
pub const DOC_SETTINGS: &str = "settings";

pub fn cart_key(session: &str) -> String {
    format!("cart:{session}")
}

#[derive(Clone)]
pub struct DocumentStore {
    pool: PgPool,
}

impl DocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn read(&self, key: &str) -> Result<Option<Value>> {
        let row: Option<(Value,)> =
            sqlx::query_as("SELECT value FROM documents WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|r| r.0))
    }

    async fn write(&self, key: &str, value: Value) -> Result<()> {
        sqlx::query(
            "INSERT INTO documents (key, value, updated_at) VALUES ($1, $2, NOW()) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn load_catalog(&self) -> Result<Catalog> {
        Ok(normalize_catalog(self.read(DOC_INVENTORY).await?))
    }

    pub async fn save_catalog(&self, catalog: &Catalog) -> Result<()> {
        self.write(DOC_INVENTORY, serde_json::to_value(catalog)?).await
    }

    pub async fn load_sales(&self) -> Result<Vec<Sale>> {
        Ok(normalize_sales(self.read(DOC_SALES).await?))
    }

    pub async fn save_sales(&self, sales: &[Sale]) -> Result<()> {
        self.write(DOC_SALES, serde_json::to_value(sales)?).await
    }

    pub async fn load_settings(&self) -> Result<Settings> {
        Ok(normalize_settings(self.read(DOC_SETTINGS).await?))
    }

    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.write(DOC_SETTINGS, serde_json::to_value(settings)?).await
    }

    pub async fn load_cart(&self, session: &str) -> Result<Cart> {
        Ok(normalize_cart(self.read(&cart_key(session)).await?))
    }

    pub async fn save_cart(&self, session: &str, cart: &Cart) -> Result<()> {
        self.write(&cart_key(session), serde_json::to_value(cart)?).await
    }
}

/// Catalog document: a JSON array of products. Anything else degrades to
/// an empty catalog.
pub fn normalize_catalog(raw: Option<Value>) -> Catalog {
    let Some(raw) = raw else {
        return Catalog::default();
    };
    match serde_json::from_value(raw) {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!(error = %e, "malformed inventory document, starting empty");
            Catalog::default()
        }
    }
}

/// Sales document: a JSON array of sale records, or nothing.
pub fn normalize_sales(raw: Option<Value>) -> Vec<Sale> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_value(raw) {
        Ok(sales) => sales,
        Err(e) => {
            warn!(error = %e, "malformed sales document, starting empty");
            Vec::new()
        }
    }
}

/// Settings document. Malformed input falls back to defaults; a stored
/// threshold is clamped into its valid range either way.
pub fn normalize_settings(raw: Option<Value>) -> Settings {
    let Some(raw) = raw else {
        return Settings::default();
    };
    match serde_json::from_value::<Settings>(raw) {
        Ok(s) => Settings::clamped(s.low_stock_threshold),
        Err(e) => {
            warn!(error = %e, "malformed settings document, using defaults");
            Settings::default()
        }
    }
}

/// Cart document: a JSON array of lines. A non-array degrades to an empty
/// cart; individual lines are normalized field by field (`quantity`
/// accepted for `qty`, non-numeric quantity becomes 1, non-numeric price
/// becomes 0) and non-object entries are dropped.
pub fn normalize_cart(raw: Option<Value>) -> Cart {
    let Some(raw) = raw else {
        return Cart::default();
    };
    let Value::Array(items) = raw else {
        warn!("cart document is not an array, starting empty");
        return Cart::default();
    };
    Cart { lines: items.iter().filter_map(normalize_line).collect() }
}

fn normalize_line(item: &Value) -> Option<CartLine> {
    let obj = item.as_object()?;
    let qty = obj
        .get("qty")
        .and_then(as_quantity)
        .filter(|&q| q > 0)
        .or_else(|| obj.get("quantity").and_then(as_quantity).filter(|&q| q > 0))
        .unwrap_or(1);
    Some(CartLine {
        title: coerce_string(obj.get("title")),
        brand: coerce_string(obj.get("brand")),
        size: coerce_string(obj.get("size")),
        qty,
        price: obj.get("price").map(as_price).unwrap_or(Decimal::ZERO),
        image: obj.get("image").and_then(Value::as_str).map(str::to_string),
        color: obj.get("color").and_then(Value::as_str).map(str::to_string),
        id: obj.get("id").and_then(Value::as_str).map(str::to_string),
    })
}

/// Titles, brands and sizes are strings, but sizes in particular show up
/// as bare numbers in older carts.
fn coerce_string(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn as_quantity(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .map(|q| u32::try_from(q).unwrap_or(u32::MAX)),
        _ => None,
    }
}

fn as_price(v: &Value) -> Decimal {
    match v {
        Value::Number(n) => n
            .as_f64()
            .and_then(Decimal::from_f64)
            .unwrap_or(Decimal::ZERO),
        Value::String(s) => s.trim().parse().unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_documents_become_neutral_defaults() {
        assert!(normalize_catalog(None).products.is_empty());
        assert!(normalize_sales(None).is_empty());
        assert!(normalize_cart(None).is_empty());
        assert_eq!(normalize_settings(None), Settings::default());
    }

    #[test]
    fn non_array_cart_degrades_to_empty() {
        assert!(normalize_cart(Some(json!({"oops": true}))).is_empty());
        assert!(normalize_cart(Some(json!("garbage"))).is_empty());
        assert!(normalize_cart(Some(json!(42))).is_empty());
    }

    #[test]
    fn quantity_alias_and_numeric_size_are_accepted() {
        let cart = normalize_cart(Some(json!([
            {"title": "A", "brand": "X", "size": 42, "quantity": 3, "price": 100}
        ])));
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].qty, 3);
        assert_eq!(cart.lines[0].size, "42");
        assert_eq!(cart.lines[0].price, Decimal::from(100));
    }

    #[test]
    fn qty_wins_over_quantity_unless_zero() {
        let cart = normalize_cart(Some(json!([
            {"title": "A", "brand": "X", "size": "42", "qty": 2, "quantity": 9, "price": 1},
            {"title": "B", "brand": "X", "size": "42", "qty": 0, "quantity": 4, "price": 1}
        ])));
        assert_eq!(cart.lines[0].qty, 2);
        assert_eq!(cart.lines[1].qty, 4);
    }

    #[test]
    fn malformed_price_and_qty_take_neutral_defaults() {
        let cart = normalize_cart(Some(json!([
            {"title": "A", "brand": "X", "size": "42", "qty": "lots", "price": "not-money"}
        ])));
        assert_eq!(cart.lines[0].qty, 1);
        assert_eq!(cart.lines[0].price, Decimal::ZERO);
    }

    #[test]
    fn numeric_string_price_parses() {
        let cart = normalize_cart(Some(json!([
            {"title": "A", "brand": "X", "size": "42", "qty": 1, "price": "129.50"}
        ])));
        assert_eq!(cart.lines[0].price, Decimal::new(12950, 2));
    }

    #[test]
    fn non_object_lines_are_dropped() {
        let cart = normalize_cart(Some(json!([
            "junk",
            7,
            {"title": "A", "brand": "X", "size": "42", "qty": 1, "price": 10}
        ])));
        assert_eq!(cart.lines.len(), 1);
    }

    #[test]
    fn malformed_catalog_and_sales_degrade_to_empty() {
        assert!(normalize_catalog(Some(json!({"not": "an array"}))).products.is_empty());
        assert!(normalize_sales(Some(json!("nope"))).is_empty());
    }

    #[test]
    fn settings_threshold_clamped_on_read() {
        let s = normalize_settings(Some(json!({"lowStockThreshold": 0})));
        assert_eq!(s.low_stock_threshold, 1);
        let s = normalize_settings(Some(json!({"lowStockThreshold": 12})));
        assert_eq!(s.low_stock_threshold, 12);
        let s = normalize_settings(Some(json!({"lowStockThreshold": "many"})));
        assert_eq!(s.low_stock_threshold, 3);
    }

    #[test]
    fn catalog_roundtrips_through_json() {
        use crate::domain::aggregates::product::{NewProduct, Product};
        use crate::domain::value_objects::Pricing;

        let mut catalog = Catalog::default();
        let mut p = Product::create(
            NewProduct {
                brand: "Nike".into(),
                model: "Air Max 90".into(),
                images: vec!["a.avif".into(), "b.avif".into()],
                pricing: Pricing::new(Decimal::from(4500), Decimal::ZERO, Decimal::ZERO),
                ..NewProduct::default()
            },
            &catalog,
        )
        .unwrap();
        p.add_color("White", "#ffffff");
        p.colors[0].set_stock(42, 5).unwrap();
        catalog.push(p);

        let value = serde_json::to_value(&catalog).unwrap();
        assert!(value.is_array());
        let back = normalize_catalog(Some(value));
        assert_eq!(back.products.len(), 1);
        assert_eq!(back.products[0].colors[0].slot(42).unwrap().stock, 5);
    }
}
