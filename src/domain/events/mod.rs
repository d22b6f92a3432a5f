//! Domain change events.
//!
//! Published after document writes as advisory notifications so other
//! open views can refresh. They never serialize writes; concurrent
//! writers remain last-write-wins.

use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    Catalog(CatalogEvent),
    Cart(CartEvent),
    Sales(SalesEvent),
    Settings(SettingsEvent),
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogEvent {
    ProductCreated { product_id: String, sku: String },
    ProductUpdated { product_id: String },
    ProductDeleted { product_id: String },
    VariantsChanged { product_id: String },
    BulkApplied { products: usize },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CartEvent {
    Changed { session: String },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SalesEvent {
    Recorded { sale_id: String, product_id: String },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SettingsEvent {
    Updated,
}

impl DomainEvent {
    /// NATS subject the event is published on.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Catalog(_) => "solestock.catalog",
            Self::Cart(_) => "solestock.cart",
            Self::Sales(_) => "solestock.sales",
            Self::Settings(_) => "solestock.settings",
        }
    }
}
