//! Cart aggregate: what the current customer intends to buy, capped by
//! live inventory.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::product::{Catalog, Product};

/// Below this many units in stock, a cart may hold only one unit.
pub const CRITICAL_STOCK: u32 = 6;

/// Flat packaging charge per every two units in the cart, in pesos.
pub const PACKAGING_FEE_PER_PAIR: u32 = 50;

/// One entry in the cart document. Lines are deduplicated by the
/// `(title, brand, size)` identity key, not by product id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CartLine {
    pub title: String,
    pub brand: String,
    pub size: String,
    #[serde(default = "default_qty", alias = "quantity")]
    pub qty: u32,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

fn default_qty() -> u32 {
    1
}

impl CartLine {
    /// Identity-key equality used for deduplication.
    pub fn same_line(&self, other: &CartLine) -> bool {
        self.title == other.title && self.brand == other.brand && self.size == other.size
    }
}

/// Maximum quantity of one line a single cart may hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cap {
    Unlimited,
    AtMost(u32),
}

impl Cap {
    pub fn is_out(self) -> bool {
        self == Cap::AtMost(0)
    }
}

/// Outcome of an add-to-cart attempt. Business rejections are values,
/// never errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AddOutcome {
    Added,
    OutOfStock,
    MaxReached { cap: u32 },
}

/// Authorization capability for cart mutation, injected at the service
/// boundary so the engine itself stays presentation-free.
pub trait CartAccess: Send + Sync {
    fn can_modify(&self, session: &str) -> bool;
}

/// Default gate: every session may mutate its own cart.
pub struct AllowAll;

impl CartAccess for AllowAll {
    fn can_modify(&self, _session: &str) -> bool {
        true
    }
}

/// Totals derived from the cart lines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub packaging: Decimal,
    pub total: Decimal,
}

/// The cart document: an ordered list of lines, most recently added first.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Add a line, honoring the inventory-derived cap.
    ///
    /// A duplicate-identity line merges quantities; when the merged
    /// quantity would exceed the cap, the existing line is clamped to
    /// exactly the cap. A new line whose requested quantity exceeds the
    /// cap is truncated silently and still added, at the front.
    pub fn add(&mut self, mut line: CartLine, catalog: &Catalog) -> AddOutcome {
        let cap = max_allowed(&line, catalog);
        if cap.is_out() {
            return AddOutcome::OutOfStock;
        }
        let incoming = line.qty.max(1);
        if let Some(existing) = self.lines.iter_mut().find(|l| l.same_line(&line)) {
            let merged = existing.qty.max(1) + incoming;
            return match cap {
                Cap::AtMost(n) if merged > n => {
                    existing.qty = n;
                    AddOutcome::MaxReached { cap: n }
                }
                _ => {
                    existing.qty = merged;
                    AddOutcome::Added
                }
            };
        }
        line.qty = match cap {
            Cap::AtMost(n) if incoming > n => n,
            _ => incoming,
        };
        self.lines.insert(0, line);
        AddOutcome::Added
    }

    /// Remove the line at `index`; out-of-range indices are ignored.
    pub fn remove_line(&mut self, index: usize) {
        if index < self.lines.len() {
            self.lines.remove(index);
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total_units(&self) -> u32 {
        self.lines.iter().map(|l| l.qty).sum()
    }

    /// Every two units incur one flat packaging charge; an odd remainder
    /// incurs nothing.
    pub fn packaging_fee(&self) -> Decimal {
        let pairs = self.total_units() / 2;
        Decimal::from(pairs * PACKAGING_FEE_PER_PAIR)
    }

    pub fn totals(&self) -> CartTotals {
        let subtotal = self
            .lines
            .iter()
            .fold(Decimal::ZERO, |acc, l| acc + l.price * Decimal::from(l.qty));
        let packaging = self.packaging_fee();
        CartTotals { subtotal, packaging, total: subtotal + packaging }
    }
}

/// Resolve the inventory product backing a cart line. First match wins:
/// id, exact trimmed display name, case-insensitive substring, then
/// case-insensitive brand.
pub fn resolve_inventory<'a>(catalog: &'a Catalog, line: &CartLine) -> Option<&'a Product> {
    if let Some(id) = &line.id {
        if let Some(p) = catalog.products.iter().find(|p| &p.id == id) {
            return Some(p);
        }
    }
    let title = line.title.trim();
    if let Some(p) = catalog
        .products
        .iter()
        .find(|p| p.display_name().trim() == title)
    {
        return Some(p);
    }
    if !title.is_empty() {
        let lowered = title.to_lowercase();
        if let Some(p) = catalog
            .products
            .iter()
            .find(|p| p.display_name().to_lowercase().contains(&lowered))
        {
            return Some(p);
        }
    }
    let brand = line.brand.trim();
    if !brand.is_empty() {
        let lowered = brand.to_lowercase();
        if let Some(p) = catalog
            .products
            .iter()
            .find(|p| p.brand.to_lowercase() == lowered)
        {
            return Some(p);
        }
    }
    None
}

/// Inventory-derived cap for a line.
///
/// A product with no inventory record is uncapped (the storefront does
/// not seed inventory for every visitor). With inventory present: zero
/// stock forbids the add, fewer than [`CRITICAL_STOCK`] units allow one
/// per customer, and otherwise the full available stock is the cap.
pub fn max_allowed(line: &CartLine, catalog: &Catalog) -> Cap {
    let Some(product) = resolve_inventory(catalog, line) else {
        return Cap::Unlimited;
    };
    let stock = line_stock(product, line);
    if stock == 0 {
        Cap::AtMost(0)
    } else if stock < CRITICAL_STOCK {
        Cap::AtMost(1)
    } else {
        Cap::AtMost(stock)
    }
}

/// Stock backing a line's size: scoped to the named color variant when it
/// resolves, otherwise summed across colors. An unparseable size counts
/// as zero.
fn line_stock(product: &Product, line: &CartLine) -> u32 {
    let Ok(eu) = line.size.trim().parse::<u8>() else {
        return 0;
    };
    if let Some(name) = &line.color {
        if let Some(color) = product.find_color_by_name(name) {
            return color.slot(eu).map(|s| s.stock).unwrap_or(0);
        }
    }
    product.size_stock(eu)
}
