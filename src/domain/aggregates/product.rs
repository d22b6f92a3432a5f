//! Product aggregate: the inventory catalog of footwear products, their
//! color variants and per-size stock counters.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{clamp_stock, eu_sizes, Pricing, Sku, StockStatus};
use crate::{Error, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Archived,
}

/// One EU size of one color variant. `stock` is the sole authoritative
/// inventory count; nothing else reserves or shadows it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SizeSlot {
    pub eu: u8,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub sku: String,
}

/// A color variant. `sizes` always carries the full EU 35–45 range.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Color {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub sizes: Vec<SizeSlot>,
}

impl Color {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            code: code.into(),
            sizes: eu_sizes()
                .map(|eu| SizeSlot { eu, stock: 0, sku: String::new() })
                .collect(),
        }
    }

    pub fn total_stock(&self) -> u32 {
        self.sizes.iter().map(|s| s.stock).sum()
    }

    /// EU sizes with stock on hand, ascending.
    pub fn available_sizes(&self) -> Vec<u8> {
        let mut sizes: Vec<u8> = self
            .sizes
            .iter()
            .filter(|s| s.stock > 0)
            .map(|s| s.eu)
            .collect();
        sizes.sort_unstable();
        sizes
    }

    pub fn slot(&self, eu: u8) -> Option<&SizeSlot> {
        self.sizes.iter().find(|s| s.eu == eu)
    }

    pub fn slot_mut(&mut self, eu: u8) -> Option<&mut SizeSlot> {
        self.sizes.iter_mut().find(|s| s.eu == eu)
    }

    pub fn set_stock(&mut self, eu: u8, stock: u32) -> Result<()> {
        let slot = self.slot_mut(eu).ok_or(Error::UnknownSize(eu))?;
        slot.stock = clamp_stock(stock);
        Ok(())
    }

    pub fn fill_all(&mut self, stock: u32) {
        let stock = clamp_stock(stock);
        for slot in &mut self.sizes {
            slot.stock = stock;
        }
    }

    pub fn clear_all(&mut self) {
        for slot in &mut self.sizes {
            slot.stock = 0;
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub brand: String,
    pub model: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub sku: Sku,
    #[serde(default)]
    pub pricing: Pricing,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub colors: Vec<Color>,
}

/// Fields supplied when creating a product.
#[derive(Clone, Debug, Default)]
pub struct NewProduct {
    pub brand: String,
    pub model: String,
    pub category: String,
    pub status: ProductStatus,
    pub images: Vec<String>,
    pub pricing: Pricing,
    pub description: String,
}

/// Fields supplied when editing a product. Colors are edited separately.
#[derive(Clone, Debug)]
pub struct ProductUpdate {
    pub brand: String,
    pub model: String,
    pub category: String,
    pub status: ProductStatus,
    pub images: Vec<String>,
    pub pricing: Pricing,
    pub description: String,
}

impl Product {
    /// Create a product with a freshly generated, catalog-unique SKU.
    ///
    /// Invariants enforced here: brand and model present, at least two
    /// images, positive original price.
    pub fn create(draft: NewProduct, catalog: &Catalog) -> Result<Self> {
        if draft.brand.trim().is_empty() {
            return Err(Error::MissingField("brand"));
        }
        if draft.model.trim().is_empty() {
            return Err(Error::MissingField("model"));
        }
        if draft.images.len() < 2 {
            return Err(Error::TooFewImages);
        }
        if draft.pricing.original <= rust_decimal::Decimal::ZERO {
            return Err(Error::OriginalPriceRequired);
        }
        let sku = Sku::generate(&draft.brand, &draft.model, |c| catalog.is_sku_taken(c));
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            brand: draft.brand,
            model: draft.model,
            category: draft.category,
            status: draft.status,
            sku,
            pricing: Pricing::new(draft.pricing.original, draft.pricing.sale, draft.pricing.cost),
            description: draft.description,
            images: draft.images,
            colors: Vec::new(),
        })
    }

    /// Display name the storefront shows, also used for cart matching.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }

    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }

    /// Total stock across all colors and sizes. Derived, never stored.
    pub fn total_stock(&self) -> u32 {
        self.colors.iter().map(Color::total_stock).sum()
    }

    /// Stock for one EU size summed across colors.
    pub fn size_stock(&self, eu: u8) -> u32 {
        self.colors
            .iter()
            .filter_map(|c| c.slot(eu))
            .map(|s| s.stock)
            .sum()
    }

    pub fn find_color_mut(&mut self, color_id: &str) -> Option<&mut Color> {
        self.colors.iter_mut().find(|c| c.id == color_id)
    }

    pub fn find_color_by_name(&self, name: &str) -> Option<&Color> {
        let wanted = name.trim().to_lowercase();
        self.colors
            .iter()
            .find(|c| c.name.trim().to_lowercase() == wanted)
    }

    pub fn add_color(&mut self, name: impl Into<String>, code: impl Into<String>) -> &Color {
        self.colors.push(Color::new(name, code));
        self.colors.last().expect("color just pushed")
    }

    pub fn rename_color(
        &mut self,
        color_id: &str,
        name: Option<String>,
        code: Option<String>,
    ) -> Result<()> {
        let color = self
            .find_color_mut(color_id)
            .ok_or_else(|| Error::ColorNotFound(color_id.to_string()))?;
        if let Some(name) = name {
            let name = name.trim().to_string();
            if !name.is_empty() {
                color.name = name;
            }
        }
        if let Some(code) = code {
            if !code.is_empty() {
                color.code = code;
            }
        }
        Ok(())
    }

    pub fn remove_color(&mut self, color_id: &str) -> Result<()> {
        let before = self.colors.len();
        self.colors.retain(|c| c.id != color_id);
        if self.colors.len() == before {
            return Err(Error::ColorNotFound(color_id.to_string()));
        }
        Ok(())
    }

    pub fn set_stock(&mut self, color_id: &str, eu: u8, stock: u32) -> Result<()> {
        let color = self
            .find_color_mut(color_id)
            .ok_or_else(|| Error::ColorNotFound(color_id.to_string()))?;
        color.set_stock(eu, stock)
    }
}

/// Catalog filter, mirroring the admin listing controls. All criteria are
/// conjunctive; `None` means "don't care".
#[derive(Clone, Debug, Default)]
pub struct ProductFilter {
    pub text: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub size: Option<u8>,
    pub stock: Option<StockStatus>,
    pub status: Option<ProductStatus>,
}

impl ProductFilter {
    pub fn matches(&self, p: &Product, threshold: u32) -> bool {
        if let Some(text) = &self.text {
            let text = text.to_lowercase();
            if !text.is_empty() {
                let haystack =
                    format!("{} {} {}", p.brand, p.model, p.category).to_lowercase();
                let in_colors = p
                    .colors
                    .iter()
                    .any(|c| c.name.to_lowercase().contains(&text));
                if !haystack.contains(&text) && !in_colors {
                    return false;
                }
            }
        }
        if let Some(brand) = &self.brand {
            if &p.brand != brand {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &p.category != category {
                return false;
            }
        }
        if let Some(eu) = self.size {
            // The size must exist on some color; when filtering for "out"
            // a zero-stock slot still counts as a match.
            let exists = p.colors.iter().any(|c| {
                c.slot(eu)
                    .map(|s| self.stock == Some(StockStatus::Out) || s.stock > 0)
                    .unwrap_or(false)
            });
            if !exists {
                return false;
            }
        }
        if let Some(wanted) = self.stock {
            // Size-scoped total when a size filter is active.
            let total = match self.size {
                Some(eu) => p.size_stock(eu),
                None => p.total_stock(),
            };
            if StockStatus::classify(total, threshold) != wanted {
                return false;
            }
        }
        if let Some(status) = self.status {
            if p.status != status {
                return false;
            }
        }
        true
    }
}

/// The whole product catalog, persisted as one JSON array document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub products: Vec<Product>,
}

impl Catalog {
    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id == id)
    }

    pub fn is_sku_taken(&self, sku: &str) -> bool {
        self.products.iter().any(|p| p.sku.as_str() == sku)
    }

    pub fn push(&mut self, product: Product) {
        self.products.push(product);
    }

    pub fn remove(&mut self, id: &str) -> Result<()> {
        let before = self.products.len();
        self.products.retain(|p| p.id != id);
        if self.products.len() == before {
            return Err(Error::ProductNotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn update_product(&mut self, id: &str, update: ProductUpdate) -> Result<()> {
        let needs_sku = self
            .find(id)
            .ok_or_else(|| Error::ProductNotFound(id.to_string()))?
            .sku
            .is_empty();
        // Existing SKUs are kept; only a product that lost its SKU gets a
        // fresh one.
        let sku = if needs_sku {
            Some(Sku::generate(&update.brand, &update.model, |c| self.is_sku_taken(c)))
        } else {
            None
        };
        let p = self.find_mut(id).expect("presence checked above");
        p.brand = update.brand;
        p.model = update.model;
        p.category = update.category;
        p.status = update.status;
        p.pricing = Pricing::new(update.pricing.original, update.pricing.sale, update.pricing.cost);
        p.description = update.description;
        p.images = update.images;
        if let Some(sku) = sku {
            p.sku = sku;
        }
        Ok(())
    }

    /// Distinct brands, sorted, for the filter dropdown.
    pub fn brands(&self) -> Vec<String> {
        let mut brands: Vec<String> = self.products.iter().map(|p| p.brand.clone()).collect();
        brands.sort();
        brands.dedup();
        brands
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        let mut cats: Vec<String> = self.products.iter().map(|p| p.category.clone()).collect();
        cats.sort();
        cats.dedup();
        cats
    }

    pub fn active_count(&self) -> usize {
        self.products.iter().filter(|p| p.is_active()).count()
    }

    pub fn total_units(&self) -> u32 {
        self.products.iter().map(Product::total_stock).sum()
    }

    pub fn filter<'a>(&'a self, filter: &ProductFilter, threshold: u32) -> Vec<&'a Product> {
        self.products
            .iter()
            .filter(|p| filter.matches(p, threshold))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn draft(brand: &str, model: &str) -> NewProduct {
        NewProduct {
            brand: brand.to_string(),
            model: model.to_string(),
            category: "Sneakers".to_string(),
            images: vec!["a.avif".to_string(), "b.avif".to_string()],
            pricing: Pricing::new(Decimal::from(4500), Decimal::ZERO, Decimal::ZERO),
            ..NewProduct::default()
        }
    }

    fn product(brand: &str, model: &str) -> Product {
        Product::create(draft(brand, model), &Catalog::default()).unwrap()
    }

    #[test]
    fn create_rejects_missing_fields() {
        let catalog = Catalog::default();
        let mut s = draft("", "Air Max 90");
        assert!(matches!(
            Product::create(s.clone(), &catalog),
            Err(Error::MissingField("brand"))
        ));
        s.brand = "Nike".into();
        s.model = "  ".into();
        assert!(matches!(
            Product::create(s, &catalog),
            Err(Error::MissingField("model"))
        ));
    }

    #[test]
    fn create_requires_two_images_and_positive_price() {
        let catalog = Catalog::default();
        let mut s = draft("Nike", "Air Max 90");
        s.images = vec!["only.avif".to_string()];
        assert!(matches!(Product::create(s, &catalog), Err(Error::TooFewImages)));

        let mut s = draft("Nike", "Air Max 90");
        s.pricing = Pricing::default();
        assert!(matches!(
            Product::create(s, &catalog),
            Err(Error::OriginalPriceRequired)
        ));
    }

    #[test]
    fn create_generates_unique_sku() {
        let mut catalog = Catalog::default();
        for _ in 0..5 {
            let p = Product::create(draft("Nike", "Air Max 90"), &catalog).unwrap();
            assert!(!catalog.is_sku_taken(p.sku.as_str()));
            catalog.push(p);
        }
        let skus: std::collections::HashSet<_> =
            catalog.products.iter().map(|p| p.sku.as_str()).collect();
        assert_eq!(skus.len(), 5);
    }

    #[test]
    fn color_carries_full_size_run() {
        let c = Color::new("White", "#ffffff");
        assert_eq!(c.sizes.len(), 11);
        assert_eq!(c.sizes.first().unwrap().eu, 35);
        assert_eq!(c.sizes.last().unwrap().eu, 45);
        assert_eq!(c.total_stock(), 0);
    }

    #[test]
    fn available_sizes_ascending_with_stock_only() {
        let mut c = Color::new("Black", "#000000");
        c.set_stock(42, 3).unwrap();
        c.set_stock(37, 1).unwrap();
        c.set_stock(40, 0).unwrap();
        assert_eq!(c.available_sizes(), vec![37, 42]);
    }

    #[test]
    fn set_stock_clamps_and_validates_size() {
        let mut c = Color::new("Red", "#ff0000");
        c.set_stock(38, 50_000).unwrap();
        assert_eq!(c.slot(38).unwrap().stock, 9999);
        assert!(matches!(c.set_stock(50, 1), Err(Error::UnknownSize(50))));
    }

    #[test]
    fn fill_and_clear_cover_every_size() {
        let mut c = Color::new("White", "#ffffff");
        c.fill_all(20_000); // clamped
        assert!(c.sizes.iter().all(|s| s.stock == 9999));
        c.fill_all(7);
        assert_eq!(c.total_stock(), 7 * 11);
        c.clear_all();
        assert_eq!(c.total_stock(), 0);
    }

    #[test]
    fn total_stock_sums_colors_and_sizes() {
        let mut p = product("Nike", "Air Max 90");
        p.add_color("White", "#ffffff");
        p.add_color("Black", "#000000");
        p.colors[0].set_stock(40, 2).unwrap();
        p.colors[1].set_stock(40, 3).unwrap();
        p.colors[1].set_stock(41, 5).unwrap();
        assert_eq!(p.total_stock(), 10);
        assert_eq!(p.size_stock(40), 5);
        assert_eq!(p.size_stock(41), 5);
        assert_eq!(p.size_stock(39), 0);
    }

    #[test]
    fn update_keeps_existing_sku() {
        let mut catalog = Catalog::default();
        let p = product("Nike", "Air Max 90");
        let id = p.id.clone();
        let old_sku = p.sku.clone();
        catalog.push(p);
        catalog
            .update_product(
                &id,
                ProductUpdate {
                    brand: "Nike".into(),
                    model: "Air Max 95".into(),
                    category: "Sneakers".into(),
                    status: ProductStatus::Active,
                    images: vec!["a.avif".into(), "b.avif".into()],
                    pricing: Pricing::new(Decimal::from(5000), Decimal::ZERO, Decimal::ZERO),
                    description: String::new(),
                },
            )
            .unwrap();
        let p = catalog.find(&id).unwrap();
        assert_eq!(p.model, "Air Max 95");
        assert_eq!(p.sku, old_sku);
    }

    #[test]
    fn filter_by_text_matches_color_names() {
        let mut p = product("Nike", "Air Max 90");
        p.add_color("Solar Red", "#ff3b3b");
        let catalog = Catalog { products: vec![p] };
        let filter = ProductFilter { text: Some("solar".into()), ..Default::default() };
        assert_eq!(catalog.filter(&filter, 3).len(), 1);
        let filter = ProductFilter { text: Some("ultraboost".into()), ..Default::default() };
        assert!(catalog.filter(&filter, 3).is_empty());
    }

    #[test]
    fn filter_size_scopes_the_stock_total() {
        // Size 40 has 2 units (low at threshold 3), the product overall
        // has 12 (in stock).
        let mut p = product("Nike", "Air Max 90");
        p.add_color("White", "#ffffff");
        p.colors[0].set_stock(40, 2).unwrap();
        p.colors[0].set_stock(41, 10).unwrap();
        let catalog = Catalog { products: vec![p] };

        let whole = ProductFilter { stock: Some(StockStatus::In), ..Default::default() };
        assert_eq!(catalog.filter(&whole, 3).len(), 1);

        let sized = ProductFilter {
            size: Some(40),
            stock: Some(StockStatus::Low),
            ..Default::default()
        };
        assert_eq!(catalog.filter(&sized, 3).len(), 1);

        let sized_out = ProductFilter {
            size: Some(39),
            stock: Some(StockStatus::Out),
            ..Default::default()
        };
        assert_eq!(catalog.filter(&sized_out, 3).len(), 1);
    }

    #[test]
    fn brands_and_categories_are_distinct_sorted() {
        let catalog = Catalog {
            products: vec![
                product("Nike", "Air Max 90"),
                product("Adidas", "Ultraboost 22"),
                product("Nike", "Dunk Low"),
            ],
        };
        assert_eq!(catalog.brands(), vec!["Adidas".to_string(), "Nike".to_string()]);
        assert_eq!(catalog.categories(), vec!["Sneakers".to_string()]);
    }
}
