//! Aggregates module
pub mod cart;
pub mod product;
pub mod sales;

pub use cart::{AddOutcome, AllowAll, Cap, Cart, CartAccess, CartLine, CartTotals};
pub use product::{Catalog, Color, NewProduct, Product, ProductFilter, ProductStatus, ProductUpdate, SizeSlot};
pub use sales::{record_sale, RecordSale, Sale};
