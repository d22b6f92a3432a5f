//! Solestock - footwear storefront and inventory service
//!
//! Self-hosted backend for a small footwear shop.
//!
//! ## Features
//! - Product catalog with color variants and per-size (EU 35–45) stock
//! - Inventory-aware shopping cart with quantity caps
//! - Sales recording and low-stock / best-seller / dead-stock reports
//! - Bulk price, restock and archive operations
//! - Whole-document JSON persistence with tolerant reads

use thiserror::Error as ThisError;

pub mod domain;
pub mod store;

// =============================================================================
// Error Types
// =============================================================================

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("product not found: {0}")]
    ProductNotFound(String),

    #[error("color not found: {0}")]
    ColorNotFound(String),

    #[error("no such EU size: {0}")]
    UnknownSize(u8),

    #[error("insufficient stock: have {have}, want {want}")]
    InsufficientStock { have: u32, want: u32 },

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("at least two images are required")]
    TooFewImages,

    #[error("original price must be positive")]
    OriginalPriceRequired,

    #[error("adjustment value must be non-negative")]
    NegativeAdjustment,

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
