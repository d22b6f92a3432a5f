//! Solestock - footwear storefront and inventory service

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use validator::Validate;

use solestock::domain::aggregates::cart::{AddOutcome, AllowAll, Cart, CartAccess, CartLine};
use solestock::domain::aggregates::product::{
    Color, NewProduct, Product, ProductFilter, ProductStatus, ProductUpdate,
};
use solestock::domain::aggregates::sales::{record_sale, RecordSale, Sale};
use solestock::domain::bulk::{self, PriceField, PriceMethod, RestockScope};
use solestock::domain::events::{CartEvent, CatalogEvent, DomainEvent, SalesEvent, SettingsEvent};
use solestock::domain::reports::{self, Timeframe};
use solestock::domain::value_objects::{clamp_stock, eu_sizes, Pricing, Settings, StockStatus};
use solestock::store::DocumentStore;
use solestock::Error;

#[derive(Clone)]
pub struct AppState {
    pub store: DocumentStore,
    pub nats: Option<async_nats::Client>,
    pub cart_gate: Arc<dyn CartAccess>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    let db = PgPoolOptions::new().max_connections(10).connect(&std::env::var("DATABASE_URL")?).await?;
    sqlx::migrate!("./migrations").run(&db).await?;
    let nats = match std::env::var("NATS_URL") {
        Ok(url) => async_nats::connect(&url).await.ok(),
        Err(_) => None,
    };
    let state = AppState { store: DocumentStore::new(db), nats, cart_gate: Arc::new(AllowAll) };

    let app = Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "solestock"})) }))
        .route("/api/v1/products", get(list_products).post(create_product))
        .route("/api/v1/products/facets", get(product_facets))
        .route("/api/v1/products/bulk/price", post(bulk_price))
        .route("/api/v1/products/bulk/restock", post(bulk_restock))
        .route("/api/v1/products/bulk/archive", post(bulk_archive))
        .route("/api/v1/products/bulk/unarchive", post(bulk_unarchive))
        .route("/api/v1/products/:id", get(get_product).put(update_product).delete(delete_product))
        .route("/api/v1/products/:id/colors", post(add_color))
        .route("/api/v1/products/:id/colors/:color_id", put(update_color).delete(delete_color))
        .route("/api/v1/products/:id/colors/:color_id/sizes", put(fill_color_stock).delete(clear_color_stock))
        .route("/api/v1/products/:id/colors/:color_id/sizes/:eu", put(set_stock))
        .route("/api/v1/sales", get(list_sales).post(create_sale))
        .route("/api/v1/reports/overview", get(report_overview))
        .route("/api/v1/reports/low-stock", get(report_low_stock))
        .route("/api/v1/reports/best-sizes", get(report_best_sizes))
        .route("/api/v1/reports/best-brands", get(report_best_brands))
        .route("/api/v1/reports/dead-stock", get(report_dead_stock))
        .route("/api/v1/settings", get(get_settings).put(update_settings))
        .route("/api/v1/cart/:session", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route("/api/v1/cart/:session/items/:index", axum::routing::delete(remove_cart_line))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8084".to_string());
    tracing::info!("🚀 Solestock listening on 0.0.0.0:{}", port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, app).await?;
    Ok(())
}

type ApiError = (StatusCode, String);

fn api_err(e: Error) -> ApiError {
    let code = match &e {
        Error::ProductNotFound(_) | Error::ColorNotFound(_) | Error::UnknownSize(_) => StatusCode::NOT_FOUND,
        Error::InsufficientStock { .. }
        | Error::MissingField(_)
        | Error::TooFewImages
        | Error::OriginalPriceRequired
        | Error::NegativeAdjustment => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Storage(_) | Error::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (code, e.to_string())
}

fn invalid(e: validator::ValidationErrors) -> ApiError {
    (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
}

/// Advisory change notification; failures are logged and swallowed.
async fn publish(state: &AppState, event: DomainEvent) {
    let Some(nats) = &state.nats else { return };
    let payload = match serde_json::to_vec(&event) {
        Ok(p) => p,
        Err(_) => return,
    };
    if let Err(e) = nats.publish(event.subject().to_string(), payload.into()).await {
        tracing::warn!("failed to publish change event: {e}");
    }
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub q: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub size: Option<u8>,
    pub stock: Option<StockStatus>,
    pub status: Option<ProductStatus>,
}

async fn list_products(State(s): State<AppState>, Query(p): Query<ListProductsQuery>) -> Result<Json<Vec<Product>>, ApiError> {
    let catalog = s.store.load_catalog().await.map_err(api_err)?;
    let settings = s.store.load_settings().await.map_err(api_err)?;
    let filter = ProductFilter {
        text: p.q,
        brand: p.brand,
        category: p.category,
        size: p.size,
        stock: p.stock,
        status: p.status,
    };
    let products = catalog
        .filter(&filter, settings.low_stock_threshold)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(products))
}

async fn product_facets(State(s): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let catalog = s.store.load_catalog().await.map_err(api_err)?;
    Ok(Json(serde_json::json!({
        "brands": catalog.brands(),
        "categories": catalog.categories(),
        "sizes": eu_sizes().collect::<Vec<u8>>(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct PricingRequest {
    pub original: Decimal,
    #[serde(default)]
    pub sale: Decimal,
    #[serde(default)]
    pub cost: Decimal,
}

#[derive(Debug, Deserialize, serde::Serialize)]
pub struct SizeStockRequest { pub eu: u8, pub stock: u32 }

#[derive(Debug, Deserialize, serde::Serialize, Validate)]
pub struct ColorRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub code: Option<String>,
    #[serde(default)]
    pub sizes: Vec<SizeStockRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1))]
    pub brand: String,
    #[validate(length(min = 1))]
    pub model: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub status: ProductStatus,
    #[validate(length(min = 2))]
    pub images: Vec<String>,
    pub pricing: PricingRequest,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1))]
    pub colors: Vec<ColorRequest>,
}

fn build_color(r: &ColorRequest) -> Color {
    let mut color = Color::new(r.name.trim(), r.code.as_deref().unwrap_or("#ffffff"));
    for s in &r.sizes {
        // Sizes outside the EU 35-45 run are ignored, as in the grid UI.
        if let Some(slot) = color.slot_mut(s.eu) {
            slot.stock = clamp_stock(s.stock);
        }
    }
    color
}

async fn create_product(State(s): State<AppState>, Json(r): Json<CreateProductRequest>) -> Result<(StatusCode, Json<Product>), ApiError> {
    r.validate().map_err(invalid)?;
    let mut catalog = s.store.load_catalog().await.map_err(api_err)?;
    let mut product = Product::create(
        NewProduct {
            brand: r.brand.trim().to_string(),
            model: r.model.trim().to_string(),
            category: r.category.trim().to_string(),
            status: r.status,
            images: r.images,
            pricing: Pricing::new(r.pricing.original, r.pricing.sale, r.pricing.cost),
            description: r.description.trim().to_string(),
        },
        &catalog,
    )
    .map_err(api_err)?;
    product.colors = r.colors.iter().map(build_color).collect();
    let out = product.clone();
    catalog.push(product);
    s.store.save_catalog(&catalog).await.map_err(api_err)?;
    publish(&s, DomainEvent::Catalog(CatalogEvent::ProductCreated {
        product_id: out.id.clone(),
        sku: out.sku.to_string(),
    }))
    .await;
    Ok((StatusCode::CREATED, Json(out)))
}

async fn get_product(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>, ApiError> {
    let catalog = s.store.load_catalog().await.map_err(api_err)?;
    catalog
        .find(&id)
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Not found".to_string()))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1))]
    pub brand: String,
    #[validate(length(min = 1))]
    pub model: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub status: ProductStatus,
    #[validate(length(min = 2))]
    pub images: Vec<String>,
    pub pricing: PricingRequest,
    #[serde(default)]
    pub description: String,
}

async fn update_product(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<UpdateProductRequest>) -> Result<Json<Product>, ApiError> {
    r.validate().map_err(invalid)?;
    let mut catalog = s.store.load_catalog().await.map_err(api_err)?;
    catalog
        .update_product(&id, ProductUpdate {
            brand: r.brand.trim().to_string(),
            model: r.model.trim().to_string(),
            category: r.category.trim().to_string(),
            status: r.status,
            images: r.images,
            pricing: Pricing::new(r.pricing.original, r.pricing.sale, r.pricing.cost),
            description: r.description.trim().to_string(),
        })
        .map_err(api_err)?;
    let out = catalog.find(&id).cloned().expect("updated product exists");
    s.store.save_catalog(&catalog).await.map_err(api_err)?;
    publish(&s, DomainEvent::Catalog(CatalogEvent::ProductUpdated { product_id: id })).await;
    Ok(Json(out))
}

async fn delete_product(State(s): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let mut catalog = s.store.load_catalog().await.map_err(api_err)?;
    catalog.remove(&id).map_err(api_err)?;
    s.store.save_catalog(&catalog).await.map_err(api_err)?;
    publish(&s, DomainEvent::Catalog(CatalogEvent::ProductDeleted { product_id: id })).await;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Color variants
// =============================================================================

async fn add_color(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<ColorRequest>) -> Result<(StatusCode, Json<Color>), ApiError> {
    r.validate().map_err(invalid)?;
    let mut catalog = s.store.load_catalog().await.map_err(api_err)?;
    let product = catalog.find_mut(&id).ok_or_else(|| api_err(Error::ProductNotFound(id.clone())))?;
    product.colors.push(build_color(&r));
    let out = product.colors.last().cloned().expect("color just pushed");
    s.store.save_catalog(&catalog).await.map_err(api_err)?;
    publish(&s, DomainEvent::Catalog(CatalogEvent::VariantsChanged { product_id: id })).await;
    Ok((StatusCode::CREATED, Json(out)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateColorRequest { pub name: Option<String>, pub code: Option<String> }

async fn update_color(State(s): State<AppState>, Path((id, color_id)): Path<(String, String)>, Json(r): Json<UpdateColorRequest>) -> Result<StatusCode, ApiError> {
    let mut catalog = s.store.load_catalog().await.map_err(api_err)?;
    let product = catalog.find_mut(&id).ok_or_else(|| api_err(Error::ProductNotFound(id.clone())))?;
    product.rename_color(&color_id, r.name, r.code).map_err(api_err)?;
    s.store.save_catalog(&catalog).await.map_err(api_err)?;
    publish(&s, DomainEvent::Catalog(CatalogEvent::VariantsChanged { product_id: id })).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_color(State(s): State<AppState>, Path((id, color_id)): Path<(String, String)>) -> Result<StatusCode, ApiError> {
    let mut catalog = s.store.load_catalog().await.map_err(api_err)?;
    let product = catalog.find_mut(&id).ok_or_else(|| api_err(Error::ProductNotFound(id.clone())))?;
    product.remove_color(&color_id).map_err(api_err)?;
    s.store.save_catalog(&catalog).await.map_err(api_err)?;
    publish(&s, DomainEvent::Catalog(CatalogEvent::VariantsChanged { product_id: id })).await;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct SetStockRequest { pub stock: u32 }

async fn set_stock(State(s): State<AppState>, Path((id, color_id, eu)): Path<(String, String, u8)>, Json(r): Json<SetStockRequest>) -> Result<StatusCode, ApiError> {
    let mut catalog = s.store.load_catalog().await.map_err(api_err)?;
    let product = catalog.find_mut(&id).ok_or_else(|| api_err(Error::ProductNotFound(id.clone())))?;
    product.set_stock(&color_id, eu, r.stock).map_err(api_err)?;
    s.store.save_catalog(&catalog).await.map_err(api_err)?;
    publish(&s, DomainEvent::Catalog(CatalogEvent::VariantsChanged { product_id: id })).await;
    Ok(StatusCode::NO_CONTENT)
}

/// Set every size of the color to the same stock level ("fill all").
async fn fill_color_stock(State(s): State<AppState>, Path((id, color_id)): Path<(String, String)>, Json(r): Json<SetStockRequest>) -> Result<StatusCode, ApiError> {
    let mut catalog = s.store.load_catalog().await.map_err(api_err)?;
    let product = catalog.find_mut(&id).ok_or_else(|| api_err(Error::ProductNotFound(id.clone())))?;
    let color = product.find_color_mut(&color_id).ok_or_else(|| api_err(Error::ColorNotFound(color_id.clone())))?;
    color.fill_all(r.stock);
    s.store.save_catalog(&catalog).await.map_err(api_err)?;
    publish(&s, DomainEvent::Catalog(CatalogEvent::VariantsChanged { product_id: id })).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_color_stock(State(s): State<AppState>, Path((id, color_id)): Path<(String, String)>) -> Result<StatusCode, ApiError> {
    let mut catalog = s.store.load_catalog().await.map_err(api_err)?;
    let product = catalog.find_mut(&id).ok_or_else(|| api_err(Error::ProductNotFound(id.clone())))?;
    let color = product.find_color_mut(&color_id).ok_or_else(|| api_err(Error::ColorNotFound(color_id.clone())))?;
    color.clear_all();
    s.store.save_catalog(&catalog).await.map_err(api_err)?;
    publish(&s, DomainEvent::Catalog(CatalogEvent::VariantsChanged { product_id: id })).await;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Bulk operations
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct BulkPriceRequest {
    pub ids: Vec<String>,
    pub field: PriceField,
    pub method: PriceMethod,
    pub value: Decimal,
}

async fn bulk_price(State(s): State<AppState>, Json(r): Json<BulkPriceRequest>) -> Result<Json<serde_json::Value>, ApiError> {
    let mut catalog = s.store.load_catalog().await.map_err(api_err)?;
    let updated = bulk::apply_price(&mut catalog, &r.ids, r.field, r.method, r.value).map_err(api_err)?;
    s.store.save_catalog(&catalog).await.map_err(api_err)?;
    publish(&s, DomainEvent::Catalog(CatalogEvent::BulkApplied { products: updated })).await;
    Ok(Json(serde_json::json!({"updated": updated})))
}

#[derive(Debug, Deserialize)]
pub struct BulkRestockRequest {
    pub ids: Vec<String>,
    #[serde(flatten)]
    pub scope: RestockScope,
    pub qty: u32,
}

async fn bulk_restock(State(s): State<AppState>, Json(r): Json<BulkRestockRequest>) -> Result<Json<serde_json::Value>, ApiError> {
    let mut catalog = s.store.load_catalog().await.map_err(api_err)?;
    let settings = s.store.load_settings().await.map_err(api_err)?;
    let updated = bulk::apply_restock(&mut catalog, &r.ids, r.scope, r.qty, settings.low_stock_threshold).map_err(api_err)?;
    s.store.save_catalog(&catalog).await.map_err(api_err)?;
    publish(&s, DomainEvent::Catalog(CatalogEvent::BulkApplied { products: updated })).await;
    Ok(Json(serde_json::json!({"updated": updated})))
}

#[derive(Debug, Deserialize)]
pub struct BulkStatusRequest { pub ids: Vec<String> }

async fn bulk_set_status(s: AppState, ids: Vec<String>, status: ProductStatus) -> Result<Json<serde_json::Value>, ApiError> {
    let mut catalog = s.store.load_catalog().await.map_err(api_err)?;
    let updated = bulk::set_status(&mut catalog, &ids, status);
    s.store.save_catalog(&catalog).await.map_err(api_err)?;
    publish(&s, DomainEvent::Catalog(CatalogEvent::BulkApplied { products: updated })).await;
    Ok(Json(serde_json::json!({"updated": updated})))
}

async fn bulk_archive(State(s): State<AppState>, Json(r): Json<BulkStatusRequest>) -> Result<Json<serde_json::Value>, ApiError> {
    bulk_set_status(s, r.ids, ProductStatus::Archived).await
}

async fn bulk_unarchive(State(s): State<AppState>, Json(r): Json<BulkStatusRequest>) -> Result<Json<serde_json::Value>, ApiError> {
    bulk_set_status(s, r.ids, ProductStatus::Active).await
}

// =============================================================================
// Sales
// =============================================================================

async fn list_sales(State(s): State<AppState>) -> Result<Json<Vec<Sale>>, ApiError> {
    let sales = s.store.load_sales().await.map_err(api_err)?;
    // Newest first for display.
    Ok(Json(sales.into_iter().rev().collect()))
}

async fn create_sale(State(s): State<AppState>, Json(r): Json<RecordSale>) -> Result<(StatusCode, Json<Sale>), ApiError> {
    let mut catalog = s.store.load_catalog().await.map_err(api_err)?;
    let mut sales = s.store.load_sales().await.map_err(api_err)?;
    let sale = record_sale(&mut catalog, &mut sales, r).map_err(api_err)?;
    s.store.save_catalog(&catalog).await.map_err(api_err)?;
    s.store.save_sales(&sales).await.map_err(api_err)?;
    publish(&s, DomainEvent::Sales(SalesEvent::Recorded {
        sale_id: sale.id.clone(),
        product_id: sale.product_id.clone(),
    }))
    .await;
    Ok((StatusCode::CREATED, Json(sale)))
}

// =============================================================================
// Reports
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub timeframe: Timeframe,
}

async fn report_overview(State(s): State<AppState>, Query(q): Query<ReportQuery>) -> Result<Json<reports::Overview>, ApiError> {
    let catalog = s.store.load_catalog().await.map_err(api_err)?;
    let sales = s.store.load_sales().await.map_err(api_err)?;
    Ok(Json(reports::overview(&catalog, &sales, q.timeframe, Utc::now())))
}

async fn report_low_stock(State(s): State<AppState>) -> Result<Json<Vec<reports::StockAlert>>, ApiError> {
    let catalog = s.store.load_catalog().await.map_err(api_err)?;
    let settings = s.store.load_settings().await.map_err(api_err)?;
    Ok(Json(reports::stock_alerts(&catalog, settings.low_stock_threshold)))
}

async fn report_best_sizes(State(s): State<AppState>, Query(q): Query<ReportQuery>) -> Result<Json<Vec<reports::SizeSales>>, ApiError> {
    let sales = s.store.load_sales().await.map_err(api_err)?;
    Ok(Json(reports::best_sizes(&sales, q.timeframe, Utc::now())))
}

async fn report_best_brands(State(s): State<AppState>, Query(q): Query<ReportQuery>) -> Result<Json<Vec<reports::BrandRevenue>>, ApiError> {
    let catalog = s.store.load_catalog().await.map_err(api_err)?;
    let sales = s.store.load_sales().await.map_err(api_err)?;
    Ok(Json(reports::best_brands(&catalog, &sales, q.timeframe, Utc::now())))
}

async fn report_dead_stock(State(s): State<AppState>) -> Result<Json<Vec<reports::DeadStockItem>>, ApiError> {
    let catalog = s.store.load_catalog().await.map_err(api_err)?;
    let sales = s.store.load_sales().await.map_err(api_err)?;
    Ok(Json(reports::dead_stock(&catalog, &sales)))
}

// =============================================================================
// Settings
// =============================================================================

async fn get_settings(State(s): State<AppState>) -> Result<Json<Settings>, ApiError> {
    Ok(Json(s.store.load_settings().await.map_err(api_err)?))
}

async fn update_settings(State(s): State<AppState>, Json(r): Json<Settings>) -> Result<Json<Settings>, ApiError> {
    let settings = Settings::clamped(r.low_stock_threshold);
    s.store.save_settings(&settings).await.map_err(api_err)?;
    publish(&s, DomainEvent::Settings(SettingsEvent::Updated)).await;
    Ok(Json(settings))
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, serde::Serialize)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub totals: solestock::domain::aggregates::cart::CartTotals,
}

fn cart_view(cart: Cart) -> CartView {
    let totals = cart.totals();
    CartView { lines: cart.lines, totals }
}

fn require_cart_access(s: &AppState, session: &str) -> Result<(), ApiError> {
    if s.cart_gate.can_modify(session) {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "sign in to modify the cart".to_string()))
    }
}

async fn get_cart(State(s): State<AppState>, Path(session): Path<String>) -> Result<Json<CartView>, ApiError> {
    let cart = s.store.load_cart(&session).await.map_err(api_err)?;
    Ok(Json(cart_view(cart)))
}

async fn add_to_cart(State(s): State<AppState>, Path(session): Path<String>, Json(line): Json<CartLine>) -> Result<(StatusCode, Json<AddOutcome>), ApiError> {
    require_cart_access(&s, &session)?;
    let catalog = s.store.load_catalog().await.map_err(api_err)?;
    let mut cart = s.store.load_cart(&session).await.map_err(api_err)?;
    let outcome = cart.add(line, &catalog);
    // A clamped merge still mutated the cart; only an out-of-stock
    // rejection leaves it untouched.
    if outcome != AddOutcome::OutOfStock {
        s.store.save_cart(&session, &cart).await.map_err(api_err)?;
        publish(&s, DomainEvent::Cart(CartEvent::Changed { session })).await;
    }
    let code = match outcome {
        AddOutcome::Added => StatusCode::CREATED,
        _ => StatusCode::CONFLICT,
    };
    Ok((code, Json(outcome)))
}

async fn remove_cart_line(State(s): State<AppState>, Path((session, index)): Path<(String, usize)>) -> Result<StatusCode, ApiError> {
    require_cart_access(&s, &session)?;
    let mut cart = s.store.load_cart(&session).await.map_err(api_err)?;
    cart.remove_line(index);
    s.store.save_cart(&session, &cart).await.map_err(api_err)?;
    publish(&s, DomainEvent::Cart(CartEvent::Changed { session })).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_cart(State(s): State<AppState>, Path(session): Path<String>) -> Result<StatusCode, ApiError> {
    require_cart_access(&s, &session)?;
    let cart = Cart::default();
    s.store.save_cart(&session, &cart).await.map_err(api_err)?;
    publish(&s, DomainEvent::Cart(CartEvent::Changed { session })).await;
    Ok(StatusCode::NO_CONTENT)
}
