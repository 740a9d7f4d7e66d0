//! HTTP surface of the product ledger.
//!
//! Every handler turns its request into one contract [`Invocation`], runs it
//! inside a single ledger session and replies `{"result": ...}`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use supplychain_common::invocation::{Invocation, Outcome};
use supplychain_common::NewProduct;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::error::ApiError;
use crate::store::Ledger;

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct AddProductRequest {
    #[serde(flatten)]
    pub product: NewProduct,
    /// Replace an existing record instead of failing with a conflict.
    #[serde(default)]
    pub upsert: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyRequest {
    #[serde(rename = "productID")]
    pub id: String,
    pub supply_date: String,
    pub warehouse_location: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WholesaleRequest {
    #[serde(rename = "productID")]
    pub id: String,
    pub wholesale_date: String,
    pub wholesale_location: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    #[serde(rename = "productID")]
    pub id: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct SaleRequest {
    #[serde(rename = "productID")]
    pub id: String,
    #[serde(rename = "buyerInfo", default)]
    pub buyer: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    #[serde(rename = "productID")]
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResultBody {
    pub result: Outcome,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub records: usize,
}

/// Build the gateway router over `ledger`.
pub fn router(ledger: Ledger) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/addProduct", post(add_product))
        .route("/dispatchProduct", post(dispatch_product))
        .route("/bulkPurchase", post(bulk_purchase))
        .route("/changeStatus", post(change_status))
        .route("/processSale", post(process_sale))
        .route("/fetchProduct", get(fetch_product))
        .route("/initLedger", post(init_ledger))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(ledger)
}

/// Run one invocation in its own session. The session is dropped on return,
/// whether the invocation succeeded or not.
async fn execute(ledger: &Ledger, invocation: Invocation) -> ApiResult<Outcome> {
    let span = tracing::info_span!("invoke", function = invocation.function_name());
    async move {
        let mut session = ledger.connect().await;
        let outcome = invocation.apply(&mut *session)?;
        tracing::debug!("invocation committed");
        Ok::<_, ApiError>(outcome)
    }
    .instrument(span)
    .await
}

async fn add_product(
    State(ledger): State<Ledger>,
    payload: Result<Json<AddProductRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ResultBody>)> {
    let Json(req) = payload?;
    let result = execute(
        &ledger,
        Invocation::AddProduct {
            product: req.product,
            upsert: req.upsert,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(ResultBody { result })))
}

async fn dispatch_product(
    State(ledger): State<Ledger>,
    payload: Result<Json<SupplyRequest>, JsonRejection>,
) -> ApiResult<Json<ResultBody>> {
    let Json(req) = payload?;
    let result = execute(
        &ledger,
        Invocation::RecordSupply {
            id: req.id,
            supply_date: req.supply_date,
            warehouse_location: req.warehouse_location,
        },
    )
    .await?;
    Ok(Json(ResultBody { result }))
}

async fn bulk_purchase(
    State(ledger): State<Ledger>,
    payload: Result<Json<WholesaleRequest>, JsonRejection>,
) -> ApiResult<Json<ResultBody>> {
    let Json(req) = payload?;
    let result = execute(
        &ledger,
        Invocation::RecordWholesale {
            id: req.id,
            wholesale_date: req.wholesale_date,
            wholesale_location: req.wholesale_location,
            quantity: req.quantity,
        },
    )
    .await?;
    Ok(Json(ResultBody { result }))
}

async fn change_status(
    State(ledger): State<Ledger>,
    payload: Result<Json<ChangeStatusRequest>, JsonRejection>,
) -> ApiResult<Json<ResultBody>> {
    let Json(req) = payload?;
    let result = execute(
        &ledger,
        Invocation::ChangeProductStatus {
            id: req.id,
            status: req.status,
        },
    )
    .await?;
    Ok(Json(ResultBody { result }))
}

async fn process_sale(
    State(ledger): State<Ledger>,
    payload: Result<Json<SaleRequest>, JsonRejection>,
) -> ApiResult<Json<ResultBody>> {
    let Json(req) = payload?;
    tracing::info!(product = %req.id, buyer = req.buyer.as_deref().unwrap_or("-"), "processing sale");
    let result = execute(
        &ledger,
        Invocation::ChangeProductStatus {
            id: req.id,
            status: "Sold".to_string(),
        },
    )
    .await?;
    Ok(Json(ResultBody { result }))
}

async fn fetch_product(
    State(ledger): State<Ledger>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> ApiResult<Json<ResultBody>> {
    let Query(query) = query?;
    let result = execute(&ledger, Invocation::RetrieveProduct { id: query.id }).await?;
    Ok(Json(ResultBody { result }))
}

async fn init_ledger(State(ledger): State<Ledger>) -> ApiResult<Json<ResultBody>> {
    let result = execute(&ledger, Invocation::InitLedger).await?;
    Ok(Json(ResultBody { result }))
}

async fn health(State(ledger): State<Ledger>) -> ApiResult<Json<HealthResponse>> {
    let session = ledger.connect().await;
    let records = session
        .keys()
        .map_err(supplychain_common::LedgerError::from)?
        .len();
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        records,
    }))
}
