use crate::{
    api::{
        error::ApiError,
        response::{with_status, with_total_count, ApiResponse},
    },
    models::{Subscription, Transaction},
    service::NotifierError,
    state::AppState,
    validation::{normalize_address, validate_address},
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

// POST /subscribe body. A missing address is reported by validation.
#[derive(Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub address: String,
}

// ?address= on /transactions and DELETE /subscribe
#[derive(Deserialize)]
pub struct AddressQuery {
    #[serde(default)]
    pub address: String,
}

#[derive(Serialize)]
pub struct CurrentBlock {
    pub block: u64,
}

#[derive(Serialize)]
pub struct SubscribeResult {
    pub address: String,
    pub subscribed: bool,
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/currentBlock", get(current_block))
        .route("/subscribe", post(subscribe).delete(unsubscribe))
        .route("/subscriptions", get(list_subscriptions))
        .route(
            "/transactions",
            get(get_transactions).delete(clean_up_transactions),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

// GET /currentBlock
async fn current_block(
    State(state): State<Arc<AppState>>,
) -> Result<ApiResponse<CurrentBlock>, ApiError> {
    let block = state.notifier.get_current_block().await?;
    Ok(ApiResponse::new(CurrentBlock { block }))
}

// POST /subscribe
async fn subscribe(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SubscribeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    validate_address(&request.address)?;
    let address = normalize_address(&request.address);

    let subscribed = state.notifier.subscribe(&address).await?;
    let status = if subscribed {
        info!("Subscribed to {}", address);
        StatusCode::CREATED
    } else {
        info!("Already subscribed to {}", address);
        StatusCode::OK
    };

    Ok(with_status(status, SubscribeResult { address, subscribed }))
}

// DELETE /subscribe?address=
async fn unsubscribe(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AddressQuery>, QueryRejection>,
) -> Result<StatusCode, ApiError> {
    let Query(params) = query?;
    validate_address(&params.address)?;
    state.notifier.unsubscribe(&params.address).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /subscriptions
async fn list_subscriptions(
    State(state): State<Arc<AppState>>,
) -> ApiResponse<Vec<Subscription>> {
    ApiResponse::new(state.notifier.subscriptions().await)
}

// GET /transactions?address=
async fn get_transactions(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AddressQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query?;
    validate_address(&params.address)?;

    let result = state.notifier.get_transactions(&params.address).await;
    let transactions: Vec<Transaction> = match result {
        Ok(transactions) => transactions,
        // Subscribed but nothing observed yet: the caller should keep polling.
        Err(NotifierError::NoTransactions(_)) => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    let count = transactions.len();
    Ok(with_total_count(transactions, count))
}

// DELETE /transactions?address=
async fn clean_up_transactions(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AddressQuery>, QueryRejection>,
) -> Result<StatusCode, ApiError> {
    let Query(params) = query?;
    validate_address(&params.address)?;
    state.notifier.clean_up_transactions(&params.address).await?;
    Ok(StatusCode::NO_CONTENT)
}
