//! HTTP routes for the account ledger.
//!
//! Every handler answers with a [`GenericResponse`] envelope. Malformed
//! bodies and failed operations are logged and reported through the
//! envelope's `message`.

mod dto;

pub use dto::*;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;

use crate::application::LedgerService;
use crate::domain::convert_to_native;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LedgerService>,
}

type ApiResponse<T> = (StatusCode, Json<GenericResponse<T>>);

/// Build the `/account` router.
pub fn router(service: Arc<LedgerService>) -> Router {
    Router::new()
        .route("/account/currency/", get(get_account_currency))
        .route("/account/addFund/", post(add_fund))
        .route("/account/balance/", post(get_account_balance))
        .route("/account/withDraw/", post(withdraw_money))
        .route("/account/currencyRate/", post(get_currency_rate))
        .with_state(AppState { service })
}

fn success<T: Serialize>(message: &str, data: Option<T>) -> ApiResponse<T> {
    (StatusCode::OK, Json(GenericResponse::ok(message, data)))
}

fn failure<T: Serialize>(status: StatusCode, err: impl std::fmt::Display) -> ApiResponse<T> {
    tracing::error!(status = status.as_u16(), error = %err, "request failed");
    (status, Json(GenericResponse::error(err.to_string())))
}

/// GET /account/currency/
async fn get_account_currency(State(state): State<AppState>) -> ApiResponse<CurrencyData> {
    match state.service.get_currency().await {
        Ok(currency) => success("", Some(CurrencyData { currency })),
        Err(err) => failure(StatusCode::NOT_FOUND, err),
    }
}

/// POST /account/addFund/
async fn add_fund(
    State(state): State<AppState>,
    payload: Result<Json<FundRequest>, JsonRejection>,
) -> ApiResponse<()> {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return failure(StatusCode::NOT_FOUND, rejection),
    };

    let amount = convert_to_native(request.balance, &request.currency);
    match state.service.add_funds(amount).await {
        Ok(()) => success("amount added successfully", None),
        Err(err) => failure(StatusCode::NOT_FOUND, err),
    }
}

/// POST /account/balance/
async fn get_account_balance(
    State(state): State<AppState>,
    payload: Result<Json<CurrencyRequest>, JsonRejection>,
) -> ApiResponse<BalanceData> {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return failure(StatusCode::NOT_FOUND, rejection),
    };

    match state.service.get_balance(&request.currency).await {
        Ok(balance) => success("", Some(BalanceData { balance })),
        Err(err) => failure(StatusCode::INTERNAL_SERVER_ERROR, err),
    }
}

/// POST /account/withDraw/
async fn withdraw_money(
    State(state): State<AppState>,
    payload: Result<Json<FundRequest>, JsonRejection>,
) -> ApiResponse<()> {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return failure(StatusCode::NOT_FOUND, rejection),
    };

    let amount = convert_to_native(request.balance, &request.currency);
    match state.service.withdraw(amount).await {
        Ok(()) => success("money was withdrawn from the account", None),
        Err(err) => failure(StatusCode::NOT_FOUND, err),
    }
}

/// POST /account/currencyRate/
async fn get_currency_rate(
    State(state): State<AppState>,
    payload: Result<Json<CurrencyRequest>, JsonRejection>,
) -> ApiResponse<RateData> {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return failure(StatusCode::NOT_FOUND, rejection),
    };

    match state
        .service
        .get_account_currency_rate(&request.currency)
        .await
    {
        Ok(rate) => success("", Some(RateData { rate })),
        Err(err) => failure(StatusCode::INTERNAL_SERVER_ERROR, err),
    }
}
