//! Wallets API endpoints.

use api_types::{
    ApiResponse,
    transaction::TransactionView,
    wallet::{TotalBalance, WalletInput, WalletView},
};
use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use engine::{MoneyCents, Session};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, transactions::map_transaction};

fn map_wallet(wallet: engine::Wallet) -> WalletView {
    WalletView {
        id: wallet.id,
        name: wallet.name,
        balance_minor: wallet.balance.cents(),
    }
}

pub async fn create(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    payload: Result<Json<WalletInput>, JsonRejection>,
) -> Result<Json<ApiResponse<WalletView>>, ServerError> {
    let Json(payload) = payload?;
    let wallet = state
        .engine
        .create_wallet(
            session.user_id,
            &payload.name,
            MoneyCents::new(payload.balance_minor),
        )
        .await?;
    Ok(Json(ApiResponse::ok(
        "Wallet created successfully",
        map_wallet(wallet),
    )))
}

pub async fn list(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<Vec<WalletView>>>, ServerError> {
    let wallets: Vec<WalletView> = state
        .engine
        .list_wallets(session.user_id)
        .await?
        .into_iter()
        .map(map_wallet)
        .collect();
    let message = if wallets.is_empty() {
        "No wallets found"
    } else {
        "Wallets retrieved successfully"
    };
    Ok(Json(ApiResponse::ok(message, wallets)))
}

pub async fn get(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    wallet_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<WalletView>>, ServerError> {
    let Path(wallet_id) = wallet_id?;
    let wallet = state.engine.wallet(session.user_id, wallet_id).await?;
    Ok(Json(ApiResponse::ok(
        "Wallet retrieved successfully",
        map_wallet(wallet),
    )))
}

pub async fn total_balance(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<TotalBalance>>, ServerError> {
    let total = state.engine.total_balance(session.user_id).await?;
    Ok(Json(ApiResponse::ok(
        "Total balance retrieved successfully",
        TotalBalance {
            total_minor: total.cents(),
        },
    )))
}

pub async fn transactions(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    wallet_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<Vec<TransactionView>>>, ServerError> {
    let Path(wallet_id) = wallet_id?;
    let transactions = state
        .engine
        .wallet_transactions(session.user_id, wallet_id)
        .await?
        .into_iter()
        .map(map_transaction)
        .collect();
    Ok(Json(ApiResponse::ok(
        "Transactions retrieved successfully",
        transactions,
    )))
}

/// Overwrites name and balance verbatim; see `recompute` to re-derive.
pub async fn update(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    wallet_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<WalletInput>, JsonRejection>,
) -> Result<Json<ApiResponse<WalletView>>, ServerError> {
    let Path(wallet_id) = wallet_id?;
    let Json(payload) = payload?;
    let wallet = state
        .engine
        .update_wallet(
            session.user_id,
            wallet_id,
            &payload.name,
            MoneyCents::new(payload.balance_minor),
        )
        .await?;
    Ok(Json(ApiResponse::ok(
        "Wallet updated successfully",
        map_wallet(wallet),
    )))
}

pub async fn delete(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    wallet_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    let Path(wallet_id) = wallet_id?;
    let wallet = state.engine.delete_wallet(session.user_id, wallet_id).await?;
    Ok(Json(ApiResponse::done(format!(
        "Wallet {} deleted successfully",
        wallet.name
    ))))
}

pub async fn recompute(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<Vec<WalletView>>>, ServerError> {
    let wallets = state
        .engine
        .recompute_balances(session.user_id)
        .await?
        .into_iter()
        .map(map_wallet)
        .collect();
    Ok(Json(ApiResponse::ok(
        "Balances recomputed successfully",
        wallets,
    )))
}
