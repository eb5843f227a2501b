//! Transactions API endpoints.

use api_types::{
    ApiResponse,
    transaction::{DateRangeQuery, TransactionInput, TransactionQuery, TransactionView},
};
use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use chrono::{DateTime, NaiveDate, Utc};
use engine::{
    CreateTransactionCmd, MoneyCents, Session, TransactionFilter, TxFields, UpdateTransactionCmd,
    end_of_day, start_of_day,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

const DAY_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn map_transaction(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        wallet_id: tx.wallet_id,
        category_id: tx.category_id,
        name: tx.name,
        amount_minor: tx.amount.cents(),
        date: tx.occurred_at,
        description: tx.description,
    }
}

fn map_transactions(txs: Vec<engine::Transaction>) -> Vec<TransactionView> {
    txs.into_iter().map(map_transaction).collect()
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

/// Parses a filter bound given as RFC 3339 or as a bare day.
///
/// A bare start day begins at midnight, a bare end day covers the whole day.
fn parse_bound(value: &str, bound: Bound) -> Result<DateTime<Utc>, ServerError> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(value, DAY_FORMAT).map_err(|_| {
        ServerError::Generic(format!(
            "invalid date '{value}': use RFC 3339 or yyyy-MM-dd"
        ))
    })?;
    Ok(match bound {
        Bound::Start => start_of_day(day),
        Bound::End => end_of_day(day),
    })
}

fn fields_from(payload: TransactionInput) -> TxFields {
    let occurred_at = payload
        .date
        .map_or_else(Utc::now, |date| date.with_timezone(&Utc));
    let mut fields = TxFields::new(
        payload.wallet_id,
        payload.category_id,
        payload.name,
        MoneyCents::new(payload.amount_minor),
        occurred_at,
    );
    fields.description = payload.description;
    fields
}

pub async fn create(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    payload: Result<Json<TransactionInput>, JsonRejection>,
) -> Result<Json<ApiResponse<TransactionView>>, ServerError> {
    let Json(payload) = payload?;
    let tx = state
        .engine
        .create_transaction(CreateTransactionCmd::new(
            session.user_id,
            fields_from(payload),
        ))
        .await?;
    Ok(Json(ApiResponse::ok(
        "Transaction created successfully",
        map_transaction(tx),
    )))
}

/// Lists all transactions, or filters them when any query key is present.
pub async fn list(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    query: Result<Query<TransactionQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<TransactionView>>>, ServerError> {
    let Query(query) = query?;
    let filter = TransactionFilter {
        from: query
            .start
            .as_deref()
            .map(|v| parse_bound(v, Bound::Start))
            .transpose()?,
        to: query
            .end
            .as_deref()
            .map(|v| parse_bound(v, Bound::End))
            .transpose()?,
        category_id: query.category_id,
        wallet_id: query.wallet_id,
        search: query.search,
    };

    if filter == TransactionFilter::default() {
        let txs = state.engine.list_transactions(session.user_id).await?;
        return Ok(Json(ApiResponse::ok(
            "Transactions retrieved successfully",
            map_transactions(txs),
        )));
    }

    let txs = state
        .engine
        .filter_transactions(session.user_id, &filter)
        .await?;
    Ok(Json(ApiResponse::ok(
        "Data filtered successfully",
        map_transactions(txs),
    )))
}

pub async fn date_range(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<TransactionView>>>, ServerError> {
    let Query(query) = query?;
    let (Some(start), Some(end)) = (query.start.as_deref(), query.end.as_deref()) else {
        return Err(ServerError::Generic(
            "start and end are required (yyyy-MM-dd)".to_string(),
        ));
    };
    let parse = |value: &str| {
        NaiveDate::parse_from_str(value.trim(), DAY_FORMAT)
            .map_err(|_| ServerError::Generic("dates must be in yyyy-MM-dd format".to_string()))
    };
    let (start, end) = (parse(start)?, parse(end)?);

    let txs = state
        .engine
        .transactions_in_date_range(session.user_id, start, end)
        .await?;
    Ok(Json(ApiResponse::ok(
        "Transactions retrieved successfully",
        map_transactions(txs),
    )))
}

pub async fn get(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    transaction_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<TransactionView>>, ServerError> {
    let Path(transaction_id) = transaction_id?;
    let tx = state
        .engine
        .transaction(session.user_id, transaction_id)
        .await?;
    Ok(Json(ApiResponse::ok(
        "Transaction retrieved successfully",
        map_transaction(tx),
    )))
}

pub async fn update(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    transaction_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<TransactionInput>, JsonRejection>,
) -> Result<Json<ApiResponse<TransactionView>>, ServerError> {
    let Path(transaction_id) = transaction_id?;
    let Json(payload) = payload?;
    let tx = state
        .engine
        .update_transaction(UpdateTransactionCmd::new(
            session.user_id,
            transaction_id,
            fields_from(payload),
        ))
        .await?;
    Ok(Json(ApiResponse::ok(
        "Transaction updated successfully",
        map_transaction(tx),
    )))
}

pub async fn delete(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    transaction_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    let Path(transaction_id) = transaction_id?;
    state
        .engine
        .delete_transaction(session.user_id, transaction_id)
        .await?;
    Ok(Json(ApiResponse::done("Transaction deleted successfully")))
}
