//! Inputs of the transaction write operations.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::MoneyCents;

/// Mutable fields of a transaction, shared by create and update.
#[derive(Clone, Debug)]
pub struct TxFields {
    pub wallet_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub amount: MoneyCents,
    pub occurred_at: DateTime<Utc>,
    pub description: Option<String>,
}

impl TxFields {
    #[must_use]
    pub fn new(
        wallet_id: Uuid,
        category_id: Uuid,
        name: impl Into<String>,
        amount: MoneyCents,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            wallet_id,
            category_id,
            name: name.into(),
            amount,
            occurred_at,
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Create a transaction and apply its amount to the target wallet.
#[derive(Clone, Debug)]
pub struct CreateTransactionCmd {
    pub user_id: Uuid,
    pub fields: TxFields,
}

impl CreateTransactionCmd {
    #[must_use]
    pub fn new(user_id: Uuid, fields: TxFields) -> Self {
        Self { user_id, fields }
    }
}

/// Overwrite every mutable field of an existing transaction.
///
/// The old amount is reversed from the old wallet before the new amount is
/// applied to the (possibly different) new wallet.
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub user_id: Uuid,
    pub transaction_id: Uuid,
    pub fields: TxFields,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(user_id: Uuid, transaction_id: Uuid, fields: TxFields) -> Self {
        Self {
            user_id,
            transaction_id,
            fields,
        }
    }
}
