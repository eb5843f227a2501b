//! Transaction primitives.
//!
//! A `Transaction` is a signed monetary entry against exactly one wallet and
//! one category. Its `amount` is what the wallet balance moves by.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{MoneyCents, util::fold_text};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    /// Signed amount: non-negative is income, negative is expense.
    pub amount: MoneyCents,
    pub occurred_at: DateTime<Utc>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub wallet_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    /// `name` folded for search.
    pub name_norm: String,
    pub amount_minor: i64,
    pub occurred_at: DateTimeUtc,
    pub description: Option<String>,
    pub description_norm: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Wallet,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Category,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    /// Builds a row holding every field of `tx`, owned by `user_id`.
    pub(crate) fn for_user(tx: &Transaction, user_id: Uuid) -> Self {
        Self {
            id: ActiveValue::Set(tx.id),
            user_id: ActiveValue::Set(user_id),
            wallet_id: ActiveValue::Set(tx.wallet_id),
            category_id: ActiveValue::Set(tx.category_id),
            name: ActiveValue::Set(tx.name.clone()),
            name_norm: ActiveValue::Set(fold_text(&tx.name)),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            description: ActiveValue::Set(tx.description.clone()),
            description_norm: ActiveValue::Set(tx.description.as_deref().map(fold_text)),
        }
    }
}

impl From<Model> for Transaction {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            wallet_id: model.wallet_id,
            category_id: model.category_id,
            name: model.name,
            amount: MoneyCents::new(model.amount_minor),
            occurred_at: model.occurred_at,
            description: model.description,
        }
    }
}
