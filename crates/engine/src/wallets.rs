//! Wallets and their table.

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MoneyCents;

/// Somewhere money sits: cash, a bank account, a card.
///
/// `balance` equals the sum of the wallet's transactions unless a client
/// overwrote it; `Engine::recompute_balances` restores the equality.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: Uuid,
    pub name: String,
    pub balance: MoneyCents,
}

impl Wallet {
    pub fn new(name: String, balance: MoneyCents) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            balance,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub balance: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Wallet {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            balance: MoneyCents::new(model.balance),
        }
    }
}

impl ActiveModel {
    /// Builds an insertable row for `wallet`, owned by `user_id`.
    pub(crate) fn for_user(wallet: &Wallet, user_id: Uuid) -> Self {
        Self {
            id: ActiveValue::Set(wallet.id),
            user_id: ActiveValue::Set(user_id),
            name: ActiveValue::Set(wallet.name.clone()),
            balance: ActiveValue::Set(wallet.balance.cents()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_wallet_gets_fresh_id() {
        let a = Wallet::new("Cash".to_string(), MoneyCents::ZERO);
        let b = Wallet::new("Cash".to_string(), MoneyCents::ZERO);
        assert_ne!(a.id, b.id);
        assert_eq!(a.balance, MoneyCents::ZERO);
    }

    #[test]
    fn model_round_trips_into_wallet() {
        let user_id = Uuid::new_v4();
        let wallet = Wallet::new("Bank".to_string(), MoneyCents::new(-250));
        let active = ActiveModel::for_user(&wallet, user_id);

        assert_eq!(active.user_id, ActiveValue::Set(user_id));
        let model = Model {
            id: wallet.id,
            user_id,
            name: "Bank".to_string(),
            balance: -250,
        };
        assert_eq!(Wallet::from(model), wallet);
    }
}
