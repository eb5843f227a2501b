use std::collections::HashMap;

use uuid::Uuid;

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{EngineError, MoneyCents, ResultEngine, Wallet, transactions, wallets};

use super::{Engine, with_tx};

impl Engine {
    /// Recomputes every wallet balance of the user from its transactions.
    ///
    /// Undoes direct balance overwrites: afterwards each balance equals the
    /// sum of the amounts pointing at the wallet. Returns the repaired
    /// wallets, lowest balance first.
    pub async fn recompute_balances(&self, user_id: Uuid) -> ResultEngine<Vec<Wallet>> {
        with_tx!(self, |db_tx| {
            let wallet_models = wallets::Entity::find()
                .filter(wallets::Column::UserId.eq(user_id))
                .all(&db_tx)
                .await?;

            let mut balances: HashMap<Uuid, MoneyCents> = wallet_models
                .iter()
                .map(|model| (model.id, MoneyCents::ZERO))
                .collect();

            let tx_models = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id))
                .all(&db_tx)
                .await?;
            for tx in tx_models {
                let balance = balances.get_mut(&tx.wallet_id).ok_or_else(|| {
                    EngineError::KeyNotFound("wallet doesn't exist".to_string())
                })?;
                *balance = balance
                    .checked_add(MoneyCents::new(tx.amount_minor))
                    .ok_or_else(|| {
                        EngineError::InvalidAmount("wallet balance is out of range".to_string())
                    })?;
            }

            for (wallet_id, balance) in &balances {
                let balance = balance.ensure_in_bounds("wallet balance")?;
                let active = wallets::ActiveModel {
                    id: ActiveValue::Unchanged(*wallet_id),
                    balance: ActiveValue::Set(balance.cents()),
                    ..Default::default()
                };
                active.update(&db_tx).await?;
            }

            let repaired = wallets::Entity::find()
                .filter(wallets::Column::UserId.eq(user_id))
                .order_by_asc(wallets::Column::Balance)
                .order_by_asc(wallets::Column::Name)
                .order_by_asc(wallets::Column::Id)
                .all(&db_tx)
                .await?;
            tracing::info!(%user_id, wallets = repaired.len(), "balances recomputed");
            Ok(repaired.into_iter().map(Wallet::from).collect())
        })
    }
}
