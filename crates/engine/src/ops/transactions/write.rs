use sea_orm::{TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    CreateTransactionCmd, EngineError, MoneyCents, ResultEngine, Transaction,
    UpdateTransactionCmd, transactions,
};

use super::super::{Engine, with_tx};
use super::{ensure_balance_in_bounds, normalize_fields};

impl Engine {
    /// Creates a transaction and adds its amount to the target wallet.
    ///
    /// Wallet and category must both belong to the caller, otherwise
    /// `KeyNotFound` is returned and nothing is written.
    pub async fn create_transaction(&self, cmd: CreateTransactionCmd) -> ResultEngine<Transaction> {
        let user_id = cmd.user_id;
        let fields = normalize_fields(&cmd.fields)?;
        with_tx!(self, |db_tx| {
            let wallet = self
                .require_wallet(&db_tx, user_id, fields.wallet_id)
                .await?;
            self.require_category(&db_tx, user_id, fields.category_id)
                .await?;
            ensure_balance_in_bounds(wallet.balance, fields.amount)?;

            let tx = Transaction {
                id: Uuid::new_v4(),
                wallet_id: fields.wallet_id,
                category_id: fields.category_id,
                name: fields.name,
                amount: fields.amount,
                occurred_at: fields.occurred_at,
                description: fields.description,
            };
            transactions::ActiveModel::for_user(&tx, user_id)
                .insert(&db_tx)
                .await?;
            self.shift_wallet_balance(&db_tx, user_id, tx.wallet_id, tx.amount.cents())
                .await?;

            tracing::debug!(
                transaction_id = %tx.id,
                wallet_id = %tx.wallet_id,
                amount = %tx.amount,
                "transaction created"
            );
            Ok(tx)
        })
    }

    /// Overwrites every mutable field of a transaction.
    ///
    /// Balances are moved in two steps: the old amount is reversed from the
    /// old wallet, then the new amount is applied to the new wallet (which
    /// may be the same one). Both steps and the row rewrite are one unit: if
    /// the new wallet cannot be resolved, the reversal is rolled back too.
    pub async fn update_transaction(&self, cmd: UpdateTransactionCmd) -> ResultEngine<Transaction> {
        let user_id = cmd.user_id;
        let transaction_id = cmd.transaction_id;
        let fields = normalize_fields(&cmd.fields)?;
        with_tx!(self, |db_tx| {
            let current = self
                .require_transaction(&db_tx, user_id, transaction_id)
                .await?;
            let old_wallet = self
                .require_wallet(&db_tx, user_id, current.wallet_id)
                .await?;
            self.require_category(&db_tx, user_id, fields.category_id)
                .await?;

            let old_amount = current.amount_minor;
            self.shift_wallet_balance(&db_tx, user_id, old_wallet.id, -old_amount)
                .await?;

            if fields.wallet_id == old_wallet.id {
                ensure_balance_in_bounds(old_wallet.balance - old_amount, fields.amount)?;
                self.shift_wallet_balance(&db_tx, user_id, old_wallet.id, fields.amount.cents())
                    .await?;
            } else {
                let new_wallet = self
                    .require_wallet(&db_tx, user_id, fields.wallet_id)
                    .await?;
                ensure_balance_in_bounds(new_wallet.balance, fields.amount)?;
                self.shift_wallet_balance(&db_tx, user_id, new_wallet.id, fields.amount.cents())
                    .await?;
            }

            let tx = Transaction {
                id: transaction_id,
                wallet_id: fields.wallet_id,
                category_id: fields.category_id,
                name: fields.name,
                amount: fields.amount,
                occurred_at: fields.occurred_at,
                description: fields.description,
            };
            transactions::ActiveModel::for_user(&tx, user_id)
                .update(&db_tx)
                .await?;

            tracing::debug!(
                transaction_id = %tx.id,
                old_wallet_id = %old_wallet.id,
                new_wallet_id = %tx.wallet_id,
                amount = %tx.amount,
                "transaction updated"
            );
            Ok(tx)
        })
    }

    /// Deletes a transaction and reverses its amount from its wallet.
    ///
    /// Only `i64` overflow blocks the reversal. A wallet whose balance was
    /// overwritten close to the limit can still shed its transactions.
    pub async fn delete_transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let current = self
                .require_transaction(&db_tx, user_id, transaction_id)
                .await?;
            let wallet = self
                .require_wallet(&db_tx, user_id, current.wallet_id)
                .await?;
            let reversal = -MoneyCents::new(current.amount_minor);
            MoneyCents::new(wallet.balance)
                .checked_add(reversal)
                .ok_or_else(|| {
                    EngineError::InvalidAmount("wallet balance is out of range".to_string())
                })?;

            self.shift_wallet_balance(&db_tx, user_id, wallet.id, reversal.cents())
                .await?;
            transactions::Entity::delete_by_id(current.id)
                .exec(&db_tx)
                .await?;

            tracing::debug!(
                transaction_id = %current.id,
                wallet_id = %wallet.id,
                "transaction deleted"
            );
            Ok(Transaction::from(current))
        })
    }
}
