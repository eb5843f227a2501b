use uuid::Uuid;

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, MoneyCents, ResultEngine, Wallet, transactions, util::normalize_required_name,
    wallets,
};

use super::{Engine, with_tx};

impl Engine {
    /// Return a wallet snapshot from DB.
    pub async fn wallet(&self, user_id: Uuid, wallet_id: Uuid) -> ResultEngine<Wallet> {
        with_tx!(self, |db_tx| {
            let model = self.require_wallet(&db_tx, user_id, wallet_id).await?;
            Ok(Wallet::from(model))
        })
    }

    /// Add a new wallet with an initial balance.
    ///
    /// The opening balance is stored as-is; no transaction backs it.
    pub async fn create_wallet(
        &self,
        user_id: Uuid,
        name: &str,
        balance: MoneyCents,
    ) -> ResultEngine<Wallet> {
        let name = normalize_required_name(name, "wallet")?;
        let balance = balance.ensure_in_bounds("balance")?;
        with_tx!(self, |db_tx| {
            let wallet = Wallet::new(name, balance);
            wallets::ActiveModel::for_user(&wallet, user_id)
                .insert(&db_tx)
                .await?;
            tracing::debug!(wallet_id = %wallet.id, balance = %wallet.balance, "wallet created");
            Ok(wallet)
        })
    }

    /// Wallets of the user, lowest balance first.
    pub async fn list_wallets(&self, user_id: Uuid) -> ResultEngine<Vec<Wallet>> {
        with_tx!(self, |db_tx| {
            let models = wallets::Entity::find()
                .filter(wallets::Column::UserId.eq(user_id))
                .order_by_asc(wallets::Column::Balance)
                .order_by_asc(wallets::Column::Name)
                .order_by_asc(wallets::Column::Id)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Wallet::from).collect())
        })
    }

    /// Sum of every wallet balance of the user; zero when there are none.
    pub async fn total_balance(&self, user_id: Uuid) -> ResultEngine<MoneyCents> {
        let wallets = self.list_wallets(user_id).await?;
        wallets
            .iter()
            .try_fold(MoneyCents::ZERO, |acc, w| acc.checked_add(w.balance))
            .ok_or_else(|| EngineError::InvalidAmount("total balance is out of range".to_string()))
    }

    /// Overwrites name and balance of a wallet.
    ///
    /// The balance is taken verbatim from the caller and is not re-derived
    /// from transactions. Use [`Engine::recompute_balances`] to repair it.
    pub async fn update_wallet(
        &self,
        user_id: Uuid,
        wallet_id: Uuid,
        name: &str,
        balance: MoneyCents,
    ) -> ResultEngine<Wallet> {
        let name = normalize_required_name(name, "wallet")?;
        let balance = balance.ensure_in_bounds("balance")?;
        with_tx!(self, |db_tx| {
            self.require_wallet(&db_tx, user_id, wallet_id).await?;

            let active = wallets::ActiveModel {
                id: ActiveValue::Unchanged(wallet_id),
                name: ActiveValue::Set(name),
                balance: ActiveValue::Set(balance.cents()),
                ..Default::default()
            };
            let model = active.update(&db_tx).await?;
            tracing::debug!(%wallet_id, balance = %balance, "wallet overwritten");
            Ok(Wallet::from(model))
        })
    }

    /// Deletes a wallet together with all of its transactions.
    ///
    /// Returns the wallet as it was before deletion.
    pub async fn delete_wallet(&self, user_id: Uuid, wallet_id: Uuid) -> ResultEngine<Wallet> {
        with_tx!(self, |db_tx| {
            let model = self.require_wallet(&db_tx, user_id, wallet_id).await?;

            let removed = transactions::Entity::delete_many()
                .filter(transactions::Column::UserId.eq(user_id))
                .filter(transactions::Column::WalletId.eq(wallet_id))
                .exec(&db_tx)
                .await?;
            wallets::Entity::delete_by_id(wallet_id)
                .exec(&db_tx)
                .await?;

            tracing::debug!(
                %wallet_id,
                transactions = removed.rows_affected,
                "wallet deleted"
            );
            Ok(Wallet::from(model))
        })
    }
}
