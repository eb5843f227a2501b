//! Ownership-scoped lookups.
//!
//! Every entity read goes through `(id, user_id)`. An id that exists but
//! belongs to somebody else is reported exactly like a missing one.

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, categories, transactions, wallets};

use super::Engine;

/// Generates `find_*` and `require_*` methods for a user-owned entity.
macro_rules! impl_owned_lookup {
    ($find_fn:ident, $require_fn:ident, $entity:path, $model:ty, $user_col:expr, $err_msg:literal) => {
        pub(super) async fn $find_fn(
            &self,
            db: &DatabaseTransaction,
            user_id: Uuid,
            id: Uuid,
        ) -> ResultEngine<Option<$model>> {
            <$entity>::find_by_id(id)
                .filter($user_col.eq(user_id))
                .one(db)
                .await
                .map_err(Into::into)
        }

        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            user_id: Uuid,
            id: Uuid,
        ) -> ResultEngine<$model> {
            self.$find_fn(db, user_id, id)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_owned_lookup!(
        find_wallet,
        require_wallet,
        wallets::Entity,
        wallets::Model,
        wallets::Column::UserId,
        "wallet doesn't exist"
    );

    impl_owned_lookup!(
        find_category,
        require_category,
        categories::Entity,
        categories::Model,
        categories::Column::UserId,
        "category doesn't exist"
    );

    impl_owned_lookup!(
        find_transaction,
        require_transaction,
        transactions::Entity,
        transactions::Model,
        transactions::Column::UserId,
        "transaction doesn't exist"
    );

    /// Moves a wallet balance by `delta_minor` with a single in-database
    /// increment, scoped to the owner.
    ///
    /// The row is written (and therefore write-locked) until the surrounding
    /// transaction ends, so two units touching the same wallet serialize on it
    /// instead of losing an update.
    pub(super) async fn shift_wallet_balance(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
        wallet_id: Uuid,
        delta_minor: i64,
    ) -> ResultEngine<()> {
        let result = wallets::Entity::update_many()
            .col_expr(
                wallets::Column::Balance,
                Expr::col(wallets::Column::Balance).add(delta_minor),
            )
            .filter(wallets::Column::Id.eq(wallet_id))
            .filter(wallets::Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("wallet doesn't exist".to_string()));
        }
        Ok(())
    }
}
