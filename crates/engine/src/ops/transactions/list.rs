use chrono::NaiveDate;
use uuid::Uuid;

use sea_orm::{
    Condition, QueryFilter, QueryOrder, Select, TransactionTrait, prelude::*,
    sea_query::{Expr, LikeExpr},
};

use crate::{
    ResultEngine, Transaction, transactions,
    util::{contains_pattern, fold_text},
};

use super::super::{Engine, with_tx};
use super::TransactionFilter;

trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, filter: &TransactionFilter) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(mut self, filter: &TransactionFilter) -> Self {
        if let Some(from) = filter.from {
            self = self.filter(transactions::Column::OccurredAt.gte(from));
        }
        if let Some(to) = filter.to {
            self = self.filter(transactions::Column::OccurredAt.lte(to));
        }
        if let Some(category_id) = filter.category_id {
            self = self.filter(transactions::Column::CategoryId.eq(category_id));
        }
        if let Some(wallet_id) = filter.wallet_id {
            self = self.filter(transactions::Column::WalletId.eq(wallet_id));
        }
        if let Some(term) = filter.search_term() {
            // Folded columns: SQLite's LOWER() only knows ASCII.
            let pattern = contains_pattern(&fold_text(term));
            let matches = |col: transactions::Column| {
                Expr::col(col).like(LikeExpr::new(pattern.clone()).escape('\\'))
            };
            self = self.filter(
                Condition::any()
                    .add(matches(transactions::Column::NameNorm))
                    .add(matches(transactions::Column::DescriptionNorm)),
            );
        }
        self
    }
}

/// Every transaction of `user_id`, newest first.
fn owned_newest_first(user_id: Uuid) -> Select<transactions::Entity> {
    transactions::Entity::find()
        .filter(transactions::Column::UserId.eq(user_id))
        .order_by_desc(transactions::Column::OccurredAt)
        .order_by_desc(transactions::Column::Id)
}

impl Engine {
    /// Return a single transaction owned by `user_id`.
    pub async fn transaction(&self, user_id: Uuid, transaction_id: Uuid) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction(&db_tx, user_id, transaction_id)
                .await?;
            Ok(Transaction::from(model))
        })
    }

    /// All transactions of the user, newest first.
    pub async fn list_transactions(&self, user_id: Uuid) -> ResultEngine<Vec<Transaction>> {
        self.filter_transactions(user_id, &TransactionFilter::default())
            .await
    }

    /// Transactions matching every present field of `filter`, newest first.
    ///
    /// An inverted date range is rejected before the store is queried.
    pub async fn filter_transactions(
        &self,
        user_id: Uuid,
        filter: &TransactionFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        filter.validate()?;
        with_tx!(self, |db_tx| {
            let models = owned_newest_first(user_id)
                .apply_tx_filters(filter)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Transaction::from).collect())
        })
    }

    /// Transactions between two calendar days, both inclusive.
    pub async fn transactions_in_date_range(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ResultEngine<Vec<Transaction>> {
        self.filter_transactions(user_id, &TransactionFilter::for_days(start, end))
            .await
    }

    /// Transactions of one wallet, oldest first.
    ///
    /// A wallet the user doesn't own yields an empty list, same as one that
    /// has no transactions.
    pub async fn wallet_transactions(
        &self,
        user_id: Uuid,
        wallet_id: Uuid,
    ) -> ResultEngine<Vec<Transaction>> {
        with_tx!(self, |db_tx| {
            let models = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id))
                .filter(transactions::Column::WalletId.eq(wallet_id))
                .order_by_asc(transactions::Column::OccurredAt)
                .order_by_asc(transactions::Column::Id)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Transaction::from).collect())
        })
    }
}
