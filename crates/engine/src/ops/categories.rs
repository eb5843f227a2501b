use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, SqlErr,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Category, EngineError, ResultEngine, categories, transactions,
    util::{normalize_category_key, normalize_required_name},
};

use super::{Engine, with_tx};

/// Maps a unique-index violation on `(user_id, name_norm)` to `ExistingKey`.
///
/// The explicit lookup catches the common case; this covers two requests
/// racing on the same name.
fn duplicate_name(err: DbErr, name: &str) -> EngineError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            EngineError::ExistingKey(format!("category '{name}'"))
        }
        _ => EngineError::Database(err),
    }
}

impl Engine {
    async fn ensure_category_name_free(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: Uuid,
        name_norm: &str,
        display: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .filter(categories::Column::NameNorm.eq(name_norm));
        if let Some(id) = except {
            query = query.filter(categories::Column::Id.ne(id));
        }
        if query.one(db_tx).await?.is_some() {
            return Err(EngineError::ExistingKey(format!("category '{display}'")));
        }
        Ok(())
    }

    /// Creates a category. Names are unique per user, ignoring case.
    pub async fn create_category(&self, user_id: Uuid, name: &str) -> ResultEngine<Category> {
        let name = normalize_required_name(name, "category")?;
        let name_norm = normalize_category_key(&name);
        with_tx!(self, |db_tx| {
            self.ensure_category_name_free(&db_tx, user_id, &name_norm, &name, None)
                .await?;

            let active = categories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                user_id: ActiveValue::Set(user_id),
                name: ActiveValue::Set(name.clone()),
                name_norm: ActiveValue::Set(name_norm),
            };
            let model = active
                .insert(&db_tx)
                .await
                .map_err(|err| duplicate_name(err, &name))?;
            tracing::debug!(category_id = %model.id, "category created");
            Ok(Category::from(model))
        })
    }

    /// Categories of the user sorted by name.
    pub async fn list_categories(&self, user_id: Uuid) -> ResultEngine<Vec<Category>> {
        with_tx!(self, |db_tx| {
            let models = categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id))
                .order_by_asc(categories::Column::Name)
                .order_by_asc(categories::Column::Id)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Category::from).collect())
        })
    }

    /// Renames a category.
    ///
    /// Renaming to a different casing of its own name is allowed; colliding
    /// with another category of the user is not.
    pub async fn update_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        name: &str,
    ) -> ResultEngine<Category> {
        let name = normalize_required_name(name, "category")?;
        let name_norm = normalize_category_key(&name);
        with_tx!(self, |db_tx| {
            self.require_category(&db_tx, user_id, category_id).await?;
            self.ensure_category_name_free(&db_tx, user_id, &name_norm, &name, Some(category_id))
                .await?;

            let active = categories::ActiveModel {
                id: ActiveValue::Unchanged(category_id),
                name: ActiveValue::Set(name.clone()),
                name_norm: ActiveValue::Set(name_norm),
                ..Default::default()
            };
            let model = active
                .update(&db_tx)
                .await
                .map_err(|err| duplicate_name(err, &name))?;
            tracing::debug!(%category_id, "category renamed");
            Ok(Category::from(model))
        })
    }

    /// Deletes a category that no transaction references.
    ///
    /// Returns `InUse` while at least one transaction still points at it.
    pub async fn delete_category(&self, user_id: Uuid, category_id: Uuid) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, user_id, category_id).await?;

            let references = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id))
                .filter(transactions::Column::CategoryId.eq(category_id))
                .count(&db_tx)
                .await?;
            if references > 0 {
                return Err(EngineError::InUse(format!(
                    "category '{}' is used by {references} transaction(s)",
                    model.name
                )));
            }

            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;
            tracing::debug!(%category_id, "category deleted");
            Ok(Category::from(model))
        })
    }
}
