use chrono::TimeDelta;
use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod access;
mod balances;
mod categories;
mod transactions;
mod users;
mod wallets;

pub use transactions::{TransactionFilter, end_of_day, start_of_day};
pub use users::Session;

const DEFAULT_SESSION_TTL_MINUTES: i64 = 60;

/// Evaluates `$body` with `$tx` bound to a fresh database transaction and
/// commits only if the body returned `Ok`.
///
/// Dropping an uncommitted `DatabaseTransaction` rolls it back, so an early
/// `return Err(..)` from the body discards every write made through `$tx`.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    session_ttl: TimeDelta,
    password_cost: u32,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// Configures an [`Engine`]. Every setting has a default except the
/// database connection.
pub struct EngineBuilder {
    database: DatabaseConnection,
    session_ttl: TimeDelta,
    password_cost: u32,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            session_ttl: TimeDelta::minutes(DEFAULT_SESSION_TTL_MINUTES),
            password_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl EngineBuilder {
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// How long a token issued by `authenticate` stays valid.
    pub fn session_ttl(mut self, ttl: TimeDelta) -> EngineBuilder {
        self.session_ttl = ttl;
        self
    }

    /// bcrypt cost used when hashing passwords.
    pub fn password_cost(mut self, cost: u32) -> EngineBuilder {
        self.password_cost = cost;
        self
    }

    /// Finishes the builder. Does not touch the database.
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            session_ttl: self.session_ttl,
            password_cost: self.password_cost,
        })
    }
}
