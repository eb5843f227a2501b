#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{CreateTransactionCmd, Engine, MoneyCents, Transaction, TxFields, Wallet};
use migration::MigratorTrait;
use uuid::Uuid;

/// bcrypt's lowest accepted cost; keeps hashing fast under test.
pub const TEST_BCRYPT_COST: u32 = 4;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .password_cost(TEST_BCRYPT_COST)
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub async fn register(engine: &Engine, username: &str) -> Uuid {
    engine.register_user(username, "correct horse").await.unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub async fn wallet(engine: &Engine, user_id: Uuid, name: &str, balance: i64) -> Wallet {
    engine
        .create_wallet(user_id, name, MoneyCents::new(balance))
        .await
        .unwrap()
}

pub async fn spend(
    engine: &Engine,
    user_id: Uuid,
    wallet_id: Uuid,
    category_id: Uuid,
    name: &str,
    amount: i64,
    occurred_at: DateTime<Utc>,
) -> Transaction {
    engine
        .create_transaction(CreateTransactionCmd::new(
            user_id,
            TxFields::new(
                wallet_id,
                category_id,
                name,
                MoneyCents::new(amount),
                occurred_at,
            ),
        ))
        .await
        .unwrap()
}

pub async fn balance_of(engine: &Engine, user_id: Uuid, wallet_id: Uuid) -> i64 {
    engine.wallet(user_id, wallet_id).await.unwrap().balance.cents()
}

/// Sum of the wallet's transactions as seen through the query side.
pub async fn ledger_sum(engine: &Engine, user_id: Uuid, wallet_id: Uuid) -> i64 {
    engine
        .wallet_transactions(user_id, wallet_id)
        .await
        .unwrap()
        .iter()
        .map(|tx| tx.amount.cents())
        .sum()
}
