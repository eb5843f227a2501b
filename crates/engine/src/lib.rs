//! Core of TrackIt: wallets, categories and transactions scoped per user.
//!
//! Every operation takes the caller's `user_id` explicitly and runs inside a
//! single database transaction. Transaction writes always move the affected
//! wallet balances in the same unit, so a wallet balance equals the sum of its
//! transactions' amounts between operations.

pub use categories::Category;
pub use commands::{CreateTransactionCmd, TxFields, UpdateTransactionCmd};
pub use error::EngineError;
pub use money::{MAX_ABS_CENTS, MoneyCents};
pub use ops::{Engine, EngineBuilder, Session, TransactionFilter, end_of_day, start_of_day};
pub use transactions::Transaction;
pub use wallets::Wallet;

mod categories;
mod commands;
mod error;
mod money;
mod ops;
mod sessions;
mod transactions;
mod users;
mod util;
mod wallets;

type ResultEngine<T> = Result<T, EngineError>;
