//! Wire types shared by the HTTP server and its clients.
//!
//! Money crosses the wire as signed integer minor units (cents). Dates are
//! RFC 3339 strings.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope wrapping every response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Success without payload.
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

pub mod user {
    use super::*;

    /// Body of register and login. `email` is only read on register.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Credentials {
        pub username: String,
        pub password: String,
        #[serde(default)]
        pub email: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserCreated {
        pub id: Uuid,
        pub username: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub email: Option<String>,
    }

    /// Returned on login; `token` goes into `Authorization: Bearer`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginView {
        pub token: String,
        pub user_id: Uuid,
        pub username: String,
        pub expires_at: DateTime<Utc>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryInput {
        pub name: String,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
    }
}

pub mod wallet {
    use super::*;

    /// Body of both create and update: update overwrites name and balance.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletInput {
        pub name: String,
        #[serde(default)]
        pub balance_minor: i64,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct WalletView {
        pub id: Uuid,
        pub name: String,
        pub balance_minor: i64,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TotalBalance {
        pub total_minor: i64,
    }
}

pub mod transaction {
    use super::*;

    /// Body of both create and update.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionInput {
        pub wallet_id: Uuid,
        pub category_id: Uuid,
        pub name: String,
        pub amount_minor: i64,
        /// Defaults to the time the request is handled.
        #[serde(default)]
        pub date: Option<DateTime<FixedOffset>>,
        #[serde(default)]
        pub description: Option<String>,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub wallet_id: Uuid,
        pub category_id: Uuid,
        pub name: String,
        pub amount_minor: i64,
        pub date: DateTime<Utc>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
    }

    /// Query string of `GET /transactions`.
    ///
    /// `start` and `end` take RFC 3339 or `YYYY-MM-DD`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionQuery {
        pub start: Option<String>,
        pub end: Option<String>,
        pub category_id: Option<Uuid>,
        pub wallet_id: Option<Uuid>,
        pub search: Option<String>,
    }

    /// Query string of `GET /transactions/date-range`, both `YYYY-MM-DD`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DateRangeQuery {
        pub start: Option<String>,
        pub end: Option<String>,
    }
}
