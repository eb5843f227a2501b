//! Credential service: registration, login and token resolution.
//!
//! Tokens are opaque random UUIDs stored in `sessions` with an expiry. The
//! rest of the engine only ever sees the `user_id` they resolve to.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, SqlErr, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, sessions, users, util::fold_text};

use super::{Engine, with_tx};

const MIN_USERNAME_CHARS: usize = 3;
const MAX_USERNAME_CHARS: usize = 64;
const MIN_PASSWORD_CHARS: usize = 8;
const MAX_EMAIL_CHARS: usize = 254;

/// A resolved bearer token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

fn normalize_username(username: &str) -> ResultEngine<String> {
    let trimmed = username.trim();
    let len = trimmed.chars().count();
    if !(MIN_USERNAME_CHARS..=MAX_USERNAME_CHARS).contains(&len) {
        return Err(EngineError::InvalidName(format!(
            "username must be between {MIN_USERNAME_CHARS} and {MAX_USERNAME_CHARS} characters"
        )));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(EngineError::InvalidName(
            "username must not contain whitespace".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Optional contact address. Blank means none; anything else must look like
/// `local@domain`.
fn normalize_email(email: Option<&str>) -> ResultEngine<Option<String>> {
    let Some(email) = email.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if email.chars().count() > MAX_EMAIL_CHARS {
        return Err(EngineError::InvalidEmail(format!(
            "email must be at most {MAX_EMAIL_CHARS} characters"
        )));
    }
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !well_formed {
        return Err(EngineError::InvalidEmail(format!("'{email}' is not an address")));
    }
    Ok(Some(email.to_string()))
}

fn validate_password(password: &str) -> ResultEngine<()> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(EngineError::InvalidPassword(format!(
            "password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }
    Ok(())
}

impl Engine {
    async fn find_user_by_username(
        &self,
        db_tx: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::UsernameNorm.eq(fold_text(username)))
            .one(db_tx)
            .await
            .map_err(Into::into)
    }

    /// Registers a new user without an email address and returns its id.
    pub async fn register_user(&self, username: &str, password: &str) -> ResultEngine<Uuid> {
        self.register_user_with_email(username, password, None).await
    }

    /// Registers a new user and returns its id.
    ///
    /// Usernames are unique ignoring case, non-ASCII letters included.
    pub async fn register_user_with_email(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> ResultEngine<Uuid> {
        let username = normalize_username(username)?;
        let email = normalize_email(email)?;
        validate_password(password)?;
        let password_hash = bcrypt::hash(password, self.password_cost)?;
        with_tx!(self, |db_tx| {
            if self.find_user_by_username(&db_tx, &username).await?.is_some() {
                return Err(EngineError::ExistingKey(format!("user '{username}'")));
            }

            let user_id = Uuid::new_v4();
            users::ActiveModel {
                id: ActiveValue::Set(user_id),
                username: ActiveValue::Set(username.clone()),
                username_norm: ActiveValue::Set(fold_text(&username)),
                email: ActiveValue::Set(email),
                password_hash: ActiveValue::Set(password_hash),
            }
            .insert(&db_tx)
            .await
            .map_err(|err| match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    EngineError::ExistingKey(format!("user '{username}'"))
                }
                _ => EngineError::Database(err),
            })?;
            tracing::info!(%user_id, %username, "user registered");
            Ok(user_id)
        })
    }

    /// Checks credentials and issues a fresh session token.
    ///
    /// Unknown usernames and wrong passwords fail the same way.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<Session> {
        let username = username.trim();
        with_tx!(self, |db_tx| {
            let Some(user) = self.find_user_by_username(&db_tx, username).await? else {
                return Err(EngineError::InvalidCredentials);
            };
            if !bcrypt::verify(password, &user.password_hash)? {
                return Err(EngineError::InvalidCredentials);
            }

            let now = Utc::now();
            sessions::Entity::delete_many()
                .filter(sessions::Column::UserId.eq(user.id))
                .filter(sessions::Column::ExpiresAt.lte(now))
                .exec(&db_tx)
                .await?;

            let session = Session {
                token: Uuid::new_v4().simple().to_string(),
                user_id: user.id,
                username: user.username,
                expires_at: now + self.session_ttl,
            };
            sessions::ActiveModel {
                token: ActiveValue::Set(session.token.clone()),
                user_id: ActiveValue::Set(session.user_id),
                expires_at: ActiveValue::Set(session.expires_at),
            }
            .insert(&db_tx)
            .await?;
            tracing::debug!(user_id = %session.user_id, "session issued");
            Ok(session)
        })
    }

    /// Resolves a bearer token to its session.
    ///
    /// Unknown and expired tokens both yield `Unauthorized`.
    pub async fn identity(&self, token: &str) -> ResultEngine<Session> {
        with_tx!(self, |db_tx| {
            let Some((session, Some(user))) = sessions::Entity::find_by_id(token.to_string())
                .find_also_related(users::Entity)
                .one(&db_tx)
                .await?
            else {
                return Err(EngineError::Unauthorized);
            };
            if session.expires_at <= Utc::now() {
                return Err(EngineError::Unauthorized);
            }
            Ok(Session {
                token: session.token,
                user_id: user.id,
                username: user.username,
                expires_at: session.expires_at,
            })
        })
    }

    /// Looks up a user id by username, ignoring case.
    pub async fn user_id(&self, username: &str) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            self.find_user_by_username(&db_tx, username.trim())
                .await?
                .map(|user| user.id)
                .ok_or_else(|| EngineError::KeyNotFound("user doesn't exist".to_string()))
        })
    }

    /// Replaces a user's password and revokes all of their sessions.
    pub async fn reset_password(&self, username: &str, password: &str) -> ResultEngine<()> {
        validate_password(password)?;
        let password_hash = bcrypt::hash(password, self.password_cost)?;
        with_tx!(self, |db_tx| {
            let user = self
                .find_user_by_username(&db_tx, username.trim())
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user doesn't exist".to_string()))?;

            users::ActiveModel {
                id: ActiveValue::Unchanged(user.id),
                password_hash: ActiveValue::Set(password_hash),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            sessions::Entity::delete_many()
                .filter(sessions::Column::UserId.eq(user.id))
                .exec(&db_tx)
                .await?;
            tracing::info!(user_id = %user.id, "password reset");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_is_trimmed_and_bounded() {
        assert_eq!(normalize_username("  alice ").unwrap(), "alice");
        assert!(matches!(
            normalize_username("al"),
            Err(EngineError::InvalidName(_))
        ));
        assert!(matches!(
            normalize_username(&"a".repeat(65)),
            Err(EngineError::InvalidName(_))
        ));
        assert!(matches!(
            normalize_username("al ice"),
            Err(EngineError::InvalidName(_))
        ));
    }

    #[test]
    fn short_password_is_rejected() {
        assert_eq!(
            validate_password("short"),
            Err(EngineError::InvalidPassword(
                "password must be at least 8 characters".to_string()
            ))
        );
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn email_is_optional_but_checked() {
        assert_eq!(normalize_email(None).unwrap(), None);
        assert_eq!(normalize_email(Some("  ")).unwrap(), None);
        assert_eq!(
            normalize_email(Some(" alice@example.org ")).unwrap(),
            Some("alice@example.org".to_string())
        );
        for bad in ["alice", "@example.org", "alice@", "a@b@c", "al ice@example.org"] {
            assert!(
                matches!(normalize_email(Some(bad)), Err(EngineError::InvalidEmail(_))),
                "{bad}"
            );
        }
    }
}
