//! The account directory.
//!
//! Owns the mapping from username to credential record and exposes the two
//! operations with a real contract: [`Directory::register`] and
//! [`Directory::authenticate`]. Storage is injected through
//! [`storage::AccountStore`] so the core stays independent of the Postgres
//! wiring.

pub mod password;
pub mod storage;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use self::storage::{AccountStore, InsertOutcome};

/// Account types the directory accepts at registration. Closed allow-list,
/// recorded as informational metadata and echoed back on login.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Standard,
    Admin,
    Service,
}

impl AccountType {
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "standard" => Some(Self::Standard),
            "admin" => Some(Self::Admin),
            "service" => Some(Self::Service),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Admin => "admin",
            Self::Service => "service",
        }
    }
}

/// A stored account record. Created once by register, read by authenticate,
/// never mutated.
#[derive(Debug, Clone)]
pub struct Account {
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    /// Argon2id PHC string, never the plaintext.
    pub password_hash: String,
    /// Opaque caller-facing handle, assigned once at creation.
    pub user_key: Uuid,
    pub account_type: AccountType,
}

/// Input to [`Directory::register`]. `account_type` arrives as the raw tag
/// and is validated against the allow-list here, at the boundary.
#[derive(Debug)]
pub struct Registration {
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub password: SecretString,
    pub account_type: Option<String>,
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Malformed or missing input; the caller can correct and retry.
    #[error("{0}")]
    Validation(&'static str),
    /// Username is taken; the caller can pick another.
    #[error("Username already exists")]
    Conflict,
    /// Bad credentials. Unknown username and wrong password produce this
    /// same value so callers cannot enumerate accounts.
    #[error("Invalid username or password")]
    Authentication,
    /// Underlying store fault. The source is logged, never surfaced.
    #[error("storage fault")]
    Storage(#[from] anyhow::Error),
}

/// The account directory, generic over its storage backend.
#[derive(Debug, Clone)]
pub struct Directory {
    store: Arc<dyn AccountStore>,
}

impl Directory {
    #[must_use]
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Register a new account and return its freshly issued `user_key`.
    ///
    /// Uniqueness is arbitrated by the store: the insert either lands or
    /// reports a duplicate, so concurrent registrations for the same
    /// username resolve to exactly one success and no partial writes.
    ///
    /// # Errors
    /// `Validation` for missing/empty fields or an unknown account type,
    /// `Conflict` when the username is taken, `Storage` for store faults.
    pub async fn register(&self, registration: Registration) -> Result<Uuid, DirectoryError> {
        let Registration {
            firstname,
            lastname,
            username,
            password,
            account_type,
        } = registration;
        let password = password.expose_secret();

        if firstname.is_empty() || lastname.is_empty() || username.is_empty() || password.is_empty()
        {
            return Err(DirectoryError::Validation("All fields are required"));
        }

        let account_type = match account_type {
            None => AccountType::default(),
            Some(tag) => AccountType::parse(&tag)
                .ok_or(DirectoryError::Validation("Invalid account type"))?,
        };

        let password_hash = password::hash(password).await?;
        let user_key = fresh_user_key();

        let account = Account {
            firstname,
            lastname,
            username,
            password_hash,
            user_key,
            account_type,
        };

        match self.store.insert(&account).await? {
            InsertOutcome::Created => Ok(user_key),
            InsertOutcome::DuplicateUsername => Err(DirectoryError::Conflict),
        }
    }

    /// Authenticate a login attempt, returning the stored `user_key` and
    /// account type on success.
    ///
    /// # Errors
    /// `Validation` for missing/empty fields, `Authentication` for an
    /// unknown username or a wrong password (indistinguishably), `Storage`
    /// for store faults.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(Uuid, AccountType), DirectoryError> {
        if username.is_empty() || password.is_empty() {
            return Err(DirectoryError::Validation(
                "Both username and password are required",
            ));
        }

        match self.store.find_by_username(username).await? {
            Some(account) => {
                if password::verify(password, &account.password_hash).await {
                    Ok((account.user_key, account.account_type))
                } else {
                    Err(DirectoryError::Authentication)
                }
            }
            None => {
                // Burn a verification against the phantom record so an
                // unknown username costs the same as a wrong password.
                let _ = password::verify(password, password::PHANTOM_HASH).await;

                Err(DirectoryError::Authentication)
            }
        }
    }
}

/// Issue a fresh opaque user key: 128 random bits from the OS CSPRNG,
/// rendered canonically as a UUID.
fn fresh_user_key() -> Uuid {
    Uuid::new_v4()
}

#[cfg(test)]
pub(crate) mod testing {
    use super::storage::{AccountStore, InsertOutcome};
    use super::Account;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory stand-in for Postgres that mirrors the UNIQUE(username)
    /// behavior of the accounts table.
    #[derive(Debug, Default)]
    pub(crate) struct MemoryStore {
        accounts: Mutex<HashMap<String, Account>>,
    }

    impl MemoryStore {
        pub(crate) fn len(&self) -> usize {
            self.accounts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AccountStore for MemoryStore {
        async fn insert(&self, account: &Account) -> Result<InsertOutcome> {
            let mut accounts = self.accounts.lock().unwrap();

            if accounts.contains_key(&account.username) {
                return Ok(InsertOutcome::DuplicateUsername);
            }

            accounts.insert(account.username.clone(), account.clone());

            Ok(InsertOutcome::Created)
        }

        async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
            Ok(self.accounts.lock().unwrap().get(username).cloned())
        }
    }
}
