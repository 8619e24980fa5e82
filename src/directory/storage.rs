//! Durable storage for accounts.
//!
//! The directory talks to storage through [`AccountStore`], a minimal
//! insert/lookup seam. The Postgres implementation leans on the UNIQUE
//! constraint on `username` to arbitrate concurrent inserts, so two racing
//! signups for the same name resolve to exactly one row.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::Instrument;

use super::{Account, AccountType};

pub(crate) const ACCOUNTS_SCHEMA_SQL: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

/// Outcome when attempting to insert a new account.
#[derive(Debug)]
pub enum InsertOutcome {
    Created,
    DuplicateUsername,
}

/// Minimal storage contract: insert-if-absent and point lookup by username.
#[async_trait]
pub trait AccountStore: Send + Sync + std::fmt::Debug {
    async fn insert(&self, account: &Account) -> Result<InsertOutcome>;
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>>;
}

#[derive(Debug)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert(&self, account: &Account) -> Result<InsertOutcome> {
        let query = r"
            INSERT INTO accounts
                (firstname, lastname, username, password_hash, user_key, account_type)
            VALUES ($1, $2, $3, $4, $5, $6)
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );

        match sqlx::query(query)
            .bind(&account.firstname)
            .bind(&account.lastname)
            .bind(&account.username)
            .bind(&account.password_hash)
            .bind(account.user_key)
            .bind(account.account_type.as_str())
            .execute(&self.pool)
            .instrument(span)
            .await
        {
            Ok(_) => Ok(InsertOutcome::Created),
            Err(err) if is_username_conflict(&err) => Ok(InsertOutcome::DuplicateUsername),
            Err(err) => Err(err).context("failed to insert account"),
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let query = r"
            SELECT firstname, lastname, username, password_hash, user_key, account_type
            FROM accounts
            WHERE username = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );

        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to look up account")?;

        row.map(|row| {
            let tag: String = row.get("account_type");
            let account_type = AccountType::parse(&tag)
                .with_context(|| format!("unknown account type in storage: {tag}"))?;

            Ok(Account {
                firstname: row.get("firstname"),
                lastname: row.get("lastname"),
                username: row.get("username"),
                password_hash: row.get("password_hash"),
                user_key: row.get("user_key"),
                account_type,
            })
        })
        .transpose()
    }
}

/// Apply the accounts schema. Runs once at startup, before the listener
/// opens, so request handling never races table creation.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    for (index, statement) in split_sql_statements(ACCOUNTS_SCHEMA_SQL).iter().enumerate() {
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DDL",
            db.statement = statement.as_str()
        );

        sqlx::query(statement)
            .execute(pool)
            .instrument(span)
            .await
            .with_context(|| format!("failed to execute schema statement {}", index + 1))?;
    }

    Ok(())
}

const USERNAME_CONSTRAINT: &str = "accounts_username_key";

/// A unique violation (SQLSTATE 23505) counts as a username conflict only
/// when it names the username constraint. A violation of another unique
/// index, like `accounts_user_key_key`, stays a storage fault instead of
/// masquerading as a 409. Drivers that omit the constraint name still map
/// the sqlstate.
pub(crate) fn is_username_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().is_some_and(|code| code.as_ref() == "23505")
                && db_err
                    .constraint()
                    .map_or(true, |name| name == USERNAME_CONSTRAINT)
        }
        _ => false,
    }
}

// Statement boundaries are taken at lines ending in ';'. That is enough for
// the DDL in sql/schema.sql; a semicolon inside a string literal or behind a
// trailing comment would split incorrectly.
fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        current.push_str(line);
        current.push('\n');

        if line.trim().ends_with(';') {
            let statement = current.trim();
            if !statement.is_empty() {
                statements.push(statement.to_string());
            }
            current.clear();
        }
    }

    let leftover = current.trim();
    if !leftover.is_empty() {
        statements.push(leftover.to_string());
    }

    statements
}
