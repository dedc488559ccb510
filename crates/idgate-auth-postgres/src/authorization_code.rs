//! Authorization code storage.
//!
//! Rows whose `expire_at` has passed are invisible to every read and to
//! `consume`, whether or not `delete_expired` has removed them yet.

use std::collections::HashSet;

use idgate_auth::oauth::AuthorizationCode;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{PgPool, StorageError, StorageResult};

// =============================================================================
// Types
// =============================================================================

/// Authorization code row as selected from the database.
type CodeTuple = (
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Vec<String>,
    OffsetDateTime,
    OffsetDateTime,
);

fn from_tuple(row: CodeTuple) -> AuthorizationCode {
    AuthorizationCode {
        id: Some(row.0),
        code: row.1,
        client_id: row.2,
        subject: row.3,
        redirect_uri: row.4,
        scopes: row.5.into_iter().collect::<HashSet<_>>(),
        created_at: row.6,
        expire_at: row.7,
    }
}

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS authorization_codes (
        id TEXT PRIMARY KEY,
        code TEXT NOT NULL,
        client_id TEXT NOT NULL,
        subject TEXT,
        redirect_uri TEXT,
        scopes TEXT[] NOT NULL DEFAULT '{}',
        created_at TIMESTAMPTZ NOT NULL,
        expire_at TIMESTAMPTZ NOT NULL,
        CHECK (expire_at > created_at)
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS authorization_codes_code_idx ON authorization_codes (code)",
    "CREATE INDEX IF NOT EXISTS authorization_codes_expire_at_idx ON authorization_codes (expire_at)",
];

// =============================================================================
// Authorization Code Storage
// =============================================================================

/// Authorization code storage operations.
pub struct AuthorizationCodeStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> AuthorizationCodeStorage<'a> {
    /// Create a new authorization code storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create the table and indexes if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if a DDL statement fails.
    pub async fn ensure_schema(&self) -> StorageResult<()> {
        for statement in SCHEMA {
            query(statement).execute(self.pool).await?;
        }
        Ok(())
    }

    /// Insert a code, generating an id when it has none.
    ///
    /// An expired row holding the same code value is overwritten in the same
    /// statement; a live one is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidInput` if `expire_at` is not after
    /// `created_at`, `StorageError::Conflict` if the code value is already
    /// live or the id is taken, or a database error.
    pub async fn create(&self, code: &AuthorizationCode) -> StorageResult<AuthorizationCode> {
        if !code.has_valid_lifetime() {
            return Err(StorageError::invalid_input(
                "Authorization code must expire after it is created",
            ));
        }

        let id = code
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut scopes: Vec<String> = code.scopes.iter().cloned().collect();
        scopes.sort_unstable();

        let row: Option<CodeTuple> = query_as(
            r#"
            INSERT INTO authorization_codes
                (id, code, client_id, subject, redirect_uri, scopes, created_at, expire_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (code) DO UPDATE
            SET id = EXCLUDED.id,
                client_id = EXCLUDED.client_id,
                subject = EXCLUDED.subject,
                redirect_uri = EXCLUDED.redirect_uri,
                scopes = EXCLUDED.scopes,
                created_at = EXCLUDED.created_at,
                expire_at = EXCLUDED.expire_at
            WHERE authorization_codes.expire_at <= NOW()
            RETURNING id, code, client_id, subject, redirect_uri, scopes, created_at, expire_at
            "#,
        )
        .bind(&id)
        .bind(&code.code)
        .bind(&code.client_id)
        .bind(code.subject.as_deref())
        .bind(code.redirect_uri.as_deref())
        .bind(scopes)
        .bind(code.created_at)
        .bind(code.expire_at)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            if let sqlx_core::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StorageError::conflict(format!(
                    "Authorization code with id '{}' already exists",
                    id
                ));
            }
            StorageError::from(e)
        })?;

        row.map(from_tuple)
            .ok_or_else(|| StorageError::conflict("Authorization code already exists"))
    }

    /// Find a live code by value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_code(&self, code: &str) -> StorageResult<Option<AuthorizationCode>> {
        let row: Option<CodeTuple> = query_as(
            r#"
            SELECT id, code, client_id, subject, redirect_uri, scopes, created_at, expire_at
            FROM authorization_codes
            WHERE code = $1
              AND expire_at > NOW()
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(from_tuple))
    }

    /// Delete a live code by value and return it, in one statement.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn consume(&self, code: &str) -> StorageResult<Option<AuthorizationCode>> {
        let row: Option<CodeTuple> = query_as(
            r#"
            DELETE FROM authorization_codes
            WHERE code = $1
              AND expire_at > NOW()
            RETURNING id, code, client_id, subject, redirect_uri, scopes, created_at, expire_at
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(from_tuple))
    }

    /// Delete a code by id and return it, regardless of expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn delete(&self, id: &str) -> StorageResult<Option<AuthorizationCode>> {
        let row: Option<CodeTuple> = query_as(
            r#"
            DELETE FROM authorization_codes
            WHERE id = $1
            RETURNING id, code, client_id, subject, redirect_uri, scopes, created_at, expire_at
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(from_tuple))
    }

    /// Delete expired codes.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete_expired(&self) -> StorageResult<u64> {
        let result = query(
            r#"
            DELETE FROM authorization_codes
            WHERE expire_at <= NOW()
            "#,
        )
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
