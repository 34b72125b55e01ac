// Awskeyring — SQLCipher Database Backend
//
// Opens and initializes an encrypted SQLCipher database holding every stored
// record. The encryption key is derived from the master secret in the enclave
// module and is set via PRAGMA before any tables are accessed. Batch writes
// run inside a transaction.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::backend::SecretStoreBackend;
use super::models::{Attributes, EntryKind, Record};
use super::StoreError;
use crate::enclave::MasterKeyProvider;

/// Wrapper around a SQLCipher-encrypted SQLite connection.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) an encrypted database at the given path.
    /// The `hex_key` must be the hex-encoded 32-byte key derived from Argon2id.
    pub fn open(path: &Path, hex_key: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;

        conn.pragma_update(None, "key", format!("x'{}'", hex_key))?;

        // A wrong key surfaces here as "file is not a database"
        conn.execute_batch("SELECT count(*) FROM sqlite_master;")
            .map_err(|_| StoreError::InvalidKey)?;

        let db = Self { conn };
        db.run_migrations()?;

        tracing::debug!(path = %path.display(), "Opened encrypted credential database");
        Ok(db)
    }

    /// Open the database at `path`, keyed from the provider's master secret.
    /// The master secret is created on first use.
    pub fn unlock(path: &Path, provider: &dyn MasterKeyProvider) -> Result<Self, StoreError> {
        let master = provider.get_or_create_master_secret()?;
        let hex_key = provider.derive_db_key_hex(&master)?;
        Self::open(path, &hex_key)
    }

    /// Open an in-memory database (unencrypted, for testing only).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.run_migrations()?;
        Ok(db)
    }

    #[cfg(test)]
    fn conn(&self) -> &Connection {
        &self.conn
    }

    fn run_migrations(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS entries (
                kind        TEXT NOT NULL,
                label       TEXT NOT NULL,
                account     TEXT NOT NULL,
                comment     TEXT,
                updated_at  TEXT,
                expires_at  TEXT,
                secret      TEXT NOT NULL,
                PRIMARY KEY (kind, label)
            );
            ",
        )?;

        tracing::debug!("Database migrations completed successfully");
        Ok(())
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<Record> {
        let kind_str: String = row.get(0)?;
        let label: String = row.get(1)?;
        let account: String = row.get(2)?;
        let comment: Option<String> = row.get(3)?;
        let updated_at: Option<String> = row.get(4)?;
        let expires_at: Option<String> = row.get(5)?;
        let secret: String = row.get(6)?;

        let kind = EntryKind::parse(&kind_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                format!("unknown entry kind `{}`", kind_str).into(),
            )
        })?;

        Ok(Record::new(
            kind,
            label,
            Attributes {
                account,
                comment,
                updated_at: parse_timestamp(updated_at.as_deref(), 4)?,
                expires_at: parse_timestamp(expires_at.as_deref(), 5)?,
            },
            secret,
        ))
    }

    fn upsert(conn: &Connection, record: &Record) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT INTO entries (kind, label, account, comment, updated_at, expires_at, secret)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(kind, label) DO UPDATE SET
                account = excluded.account,
                comment = excluded.comment,
                updated_at = excluded.updated_at,
                expires_at = excluded.expires_at,
                secret = excluded.secret",
            params![
                record.kind.as_str(),
                record.label,
                record.attributes.account,
                record.attributes.comment,
                record.attributes.updated_at.map(|t| t.to_rfc3339()),
                record.attributes.expires_at.map(|t| t.to_rfc3339()),
                record.secret(),
            ],
        )
    }
}

/// Timestamps are stored as RFC 3339 text; anything else is a corrupt row.
fn parse_timestamp(value: Option<&str>, column: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    value
        .map(|s| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
                })
        })
        .transpose()
}

impl SecretStoreBackend for Database {
    fn save(&self, record: &Record) -> Result<(), StoreError> {
        Self::upsert(&self.conn, record)?;
        Ok(())
    }

    fn find(&self, kind: EntryKind, label: &str) -> Result<Option<Record>, StoreError> {
        let record = self
            .conn
            .query_row(
                "SELECT kind, label, account, comment, updated_at, expires_at, secret
                 FROM entries WHERE kind = ?1 AND label = ?2",
                params![kind.as_str(), label],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn delete(&self, kind: EntryKind, label: &str) -> Result<bool, StoreError> {
        let affected = self.conn.execute(
            "DELETE FROM entries WHERE kind = ?1 AND label = ?2",
            params![kind.as_str(), label],
        )?;
        Ok(affected > 0)
    }

    fn enumerate(&self, kind: EntryKind) -> Result<Vec<Record>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT kind, label, account, comment, updated_at, expires_at, secret
             FROM entries WHERE kind = ?1 ORDER BY label ASC",
        )?;

        let rows = stmt.query_map(params![kind.as_str()], Self::row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn save_all(&self, records: &[Record]) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        for record in records {
            Self::upsert(&tx, record)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_all(&self, keys: &[(EntryKind, &str)]) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut removed = 0;
        for &(kind, label) in keys {
            removed += tx.execute(
                "DELETE FROM entries WHERE kind = ?1 AND label = ?2",
                params![kind.as_str(), label],
            )?;
        }
        tx.commit()?;
        Ok(removed)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
