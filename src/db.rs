use crate::error::AuthError;
use crate::models::{Role, User};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::time::Duration;

/// Bumped whenever `SCHEMA` changes.
const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'admin'
);";

const MAX_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 120;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Users keyed by email, stored in a single SQLite file.
pub struct CredentialStore {
    conn: Mutex<Connection>,
    hash_cost: u32,
    // Verified against on unknown emails so both failure paths cost one bcrypt check.
    dummy_hash: String,
}

impl CredentialStore {
    /// Create or upgrade the schema. Safe to run repeatedly.
    pub fn migrate(db_path: &Path) -> Result<(), AuthError> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch(SCHEMA)?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        tracing::info!(path = %db_path.display(), version = SCHEMA_VERSION, "schema migrated");
        Ok(())
    }

    /// Open an already-migrated database.
    pub fn open(db_path: &Path, hash_cost: u32) -> Result<Self, AuthError> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
        if version < SCHEMA_VERSION {
            return Err(AuthError::SchemaMissing);
        }

        Ok(Self {
            conn: Mutex::new(conn),
            hash_cost,
            dummy_hash: bcrypt::hash("not-a-real-password", hash_cost)?,
        })
    }

    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::validation(
                "name, email and password are required",
            ));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(AuthError::validation(format!(
                "name must be at most {MAX_NAME_LEN} characters"
            )));
        }
        if email.chars().count() > MAX_EMAIL_LEN {
            return Err(AuthError::validation(format!(
                "email must be at most {MAX_EMAIL_LEN} characters"
            )));
        }

        let password_hash = bcrypt::hash(password, self.hash_cost)?;
        let role = Role::default();

        // Uniqueness is left to the UNIQUE constraint so racing inserts
        // resolve inside SQLite.
        let conn = self.conn.lock();
        let inserted = conn.execute(
            "INSERT INTO users (name, email, password_hash, role) VALUES (?1, ?2, ?3, ?4)",
            params![name, email, password_hash, role],
        );

        match inserted {
            Ok(_) => Ok(User {
                id: conn.last_insert_rowid(),
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
                role,
            }),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Err(AuthError::DuplicateEmail)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::validation("Email and password are required"));
        }

        let found = {
            let conn = self.conn.lock();
            conn.query_row(
                "SELECT id, name, email, password_hash, role FROM users WHERE email = ?1",
                params![email],
                user_from_row,
            )
            .optional()?
        };

        match found {
            Some(user) => {
                if bcrypt::verify(password, &user.password_hash)? {
                    Ok(user)
                } else {
                    Err(AuthError::InvalidCredentials)
                }
            }
            None => {
                let _ = bcrypt::verify(password, &self.dummy_hash);
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: row.get(4)?,
    })
}
