use std::ops::{Deref, DerefMut};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use futures::lock::{Mutex, MutexGuard};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, SqlitePool};
use tracing::info;

use crate::auth::password::hash_password;
use crate::error::AppResult;

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "Admin@123";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Process-wide store handle.
///
/// Cloning is cheap; all clones share the pool and the writer lock.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
    writer: Arc<Mutex<()>>,
}

impl Db {
    /// Opens (creating if missing) the database file, applies the schema
    /// and seeds the default admin.
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;

        Self::init(pool).await
    }

    /// Private in-memory database on a single pinned connection.
    pub async fn in_memory() -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::init(pool).await
    }

    async fn init(pool: SqlitePool) -> AppResult<Self> {
        let db = Self {
            pool,
            writer: Arc::new(Mutex::new(())),
        };
        ensure_schema(&db.pool).await?;
        seed_admin(&db.pool).await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Serializes writers whose read-then-write must not interleave.
    pub async fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().await
    }

    /// Starts a `BEGIN IMMEDIATE` transaction.
    ///
    /// The write lock is taken up front (waiting out other writers for
    /// up to the busy timeout), so reads inside the transaction can never
    /// go stale before its writes.
    pub async fn begin_immediate(&self) -> AppResult<ImmediateTx> {
        let mut tx = ImmediateTx {
            conn: Some(self.pool.acquire().await?),
            finished: false,
        };
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *tx).await?;
        Ok(tx)
    }
}

/// An open `BEGIN IMMEDIATE` transaction on a pooled connection.
///
/// Dropped without [`commit`](Self::commit) or [`rollback`](Self::rollback)
/// (a cancelled request, a failed `COMMIT`), the connection is taken out of
/// the pool and closed, which rolls the transaction back.
pub struct ImmediateTx {
    conn: Option<PoolConnection<Sqlite>>,
    finished: bool,
}

impl ImmediateTx {
    pub async fn commit(mut self) -> AppResult<()> {
        sqlx::query("COMMIT").execute(&mut *self).await?;
        self.finished = true;
        Ok(())
    }

    pub async fn rollback(mut self) -> AppResult<()> {
        sqlx::query("ROLLBACK").execute(&mut *self).await?;
        self.finished = true;
        Ok(())
    }
}

impl Deref for ImmediateTx {
    type Target = SqliteConnection;

    fn deref(&self) -> &SqliteConnection {
        self.conn.as_deref().expect("connection held until drop")
    }
}

impl DerefMut for ImmediateTx {
    fn deref_mut(&mut self) -> &mut SqliteConnection {
        self.conn.as_deref_mut().expect("connection held until drop")
    }
}

impl Drop for ImmediateTx {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take().filter(|_| !self.finished) {
            drop(conn.detach());
        }
    }
}

/// Creates the tables if needed. Safe to call on every startup.
pub async fn ensure_schema(pool: &SqlitePool) -> AppResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS students (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT,
            phone TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS courses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            base_amount INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS enrollments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id INTEGER NOT NULL,
            course_id INTEGER NOT NULL,
            invoice_number TEXT NOT NULL,
            invoice_date TEXT NOT NULL,
            gst_rate INTEGER NOT NULL DEFAULT 18,
            amount_paid INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            pan TEXT,
            FOREIGN KEY(student_id) REFERENCES students(id),
            FOREIGN KEY(course_id) REFERENCES courses(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_enrollments_invoice_number ON enrollments(invoice_number)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS payments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            enrollment_id INTEGER NOT NULL,
            amount INTEGER NOT NULL,
            payment_date TEXT NOT NULL,
            note TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(enrollment_id) REFERENCES enrollments(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Makes sure at least one account can log in.
async fn seed_admin(pool: &SqlitePool) -> AppResult<()> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM users LIMIT 1")
        .fetch_optional(pool)
        .await?;

    if existing.is_none() {
        let hash = hash_password(DEFAULT_ADMIN_PASSWORD)?;
        sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(DEFAULT_ADMIN_USERNAME)
            .bind(hash)
            .execute(pool)
            .await?;

        info!(
            username = DEFAULT_ADMIN_USERNAME,
            "Created default admin user (password: {DEFAULT_ADMIN_PASSWORD})"
        );
    }

    Ok(())
}
