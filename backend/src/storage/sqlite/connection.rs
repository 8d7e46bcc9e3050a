use anyhow::{Context, Result};
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// DbConnection owns the single long-lived SQLite connection
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (creating if needed) the database at `url` and set up the schema
    pub async fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid SQLite URL: {}", url))?;
        Self::connect(options).await
    }

    /// Open the database file at `path`
    pub async fn open(path: &Path) -> Result<Self> {
        info!("Opening SQLite database at {}", path.display());
        let options = SqliteConnectOptions::new().filename(path);
        Self::connect(options).await
    }

    /// Private in-memory database, used by tests
    pub async fn in_memory() -> Result<Self> {
        Self::new("sqlite::memory:").await
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self> {
        let options = options.create_if_missing(true).foreign_keys(true);

        // One connection kept open for the whole process; an in-memory
        // database lives exactly as long as it does.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to connect to SQLite")?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Create every table if missing; runs on each startup
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS compras (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                fecha TEXT NOT NULL,
                proveedor TEXT NOT NULL,
                monto REAL NOT NULL,
                identificador_producto TEXT NOT NULL,
                cliente TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS empleados (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nombre TEXT NOT NULL,
                puesto TEXT NOT NULL,
                fecha_ingreso TEXT NOT NULL,
                sueldo REAL NOT NULL,
                sucursal TEXT NOT NULL,
                contacto_mail TEXT NOT NULL,
                celular TEXT NOT NULL,
                fecha_de_baja TEXT NOT NULL DEFAULT ''
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS Productos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nombre TEXT NOT NULL,
                sku TEXT NOT NULL UNIQUE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS Lotes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                producto_sku TEXT NOT NULL,
                cantidad INTEGER NOT NULL,
                fecha_creacion TEXT NOT NULL,
                FOREIGN KEY (producto_sku) REFERENCES Productos (sku) ON DELETE RESTRICT
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_lotes_producto_sku
            ON Lotes(producto_sku);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ControlesCalidad (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                lote_id INTEGER NOT NULL,
                parametro TEXT NOT NULL,
                valor REAL NOT NULL,
                aprobado INTEGER NOT NULL,
                timestamp TEXT NOT NULL,
                FOREIGN KEY (lote_id) REFERENCES Lotes (id) ON DELETE RESTRICT
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_controles_lote_id
            ON ControlesCalidad(lote_id);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
