//! # luthier-db
//!
//! PostgreSQL persistence for luthier.
//!
//! This crate provides:
//! - Connection pool management
//! - The insert-only `seed_instruments` repository, which implements
//!   [`luthier_core::RecordSink`]
//! - Schema migrations (feature `migrations`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use luthier_db::Database;
//! use luthier_core::RecordSink;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/luthier").await?;
//!     db.migrate().await?;
//!
//!     let id = db.seed_instruments.insert(&record).await?;
//!     println!("Stored instrument: {}", id);
//!     Ok(())
//! }
//! ```
pub mod pool;
pub mod seed_instruments;

pub use luthier_core::{Error, Result};
pub use pool::PoolConfig;
pub use seed_instruments::{PgSeedInstrumentRepository, SeedInstrumentSummary};

/// Combined database context.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Extracted instrument records.
    pub seed_instruments: PgSeedInstrumentRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            seed_instruments: PgSeedInstrumentRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect to the database with the default pool configuration.
    pub async fn connect(database_url: &str) -> Result<Self> {
        Self::connect_with_config(database_url, PoolConfig::default()).await
    }

    /// Connect with a custom pool configuration.
    pub async fn connect_with_config(database_url: &str, config: PoolConfig) -> Result<Self> {
        let pool = pool::connect(database_url, &config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }
}
