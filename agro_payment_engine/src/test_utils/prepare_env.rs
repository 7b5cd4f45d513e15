use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::SqliteDatabase;

/// Loads `.env.test`, starts logging and creates a fresh, migrated database at `url`.
pub async fn prepare_test_env(url: &str) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await
}

/// A database URL in the system temp directory that no other test uses.
pub fn random_db_path() -> String {
    let path = std::env::temp_dir().join(format!("agro_test_{}.db", rand::random::<u64>()));
    format!("sqlite://{}", path.display())
}

pub async fn run_migrations(url: &str) -> SqliteDatabase {
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
    db
}

pub async fn create_database(url: &str) {
    if let Err(e) = Sqlite::drop_database(url).await {
        trace!("Could not drop database {url}: {e:?}");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    info!("🚀️ Created Sqlite database {url}");
}

/// Adds a fulfillment location directly. Store management is outside the workflow engine.
pub async fn seed_store(db: &SqliteDatabase, code: &str, name: &str, address: &str) {
    sqlx::query("INSERT INTO stores (code, name, address) VALUES ($1, $2, $3)")
        .bind(code)
        .bind(name)
        .bind(address)
        .execute(db.pool())
        .await
        .expect("Error seeding store");
}
