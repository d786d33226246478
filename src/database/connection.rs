use crate::config::DatabaseConfig;
use crate::error::AppResult;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use std::time::Duration;

/// 各服务共享的连接池句柄
pub type DbPool = Arc<DatabaseConnection>;

pub async fn create_pool(config: &DatabaseConfig) -> AppResult<DbPool> {
    let mut opts = ConnectOptions::new(config.url.clone());
    opts.max_connections(config.max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let pool = Database::connect(opts).await?;
    Ok(Arc::new(pool))
}

pub async fn run_migrations(pool: &DbPool) -> AppResult<()> {
    Migrator::up(pool.as_ref(), None).await?;
    Ok(())
}
