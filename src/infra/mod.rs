use crate::{adapters::persistence::SqlitePersistence, infra::db::init_db};

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod rate_limit;
pub mod setup;

pub use error::InfraError;
pub use rate_limit::RateLimiterTrait;

pub async fn sqlite_persistence(database_url: &str) -> Result<SqlitePersistence, InfraError> {
    let pool = init_db(database_url).await?;
    Ok(SqlitePersistence::new(pool))
}
