use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// Scheduling and attendance queries are short-lived row lookups, so a
/// modest pool with a fast acquire timeout is enough for one API node.
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(3))
        .idle_timeout(Duration::from_secs(300))
        .connect(database_url)
        .await
}
