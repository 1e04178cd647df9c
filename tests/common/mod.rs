//! Common test utilities

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use pg_occupancy::store::{PostgresStore, Stores};
use pg_occupancy::OccupancyCoordinator;

/// Setup test database - truncate the occupancy tables
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    assert!(
        pg_occupancy::db::check_schema(&pool).await.expect("schema check failed"),
        "run migrations/001_initial_schema.sql first"
    );

    sqlx::query("TRUNCATE TABLE payments, guests, addresses, rooms, pg_stats CASCADE")
        .execute(&pool)
        .await
        .expect("Failed to clean up DB");

    pool
}

/// Coordinator over a freshly truncated database
pub async fn setup_coordinator() -> (Arc<PostgresStore>, OccupancyCoordinator) {
    let pool = setup_test_db().await;
    let store = Arc::new(PostgresStore::new(pool));
    let coordinator = OccupancyCoordinator::new(Stores::from_backend(store.clone()));
    (store, coordinator)
}
