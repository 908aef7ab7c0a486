//! PostgreSQL repositories

mod menu;
mod order;
mod user;

pub use menu::PgMenuRepository;
pub use order::PgOrderRepository;
pub use user::PgUserRepository;

/// Connect and apply embedded migrations
pub async fn connect(database_url: &str) -> Result<sqlx::PgPool, sqlx::Error> {
    let pool = sqlx::PgPool::connect(database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}
