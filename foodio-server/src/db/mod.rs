//! Database access layer
//!
//! Repository traits for the catalog, identity and order stores, with a
//! PostgreSQL implementation ([`postgres`]) and a process-local one
//! ([`memory`]) used by tests and `STORAGE=memory` runs.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate, OrderStatus, Role, User};
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryDb;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound("row".to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.message().to_string())
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                RepoError::Validation("Referenced record does not exist".to_string())
            }
            sqlx::Error::Database(db) if db.is_check_violation() => {
                RepoError::Validation(db.message().to_string())
            }
            // numeric_value_out_of_range
            sqlx::Error::Database(db) if db.code().as_deref() == Some("22003") => {
                RepoError::Validation("Numeric value out of range".to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(what) => AppError::not_found(what),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Repository database error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// ── Identity records ──

/// A user together with the stored password hash
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    /// Already normalized
    pub email: String,
    pub name: String,
    pub address: Option<String>,
    pub password_hash: String,
    pub role: Role,
}

/// Partial user update; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub address: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

// ── Order records ──

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub menu_item_id: i64,
    pub quantity: i32,
    pub price: Decimal,
}

/// Order plus lines, written in one transaction
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: Uuid,
    pub user_id: i64,
    pub total: Decimal,
    pub address: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemRecord {
    pub id: i64,
    pub menu_item_id: i64,
    pub quantity: i32,
    pub price: Decimal,
}

/// Stored order, before menu item / owner expansion
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub id: Uuid,
    /// `None` once the owning user has been deleted
    pub user_id: Option<i64>,
    pub total: Decimal,
    pub address: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemRecord>,
}

// ── Repository traits ──

/// Catalog store
#[async_trait]
pub trait MenuRepository: Send + Sync {
    /// All items ordered by id, optionally restricted to one category
    async fn list(&self, category: Option<&str>) -> RepoResult<Vec<MenuItem>>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<MenuItem>>;
    /// Existing items among `ids`; missing ids are skipped
    async fn find_many(&self, ids: &[i64]) -> RepoResult<Vec<MenuItem>>;
    async fn create(&self, data: MenuItemCreate) -> RepoResult<MenuItem>;
    async fn update(&self, id: i64, data: MenuItemUpdate) -> RepoResult<MenuItem>;
    async fn delete(&self, id: i64) -> RepoResult<()>;
}

/// Identity store
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list(&self) -> RepoResult<Vec<User>>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<User>>;
    async fn find_many(&self, ids: &[i64]) -> RepoResult<Vec<User>>;
    async fn find_account_by_email(&self, email: &str) -> RepoResult<Option<UserAccount>>;
    /// Fails with `Duplicate` when the email is taken
    async fn create(&self, data: NewUser) -> RepoResult<User>;
    async fn update(&self, id: i64, changes: UserChanges) -> RepoResult<User>;
    /// Orders owned by the user keep a null owner
    async fn delete(&self, id: i64) -> RepoResult<()>;
}

/// Order store
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist the order and all its lines atomically
    async fn insert(&self, order: NewOrder) -> RepoResult<OrderRecord>;
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<OrderRecord>>;
    /// Newest first; `owner` restricts to one user's orders
    async fn list(&self, owner: Option<i64>) -> RepoResult<Vec<OrderRecord>>;
    /// Overwrite the status only
    async fn update_status(&self, id: Uuid, status: OrderStatus) -> RepoResult<OrderRecord>;
}

/// The three stores behind one handle
#[derive(Clone)]
pub struct Repositories {
    pub menu: Arc<dyn MenuRepository>,
    pub users: Arc<dyn UserRepository>,
    pub orders: Arc<dyn OrderRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        let db = Arc::new(MemoryDb::new());
        Self {
            menu: db.clone(),
            users: db.clone(),
            orders: db,
        }
    }

    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            menu: Arc::new(postgres::PgMenuRepository::new(pool.clone())),
            users: Arc::new(postgres::PgUserRepository::new(pool.clone())),
            orders: Arc::new(postgres::PgOrderRepository::new(pool)),
        }
    }
}
