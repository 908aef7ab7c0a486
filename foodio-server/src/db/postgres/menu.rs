use async_trait::async_trait;
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate};
use sqlx::PgPool;

use crate::db::{MenuRepository, RepoError, RepoResult};

const COLUMNS: &str = "id, title, description, price, category, is_available, image_url";

#[derive(Clone)]
pub struct PgMenuRepository {
    pool: PgPool,
}

impl PgMenuRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MenuRepository for PgMenuRepository {
    async fn list(&self, category: Option<&str>) -> RepoResult<Vec<MenuItem>> {
        let items: Vec<MenuItem> = match category {
            Some(category) => {
                sqlx::query_as(&format!(
                    "SELECT {COLUMNS} FROM menu_items WHERE category = $1 ORDER BY id"
                ))
                .bind(category)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!("SELECT {COLUMNS} FROM menu_items ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(items)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<MenuItem>> {
        let item: Option<MenuItem> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM menu_items WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(item)
    }

    async fn find_many(&self, ids: &[i64]) -> RepoResult<Vec<MenuItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let items: Vec<MenuItem> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM menu_items WHERE id = ANY($1) ORDER BY id"
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn create(&self, data: MenuItemCreate) -> RepoResult<MenuItem> {
        let item: MenuItem = sqlx::query_as(&format!(
            "INSERT INTO menu_items (title, description, price, category, is_available, image_url)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        ))
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.price)
        .bind(&data.category)
        .bind(data.is_available.unwrap_or(true))
        .bind(data.image_url.as_deref().unwrap_or(""))
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    async fn update(&self, id: i64, data: MenuItemUpdate) -> RepoResult<MenuItem> {
        let item: Option<MenuItem> = sqlx::query_as(&format!(
            "UPDATE menu_items SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                category = COALESCE($5, category),
                is_available = COALESCE($6, is_available),
                image_url = COALESCE($7, image_url)
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.price)
        .bind(data.category)
        .bind(data.is_available)
        .bind(data.image_url)
        .fetch_optional(&self.pool)
        .await?;
        item.ok_or_else(|| RepoError::NotFound(format!("Menu item {id}")))
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("Menu item {id}")));
        }
        Ok(())
    }
}
