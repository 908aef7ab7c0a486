use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::models::OrderStatus;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{NewOrder, OrderItemRecord, OrderRecord, OrderRepository, RepoError, RepoResult};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Option<i64>,
    total: Decimal,
    address: String,
    status: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: i64,
    order_id: Uuid,
    menu_item_id: i64,
    quantity: i32,
    price: Decimal,
}

impl From<OrderItemRow> for OrderItemRecord {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: row.id,
            menu_item_id: row.menu_item_id,
            quantity: row.quantity,
            price: row.price,
        }
    }
}

fn into_record(row: OrderRow, items: Vec<OrderItemRecord>) -> RepoResult<OrderRecord> {
    let status: OrderStatus = row.status.parse().map_err(RepoError::Database)?;
    Ok(OrderRecord {
        id: row.id,
        user_id: row.user_id,
        total: row.total,
        address: row.address,
        status,
        created_at: row.created_at,
        items,
    })
}

#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the lines of many orders with one query
    async fn load_items(&self, order_ids: &[Uuid]) -> RepoResult<HashMap<Uuid, Vec<OrderItemRecord>>> {
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            "SELECT id, order_id, menu_item_id, quantity, price
             FROM order_items WHERE order_id = ANY($1) ORDER BY id",
        )
        .bind(order_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<OrderItemRecord>> = HashMap::new();
        for row in rows {
            grouped.entry(row.order_id).or_default().push(row.into());
        }
        Ok(grouped)
    }

    async fn attach_items(&self, rows: Vec<OrderRow>) -> RepoResult<Vec<OrderRecord>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut items = if ids.is_empty() {
            HashMap::new()
        } else {
            self.load_items(&ids).await?
        };
        rows.into_iter()
            .map(|row| {
                let lines = items.remove(&row.id).unwrap_or_default();
                into_record(row, lines)
            })
            .collect()
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn insert(&self, order: NewOrder) -> RepoResult<OrderRecord> {
        let mut tx = self.pool.begin().await?;

        let row: OrderRow = sqlx::query_as(
            "INSERT INTO orders (id, user_id, total, address, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, user_id, total, address, status, created_at",
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(order.total)
        .bind(&order.address)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(order.items.len());
        for line in &order.items {
            let item: OrderItemRow = sqlx::query_as(
                "INSERT INTO order_items (order_id, menu_item_id, quantity, price)
                 VALUES ($1, $2, $3, $4)
                 RETURNING id, order_id, menu_item_id, quantity, price",
            )
            .bind(order.id)
            .bind(line.menu_item_id)
            .bind(line.quantity)
            .bind(line.price)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item.into());
        }

        tx.commit().await?;
        into_record(row, items)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<OrderRecord>> {
        let row: Option<OrderRow> = sqlx::query_as(
            "SELECT id, user_id, total, address, status, created_at FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.attach_items(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list(&self, owner: Option<i64>) -> RepoResult<Vec<OrderRecord>> {
        let rows: Vec<OrderRow> = match owner {
            Some(user_id) => {
                sqlx::query_as(
                    "SELECT id, user_id, total, address, status, created_at FROM orders
                     WHERE user_id = $1 ORDER BY created_at DESC",
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT id, user_id, total, address, status, created_at FROM orders
                     ORDER BY created_at DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        self.attach_items(rows).await
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> RepoResult<OrderRecord> {
        let row: Option<OrderRow> = sqlx::query_as(
            "UPDATE orders SET status = $2 WHERE id = $1
             RETURNING id, user_id, total, address, status, created_at",
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or_else(|| RepoError::NotFound(format!("Order {id}")))?;
        self.attach_items(vec![row])
            .await?
            .pop()
            .ok_or_else(|| RepoError::NotFound(format!("Order {id}")))
    }
}
