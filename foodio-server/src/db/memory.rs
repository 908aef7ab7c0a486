//! In-memory storage
//!
//! Implements every repository trait over one `RwLock`ed table set, so an
//! order and its lines become visible together.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate, OrderStatus, User};
use uuid::Uuid;

use super::{
    MenuRepository, NewOrder, NewUser, OrderItemRecord, OrderRecord, OrderRepository, RepoError,
    RepoResult, UserAccount, UserChanges, UserRepository,
};

#[derive(Default)]
struct Tables {
    menu: BTreeMap<i64, MenuItem>,
    users: BTreeMap<i64, UserAccount>,
    /// Insertion order
    orders: Vec<OrderRecord>,
    next_menu_id: i64,
    next_user_id: i64,
    next_order_item_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Default)]
pub struct MemoryDb {
    tables: RwLock<Tables>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MenuRepository for MemoryDb {
    async fn list(&self, category: Option<&str>) -> RepoResult<Vec<MenuItem>> {
        let tables = self.tables.read();
        Ok(tables
            .menu
            .values()
            .filter(|item| category.is_none_or(|c| item.category == c))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<MenuItem>> {
        Ok(self.tables.read().menu.get(&id).cloned())
    }

    async fn find_many(&self, ids: &[i64]) -> RepoResult<Vec<MenuItem>> {
        let tables = self.tables.read();
        Ok(tables
            .menu
            .values()
            .filter(|item| ids.contains(&item.id))
            .cloned()
            .collect())
    }

    async fn create(&self, data: MenuItemCreate) -> RepoResult<MenuItem> {
        let mut tables = self.tables.write();
        let id = next_id(&mut tables.next_menu_id);
        let item = MenuItem {
            id,
            title: data.title,
            description: data.description,
            price: data.price,
            category: data.category,
            is_available: data.is_available.unwrap_or(true),
            image_url: data.image_url.unwrap_or_default(),
        };
        tables.menu.insert(id, item.clone());
        Ok(item)
    }

    async fn update(&self, id: i64, data: MenuItemUpdate) -> RepoResult<MenuItem> {
        let mut tables = self.tables.write();
        let item = tables
            .menu
            .get_mut(&id)
            .ok_or_else(|| RepoError::NotFound(format!("Menu item {id}")))?;
        data.apply_to(item);
        Ok(item.clone())
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        self.tables
            .write()
            .menu
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(format!("Menu item {id}")))
    }
}

#[async_trait]
impl UserRepository for MemoryDb {
    async fn list(&self) -> RepoResult<Vec<User>> {
        let tables = self.tables.read();
        Ok(tables.users.values().map(|a| a.user.clone()).collect())
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        Ok(self.tables.read().users.get(&id).map(|a| a.user.clone()))
    }

    async fn find_many(&self, ids: &[i64]) -> RepoResult<Vec<User>> {
        let tables = self.tables.read();
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id))
            .map(|a| a.user.clone())
            .collect())
    }

    async fn find_account_by_email(&self, email: &str) -> RepoResult<Option<UserAccount>> {
        let tables = self.tables.read();
        Ok(tables
            .users
            .values()
            .find(|a| a.user.email == email)
            .cloned())
    }

    async fn create(&self, data: NewUser) -> RepoResult<User> {
        let mut tables = self.tables.write();
        if tables.users.values().any(|a| a.user.email == data.email) {
            return Err(RepoError::Duplicate(format!("email {}", data.email)));
        }
        let id = next_id(&mut tables.next_user_id);
        let user = User {
            id,
            email: data.email,
            name: data.name,
            address: data.address,
            role: data.role,
        };
        tables.users.insert(
            id,
            UserAccount {
                user: user.clone(),
                password_hash: data.password_hash,
            },
        );
        Ok(user)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> RepoResult<User> {
        let mut tables = self.tables.write();
        let account = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| RepoError::NotFound(format!("User {id}")))?;
        if let Some(name) = changes.name {
            account.user.name = name;
        }
        if let Some(address) = changes.address {
            account.user.address = Some(address);
        }
        if let Some(hash) = changes.password_hash {
            account.password_hash = hash;
        }
        if let Some(role) = changes.role {
            account.user.role = role;
        }
        Ok(account.user.clone())
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        let mut tables = self.tables.write();
        if tables.users.remove(&id).is_none() {
            return Err(RepoError::NotFound(format!("User {id}")));
        }
        // ON DELETE SET NULL
        for order in tables.orders.iter_mut() {
            if order.user_id == Some(id) {
                order.user_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for MemoryDb {
    async fn insert(&self, order: NewOrder) -> RepoResult<OrderRecord> {
        let mut tables = self.tables.write();
        if !tables.users.contains_key(&order.user_id) {
            return Err(RepoError::Validation(
                "Referenced record does not exist".to_string(),
            ));
        }
        if tables.orders.iter().any(|o| o.id == order.id) {
            return Err(RepoError::Duplicate(format!("order {}", order.id)));
        }

        let mut items = Vec::with_capacity(order.items.len());
        for line in order.items {
            items.push(OrderItemRecord {
                id: next_id(&mut tables.next_order_item_id),
                menu_item_id: line.menu_item_id,
                quantity: line.quantity,
                price: line.price,
            });
        }

        let record = OrderRecord {
            id: order.id,
            user_id: Some(order.user_id),
            total: order.total,
            address: order.address,
            status: order.status,
            created_at: order.created_at,
            items,
        };
        tables.orders.push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<OrderRecord>> {
        let tables = self.tables.read();
        Ok(tables.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list(&self, owner: Option<i64>) -> RepoResult<Vec<OrderRecord>> {
        let tables = self.tables.read();
        // Reverse insertion order first so equal timestamps stay newest-first
        let mut orders: Vec<OrderRecord> = tables
            .orders
            .iter()
            .rev()
            .filter(|o| owner.is_none() || o.user_id == owner)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> RepoResult<OrderRecord> {
        let mut tables = self.tables.write();
        let order = tables
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| RepoError::NotFound(format!("Order {id}")))?;
        order.status = status;
        Ok(order.clone())
    }
}
