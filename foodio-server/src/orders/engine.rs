//! Order engine
//!
//! Places orders, reads them back with ownership checks and drives status
//! changes. The caller is always passed in explicitly.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    MAX_AMOUNT, MenuItem, Order, OrderItem, OrderLineInput, OrderMenuItem, OrderOwner,
    OrderStatus, PlaceOrderRequest, User, fits_money_column, needs_profile_address,
};
use uuid::Uuid;

use super::policy::{PricingPolicy, StatusPolicy};
use crate::auth::CurrentUser;
use crate::db::{
    MenuRepository, NewOrder, NewOrderItem, OrderRecord, OrderRepository, Repositories,
    UserRepository,
};

pub struct OrderEngine {
    menu: Arc<dyn MenuRepository>,
    users: Arc<dyn UserRepository>,
    orders: Arc<dyn OrderRepository>,
    pricing: PricingPolicy,
    status_policy: StatusPolicy,
}

impl OrderEngine {
    pub fn new(repos: &Repositories, pricing: PricingPolicy, status_policy: StatusPolicy) -> Self {
        Self {
            menu: repos.menu.clone(),
            users: repos.users.clone(),
            orders: repos.orders.clone(),
            pricing,
            status_policy,
        }
    }

    pub fn pricing_policy(&self) -> PricingPolicy {
        self.pricing
    }

    pub fn status_policy(&self) -> StatusPolicy {
        self.status_policy
    }

    /// Create an order with its lines for the caller
    ///
    /// A missing, blank or placeholder address falls back to the caller's
    /// profile address, and to an empty string when there is none.
    pub async fn place(&self, req: PlaceOrderRequest, caller: &CurrentUser) -> AppResult<Order> {
        req.check()?;

        let (items, total) = match self.pricing {
            PricingPolicy::TrustClient => (
                req.items
                    .iter()
                    .map(|line| NewOrderItem {
                        menu_item_id: line.menu_item_id,
                        quantity: line.quantity,
                        price: line.price,
                    })
                    .collect(),
                req.total,
            ),
            PricingPolicy::Catalog => self.price_from_catalog(&req.items, req.total).await?,
        };

        let address = self.resolve_address(req.address.as_deref(), caller).await?;

        let new_order = NewOrder {
            id: Uuid::new_v4(),
            user_id: caller.id,
            total,
            address,
            status: OrderStatus::Pending,
            created_at: shared::util::now_utc(),
            items,
        };
        let record = self.orders.insert(new_order).await?;

        tracing::info!(
            order_id = %record.id,
            user_id = caller.id,
            items = record.items.len(),
            total = %record.total,
            "Order placed"
        );

        self.expand_one(record).await
    }

    /// Admins see every order, everyone else only their own; newest first
    pub async fn list(&self, caller: &CurrentUser) -> AppResult<Vec<Order>> {
        let owner = (!caller.is_admin()).then_some(caller.id);
        let records = self.orders.list(owner).await?;
        self.expand(records).await
    }

    pub async fn get_by_id(&self, order_id: Uuid, caller: &CurrentUser) -> AppResult<Order> {
        let record = self.find_record(order_id).await?;

        if !caller.is_admin() && record.user_id != Some(caller.id) {
            crate::security_log!(
                WARN,
                "order_access_denied",
                order_id = %order_id,
                user_id = caller.id
            );
            return Err(AppError::new(ErrorCode::OrderAccessDenied)
                .with_detail("order_id", order_id.to_string()));
        }

        self.expand_one(record).await
    }

    /// Replace the status of an order; admin gating happens at the route
    ///
    /// An unrecognized label fails before anything is read or written.
    pub async fn update_status(
        &self,
        order_id: Uuid,
        status: &str,
        caller: &CurrentUser,
    ) -> AppResult<Order> {
        let new_status = OrderStatus::parse_label(status)?;
        let record = self.find_record(order_id).await?;

        self.status_policy.check(record.status, new_status)?;
        if record.status == new_status {
            return self.expand_one(record).await;
        }

        let updated = self.orders.update_status(order_id, new_status).await?;
        tracing::info!(
            order_id = %order_id,
            from = %record.status,
            status = %new_status,
            changed_by = caller.id,
            "Order status updated"
        );

        self.expand_one(updated).await
    }

    async fn find_record(&self, order_id: Uuid) -> AppResult<OrderRecord> {
        self.orders.find_by_id(order_id).await?.ok_or_else(|| {
            AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id.to_string())
        })
    }

    async fn resolve_address(
        &self,
        submitted: Option<&str>,
        caller: &CurrentUser,
    ) -> AppResult<String> {
        if !needs_profile_address(submitted) {
            return Ok(submitted.map(str::trim).unwrap_or_default().to_string());
        }

        let profile = self.users.find_by_id(caller.id).await?;
        let address = profile
            .as_ref()
            .and_then(User::delivery_address)
            .unwrap_or_default()
            .to_string();
        if address.is_empty() {
            tracing::debug!(user_id = caller.id, "No delivery address available, storing empty");
        }
        Ok(address)
    }

    /// Catalog prices for every line, and the recomputed total
    async fn price_from_catalog(
        &self,
        lines: &[OrderLineInput],
        client_total: Decimal,
    ) -> AppResult<(Vec<NewOrderItem>, Decimal)> {
        let ids: Vec<i64> = lines.iter().map(|l| l.menu_item_id).collect();
        let catalog: HashMap<i64, MenuItem> = self
            .menu
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();

        let mut items = Vec::with_capacity(lines.len());
        let mut total = Decimal::ZERO;
        for line in lines {
            let item = catalog.get(&line.menu_item_id).ok_or_else(|| {
                AppError::validation(format!("Menu item {} does not exist", line.menu_item_id))
                    .with_detail("menu_item_id", line.menu_item_id)
            })?;
            if !item.is_available {
                return Err(AppError::with_message(
                    ErrorCode::MenuItemUnavailable,
                    format!("{} is not available", item.title),
                )
                .with_detail("menu_item_id", item.id));
            }
            total = item
                .price
                .checked_mul(Decimal::from(line.quantity))
                .and_then(|subtotal| total.checked_add(subtotal))
                .filter(|sum| fits_money_column(*sum))
                .ok_or_else(total_out_of_range)?;
            items.push(NewOrderItem {
                menu_item_id: item.id,
                quantity: line.quantity,
                price: item.price,
            });
        }

        if total != client_total {
            return Err(AppError::new(ErrorCode::OrderTotalMismatch)
                .with_detail("expected", total.to_string())
                .with_detail("received", client_total.to_string()));
        }
        Ok((items, total))
    }

    async fn expand_one(&self, record: OrderRecord) -> AppResult<Order> {
        let id = record.id;
        self.expand(vec![record]).await?.pop().ok_or_else(|| {
            AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", id.to_string())
        })
    }

    /// Attach menu items and owners with one lookup per store
    async fn expand(&self, records: Vec<OrderRecord>) -> AppResult<Vec<Order>> {
        let mut menu_ids: Vec<i64> = records
            .iter()
            .flat_map(|r| r.items.iter().map(|i| i.menu_item_id))
            .collect();
        menu_ids.sort_unstable();
        menu_ids.dedup();

        let mut user_ids: Vec<i64> = records.iter().filter_map(|r| r.user_id).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let menu: HashMap<i64, MenuItem> = self
            .menu
            .find_many(&menu_ids)
            .await?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();
        let users: HashMap<i64, User> = self
            .users
            .find_many(&user_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        Ok(records
            .into_iter()
            .map(|record| to_order(record, &menu, &users))
            .collect())
    }
}

fn total_out_of_range() -> AppError {
    AppError::validation(format!("Order total exceeds {MAX_AMOUNT}")).with_detail("field", "total")
}

fn to_order(
    record: OrderRecord,
    menu: &HashMap<i64, MenuItem>,
    users: &HashMap<i64, User>,
) -> Order {
    let user = record
        .user_id
        .and_then(|id| users.get(&id))
        .map(|u| OrderOwner {
            id: u.id,
            name: u.name.clone(),
            email: Some(u.email.clone()),
        });

    let items = record
        .items
        .into_iter()
        .map(|line| OrderItem {
            id: line.id,
            menu_item_id: line.menu_item_id,
            quantity: line.quantity,
            price: line.price,
            menu_item: menu.get(&line.menu_item_id).map(|m| OrderMenuItem {
                id: m.id,
                title: m.title.clone(),
                price: m.price,
                image_url: m.image_url.clone(),
            }),
        })
        .collect();

    Order {
        id: record.id,
        user,
        items,
        total: record.total,
        status: record.status,
        address: record.address,
        created_at: record.created_at,
    }
}
