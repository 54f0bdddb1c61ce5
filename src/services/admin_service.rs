use serde_json::{Map, Value};

use crate::{
    audit::log_audit,
    dto::{
        menu::MenuItemRequest,
        orders::{DashboardStats, OrderList, UpdateOrderStatusRequest, UpdatePaymentStatusRequest},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{MenuItem, Order, OrderStatus, PaymentStatus},
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    state::AppState,
    store::{Store, StoreError, keys, read_list, record_str, update_list},
};

/// Applies `patch` to the stored order `id` and returns the patched order.
/// Every other stored order, and every field `patch` does not touch, is
/// written back exactly as it was read.
fn patch_order<F>(store: &dyn Store, id: &str, mut patch: F) -> AppResult<Order>
where
    F: FnMut(&mut Map<String, Value>) -> AppResult<()>,
{
    update_list(store, keys::ORDERS, |records: &mut Vec<Value>| {
        let record = records
            .iter_mut()
            .find(|r| record_str(r, "id") == Some(id))
            .and_then(Value::as_object_mut)
            .ok_or(AppError::NotFound)?;
        patch(record)?;
        serde_json::from_value(Value::Object(record.clone())).map_err(|_| {
            AppError::from(StoreError::Corrupt {
                key: keys::ORDERS.to_string(),
            })
        })
    })
}

/// Replaces the status of one stored order, leaving every other field as is.
///
/// With `strict` set only forward moves and cancellation of a live order
/// are accepted.
pub fn set_order_status(
    store: &dyn Store,
    id: &str,
    status: OrderStatus,
    strict: bool,
) -> AppResult<Order> {
    patch_order(store, id, |record| {
        let current = record
            .get("status")
            .and_then(|v| serde_json::from_value::<OrderStatus>(v.clone()).ok())
            .unwrap_or_default();
        if strict && !current.can_transition_to(status) {
            return Err(AppError::BadRequest(format!(
                "cannot move order from {} to {}",
                current.as_str(),
                status.as_str()
            )));
        }
        record.insert("status".into(), serde_json::to_value(status).map_err(StoreError::from)?);
        Ok(())
    })
}

pub fn set_payment_status(
    store: &dyn Store,
    id: &str,
    payment_status: PaymentStatus,
) -> AppResult<Order> {
    patch_order(store, id, |record| {
        let value = serde_json::to_value(payment_status).map_err(StoreError::from)?;
        record.insert("payment_status".into(), value);
        Ok(())
    })
}

/// Status filter plus a case-insensitive search over id, name and email,
/// and a plain substring search over the phone number.
pub fn filter_orders(
    orders: Vec<Order>,
    status: Option<OrderStatus>,
    query: Option<&str>,
) -> Vec<Order> {
    let query = query.map(str::trim).filter(|q| !q.is_empty());
    let lowered = query.map(str::to_lowercase);
    orders
        .into_iter()
        .filter(|o| status.is_none_or(|s| o.status == s))
        .filter(|o| match (query, lowered.as_deref()) {
            (Some(raw), Some(q)) => {
                o.id.to_lowercase().contains(q)
                    || o.customer_name.to_lowercase().contains(q)
                    || o.customer_email.to_lowercase().contains(q)
                    || o.customer_phone.contains(raw)
            }
            _ => true,
        })
        .collect()
}

pub fn dashboard_stats(orders: &[Order]) -> DashboardStats {
    DashboardStats {
        total_revenue: orders.iter().fold(0, |sum, o| sum.saturating_add(o.total)),
        total_orders: orders.len(),
        pending_orders: orders.iter().filter(|o| o.status == OrderStatus::Pending).count(),
        completed_orders: orders
            .iter()
            .filter(|o| o.status == OrderStatus::Delivered)
            .count(),
        recent_orders: orders.iter().take(5).cloned().collect(),
    }
}

pub async fn dashboard(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<DashboardStats>> {
    ensure_admin(user)?;
    let orders = read_list::<Order>(state.store.as_ref(), keys::ORDERS)?;
    Ok(ApiResponse::success(
        "Dashboard",
        dashboard_stats(&orders.items),
        Some(Meta::empty()),
    ))
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let orders = read_list::<Order>(state.store.as_ref(), keys::ORDERS)?;
    let filtered = filter_orders(orders.items, query.status, query.q.as_deref());
    let total = filtered.len() as i64;

    let items = filtered
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let orders = read_list::<Order>(state.store.as_ref(), keys::ORDERS)?;
    let order = orders
        .items
        .into_iter()
        .find(|o| o.id == id)
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Order found", order, Some(Meta::empty())))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let order = set_order_status(
        state.store.as_ref(),
        id,
        payload.status,
        state.config.strict_order_transitions,
    )?;

    log_audit(
        Some(&user.0),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    );

    Ok(ApiResponse::success("Order updated", order, Some(Meta::empty())))
}

pub async fn update_payment_status(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    payload: UpdatePaymentStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let order = set_payment_status(state.store.as_ref(), id, payload.payment_status)?;

    log_audit(
        Some(&user.0),
        "order_payment_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "payment_status": order.payment_status })),
    );

    Ok(ApiResponse::success("Order updated", order, Some(Meta::empty())))
}

pub async fn create_menu_item(
    state: &AppState,
    user: &AuthUser,
    payload: MenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    ensure_admin(user)?;
    let item = state.catalog.write().await.create(payload)?;
    log_audit(
        Some(&user.0),
        "menu_create",
        Some("menu_items"),
        Some(serde_json::json!({ "item_id": item.id })),
    );
    Ok(ApiResponse::success("Menu item created", item, Some(Meta::empty())))
}

pub async fn update_menu_item(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    payload: MenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    ensure_admin(user)?;
    let item = state.catalog.write().await.update(id, payload)?;
    log_audit(
        Some(&user.0),
        "menu_update",
        Some("menu_items"),
        Some(serde_json::json!({ "item_id": item.id })),
    );
    Ok(ApiResponse::success("Menu item updated", item, Some(Meta::empty())))
}

pub async fn delete_menu_item(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<ApiResponse<MenuItem>> {
    ensure_admin(user)?;
    let item = state.catalog.write().await.delete(id)?;
    log_audit(
        Some(&user.0),
        "menu_delete",
        Some("menu_items"),
        Some(serde_json::json!({ "item_id": item.id })),
    );
    Ok(ApiResponse::success("Menu item deleted", item, Some(Meta::empty())))
}

pub async fn toggle_menu_item(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<ApiResponse<MenuItem>> {
    ensure_admin(user)?;
    let item = state.catalog.write().await.toggle_availability(id)?;
    log_audit(
        Some(&user.0),
        "menu_availability",
        Some("menu_items"),
        Some(serde_json::json!({ "item_id": item.id, "is_available": item.is_available })),
    );
    Ok(ApiResponse::success("Menu item updated", item, Some(Meta::empty())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentMethod;
    use chrono::{TimeZone, Utc};

    fn order(id: &str, name: &str, email: &str, phone: &str, status: OrderStatus, total: i64) -> Order {
        Order {
            id: id.to_string(),
            customer_name: name.to_string(),
            customer_email: email.to_string(),
            customer_phone: phone.to_string(),
            delivery_address: "Bonapriso, Douala".to_string(),
            payment_method: PaymentMethod::Cash,
            notes: String::new(),
            items: Vec::new(),
            subtotal: total,
            delivery_fee: 0,
            total,
            status,
            payment_status: PaymentStatus::Pending,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    fn sample() -> Vec<Order> {
        vec![
            order("ORD-3", "Marie Ngo", "marie@example.com", "+237 677 11 22 33", OrderStatus::Pending, 3500),
            order("ORD-2", "Paul Biya", "PAUL@example.com", "+237 699 00 00 00", OrderStatus::Delivered, 2000),
            order("ORD-1", "Awa Sow", "awa@example.com", "+237 655 44 55 66", OrderStatus::Pending, 1500),
        ]
    }

    fn ids(orders: &[Order]) -> Vec<&str> {
        orders.iter().map(|o| o.id.as_str()).collect()
    }

    #[test]
    fn filter_by_status() {
        let pending = filter_orders(sample(), Some(OrderStatus::Pending), None);
        assert_eq!(ids(&pending), vec!["ORD-3", "ORD-1"]);

        let everything = filter_orders(sample(), None, Some("   "));
        assert_eq!(everything.len(), 3);
    }

    #[test]
    fn search_is_case_insensitive_over_id_name_and_email() {
        assert_eq!(ids(&filter_orders(sample(), None, Some("paul@EXAMPLE"))), vec!["ORD-2"]);
        assert_eq!(ids(&filter_orders(sample(), None, Some("awa sow"))), vec!["ORD-1"]);
        assert_eq!(ids(&filter_orders(sample(), None, Some("ord-3"))), vec!["ORD-3"]);
    }

    #[test]
    fn search_matches_phone_substring() {
        assert_eq!(ids(&filter_orders(sample(), None, Some("655 44"))), vec!["ORD-1"]);
        assert!(filter_orders(sample(), Some(OrderStatus::Delivered), Some("655")).is_empty());
    }

    #[test]
    fn dashboard_counts_and_recent_orders() {
        let mut orders = sample();
        for n in 4..=7 {
            orders.push(order(&format!("ORD-0{n}"), "X", "x@example.com", "1", OrderStatus::Cancelled, 100));
        }

        let stats = dashboard_stats(&orders);
        assert_eq!(stats.total_orders, 7);
        assert_eq!(stats.total_revenue, 3500 + 2000 + 1500 + 400);
        assert_eq!(stats.pending_orders, 2);
        assert_eq!(stats.completed_orders, 1);
        assert_eq!(
            ids(&stats.recent_orders),
            vec!["ORD-3", "ORD-2", "ORD-1", "ORD-04", "ORD-05"]
        );
    }

    #[test]
    fn dashboard_revenue_saturates() {
        let orders = vec![
            order("ORD-1", "A", "a@example.com", "1", OrderStatus::Pending, i64::MAX),
            order("ORD-2", "B", "b@example.com", "2", OrderStatus::Pending, 10),
        ];
        assert_eq!(dashboard_stats(&orders).total_revenue, i64::MAX);
    }
}
