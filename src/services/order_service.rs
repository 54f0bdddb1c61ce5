use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
    audit::log_audit,
    dto::orders::{CheckoutRequest, TrackQuery},
    error::{AppError, AppResult},
    ids::millis_id,
    models::{Language, Order, OrderLine, OrderStatus, PaymentStatus},
    response::{ApiResponse, Meta},
    services::cart_service::CartManager,
    state::AppState,
    store::{Store, StoreError, keys, read_list, record_str, update_list},
};

/// Turns the cart into a pending order, stores it in front of the order
/// list and empties the cart.
pub fn place_order(
    store: &dyn Store,
    cart: &mut CartManager,
    language: Language,
    payload: CheckoutRequest,
    delivery_fee: i64,
    now: DateTime<Utc>,
) -> AppResult<Order> {
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }
    validate_checkout(&payload)?;

    let items: Vec<OrderLine> = cart
        .items()
        .iter()
        .map(|line| OrderLine {
            id: line.item.id.clone(),
            name: line.item.name(language).to_string(),
            price: line.item.price,
            quantity: line.quantity,
        })
        .collect();
    let subtotal = cart.cart_total();
    let total = subtotal
        .checked_add(delivery_fee)
        .ok_or_else(|| AppError::BadRequest("Order total is too large".into()))?;

    let order = update_list(store, keys::ORDERS, |records: &mut Vec<Value>| {
        let id = millis_id("ORD-", now, |id| {
            records.iter().any(|r| record_str(r, "id") == Some(id))
        });
        let order = Order {
            id,
            customer_name: payload.customer_name.clone(),
            customer_email: payload.customer_email.clone(),
            customer_phone: payload.customer_phone.clone(),
            delivery_address: payload.delivery_address.clone(),
            payment_method: payload.payment_method,
            notes: payload.notes.clone(),
            items: items.clone(),
            subtotal,
            delivery_fee,
            total,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            created_at: now,
        };
        let record = serde_json::to_value(&order).map_err(StoreError::from)?;
        records.insert(0, record);
        Ok::<_, AppError>(order)
    })?;

    cart.clear_cart()?;
    Ok(order)
}

fn validate_checkout(payload: &CheckoutRequest) -> AppResult<()> {
    let required = [
        ("customer_name", &payload.customer_name),
        ("customer_email", &payload.customer_email),
        ("customer_phone", &payload.customer_phone),
        ("delivery_address", &payload.delivery_address),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(())
}

pub fn find_order<'a>(orders: &'a [Order], id: &str) -> Option<&'a Order> {
    orders.iter().find(|o| o.id == id)
}

/// First order whose id contains `query` or whose email equals it,
/// both compared case-insensitively.
pub fn track<'a>(orders: &'a [Order], query: &str) -> Option<&'a Order> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }
    orders.iter().find(|o| {
        o.id.to_lowercase().contains(&query) || o.customer_email.to_lowercase() == query
    })
}

pub async fn checkout(
    state: &AppState,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<Order>> {
    let language = state.language.lock().await.language();
    let mut cart = state.cart.lock().await;

    let order = place_order(
        state.store.as_ref(),
        &mut cart,
        language,
        payload,
        state.config.delivery_fee,
        Utc::now(),
    )?;

    tracing::info!(order_id = %order.id, total = order.total, "order placed");
    log_audit(
        state.auth.current_user().as_ref(),
        "checkout",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "total": order.total })),
    );

    Ok(ApiResponse::success(
        "Checkout success",
        order,
        Some(Meta::empty()),
    ))
}

pub async fn get_order(state: &AppState, id: &str) -> AppResult<ApiResponse<Order>> {
    let orders = read_list::<Order>(state.store.as_ref(), keys::ORDERS)?;
    let order = find_order(&orders.items, id)
        .cloned()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok(order))
}

pub async fn track_order(state: &AppState, query: TrackQuery) -> AppResult<ApiResponse<Order>> {
    let orders = read_list::<Order>(state.store.as_ref(), keys::ORDERS)?;
    let order = track(&orders.items, &query.q)
        .cloned()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok(order))
}
