use axum::{
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use restaurant_storefront::{
    config::AppConfig,
    dto::orders::{CheckoutRequest, TrackQuery, UpdateOrderStatusRequest, UpdatePaymentStatusRequest},
    error::AppError,
    middleware::auth::AuthUser,
    models::{MenuItem, Order, OrderStatus, PaymentMethod, PaymentStatus, Role, User},
    routes::{admin as admin_routes, params::OrderListQuery},
    services::{admin_service, order_service},
    state::AppState,
    store::{MemoryStore, Store, StoreError, keys},
};
use serde_json::{Value, json};

fn dish(id: &str, price: i64) -> MenuItem {
    MenuItem {
        id: id.to_string(),
        category_id: "2".to_string(),
        name_en: format!("Dish {id}"),
        name_fr: format!("Plat {id}"),
        description_en: None,
        description_fr: None,
        price,
        image_url: None,
        is_available: true,
        preparation_time: 20,
    }
}

fn checkout_request() -> CheckoutRequest {
    CheckoutRequest {
        customer_name: "Marie Ngo".into(),
        customer_email: "marie@example.com".into(),
        customer_phone: "+237 600 000 000".into(),
        delivery_address: "Rue 1.234, Yaounde".into(),
        payment_method: PaymentMethod::OrangeMoney,
        notes: "Ring twice".into(),
    }
}

// Integration flow: customer fills the cart -> checkout -> admin moves the order -> customer tracks it.
#[tokio::test]
async fn checkout_then_admin_status_update_is_visible_when_tracking() -> anyhow::Result<()> {
    let state = AppState::new(AppConfig::default(), MemoryStore::shared());

    {
        let mut cart = state.cart.lock().await;
        let a = dish("a", 1000);
        cart.add_to_cart(&a)?;
        cart.add_to_cart(&a)?;
        cart.add_to_cart(&dish("b", 500))?;
        assert_eq!(cart.cart_total(), 2500);
        assert_eq!(cart.cart_count(), 3);
    }

    let placed = order_service::checkout(&state, checkout_request())
        .await?
        .data
        .expect("order");
    assert!(placed.id.starts_with("ORD-"));
    assert_eq!(placed.subtotal, 2500);
    assert_eq!(placed.delivery_fee, 1000);
    assert_eq!(placed.total, 3500);
    assert_eq!(placed.status, OrderStatus::Pending);
    assert_eq!(placed.payment_status, PaymentStatus::Pending);
    assert_eq!(placed.items.len(), 2);
    assert!(state.cart.lock().await.is_empty());

    let fetched = order_service::get_order(&state, &placed.id)
        .await?
        .data
        .expect("order");
    assert_eq!(fetched, placed);

    let admin = AuthUser(state.auth.login("admin@maryskitchen.com", "admin123")?);
    admin_service::update_order_status(
        &state,
        &admin,
        &placed.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Delivered,
        },
    )
    .await?;

    let tracked = order_service::track_order(
        &state,
        TrackQuery {
            q: "MARIE@example.com".into(),
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(tracked.status, OrderStatus::Delivered);

    let fragment = placed.id[placed.id.len() - 6..].to_string();
    let by_id = order_service::track_order(&state, TrackQuery { q: fragment })
        .await?
        .data
        .expect("order");
    assert_eq!(by_id.id, placed.id);
    assert_eq!(by_id.status, OrderStatus::Delivered);
    assert_eq!(
        tracked,
        Order {
            status: OrderStatus::Delivered,
            ..placed
        }
    );

    Ok(())
}

#[tokio::test]
async fn checkout_with_empty_cart_is_rejected() {
    let state = AppState::new(AppConfig::default(), MemoryStore::shared());
    let err = order_service::checkout(&state, checkout_request())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let missing = order_service::get_order(&state, "ORD-1").await.unwrap_err();
    assert!(matches!(missing, AppError::NotFound));
}

#[tokio::test]
async fn checkout_requires_contact_details_and_keeps_cart() -> anyhow::Result<()> {
    let state = AppState::new(AppConfig::default(), MemoryStore::shared());
    state.cart.lock().await.add_to_cart(&dish("a", 1000))?;

    let mut payload = checkout_request();
    payload.delivery_address = "  ".into();
    let err = order_service::checkout(&state, payload).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(state.cart.lock().await.cart_count(), 1);
    Ok(())
}

#[tokio::test]
async fn strict_transitions_reject_moving_backwards() -> anyhow::Result<()> {
    let config = AppConfig {
        strict_order_transitions: true,
        ..AppConfig::default()
    };
    let state = AppState::new(config, MemoryStore::shared());
    state.cart.lock().await.add_to_cart(&dish("a", 1000))?;
    let order = order_service::checkout(&state, checkout_request())
        .await?
        .data
        .expect("order");

    let admin = AuthUser(state.auth.login("admin@maryskitchen.com", "admin123")?);
    let set = |status| UpdateOrderStatusRequest { status };
    admin_service::update_order_status(&state, &admin, &order.id, set(OrderStatus::Ready)).await?;
    let err = admin_service::update_order_status(&state, &admin, &order.id, set(OrderStatus::Pending))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    Ok(())
}

fn admin(state: &AppState) -> anyhow::Result<AuthUser> {
    Ok(AuthUser(state.auth.login("admin@maryskitchen.com", "admin123")?))
}

async fn place(state: &AppState, email: &str) -> anyhow::Result<Order> {
    state.cart.lock().await.add_to_cart(&dish("a", 1000))?;
    let mut payload = checkout_request();
    payload.customer_email = email.into();
    let order = order_service::checkout(state, payload).await?.data.expect("order");
    Ok(order)
}

fn stored_orders(store: &dyn Store) -> anyhow::Result<Vec<Value>> {
    let entry = store.get(keys::ORDERS)?.expect("orders key");
    Ok(serde_json::from_str(&entry.value)?)
}

#[tokio::test]
async fn writes_keep_legacy_and_unknown_fields_intact() -> anyhow::Result<()> {
    let legacy = json!([
        {"id": "ORD-1", "customerName": "Old", "paymentMethod": "card", "total": 3500,
         "created_at": "2024-01-01T00:00:00Z"},
        {"id": "ORD-2", "total": 3500.5, "created_at": "2024-01-01T00:00:00Z"},
        {"id": "ORD-3", "status": "pending", "order_type": "pickup",
         "created_at": "2024-01-01T00:00:00.000Z"}
    ]);
    let store = MemoryStore::shared();
    store.set(keys::ORDERS, legacy.to_string())?;
    let state = AppState::new(AppConfig::default(), store.clone());

    let placed = place(&state, "new@example.com").await?;
    let updated = admin_service::set_order_status(
        store.as_ref(),
        "ORD-3",
        OrderStatus::Delivered,
        false,
    )?;
    assert_eq!(updated.status, OrderStatus::Delivered);

    let records = stored_orders(store.as_ref())?;
    assert_eq!(records.len(), 4);
    assert_eq!(records[0]["id"], json!(placed.id));
    assert_eq!(records[1], legacy[0]);
    assert_eq!(records[2], legacy[1]);

    let mut expected = legacy[2].clone();
    expected["status"] = json!("delivered");
    assert_eq!(records[3], expected);
    assert!(records[3].get("customerEmail").is_none());

    // an order that cannot be decoded is left alone
    let err = admin_service::set_order_status(store.as_ref(), "ORD-1", OrderStatus::Ready, false)
        .unwrap_err();
    assert!(matches!(err, AppError::Store(StoreError::Corrupt { .. })));
    assert_eq!(stored_orders(store.as_ref())?[1], legacy[0]);
    Ok(())
}

#[tokio::test]
async fn payment_status_update_leaves_order_status() -> anyhow::Result<()> {
    let state = AppState::new(AppConfig::default(), MemoryStore::shared());
    let order = place(&state, "pay@example.com").await?;
    let admin = admin(&state)?;

    let paid = admin_service::update_payment_status(
        &state,
        &admin,
        &order.id,
        UpdatePaymentStatusRequest {
            payment_status: PaymentStatus::Completed,
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(paid.payment_status, PaymentStatus::Completed);
    assert_eq!(paid.status, OrderStatus::Pending);
    assert_eq!(paid, Order { payment_status: PaymentStatus::Completed, ..order });
    Ok(())
}

#[tokio::test]
async fn updates_on_unknown_order_are_not_found() -> anyhow::Result<()> {
    let state = AppState::new(AppConfig::default(), MemoryStore::shared());
    place(&state, "a@example.com").await?;
    let admin = admin(&state)?;

    let err = admin_service::update_order_status(
        &state,
        &admin,
        "ORD-missing",
        UpdateOrderStatusRequest {
            status: OrderStatus::Ready,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let err = admin_service::update_payment_status(
        &state,
        &admin,
        "ORD-missing",
        UpdatePaymentStatusRequest {
            payment_status: PaymentStatus::Failed,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    Ok(())
}

#[tokio::test]
async fn admin_order_list_is_paginated() -> anyhow::Result<()> {
    let state = AppState::new(AppConfig::default(), MemoryStore::shared());
    for n in 0..3 {
        place(&state, &format!("c{n}@example.com")).await?;
    }
    let admin = admin(&state)?;

    let page = admin_service::list_all_orders(
        &state,
        &admin,
        OrderListQuery {
            page: Some(2),
            per_page: Some(2),
            ..Default::default()
        },
    )
    .await?;
    let meta = page.meta.expect("meta");
    assert_eq!((meta.page, meta.per_page, meta.total), (Some(2), Some(2), Some(3)));
    let items = page.data.expect("orders").items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].customer_email, "c0@example.com");

    let beyond = admin_service::list_all_orders(
        &state,
        &admin,
        OrderListQuery {
            page: Some(i64::MAX),
            per_page: Some(50),
            ..Default::default()
        },
    )
    .await?;
    assert!(beyond.data.expect("orders").items.is_empty());
    Ok(())
}

#[tokio::test]
async fn csv_export_is_served_as_attachment() -> anyhow::Result<()> {
    let state = AppState::new(AppConfig::default(), MemoryStore::shared());
    let order = place(&state, "csv@example.com").await?;

    let response = admin_routes::export_orders(State(state.clone()), admin(&state)?)
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "text/csv; charset=utf-8");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str()?;
    assert!(disposition.starts_with("attachment; filename=\"orders-"));
    assert!(disposition.ends_with(".csv\""));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = String::from_utf8(body.to_vec())?;
    let mut lines = body.lines();
    assert!(lines.next().expect("header").starts_with("Order ID,Customer,Email"));
    assert!(lines.next().expect("row").starts_with(&order.id));

    let guest = AuthUser(User {
        id: "g".into(),
        email: "guest@example.com".into(),
        name: "Guest".into(),
        role: Role::Customer,
    });
    let denied = admin_routes::export_orders(State(state), guest)
        .await
        .into_response();
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn checkout_rejects_totals_that_overflow() -> anyhow::Result<()> {
    let state = AppState::new(AppConfig::default(), MemoryStore::shared());
    state.cart.lock().await.add_to_cart(&dish("gold", i64::MAX - 10))?;

    let err = order_service::checkout(&state, checkout_request())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(state.cart.lock().await.cart_count(), 1);
    assert!(state.store.get(keys::ORDERS)?.is_none());
    Ok(())
}
