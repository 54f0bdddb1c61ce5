use std::{path::PathBuf, sync::Arc};

use chrono::{Duration, Utc};
use restaurant_storefront::{
    catalog::Catalog,
    config::AppConfig,
    dto::orders::CheckoutRequest,
    models::{Language, OrderStatus, PaymentMethod, PaymentStatus},
    services::{
        admin_service::{set_order_status, set_payment_status},
        auth_service::AuthService,
        cart_service::CartManager,
        order_service::place_order,
    },
    store::{FileStore, SharedStore},
};

const DEFAULT_STORE_PATH: &str = "data/store.json";

struct DemoOrder {
    name: &'static str,
    email: &'static str,
    phone: &'static str,
    address: &'static str,
    payment_method: PaymentMethod,
    lines: &'static [(&'static str, u32)],
    days_ago: i64,
    status: OrderStatus,
    paid: bool,
}

const DEMO_ORDERS: &[DemoOrder] = &[
    DemoOrder {
        name: "Jean Mbarga",
        email: "jean@example.com",
        phone: "+237 670 000 001",
        address: "Bastos, Yaounde",
        payment_method: PaymentMethod::MtnMoney,
        lines: &[("1", 2), ("9", 2)],
        days_ago: 6,
        status: OrderStatus::Delivered,
        paid: true,
    },
    DemoOrder {
        name: "Aissatou Bello",
        email: "aissatou@example.com",
        phone: "+237 690 000 002",
        address: "Akwa, Douala",
        payment_method: PaymentMethod::OrangeMoney,
        lines: &[("3", 1), ("5", 1)],
        days_ago: 3,
        status: OrderStatus::Ready,
        paid: true,
    },
    DemoOrder {
        name: "Paul Nkeng",
        email: "paul@example.com",
        phone: "+237 650 000 003",
        address: "Molyko, Buea",
        payment_method: PaymentMethod::Cash,
        lines: &[("2", 1)],
        days_ago: 1,
        status: OrderStatus::Preparing,
        paid: false,
    },
    DemoOrder {
        name: "Jean Mbarga",
        email: "jean@example.com",
        phone: "+237 670 000 001",
        address: "Bastos, Yaounde",
        payment_method: PaymentMethod::MtnMoney,
        lines: &[("7", 3)],
        days_ago: 0,
        status: OrderStatus::Pending,
        paid: false,
    },
];

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let path = config
        .store_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH));
    let store: SharedStore = Arc::new(FileStore::open(&path)?);

    let catalog = Catalog::seeded();
    let mut cart = CartManager::hydrate(store.clone());
    cart.clear_cart()?;

    let now = Utc::now();
    for demo in DEMO_ORDERS {
        for (item_id, quantity) in demo.lines {
            let item = catalog
                .get(item_id)
                .ok_or_else(|| anyhow::anyhow!("unknown menu item {item_id}"))?;
            cart.add_to_cart(item)?;
            cart.update_quantity(item_id, i64::from(*quantity))?;
        }

        let payload = CheckoutRequest {
            customer_name: demo.name.to_string(),
            customer_email: demo.email.to_string(),
            customer_phone: demo.phone.to_string(),
            delivery_address: demo.address.to_string(),
            payment_method: demo.payment_method,
            notes: String::new(),
        };
        let placed_at = now - Duration::days(demo.days_ago);
        let order = place_order(
            store.as_ref(),
            &mut cart,
            Language::En,
            payload,
            config.delivery_fee,
            placed_at,
        )?;
        set_order_status(store.as_ref(), &order.id, demo.status, false)?;
        if demo.paid {
            set_payment_status(store.as_ref(), &order.id, PaymentStatus::Completed)?;
        }
        println!("Seeded order {} ({})", order.id, demo.status.as_str());
    }

    // signup always creates an admin, so this is a second staff login
    let auth = AuthService::new(store.clone(), &config);
    match auth.signup("manager@example.com", "manager123", "Restaurant Manager") {
        Ok(user) => println!("Seeded account {}", user.email),
        Err(err) => println!("Skipped account: {err}"),
    }
    auth.logout()?;

    println!("Seed completed in {}", path.display());
    Ok(())
}
