use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::{
    dto::reports::{
        DailyRevenue, ItemSales, PaymentMethodCount, ReportQuery, ReportRange, SalesReport,
        StatusCount,
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::{Language, Order},
    response::{ApiResponse, Meta},
    state::AppState,
    store::{keys, read_list},
};

const DAILY_BUCKETS: usize = 14;
const TOP_ITEMS: usize = 5;

pub const CSV_HEADER: [&str; 8] = [
    "Order ID",
    "Customer",
    "Email",
    "Phone",
    "Total",
    "Status",
    "Payment Method",
    "Date",
];

const MONTHS_EN: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const MONTHS_FR: [&str; 12] = [
    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
    "déc.",
];

/// Short day label: `Jan 5` in English, `5 janv.` in French.
pub fn day_label(date: NaiveDate, lang: Language) -> String {
    let month = date.month0() as usize;
    match lang {
        Language::En => format!("{} {}", MONTHS_EN[month], date.day()),
        Language::Fr => format!("{} {}", date.day(), MONTHS_FR[month]),
    }
}

/// Aggregates the orders created within `range` of `now`.
pub fn build_report(
    orders: &[Order],
    range: ReportRange,
    now: DateTime<Utc>,
    lang: Language,
) -> SalesReport {
    let start = now - range.duration();
    let window: Vec<&Order> = orders.iter().filter(|o| o.created_at >= start).collect();

    let total_revenue = window.iter().fold(0i64, |sum, o| sum.saturating_add(o.total));
    let total_orders = window.len();
    let avg_order_value = if total_orders > 0 {
        total_revenue as f64 / total_orders as f64
    } else {
        0.0
    };

    let mut orders_by_status: Vec<StatusCount> = Vec::new();
    for order in &window {
        match orders_by_status.iter_mut().find(|s| s.status == order.status) {
            Some(entry) => entry.count += 1,
            None => orders_by_status.push(StatusCount {
                status: order.status,
                count: 1,
            }),
        }
    }

    let mut by_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for order in &window {
        let day = by_day.entry(order.created_at.date_naive()).or_default();
        *day = day.saturating_add(order.total);
    }
    let skip = by_day.len().saturating_sub(DAILY_BUCKETS);
    let daily_revenue = by_day
        .into_iter()
        .skip(skip)
        .map(|(date, revenue)| DailyRevenue {
            date: day_label(date, lang),
            revenue,
        })
        .collect();

    let mut top_items: Vec<ItemSales> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for line in window.iter().copied().flat_map(|o| o.items.iter()) {
        let slot = *index.entry(line.name.as_str()).or_insert_with(|| {
            top_items.push(ItemSales {
                name: line.name.clone(),
                quantity: 0,
                revenue: 0,
            });
            top_items.len() - 1
        });
        let entry = &mut top_items[slot];
        entry.quantity = entry.quantity.saturating_add(u64::from(line.quantity));
        entry.revenue = entry.revenue.saturating_add(line.line_total());
    }
    // stable: equal revenue keeps first-seen order
    top_items.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    top_items.truncate(TOP_ITEMS);

    let mut payment_methods: Vec<PaymentMethodCount> = Vec::new();
    for order in &window {
        match payment_methods
            .iter_mut()
            .find(|p| p.method == order.payment_method)
        {
            Some(entry) => entry.count += 1,
            None => payment_methods.push(PaymentMethodCount {
                method: order.payment_method,
                label: order.payment_method.label(lang).to_string(),
                count: 1,
            }),
        }
    }

    SalesReport {
        range,
        total_revenue,
        total_orders,
        avg_order_value,
        orders_by_status,
        daily_revenue,
        top_items,
        payment_methods,
    }
}

fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

/// Every stored order as CSV, in stored order.
pub fn orders_csv(orders: &[Order]) -> String {
    let mut lines = Vec::with_capacity(orders.len() + 1);
    lines.push(CSV_HEADER.join(","));
    for order in orders {
        let row = [
            csv_field(&order.id),
            csv_field(&order.customer_name),
            csv_field(&order.customer_email),
            csv_field(&order.customer_phone),
            order.total.to_string(),
            order.status.as_str().to_string(),
            order.payment_method.as_str().to_string(),
            order
                .created_at
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        ];
        lines.push(row.join(","));
    }
    lines.join("\n")
}

pub async fn sales_report(
    state: &AppState,
    user: &AuthUser,
    query: ReportQuery,
) -> AppResult<ApiResponse<SalesReport>> {
    ensure_admin(user)?;
    let lang = state.language.lock().await.language();
    let orders = read_list::<Order>(state.store.as_ref(), keys::ORDERS)?;
    let report = build_report(
        &orders.items,
        query.range.unwrap_or_default(),
        Utc::now(),
        lang,
    );
    Ok(ApiResponse::success("Report", report, Some(Meta::empty())))
}

/// Returns the download file name and the CSV body.
pub async fn export_orders_csv(state: &AppState, user: &AuthUser) -> AppResult<(String, String)> {
    ensure_admin(user)?;
    let orders = read_list::<Order>(state.store.as_ref(), keys::ORDERS)?;
    let filename = format!("orders-{}.csv", Utc::now().format("%Y-%m-%d"));
    tracing::info!(rows = orders.items.len(), "orders exported");
    Ok((filename, orders_csv(&orders.items)))
}
