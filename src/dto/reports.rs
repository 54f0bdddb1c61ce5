use chrono::Duration;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{OrderStatus, PaymentMethod};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum ReportRange {
    #[default]
    #[serde(rename = "7days")]
    Last7Days,
    #[serde(rename = "30days")]
    Last30Days,
    #[serde(rename = "90days")]
    Last90Days,
}

impl ReportRange {
    pub fn days(&self) -> i64 {
        match self {
            ReportRange::Last7Days => 7,
            ReportRange::Last30Days => 30,
            ReportRange::Last90Days => 90,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::days(self.days())
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReportQuery {
    pub range: Option<ReportRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailyRevenue {
    pub date: String,
    pub revenue: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ItemSales {
    pub name: String,
    pub quantity: u64,
    pub revenue: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PaymentMethodCount {
    pub method: PaymentMethod,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SalesReport {
    pub range: ReportRange,
    pub total_revenue: i64,
    pub total_orders: usize,
    pub avg_order_value: f64,
    pub orders_by_status: Vec<StatusCount>,
    pub daily_revenue: Vec<DailyRevenue>,
    pub top_items: Vec<ItemSales>,
    pub payment_methods: Vec<PaymentMethodCount>,
}
