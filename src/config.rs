use std::{env, path::PathBuf};

pub const DEFAULT_DELIVERY_FEE: i64 = 1000;
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@maryskitchen.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// JSON file backing the store; in-memory when unset.
    pub store_path: Option<PathBuf>,
    pub delivery_fee: i64,
    pub admin_email: String,
    pub admin_password: String,
    pub strict_order_transitions: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            store_path: None,
            delivery_fee: DEFAULT_DELIVERY_FEE,
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            strict_order_transitions: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let host = env::var("APP_HOST").unwrap_or(defaults.host);
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(defaults.port);
        let store_path = env::var("STORE_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        let delivery_fee = match env::var("DELIVERY_FEE") {
            Ok(raw) => {
                let fee = raw.parse::<i64>()?;
                anyhow::ensure!(fee >= 0, "DELIVERY_FEE must not be negative");
                fee
            }
            Err(_) => defaults.delivery_fee,
        };
        let admin_email = env::var("ADMIN_EMAIL").unwrap_or(defaults.admin_email);
        let admin_password = env::var("ADMIN_PASSWORD").unwrap_or(defaults.admin_password);
        let strict_order_transitions = env::var("STRICT_ORDER_TRANSITIONS")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        Ok(Self {
            host,
            port,
            store_path,
            delivery_fee,
            admin_email,
            admin_password,
            strict_order_transitions,
        })
    }
}
