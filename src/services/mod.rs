pub mod admin_service;
pub mod auth_service;
pub mod cart_service;
pub mod language_service;
pub mod order_service;
pub mod report_service;
