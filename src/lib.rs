pub mod app;
pub mod audit;
pub mod catalog;
pub mod config;
pub mod dto;
pub mod error;
pub mod ids;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
