pub mod config;
pub mod auth;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod server;
pub mod ws;

pub use config::WebConfig;
pub use server::start_web_server;
