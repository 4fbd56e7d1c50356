pub mod api;
pub mod app;
pub mod config;
pub mod fetch_error;
pub mod fetcher;
pub mod normalizer;
pub mod period;
pub mod report;
pub mod schema;
pub mod services;
pub mod sheets_client;
