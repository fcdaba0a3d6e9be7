pub mod api_docs;
pub mod app;
pub mod bootstrap;
pub mod config;
pub mod entities;
pub mod error;
pub mod extractor;
pub mod fallback;
pub mod middleware;
pub mod record_store;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
