pub mod app;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod routes;
pub mod state;
