pub mod config;
pub mod core;
pub mod engine;
pub mod observability;
pub mod persistence;
pub mod store;
