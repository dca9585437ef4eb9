// Core infrastructure modules
pub mod core;

// Pipeline stages
pub mod app;
pub mod args;
pub mod config;
pub mod logging;
pub mod table_listing;
pub mod text;
