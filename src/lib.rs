//! Restaurant ordering backend.
//!
//! Food listing and management, order placement, and cookie-based sessions
//! for order history, served over HTTP from an SQLite document store.

pub mod config;
pub mod db;
pub mod models;
pub mod server;
