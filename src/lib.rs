//! MedControl API Library
//!
//! Backend for municipal medication availability: catalog and UBS registry,
//! lot-level stock, availability search, reservations and withdrawals.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod health;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::Router;
use std::sync::Arc;

pub use handlers::{AppState, CallerId};

/// The versioned API router; callers nest this under `/api/v1` and provide
/// the shared state.
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    handlers::api_routes()
}
