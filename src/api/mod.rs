//! API Module
//!
//! HTTP handlers and routing for the cached store service.
//!
//! # Endpoints
//! - `PUT /set` - Write a key-value pair
//! - `GET /get/:key` - Read a value by key
//! - `GET /stats` - Get cache statistics
//! - `DELETE /cache` - Clear the cache
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
