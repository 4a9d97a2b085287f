//! HTTP API: server, routing, and request/response mapping for the inventory service.

pub mod app;
pub mod middleware;
