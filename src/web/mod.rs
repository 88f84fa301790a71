//! HTTP service for module formation
//!
//! Exposes the skill request surface over a JSON API, plus read-only views:
//! - formed modules and formation insights
//! - the component dependency graph
//! - single component lookups

pub mod graph;
pub mod routes;
pub mod server;

pub use graph::GraphData;
pub use server::{ServerConfig, app, start_server};
