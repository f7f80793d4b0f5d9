//! service-core: Shared infrastructure for the admin panel workspace.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
