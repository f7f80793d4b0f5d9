pub mod metrics;
pub mod session_store;
