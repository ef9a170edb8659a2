pub mod handlers;
pub mod memory_store;
pub mod pg_store;
pub mod seed;
pub mod service;
pub mod store;
pub mod validation;
