//! Persistence module
//!
//! This module contains the durable-storage components:
//! - `gateway` - The `PersistenceGateway` trait and the `LedgerDocument`
//!   it loads and commits
//! - `json_store` - File-backed gateway with atomic-replace commits
//! - `memory` - Volatile gateway for tests and benchmarks

pub mod gateway;
pub mod json_store;
pub mod memory;

pub use gateway::{LedgerDocument, PersistenceGateway};
pub use json_store::JsonFileGateway;
pub use memory::MemoryGateway;
