//! Redis adapters for production deployments.

mod ttl_store;

pub use ttl_store::RedisTtlStore;
