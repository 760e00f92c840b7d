//! Domain models for the synthetic dataset

pub mod entity;
pub mod identity;
pub mod record;
pub mod store;
pub mod transaction;

// Re-exports
pub use entity::{entity_node_id, Entity, ENTITY_PREFIX};
pub use identity::IdentityFeatures;
pub use record::{CoarseType, Record, RecordError, RecordType};
pub use store::RecordStore;
pub use transaction::{Party, TransactionRecord};
