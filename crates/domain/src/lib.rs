//! metadata-notifier domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `catalog`: Term catalog record parsing
//! - `store`: The shared, reloadable mapping table
//! - `document`: Content document construction and serialization
//! - `usecases`: Notification and catalog reload use cases

pub mod catalog;
pub mod document;
pub mod model;
pub mod ports;
pub mod store;
pub mod usecases;

pub use model::*;
pub use ports::*;
pub use store::MappingStore;
