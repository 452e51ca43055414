//! Attribute publishing
//!
//! Writing converted readings to the external attribute store and
//! monitoring how those writes fare over time.

pub mod health;
pub mod publisher;
pub mod store;
pub mod table;

pub use health::{HealthStatus, PublishHealth};
pub use publisher::{AttributePublisher, PublishOutcome, PublishRejected};
pub use store::{AttributeKind, AttributeStore, AttributeValue, EndpointId, Status};
pub use table::AttributeTable;
