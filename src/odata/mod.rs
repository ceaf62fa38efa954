/// Bound action results.
pub mod action;
/// Lazily paged collections.
pub mod collection;
/// Change-tracked entity records.
pub mod entity;
/// Collection page parsing.
pub mod page;
/// Static entity schemas.
pub mod schema;
/// Resource client facade.
pub mod serviceclient;
/// Authenticated HTTP transport.
pub mod transport;

pub use action::ActionResult;
pub use collection::PagedCollection;
pub use entity::TrackedEntity;
pub use page::Page;
pub use schema::{EntitySchema, FieldDef};
pub use serviceclient::ServiceClient;
pub use transport::{Response, Transport};
