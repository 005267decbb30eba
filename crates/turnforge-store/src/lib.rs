mod diff;
mod error;
mod queries;
mod records;
mod schema;
mod store;

pub use error::{Error, Result};
pub use queries::PackChunkMatch;
pub use records::{Campaign, Session};
pub use schema::SCHEMA_VERSION;
pub use store::StateStore;
