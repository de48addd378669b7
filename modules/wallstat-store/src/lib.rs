pub mod error;
pub mod memory;
mod pg;
mod store;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use pg::PgStore;
pub use store::GroupStore;
