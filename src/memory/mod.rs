pub mod convert;
pub mod stats;
pub mod store;
pub mod types;

pub use store::MemoryStore;
