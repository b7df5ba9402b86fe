//! Storage abstraction used by the smoke-test server binary.

pub mod generic;
pub mod inmemory;

pub use generic::{Crud, Storage};
pub use inmemory::InMemoryStorage;
