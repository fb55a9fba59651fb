//! Storage that needs no external service.

mod memory;

pub use memory::InMemoryBlogStore;
