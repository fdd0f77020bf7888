//! Repository layer for data access.

pub mod entities;
mod memory;
mod message_repository;
mod request_repository;
mod user_repository;

pub use memory::MemoryStore;
pub use message_repository::{MessageRepository, MessageStore};
pub use request_repository::{CleanupReport, MappingRequestStore, RequestStore};
pub use user_repository::{IdentityStore, ProfileFields, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use message_repository::MockMessageStore;
#[cfg(any(test, feature = "test-utils"))]
pub use request_repository::MockMappingRequestStore;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockIdentityStore;
