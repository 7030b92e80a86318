//! Storage Adapters
//!
//! In-process implementations of the SessionRepository port.
//!
//! - **InMemorySessionRepository** - Sessions in a shared map (testing/development)

mod in_memory_session_repository;

pub use in_memory_session_repository::InMemorySessionRepository;
