//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `setup` - The guided setup conversation: steps, router and engine
//! - `session` - Persisted setup session aggregate

pub mod foundation;
pub mod session;
pub mod setup;
