//! Session domain module.
//!
//! A setup session is the persisted form of one guided conversation. It is
//! created on first contact, updated after every turn and never deleted here.

mod aggregate;
mod errors;

pub use aggregate::{Session, SessionRecord};
pub use errors::SessionError;
