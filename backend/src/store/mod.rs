//! SQL access helpers shared by the services.
//!
//! Functions take an open [`rusqlite::Connection`] so the batch endpoints can
//! reuse one connection per batch and the tests can run against in-memory
//! databases.

pub mod layout;
pub mod roster;
