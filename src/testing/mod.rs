//! Shared test support: a scripted in-memory platform and fixture factories.
//!
//! Only compiled for tests. The mock implements the same boundary traits the
//! production adapter does, records every mutation it is asked to perform,
//! and can be scripted to fail specific operations with specific error
//! kinds.

pub mod factory;
pub mod mock;
