//! Scheduling decision core for a shared property: unit-scoped agenda
//! exclusivity, restricted-hour approval derivation, and patrol coverage
//! tasks spawned by resident departures. Callers arrive authenticated;
//! transport, identity, and audit-trail storage live outside this crate.

pub mod audit;
pub mod engine;
pub mod limits;
pub mod model;
pub mod observability;
pub mod wal;
