//! API endpoint handlers.
//!
//! Reads take the store read lock and return clones; writes go through
//! `CoreState` so they are persisted and broadcast.

pub mod alerts;
pub mod cases;
pub mod health;
pub mod hospitals;
pub mod overview;
pub mod vaccinations;
