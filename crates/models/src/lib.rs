//! Entity records of the HBnB domain.
//!
//! Each entity module holds the sea-orm table definition (which doubles as the
//! in-memory record type) plus the constructors and update rules applied to
//! request bodies. `record` ties them together into one tagged value.

pub mod errors;
pub mod base;
pub mod record;
pub mod db;
pub mod state;
pub mod city;
pub mod amenity;
pub mod user;
pub mod place;
pub mod review;

pub use base::Fields;
pub use record::{Record, RecordKind};
