//! Service layer: record storage backends plus the CRUD rules the HTTP surface relies on.
//! - `storage` persists records in a JSON document or a relational database.
//! - `records` validates references, cascades deletes and commits after every write.

pub mod errors;
pub mod records;
pub mod storage;
#[cfg(test)]
pub mod test_support;
