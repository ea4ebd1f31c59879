//! Repository functions over the zrviz schema
//!
//! Every function issues a fixed number of queries. Insert helpers accept any
//! SQLite executor so the importer can run them inside one transaction.

pub mod categories;
pub mod corpora;
pub mod documents;
pub mod fragments;
pub mod places;
pub mod terms;
pub mod topics;
pub mod transcripts;

use zrviz_common::Error;

pub(crate) fn not_found(entity: &str, id: i64) -> Error {
    Error::NotFound(format!("{} {}", entity, id))
}
