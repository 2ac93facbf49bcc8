//! Relationship Ledger module
//!
//! Favorite, ShoppingCart and Follow as one generic pair store.

mod error;
mod relation;
mod repository;

pub use error::LedgerError;
pub use relation::{RelationKind, RelationRecord};
pub use repository::RelationshipLedger;
