//! Domain module
//!
//! Core domain types and business rules. Nothing in here performs I/O.

pub mod context;
pub mod error;
pub mod image;
pub mod quantity;

pub use context::OperationContext;
pub use error::DomainError;
pub use image::{DecodedImage, ImageInput};
pub use quantity::{Amount, CookingTime, QuantityError};
