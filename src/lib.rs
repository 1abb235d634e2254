//! Describe the shape of a value once, then interpret that description into as
//! many behaviors as needed: a [`Decoder`] for untrusted input, an
//! [`Encoder`] back to raw form, an [`Equality`] check, a [`Guard`], and a
//! [`Generator`] of arbitrary values.
//!
//! ```
//! use schemable::schema::{literal, number, string, structure};
//! use schemable::{price, Registry};
//! use serde_json::json;
//!
//! let product = structure(vec![
//!     ("id", number()),
//!     ("name", string()),
//!     ("color", literal(["white", "black", "green"])),
//!     ("price", price::price()),
//! ]);
//!
//! let registry = Registry::standard().with_custom(&price::custom_type());
//! let decoder = registry.decoder(&product).unwrap();
//!
//! assert_eq!(
//!     Ok(json!({
//!         "id": 234,
//!         "name": "T-Shirt",
//!         "color": "black",
//!         "price": { "currency": "EUR", "value": 12 },
//!     })),
//!     decoder.decode(&json!({ "id": 234, "name": "T-Shirt", "color": "black", "price": "EUR12" }))
//! );
//! ```

pub mod capability;
pub mod changes;
pub mod decoder;
pub mod encoder;
pub mod eq;
pub mod generator;
pub mod guard;
pub mod interpret;
pub mod price;
pub mod registry;
pub mod report;
pub mod schema;
mod serde_schema;
pub mod timestamp;
mod value;

#[cfg(test)]
mod proptests;

pub use capability::{Capability, Implementation};
pub use changes::{detect_changes, ChangeSet, ItemFailure};
pub use decoder::{DecodeError, DecodeFailure, DecodeOptions, DecodeResult, Decoder, PathStep};
pub use encoder::Encoder;
pub use eq::Equality;
pub use generator::{GenerateOptions, Generator};
pub use guard::Guard;
pub use interpret::{interpret, InterpretError};
pub use registry::{CustomType, Registry};
pub use schema::{Literal, Schema, SchemaNode};
pub use serde_schema::*;
