#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

// `from_reader` parses from `std::io`.
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod de;
mod print;
mod ser;
mod value;

// -----------------------------------------------------------------------------
// Exports

pub use value::{JsonKind, JsonMap, JsonValue};

/// Error raised while parsing or printing JSON text.
pub type Error = serde_json::Error;

// -----------------------------------------------------------------------------
// Re-export crates

pub use indexmap;
