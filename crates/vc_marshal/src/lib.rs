#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

// I/O errors and the JSON file helpers need `std::io` and `std::fs`.
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod context;
mod error;
mod traits;

pub mod json;
pub mod object;
pub mod primitive;
pub mod scalar;
pub mod sequential;

// -----------------------------------------------------------------------------
// Exports

pub use context::ContextKind;
pub use error::{ErrorClass, ErrorKind, MarshalError, Result, StructureError};
pub use json::{JsonFormat, JsonMarshaller, JsonUnmarshaller, KeyPolicy, ValueKind};
pub use object::Marshalable;
pub use scalar::Scalar;
pub use sequential::{SequentialMarshaller, SequentialUnmarshaller};
pub use traits::{Marshaller, Unmarshaller};
