#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

// Binary streams read and write through `std::io`.
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod binary;
mod error;
mod tape;
mod traits;

// -----------------------------------------------------------------------------
// Exports

pub use binary::{BinaryInput, BinaryOutput};
pub use error::StreamError;
pub use tape::{Token, TokenKind, TokenTape};
pub use traits::{TokenSink, TokenSource};
