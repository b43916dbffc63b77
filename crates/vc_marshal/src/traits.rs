use alloc::string::String;

use crate::{ErrorKind, MarshalError, Result, StructureError};

// -----------------------------------------------------------------------------
// Marshaller

/// The write side of the primitive transfer contract.
///
/// Every backend validates each call against its context stack before any
/// data moves: names are required and unique inside a map, absent inside an
/// array, and the root only takes anonymous maps and arrays.
///
/// Everything else (arrays of primitives, polymorphic scalars, object
/// graphs) is built on these operations in [`primitive`], [`scalar`] and
/// [`object`], so every backend gets it for free.
///
/// The trait is object safe; helpers take `&mut dyn Marshaller`.
///
/// [`primitive`]: crate::primitive
/// [`scalar`]: crate::scalar
/// [`object`]: crate::object
pub trait Marshaller {
    fn open_map(&mut self, name: Option<&str>) -> Result<()>;
    fn close_map(&mut self) -> Result<()>;

    /// Opens an array that must receive exactly `len` elements before
    /// [`close_array`](Marshaller::close_array).
    fn open_array(&mut self, name: Option<&str>, len: usize) -> Result<()>;
    fn close_array(&mut self) -> Result<()>;

    fn write_i64(&mut self, name: Option<&str>, value: i64) -> Result<()>;
    fn write_f64(&mut self, name: Option<&str>, value: f64) -> Result<()>;
    fn write_str(&mut self, name: Option<&str>, value: &str) -> Result<()>;
    fn write_i32(&mut self, name: Option<&str>, value: i32) -> Result<()>;
    fn write_bool(&mut self, name: Option<&str>, value: bool) -> Result<()>;
    fn write_f32(&mut self, name: Option<&str>, value: f32) -> Result<()>;

    /// The completion check.
    ///
    /// Fails with [`ErrorKind::Incomplete`] while any context is open, and
    /// otherwise returns how many top-level objects have been written.
    fn check_complete(&mut self) -> Result<usize>;

    /// Builds an error located at the current context, extended by `name`.
    fn fail(&self, name: Option<&str>, kind: ErrorKind) -> MarshalError;
}

// -----------------------------------------------------------------------------
// Unmarshaller

/// The read side of the primitive transfer contract, mirroring
/// [`Marshaller`].
///
/// Arrays are opened without a length: the backend discovers it (from a
/// length token, or from the tree node) and returns it so callers can size
/// their containers.
pub trait Unmarshaller {
    fn open_map(&mut self, name: Option<&str>) -> Result<()>;
    fn close_map(&mut self) -> Result<()>;

    /// Opens an array and returns the number of elements it holds.
    fn open_array(&mut self, name: Option<&str>) -> Result<usize>;
    fn close_array(&mut self) -> Result<()>;

    fn read_i64(&mut self, name: Option<&str>) -> Result<i64>;
    fn read_f64(&mut self, name: Option<&str>) -> Result<f64>;
    fn read_string(&mut self, name: Option<&str>) -> Result<String>;
    fn read_i32(&mut self, name: Option<&str>) -> Result<i32>;
    fn read_bool(&mut self, name: Option<&str>) -> Result<bool>;
    fn read_f32(&mut self, name: Option<&str>) -> Result<f32>;

    /// The completion check, see [`Marshaller::check_complete`].
    fn check_complete(&mut self) -> Result<usize>;

    /// Builds an error located at the current context, extended by `name`.
    fn fail(&self, name: Option<&str>, kind: ErrorKind) -> MarshalError;

    // -------------------------------------------------------------------------
    // Provided

    /// Opens an array and checks it holds exactly `len` elements.
    fn open_array_exact(&mut self, name: Option<&str>, len: usize) -> Result<()> {
        let actual = self.open_array(name)?;
        if actual == len {
            Ok(())
        } else {
            let err = StructureError::ArrayLength {
                declared: len,
                actual,
            };
            Err(self.fail(name, err.into()))
        }
    }

    /// Reads an `i32` and fails with [`ErrorKind::Range`] outside `min..=max`.
    fn read_i32_in(&mut self, name: Option<&str>, min: i32, max: i32) -> Result<i32> {
        let value = self.read_i32(name)?;
        if (min..=max).contains(&value) {
            Ok(value)
        } else {
            Err(self.fail(name, ErrorKind::Range {
                value: value.into(),
                min: min.into(),
                max: max.into(),
            }))
        }
    }

    /// Reads an `i64` and fails with [`ErrorKind::Range`] outside `min..=max`.
    fn read_i64_in(&mut self, name: Option<&str>, min: i64, max: i64) -> Result<i64> {
        let value = self.read_i64(name)?;
        if (min..=max).contains(&value) {
            Ok(value)
        } else {
            Err(self.fail(name, ErrorKind::Range { value, min, max }))
        }
    }
}
