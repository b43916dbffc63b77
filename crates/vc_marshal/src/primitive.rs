//! Arrays and collections of primitives.
//!
//! Everything here is expressed through [`Marshaller`] and [`Unmarshaller`]
//! alone, so it works the same on every backend. Nested arrays are written
//! as arrays of arrays; rows need not share a length.

use alloc::string::String;
use alloc::vec::Vec;

use crate::object::{marshal_iter_with, unmarshal_array_with, unmarshal_collection_with, unmarshal_vec_with};
use crate::{Marshaller, Result, Unmarshaller};

// -----------------------------------------------------------------------------
// Primitive

/// A type with a direct transfer operation in both directions.
pub trait Primitive: Sized {
    fn write(m: &mut dyn Marshaller, name: Option<&str>, value: &Self) -> Result<()>;
    fn read(u: &mut dyn Unmarshaller, name: Option<&str>) -> Result<Self>;
}

macro_rules! impl_primitive {
    ($($ty:ty => $write:ident, $read:ident;)*) => {$(
        impl Primitive for $ty {
            #[inline]
            fn write(m: &mut dyn Marshaller, name: Option<&str>, value: &Self) -> Result<()> {
                m.$write(name, *value)
            }

            #[inline]
            fn read(u: &mut dyn Unmarshaller, name: Option<&str>) -> Result<Self> {
                u.$read(name)
            }
        }
    )*};
}

impl_primitive! {
    i32 => write_i32, read_i32;
    i64 => write_i64, read_i64;
    f32 => write_f32, read_f32;
    f64 => write_f64, read_f64;
    bool => write_bool, read_bool;
}

impl Primitive for String {
    #[inline]
    fn write(m: &mut dyn Marshaller, name: Option<&str>, value: &Self) -> Result<()> {
        m.write_str(name, value)
    }

    #[inline]
    fn read(u: &mut dyn Unmarshaller, name: Option<&str>) -> Result<Self> {
        u.read_string(name)
    }
}

// -----------------------------------------------------------------------------
// Arrays

/// Writes `items` as an array.
#[inline]
pub fn write_array<T: Primitive>(m: &mut dyn Marshaller, name: Option<&str>, items: &[T]) -> Result<()> {
    marshal_iter_with(m, name, items, T::write)
}

#[inline]
pub fn read_array<T: Primitive>(u: &mut dyn Unmarshaller, name: Option<&str>) -> Result<Vec<T>> {
    unmarshal_vec_with(u, name, T::read)
}

/// Writes rows as an array of arrays.
pub fn write_array2<T, R>(m: &mut dyn Marshaller, name: Option<&str>, rows: &[R]) -> Result<()>
where
    T: Primitive,
    R: AsRef<[T]>,
{
    marshal_iter_with(m, name, rows, |m, _, row: &R| write_array(m, None, row.as_ref()))
}

pub fn read_array2<T: Primitive>(u: &mut dyn Unmarshaller, name: Option<&str>) -> Result<Vec<Vec<T>>> {
    unmarshal_vec_with(u, name, read_array::<T>)
}

/// Writes planes of rows as an array of arrays of arrays.
pub fn write_array3<T, R, P>(m: &mut dyn Marshaller, name: Option<&str>, planes: &[P]) -> Result<()>
where
    T: Primitive,
    R: AsRef<[T]>,
    P: AsRef<[R]>,
{
    marshal_iter_with(m, name, planes, |m, _, plane: &P| write_array2(m, None, plane.as_ref()))
}

pub fn read_array3<T: Primitive>(u: &mut dyn Unmarshaller, name: Option<&str>) -> Result<Vec<Vec<Vec<T>>>> {
    unmarshal_vec_with(u, name, read_array2::<T>)
}

/// Reads an array that must hold exactly `N` elements.
#[inline]
pub fn read_fixed<T: Primitive, const N: usize>(u: &mut dyn Unmarshaller, name: Option<&str>) -> Result<[T; N]> {
    unmarshal_array_with(u, name, T::read)
}

// -----------------------------------------------------------------------------
// Collections

/// Writes any exact-size collection of primitives as an array.
#[inline]
pub fn write_collection<'a, T, I>(m: &mut dyn Marshaller, name: Option<&str>, items: I) -> Result<()>
where
    T: Primitive + 'a,
    I: IntoIterator<Item = &'a T>,
    I::IntoIter: ExactSizeIterator,
{
    marshal_iter_with(m, name, items, T::write)
}

/// Reads an array into any growable collection.
#[inline]
pub fn read_collection<T, C>(u: &mut dyn Unmarshaller, name: Option<&str>) -> Result<C>
where
    T: Primitive,
    C: Default + Extend<T>,
{
    unmarshal_collection_with(u, name, T::read)
}
