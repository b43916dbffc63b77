//! Whole objects, arrays of objects and growable collections of objects.
//!
//! Three calling conventions are supported, and they write identical data:
//!
//! 1. **Dispatch functions**: a free function (or closure) shaped like
//!    [`WriteFn`] / [`ReadFn`], passed to the `*_with` helpers.
//! 2. **Bound methods**: an object's own marshal and unmarshal methods,
//!    adapted into the dispatch shape by [`method_writer`], [`bind_receiver`],
//!    [`method_reader`] (fresh receiver from a factory) or [`prototype_reader`]
//!    (fresh receiver cloned from a prototype).
//! 3. **The [`Marshalable`] contract**: the helpers without a suffix, which
//!    create new instances through [`Default`].
//!
//! # Examples
//!
//! ```
//! use vc_marshal::object::{self, Marshalable};
//! use vc_marshal::{JsonMarshaller, Marshaller, Result, Unmarshaller};
//!
//! #[derive(Default, Debug, PartialEq)]
//! struct Point { x: i32, y: i32 }
//!
//! impl Marshalable for Point {
//!     fn marshal(&self, m: &mut dyn Marshaller, name: Option<&str>) -> Result<()> {
//!         m.open_map(name)?;
//!         m.write_i32(Some("x"), self.x)?;
//!         m.write_i32(Some("y"), self.y)?;
//!         m.close_map()
//!     }
//!
//!     fn unmarshal(&mut self, u: &mut dyn Unmarshaller, name: Option<&str>) -> Result<()> {
//!         u.open_map(name)?;
//!         self.x = u.read_i32(Some("x"))?;
//!         self.y = u.read_i32(Some("y"))?;
//!         u.close_map()
//!     }
//! }
//!
//! let points = [Point { x: 1, y: 2 }, Point { x: 3, y: 4 }];
//!
//! let mut m = JsonMarshaller::new();
//! object::marshal_slice(&mut m, None, &points).unwrap();
//! m.check_complete().unwrap();
//! assert_eq!(m.to_compact_string().unwrap(), r#"[{"x":1,"y":2},{"x":3,"y":4}]"#);
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::type_name;

use crate::{ErrorKind, Marshaller, Result, Unmarshaller};

// -----------------------------------------------------------------------------
// Marshalable

/// An application type that can write itself into, and read itself back
/// from, a context.
///
/// `name` is the field name in an enclosing map, or `None` inside an array
/// and at the top level. Implementations typically open a map (or array)
/// under `name`, transfer their fields, and close it.
///
/// Types whose wire shape depends on a leading version or type tag should
/// read that tag first and branch on it.
pub trait Marshalable {
    fn marshal(&self, m: &mut dyn Marshaller, name: Option<&str>) -> Result<()>;
    fn unmarshal(&mut self, u: &mut dyn Unmarshaller, name: Option<&str>) -> Result<()>;
}

impl<T: Marshalable + ?Sized> Marshalable for Box<T> {
    #[inline]
    fn marshal(&self, m: &mut dyn Marshaller, name: Option<&str>) -> Result<()> {
        (**self).marshal(m, name)
    }

    #[inline]
    fn unmarshal(&mut self, u: &mut dyn Unmarshaller, name: Option<&str>) -> Result<()> {
        (**self).unmarshal(u, name)
    }
}

// -----------------------------------------------------------------------------
// Dispatch shapes

/// A free function that writes one `T` under `name`.
pub type WriteFn<T> = fn(&mut dyn Marshaller, Option<&str>, &T) -> Result<()>;

/// A free function that reads one `T` under `name`.
pub type ReadFn<T> = fn(&mut dyn Unmarshaller, Option<&str>) -> Result<T>;

/// A marshal method, as in `<T as Marshalable>::marshal`.
pub type MarshalMethod<T> = fn(&T, &mut dyn Marshaller, Option<&str>) -> Result<()>;

/// An unmarshal method, as in `<T as Marshalable>::unmarshal`.
pub type UnmarshalMethod<T> = fn(&mut T, &mut dyn Unmarshaller, Option<&str>) -> Result<()>;

// -----------------------------------------------------------------------------
// Method adapters

/// Adapts a marshal method into the dispatch shape, taking the receiver as
/// the value argument.
#[inline]
pub fn method_writer<T>(
    method: MarshalMethod<T>,
) -> impl Fn(&mut dyn Marshaller, Option<&str>, &T) -> Result<()> {
    move |m: &mut dyn Marshaller, name: Option<&str>, value: &T| method(value, m, name)
}

/// Fixes the receiver of a marshal method, leaving `(marshaller, name)`.
#[inline]
pub fn bind_receiver<'a, T>(
    receiver: &'a T,
    method: MarshalMethod<T>,
) -> impl Fn(&mut dyn Marshaller, Option<&str>) -> Result<()> + 'a {
    move |m: &mut dyn Marshaller, name: Option<&str>| method(receiver, m, name)
}

/// Adapts an unmarshal method into the dispatch shape. Each call asks
/// `factory` for a fresh receiver; `None` fails with
/// [`ErrorKind::Allocation`].
#[inline]
pub fn method_reader<T, F>(
    mut factory: F,
    method: UnmarshalMethod<T>,
) -> impl FnMut(&mut dyn Unmarshaller, Option<&str>) -> Result<T>
where
    F: FnMut() -> Option<T>,
{
    move |u: &mut dyn Unmarshaller, name: Option<&str>| {
        let Some(mut value) = factory() else {
            return Err(u.fail(name, ErrorKind::Allocation {
                type_name: type_name::<T>(),
            }));
        };
        method(&mut value, u, name)?;
        Ok(value)
    }
}

/// Like [`method_reader`], with each receiver cloned from `prototype`.
#[inline]
pub fn prototype_reader<T: Clone>(
    prototype: T,
    method: UnmarshalMethod<T>,
) -> impl FnMut(&mut dyn Unmarshaller, Option<&str>) -> Result<T> {
    method_reader(move || Some(prototype.clone()), method)
}

// -----------------------------------------------------------------------------
// Dispatch-function helpers

/// Writes `items` as an array, each element through `write`.
pub fn marshal_slice_with<T, F>(
    m: &mut dyn Marshaller,
    name: Option<&str>,
    items: &[T],
    write: F,
) -> Result<()>
where
    F: FnMut(&mut dyn Marshaller, Option<&str>, &T) -> Result<()>,
{
    marshal_iter_with(m, name, items.iter(), write)
}

/// Writes an exact-size iterator as an array, each element through `write`.
pub fn marshal_iter_with<'a, T, I, F>(
    m: &mut dyn Marshaller,
    name: Option<&str>,
    items: I,
    mut write: F,
) -> Result<()>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    I::IntoIter: ExactSizeIterator,
    F: FnMut(&mut dyn Marshaller, Option<&str>, &T) -> Result<()>,
{
    let items = items.into_iter();
    m.open_array(name, items.len())?;
    for item in items {
        write(&mut *m, None, item)?;
    }
    m.close_array()
}

/// Reads an array into a `Vec`, each element through `read`.
pub fn unmarshal_vec_with<T, F>(u: &mut dyn Unmarshaller, name: Option<&str>, read: F) -> Result<Vec<T>>
where
    F: FnMut(&mut dyn Unmarshaller, Option<&str>) -> Result<T>,
{
    unmarshal_collection_with(u, name, read)
}

/// Reads an array into any growable collection, each element through `read`.
pub fn unmarshal_collection_with<T, C, F>(
    u: &mut dyn Unmarshaller,
    name: Option<&str>,
    mut read: F,
) -> Result<C>
where
    C: Default + Extend<T>,
    F: FnMut(&mut dyn Unmarshaller, Option<&str>) -> Result<T>,
{
    let len = u.open_array(name)?;
    let mut out = C::default();
    for _ in 0..len {
        let item = read(&mut *u, None)?;
        out.extend(Some(item));
    }
    u.close_array()?;
    Ok(out)
}

/// Reads an array of exactly `N` elements, each through `read`.
pub fn unmarshal_array_with<T, F, const N: usize>(
    u: &mut dyn Unmarshaller,
    name: Option<&str>,
    mut read: F,
) -> Result<[T; N]>
where
    F: FnMut(&mut dyn Unmarshaller, Option<&str>) -> Result<T>,
{
    u.open_array_exact(name, N)?;
    let mut items = Vec::with_capacity(N);
    for _ in 0..N {
        items.push(read(&mut *u, None)?);
    }
    u.close_array()?;
    // `open_array_exact` has checked the length.
    items.try_into().map_err(|items: Vec<T>| {
        u.fail(name, ErrorKind::Structure(crate::StructureError::ArrayLength {
            declared: N,
            actual: items.len(),
        }))
    })
}

// -----------------------------------------------------------------------------
// Marshalable helpers

/// Writes one object under `name`.
#[inline]
pub fn marshal_object<T: Marshalable + ?Sized>(
    m: &mut dyn Marshaller,
    name: Option<&str>,
    value: &T,
) -> Result<()> {
    value.marshal(m, name)
}

/// Reads one object under `name` into a fresh `T::default()`.
#[inline]
pub fn unmarshal_object<T: Marshalable + Default>(u: &mut dyn Unmarshaller, name: Option<&str>) -> Result<T> {
    let mut value = T::default();
    value.unmarshal(u, name)?;
    Ok(value)
}

/// Writes a slice of objects as an array.
#[inline]
pub fn marshal_slice<T: Marshalable>(m: &mut dyn Marshaller, name: Option<&str>, items: &[T]) -> Result<()> {
    marshal_slice_with(m, name, items, method_writer(T::marshal))
}

/// Writes an exact-size iterator of objects as an array.
#[inline]
pub fn marshal_iter<'a, T, I>(m: &mut dyn Marshaller, name: Option<&str>, items: I) -> Result<()>
where
    T: Marshalable + 'a,
    I: IntoIterator<Item = &'a T>,
    I::IntoIter: ExactSizeIterator,
{
    marshal_iter_with(m, name, items, method_writer(T::marshal))
}

/// Reads an array of objects into a `Vec`.
#[inline]
pub fn unmarshal_vec<T: Marshalable + Default>(u: &mut dyn Unmarshaller, name: Option<&str>) -> Result<Vec<T>> {
    unmarshal_vec_with(u, name, unmarshal_object::<T>)
}

/// Reads an array of objects into any growable collection.
#[inline]
pub fn unmarshal_collection<T, C>(u: &mut dyn Unmarshaller, name: Option<&str>) -> Result<C>
where
    T: Marshalable + Default,
    C: Default + Extend<T>,
{
    unmarshal_collection_with(u, name, unmarshal_object::<T>)
}
