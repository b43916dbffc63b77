use alloc::string::String;

use crate::StreamError;

// -----------------------------------------------------------------------------
// TokenSink

/// An ordered sink of primitive tokens.
///
/// A sink knows nothing about maps or arrays: structure is carried by the
/// order in which tokens are written, and both ends of a stream must walk the
/// same schema.
///
/// `write_name` emits a diagnostic name token. Its default forwards to
/// [`write_str`](TokenSink::write_str); sinks that keep names apart from data
/// can override it.
///
/// `close` is optional. The default does nothing, so sinks that cannot be
/// closed (an in-memory buffer, a borrowed writer) still satisfy the trait.
pub trait TokenSink {
    fn write_i64(&mut self, value: i64) -> Result<(), StreamError>;
    fn write_f64(&mut self, value: f64) -> Result<(), StreamError>;
    fn write_str(&mut self, value: &str) -> Result<(), StreamError>;
    fn write_i32(&mut self, value: i32) -> Result<(), StreamError>;
    fn write_bool(&mut self, value: bool) -> Result<(), StreamError>;
    fn write_f32(&mut self, value: f32) -> Result<(), StreamError>;

    #[inline]
    fn write_name(&mut self, name: &str) -> Result<(), StreamError> {
        self.write_str(name)
    }

    #[inline]
    fn close(&mut self) -> Result<(), StreamError> {
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// TokenSource

/// An ordered source of primitive tokens, the mirror of [`TokenSink`].
pub trait TokenSource {
    fn read_i64(&mut self) -> Result<i64, StreamError>;
    fn read_f64(&mut self) -> Result<f64, StreamError>;
    fn read_string(&mut self) -> Result<String, StreamError>;
    fn read_i32(&mut self) -> Result<i32, StreamError>;
    fn read_bool(&mut self) -> Result<bool, StreamError>;
    fn read_f32(&mut self) -> Result<f32, StreamError>;

    #[inline]
    fn read_name(&mut self) -> Result<String, StreamError> {
        self.read_string()
    }

    #[inline]
    fn close(&mut self) -> Result<(), StreamError> {
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Forwarding impls

impl<T: TokenSink + ?Sized> TokenSink for &mut T {
    #[inline]
    fn write_i64(&mut self, value: i64) -> Result<(), StreamError> {
        (**self).write_i64(value)
    }

    #[inline]
    fn write_f64(&mut self, value: f64) -> Result<(), StreamError> {
        (**self).write_f64(value)
    }

    #[inline]
    fn write_str(&mut self, value: &str) -> Result<(), StreamError> {
        (**self).write_str(value)
    }

    #[inline]
    fn write_i32(&mut self, value: i32) -> Result<(), StreamError> {
        (**self).write_i32(value)
    }

    #[inline]
    fn write_bool(&mut self, value: bool) -> Result<(), StreamError> {
        (**self).write_bool(value)
    }

    #[inline]
    fn write_f32(&mut self, value: f32) -> Result<(), StreamError> {
        (**self).write_f32(value)
    }

    #[inline]
    fn write_name(&mut self, name: &str) -> Result<(), StreamError> {
        (**self).write_name(name)
    }

    // A borrowed sink is not ours to close.
}

impl<T: TokenSource + ?Sized> TokenSource for &mut T {
    #[inline]
    fn read_i64(&mut self) -> Result<i64, StreamError> {
        (**self).read_i64()
    }

    #[inline]
    fn read_f64(&mut self) -> Result<f64, StreamError> {
        (**self).read_f64()
    }

    #[inline]
    fn read_string(&mut self) -> Result<String, StreamError> {
        (**self).read_string()
    }

    #[inline]
    fn read_i32(&mut self) -> Result<i32, StreamError> {
        (**self).read_i32()
    }

    #[inline]
    fn read_bool(&mut self) -> Result<bool, StreamError> {
        (**self).read_bool()
    }

    #[inline]
    fn read_f32(&mut self) -> Result<f32, StreamError> {
        (**self).read_f32()
    }

    #[inline]
    fn read_name(&mut self) -> Result<String, StreamError> {
        (**self).read_name()
    }
}
