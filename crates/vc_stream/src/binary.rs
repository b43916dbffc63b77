use alloc::string::String;
use alloc::vec::Vec;
use std::io::{Read, Write};

use crate::{StreamError, TokenKind, TokenSink, TokenSource};

// -----------------------------------------------------------------------------
// BinaryOutput

/// A [`TokenSink`] writing a compact big-endian encoding.
///
/// | token        | encoding                           |
/// |--------------|------------------------------------|
/// | `i64`, `f64` | 8 bytes                            |
/// | `i32`, `f32` | 4 bytes                            |
/// | `bool`       | 1 byte, `0` or `1`                 |
/// | string, name | `u32` byte length, then UTF-8 data |
///
/// Floats are written by bit pattern.
pub struct BinaryOutput<W: Write> {
    inner: Option<W>,
}

impl<W: Write> BinaryOutput<W> {
    #[inline]
    pub const fn new(inner: W) -> Self {
        Self { inner: Some(inner) }
    }

    /// Returns the writer, or `None` after [`close`](TokenSink::close).
    #[inline]
    pub fn into_inner(self) -> Option<W> {
        self.inner
    }

    #[inline]
    pub fn get_ref(&self) -> Option<&W> {
        self.inner.as_ref()
    }

    fn put(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        let inner = self.inner.as_mut().ok_or(StreamError::Closed)?;
        inner.write_all(bytes)?;
        Ok(())
    }
}

impl<W: Write> TokenSink for BinaryOutput<W> {
    #[inline]
    fn write_i64(&mut self, value: i64) -> Result<(), StreamError> {
        self.put(&value.to_be_bytes())
    }

    #[inline]
    fn write_f64(&mut self, value: f64) -> Result<(), StreamError> {
        self.put(&value.to_bits().to_be_bytes())
    }

    fn write_str(&mut self, value: &str) -> Result<(), StreamError> {
        let len = u32::try_from(value.len()).map_err(|_| StreamError::StringTooLong(value.len()))?;
        self.put(&len.to_be_bytes())?;
        self.put(value.as_bytes())
    }

    #[inline]
    fn write_i32(&mut self, value: i32) -> Result<(), StreamError> {
        self.put(&value.to_be_bytes())
    }

    #[inline]
    fn write_bool(&mut self, value: bool) -> Result<(), StreamError> {
        self.put(&[u8::from(value)])
    }

    #[inline]
    fn write_f32(&mut self, value: f32) -> Result<(), StreamError> {
        self.put(&value.to_bits().to_be_bytes())
    }

    /// Flushes and releases the writer. Closing twice is a no-op.
    fn close(&mut self) -> Result<(), StreamError> {
        if let Some(mut inner) = self.inner.take() {
            inner.flush()?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// BinaryInput

/// A [`TokenSource`] reading what [`BinaryOutput`] wrote.
pub struct BinaryInput<R: Read> {
    inner: Option<R>,
}

impl<R: Read> BinaryInput<R> {
    #[inline]
    pub const fn new(inner: R) -> Self {
        Self { inner: Some(inner) }
    }

    #[inline]
    pub fn into_inner(self) -> Option<R> {
        self.inner
    }

    fn take<const N: usize>(&mut self, kind: TokenKind) -> Result<[u8; N], StreamError> {
        let inner = self.inner.as_mut().ok_or(StreamError::Closed)?;
        let mut buf = [0u8; N];
        inner
            .read_exact(&mut buf)
            .map_err(|e| StreamError::from_read(e, kind))?;
        Ok(buf)
    }

    fn take_string(&mut self, kind: TokenKind) -> Result<String, StreamError> {
        let len = u32::from_be_bytes(self.take::<4>(kind)?);
        let inner = self.inner.as_mut().ok_or(StreamError::Closed)?;
        // Sized by the bytes present, never by the length prefix alone.
        let mut buf = Vec::new();
        inner
            .by_ref()
            .take(len.into())
            .read_to_end(&mut buf)
            .map_err(|e| StreamError::from_read(e, kind))?;
        if buf.len() as u64 != u64::from(len) {
            return Err(StreamError::UnexpectedEof(kind));
        }
        String::from_utf8(buf).map_err(|_| StreamError::InvalidUtf8)
    }
}

impl<R: Read> TokenSource for BinaryInput<R> {
    #[inline]
    fn read_i64(&mut self) -> Result<i64, StreamError> {
        Ok(i64::from_be_bytes(self.take(TokenKind::I64)?))
    }

    #[inline]
    fn read_f64(&mut self) -> Result<f64, StreamError> {
        Ok(f64::from_bits(u64::from_be_bytes(self.take(TokenKind::F64)?)))
    }

    #[inline]
    fn read_string(&mut self) -> Result<String, StreamError> {
        self.take_string(TokenKind::Str)
    }

    #[inline]
    fn read_i32(&mut self) -> Result<i32, StreamError> {
        Ok(i32::from_be_bytes(self.take(TokenKind::I32)?))
    }

    fn read_bool(&mut self) -> Result<bool, StreamError> {
        match self.take::<1>(TokenKind::Bool)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(StreamError::InvalidBool(other)),
        }
    }

    #[inline]
    fn read_f32(&mut self) -> Result<f32, StreamError> {
        Ok(f32::from_bits(u32::from_be_bytes(self.take(TokenKind::F32)?)))
    }

    #[inline]
    fn read_name(&mut self) -> Result<String, StreamError> {
        self.take_string(TokenKind::Name)
    }

    fn close(&mut self) -> Result<(), StreamError> {
        if self.inner.take().is_some() {
            log::trace!("binary token input closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::{BinaryInput, BinaryOutput};
    use crate::{StreamError, TokenKind, TokenSink, TokenSource};

    #[test]
    fn layout_is_big_endian() {
        let mut out = BinaryOutput::new(Vec::new());
        out.write_i32(1).unwrap();
        out.write_bool(true).unwrap();
        out.write_str("ab").unwrap();

        let bytes = out.into_inner().unwrap();
        assert_eq!(bytes, [0, 0, 0, 1, 1, 0, 0, 0, 2, b'a', b'b']);
    }

    #[test]
    fn floats_keep_their_bits() {
        let mut out = BinaryOutput::new(Vec::new());
        out.write_f64(f64::NAN).unwrap();
        out.write_f32(f32::NEG_INFINITY).unwrap();
        out.write_f64(-0.0).unwrap();

        let bytes = out.into_inner().unwrap();
        let mut input = BinaryInput::new(bytes.as_slice());
        assert!(input.read_f64().unwrap().is_nan());
        assert_eq!(input.read_f32().unwrap(), f32::NEG_INFINITY);
        assert!(input.read_f64().unwrap().is_sign_negative());
    }

    #[test]
    fn truncated_and_invalid_input() {
        let mut input = BinaryInput::new(&[0u8, 0][..]);
        assert!(matches!(
            input.read_i32(),
            Err(StreamError::UnexpectedEof(TokenKind::I32))
        ));

        let mut input = BinaryInput::new(&[7u8][..]);
        assert!(matches!(input.read_bool(), Err(StreamError::InvalidBool(7))));

        let mut input = BinaryInput::new(&[0u8, 0, 0, 1, 0xff][..]);
        assert!(matches!(input.read_string(), Err(StreamError::InvalidUtf8)));
    }

    #[test]
    fn corrupt_length_prefix_reads_only_what_is_there() {
        let mut input = BinaryInput::new(&[0xffu8, 0xff, 0xff, 0xff, b'a'][..]);
        assert!(matches!(
            input.read_string(),
            Err(StreamError::UnexpectedEof(TokenKind::Str))
        ));

        let mut input = BinaryInput::new(&[0u8, 0, 0, 3, b'a', b'b'][..]);
        assert!(matches!(
            input.read_name(),
            Err(StreamError::UnexpectedEof(TokenKind::Name))
        ));
    }

    #[test]
    fn close_is_idempotent() {
        let mut out = BinaryOutput::new(Vec::new());
        out.close().unwrap();
        out.close().unwrap();
        assert!(matches!(out.write_i64(0), Err(StreamError::Closed)));
    }
}
