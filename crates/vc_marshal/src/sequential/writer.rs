use vc_stream::TokenSink;

use crate::context::{ContextStack, FrameState};
use crate::{ErrorKind, MarshalError, Marshaller, Result};

// -----------------------------------------------------------------------------
// SequentialMarshaller

/// A [`Marshaller`] writing to an ordered [`TokenSink`].
///
/// Maps leave no trace in the stream. An array writes its length as one
/// `i32` token, and every scalar writes its value token. When `store_names`
/// is set, each scalar and each array length is preceded by a name token
/// (empty for anonymous array elements) that a reader can verify.
///
/// Several top-level objects may be written one after another;
/// [`check_complete`](Marshaller::check_complete) returns how many.
///
/// # Examples
///
/// ```
/// use vc_marshal::{Marshaller, SequentialMarshaller};
/// use vc_stream::{Token, TokenTape};
///
/// let mut m = SequentialMarshaller::new(TokenTape::new(), true);
/// m.open_map(None).unwrap();
/// m.write_bool(Some("a"), true).unwrap();
/// m.close_map().unwrap();
/// assert_eq!(m.check_complete().unwrap(), 1);
///
/// let tape = m.into_inner();
/// assert_eq!(tape.tokens(), &[Token::Name("a".into()), Token::Bool(true)]);
/// ```
pub struct SequentialMarshaller<S: TokenSink> {
    sink: S,
    store_names: bool,
    closed: bool,
    stack: ContextStack,
}

impl<S: TokenSink> SequentialMarshaller<S> {
    /// Creates a marshaller over `sink`. `store_names` is fixed for the
    /// lifetime of the instance and must match the reader's.
    #[inline]
    pub const fn new(sink: S, store_names: bool) -> Self {
        Self {
            sink,
            store_names,
            closed: false,
            stack: ContextStack::new(),
        }
    }

    #[inline]
    pub fn store_names(&self) -> bool {
        self.store_names
    }

    #[inline]
    pub fn get_ref(&self) -> &S {
        &self.sink
    }

    /// Returns the sink without closing it.
    #[inline]
    pub fn into_inner(self) -> S {
        self.sink
    }

    /// Closes the underlying sink. Later calls are no-ops; every other
    /// operation fails with [`ErrorKind::Closed`] afterwards.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if self.stack.depth() > 0 {
            log::warn!(
                "closing sequential marshaller with {} open context(s)",
                self.stack.depth()
            );
        }
        self.sink.close().map_err(|e| {
            log::warn!("token sink failed to close: {e}");
            self.stack.fail(None, e)
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(self.stack.fail(None, ErrorKind::Closed))
        } else {
            Ok(())
        }
    }

    fn write_name(&mut self, name: Option<&str>) -> Result<()> {
        if self.store_names {
            let token = name.unwrap_or_default();
            self.sink
                .write_name(token)
                .map_err(|e| self.stack.fail(name, e))?;
        }
        Ok(())
    }

    /// Validates `name`, writes the optional name token, then the value.
    fn scalar(
        &mut self,
        name: Option<&str>,
        write: impl FnOnce(&mut S) -> Result<(), vc_stream::StreamError>,
    ) -> Result<()> {
        self.ensure_open()?;
        self.stack.visit_scalar(name)?;
        self.write_name(name)?;
        write(&mut self.sink).map_err(|e| self.stack.fail(name, e))
    }
}

impl<S: TokenSink> Marshaller for SequentialMarshaller<S> {
    fn open_map(&mut self, name: Option<&str>) -> Result<()> {
        self.ensure_open()?;
        self.stack.push_map(name, ())
    }

    fn close_map(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.stack.pop_map().map(drop)
    }

    fn open_array(&mut self, name: Option<&str>, len: usize) -> Result<()> {
        self.ensure_open()?;
        let token = self.stack.declared_len(name, len)?;
        self.stack.enter(name)?;
        self.write_name(name)?;
        self.sink
            .write_i32(token)
            .map_err(|e| self.stack.fail(name, e))?;
        self.stack
            .push(FrameState::Array { len, index: 0 }, name, ());
        Ok(())
    }

    fn close_array(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.stack.pop_array().map(drop)
    }

    fn write_i64(&mut self, name: Option<&str>, value: i64) -> Result<()> {
        self.scalar(name, |sink| sink.write_i64(value))
    }

    fn write_f64(&mut self, name: Option<&str>, value: f64) -> Result<()> {
        self.scalar(name, |sink| sink.write_f64(value))
    }

    fn write_str(&mut self, name: Option<&str>, value: &str) -> Result<()> {
        self.scalar(name, |sink| sink.write_str(value))
    }

    fn write_i32(&mut self, name: Option<&str>, value: i32) -> Result<()> {
        self.scalar(name, |sink| sink.write_i32(value))
    }

    fn write_bool(&mut self, name: Option<&str>, value: bool) -> Result<()> {
        self.scalar(name, |sink| sink.write_bool(value))
    }

    fn write_f32(&mut self, name: Option<&str>, value: f32) -> Result<()> {
        self.scalar(name, |sink| sink.write_f32(value))
    }

    fn check_complete(&mut self) -> Result<usize> {
        self.ensure_open()?;
        self.stack.check_complete()
    }

    #[inline]
    fn fail(&self, name: Option<&str>, kind: ErrorKind) -> MarshalError {
        self.stack.fail(name, kind)
    }
}
