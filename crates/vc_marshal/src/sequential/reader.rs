use alloc::string::String;

use vc_stream::{StreamError, TokenSource};

use crate::context::{ContextStack, FrameState};
use crate::{ErrorKind, MarshalError, Result, StructureError, Unmarshaller};

// -----------------------------------------------------------------------------
// SequentialUnmarshaller

/// An [`Unmarshaller`] reading what a [`SequentialMarshaller`] wrote.
///
/// Structure is recovered purely from the order of calls, so the reader must
/// walk the same schema as the writer. With `store_names` set, each stored
/// name token is compared with the requested name and a disagreement fails
/// with [`ErrorKind::NameMismatch`].
///
/// [`SequentialMarshaller`]: crate::SequentialMarshaller
pub struct SequentialUnmarshaller<S: TokenSource> {
    source: S,
    store_names: bool,
    closed: bool,
    stack: ContextStack,
}

impl<S: TokenSource> SequentialUnmarshaller<S> {
    #[inline]
    pub const fn new(source: S, store_names: bool) -> Self {
        Self {
            source,
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
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Closes the underlying source; see [`SequentialMarshaller::close`].
    ///
    /// [`SequentialMarshaller::close`]: crate::SequentialMarshaller::close
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.source.close().map_err(|e| {
            log::warn!("token source failed to close: {e}");
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

    fn check_name(&mut self, name: Option<&str>) -> Result<()> {
        if !self.store_names {
            return Ok(());
        }
        let expected = name.unwrap_or_default();
        let found = self
            .source
            .read_name()
            .map_err(|e| self.stack.fail(name, e))?;
        if found == expected {
            Ok(())
        } else {
            Err(self.stack.fail(name, ErrorKind::NameMismatch {
                expected: expected.into(),
                found,
            }))
        }
    }

    /// Validates `name`, checks the optional name token, then reads the value.
    fn scalar<T>(
        &mut self,
        name: Option<&str>,
        read: impl FnOnce(&mut S) -> Result<T, StreamError>,
    ) -> Result<T> {
        self.ensure_open()?;
        self.stack.visit_scalar(name)?;
        self.check_name(name)?;
        read(&mut self.source).map_err(|e| self.stack.fail(name, e))
    }
}

impl<S: TokenSource> Unmarshaller for SequentialUnmarshaller<S> {
    fn open_map(&mut self, name: Option<&str>) -> Result<()> {
        self.ensure_open()?;
        self.stack.push_map(name, ())
    }

    fn close_map(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.stack.pop_map().map(drop)
    }

    fn open_array(&mut self, name: Option<&str>) -> Result<usize> {
        self.ensure_open()?;
        self.stack.enter(name)?;
        self.check_name(name)?;
        let token = self
            .source
            .read_i32()
            .map_err(|e| self.stack.fail(name, e))?;
        let Ok(len) = usize::try_from(token) else {
            return Err(self.stack.fail(name, StructureError::NegativeLength(token)));
        };
        self.stack
            .push(FrameState::Array { len, index: 0 }, name, ());
        Ok(len)
    }

    fn close_array(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.stack.pop_array().map(drop)
    }

    fn read_i64(&mut self, name: Option<&str>) -> Result<i64> {
        self.scalar(name, S::read_i64)
    }

    fn read_f64(&mut self, name: Option<&str>) -> Result<f64> {
        self.scalar(name, S::read_f64)
    }

    fn read_string(&mut self, name: Option<&str>) -> Result<String> {
        self.scalar(name, S::read_string)
    }

    fn read_i32(&mut self, name: Option<&str>) -> Result<i32> {
        self.scalar(name, S::read_i32)
    }

    fn read_bool(&mut self, name: Option<&str>) -> Result<bool> {
        self.scalar(name, S::read_bool)
    }

    fn read_f32(&mut self, name: Option<&str>) -> Result<f32> {
        self.scalar(name, S::read_f32)
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
