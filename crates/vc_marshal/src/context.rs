//! The context stack shared by every backend.
//!
//! A pass starts at the root. Opening a map or an array pushes a frame,
//! closing pops it, and every primitive transfer first asks the innermost
//! frame whether the given name is acceptable there:
//!
//! | context | name rule                          | extra rule                        |
//! |---------|------------------------------------|-----------------------------------|
//! | root    | children are anonymous             | no scalars, one child at a time   |
//! | map     | names are required and unique      |                                   |
//! | array   | elements are anonymous             | at most the declared length       |
//!
//! Closing an array requires exactly the declared number of elements.
//!
//! Backends differ in what they keep per frame (nothing for a token stream,
//! the tree node under construction for a JSON writer, the remaining source
//! nodes for a JSON reader), so [`ContextStack`] is generic over that payload.

use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use foldhash::fast::FixedState;
use hashbrown::HashSet;

use crate::{ErrorKind, MarshalError, Result, StructureError};

/// A fixed seed, so name sets behave the same from run to run.
const NAME_SET_SEED: u64 = 0x95EE04C4F326B271;

pub(crate) type NameSet = HashSet<String, FixedState>;

// -----------------------------------------------------------------------------
// ContextKind

/// The three kinds of context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    Root,
    Map,
    Array,
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Root => "root",
            Self::Map => "map",
            Self::Array => "array",
        })
    }
}

// -----------------------------------------------------------------------------
// Frame

/// Bookkeeping of one open map or array.
#[derive(Debug)]
pub(crate) enum FrameState {
    Map { seen: NameSet },
    Array { len: usize, index: usize },
}

impl FrameState {
    #[inline]
    pub fn kind(&self) -> ContextKind {
        match self {
            Self::Map { .. } => ContextKind::Map,
            Self::Array { .. } => ContextKind::Array,
        }
    }
}

/// An open map or array, the name it was opened under, and the backend's
/// payload for it.
#[derive(Debug)]
pub(crate) struct Frame<P> {
    pub state: FrameState,
    pub label: Option<String>,
    pub payload: P,
}

// -----------------------------------------------------------------------------
// ContextStack

/// The stack of open contexts for one pass over one backend instance.
///
/// The root is implicit: it is current whenever no frame is open. It counts
/// the top-level objects that have been closed so far. A stack created with
/// [`single`](Self::single) accepts only one top-level object.
#[derive(Debug)]
pub(crate) struct ContextStack<P = ()> {
    frames: Vec<Frame<P>>,
    completed: usize,
    single: bool,
}

impl<P> ContextStack<P> {
    /// A stack whose root accepts any number of sequential top-level objects.
    #[inline]
    pub const fn new() -> Self {
        Self {
            frames: Vec::new(),
            completed: 0,
            single: false,
        }
    }

    /// A stack whose root accepts exactly one top-level object.
    #[inline]
    pub const fn single() -> Self {
        Self {
            frames: Vec::new(),
            completed: 0,
            single: true,
        }
    }

    /// Number of open contexts below the root.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn current_kind(&self) -> ContextKind {
        self.frames
            .last()
            .map_or(ContextKind::Root, |frame| frame.state.kind())
    }

    #[inline]
    pub fn top(&self) -> Option<&Frame<P>> {
        self.frames.last()
    }

    #[inline]
    pub fn top_mut(&mut self) -> Option<&mut Frame<P>> {
        self.frames.last_mut()
    }

    // -------------------------------------------------------------------------
    // Name acceptance

    /// Accepts a primitive transfer named `name` in the current context.
    pub fn visit_scalar(&mut self, name: Option<&str>) -> Result<()> {
        if self.frames.is_empty() {
            return Err(self.fail(name, StructureError::ScalarAtRoot));
        }
        self.accept(name)
    }

    /// Accepts a child context named `name` in the current context, without
    /// pushing it yet. Follow with [`push`](Self::push).
    pub fn enter(&mut self, name: Option<&str>) -> Result<()> {
        if !self.frames.is_empty() {
            return self.accept(name);
        }
        if let Some(name) = name {
            return Err(self.fail(None, StructureError::NamedRoot(name.to_owned())));
        }
        if self.single && self.completed > 0 {
            return Err(self.fail(None, StructureError::RootExhausted));
        }
        Ok(())
    }

    fn accept(&mut self, name: Option<&str>) -> Result<()> {
        let Some(frame) = self.frames.last_mut() else {
            return Ok(());
        };
        let err: StructureError = match (&mut frame.state, name) {
            (FrameState::Map { seen }, Some(name)) => {
                if seen.insert(name.to_owned()) {
                    return Ok(());
                }
                StructureError::DuplicateName(name.to_owned())
            }
            (FrameState::Map { .. }, None) => StructureError::MissingName,
            (FrameState::Array { .. }, Some(name)) => StructureError::UnexpectedName(name.to_owned()),
            (FrameState::Array { len, index }, None) => {
                if *index < *len {
                    *index += 1;
                    return Ok(());
                }
                StructureError::ArrayOverrun { declared: *len }
            }
        };
        Err(self.fail(name, err))
    }

    // -------------------------------------------------------------------------
    // Push and pop

    /// Pushes a frame accepted by [`enter`](Self::enter).
    pub fn push(&mut self, state: FrameState, name: Option<&str>, payload: P) {
        log::trace!("open {} at {}", state.kind(), self.location(name));
        self.frames.push(Frame {
            state,
            label: name.map(ToOwned::to_owned),
            payload,
        });
    }

    /// [`enter`](Self::enter) followed by pushing an empty map frame.
    pub fn push_map(&mut self, name: Option<&str>, payload: P) -> Result<()> {
        self.enter(name)?;
        self.push(FrameState::Map { seen: new_name_set() }, name, payload);
        Ok(())
    }

    /// [`enter`](Self::enter) followed by pushing an array frame of `len` elements.
    pub fn push_array(&mut self, name: Option<&str>, len: usize, payload: P) -> Result<()> {
        self.enter(name)?;
        self.push(FrameState::Array { len, index: 0 }, name, payload);
        Ok(())
    }

    /// Checks a length declared by a writer. Every backend caps arrays at
    /// `i32::MAX` elements, the widest length a token stream can carry.
    pub fn declared_len(&self, name: Option<&str>, len: usize) -> Result<i32> {
        i32::try_from(len).map_err(|_| {
            self.fail(name, ErrorKind::Range {
                value: i64::try_from(len).unwrap_or(i64::MAX),
                min: 0,
                max: i32::MAX.into(),
            })
        })
    }

    /// Checks that the innermost context is a map and pops it.
    pub fn pop_map(&mut self) -> Result<Frame<P>> {
        self.expect_top(ContextKind::Map)?;
        self.pop(ContextKind::Map)
    }

    /// Checks that the innermost context is an array holding exactly its
    /// declared number of elements, and pops it.
    pub fn pop_array(&mut self) -> Result<Frame<P>> {
        self.expect_top(ContextKind::Array)?;
        if let Some(Frame {
            state: FrameState::Array { len, index },
            ..
        }) = self.frames.last()
            && index != len
        {
            let err = StructureError::ArrayLength {
                declared: *len,
                actual: *index,
            };
            return Err(self.fail(None, err));
        }
        self.pop(ContextKind::Array)
    }

    /// Fails unless the innermost open context is of `expected` kind.
    pub fn expect_top(&self, expected: ContextKind) -> Result<()> {
        let found = self.current_kind();
        if found == expected {
            Ok(())
        } else {
            Err(self.fail(None, StructureError::MismatchedClose { expected, found }))
        }
    }

    fn pop(&mut self, expected: ContextKind) -> Result<Frame<P>> {
        let location = self.location(None);
        let Some(frame) = self.frames.pop() else {
            let found = ContextKind::Root;
            return Err(self.fail(None, StructureError::MismatchedClose { expected, found }));
        };
        log::trace!("close {expected} at {location}");
        if self.frames.is_empty() {
            self.completed += 1;
            log::trace!("top-level object #{} complete", self.completed);
        }
        Ok(frame)
    }

    // -------------------------------------------------------------------------
    // Completion

    /// The completion check: fails if any context is still open, otherwise
    /// returns the number of complete top-level objects.
    pub fn check_complete(&self) -> Result<usize> {
        if self.frames.is_empty() {
            Ok(self.completed)
        } else {
            Err(self.fail(None, ErrorKind::Incomplete {
                open: self.frames.len(),
            }))
        }
    }

    // -------------------------------------------------------------------------
    // Locations

    /// Builds an error located at the current context, extended by `name`.
    pub fn fail(&self, name: Option<&str>, kind: impl Into<ErrorKind>) -> MarshalError {
        MarshalError::new(kind, self.location(name))
    }

    /// Renders the path to the current context, extended by `name`.
    ///
    /// Array elements are shown by their position among the elements
    /// accepted so far.
    #[cfg(feature = "debug")]
    pub fn location(&self, name: Option<&str>) -> String {
        let mut out = String::from("root");
        let mut parent: Option<&FrameState> = None;
        for frame in &self.frames {
            push_segment(&mut out, parent, frame.label.as_deref());
            parent = Some(&frame.state);
        }
        push_segment(&mut out, parent, name);
        out
    }

    /// Renders the innermost segment of the path, extended by `name`.
    #[cfg(not(feature = "debug"))]
    pub fn location(&self, name: Option<&str>) -> String {
        let mut out = String::new();
        let len = self.frames.len();
        push_segment(&mut out, self.frames.last().map(|f| &f.state), name);
        if out.is_empty()
            && let Some(frame) = self.frames.last()
        {
            let parent = len.checked_sub(2).map(|i| &self.frames[i].state);
            push_segment(&mut out, parent, frame.label.as_deref());
        }
        if out.is_empty() {
            out.push_str("root");
        }
        out
    }
}

fn push_segment(out: &mut String, parent: Option<&FrameState>, name: Option<&str>) {
    use core::fmt::Write;

    match (parent, name) {
        (_, Some(name)) => {
            out.push('.');
            out.push_str(name);
        }
        (Some(FrameState::Array { index, .. }), None) => {
            let _ = write!(out, "[{}]", index.saturating_sub(1));
        }
        _ => {}
    }
}

#[inline]
pub(crate) fn new_name_set() -> NameSet {
    HashSet::with_hasher(FixedState::with_seed(NAME_SET_SEED))
}
