use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use crate::{StreamError, TokenSink, TokenSource};

// -----------------------------------------------------------------------------
// Token

/// The kind of a primitive token, used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    I64,
    F64,
    Str,
    I32,
    Bool,
    F32,
    Name,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::I64 => "i64",
            Self::F64 => "f64",
            Self::Str => "string",
            Self::I32 => "i32",
            Self::Bool => "bool",
            Self::F32 => "f32",
            Self::Name => "name",
        })
    }
}

/// One primitive token held by a [`TokenTape`].
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    I64(i64),
    F64(f64),
    Str(String),
    I32(i32),
    Bool(bool),
    F32(f32),
    Name(String),
}

impl Token {
    #[inline]
    pub const fn kind(&self) -> TokenKind {
        match self {
            Self::I64(_) => TokenKind::I64,
            Self::F64(_) => TokenKind::F64,
            Self::Str(_) => TokenKind::Str,
            Self::I32(_) => TokenKind::I32,
            Self::Bool(_) => TokenKind::Bool,
            Self::F32(_) => TokenKind::F32,
            Self::Name(_) => TokenKind::Name,
        }
    }
}

// -----------------------------------------------------------------------------
// TokenTape

/// An in-memory token stream that can be written and then read back.
///
/// Name tokens are kept as [`Token::Name`], separate from string data, so the
/// physical layout of a stream can be inspected token by token.
///
/// # Examples
///
/// ```
/// use vc_stream::{Token, TokenSink, TokenSource, TokenTape};
///
/// let mut tape = TokenTape::new();
/// tape.write_name("x").unwrap();
/// tape.write_i32(7).unwrap();
///
/// assert_eq!(tape.tokens(), &[Token::Name("x".into()), Token::I32(7)]);
/// assert_eq!(tape.read_name().unwrap(), "x");
/// assert_eq!(tape.read_i32().unwrap(), 7);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TokenTape {
    tokens: Vec<Token>,
    cursor: usize,
    closed: bool,
}

impl TokenTape {
    /// Creates an empty tape.
    #[inline]
    pub const fn new() -> Self {
        Self {
            tokens: Vec::new(),
            cursor: 0,
            closed: false,
        }
    }

    /// Creates a tape positioned before the first of `tokens`.
    #[inline]
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            cursor: 0,
            closed: false,
        }
    }

    /// All tokens written so far, including those already read.
    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of tokens not yet read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.cursor
    }

    /// Moves the read cursor back to the first token.
    #[inline]
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[inline]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    fn push(&mut self, token: Token) -> Result<(), StreamError> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        self.tokens.push(token);
        Ok(())
    }

    fn next(&mut self, expected: TokenKind) -> Result<Token, StreamError> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        let Some(token) = self.tokens.get(self.cursor) else {
            return Err(StreamError::UnexpectedEof(expected));
        };
        if token.kind() != expected {
            return Err(StreamError::TokenMismatch {
                expected,
                found: token.kind(),
            });
        }
        self.cursor += 1;
        Ok(token.clone())
    }
}

macro_rules! take {
    ($tape:ident, $variant:ident) => {
        match $tape.next(TokenKind::$variant)? {
            Token::$variant(v) => Ok(v),
            // `next` has checked the kind.
            _ => unreachable!(),
        }
    };
}

impl TokenSink for TokenTape {
    #[inline]
    fn write_i64(&mut self, value: i64) -> Result<(), StreamError> {
        self.push(Token::I64(value))
    }

    #[inline]
    fn write_f64(&mut self, value: f64) -> Result<(), StreamError> {
        self.push(Token::F64(value))
    }

    #[inline]
    fn write_str(&mut self, value: &str) -> Result<(), StreamError> {
        self.push(Token::Str(value.to_string()))
    }

    #[inline]
    fn write_i32(&mut self, value: i32) -> Result<(), StreamError> {
        self.push(Token::I32(value))
    }

    #[inline]
    fn write_bool(&mut self, value: bool) -> Result<(), StreamError> {
        self.push(Token::Bool(value))
    }

    #[inline]
    fn write_f32(&mut self, value: f32) -> Result<(), StreamError> {
        self.push(Token::F32(value))
    }

    #[inline]
    fn write_name(&mut self, name: &str) -> Result<(), StreamError> {
        self.push(Token::Name(name.to_string()))
    }

    fn close(&mut self) -> Result<(), StreamError> {
        self.closed = true;
        Ok(())
    }
}

impl TokenSource for TokenTape {
    fn read_i64(&mut self) -> Result<i64, StreamError> {
        take!(self, I64)
    }

    fn read_f64(&mut self) -> Result<f64, StreamError> {
        take!(self, F64)
    }

    fn read_string(&mut self) -> Result<String, StreamError> {
        take!(self, Str)
    }

    fn read_i32(&mut self) -> Result<i32, StreamError> {
        take!(self, I32)
    }

    fn read_bool(&mut self) -> Result<bool, StreamError> {
        take!(self, Bool)
    }

    fn read_f32(&mut self) -> Result<f32, StreamError> {
        take!(self, F32)
    }

    fn read_name(&mut self) -> Result<String, StreamError> {
        take!(self, Name)
    }

    fn close(&mut self) -> Result<(), StreamError> {
        self.closed = true;
        Ok(())
    }
}
