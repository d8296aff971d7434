//! Streaming tokenizer for line-oriented OBJ text
//!
//! The tokenizer reads a byte stream one character at a time and pushes every
//! completed token to a [`TokenHandler`]. Characters of the token being built
//! are collected in a [`Sequence`] working buffer.
//!
//! Classification of the current character, in priority order:
//!
//! 1. `#` in column 1 starts a comment running to the end of the line; the
//!    terminator and any blank lines after it are skipped, nothing is emitted
//! 2. `\n`, `\r` or `\r\n` emit one [`TokenKind::EndLine`]
//! 3. a digit or `-` starts a [`TokenKind::Number`]: optional minus, digits,
//!    and at most one `.` with digits on both sides; a lone `-` is a number
//! 4. a letter or `_` starts a [`TokenKind::Text`] running up to whitespace
//! 5. anything else is skipped
//!
//! When the stream ends inside a number or text, the handler first receives
//! the failure variant of that kind (empty text), then the token itself.

use log::error;
use std::fs::File;
use std::io::{BufReader, Bytes, Read};
use std::ops::ControlFlow;
use std::path::Path;
use wirefront_core::{Error, Result, Sequence};

/// Token categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Text,
    Number,
    EndLine,
}

/// A classified fragment of input, valid for one handler call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// 1-based line where the token starts
    pub line: usize,
    /// 1-based column where the token starts
    pub column: usize,
}

impl<'a> Token<'a> {
    /// Check whether this is the empty token sent when input ends mid-token
    pub fn is_failure(&self) -> bool {
        self.kind != TokenKind::EndLine && self.text.is_empty()
    }
}

/// Receiver of the token stream.
///
/// Returning `ControlFlow::Break(())` cancels tokenizing.
pub trait TokenHandler {
    fn handle(&mut self, token: Token<'_>) -> ControlFlow<()>;
}

impl<F> TokenHandler for F
where
    F: FnMut(Token<'_>) -> ControlFlow<()>,
{
    fn handle(&mut self, token: Token<'_>) -> ControlFlow<()> {
        self(token)
    }
}

/// Character-level tokenizer over a byte stream
pub struct Tokenizer<R: Read> {
    bytes: Bytes<BufReader<R>>,
    line: usize,
    column: usize,
    buffer: Sequence<u8>,
    text: String,
}

impl<R: Read> Tokenizer<R> {
    /// Create a tokenizer reading from `reader`
    pub fn new(reader: R) -> Self {
        Self {
            bytes: BufReader::new(reader).bytes(),
            line: 1,
            column: 0,
            buffer: Sequence::new(),
            text: String::new(),
        }
    }

    /// Current 1-based line
    pub fn line(&self) -> usize {
        self.line
    }

    /// Column of the last character read (1-based, 0 before the first one)
    pub fn column(&self) -> usize {
        self.column
    }

    /// Tokenize the whole stream, feeding `handler`.
    ///
    /// Consumes the tokenizer, so the stream and the working buffer are
    /// released on every exit path.
    pub fn run<H>(mut self, handler: &mut H) -> Result<()>
    where
        H: TokenHandler + ?Sized,
    {
        let mut current = self.advance()?;
        while let Some(c) = current {
            current = match c {
                b'#' if self.column == 1 => self.skip_comment()?,
                b'\n' | b'\r' => self.end_line(c, handler)?,
                b'-' | b'0'..=b'9' => self.number(c, handler)?,
                b'_' | b'a'..=b'z' | b'A'..=b'Z' => self.text(c, handler)?,
                _ => self.advance()?,
            };
        }
        Ok(())
    }

    fn advance(&mut self) -> Result<Option<u8>> {
        match self.bytes.next() {
            Some(byte) => {
                self.column += 1;
                Ok(Some(byte?))
            }
            None => Ok(None),
        }
    }

    // Steps over a terminator; `\r\n` counts as one.
    fn next_line(&mut self, terminator: u8) -> Result<Option<u8>> {
        self.line += 1;
        self.column = 0;
        let next = self.advance()?;
        if terminator == b'\r' && next == Some(b'\n') {
            self.column = 0;
            return self.advance();
        }
        Ok(next)
    }

    fn skip_comment(&mut self) -> Result<Option<u8>> {
        let mut terminator = loop {
            match self.advance()? {
                Some(c @ (b'\n' | b'\r')) => break c,
                Some(_) => {}
                None => return Ok(None),
            }
        };

        loop {
            match self.next_line(terminator)? {
                Some(c @ (b'\n' | b'\r')) => terminator = c,
                next => return Ok(next),
            }
        }
    }

    fn end_line<H>(&mut self, terminator: u8, handler: &mut H) -> Result<Option<u8>>
    where
        H: TokenHandler + ?Sized,
    {
        let (line, column) = (self.line, self.column);
        let next = self.next_line(terminator)?;
        self.deliver(handler, TokenKind::EndLine, false, line, column)?;
        Ok(next)
    }

    fn number<H>(&mut self, first: u8, handler: &mut H) -> Result<Option<u8>>
    where
        H: TokenHandler + ?Sized,
    {
        let (line, column) = (self.line, self.column);
        let mut integral = 0;
        let mut fraction = 0;
        let mut dot = false;

        let mut current = Some(first);
        if first == b'-' {
            self.buffer.push_back(first)?;
            current = self.advance()?;
        }

        loop {
            match current {
                Some(digit @ b'0'..=b'9') => {
                    if dot {
                        fraction += 1;
                    } else {
                        integral += 1;
                    }
                    self.buffer.push_back(digit)?;
                }
                Some(b'.') if !dot && integral > 0 => {
                    dot = true;
                    self.buffer.push_back(b'.')?;
                }
                Some(b'.') => return Err(self.malformed(line, column)),
                Some(_) => break,
                None => {
                    self.deliver(handler, TokenKind::Number, false, line, column)?;
                    break;
                }
            }
            current = self.advance()?;
        }

        // A lone `-` is passed on as is; only dangling dots are fatal.
        if dot && fraction == 0 {
            return Err(self.malformed(line, column));
        }

        self.flush(handler, TokenKind::Number, line, column)?;
        Ok(current)
    }

    fn text<H>(&mut self, first: u8, handler: &mut H) -> Result<Option<u8>>
    where
        H: TokenHandler + ?Sized,
    {
        let (line, column) = (self.line, self.column);

        let mut current = Some(first);
        while let Some(c) = current {
            if is_space(c) {
                break;
            }
            self.buffer.push_back(c)?;
            current = self.advance()?;
        }

        if current.is_none() {
            self.deliver(handler, TokenKind::Text, false, line, column)?;
        }
        self.flush(handler, TokenKind::Text, line, column)?;
        Ok(current)
    }

    // Moves the working buffer into the text scratch and sends it.
    fn flush<H>(&mut self, handler: &mut H, kind: TokenKind, line: usize, column: usize) -> Result<()>
    where
        H: TokenHandler + ?Sized,
    {
        self.text.clear();
        self.text.try_reserve(self.buffer.len())?;
        self.text.extend(self.buffer.iter().map(|&byte| char::from(byte)));
        self.buffer.clear();
        self.deliver(handler, kind, true, line, column)
    }

    fn deliver<H>(
        &self,
        handler: &mut H,
        kind: TokenKind,
        with_text: bool,
        line: usize,
        column: usize,
    ) -> Result<()>
    where
        H: TokenHandler + ?Sized,
    {
        let token = Token {
            kind,
            text: if with_text { &self.text } else { "" },
            line,
            column,
        };

        match handler.handle(token) {
            ControlFlow::Continue(()) => Ok(()),
            ControlFlow::Break(()) => {
                error!("Parsing canceled at line {}[{}]", self.line, self.column);
                Err(Error::Canceled {
                    line: self.line,
                    column: self.column,
                })
            }
        }
    }

    fn malformed(&mut self, line: usize, column: usize) -> Error {
        error!("Invalid number at line {}[{}]", line, column);
        self.buffer.clear();
        Error::MalformedNumber { line, column }
    }
}

// Same set as C `isspace`.
fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Tokenize everything `reader` yields
pub fn tokenize<R, H>(reader: R, handler: &mut H) -> Result<()>
where
    R: Read,
    H: TokenHandler + ?Sized,
{
    Tokenizer::new(reader).run(handler)
}

/// Open the file at `path` and tokenize it
pub fn tokenize_file<P, H>(path: P, handler: &mut H) -> Result<()>
where
    P: AsRef<Path>,
    H: TokenHandler + ?Sized,
{
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(Error::MissingArgument("path"));
    }
    let file = File::open(path)?;
    tokenize(file, handler)
}
