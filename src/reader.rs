use crate::Error;
use serde::de::DeserializeOwned;
use std::io::{BufRead, ErrorKind};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    /// `[` not consumed yet
    Start,

    /// Inside the array, nothing decoded yet
    First,

    /// Inside the array, after an element
    Rest,

    /// `]` consumed
    Closed,
}

/// Pull-based reader over a JSON array.
///
/// The surrounding brackets are consumed as framing, elements are decoded
/// one at a time straight from the underlying reader, so at most one element
/// is held in memory.
///
/// ```
/// use brc_racer::ArrayReader;
///
/// #[derive(serde::Deserialize)]
/// struct Item {
///     n: u32,
/// }
///
/// let mut reader = ArrayReader::new(&br#"[{"n": 1}, {"n": 2}, {"n": 3}]"#[..]);
/// reader.open()?;
///
/// let mut sum = 0;
/// while reader.has_next()? {
///     sum += reader.decode::<Item>()?.n;
/// }
/// reader.close()?;
///
/// assert_eq!(6, sum);
/// # Ok::<(), brc_racer::Error>(())
/// ```
pub struct ArrayReader<R: BufRead> {
    inner: R,
    state: State,
}

impl<R: BufRead> ArrayReader<R> {
    /// Wraps a buffered reader positioned before the opening bracket.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            state: State::Start,
        }
    }

    /// Consumes the opening `[`.
    ///
    /// # Errors
    ///
    /// Returns error if the input does not start with an array.
    pub fn open(&mut self) -> crate::Result<()> {
        self.expect(b'[', "'['")?;
        self.state = State::First;
        Ok(())
    }

    /// Returns `true` if another element follows.
    ///
    /// Consumes the separating `,` if there is one.
    ///
    /// # Errors
    ///
    /// Returns error on I/O failure, if the array is not open or if neither
    /// a separator nor the closing bracket follows an element.
    pub fn has_next(&mut self) -> crate::Result<bool> {
        let expected = match self.state {
            State::First => "a value or ']'",
            State::Rest => "',' or ']'",
            State::Start => return Err(self.not_opened()),
            State::Closed => return Ok(false),
        };

        match self.peek()? {
            Some(b']') => Ok(false),
            Some(b',') if self.state == State::Rest => {
                self.inner.consume(1);
                Ok(true)
            }
            Some(_) if self.state == State::First => Ok(true),
            found => Err(Error::UnexpectedToken { expected, found }),
        }
    }

    /// Decodes exactly one element.
    ///
    /// Should only be called after [`ArrayReader::has_next`] returned `true`.
    /// Elements must not be bare numbers: a number needs one byte of
    /// lookahead to end, which would swallow the separator.
    ///
    /// # Errors
    ///
    /// Returns error if the element is malformed or does not match `T`.
    pub fn decode<T: DeserializeOwned>(&mut self) -> crate::Result<T> {
        debug_assert!(matches!(self.state, State::First | State::Rest));

        // NOTE: serde_json's reader does not look ahead past the end of an
        // object or string, so the next separator stays in our buffer
        let mut de = serde_json::Deserializer::from_reader(&mut self.inner);
        let item = T::deserialize(&mut de)?;

        self.state = State::Rest;
        Ok(item)
    }

    /// Consumes the closing `]`.
    ///
    /// Nothing after the bracket is read.
    ///
    /// # Errors
    ///
    /// Returns error if the array is not closed here.
    pub fn close(&mut self) -> crate::Result<()> {
        if self.state == State::Start {
            return Err(self.not_opened());
        }
        self.expect(b']', "']'")?;
        self.state = State::Closed;
        Ok(())
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn not_opened(&mut self) -> Error {
        match self.peek() {
            Ok(found) => Error::UnexpectedToken {
                expected: "an opened array",
                found,
            },
            Err(e) => e,
        }
    }

    fn expect(&mut self, byte: u8, expected: &'static str) -> crate::Result<()> {
        match self.peek()? {
            Some(found) if found == byte => {
                self.inner.consume(1);
                Ok(())
            }
            found => Err(Error::UnexpectedToken { expected, found }),
        }
    }

    /// Skips whitespace and returns the next byte without consuming it.
    fn peek(&mut self) -> crate::Result<Option<u8>> {
        loop {
            let buf = match self.inner.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            if buf.is_empty() {
                return Ok(None);
            }

            let whitespace = buf
                .iter()
                .take_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
                .count();

            let next = buf.get(whitespace).copied();
            let len = buf.len();

            if let Some(byte) = next {
                self.inner.consume(whitespace);
                return Ok(Some(byte));
            }

            self.inner.consume(len);
        }
    }
}
