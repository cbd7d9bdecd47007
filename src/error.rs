//! Error types.

use crate::internal::Part;
use core::fmt;

/// Detailed cause of an [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A setter's input fails its component's grammar.
    InvalidPart(Part),
    /// A byte outside the permitted class.
    ///
    /// The error index points to the byte.
    InvalidCharacter,
    /// A percent-encoded octet that is either non-hexadecimal or incomplete.
    ///
    /// The error index points to the percent character `'%'` of the octet.
    InvalidPctEncoding,
    /// A dotted quad whose octet is out of range.
    InvalidIpv4,
    /// An IPv6 address with more than eight groups, or an elision that
    /// elides nothing.
    Ipv6TooManyGroups,
    /// An IPv6 address with fewer than eight groups and no elision.
    Ipv6MissingGroup,
    /// A malformed IPv6 group or separator.
    Ipv6BadGroup,
    /// A malformed IP literal.
    ///
    /// The error index points to the preceding left square bracket `'['`.
    InvalidIpLiteral,
    /// A port string containing a non-digit.
    InvalidPort,
    /// A path that would violate the first-segment rule of the path form
    /// in use.
    InvalidPath,
    /// The storage cannot satisfy an allocation request.
    AllocationFailed,
    /// The top-level parse did not consume all input.
    ///
    /// The error index points to the first unconsumed byte.
    Incomplete,
    /// A grammar alternative did not apply.
    ///
    /// This kind is internal to the parser; rule boundaries replace it
    /// with a specific kind before returning.
    NoMatch,
}

/// An error occurred when parsing or modifying a URI reference.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Error {
    index: usize,
    kind: ErrorKind,
}

impl Error {
    pub(crate) fn new(index: usize, kind: ErrorKind) -> Error {
        Error { index, kind }
    }

    /// Returns the index where the error occurred in the input string.
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the detailed cause of the error.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl std::error::Error for Error {}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("index", &self.index)
            .field("kind", &self.kind)
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self.kind {
            ErrorKind::InvalidPart(part) => {
                return write!(f, "invalid {} at index {}", part_name(part), self.index)
            }
            ErrorKind::InvalidCharacter => "unexpected character",
            ErrorKind::InvalidPctEncoding => "invalid percent-encoded octet",
            ErrorKind::InvalidIpv4 => "invalid IPv4 address",
            ErrorKind::Ipv6TooManyGroups => "too many groups in IPv6 address",
            ErrorKind::Ipv6MissingGroup => "missing group in IPv6 address",
            ErrorKind::Ipv6BadGroup => "malformed group in IPv6 address",
            ErrorKind::InvalidIpLiteral => "invalid IP literal",
            ErrorKind::InvalidPort => "invalid port",
            ErrorKind::InvalidPath => "path violates the first-segment rule",
            ErrorKind::AllocationFailed => "storage allocation failed",
            ErrorKind::Incomplete => "unexpected trailing input",
            ErrorKind::NoMatch => "no matching grammar alternative",
        };
        write!(f, "{} at index {}", msg, self.index)
    }
}

fn part_name(part: Part) -> &'static str {
    match part {
        Part::Scheme => "scheme",
        Part::User => "user",
        Part::Pass => "password",
        Part::Host => "host",
        Part::Port => "port",
        Part::Path => "path",
        Part::Query => "query",
        Part::Fragment => "fragment",
    }
}

pub(crate) type Result<T, E = Error> = core::result::Result<T, E>;
