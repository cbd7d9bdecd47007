//! A non-owning read-only view over a parsed URI reference.

use crate::{
    encoding::{self, Decode, EStr},
    error::Result,
    internal::{HostKind, Part, Parts},
    parser,
};
use core::{cmp::Ordering, fmt, hash, iter::FusedIterator};
use std::net::{Ipv4Addr, Ipv6Addr};

#[cfg(feature = "serde")]
use serde::{Serialize, Serializer};

/// A borrowed URI reference defined in [RFC 3986].
///
/// A `Uri` pins a byte span together with its component index; it
/// borrows both and mutates neither. The owning counterpart is
/// [`UriBuf`](crate::UriBuf).
///
/// [RFC 3986]: https://datatracker.ietf.org/doc/html/rfc3986/
///
/// # Examples
///
/// ```
/// use uribuf::{HostKind, Uri};
///
/// let uri = Uri::parse("foo://user@example.com:8042/over/there?name=ferret#nose")?;
///
/// assert_eq!(uri.scheme(), "foo");
/// assert_eq!(uri.encoded_user(), "user");
/// assert_eq!(uri.encoded_host(), "example.com");
/// assert_eq!(uri.host_kind(), HostKind::Name);
/// assert_eq!(uri.port_number(), 8042);
/// assert!(uri.path_segments().eq(["over", "there"]));
/// assert_eq!(uri.encoded_fragment(), "nose");
/// # Ok::<_, uribuf::Error>(())
/// ```
#[derive(Clone, Copy)]
pub struct Uri<'a> {
    s: &'a str,
    parts: Parts,
}

impl<'a> Uri<'a> {
    /// Parses a URI reference from a string into a `Uri`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the string does not match the `URI-reference`
    /// ABNF rule from RFC 3986. The error carries the index of the
    /// offending byte.
    pub fn parse(s: &'a str) -> Result<Uri<'a>> {
        let parts = parser::parse(s.as_bytes())?;
        Ok(Uri { s, parts })
    }

    pub(crate) fn from_raw_parts(s: &'a str, parts: Parts) -> Uri<'a> {
        debug_assert!(parts.is_coherent(s.len()));
        Uri { s, parts }
    }

    pub(crate) fn parts(&self) -> &Parts {
        &self.parts
    }

    /// Returns the URI reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &'a str {
        self.s
    }

    fn content(&self, part: Part) -> &'a str {
        let (start, end) = parser::content_bounds(&self.parts, part, self.s.as_bytes());
        &self.s[start..end]
    }

    fn econtent(&self, part: Part) -> &'a EStr {
        EStr::new_validated(self.content(part))
    }

    fn decode_part(&self, part: Part) -> Decode<'a> {
        let content = self.content(part);
        let decoded = self.parts.decoded[part as usize];
        if decoded == content.len() {
            Decode::Borrowed(content)
        } else {
            Decode::Owned(encoding::decode_unchecked_with(content.as_bytes(), decoded))
        }
    }

    /// Checks whether a scheme component is present.
    #[must_use]
    pub fn has_scheme(&self) -> bool {
        self.parts.len(Part::Scheme) != 0
    }

    /// Returns the scheme component, or an empty string if absent.
    ///
    /// The trailing colon is not included.
    #[must_use]
    pub fn scheme(&self) -> &'a str {
        self.content(Part::Scheme)
    }

    /// Checks whether an authority component is present.
    ///
    /// An authority is present, even an empty one, iff the serialized
    /// form contains the leading double slash.
    #[must_use]
    pub fn has_authority(&self) -> bool {
        self.parts.len(Part::User) != 0
    }

    /// Returns the authority component without the double slash, or an
    /// empty slice if absent.
    #[must_use]
    pub fn encoded_authority(&self) -> &'a EStr {
        let s = self.parts.get_span(Part::User, Part::Port, self.s);
        EStr::new_validated(s.strip_prefix("//").unwrap_or(s))
    }

    /// Checks whether a userinfo subcomponent is present.
    #[must_use]
    pub fn has_userinfo(&self) -> bool {
        self.parts.len(Part::Pass) != 0
    }

    /// Returns the userinfo subcomponent without the at sign, or an
    /// empty slice if absent.
    #[must_use]
    pub fn encoded_userinfo(&self) -> &'a EStr {
        let s = self.parts.get_span(Part::User, Part::Pass, self.s);
        let s = s.strip_prefix("//").unwrap_or(s);
        EStr::new_validated(s.strip_suffix('@').unwrap_or(s))
    }

    /// Returns the user subcomponent, or an empty slice if absent.
    #[must_use]
    pub fn encoded_user(&self) -> &'a EStr {
        self.econtent(Part::User)
    }

    /// Returns the percent-decoded user subcomponent.
    #[must_use]
    pub fn user(&self) -> Decode<'a> {
        self.decode_part(Part::User)
    }

    /// Checks whether a password subcomponent is present.
    #[must_use]
    pub fn has_password(&self) -> bool {
        self.parts
            .get(Part::Pass, self.s)
            .starts_with(':')
    }

    /// Returns the password subcomponent, or an empty slice if absent.
    #[must_use]
    pub fn encoded_password(&self) -> &'a EStr {
        self.econtent(Part::Pass)
    }

    /// Returns the percent-decoded password subcomponent.
    #[must_use]
    pub fn password(&self) -> Decode<'a> {
        self.decode_part(Part::Pass)
    }

    /// Returns the host subcomponent, or an empty slice if absent.
    ///
    /// An IP literal keeps its square brackets.
    #[must_use]
    pub fn encoded_host(&self) -> &'a EStr {
        self.econtent(Part::Host)
    }

    /// Returns the percent-decoded host subcomponent.
    #[must_use]
    pub fn host(&self) -> Decode<'a> {
        self.decode_part(Part::Host)
    }

    /// Returns the kind of the host subcomponent.
    #[must_use]
    pub fn host_kind(&self) -> HostKind {
        self.parts.host_kind
    }

    /// Returns the IPv4 address of the host, or the unspecified address
    /// (`0.0.0.0`) when the host is not an IPv4 address.
    #[must_use]
    pub fn ipv4(&self) -> Ipv4Addr {
        let ip = &self.parts.ip;
        match self.parts.host_kind {
            HostKind::Ipv4 => Ipv4Addr::new(ip[0], ip[1], ip[2], ip[3]),
            _ => Ipv4Addr::UNSPECIFIED,
        }
    }

    /// Returns the IPv6 address of the host, or the unspecified address
    /// (`::`) when the host is not an IPv6 address.
    #[must_use]
    pub fn ipv6(&self) -> Ipv6Addr {
        match self.parts.host_kind {
            HostKind::Ipv6 => Ipv6Addr::from(self.parts.ip),
            _ => Ipv6Addr::UNSPECIFIED,
        }
    }

    /// Returns the IPvFuture address text without the brackets, or an
    /// empty string when the host is not an IPvFuture address.
    #[must_use]
    pub fn ipv_future(&self) -> &'a str {
        match self.parts.host_kind {
            HostKind::IpvFuture => {
                let host = self.content(Part::Host);
                &host[1..host.len() - 1]
            }
            _ => "",
        }
    }

    /// Returns the host and port subcomponents, or an empty slice if
    /// the authority is absent.
    #[must_use]
    pub fn encoded_host_and_port(&self) -> &'a str {
        self.parts.get_span(Part::Host, Part::Port, self.s)
    }

    /// Checks whether a port subcomponent is present.
    ///
    /// A port is present, even an empty one, iff the authority contains
    /// its leading colon.
    #[must_use]
    pub fn has_port(&self) -> bool {
        self.parts.len(Part::Port) != 0
    }

    /// Returns the port subcomponent as text, or an empty string if
    /// absent.
    #[must_use]
    pub fn port(&self) -> &'a str {
        self.content(Part::Port)
    }

    /// Returns the numeric port, or zero when the port is absent or
    /// does not fit in sixteen bits.
    #[must_use]
    pub fn port_number(&self) -> u16 {
        self.parts.port_number
    }

    /// Returns everything up to the path: the scheme and the authority.
    #[must_use]
    pub fn encoded_origin(&self) -> &'a str {
        self.parts.get_span(Part::Scheme, Part::Port, self.s)
    }

    /// Returns the path component.
    ///
    /// The path component is always present, although it may be empty.
    #[must_use]
    pub fn encoded_path(&self) -> &'a EStr {
        self.econtent(Part::Path)
    }

    /// Returns the number of path segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.parts.nseg
    }

    /// Returns an iterator over the path segments.
    ///
    /// The empty string before a leading slash is not a segment; every
    /// other slash-separated piece is, including empty ones.
    ///
    /// # Examples
    ///
    /// ```
    /// use uribuf::Uri;
    ///
    /// let uri = Uri::parse("file:///path/to//dir/")?;
    /// assert!(uri.path_segments().eq(["path", "to", "", "dir", ""]));
    ///
    /// let uri = Uri::parse("http://example.com")?;
    /// assert_eq!(uri.path_segments().count(), 0);
    /// # Ok::<_, uribuf::Error>(())
    /// ```
    pub fn path_segments(&self) -> Segments<'a> {
        let path = self.content(Part::Path);
        Segments {
            path: path.strip_prefix('/').unwrap_or(path),
            count: self.parts.nseg,
        }
    }

    /// Checks whether a query component is present.
    #[must_use]
    pub fn has_query(&self) -> bool {
        self.parts.len(Part::Query) != 0
    }

    /// Returns the query component without the question mark, or an
    /// empty slice if absent.
    #[must_use]
    pub fn encoded_query(&self) -> &'a EStr {
        self.econtent(Part::Query)
    }

    /// Returns the percent-decoded query component.
    #[must_use]
    pub fn query(&self) -> Decode<'a> {
        self.decode_part(Part::Query)
    }

    /// Returns the number of query parameters.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.parts.nparam
    }

    /// Returns an iterator over the query parameters.
    ///
    /// Each parameter is an encoded key and an optional encoded value;
    /// a parameter without an equals sign has no value, which is
    /// distinct from an empty one.
    ///
    /// # Examples
    ///
    /// ```
    /// use uribuf::Uri;
    ///
    /// let uri = Uri::parse("http://x/?a=&b")?;
    /// let params: Vec<_> = uri
    ///     .query_params()
    ///     .map(|(k, v)| (k.as_str(), v.map(|v| v.as_str())))
    ///     .collect();
    /// assert_eq!(params, [("a", Some("")), ("b", None)]);
    /// # Ok::<_, uribuf::Error>(())
    /// ```
    pub fn query_params(&self) -> Params<'a> {
        Params {
            query: self.content(Part::Query),
            count: self.parts.nparam,
        }
    }

    /// Checks whether a fragment component is present.
    #[must_use]
    pub fn has_fragment(&self) -> bool {
        self.parts.len(Part::Fragment) != 0
    }

    /// Returns the fragment component without the hash mark, or an
    /// empty slice if absent.
    #[must_use]
    pub fn encoded_fragment(&self) -> &'a EStr {
        self.econtent(Part::Fragment)
    }

    /// Returns the percent-decoded fragment component.
    #[must_use]
    pub fn fragment(&self) -> Decode<'a> {
        self.decode_part(Part::Fragment)
    }

    /// Returns the length the component's content will occupy once
    /// percent-decoded.
    #[must_use]
    pub fn decoded_len(&self, part: Part) -> usize {
        self.parts.decoded[part as usize]
    }

    /// Checks whether the URI reference is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }
}

impl Default for Uri<'_> {
    /// Creates an empty URI reference.
    fn default() -> Self {
        Uri {
            s: "",
            parts: Parts::EMPTY,
        }
    }
}

impl PartialEq for Uri<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.s == other.s
    }
}

impl PartialEq<str> for Uri<'_> {
    fn eq(&self, other: &str) -> bool {
        self.s == other
    }
}

impl PartialEq<Uri<'_>> for str {
    fn eq(&self, other: &Uri<'_>) -> bool {
        self == other.s
    }
}

impl PartialEq<&str> for Uri<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.s == *other
    }
}

impl Eq for Uri<'_> {}

impl hash::Hash for Uri<'_> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.s.hash(state);
    }
}

impl PartialOrd for Uri<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Uri<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.s.cmp(other.s)
    }
}

impl<'a> TryFrom<&'a str> for Uri<'a> {
    type Error = crate::Error;

    /// Equivalent to [`parse`](Self::parse).
    fn try_from(value: &'a str) -> Result<Self> {
        Uri::parse(value)
    }
}

impl fmt::Debug for Uri<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Uri")
            .field("scheme", &self.scheme())
            .field("user", &self.encoded_user())
            .field("password", &self.encoded_password())
            .field("host", &self.encoded_host())
            .field("port", &self.port())
            .field("path", &self.encoded_path())
            .field("query", &self.encoded_query())
            .field("fragment", &self.encoded_fragment())
            .finish()
    }
}

impl fmt::Display for Uri<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.s, f)
    }
}

#[cfg(feature = "serde")]
impl Serialize for Uri<'_> {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// A double-ended iterator over the path segments of a URI reference.
///
/// This struct is created by [`Uri::path_segments`] and by
/// [`UriBuf::path_segments`](crate::UriBuf::path_segments).
#[derive(Clone, Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Segments<'a> {
    /// The path with any leading slash stripped.
    path: &'a str,
    count: usize,
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a EStr;

    fn next(&mut self) -> Option<&'a EStr> {
        if self.count == 0 {
            return None;
        }
        self.count -= 1;
        let seg = match self.path.find('/') {
            Some(i) => {
                let seg = &self.path[..i];
                self.path = &self.path[i + 1..];
                seg
            }
            None => core::mem::take(&mut self.path),
        };
        Some(EStr::new_validated(seg))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.count, Some(self.count))
    }
}

impl<'a> DoubleEndedIterator for Segments<'a> {
    fn next_back(&mut self) -> Option<&'a EStr> {
        if self.count == 0 {
            return None;
        }
        self.count -= 1;
        let seg = match self.path.rfind('/') {
            Some(i) => {
                let seg = &self.path[i + 1..];
                self.path = &self.path[..i];
                seg
            }
            None => core::mem::take(&mut self.path),
        };
        Some(EStr::new_validated(seg))
    }
}

impl ExactSizeIterator for Segments<'_> {}

impl FusedIterator for Segments<'_> {}

/// A double-ended iterator over the query parameters of a URI reference.
///
/// This struct is created by [`Uri::query_params`] and by
/// [`UriBuf::query_params`](crate::UriBuf::query_params).
#[derive(Clone, Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Params<'a> {
    query: &'a str,
    count: usize,
}

fn split_param(piece: &str) -> (&EStr, Option<&EStr>) {
    match piece.split_once('=') {
        Some((k, v)) => (EStr::new_validated(k), Some(EStr::new_validated(v))),
        None => (EStr::new_validated(piece), None),
    }
}

impl<'a> Iterator for Params<'a> {
    type Item = (&'a EStr, Option<&'a EStr>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.count == 0 {
            return None;
        }
        self.count -= 1;
        let piece = match self.query.find('&') {
            Some(i) => {
                let piece = &self.query[..i];
                self.query = &self.query[i + 1..];
                piece
            }
            None => core::mem::take(&mut self.query),
        };
        Some(split_param(piece))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.count, Some(self.count))
    }
}

impl<'a> DoubleEndedIterator for Params<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.count == 0 {
            return None;
        }
        self.count -= 1;
        let piece = match self.query.rfind('&') {
            Some(i) => {
                let piece = &self.query[i + 1..];
                self.query = &self.query[..i];
                piece
            }
            None => core::mem::take(&mut self.query),
        };
        Some(split_param(piece))
    }
}

impl ExactSizeIterator for Params<'_> {}

impl FusedIterator for Params<'_> {}
