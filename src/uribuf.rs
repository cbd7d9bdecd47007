//! A mutable, buffer-backed URI container.

use crate::{
    encoding::{self, table::*, Decode, EStr},
    error::{Error, ErrorKind, Result},
    internal::{HostKind, Part, Parts, NUM_PARTS},
    normalize, parser,
    storage::{Heap, Storage},
    view::{Params, Segments, Uri},
};
use core::{cmp, fmt, hash, ops::Range, str::FromStr};
use std::ffi::CStr;

#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// An owning, mutable URI reference.
///
/// A `UriBuf` holds a single contiguous serialized buffer together with
/// its component index. The buffer is always null-terminated past the
/// final byte. Every setter validates its input against the component's
/// grammar, splices the buffer and shifts the index; on error the
/// container is left bit-identical to its state at entry.
///
/// The buffer is allocated through a [`Storage`] handle stored by
/// value; the default [`Heap`] delegates to the global allocator and a
/// [`Pool`](crate::storage::Pool) serves stack-local URIs. A
/// pool-backed container cannot grow past its initial allocation, so
/// reserve the full pool up front with [`with_capacity_in`].
///
/// [`with_capacity_in`]: Self::with_capacity_in
///
/// # Examples
///
/// ```
/// use uribuf::UriBuf;
///
/// let mut uri = UriBuf::parse("ftp://ftp.example.com/pub/")?;
/// uri.set_scheme("")?;
/// assert_eq!(uri.as_str(), "//ftp.example.com/pub/");
///
/// uri.set_host(b"")?;
/// assert_eq!(uri.as_str(), "/pub/");
/// # Ok::<_, uribuf::Error>(())
/// ```
pub struct UriBuf<S: Storage = Heap> {
    storage: S,
    buf: Option<S::Buffer>,
    len: usize,
    parts: Parts,
}

impl UriBuf {
    /// Creates an empty URI reference backed by the heap.
    #[must_use]
    pub fn new() -> UriBuf {
        UriBuf::with_storage(Heap)
    }

    /// Parses a URI reference into a heap-backed `UriBuf`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the string does not match the `URI-reference`
    /// ABNF rule from RFC 3986.
    pub fn parse(s: &str) -> Result<UriBuf> {
        UriBuf::parse_in(s, Heap)
    }
}

impl Default for UriBuf {
    fn default() -> Self {
        UriBuf::new()
    }
}

impl<S: Storage> UriBuf<S> {
    /// Creates an empty URI reference with the given storage.
    ///
    /// No allocation happens until the first mutation.
    pub fn with_storage(storage: S) -> UriBuf<S> {
        UriBuf {
            storage,
            buf: None,
            len: 0,
            parts: Parts::EMPTY,
        }
    }

    /// Creates an empty URI reference with at least `cap` bytes of
    /// buffer capacity allocated up front.
    ///
    /// # Errors
    ///
    /// Returns `Err` with [`AllocationFailed`](ErrorKind::AllocationFailed)
    /// if the storage cannot satisfy the request.
    pub fn with_capacity_in(cap: usize, storage: S) -> Result<UriBuf<S>> {
        let mut out = UriBuf::with_storage(storage);
        out.grow_to(cap + 1)?;
        Ok(out)
    }

    /// Parses a URI reference into a `UriBuf` with the given storage.
    ///
    /// # Errors
    ///
    /// Returns `Err` on a syntax error or when allocation fails.
    pub fn parse_in(s: &str, storage: S) -> Result<UriBuf<S>> {
        let parts = parser::parse(s.as_bytes())?;
        let mut out = UriBuf::with_storage(storage);
        out.splice(0, 0, s.as_bytes())?;
        out.parts = parts;
        Ok(out)
    }

    /// Returns the URI reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        let bytes = match &self.buf {
            Some(buf) => &buf.as_ref()[..self.len],
            None => &[],
        };
        // SAFETY: The container only ever stores validated ASCII.
        unsafe { core::str::from_utf8_unchecked(bytes) }
    }

    /// Returns the URI reference as a null-terminated C string.
    ///
    /// The terminator is guaranteed by the container and is not counted
    /// in [`len`](Self::len).
    #[must_use]
    pub fn as_c_str(&self) -> &CStr {
        let bytes = match &self.buf {
            Some(buf) => &buf.as_ref()[..self.len + 1],
            None => &b"\0"[..],
        };
        // SAFETY: `bytes[len]` is the null terminator and the content
        // is ASCII without interior nulls.
        unsafe { CStr::from_bytes_with_nul_unchecked(bytes) }
    }

    /// Returns a read-only view of this URI reference.
    #[must_use]
    pub fn as_uri(&self) -> Uri<'_> {
        Uri::from_raw_parts(self.as_str(), self.parts)
    }

    /// Returns the number of bytes in the serialized URI reference.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Checks whether the URI reference is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of bytes that may be stored without a
    /// reallocation, excluding the null terminator.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw_capacity().saturating_sub(1)
    }

    /// Returns the storage handle.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Clears the contents, keeping the allocated buffer.
    pub fn clear(&mut self) {
        if let Some(buf) = &mut self.buf {
            buf.as_mut()[0] = 0;
        }
        self.len = 0;
        self.parts = Parts::EMPTY;
    }

    fn raw_capacity(&self) -> usize {
        self.buf.as_ref().map_or(0, |b| b.as_ref().len())
    }

    /// Reallocates to a buffer of at least `n` bytes, preserving the
    /// contents.
    fn grow_to(&mut self, n: usize) -> Result<()> {
        let mut nb = self
            .storage
            .allocate(cmp::max(n, 2 * self.raw_capacity()))
            .map_err(|_| Error::new(0, ErrorKind::AllocationFailed))?;
        if let Some(old) = &self.buf {
            nb.as_mut()[..self.len + 1].copy_from_slice(&old.as_ref()[..self.len + 1]);
        }
        if let Some(old) = self.buf.replace(nb) {
            self.storage.deallocate(old);
        }
        Ok(())
    }

    /// Replaces `start..end` of the buffer with `rep`, maintaining the
    /// null terminator. All-or-nothing: on allocation failure the
    /// container is unchanged.
    fn splice(&mut self, start: usize, end: usize, rep: &[u8]) -> Result<()> {
        debug_assert!(start <= end && end <= self.len);
        let new_len = self.len - (end - start) + rep.len();

        if new_len + 1 > self.raw_capacity() {
            let mut nb = self
                .storage
                .allocate(cmp::max(new_len + 1, 2 * self.raw_capacity()))
                .map_err(|_| Error::new(0, ErrorKind::AllocationFailed))?;
            {
                let old: &[u8] = self.buf.as_ref().map_or(&[], |b| b.as_ref());
                let dst = nb.as_mut();
                dst[..start].copy_from_slice(&old[..start]);
                dst[start..start + rep.len()].copy_from_slice(rep);
                dst[start + rep.len()..new_len].copy_from_slice(&old[end..self.len]);
                dst[new_len] = 0;
            }
            if let Some(old) = self.buf.replace(nb) {
                self.storage.deallocate(old);
            }
        } else if let Some(buf) = &mut self.buf {
            let buf = buf.as_mut();
            buf.copy_within(end..self.len, start + rep.len());
            buf[start..start + rep.len()].copy_from_slice(rep);
            buf[new_len] = 0;
        }

        self.len = new_len;
        Ok(())
    }

    /// Replaces a single region, updating the index.
    fn replace_part(&mut self, part: Part, region: &str) -> Result<()> {
        let (start, end) = (self.parts.start(part), self.parts.end(part));
        self.splice(start, end, region.as_bytes())?;
        self.parts.resize(part, region.len());
        debug_assert!(self.parts.is_coherent(self.len));
        Ok(())
    }

    /// Replaces the contiguous regions `first..=last` with `replacement`
    /// split into per-region lengths, updating the index. A single
    /// splice, so the strong guarantee holds across multi-region edits.
    fn replace_span(
        &mut self,
        first: Part,
        last: Part,
        replacement: &str,
        lens: &[usize],
    ) -> Result<()> {
        debug_assert_eq!(lens.len(), last as usize - first as usize + 1);
        debug_assert_eq!(lens.iter().sum::<usize>(), replacement.len());

        let start = self.parts.start(first);
        let end = self.parts.end(last);
        self.splice(start, end, replacement.as_bytes())?;

        let delta_new = replacement.len();
        let delta_old = end - start;
        for i in last as usize + 1..=NUM_PARTS {
            self.parts.offset[i] = self.parts.offset[i] - delta_old + delta_new;
        }
        let mut at = start;
        for (k, &n) in lens.iter().enumerate() {
            self.parts.offset[first as usize + k] = at;
            at += n;
        }
        debug_assert!(self.parts.is_coherent(self.len));
        Ok(())
    }

    /// Recomputes a region's decoded content length.
    fn refresh_decoded(&mut self, part: Part) {
        let (start, end) = parser::content_bounds(&self.parts, part, self.as_str().as_bytes());
        let n = encoding::decoded_len(&self.as_str().as_bytes()[start..end]);
        self.parts.decoded[part as usize] = n;
    }

    /// An authority-creating setter leaves an empty registered name
    /// when the host subcomponent was absent.
    fn mark_host_present(&mut self) {
        if self.parts.host_kind == HostKind::None {
            self.parts.host_kind = HostKind::Name;
        }
    }

    fn region(&self, part: Part) -> &str {
        self.parts.get(part, self.as_str())
    }

    // ------------------------------------------------------------------
    // Whole-URI setters
    // ------------------------------------------------------------------

    /// Replaces the contents with a new serialized URI reference.
    ///
    /// # Errors
    ///
    /// Returns `Err` on a syntax error or when allocation fails; in
    /// both cases the container is unchanged.
    pub fn set_encoded_url(&mut self, s: &str) -> Result<()> {
        let parts = parser::parse(s.as_bytes())?;
        self.splice(0, self.len, s.as_bytes())?;
        self.parts = parts;
        Ok(())
    }

    /// Normalizes the URI reference in place.
    ///
    /// This applies syntax-based normalization: the scheme is
    /// lowercased, percent-encoded octets use uppercase hexadecimal
    /// digits, percent-encoded unreserved bytes are decoded, dot
    /// segments are removed from absolute and scheme-qualified paths,
    /// and an empty path becomes `"/"` when an authority is present.
    ///
    /// The operation is idempotent.
    ///
    /// # Errors
    ///
    /// Returns `Err` only when allocation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use uribuf::UriBuf;
    ///
    /// let mut uri = UriBuf::parse("/a/%2e/b/%2e%2e/c")?;
    /// uri.normalize()?;
    /// assert_eq!(uri.as_str(), "/a/c");
    /// # Ok::<_, uribuf::Error>(())
    /// ```
    pub fn normalize(&mut self) -> Result<()> {
        let s = normalize::normalized(&self.as_uri());
        let parts = parser::parse(s.as_bytes())?;
        self.splice(0, self.len, s.as_bytes())?;
        self.parts = parts;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Scheme
    // ------------------------------------------------------------------

    /// Sets the scheme, or removes it along with the trailing colon
    /// when `s` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPart`](ErrorKind::InvalidPart) if `s` is not a
    /// valid scheme, and [`InvalidPath`](ErrorKind::InvalidPath) if
    /// removing the scheme would leave a relative reference whose first
    /// path segment contains a colon.
    pub fn set_scheme(&mut self, s: &str) -> Result<()> {
        if s.is_empty() {
            if !self.has_authority() && first_segment_has_colon(self.encoded_path().as_str()) {
                return Err(Error::new(self.parts.start(Part::Path), ErrorKind::InvalidPath));
            }
            self.replace_part(Part::Scheme, "")?;
        } else {
            if !s.as_bytes()[0].is_ascii_alphabetic() || !SCHEME.validate(s.as_bytes()) {
                return Err(Error::new(0, ErrorKind::InvalidPart(Part::Scheme)));
            }
            let mut region = String::with_capacity(s.len() + 1);
            region.push_str(s);
            region.push(':');
            self.replace_part(Part::Scheme, &region)?;
        }
        self.parts.decoded[Part::Scheme as usize] = s.len();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Authority
    // ------------------------------------------------------------------

    /// Checks whether an authority component is present.
    #[must_use]
    pub fn has_authority(&self) -> bool {
        self.parts.len(Part::User) != 0
    }

    /// Ensures that prepending an authority is possible: the path must
    /// be empty or absolute.
    fn check_authority_insertable(&self) -> Result<()> {
        let path = self.region(Part::Path);
        if !path.is_empty() && !path.starts_with('/') {
            return Err(Error::new(self.parts.start(Part::Path), ErrorKind::InvalidPath));
        }
        Ok(())
    }

    /// Sets the authority from its serialized form (without the double
    /// slash), or removes the whole authority when `s` is empty.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `s` does not match the `authority` rule, or if
    /// adding or removing the authority would leave an invalid path.
    pub fn set_encoded_authority(&mut self, s: &str) -> Result<()> {
        if s.is_empty() {
            return self.remove_authority();
        }

        let mut r = crate::bnf::Reader::new(s.as_bytes());
        let meta = parser::read_authority(&mut r)?;
        if r.has_remaining() {
            return Err(Error::new(r.pos(), ErrorKind::InvalidPart(Part::Host)));
        }
        if !self.has_authority() {
            self.check_authority_insertable()?;
        }

        let mut region = String::with_capacity(s.len() + 2);
        region.push_str("//");
        region.push_str(s);
        let lens = [
            2 + meta.pass_start,
            meta.host_start - meta.pass_start,
            meta.host_end - meta.host_start,
            s.len() - meta.host_end,
        ];
        self.replace_span(Part::User, Part::Port, &region, &lens)?;

        self.parts.host_kind = meta.host_kind;
        self.parts.ip = meta.ip;
        self.parts.port_number = meta.port_number;
        for part in [Part::User, Part::Pass, Part::Host, Part::Port] {
            self.refresh_decoded(part);
        }
        Ok(())
    }

    /// Removes the authority including the double slash.
    fn remove_authority(&mut self) -> Result<()> {
        if !self.has_authority() {
            return Ok(());
        }
        if self.region(Part::Path).starts_with("//") {
            // The path would reparse as an authority.
            return Err(Error::new(self.parts.start(Part::Path), ErrorKind::InvalidPath));
        }
        self.replace_span(Part::User, Part::Port, "", &[0, 0, 0, 0])?;
        self.parts.host_kind = HostKind::None;
        self.parts.ip = [0; 16];
        self.parts.port_number = 0;
        for i in Part::User as usize..=Part::Port as usize {
            self.parts.decoded[i] = 0;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Userinfo
    // ------------------------------------------------------------------

    /// Sets the userinfo from decoded bytes, percent-encoding where
    /// needed. The bytes up to the first colon become the user and the
    /// remainder the password; when `s` is empty the userinfo is
    /// removed along with the at sign.
    ///
    /// A non-empty userinfo on a URI without authority prepends the
    /// double slash.
    pub fn set_userinfo(&mut self, s: &[u8]) -> Result<()> {
        // Keep the first colon as the user/password split; encode the
        // rest of the delimiter-capable bytes.
        let encoded = match s.iter().position(|&x| x == b':') {
            Some(i) => {
                let mut buf = encoding::encode(&s[..i], USERINFO_SAFE);
                buf.push(':');
                encoding::encode_to(&s[i + 1..], USERINFO_SAFE, &mut buf);
                buf
            }
            None => encoding::encode(s, USERINFO_SAFE),
        };
        self.set_encoded_userinfo(&encoded)
    }

    /// Sets the userinfo from its serialized form, or removes it along
    /// with the at sign when `s` is empty.
    ///
    /// A non-empty userinfo on a URI without authority prepends the
    /// double slash.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `s` does not match the `userinfo` rule or if
    /// the authority cannot be created.
    pub fn set_encoded_userinfo(&mut self, s: &str) -> Result<()> {
        encoding::validate(s.as_bytes(), USERINFO)?;

        if s.is_empty() {
            let region = if self.has_authority() { "//" } else { "" };
            self.replace_span(Part::User, Part::Pass, region, &[region.len(), 0])?;
            self.parts.decoded[Part::User as usize] = 0;
            self.parts.decoded[Part::Pass as usize] = 0;
            return Ok(());
        }

        if !self.has_authority() {
            self.check_authority_insertable()?;
        }

        let (user, pass) = match s.split_once(':') {
            Some((user, pass)) => (user, Some(pass)),
            None => (s, None),
        };
        let mut region = String::with_capacity(s.len() + 3);
        region.push_str("//");
        region.push_str(user);
        let user_len = region.len();
        if let Some(pass) = pass {
            region.push(':');
            region.push_str(pass);
        }
        region.push('@');
        self.replace_span(
            Part::User,
            Part::Pass,
            &region,
            &[user_len, region.len() - user_len],
        )?;
        self.parts.decoded[Part::User as usize] = encoding::decoded_len(user.as_bytes());
        self.parts.decoded[Part::Pass as usize] =
            pass.map_or(0, |p| encoding::decoded_len(p.as_bytes()));
        self.mark_host_present();
        Ok(())
    }

    /// Sets the user from decoded bytes, percent-encoding where needed.
    pub fn set_user(&mut self, s: &[u8]) -> Result<()> {
        self.set_encoded_user(&encoding::encode(s, USERINFO_SAFE))
    }

    /// Sets the user from its serialized form.
    ///
    /// An empty `s` clears the user; the at sign is removed as well
    /// when no password remains. A non-empty user on a URI without
    /// authority prepends the double slash.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `s` does not match the `user` rule or if the
    /// authority cannot be created.
    pub fn set_encoded_user(&mut self, s: &str) -> Result<()> {
        encoding::validate(s.as_bytes(), USER)?;

        let pass = self.region(Part::Pass).to_owned();
        if s.is_empty() && pass.len() <= 1 {
            // No password remains; drop the whole userinfo.
            return self.set_encoded_userinfo("");
        }

        if !self.has_authority() {
            self.check_authority_insertable()?;
        }

        let mut region = String::with_capacity(s.len() + 3);
        region.push_str("//");
        region.push_str(s);
        let user_len = region.len();
        if pass.is_empty() {
            region.push('@');
        } else {
            region.push_str(&pass);
        }
        let pass_len = region.len() - user_len;
        self.replace_span(Part::User, Part::Pass, &region, &[user_len, pass_len])?;
        self.parts.decoded[Part::User as usize] = encoding::decoded_len(s.as_bytes());
        self.mark_host_present();
        Ok(())
    }

    /// Sets the password from decoded bytes, percent-encoding where
    /// needed.
    pub fn set_password(&mut self, s: &[u8]) -> Result<()> {
        self.set_encoded_password(&encoding::encode(s, USERINFO_SAFE))
    }

    /// Sets the password from its serialized form.
    ///
    /// An empty `s` clears the password along with its colon; the at
    /// sign is removed as well when the user is empty. A non-empty
    /// password on a URI without authority prepends the double slash.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `s` does not match the `password` rule or if
    /// the authority cannot be created.
    pub fn set_encoded_password(&mut self, s: &str) -> Result<()> {
        encoding::validate(s.as_bytes(), PASSWORD)?;

        let user = self.region(Part::User);
        let user = user.strip_prefix("//").unwrap_or(user).to_owned();
        if s.is_empty() && user.is_empty() {
            return self.set_encoded_userinfo("");
        }

        if !self.has_authority() {
            self.check_authority_insertable()?;
        }

        let mut region = String::with_capacity(user.len() + s.len() + 4);
        region.push_str("//");
        region.push_str(&user);
        let user_len = region.len();
        if !s.is_empty() {
            region.push(':');
            region.push_str(s);
        }
        region.push('@');
        self.replace_span(
            Part::User,
            Part::Pass,
            &region,
            &[user_len, region.len() - user_len],
        )?;
        self.parts.decoded[Part::Pass as usize] = encoding::decoded_len(s.as_bytes());
        self.mark_host_present();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Host and port
    // ------------------------------------------------------------------

    /// Sets the host from decoded bytes.
    ///
    /// Input parsing as an `IPv4address` is kept verbatim; input
    /// parsing as an `IPv6address` or `IPvFuture` is enclosed in square
    /// brackets; anything else becomes a percent-encoded registered
    /// name. An empty host removes the authority when the userinfo and
    /// port are also empty.
    pub fn set_host(&mut self, s: &[u8]) -> Result<()> {
        if let Ok(text) = core::str::from_utf8(s) {
            if parser::parse_host(text).is_ok_and(|(kind, _)| kind == HostKind::Ipv4) {
                return self.set_encoded_host(text);
            }
            let bracketed = format!("[{text}]");
            if !text.is_empty() && parser::parse_host(&bracketed).is_ok() {
                return self.set_encoded_host(&bracketed);
            }
        }
        self.set_encoded_host(&encoding::encode(s, HOST_SAFE))
    }

    /// Sets the host from its serialized form.
    ///
    /// An empty host removes the authority (including the double slash)
    /// when the userinfo and port are also empty; a non-empty host on a
    /// URI without authority prepends the double slash.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `s` does not match the `host` rule or if the
    /// authority cannot be created or removed.
    pub fn set_encoded_host(&mut self, s: &str) -> Result<()> {
        let (kind, ip) = parser::parse_host(s)?;

        if s.is_empty()
            && self.parts.len(Part::User) <= 2
            && self.parts.len(Part::Pass) == 0
            && self.parts.len(Part::Port) == 0
        {
            return self.remove_authority();
        }

        if self.has_authority() {
            self.replace_part(Part::Host, s)?;
        } else {
            self.check_authority_insertable()?;
            let mut region = String::with_capacity(s.len() + 2);
            region.push_str("//");
            region.push_str(s);
            self.replace_span(Part::User, Part::Host, &region, &[2, 0, s.len()])?;
        }
        self.parts.host_kind = kind;
        self.parts.ip = ip;
        self.refresh_decoded(Part::Host);
        Ok(())
    }

    /// Sets the port from its textual form, or removes it along with
    /// the colon when `s` is empty.
    ///
    /// A non-empty port on a URI without authority prepends the double
    /// slash.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPort`](ErrorKind::InvalidPort) if `s` contains
    /// a non-digit.
    pub fn set_port(&mut self, s: &str) -> Result<()> {
        if let Some(i) = s.bytes().position(|x| !x.is_ascii_digit()) {
            return Err(Error::new(i, ErrorKind::InvalidPort));
        }

        if s.is_empty() {
            self.replace_part(Part::Port, "")?;
            self.parts.port_number = 0;
            self.parts.decoded[Part::Port as usize] = 0;
            return Ok(());
        }

        let mut region = String::with_capacity(s.len() + 3);
        if self.has_authority() {
            region.push(':');
            region.push_str(s);
            self.replace_part(Part::Port, &region)?;
        } else {
            self.check_authority_insertable()?;
            region.push_str("//:");
            region.push_str(s);
            self.replace_span(Part::User, Part::Port, &region, &[2, 0, 0, s.len() + 1])?;
            self.parts.host_kind = HostKind::Name;
        }
        self.parts.port_number = s.parse().unwrap_or(0);
        self.parts.decoded[Part::Port as usize] = s.len();
        Ok(())
    }

    /// Sets the port to a number.
    pub fn set_port_number(&mut self, port: u16) -> Result<()> {
        self.set_port(&port.to_string())
    }

    // ------------------------------------------------------------------
    // Path
    // ------------------------------------------------------------------

    /// Sets the path from decoded bytes, percent-encoding where needed.
    ///
    /// Slashes in the input separate segments; every other
    /// delimiter-capable byte is percent-encoded.
    ///
    /// # Examples
    ///
    /// ```
    /// use uribuf::UriBuf;
    ///
    /// let mut uri = UriBuf::new();
    /// uri.set_scheme("mailto")?;
    /// uri.set_path(b"a@b.com")?;
    /// assert_eq!(uri.as_str(), "mailto:a%40b.com");
    /// # Ok::<_, uribuf::Error>(())
    /// ```
    pub fn set_path(&mut self, s: &[u8]) -> Result<()> {
        self.set_encoded_path(&encoding::encode(s, PATH_SAFE))
    }

    /// Sets the path from its serialized form.
    ///
    /// The path form in use depends on the rest of the URI: with an
    /// authority the path must be empty or absolute; without one it
    /// must not start with a double slash, and without a scheme its
    /// first segment must not contain a colon.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `s` fails the `path` grammar, or
    /// [`InvalidPath`](ErrorKind::InvalidPath) if it violates the form
    /// rules above.
    pub fn set_encoded_path(&mut self, s: &str) -> Result<()> {
        encoding::validate(s.as_bytes(), PATH)?;
        self.set_path_region(s)
    }

    /// Form-checks and splices a validated path.
    fn set_path_region(&mut self, s: &str) -> Result<()> {
        if self.has_authority() {
            if !s.is_empty() && !s.starts_with('/') {
                return Err(Error::new(0, ErrorKind::InvalidPath));
            }
        } else {
            if s.starts_with("//") {
                return Err(Error::new(0, ErrorKind::InvalidPath));
            }
            if !self.has_scheme() && first_segment_has_colon(s) {
                return Err(Error::new(0, ErrorKind::InvalidPath));
            }
        }
        self.replace_part(Part::Path, s)?;
        self.parts.nseg = parser::count_segments(s);
        self.parts.decoded[Part::Path as usize] = encoding::decoded_len(s.as_bytes());
        Ok(())
    }

    /// Inserts a path segment from decoded bytes at position `pos`,
    /// percent-encoding where needed (including slashes).
    ///
    /// # Panics
    ///
    /// Panics if `pos > self.segment_count()`.
    pub fn insert_segment(&mut self, pos: usize, s: &[u8]) -> Result<()> {
        self.edit_segments(|segs| segs.insert(pos, encoding::encode(s, SEGMENT_SAFE)))
    }

    /// Inserts an encoded path segment at position `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos > self.segment_count()`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `s` fails the `segment` grammar or if the
    /// resulting path would violate the active form's rules.
    pub fn insert_encoded_segment(&mut self, pos: usize, s: &str) -> Result<()> {
        encoding::validate(s.as_bytes(), SEGMENT)?;
        self.edit_segments(|segs| segs.insert(pos, s.to_owned()))
    }

    /// Replaces the path segment at position `pos` with decoded bytes,
    /// percent-encoding where needed.
    ///
    /// # Panics
    ///
    /// Panics if `pos >= self.segment_count()`.
    pub fn replace_segment(&mut self, pos: usize, s: &[u8]) -> Result<()> {
        self.edit_segments(|segs| segs[pos] = encoding::encode(s, SEGMENT_SAFE))
    }

    /// Replaces the path segment at position `pos` with an encoded one.
    ///
    /// # Panics
    ///
    /// Panics if `pos >= self.segment_count()`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `s` fails the `segment` grammar or if the
    /// resulting path would violate the active form's rules.
    pub fn replace_encoded_segment(&mut self, pos: usize, s: &str) -> Result<()> {
        encoding::validate(s.as_bytes(), SEGMENT)?;
        self.edit_segments(|segs| segs[pos] = s.to_owned())
    }

    /// Removes the path segments in `range`.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    pub fn remove_segments(&mut self, range: Range<usize>) -> Result<()> {
        self.edit_segments(|segs| {
            segs.drain(range);
        })
    }

    /// Removes the path segment at position `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos >= self.segment_count()`.
    pub fn remove_segment(&mut self, pos: usize) -> Result<()> {
        self.remove_segments(pos..pos + 1)
    }

    /// Rewrites the path region from its edited segment list.
    fn edit_segments(&mut self, f: impl FnOnce(&mut Vec<String>)) -> Result<()> {
        let absolute = self.region(Part::Path).starts_with('/') || self.has_authority();
        let mut segs: Vec<String> = self
            .as_uri()
            .path_segments()
            .map(|s| s.as_str().to_owned())
            .collect();
        f(&mut segs);

        let mut path = String::new();
        for (i, seg) in segs.iter().enumerate() {
            if absolute || i > 0 {
                path.push('/');
            }
            path.push_str(seg);
        }
        self.set_path_region(&path)
    }

    // ------------------------------------------------------------------
    // Query parameters
    // ------------------------------------------------------------------

    /// Sets the query from decoded bytes, percent-encoding where
    /// needed, or removes it along with the question mark when `s` is
    /// empty. Ampersands and equals signs pass through so that
    /// parameter structure is preserved.
    pub fn set_query(&mut self, s: &[u8]) -> Result<()> {
        self.set_encoded_query(&encoding::encode(s, QUERY_SAFE))
    }

    /// Sets the query from its serialized form, or removes it along
    /// with the question mark when `s` is empty.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `s` fails the `query` grammar.
    pub fn set_encoded_query(&mut self, s: &str) -> Result<()> {
        encoding::validate(s.as_bytes(), QUERY)?;
        self.set_query_region(s)
    }

    fn set_query_region(&mut self, s: &str) -> Result<()> {
        if s.is_empty() {
            self.replace_part(Part::Query, "")?;
            self.parts.nparam = 0;
        } else {
            let mut region = String::with_capacity(s.len() + 1);
            region.push('?');
            region.push_str(s);
            self.replace_part(Part::Query, &region)?;
            self.parts.nparam = parser::count_query_params(s);
        }
        self.parts.decoded[Part::Query as usize] = encoding::decoded_len(s.as_bytes());
        Ok(())
    }

    /// Inserts a query parameter from decoded bytes at position `pos`,
    /// percent-encoding where needed.
    ///
    /// # Panics
    ///
    /// Panics if `pos > self.param_count()`.
    pub fn insert_param(&mut self, pos: usize, key: &[u8], value: Option<&[u8]>) -> Result<()> {
        self.edit_params(|params| params.insert(pos, encode_param(key, value)))
    }

    /// Inserts an encoded query parameter at position `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos > self.param_count()`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the key or value fails the query-parameter
    /// micro-grammar.
    pub fn insert_encoded_param(
        &mut self,
        pos: usize,
        key: &str,
        value: Option<&str>,
    ) -> Result<()> {
        validate_param(key, value)?;
        self.edit_params(|params| params.insert(pos, join_param(key, value)))
    }

    /// Replaces the query parameter at position `pos` with a decoded
    /// key and optional value, percent-encoding where needed.
    ///
    /// # Panics
    ///
    /// Panics if `pos >= self.param_count()`.
    pub fn replace_param(&mut self, pos: usize, key: &[u8], value: Option<&[u8]>) -> Result<()> {
        self.edit_params(|params| params[pos] = encode_param(key, value))
    }

    /// Replaces the query parameter at position `pos` with an encoded
    /// one.
    ///
    /// # Panics
    ///
    /// Panics if `pos >= self.param_count()`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the key or value fails the query-parameter
    /// micro-grammar.
    pub fn replace_encoded_param(
        &mut self,
        pos: usize,
        key: &str,
        value: Option<&str>,
    ) -> Result<()> {
        validate_param(key, value)?;
        self.edit_params(|params| params[pos] = join_param(key, value))
    }

    /// Removes the query parameters in `range`. Removing the last
    /// parameter removes the question mark as well.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    pub fn remove_params(&mut self, range: Range<usize>) -> Result<()> {
        self.edit_params(|params| {
            params.drain(range);
        })
    }

    /// Removes the query parameter at position `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos >= self.param_count()`.
    pub fn remove_param(&mut self, pos: usize) -> Result<()> {
        self.remove_params(pos..pos + 1)
    }

    /// Returns the position of the first parameter whose
    /// percent-decoded key equals `key`.
    #[must_use]
    pub fn find_param(&self, key: &[u8]) -> Option<usize> {
        self.as_uri()
            .query_params()
            .position(|(k, _)| k.decode().as_bytes() == key)
    }

    /// Checks whether a parameter with the given percent-decoded key is
    /// present.
    #[must_use]
    pub fn contains_param(&self, key: &[u8]) -> bool {
        self.find_param(key).is_some()
    }

    /// Counts the parameters whose percent-decoded key equals `key`.
    #[must_use]
    pub fn count_param(&self, key: &[u8]) -> usize {
        self.as_uri()
            .query_params()
            .filter(|(k, _)| k.decode().as_bytes() == key)
            .count()
    }

    /// Rewrites the query region from its edited parameter list.
    fn edit_params(&mut self, f: impl FnOnce(&mut Vec<String>)) -> Result<()> {
        let mut params: Vec<String> = self
            .as_uri()
            .query_params()
            .map(|(k, v)| join_param(k.as_str(), v.map(EStr::as_str)))
            .collect();
        f(&mut params);
        self.set_query_region(&params.join("&"))
    }

    // ------------------------------------------------------------------
    // Fragment
    // ------------------------------------------------------------------

    /// Sets the fragment from decoded bytes, percent-encoding where
    /// needed, or removes it along with the hash mark when `s` is
    /// empty.
    pub fn set_fragment(&mut self, s: &[u8]) -> Result<()> {
        self.set_encoded_fragment(&encoding::encode(s, FRAGMENT_SAFE))
    }

    /// Sets the fragment from its serialized form, or removes it along
    /// with the hash mark when `s` is empty.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `s` fails the `fragment` grammar.
    pub fn set_encoded_fragment(&mut self, s: &str) -> Result<()> {
        encoding::validate(s.as_bytes(), FRAGMENT)?;
        if s.is_empty() {
            self.replace_part(Part::Fragment, "")?;
        } else {
            let mut region = String::with_capacity(s.len() + 1);
            region.push('#');
            region.push_str(s);
            self.replace_part(Part::Fragment, &region)?;
        }
        self.parts.decoded[Part::Fragment as usize] = encoding::decoded_len(s.as_bytes());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read accessors, delegating to the view
    // ------------------------------------------------------------------

    /// See [`Uri::has_scheme`].
    #[must_use]
    pub fn has_scheme(&self) -> bool {
        self.parts.len(Part::Scheme) != 0
    }

    /// See [`Uri::scheme`].
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.as_uri().scheme()
    }

    /// See [`Uri::encoded_authority`].
    #[must_use]
    pub fn encoded_authority(&self) -> &EStr {
        self.as_uri().encoded_authority()
    }

    /// See [`Uri::has_userinfo`].
    #[must_use]
    pub fn has_userinfo(&self) -> bool {
        self.parts.len(Part::Pass) != 0
    }

    /// See [`Uri::encoded_userinfo`].
    #[must_use]
    pub fn encoded_userinfo(&self) -> &EStr {
        self.as_uri().encoded_userinfo()
    }

    /// See [`Uri::encoded_user`].
    #[must_use]
    pub fn encoded_user(&self) -> &EStr {
        self.as_uri().encoded_user()
    }

    /// See [`Uri::user`].
    #[must_use]
    pub fn user(&self) -> Decode<'_> {
        self.as_uri().user()
    }

    /// See [`Uri::has_password`].
    #[must_use]
    pub fn has_password(&self) -> bool {
        self.as_uri().has_password()
    }

    /// See [`Uri::encoded_password`].
    #[must_use]
    pub fn encoded_password(&self) -> &EStr {
        self.as_uri().encoded_password()
    }

    /// See [`Uri::password`].
    #[must_use]
    pub fn password(&self) -> Decode<'_> {
        self.as_uri().password()
    }

    /// See [`Uri::encoded_host`].
    #[must_use]
    pub fn encoded_host(&self) -> &EStr {
        self.as_uri().encoded_host()
    }

    /// See [`Uri::host`].
    #[must_use]
    pub fn host(&self) -> Decode<'_> {
        self.as_uri().host()
    }

    /// See [`Uri::host_kind`].
    #[must_use]
    pub fn host_kind(&self) -> HostKind {
        self.parts.host_kind
    }

    /// See [`Uri::ipv4`].
    #[must_use]
    pub fn ipv4(&self) -> std::net::Ipv4Addr {
        self.as_uri().ipv4()
    }

    /// See [`Uri::ipv6`].
    #[must_use]
    pub fn ipv6(&self) -> std::net::Ipv6Addr {
        self.as_uri().ipv6()
    }

    /// See [`Uri::ipv_future`].
    #[must_use]
    pub fn ipv_future(&self) -> &str {
        self.as_uri().ipv_future()
    }

    /// See [`Uri::encoded_host_and_port`].
    #[must_use]
    pub fn encoded_host_and_port(&self) -> &str {
        self.as_uri().encoded_host_and_port()
    }

    /// See [`Uri::has_port`].
    #[must_use]
    pub fn has_port(&self) -> bool {
        self.parts.len(Part::Port) != 0
    }

    /// See [`Uri::port`].
    #[must_use]
    pub fn port(&self) -> &str {
        self.as_uri().port()
    }

    /// See [`Uri::port_number`].
    #[must_use]
    pub fn port_number(&self) -> u16 {
        self.parts.port_number
    }

    /// See [`Uri::encoded_origin`].
    #[must_use]
    pub fn encoded_origin(&self) -> &str {
        self.as_uri().encoded_origin()
    }

    /// See [`Uri::encoded_path`].
    #[must_use]
    pub fn encoded_path(&self) -> &EStr {
        self.as_uri().encoded_path()
    }

    /// See [`Uri::segment_count`].
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.parts.nseg
    }

    /// See [`Uri::path_segments`].
    pub fn path_segments(&self) -> Segments<'_> {
        self.as_uri().path_segments()
    }

    /// See [`Uri::has_query`].
    #[must_use]
    pub fn has_query(&self) -> bool {
        self.parts.len(Part::Query) != 0
    }

    /// See [`Uri::encoded_query`].
    #[must_use]
    pub fn encoded_query(&self) -> &EStr {
        self.as_uri().encoded_query()
    }

    /// See [`Uri::query`].
    #[must_use]
    pub fn query(&self) -> Decode<'_> {
        self.as_uri().query()
    }

    /// See [`Uri::param_count`].
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.parts.nparam
    }

    /// See [`Uri::query_params`].
    pub fn query_params(&self) -> Params<'_> {
        self.as_uri().query_params()
    }

    /// See [`Uri::has_fragment`].
    #[must_use]
    pub fn has_fragment(&self) -> bool {
        self.parts.len(Part::Fragment) != 0
    }

    /// See [`Uri::encoded_fragment`].
    #[must_use]
    pub fn encoded_fragment(&self) -> &EStr {
        self.as_uri().encoded_fragment()
    }

    /// See [`Uri::fragment`].
    #[must_use]
    pub fn fragment(&self) -> Decode<'_> {
        self.as_uri().fragment()
    }

    /// See [`Uri::decoded_len`].
    #[must_use]
    pub fn decoded_len(&self, part: Part) -> usize {
        self.parts.decoded[part as usize]
    }
}

fn first_segment_has_colon(path: &str) -> bool {
    path.split_once('/').map_or(path, |x| x.0).contains(':')
}

fn join_param(key: &str, value: Option<&str>) -> String {
    match value {
        Some(value) => {
            let mut buf = String::with_capacity(key.len() + value.len() + 1);
            buf.push_str(key);
            buf.push('=');
            buf.push_str(value);
            buf
        }
        None => key.to_owned(),
    }
}

fn encode_param(key: &[u8], value: Option<&[u8]>) -> String {
    let mut buf = encoding::encode(key, KEY_SAFE);
    if let Some(value) = value {
        buf.push('=');
        encoding::encode_to(value, VALUE_SAFE, &mut buf);
    }
    buf
}

fn validate_param(key: &str, value: Option<&str>) -> Result<()> {
    encoding::validate(key.as_bytes(), QPARAM_KEY)?;
    if let Some(value) = value {
        encoding::validate(value.as_bytes(), QPARAM_VALUE)?;
    }
    Ok(())
}

impl Clone for UriBuf {
    fn clone(&self) -> Self {
        let mut buf = None;
        if self.buf.is_some() {
            let mut nb = vec![0; self.len + 1].into_boxed_slice();
            nb[..self.len].copy_from_slice(self.as_str().as_bytes());
            buf = Some(nb);
        }
        UriBuf {
            storage: Heap,
            buf,
            len: self.len,
            parts: self.parts,
        }
    }
}

impl<S: Storage> fmt::Debug for UriBuf<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.as_uri(), f)
    }
}

impl<S: Storage> fmt::Display for UriBuf<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

impl<S: Storage, T: Storage> PartialEq<UriBuf<T>> for UriBuf<S> {
    fn eq(&self, other: &UriBuf<T>) -> bool {
        self.as_str() == other.as_str()
    }
}

impl<S: Storage> PartialEq<str> for UriBuf<S> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl<S: Storage> PartialEq<UriBuf<S>> for str {
    fn eq(&self, other: &UriBuf<S>) -> bool {
        self == other.as_str()
    }
}

impl<S: Storage> PartialEq<&str> for UriBuf<S> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl<S: Storage> PartialEq<Uri<'_>> for UriBuf<S> {
    fn eq(&self, other: &Uri<'_>) -> bool {
        self.as_str() == other.as_str()
    }
}

impl<S: Storage> Eq for UriBuf<S> {}

impl<S: Storage> hash::Hash for UriBuf<S> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl FromStr for UriBuf {
    type Err = Error;

    /// Equivalent to [`parse`](Self::parse).
    fn from_str(s: &str) -> Result<Self> {
        UriBuf::parse(s)
    }
}

impl TryFrom<&str> for UriBuf {
    type Error = Error;

    /// Equivalent to [`parse`](Self::parse).
    fn try_from(value: &str) -> Result<Self> {
        UriBuf::parse(value)
    }
}

impl From<Uri<'_>> for UriBuf {
    /// Copies the view's bytes and index into a heap-backed container.
    fn from(uri: Uri<'_>) -> Self {
        let s = uri.as_str();
        let mut buf = vec![0; s.len() + 1].into_boxed_slice();
        buf[..s.len()].copy_from_slice(s.as_bytes());
        UriBuf {
            storage: Heap,
            buf: Some(buf),
            len: s.len(),
            parts: *uri.parts(),
        }
    }
}

#[cfg(feature = "serde")]
impl<S: Storage> Serialize for UriBuf<S> {
    fn serialize<Sr>(&self, serializer: Sr) -> core::result::Result<Sr::Ok, Sr::Error>
    where
        Sr: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for UriBuf {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        UriBuf::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splice_shrinks_and_grows_in_place() {
        let mut u = UriBuf::parse("http://example.com/abc").unwrap();
        let cap = u.capacity();

        u.set_encoded_path("/x").unwrap();
        assert_eq!(u.as_str(), "http://example.com/x");
        assert_eq!(u.capacity(), cap);

        u.set_encoded_path("/abcdef").unwrap();
        assert_eq!(u.as_str(), "http://example.com/abcdef");
    }

    #[test]
    fn null_terminated() {
        let u = UriBuf::parse("http://h/").unwrap();
        assert_eq!(u.as_c_str().to_bytes(), b"http://h/");

        let u = UriBuf::new();
        assert_eq!(u.as_c_str().to_bytes(), b"");
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut u = UriBuf::parse("http://example.com/a?b#c").unwrap();
        let cap = u.capacity();
        u.clear();
        assert!(u.is_empty());
        assert_eq!(u.as_str(), "");
        assert_eq!(u.capacity(), cap);
    }
}
