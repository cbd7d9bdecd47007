//! The component index: a fixed table of offsets delimiting the eight
//! URI components inside a serialized buffer.

/// Identifier of a URI component, in serialized order.
///
/// Each component's region in the serialized string carries its
/// delimiters: the scheme keeps its trailing `':'`, the user its leading
/// `"//"`, the password its leading `':'` and trailing `'@'`, the port
/// its leading `':'`, the query its `'?'` and the fragment its `'#'`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Part {
    /// The scheme component.
    Scheme = 0,
    /// The user subcomponent of userinfo.
    User,
    /// The password subcomponent of userinfo.
    Pass,
    /// The host subcomponent of authority.
    Host,
    /// The port subcomponent of authority.
    Port,
    /// The path component.
    Path,
    /// The query component.
    Query,
    /// The fragment component.
    Fragment,
}

pub(crate) const NUM_PARTS: usize = 8;

/// Kind of the host subcomponent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HostKind {
    /// No authority is present.
    #[default]
    None,
    /// A registered name, possibly empty.
    Name,
    /// An IPv4 address.
    Ipv4,
    /// An IPv6 address.
    Ipv6,
    /// An IP address of future version.
    IpvFuture,
}

/// Index of the component regions within a serialized URI reference.
///
/// The invariants hold that `offset[0] == 0`, that the offsets are
/// non-decreasing, and that `offset[8]` equals the serialized length.
/// A component is absent iff its region is empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Parts {
    pub offset: [usize; NUM_PARTS + 1],
    /// Percent-decoded content length of each region, delimiters excluded.
    pub decoded: [usize; NUM_PARTS],
    pub host_kind: HostKind,
    /// Decoded address bytes when `host_kind` is an IP kind.
    /// An IPv4 address occupies the first four bytes.
    pub ip: [u8; 16],
    /// Number of path segments.
    pub nseg: usize,
    /// Number of query parameters.
    pub nparam: usize,
    /// Numeric port, or zero if the port is absent or overlong.
    pub port_number: u16,
}

impl Default for Parts {
    fn default() -> Self {
        Parts::EMPTY
    }
}

impl Parts {
    pub const EMPTY: Parts = Parts {
        offset: [0; NUM_PARTS + 1],
        decoded: [0; NUM_PARTS],
        host_kind: HostKind::None,
        ip: [0; 16],
        nseg: 0,
        nparam: 0,
        port_number: 0,
    };

    /// Returns the start offset of a region.
    pub fn start(&self, part: Part) -> usize {
        self.offset[part as usize]
    }

    /// Returns the end offset of a region.
    pub fn end(&self, part: Part) -> usize {
        self.offset[part as usize + 1]
    }

    /// Returns the length of a region, delimiters included.
    pub fn len(&self, part: Part) -> usize {
        self.end(part) - self.start(part)
    }

    /// Returns a region of the serialized string, delimiters included.
    pub fn get<'a>(&self, part: Part, s: &'a str) -> &'a str {
        &s[self.start(part)..self.end(part)]
    }

    /// Returns the span covering `first..=last`, delimiters included.
    pub fn get_span<'a>(&self, first: Part, last: Part, s: &'a str) -> &'a str {
        debug_assert!(first <= last);
        &s[self.start(first)..self.end(last)]
    }

    /// Resizes a region to `n` bytes, shifting the offsets of all
    /// following regions.
    pub fn resize(&mut self, part: Part, n: usize) {
        let old = self.len(part);
        for i in part as usize + 1..=NUM_PARTS {
            self.offset[i] = self.offset[i] - old + n;
        }
    }

    /// Checks the ordering invariant. Used in debug assertions.
    pub fn is_coherent(&self, serialized_len: usize) -> bool {
        self.offset[0] == 0
            && self.offset.windows(2).all(|w| w[0] <= w[1])
            && self.offset[NUM_PARTS] == serialized_len
    }
}
