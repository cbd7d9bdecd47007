use std::net::{Ipv4Addr, Ipv6Addr};

use uribuf::{storage::PoolBuf, ErrorKind, HostKind, Part, UriBuf};

#[test]
fn scheme_removal_and_authority_removal() {
    let mut u = UriBuf::parse("ftp://ftp.example.com/pub/").unwrap();

    u.set_scheme("").unwrap();
    assert_eq!(u.as_str(), "//ftp.example.com/pub/");
    assert!(!u.has_scheme());
    assert!(u.has_authority());

    u.set_host(b"").unwrap();
    assert_eq!(u.as_str(), "/pub/");
    assert!(!u.has_authority());
    assert_eq!(u.host_kind(), HostKind::None);
    assert!(u.path_segments().eq(["pub", ""]));
}

#[test]
fn build_from_empty() {
    let mut u = UriBuf::new();
    u.set_scheme("mailto").unwrap();
    assert_eq!(u.as_str(), "mailto:");

    u.set_path(b"a@b.com").unwrap();
    assert_eq!(u.as_str(), "mailto:a%40b.com");
    assert_eq!(u.encoded_path(), "a%40b.com");
    assert_eq!(u.segment_count(), 1);
}

#[test]
fn set_scheme() {
    let mut u = UriBuf::parse("http://h/p").unwrap();
    u.set_scheme("HTTPS").unwrap();
    assert_eq!(u.as_str(), "HTTPS://h/p");
    assert_eq!(u.scheme(), "HTTPS");

    assert_eq!(
        u.set_scheme("1http").unwrap_err().kind(),
        ErrorKind::InvalidPart(Part::Scheme)
    );
    assert_eq!(
        u.set_scheme("ht tp").unwrap_err().kind(),
        ErrorKind::InvalidPart(Part::Scheme)
    );
    assert_eq!(u.as_str(), "HTTPS://h/p");

    // Removing the scheme from "urn:a:b" would put a colon in the
    // first segment of a relative reference.
    let mut u = UriBuf::parse("urn:a:b").unwrap();
    assert_eq!(u.set_scheme("").unwrap_err().kind(), ErrorKind::InvalidPath);
    assert_eq!(u.as_str(), "urn:a:b");
}

#[test]
fn set_userinfo() {
    let mut u = UriBuf::parse("http://h/").unwrap();

    u.set_encoded_user("alice").unwrap();
    assert_eq!(u.as_str(), "http://alice@h/");
    assert!(u.has_userinfo());
    assert!(!u.has_password());

    u.set_password(b"s:t").unwrap();
    assert_eq!(u.as_str(), "http://alice:s%3At@h/");
    assert!(u.has_password());
    assert_eq!(u.password().as_bytes(), b"s:t");

    // Clearing the password keeps the user.
    u.set_password(b"").unwrap();
    assert_eq!(u.as_str(), "http://alice@h/");

    // Clearing the user removes the at sign when no password remains.
    u.set_user(b"").unwrap();
    assert_eq!(u.as_str(), "http://h/");
    assert!(!u.has_userinfo());

    // A password without a user keeps the colon form.
    let mut u = UriBuf::parse("http://u:p@h").unwrap();
    u.set_encoded_user("").unwrap();
    assert_eq!(u.as_str(), "http://:p@h");
    assert!(u.has_userinfo());
    assert!(u.has_password());

    u.set_encoded_userinfo("").unwrap();
    assert_eq!(u.as_str(), "http://h");

    u.set_encoded_userinfo("user:pa:ss").unwrap();
    assert_eq!(u.as_str(), "http://user:pa:ss@h");
    assert_eq!(u.encoded_user(), "user");
    assert_eq!(u.encoded_password(), "pa:ss");

    // Decoded userinfo splits at the first colon only.
    u.set_userinfo(b"u:p@q").unwrap();
    assert_eq!(u.as_str(), "http://u:p%40q@h");
    assert_eq!(u.user().as_bytes(), b"u");
    assert_eq!(u.password().as_bytes(), b"p@q");
}

#[test]
fn set_host() {
    let mut u = UriBuf::parse("http://old/p").unwrap();

    u.set_encoded_host("example.com").unwrap();
    assert_eq!(u.as_str(), "http://example.com/p");
    assert_eq!(u.host_kind(), HostKind::Name);

    u.set_encoded_host("[2001:db8::1]").unwrap();
    assert_eq!(u.as_str(), "http://[2001:db8::1]/p");
    assert_eq!(u.host_kind(), HostKind::Ipv6);
    assert_eq!(u.ipv6(), Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1));

    // A decoded IPv6 address is enclosed in brackets.
    u.set_host(b"2001:db8::2").unwrap();
    assert_eq!(u.as_str(), "http://[2001:db8::2]/p");
    assert_eq!(u.host_kind(), HostKind::Ipv6);

    // A decoded IPv4 address is kept verbatim.
    u.set_host(b"192.168.0.1").unwrap();
    assert_eq!(u.as_str(), "http://192.168.0.1/p");
    assert_eq!(u.host_kind(), HostKind::Ipv4);
    assert_eq!(u.ipv4(), Ipv4Addr::new(192, 168, 0, 1));

    // A decoded IPvFuture address is enclosed in brackets.
    u.set_host(b"v1.x").unwrap();
    assert_eq!(u.as_str(), "http://[v1.x]/p");
    assert_eq!(u.host_kind(), HostKind::IpvFuture);
    assert_eq!(u.ipv_future(), "v1.x");

    // Anything else becomes a percent-encoded registered name.
    u.set_host(b"exa mple").unwrap();
    assert_eq!(u.as_str(), "http://exa%20mple/p");
    assert_eq!(u.host_kind(), HostKind::Name);
    assert_eq!(u.host().as_bytes(), b"exa mple");

    assert_eq!(
        u.set_encoded_host("a:b").unwrap_err().kind(),
        ErrorKind::InvalidCharacter
    );
    assert_eq!(u.as_str(), "http://exa%20mple/p");
}

#[test]
fn set_port() {
    let mut u = UriBuf::parse("http://h").unwrap();

    u.set_port("8080").unwrap();
    assert_eq!(u.as_str(), "http://h:8080");
    assert_eq!(u.port_number(), 8080);

    u.set_port_number(443).unwrap();
    assert_eq!(u.as_str(), "http://h:443");

    assert_eq!(u.set_port("80a").unwrap_err().kind(), ErrorKind::InvalidPort);
    assert_eq!(u.as_str(), "http://h:443");

    u.set_port("").unwrap();
    assert_eq!(u.as_str(), "http://h");
    assert!(!u.has_port());
    assert_eq!(u.port_number(), 0);

    // An overlong port keeps its text with a zero numeric value.
    u.set_port("314159").unwrap();
    assert_eq!(u.as_str(), "http://h:314159");
    assert_eq!(u.port(), "314159");
    assert_eq!(u.port_number(), 0);
}

#[test]
fn authority_presence_rules() {
    // A non-empty userinfo, host or port on a URI without authority
    // prepends the double slash.
    let mut u = UriBuf::new();
    u.set_encoded_host("example.com").unwrap();
    assert_eq!(u.as_str(), "//example.com");
    assert_eq!(u.host_kind(), HostKind::Name);

    let mut u = UriBuf::parse("s:/p").unwrap();
    u.set_port("80").unwrap();
    assert_eq!(u.as_str(), "s://:80/p");
    assert!(u.has_authority());
    assert_eq!(u.host_kind(), HostKind::Name);

    let mut u = UriBuf::parse("/p").unwrap();
    u.set_encoded_user("u").unwrap();
    assert_eq!(u.as_str(), "//u@/p");

    // A rootless path cannot follow an authority.
    let mut u = UriBuf::parse("mailto:x").unwrap();
    assert_eq!(
        u.set_encoded_host("h").unwrap_err().kind(),
        ErrorKind::InvalidPath
    );
    assert_eq!(u.as_str(), "mailto:x");

    // Removing the host alone keeps an authority with other remains.
    let mut u = UriBuf::parse("http://u@h:1/").unwrap();
    u.set_encoded_host("").unwrap();
    assert_eq!(u.as_str(), "http://u@:1/");
    assert!(u.has_authority());
    assert_eq!(u.host_kind(), HostKind::Name);
}

#[test]
fn set_path_forms() {
    let mut u = UriBuf::parse("http://h/a").unwrap();

    u.set_encoded_path("/x/y").unwrap();
    assert_eq!(u.as_str(), "http://h/x/y");
    assert_eq!(u.segment_count(), 2);

    u.set_encoded_path("").unwrap();
    assert_eq!(u.as_str(), "http://h");
    assert_eq!(u.segment_count(), 0);

    // With an authority the path must be empty or absolute.
    assert_eq!(
        u.set_encoded_path("rel").unwrap_err().kind(),
        ErrorKind::InvalidPath
    );

    // Without an authority the path must not start with "//".
    let mut u = UriBuf::parse("s:/p").unwrap();
    assert_eq!(
        u.set_encoded_path("//x").unwrap_err().kind(),
        ErrorKind::InvalidPath
    );

    // Without a scheme the first segment must not contain a colon.
    let mut u = UriBuf::parse("a/b").unwrap();
    assert_eq!(
        u.set_encoded_path("c:d/e").unwrap_err().kind(),
        ErrorKind::InvalidPath
    );
    assert_eq!(u.as_str(), "a/b");
    u.set_encoded_path("c/d:e").unwrap();
    assert_eq!(u.as_str(), "c/d:e");
}

#[test]
fn segment_editing() {
    let mut u = UriBuf::parse("http://h/a/b").unwrap();

    u.insert_encoded_segment(1, "x").unwrap();
    assert_eq!(u.as_str(), "http://h/a/x/b");
    assert_eq!(u.segment_count(), 3);

    u.replace_segment(0, b"A B").unwrap();
    assert_eq!(u.as_str(), "http://h/A%20B/x/b");

    u.remove_segments(0..2).unwrap();
    assert_eq!(u.as_str(), "http://h/b");
    assert_eq!(u.segment_count(), 1);

    u.remove_segment(0).unwrap();
    assert_eq!(u.as_str(), "http://h");
    assert_eq!(u.segment_count(), 0);

    u.insert_segment(0, b"first/seg").unwrap();
    assert_eq!(u.as_str(), "http://h/first%2Fseg");
    assert!(u.path_segments().eq(["first%2Fseg"]));

    // Rootless paths stay rootless.
    let mut u = UriBuf::parse("s:a/b").unwrap();
    u.insert_encoded_segment(0, "x").unwrap();
    assert_eq!(u.as_str(), "s:x/a/b");

    // A colon is rejected in the first segment of a relative reference.
    let mut u = UriBuf::parse("a/b").unwrap();
    assert_eq!(
        u.replace_encoded_segment(0, "c:d").unwrap_err().kind(),
        ErrorKind::InvalidPath
    );
    assert_eq!(u.as_str(), "a/b");
    u.replace_encoded_segment(1, "c:d").unwrap();
    assert_eq!(u.as_str(), "a/c:d");
}

#[test]
fn param_editing() {
    let mut u = UriBuf::parse("http://h/?a=1&b").unwrap();

    assert_eq!(u.find_param(b"a"), Some(0));
    assert_eq!(u.find_param(b"b"), Some(1));
    assert_eq!(u.find_param(b"c"), None);
    assert!(u.contains_param(b"a"));
    assert_eq!(u.count_param(b"a"), 1);

    u.replace_param(0, b"a", Some(b"2")).unwrap();
    assert_eq!(u.as_str(), "http://h/?a=2&b");

    u.insert_param(2, b"k v", Some(b"x&y")).unwrap();
    assert_eq!(u.as_str(), "http://h/?a=2&b&k%20v=x%26y");
    assert_eq!(u.param_count(), 3);
    assert_eq!(u.find_param(b"k v"), Some(2));

    u.remove_param(1).unwrap();
    assert_eq!(u.as_str(), "http://h/?a=2&k%20v=x%26y");

    u.remove_params(0..2).unwrap();
    assert_eq!(u.as_str(), "http://h/");
    assert!(!u.has_query());
    assert_eq!(u.param_count(), 0);

    // Inserting into an absent query creates the question mark.
    u.insert_encoded_param(0, "q", None).unwrap();
    assert_eq!(u.as_str(), "http://h/?q");

    // Keys may not contain the structural bytes.
    assert_eq!(
        u.insert_encoded_param(0, "a=b", None).unwrap_err().kind(),
        ErrorKind::InvalidCharacter
    );
}

#[test]
fn set_query_and_fragment() {
    let mut u = UriBuf::parse("http://h/").unwrap();

    u.set_query(b"a=1&b=2").unwrap();
    assert_eq!(u.as_str(), "http://h/?a=1&b=2");
    assert_eq!(u.param_count(), 2);

    u.set_fragment(b"sec 2").unwrap();
    assert_eq!(u.as_str(), "http://h/?a=1&b=2#sec%202");
    assert_eq!(u.fragment().as_bytes(), b"sec 2");

    u.set_encoded_query("").unwrap();
    assert_eq!(u.as_str(), "http://h/#sec%202");
    assert!(!u.has_query());

    u.set_encoded_fragment("").unwrap();
    assert_eq!(u.as_str(), "http://h/");
    assert!(!u.has_fragment());

    assert_eq!(
        u.set_encoded_query("a#b").unwrap_err().kind(),
        ErrorKind::InvalidCharacter
    );
    assert_eq!(
        u.set_encoded_fragment("%GG").unwrap_err().kind(),
        ErrorKind::InvalidPctEncoding
    );
}

#[test]
fn set_encoded_authority() {
    let mut u = UriBuf::parse("http://old/p").unwrap();

    u.set_encoded_authority("u:pw@h:90").unwrap();
    assert_eq!(u.as_str(), "http://u:pw@h:90/p");
    assert_eq!(u.encoded_user(), "u");
    assert_eq!(u.encoded_password(), "pw");
    assert_eq!(u.encoded_host(), "h");
    assert_eq!(u.port_number(), 90);

    u.set_encoded_authority("[::1]:8042").unwrap();
    assert_eq!(u.as_str(), "http://[::1]:8042/p");
    assert_eq!(u.host_kind(), HostKind::Ipv6);

    u.set_encoded_authority("").unwrap();
    assert_eq!(u.as_str(), "http:/p");
    assert!(!u.has_authority());
}

#[test]
fn set_encoded_url() {
    let mut u = UriBuf::parse("http://h/").unwrap();
    u.set_encoded_url("ftp://u@example.org/x?q#f").unwrap();
    assert_eq!(u.as_str(), "ftp://u@example.org/x?q#f");
    assert_eq!(u.scheme(), "ftp");
    assert_eq!(u.encoded_host(), "example.org");

    let e = u.set_encoded_url("http://[::1").unwrap_err();
    assert_eq!(e.kind(), ErrorKind::InvalidIpLiteral);
    assert_eq!(u.as_str(), "ftp://u@example.org/x?q#f");
}

#[test]
fn pool_backed_strong_guarantee() {
    let pool = PoolBuf::<32>::new();
    let mut u = UriBuf::parse_in("http://example.com/", pool.storage()).unwrap();
    assert_eq!(u.as_str(), "http://example.com/");

    // Growing past the live allocation needs a second allocation,
    // which the pool refuses.
    let e = u
        .set_encoded_path("/this/path/does/not/fit/in/the/pool")
        .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::AllocationFailed);

    // The container is bit-identical to its state at entry.
    assert_eq!(u.as_str(), "http://example.com/");
    assert_eq!(u.encoded_host(), "example.com");
    assert_eq!(u.segment_count(), 1);

    // In-place splices within the allocation still work.
    u.set_encoded_path("").unwrap();
    assert_eq!(u.as_str(), "http://example.com");
    u.set_encoded_path("/").unwrap();
    assert_eq!(u.as_str(), "http://example.com/");

    // The pool is reusable once the container is dropped.
    drop(u);
    let u = UriBuf::parse_in("//h", pool.storage()).unwrap();
    assert_eq!(u.as_str(), "//h");
}

#[test]
fn pool_capacity_reserved_up_front() {
    let pool = PoolBuf::<64>::new();
    let mut u = UriBuf::with_capacity_in(63, pool.storage()).unwrap();
    assert_eq!(u.capacity(), 63);

    u.set_encoded_url("http://example.com/a/b/c").unwrap();
    u.set_encoded_path("/a/b/c/d/e/f/g/h").unwrap();
    assert_eq!(u.as_str(), "http://example.com/a/b/c/d/e/f/g/h");

    // Exceeding the reserved capacity still fails cleanly.
    let e = u.set_encoded_url(&format!("http://h/{}", "x".repeat(80)));
    assert_eq!(e.unwrap_err().kind(), ErrorKind::AllocationFailed);
    assert_eq!(u.as_str(), "http://example.com/a/b/c/d/e/f/g/h");
}

#[test]
fn storage_handles_compare() {
    let pool = PoolBuf::<16>::new();
    let u = UriBuf::with_storage(pool.storage());
    assert_eq!(*u.storage(), pool.storage());
}

#[test]
fn view_of_container() {
    let mut buf = UriBuf::parse("http://h/a?q#f").unwrap();
    {
        let view = buf.as_uri();
        assert_eq!(view.as_str(), "http://h/a?q#f");
        assert_eq!(view.encoded_query(), "q");
    }
    buf.set_encoded_fragment("g").unwrap();
    assert_eq!(buf.as_str(), "http://h/a?q#g");
}

#[test]
fn conversions() {
    let view = uribuf::Uri::parse("http://h/").unwrap();
    let owned = UriBuf::from(view);
    assert_eq!(owned, view);
    assert_eq!(owned, "http://h/");

    let cloned = owned.clone();
    assert_eq!(cloned, owned);

    let parsed: UriBuf = "//h".parse().unwrap();
    assert_eq!(parsed.as_str(), "//h");
}
