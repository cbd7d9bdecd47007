#![cfg(feature = "serde")]

use uribuf::{Uri, UriBuf};

#[test]
fn serialize_as_string() {
    let uri = Uri::parse("http://example.com/a?b#c").unwrap();
    assert_eq!(
        serde_json::to_string(&uri).unwrap(),
        "\"http://example.com/a?b#c\""
    );

    let buf = UriBuf::parse("//user@h:80/p").unwrap();
    assert_eq!(serde_json::to_string(&buf).unwrap(), "\"//user@h:80/p\"");
}

#[test]
fn deserialize_round_trip() {
    let buf: UriBuf = serde_json::from_str("\"http://example.com/a?b#c\"").unwrap();
    assert_eq!(buf.as_str(), "http://example.com/a?b#c");
    assert_eq!(buf.encoded_host(), "example.com");
    assert_eq!(buf.encoded_query(), "b");

    let json = serde_json::to_string(&buf).unwrap();
    let again: UriBuf = serde_json::from_str(&json).unwrap();
    assert_eq!(again, buf);
}

#[test]
fn deserialize_rejects_invalid() {
    // A syntax error surfaces as a deserialization error.
    assert!(serde_json::from_str::<UriBuf>("\"http://[::1\"").is_err());
    // So does a non-string value.
    assert!(serde_json::from_str::<UriBuf>("42").is_err());
}
