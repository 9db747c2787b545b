use itsalltext::dom::location::DocumentLocation;
use itsalltext::identity::field_key::{FieldKey, Uid};
use itsalltext::identity::hasher::{SHORT_HASH_LEN, UID_LEN, hash_parts, salted_hash, short_hash};

// ============================================================================
// Hashing
// ============================================================================

#[test]
fn hash_is_deterministic_hex() {
    let a = hash_parts(&["http", "example.com", "/post"]);
    let b = hash_parts(&["http", "example.com", "/post"]);
    assert_eq!(a, b);
    assert_eq!(a.len(), 40);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn part_boundaries_matter() {
    assert_ne!(hash_parts(&["ab", "c"]), hash_parts(&["a", "bc"]));
    assert_ne!(hash_parts(&["abc"]), hash_parts(&["abc", ""]));
}

#[test]
fn short_hash_is_prefix_of_full_hash() {
    let full = hash_parts(&["x", "y"]);
    let short = short_hash(&["x", "y"], SHORT_HASH_LEN);
    assert_eq!(short.len(), SHORT_HASH_LEN);
    assert!(full.starts_with(&short));
}

#[test]
fn salted_hash_never_repeats() {
    let a = salted_hash(&["same"], UID_LEN);
    let b = salted_hash(&["same"], UID_LEN);
    assert_eq!(a.len(), UID_LEN);
    assert_ne!(a, b);
}

// ============================================================================
// Locations and keys
// ============================================================================

#[test]
fn location_drops_fragment_and_query_values() {
    let loc = DocumentLocation::parse("https://example.com:8443/a/b?x=1#top").unwrap();
    assert_eq!(loc.scheme, "https");
    assert_eq!(loc.host, "example.com");
    assert_eq!(loc.port, Some(8443));
    assert_eq!(loc.path, "/a/b");
    assert!(loc.has_query);
    assert_eq!(loc.identity(), "https://example.com:8443/a/b?");
}

#[test]
fn default_port_is_implicit() {
    let loc = DocumentLocation::parse("http://example.com:80/post").unwrap();
    assert_eq!(loc.port, None);
    assert_eq!(loc.port_str(), "");
    assert_eq!(loc.query_marker(), "");
    assert_eq!(loc.to_string(), "http://example.com/post");
}

#[test]
fn file_urls_have_empty_host() {
    let loc = DocumentLocation::parse("file:///home/user/notes.html").unwrap();
    assert_eq!(loc.host, "");
    assert_eq!(loc.path, "/home/user/notes.html");
}

#[test]
fn field_key_display_and_identity() {
    let key = FieldKey {
        location: DocumentLocation::parse("http://example.com/post?x=1").unwrap(),
        node: "comment".into(),
    };
    assert_eq!(key.document_identity(), "http://example.com/post?");
    assert_eq!(key.to_string(), "http://example.com/post?#comment");
}

#[test]
fn uids_are_fresh_per_record() {
    let key = FieldKey {
        location: DocumentLocation::parse("http://example.com/post").unwrap(),
        node: "comment".into(),
    };
    let a = Uid::generate(&key);
    let b = Uid::generate(&key);
    assert_ne!(a, b);
    assert_eq!(a.as_str().len(), UID_LEN);
    assert_eq!(Uid::from(a.to_string()), a);
}
