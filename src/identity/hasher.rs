use sha1::{Digest, Sha1};
use uuid::Uuid;

/// Length of the hash segment embedded in on-disk file names.
pub const SHORT_HASH_LEN: usize = 8;

/// Length of a record uid.
pub const UID_LEN: usize = 15;

/// Digest an ordered sequence of parts into a lowercase hex token.
///
/// Parts are separated by a unit separator byte so that `["ab", "c"]` and
/// `["a", "bc"]` hash differently.
pub fn hash_parts<S: AsRef<str>>(parts: &[S]) -> String {
    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part.as_ref().as_bytes());
        hasher.update([0x1f]);
    }
    format!("{:x}", hasher.finalize())
}

/// Hash truncated to `len` characters.
pub fn short_hash<S: AsRef<str>>(parts: &[S], len: usize) -> String {
    let mut token = hash_parts(parts);
    token.truncate(len);
    token
}

/// Hash of `parts` salted with a fresh random value.
///
/// Two calls with identical parts never produce the same token, so a page
/// cannot predict or forge the handle of another field.
pub fn salted_hash<S: AsRef<str>>(parts: &[S], len: usize) -> String {
    let mut salted: Vec<String> = parts.iter().map(|p| p.as_ref().to_string()).collect();
    salted.push(Uuid::new_v4().to_string());
    short_hash(&salted, len)
}
