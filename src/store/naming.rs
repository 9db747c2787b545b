use crate::identity::field_key::FieldKey;
use crate::identity::hasher::{SHORT_HASH_LEN, short_hash};

/// Cap on the human-readable part of a file name.
pub const MAX_PREFIX_LEN: usize = 100;

/// Suffixes of editor backup / temp siblings that never count as a field's file.
pub const IGNORED_SUFFIXES: &[&str] = &[".bak", ".tmp", "~"];

/// Deterministic on-disk name for a field, minus the extension.
///
/// Rendered as `<prefix>.<hash>`; the hash covers the node identity, the
/// prefix is derived from host and path for humans browsing the directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseName {
    prefix: String,
    hash: String,
}

impl BaseName {
    pub fn for_key(key: &FieldKey) -> Self {
        let loc = &key.location;
        let hash = short_hash(
            &[
                loc.scheme.as_str(),
                loc.port_str().as_str(),
                loc.query_marker(),
                loc.path.as_str(),
                key.node.as_str(),
            ],
            SHORT_HASH_LEN,
        );
        BaseName {
            prefix: sanitize_prefix(&loc.host, &loc.path),
            hash,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn stem(&self) -> String {
        if self.prefix.is_empty() {
            self.hash.clone()
        } else {
            format!("{}.{}", self.prefix, self.hash)
        }
    }

    pub fn file_name(&self, extension: &str) -> String {
        format!("{}{}", self.stem(), extension)
    }

    /// Same name with the prefix halved; `None` once the prefix is gone.
    pub fn shortened(&self) -> Option<BaseName> {
        if self.prefix.is_empty() {
            return None;
        }
        let mut prefix = self.prefix.clone();
        prefix.truncate(prefix.len() / 2);
        Some(BaseName {
            prefix: trim_separators(&prefix).to_string(),
            hash: self.hash.clone(),
        })
    }

    /// Extension of `file_name` if it belongs to this base name and is not
    /// a backup / temp sibling.
    pub fn extension_of(&self, file_name: &str) -> Option<String> {
        let rest = file_name.strip_prefix(&self.stem())?;
        if !rest.starts_with('.') || rest.len() < 2 {
            return None;
        }
        if IGNORED_SUFFIXES.iter().any(|s| rest.ends_with(s)) {
            return None;
        }
        Some(rest.to_string())
    }
}

/// Filesystem-safe, length-bounded rendering of `host` + `path`.
///
/// Path separators become `_`, anything outside `[A-Za-z0-9_.-]` is dropped,
/// runs of dots collapse to one.
pub fn sanitize_prefix(host: &str, path: &str) -> String {
    let mut out = String::with_capacity(host.len() + path.len());
    for c in host.chars().chain(path.chars()) {
        let c = match c {
            '/' | '\\' => '_',
            c if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-' => c,
            _ => continue,
        };
        if c == '.' && out.ends_with('.') {
            continue;
        }
        out.push(c);
    }

    let mut prefix = trim_separators(&out).to_string();
    if prefix.len() > MAX_PREFIX_LEN {
        prefix.truncate(MAX_PREFIX_LEN);
        prefix = trim_separators(&prefix).to_string();
    }
    prefix
}

fn trim_separators(s: &str) -> &str {
    s.trim_matches(|c| c == '_' || c == '.')
}
