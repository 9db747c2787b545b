use std::fmt;

use url::Url;

/// The parts of a document URL that identify a "page shape".
///
/// The fragment is dropped and the query string only contributes a presence
/// marker, so `post?x=1` and `post?x=2` group together.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentLocation {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
    pub path: String,
    pub has_query: bool,
}

impl DocumentLocation {
    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(raw)?;
        Ok(Self::from_url(&url))
    }

    pub fn from_url(url: &Url) -> Self {
        DocumentLocation {
            scheme: url.scheme().to_string(),
            host: url.host_str().unwrap_or_default().to_string(),
            port: url.port(),
            path: url.path().to_string(),
            has_query: url.query().is_some(),
        }
    }

    /// Port as a string, empty when the scheme default applies.
    pub fn port_str(&self) -> String {
        self.port.map(|p| p.to_string()).unwrap_or_default()
    }

    pub fn query_marker(&self) -> &'static str {
        if self.has_query { "?" } else { "" }
    }

    /// Stable identity string used as the document half of a `FieldKey`.
    pub fn identity(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DocumentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        write!(f, "{}{}", self.path, self.query_marker())
    }
}
