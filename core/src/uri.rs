//! Canonical `wrap://` identifiers.
//!
//! A [`Uri`] is an immutable `{authority, path}` pair whose canonical string
//! form is `wrap://{authority}/{path}`. Equality, hashing and ordering are all
//! defined on that canonical string.

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

const WRAP_SCHEME: &str = "wrap://";

/// Raised eagerly when a raw string cannot be turned into a [`Uri`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UriParseError {
    #[error("uri is empty")]
    Empty,

    #[error("the wrap:// scheme must be at the beginning of the uri: {0}")]
    MisplacedScheme(String),

    #[error("uri authority is invalid in {input}: expected [a-z][a-z0-9-_]+")]
    InvalidAuthority { input: String },

    #[error("uri path is empty: {0}")]
    EmptyPath(String),

    #[error(
        "uri is malformed: {0} (valid examples: wrap://ens/domain.eth, wrap://ipfs/QmHASH, ens/domain.eth)"
    )]
    Malformed(String),
}

/// A parsed `wrap://authority/path` identifier.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uri {
    authority: String,
    path: String,
    uri: String,
}

impl Uri {
    /// Build a uri from already separated parts.
    ///
    /// The parts must survive a trip through [`Uri::parse`] unchanged, so a
    /// path with trailing whitespace is rejected.
    pub fn new(
        authority: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<Self, UriParseError> {
        let authority = authority.into();
        let path = path.into();
        let candidate = format!("{WRAP_SCHEME}{authority}/{path}");
        if !is_valid_authority(&authority) {
            return Err(UriParseError::InvalidAuthority { input: candidate });
        }
        if path.is_empty() {
            return Err(UriParseError::EmptyPath(candidate));
        }
        let uri = Self::parse(&candidate)?;
        if uri.authority != authority || uri.path != path {
            return Err(UriParseError::Malformed(candidate));
        }
        Ok(uri)
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Canonical `wrap://` form.
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// Parse a raw string.
    ///
    /// Accepted shapes:
    /// - `wrap://authority/path`
    /// - `authority/path` (scheme is added)
    /// - `/authority/path` (leading slashes are trimmed)
    /// - `scheme://rest` such as `https://domain.com/x`, which becomes
    ///   `wrap://https/domain.com/x`
    pub fn parse(input: &str) -> Result<Self, UriParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(UriParseError::Empty);
        }

        let trimmed = trimmed.trim_start_matches('/');
        let rest = match trimmed.find(WRAP_SCHEME) {
            Some(0) => &trimmed[WRAP_SCHEME.len()..],
            Some(_) => return Err(UriParseError::MisplacedScheme(input.to_string())),
            None => trimmed,
        };

        // `https://domain.com/x` style uris keep their scheme as the authority.
        if let Some((authority, path)) = rest.split_once("://")
            && is_valid_authority(authority)
        {
            return Self::from_parts(input, authority, path);
        }

        match rest.split_once('/') {
            Some((authority, path)) => Self::from_parts(input, authority, path),
            None => Err(UriParseError::Malformed(input.to_string())),
        }
    }

    fn from_parts(input: &str, authority: &str, path: &str) -> Result<Self, UriParseError> {
        if !is_valid_authority(authority) {
            return Err(UriParseError::InvalidAuthority {
                input: input.to_string(),
            });
        }
        if path.is_empty() {
            return Err(UriParseError::EmptyPath(input.to_string()));
        }
        Ok(Self {
            authority: authority.to_string(),
            path: path.to_string(),
            uri: format!("{WRAP_SCHEME}{authority}/{path}"),
        })
    }
}

fn is_valid_authority(authority: &str) -> bool {
    let mut chars = authority.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return false,
    }
    let rest = chars.as_str();
    !rest.is_empty()
        && rest
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

impl PartialEq for Uri {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
    }
}

impl Eq for Uri {}

impl Hash for Uri {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uri.hash(state);
    }
}

impl PartialOrd for Uri {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Uri {
    fn cmp(&self, other: &Self) -> Ordering {
        self.uri.cmp(&other.uri)
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

impl fmt::Debug for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uri({})", self.uri)
    }
}

impl FromStr for Uri {
    type Err = UriParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Uri {
    type Error = UriParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Uri {
    type Error = UriParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Uri> for String {
    fn from(uri: Uri) -> Self {
        uri.uri
    }
}
