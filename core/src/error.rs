//! Error taxonomy for URI resolution.
//!
//! A miss is not an error: a resolver signals "no mapping" by returning the
//! uri it was given. Everything in this module is a genuine failure that the
//! engine propagates without trying the next resolver.

use std::sync::Arc;

use thiserror::Error;

use crate::resolution::UriResolutionStep;
use crate::uri::Uri;
use crate::uri::UriParseError;

/// Error category for structured logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A uri string could not be parsed
    Construction,
    /// Cycle detection or the recursion fuse fired
    Loop,
    /// An extension resolver wrapper failed or could not be found
    Extension,
    /// The resolved wrapper could not be found, created or invoked
    Wrapper,
    /// File or manifest access failed
    Package,
    /// Argument or result (de)serialization failed
    Codec,
    /// Client configuration is unusable
    Config,
}

impl ErrorCategory {
    /// Machine-readable code for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Construction => "CONSTRUCTION_ERROR",
            Self::Loop => "LOOP_ERROR",
            Self::Extension => "EXTENSION_ERROR",
            Self::Wrapper => "WRAPPER_ERROR",
            Self::Package => "PACKAGE_ERROR",
            Self::Codec => "CODEC_ERROR",
            Self::Config => "CONFIG_ERROR",
        }
    }
}

/// Engine error.
///
/// `Clone` because resolution steps carry their results and histories are
/// snapshotted into errors. Foreign causes are kept as messages; nested engine
/// errors are shared through `Arc`.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error(transparent)]
    UriParse(#[from] UriParseError),

    #[error("infinite loop detected while resolving {uri}")]
    InfiniteLoop {
        uri: Uri,
        history: Vec<UriResolutionStep>,
    },

    #[error("resolution of {uri} exceeded the maximum depth of {depth}")]
    RecursionLimit { uri: Uri, depth: usize },

    #[error("uri resolver extension {extension_uri} failed while resolving {uri}: {source}")]
    ResolverExtension {
        uri: Uri,
        extension_uri: Uri,
        source: Arc<Error>,
    },

    #[error("uri resolver extension {extension_uri} not found while resolving {uri}")]
    ResolverExtensionNotFound {
        uri: Uri,
        extension_uri: Uri,
        history: Vec<UriResolutionStep>,
    },

    #[error("wrapper not found: {uri}")]
    WrapperNotFound {
        uri: Uri,
        history: Vec<UriResolutionStep>,
    },

    #[error("failed to create wrapper for {uri}: {message}")]
    WrapperCreate { uri: Uri, message: String },

    #[error("failed to invoke {uri} method {method}: {message}")]
    Invoke {
        uri: Uri,
        method: String,
        message: String,
    },

    #[error("invocation of {uri} method {method} timed out after {timeout_ms}ms")]
    InvokeTimeout {
        uri: Uri,
        method: String,
        timeout_ms: u64,
    },

    #[error("failed to read file {path}: {message}")]
    FileRead { path: String, message: String },

    #[error("invalid manifest: {0}")]
    Manifest(String),

    #[error("failed to encode: {0}")]
    Encode(String),

    #[error("failed to decode: {0}")]
    Decode(String),

    #[error("config error: {0}")]
    Config(String),

    /// A failure captured once by a caching resolver and replayed verbatim.
    #[error(transparent)]
    Cached(Arc<Error>),
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UriParse(_) => ErrorCategory::Construction,
            Self::InfiniteLoop { .. } | Self::RecursionLimit { .. } => ErrorCategory::Loop,
            Self::ResolverExtension { .. } | Self::ResolverExtensionNotFound { .. } => {
                ErrorCategory::Extension
            }
            Self::WrapperNotFound { .. }
            | Self::WrapperCreate { .. }
            | Self::Invoke { .. }
            | Self::InvokeTimeout { .. } => ErrorCategory::Wrapper,
            Self::FileRead { .. } | Self::Manifest(_) => ErrorCategory::Package,
            Self::Encode(_) | Self::Decode(_) => ErrorCategory::Codec,
            Self::Config(_) => ErrorCategory::Config,
            Self::Cached(inner) => inner.category(),
        }
    }

    /// Wrap this error for caching so that every replay shares one allocation.
    ///
    /// Already cached errors are returned as-is.
    pub fn into_cached(self) -> Self {
        match self {
            Self::Cached(_) => self,
            other => Self::Cached(Arc::new(other)),
        }
    }

    /// The underlying error with any cache wrapping peeled off.
    pub fn root(&self) -> &Error {
        match self {
            Self::Cached(inner) => inner.root(),
            other => other,
        }
    }

    /// History recorded at the point of failure, when the variant carries one.
    pub fn history(&self) -> Option<&[UriResolutionStep]> {
        match self.root() {
            Self::InfiniteLoop { history, .. }
            | Self::ResolverExtensionNotFound { history, .. }
            | Self::WrapperNotFound { history, .. } => Some(history),
            _ => None,
        }
    }

    pub fn encode(err: impl std::fmt::Display) -> Self {
        Self::Encode(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type for resolution operations
pub type Result<T> = std::result::Result<T, Error>;
