//! Resolution delegated to wrappers implementing the uri-resolver-ext
//! interface.
//!
//! Implementations are discovered through [`wrap_core::Invoker::get_implementations`]
//! and called over JSON:
//!
//! - `tryResolveUri({ authority, path })` returns `{ uri?, manifest? }`
//! - `getFile({ path })` returns the file bytes or `null`

mod extendable;
mod file_reader;
mod wrapper;

pub use extendable::EXTENDABLE_RESOLVER_NAME;
pub use extendable::ExtendableUriResolver;
pub use extendable::default_extension_interfaces;
pub use file_reader::UriResolverExtensionFileReader;
pub use wrapper::UriResolverWrapper;

use serde::Deserialize;
use serde::Serialize;

/// Extension interfaces consulted by default, most specific first.
pub const DEFAULT_EXTENSION_INTERFACES: [&str; 2] = [
    "wrap://ens/wraps.eth:uri-resolver-ext@1.1.0",
    "wrap://ens/wraps.eth:uri-resolver-ext@1.0.0",
];

pub(crate) const TRY_RESOLVE_URI_METHOD: &str = "tryResolveUri";
pub(crate) const GET_FILE_METHOD: &str = "getFile";

#[derive(Debug, Serialize)]
pub(crate) struct TryResolveUriArgs<'a> {
    pub authority: &'a str,
    pub path: &'a str,
}

/// Extension answer: a redirect, a manifest, or neither for a miss.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct MaybeUriOrManifest {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub manifest: Option<Vec<u8>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetFileArgs<'a> {
    pub path: &'a str,
}
