//! The invocation capability the engine consumes.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::resolution::ResolutionContext;
use crate::uri::Uri;

/// Interface uri -> implementation uris, in registration order.
pub type InterfaceImplementations = HashMap<Uri, Vec<Uri>>;

/// Invokes wrapper methods by uri and exposes the interface-implementation
/// registry.
///
/// Implemented by the client that owns the top-level resolver. Passing a
/// `resolution_context` lets the invocation's own uri resolution contribute to
/// a caller's history.
#[async_trait]
pub trait Invoker: Send + Sync {
    async fn invoke_raw(
        &self,
        uri: &Uri,
        method: &str,
        args: Option<&[u8]>,
        env: Option<&[u8]>,
        resolution_context: Option<ResolutionContext>,
    ) -> Result<Vec<u8>>;

    /// Implementations registered for `interface`, or `None` when the
    /// interface is unknown.
    fn get_implementations(&self, interface: &Uri) -> Option<Vec<Uri>>;

    fn get_interfaces(&self) -> Option<InterfaceImplementations>;

    fn get_env_by_uri(&self, uri: &Uri) -> Option<Vec<u8>>;
}
