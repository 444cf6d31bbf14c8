//! The single capability every resolver implements.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::invoker::Invoker;
use crate::resolution::ResolutionContext;
use crate::resolution::UriPackageOrWrapper;
use crate::uri::Uri;

/// Maps a uri to a redirect, a package or a wrapper.
///
/// Returning `UriPackageOrWrapper::Uri(uri.clone())` is a miss. Errors are
/// genuine failures and are never swallowed by composite resolvers.
#[async_trait]
pub trait UriResolver: Send + Sync + Debug {
    async fn try_resolve_uri(
        &self,
        uri: &Uri,
        invoker: Arc<dyn Invoker>,
        resolution_context: &ResolutionContext,
    ) -> Result<UriPackageOrWrapper>;
}
