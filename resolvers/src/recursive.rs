//! Redirect chasing with cycle detection.

use std::sync::Arc;

use async_trait::async_trait;
use wrap_core::Error;
use wrap_core::Invoker;
use wrap_core::ResolutionContext;
use wrap_core::Result;
use wrap_core::Uri;
use wrap_core::UriPackageOrWrapper;
use wrap_core::UriResolver;

/// Upper bound on nested resolutions in one call tree, counting those started
/// by extension invocations.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Re-resolves redirects until the wrapped resolver reaches a fixpoint.
///
/// The in-flight marker for a uri is held until the whole chain below it has
/// settled, so `A -> B -> A` is caught when `A` is requested the second time.
/// The depth limit guards against unbounded chains of distinct uris and
/// against extensions that can only be loaded through each other, where every
/// re-entry starts with a fresh in-flight set.
#[derive(Debug, Clone)]
pub struct RecursiveResolver {
    resolver: Arc<dyn UriResolver>,
    max_depth: usize,
}

impl RecursiveResolver {
    pub fn new(resolver: Arc<dyn UriResolver>) -> Self {
        Self {
            resolver,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[async_trait]
impl UriResolver for RecursiveResolver {
    async fn try_resolve_uri(
        &self,
        uri: &Uri,
        invoker: Arc<dyn Invoker>,
        resolution_context: &ResolutionContext,
    ) -> Result<UriPackageOrWrapper> {
        if resolution_context.is_resolving(uri) {
            tracing::warn!(uri = %uri, "infinite loop detected during uri resolution");
            return Err(Error::InfiniteLoop {
                uri: uri.clone(),
                history: resolution_context.history(),
            });
        }
        if resolution_context.depth() >= self.max_depth {
            tracing::warn!(uri = %uri, max_depth = self.max_depth, "uri resolution too deep");
            return Err(Error::RecursionLimit {
                uri: uri.clone(),
                depth: self.max_depth,
            });
        }

        let _guard = resolution_context.start_resolving(uri);
        let result = self
            .resolver
            .try_resolve_uri(uri, Arc::clone(&invoker), resolution_context)
            .await?;

        match result {
            UriPackageOrWrapper::Uri(next) if next != *uri => {
                tracing::trace!(from = %uri, to = %next, "following redirect");
                self.try_resolve_uri(&next, invoker, resolution_context)
                    .await
            }
            settled => Ok(settled),
        }
    }
}
