use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use wrap_core::Invoker;
use wrap_core::ResolutionContext;
use wrap_core::Result;
use wrap_core::Uri;
use wrap_core::UriPackageOrWrapper;
use wrap_core::UriResolutionStep;
use wrap_core::UriResolver;

use super::ResolutionResultCache;

pub const RESOLUTION_RESULT_CACHE_NAME: &str = "ResolutionResultCacheResolver";

/// Memoizes whatever `resolver` returns for a uri, misses included.
///
/// Errors are only remembered when `cache_errors` is set; a cached error is
/// shared, so every replay is the same allocation as the first failure.
#[derive(Clone)]
pub struct ResolutionResultCacheResolver {
    resolver: Arc<dyn UriResolver>,
    cache: Arc<dyn ResolutionResultCache>,
    cache_errors: bool,
}

impl ResolutionResultCacheResolver {
    pub fn new(resolver: Arc<dyn UriResolver>, cache: Arc<dyn ResolutionResultCache>) -> Self {
        Self {
            resolver,
            cache,
            cache_errors: false,
        }
    }

    pub fn with_cache_errors(mut self, cache_errors: bool) -> Self {
        self.cache_errors = cache_errors;
        self
    }

    pub fn cache(&self) -> &Arc<dyn ResolutionResultCache> {
        &self.cache
    }
}

impl fmt::Debug for ResolutionResultCacheResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionResultCacheResolver")
            .field("resolver", &self.resolver)
            .field("cache_errors", &self.cache_errors)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl UriResolver for ResolutionResultCacheResolver {
    async fn try_resolve_uri(
        &self,
        uri: &Uri,
        invoker: Arc<dyn Invoker>,
        resolution_context: &ResolutionContext,
    ) -> Result<UriPackageOrWrapper> {
        if let Some(cached) = self.cache.get(uri) {
            tracing::trace!(uri = %uri, cached = true, "resolution result cache hit");
            resolution_context.track_step(
                UriResolutionStep::new(uri.clone(), cached.clone())
                    .with_description(format!("{RESOLUTION_RESULT_CACHE_NAME} (Cache)")),
            );
            return cached;
        }

        let sub_context = resolution_context.create_sub_history_context();
        let result = match self
            .resolver
            .try_resolve_uri(uri, invoker, &sub_context)
            .await
        {
            Ok(value) => {
                self.cache.set(uri.clone(), Ok(value.clone()));
                Ok(value)
            }
            Err(err) if self.cache_errors => {
                let err = err.into_cached();
                self.cache.set(uri.clone(), Err(err.clone()));
                Err(err)
            }
            Err(err) => Err(err),
        };

        tracing::trace!(uri = %uri, cached = false, ok = result.is_ok(), "resolution result cache miss");
        resolution_context.track_step(
            UriResolutionStep::new(uri.clone(), result.clone())
                .with_description(RESOLUTION_RESULT_CACHE_NAME)
                .with_sub_history(sub_context.history()),
        );
        result
    }
}
