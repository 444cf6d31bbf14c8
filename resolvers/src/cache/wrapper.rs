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
use wrap_core::Wrapper;

use super::WrapperCache;

pub const PACKAGE_TO_WRAPPER_CACHE_NAME: &str = "PackageToWrapperCacheResolver";

/// Instantiates resolved packages once and caches the wrapper under every
/// uri of the alias chain that led to it.
///
/// Redirects and misses pass through untouched.
#[derive(Clone)]
pub struct PackageToWrapperCacheResolver {
    resolver: Arc<dyn UriResolver>,
    cache: Arc<dyn WrapperCache>,
}

pub type WrapperCacheResolver = PackageToWrapperCacheResolver;

impl PackageToWrapperCacheResolver {
    pub fn new(resolver: Arc<dyn UriResolver>, cache: Arc<dyn WrapperCache>) -> Self {
        Self { resolver, cache }
    }

    pub fn cache(&self) -> &Arc<dyn WrapperCache> {
        &self.cache
    }

    fn backfill(&self, uri: &Uri, sub_context: &ResolutionContext, wrapper: &Arc<dyn Wrapper>) {
        let mut aliases = sub_context.resolution_path();
        if !aliases.contains(uri) {
            aliases.push(uri.clone());
        }
        tracing::debug!(uri = %uri, aliases = aliases.len(), "caching wrapper");
        for alias in aliases {
            self.cache.set(alias, Arc::clone(wrapper));
        }
    }

    async fn resolve_uncached(
        &self,
        uri: &Uri,
        invoker: Arc<dyn Invoker>,
        sub_context: &ResolutionContext,
    ) -> Result<UriPackageOrWrapper> {
        match self
            .resolver
            .try_resolve_uri(uri, invoker, sub_context)
            .await?
        {
            UriPackageOrWrapper::Package {
                uri: resolved,
                package,
            } => {
                let wrapper = package.create_wrapper().await?;
                self.backfill(uri, sub_context, &wrapper);
                Ok(UriPackageOrWrapper::Wrapper {
                    uri: resolved,
                    wrapper,
                })
            }
            UriPackageOrWrapper::Wrapper {
                uri: resolved,
                wrapper,
            } => {
                self.backfill(uri, sub_context, &wrapper);
                Ok(UriPackageOrWrapper::Wrapper {
                    uri: resolved,
                    wrapper,
                })
            }
            redirect @ UriPackageOrWrapper::Uri(_) => Ok(redirect),
        }
    }
}

impl fmt::Debug for PackageToWrapperCacheResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackageToWrapperCacheResolver")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl UriResolver for PackageToWrapperCacheResolver {
    async fn try_resolve_uri(
        &self,
        uri: &Uri,
        invoker: Arc<dyn Invoker>,
        resolution_context: &ResolutionContext,
    ) -> Result<UriPackageOrWrapper> {
        if let Some(wrapper) = self.cache.get(uri) {
            tracing::trace!(uri = %uri, cached = true, "wrapper cache hit");
            let result = UriPackageOrWrapper::Wrapper {
                uri: uri.clone(),
                wrapper,
            };
            resolution_context.track_step(
                UriResolutionStep::new(uri.clone(), Ok(result.clone()))
                    .with_description(format!("{PACKAGE_TO_WRAPPER_CACHE_NAME} (Cache)")),
            );
            return Ok(result);
        }

        let sub_context = resolution_context.create_sub_history_context();
        let result = self.resolve_uncached(uri, invoker, &sub_context).await;

        resolution_context.track_step(
            UriResolutionStep::new(uri.clone(), result.clone())
                .with_description(PACKAGE_TO_WRAPPER_CACHE_NAME)
                .with_sub_history(sub_context.history()),
        );
        result
    }
}
