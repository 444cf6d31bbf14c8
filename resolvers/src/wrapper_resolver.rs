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

/// Resolves a single uri to an already instantiated wrapper.
#[derive(Debug, Clone)]
pub struct WrapperResolver {
    uri: Uri,
    wrapper: Arc<dyn Wrapper>,
}

impl WrapperResolver {
    pub fn new(uri: Uri, wrapper: Arc<dyn Wrapper>) -> Self {
        Self { uri, wrapper }
    }
}

#[async_trait]
impl UriResolver for WrapperResolver {
    async fn try_resolve_uri(
        &self,
        uri: &Uri,
        _invoker: Arc<dyn Invoker>,
        resolution_context: &ResolutionContext,
    ) -> Result<UriPackageOrWrapper> {
        let result = if *uri == self.uri {
            UriPackageOrWrapper::Wrapper {
                uri: uri.clone(),
                wrapper: Arc::clone(&self.wrapper),
            }
        } else {
            UriPackageOrWrapper::Uri(uri.clone())
        };
        resolution_context.track_step(
            UriResolutionStep::new(uri.clone(), Ok(result.clone()))
                .with_description(format!("Wrapper ({})", self.uri)),
        );
        Ok(result)
    }
}
