use std::sync::Arc;

use async_trait::async_trait;
use wrap_core::Invoker;
use wrap_core::ResolutionContext;
use wrap_core::Result;
use wrap_core::Uri;
use wrap_core::UriPackageOrWrapper;
use wrap_core::UriResolutionStep;
use wrap_core::UriResolver;

/// Redirects a single uri to another.
#[derive(Debug, Clone)]
pub struct RedirectResolver {
    from: Uri,
    to: Uri,
}

impl RedirectResolver {
    pub fn new(from: Uri, to: Uri) -> Self {
        Self { from, to }
    }
}

#[async_trait]
impl UriResolver for RedirectResolver {
    async fn try_resolve_uri(
        &self,
        uri: &Uri,
        _invoker: Arc<dyn Invoker>,
        resolution_context: &ResolutionContext,
    ) -> Result<UriPackageOrWrapper> {
        let target = if *uri == self.from { &self.to } else { uri };
        let result = UriPackageOrWrapper::Uri(target.clone());
        resolution_context.track_step(
            UriResolutionStep::new(uri.clone(), Ok(result.clone()))
                .with_description(format!("Redirect ({} - {})", self.from, self.to)),
        );
        Ok(result)
    }
}
