use std::sync::Arc;

use async_trait::async_trait;
use wrap_core::Invoker;
use wrap_core::ResolutionContext;
use wrap_core::Result;
use wrap_core::Uri;
use wrap_core::UriPackageOrWrapper;
use wrap_core::UriResolutionStep;
use wrap_core::UriResolver;
use wrap_core::WrapPackage;

/// Resolves a single uri to a package.
#[derive(Debug, Clone)]
pub struct PackageResolver {
    uri: Uri,
    package: Arc<dyn WrapPackage>,
}

impl PackageResolver {
    pub fn new(uri: Uri, package: Arc<dyn WrapPackage>) -> Self {
        Self { uri, package }
    }
}

#[async_trait]
impl UriResolver for PackageResolver {
    async fn try_resolve_uri(
        &self,
        uri: &Uri,
        _invoker: Arc<dyn Invoker>,
        resolution_context: &ResolutionContext,
    ) -> Result<UriPackageOrWrapper> {
        let result = if *uri == self.uri {
            UriPackageOrWrapper::Package {
                uri: uri.clone(),
                package: Arc::clone(&self.package),
            }
        } else {
            UriPackageOrWrapper::Uri(uri.clone())
        };
        resolution_context.track_step(
            UriResolutionStep::new(uri.clone(), Ok(result.clone()))
                .with_description(format!("Package ({})", self.uri)),
        );
        Ok(result)
    }
}
