//! Exact-match lookup over a fixed table.

use std::collections::HashMap;
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
use wrap_core::Wrapper;

/// Maps uris to redirects, packages or wrappers registered up front.
///
/// Every call records exactly one step, whether it hits or misses.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    uri_map: HashMap<Uri, UriPackageOrWrapper>,
}

impl StaticResolver {
    pub fn new(uri_map: HashMap<Uri, UriPackageOrWrapper>) -> Self {
        Self { uri_map }
    }

    pub fn with_redirect(mut self, from: Uri, to: Uri) -> Self {
        self.uri_map.insert(from, UriPackageOrWrapper::Uri(to));
        self
    }

    pub fn with_package(mut self, uri: Uri, package: Arc<dyn WrapPackage>) -> Self {
        self.uri_map
            .insert(uri.clone(), UriPackageOrWrapper::Package { uri, package });
        self
    }

    pub fn with_wrapper(mut self, uri: Uri, wrapper: Arc<dyn Wrapper>) -> Self {
        self.uri_map
            .insert(uri.clone(), UriPackageOrWrapper::Wrapper { uri, wrapper });
        self
    }

    pub fn len(&self) -> usize {
        self.uri_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uri_map.is_empty()
    }
}

fn describe(uri: &Uri, result: &UriPackageOrWrapper) -> String {
    match result {
        UriPackageOrWrapper::Uri(to) if to == uri => "StaticResolver - Miss".to_string(),
        UriPackageOrWrapper::Uri(to) => format!("StaticResolver - Redirect ({uri} - {to})"),
        UriPackageOrWrapper::Package { uri, .. } => format!("StaticResolver - Package ({uri})"),
        UriPackageOrWrapper::Wrapper { uri, .. } => format!("StaticResolver - Wrapper ({uri})"),
    }
}

#[async_trait]
impl UriResolver for StaticResolver {
    async fn try_resolve_uri(
        &self,
        uri: &Uri,
        _invoker: Arc<dyn Invoker>,
        resolution_context: &ResolutionContext,
    ) -> Result<UriPackageOrWrapper> {
        let result = self
            .uri_map
            .get(uri)
            .cloned()
            .unwrap_or_else(|| UriPackageOrWrapper::Uri(uri.clone()));

        tracing::trace!(uri = %uri, result = ?result, "static lookup");
        resolution_context.track_step(
            UriResolutionStep::new(uri.clone(), Ok(result.clone()))
                .with_description(describe(uri, &result)),
        );
        Ok(result)
    }
}
