//! First-hit composition over an ordered resolver list.

use std::sync::Arc;

use async_trait::async_trait;
use wrap_core::Invoker;
use wrap_core::ResolutionContext;
use wrap_core::Result;
use wrap_core::Uri;
use wrap_core::UriPackageOrWrapper;
use wrap_core::UriResolutionStep;
use wrap_core::UriResolver;

pub const DEFAULT_AGGREGATOR_NAME: &str = "UriResolverAggregator";

/// Tries each resolver in list order and returns the first hit.
///
/// Children run against a sub-history context, so their steps end up nested
/// under the single step this resolver records. An error from any child is
/// recorded and returned immediately; later resolvers are not consulted.
#[derive(Debug, Clone)]
pub struct UriResolverAggregator {
    resolvers: Vec<Arc<dyn UriResolver>>,
    name: Option<String>,
}

impl UriResolverAggregator {
    pub fn new(resolvers: Vec<Arc<dyn UriResolver>>) -> Self {
        Self {
            resolvers,
            name: None,
        }
    }

    /// Name used as the description of this resolver's steps.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_AGGREGATOR_NAME)
    }

    pub fn resolvers(&self) -> &[Arc<dyn UriResolver>] {
        &self.resolvers
    }
}

#[async_trait]
impl UriResolver for UriResolverAggregator {
    async fn try_resolve_uri(
        &self,
        uri: &Uri,
        invoker: Arc<dyn Invoker>,
        resolution_context: &ResolutionContext,
    ) -> Result<UriPackageOrWrapper> {
        aggregate(uri, &self.resolvers, invoker, resolution_context, self.name()).await
    }
}

/// The aggregation algorithm, shared with resolvers that build their child
/// list per call.
pub(crate) async fn aggregate(
    uri: &Uri,
    resolvers: &[Arc<dyn UriResolver>],
    invoker: Arc<dyn Invoker>,
    resolution_context: &ResolutionContext,
    name: &str,
) -> Result<UriPackageOrWrapper> {
    let sub_context = resolution_context.create_sub_history_context();

    for (index, resolver) in resolvers.iter().enumerate() {
        let result = resolver
            .try_resolve_uri(uri, Arc::clone(&invoker), &sub_context)
            .await;

        match &result {
            Ok(value) if value.is_miss_for(uri) => continue,
            Ok(value) => {
                tracing::trace!(resolver = name, uri = %uri, index, result = ?value, "aggregator hit");
            }
            Err(err) => {
                tracing::debug!(resolver = name, uri = %uri, index, error = %err, "aggregator child failed");
            }
        }

        resolution_context.track_step(
            UriResolutionStep::new(uri.clone(), result.clone())
                .with_description(name)
                .with_sub_history(sub_context.history()),
        );
        return result;
    }

    tracing::trace!(resolver = name, uri = %uri, tried = resolvers.len(), "aggregator miss");
    let result = UriPackageOrWrapper::Uri(uri.clone());
    resolution_context.track_step(
        UriResolutionStep::new(uri.clone(), Ok(result.clone()))
            .with_description(name)
            .with_sub_history(sub_context.history()),
    );
    Ok(result)
}
