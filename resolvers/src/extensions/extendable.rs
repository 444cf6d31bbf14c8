use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use wrap_core::Invoker;
use wrap_core::ResolutionContext;
use wrap_core::Result;
use wrap_core::Uri;
use wrap_core::UriPackageOrWrapper;
use wrap_core::UriResolver;
use wrap_core::WrapperRuntime;

use super::DEFAULT_EXTENSION_INTERFACES;
use super::UriResolverWrapper;
use crate::aggregator::aggregate;

pub const EXTENDABLE_RESOLVER_NAME: &str = "ExtendableUriResolver";

/// Parsed [`DEFAULT_EXTENSION_INTERFACES`].
pub fn default_extension_interfaces() -> Vec<Uri> {
    DEFAULT_EXTENSION_INTERFACES
        .iter()
        .filter_map(|raw| Uri::parse(raw).ok())
        .collect()
}

/// Aggregates every registered extension implementation, in registry order.
///
/// Implementations already being resolved in this context are skipped so an
/// extension never resolves itself through itself.
#[derive(Clone)]
pub struct ExtendableUriResolver {
    interfaces: Vec<Uri>,
    runtime: Arc<dyn WrapperRuntime>,
    name: String,
}

impl ExtendableUriResolver {
    pub fn new(runtime: Arc<dyn WrapperRuntime>) -> Self {
        Self {
            interfaces: default_extension_interfaces(),
            runtime,
            name: EXTENDABLE_RESOLVER_NAME.to_string(),
        }
    }

    /// Replace the interfaces consulted, most specific first.
    pub fn with_interfaces(mut self, interfaces: Vec<Uri>) -> Self {
        self.interfaces = interfaces;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn interfaces(&self) -> &[Uri] {
        &self.interfaces
    }

    /// Registered implementations across all interfaces, deduplicated.
    fn implementations(&self, invoker: &dyn Invoker) -> Vec<Uri> {
        let mut implementations: Vec<Uri> = Vec::new();
        for interface in &self.interfaces {
            for implementation in invoker.get_implementations(interface).unwrap_or_default() {
                if !implementations.contains(&implementation) {
                    implementations.push(implementation);
                }
            }
        }
        implementations
    }
}

impl fmt::Debug for ExtendableUriResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendableUriResolver")
            .field("name", &self.name)
            .field("interfaces", &self.interfaces)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl UriResolver for ExtendableUriResolver {
    async fn try_resolve_uri(
        &self,
        uri: &Uri,
        invoker: Arc<dyn Invoker>,
        resolution_context: &ResolutionContext,
    ) -> Result<UriPackageOrWrapper> {
        let resolvers: Vec<Arc<dyn UriResolver>> = self
            .implementations(invoker.as_ref())
            .into_iter()
            .filter(|implementation| !resolution_context.is_resolving(implementation))
            .map(|implementation| {
                Arc::new(UriResolverWrapper::new(
                    implementation,
                    Arc::clone(&self.runtime),
                )) as Arc<dyn UriResolver>
            })
            .collect();

        if resolvers.is_empty() {
            tracing::trace!(uri = %uri, "no uri resolver extensions available");
            return Ok(UriPackageOrWrapper::Uri(uri.clone()));
        }

        tracing::debug!(uri = %uri, extensions = resolvers.len(), "trying uri resolver extensions");
        aggregate(uri, &resolvers, invoker, resolution_context, &self.name).await
    }
}
