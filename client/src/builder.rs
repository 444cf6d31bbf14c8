use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use wrap_core::Error;
use wrap_core::FileReader;
use wrap_core::InterfaceImplementations;
use wrap_core::Result;
use wrap_core::Uri;
use wrap_core::UriResolver;
use wrap_core::WrapManifest;
use wrap_core::WrapPackage;
use wrap_core::Wrapper;
use wrap_core::WrapperRuntime;
use wrap_resolvers::BasicResolutionResultCache;
use wrap_resolvers::BasicWrapperCache;
use wrap_resolvers::ExtendableUriResolver;
use wrap_resolvers::PackageToWrapperCacheResolver;
use wrap_resolvers::RecursiveResolver;
use wrap_resolvers::ResolutionResultCache;
use wrap_resolvers::ResolutionResultCacheResolver;
use wrap_resolvers::StaticResolver;
use wrap_resolvers::UriResolverAggregator;
use wrap_resolvers::WrapperCache;
use wrap_resolvers::extensions::default_extension_interfaces;

use crate::client::WrapClient;
use crate::config::CacheMode;
use crate::config::ClientConfig;

/// Runtime used when none is configured: redirects from extensions still
/// work, packages described by a manifest cannot be instantiated.
#[derive(Debug)]
struct MissingRuntime;

#[async_trait]
impl WrapperRuntime for MissingRuntime {
    async fn instantiate(
        &self,
        manifest: WrapManifest,
        _file_reader: Arc<dyn FileReader>,
    ) -> Result<Arc<dyn Wrapper>> {
        Err(Error::Config(format!(
            "no wrapper runtime configured to instantiate {}",
            manifest.name
        )))
    }
}

/// Assembles a [`WrapClient`] and its resolver stack:
///
/// ```text
/// Recursive(Cache(Aggregator([Static, ...custom resolvers, Extendable])))
/// ```
#[derive(Debug)]
pub struct ClientBuilder {
    table: StaticResolver,
    resolvers: Vec<Arc<dyn UriResolver>>,
    interfaces: InterfaceImplementations,
    envs: HashMap<Uri, Vec<u8>>,
    runtime: Option<Arc<dyn WrapperRuntime>>,
    cache: CacheMode,
    cache_errors: bool,
    result_cache: Option<Arc<dyn ResolutionResultCache>>,
    wrapper_cache: Option<Arc<dyn WrapperCache>>,
    max_depth: usize,
    extension_interfaces: Vec<Uri>,
    timeout: Option<Duration>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            table: StaticResolver::default(),
            resolvers: Vec::new(),
            interfaces: InterfaceImplementations::new(),
            envs: HashMap::new(),
            runtime: None,
            cache: CacheMode::default(),
            cache_errors: false,
            result_cache: None,
            wrapper_cache: None,
            max_depth: wrap_resolvers::DEFAULT_MAX_DEPTH,
            extension_interfaces: default_extension_interfaces(),
            timeout: None,
        }
    }

    /// Start from a loaded [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = Self::new();
        for (from, to) in config.redirects()? {
            builder = builder.add_redirect(from, to);
        }
        for (interface, implementations) in config.interface_implementations()? {
            for implementation in implementations {
                builder = builder.add_interface_implementation(interface.clone(), implementation);
            }
        }
        builder.envs.extend(config.envs()?);
        builder.cache = config.resolution.cache;
        builder.cache_errors = config.resolution.cache_errors;
        builder.max_depth = config.resolution.max_depth;
        builder.extension_interfaces = config.extension_interfaces()?;
        builder.timeout = config.timeout();
        Ok(builder)
    }

    pub fn add_redirect(mut self, from: Uri, to: Uri) -> Self {
        self.table = self.table.with_redirect(from, to);
        self
    }

    pub fn add_package(mut self, uri: Uri, package: Arc<dyn WrapPackage>) -> Self {
        self.table = self.table.with_package(uri, package);
        self
    }

    pub fn add_wrapper(mut self, uri: Uri, wrapper: Arc<dyn Wrapper>) -> Self {
        self.table = self.table.with_wrapper(uri, wrapper);
        self
    }

    /// Custom resolvers run after the static table and before extensions, in
    /// the order they were added.
    pub fn add_resolver(mut self, resolver: Arc<dyn UriResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    pub fn add_interface_implementation(mut self, interface: Uri, implementation: Uri) -> Self {
        let implementations = self.interfaces.entry(interface).or_default();
        if !implementations.contains(&implementation) {
            implementations.push(implementation);
        }
        self
    }

    /// Env handed to every invocation of `uri`, encoded as JSON.
    pub fn add_env<E: Serialize + ?Sized>(mut self, uri: Uri, env: &E) -> Result<Self> {
        let env = serde_json::to_vec(env).map_err(Error::encode)?;
        self.envs.insert(uri, env);
        Ok(self)
    }

    /// Runtime used to instantiate packages returned by resolver extensions.
    pub fn with_runtime(mut self, runtime: Arc<dyn WrapperRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn with_result_cache(
        mut self,
        cache: Arc<dyn ResolutionResultCache>,
        cache_errors: bool,
    ) -> Self {
        self.cache = CacheMode::Result;
        self.result_cache = Some(cache);
        self.cache_errors = cache_errors;
        self
    }

    pub fn with_wrapper_cache(mut self, cache: Arc<dyn WrapperCache>) -> Self {
        self.cache = CacheMode::Wrapper;
        self.wrapper_cache = Some(cache);
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache = CacheMode::None;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_extension_interfaces(mut self, interfaces: Vec<Uri>) -> Self {
        self.extension_interfaces = interfaces;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> WrapClient {
        let runtime = self
            .runtime
            .unwrap_or_else(|| Arc::new(MissingRuntime) as Arc<dyn WrapperRuntime>);
        let static_entries = self.table.len();
        let custom_resolvers = self.resolvers.len();

        let mut resolvers: Vec<Arc<dyn UriResolver>> = Vec::with_capacity(custom_resolvers + 2);
        resolvers.push(Arc::new(self.table));
        resolvers.extend(self.resolvers);
        resolvers.push(Arc::new(
            ExtendableUriResolver::new(runtime).with_interfaces(self.extension_interfaces),
        ));
        let aggregator: Arc<dyn UriResolver> = Arc::new(UriResolverAggregator::new(resolvers));

        let cached: Arc<dyn UriResolver> = match self.cache {
            CacheMode::Result => {
                let store = self
                    .result_cache
                    .unwrap_or_else(|| {
                        Arc::new(BasicResolutionResultCache::new()) as Arc<dyn ResolutionResultCache>
                    });
                Arc::new(
                    ResolutionResultCacheResolver::new(aggregator, store)
                        .with_cache_errors(self.cache_errors),
                )
            }
            CacheMode::Wrapper => {
                let store = self
                    .wrapper_cache
                    .unwrap_or_else(|| Arc::new(BasicWrapperCache::new()) as Arc<dyn WrapperCache>);
                Arc::new(PackageToWrapperCacheResolver::new(aggregator, store))
            }
            CacheMode::None => aggregator,
        };
        let resolver = RecursiveResolver::new(cached).with_max_depth(self.max_depth);

        tracing::info!(
            static_entries,
            custom_resolvers,
            interfaces = self.interfaces.len(),
            cache = ?self.cache,
            max_depth = self.max_depth,
            timeout = ?self.timeout,
            "wrap client built"
        );
        WrapClient::new(Arc::new(resolver), self.interfaces, self.envs, self.timeout)
    }
}
