//! Resolvers for the wrap URI resolution engine.
//!
//! Leaf resolvers answer from fixed tables. Composite resolvers wrap other
//! resolvers:
//! - [`UriResolverAggregator`] tries a list in order and takes the first hit
//! - [`RecursiveResolver`] chases redirects until a fixpoint and detects cycles
//! - [`ExtendableUriResolver`] delegates to wrappers implementing the
//!   uri-resolver-ext interface
//! - [`ResolutionResultCacheResolver`] and [`PackageToWrapperCacheResolver`]
//!   memoize results and wrapper instances
//!
//! A typical stack is
//! `Recursive(ResultCache(Aggregator([Static, ...custom, Extendable])))`.

#![deny(clippy::print_stdout, clippy::print_stderr)]

mod aggregator;
pub mod cache;
pub mod extensions;
mod package_resolver;
mod recursive;
mod redirect_resolver;
mod static_resolver;
mod wrapper_resolver;

pub use aggregator::DEFAULT_AGGREGATOR_NAME;
pub use aggregator::UriResolverAggregator;
pub use cache::BasicResolutionResultCache;
pub use cache::BasicWrapperCache;
pub use cache::PackageToWrapperCacheResolver;
pub use cache::ResolutionResultCache;
pub use cache::ResolutionResultCacheResolver;
pub use cache::WrapperCache;
pub use cache::WrapperCacheResolver;
pub use extensions::ExtendableUriResolver;
pub use extensions::UriResolverExtensionFileReader;
pub use extensions::UriResolverWrapper;
pub use package_resolver::PackageResolver;
pub use recursive::DEFAULT_MAX_DEPTH;
pub use recursive::RecursiveResolver;
pub use redirect_resolver::RedirectResolver;
pub use static_resolver::StaticResolver;
pub use wrapper_resolver::WrapperResolver;
