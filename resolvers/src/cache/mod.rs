//! Caching resolvers and the stores behind them.
//!
//! Stores are injected; the resolvers only decide what gets read and written.
//! Writes are idempotent, so two resolutions racing on the same uri may both
//! miss and both write without conflict.

mod resolution_result;
mod wrapper;

pub use resolution_result::RESOLUTION_RESULT_CACHE_NAME;
pub use resolution_result::ResolutionResultCacheResolver;
pub use wrapper::PACKAGE_TO_WRAPPER_CACHE_NAME;
pub use wrapper::PackageToWrapperCacheResolver;
pub use wrapper::WrapperCacheResolver;

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use wrap_core::Result;
use wrap_core::Uri;
use wrap_core::UriPackageOrWrapper;
use wrap_core::Wrapper;

/// Store for whole resolution outcomes, keyed by the exact input uri.
pub trait ResolutionResultCache: Send + Sync + Debug {
    fn get(&self, uri: &Uri) -> Option<Result<UriPackageOrWrapper>>;

    fn set(&self, uri: Uri, result: Result<UriPackageOrWrapper>);
}

/// Store for instantiated wrappers, keyed by every alias that leads to them.
pub trait WrapperCache: Send + Sync + Debug {
    fn get(&self, uri: &Uri) -> Option<Arc<dyn Wrapper>>;

    fn set(&self, uri: Uri, wrapper: Arc<dyn Wrapper>);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory [`ResolutionResultCache`].
#[derive(Debug, Default)]
pub struct BasicResolutionResultCache {
    entries: Mutex<HashMap<Uri, Result<UriPackageOrWrapper>>>,
}

impl BasicResolutionResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }

    pub fn clear(&self) {
        lock(&self.entries).clear();
    }
}

impl ResolutionResultCache for BasicResolutionResultCache {
    fn get(&self, uri: &Uri) -> Option<Result<UriPackageOrWrapper>> {
        lock(&self.entries).get(uri).cloned()
    }

    fn set(&self, uri: Uri, result: Result<UriPackageOrWrapper>) {
        lock(&self.entries).insert(uri, result);
    }
}

/// In-memory [`WrapperCache`].
#[derive(Debug, Default)]
pub struct BasicWrapperCache {
    entries: Mutex<HashMap<Uri, Arc<dyn Wrapper>>>,
}

impl BasicWrapperCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }

    pub fn clear(&self) {
        lock(&self.entries).clear();
    }
}

impl WrapperCache for BasicWrapperCache {
    fn get(&self, uri: &Uri) -> Option<Arc<dyn Wrapper>> {
        lock(&self.entries).get(uri).cloned()
    }

    fn set(&self, uri: Uri, wrapper: Arc<dyn Wrapper>) {
        lock(&self.entries).insert(uri, wrapper);
    }
}
