use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use wrap_core::Error;
use wrap_core::InterfaceImplementations;
use wrap_core::Invoker;
use wrap_core::ResolutionContext;
use wrap_core::Result;
use wrap_core::Uri;
use wrap_core::UriPackageOrWrapper;
use wrap_core::UriResolver;
use wrap_core::Wrapper;

use crate::builder::ClientBuilder;

/// Resolves uris through its resolver stack and invokes the resulting
/// wrappers. Cloning is cheap; clones share everything.
#[derive(Debug, Clone)]
pub struct WrapClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    resolver: Arc<dyn UriResolver>,
    interfaces: InterfaceImplementations,
    envs: HashMap<Uri, Vec<u8>>,
    timeout: Option<Duration>,
}

impl WrapClient {
    pub(crate) fn new(
        resolver: Arc<dyn UriResolver>,
        interfaces: InterfaceImplementations,
        envs: HashMap<Uri, Vec<u8>>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                resolver,
                interfaces,
                envs,
                timeout,
            }),
        }
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn resolver(&self) -> &Arc<dyn UriResolver> {
        &self.inner.resolver
    }

    fn as_invoker(&self) -> Arc<dyn Invoker> {
        Arc::new(self.clone())
    }

    /// Resolve `uri` in `resolution_context`, or in a fresh context.
    pub async fn try_resolve_uri(
        &self,
        uri: &Uri,
        resolution_context: Option<&ResolutionContext>,
    ) -> Result<UriPackageOrWrapper> {
        let ctx = resolution_context.cloned().unwrap_or_default();
        self.inner
            .resolver
            .try_resolve_uri(uri, self.as_invoker(), &ctx)
            .await
    }

    /// Resolve `uri` to a live wrapper, instantiating a package if needed.
    pub async fn load_wrapper(
        &self,
        uri: &Uri,
        resolution_context: Option<&ResolutionContext>,
    ) -> Result<Arc<dyn Wrapper>> {
        let ctx = resolution_context.cloned().unwrap_or_default();
        match self.try_resolve_uri(uri, Some(&ctx)).await? {
            UriPackageOrWrapper::Uri(_) => Err(Error::WrapperNotFound {
                uri: uri.clone(),
                history: ctx.history(),
            }),
            UriPackageOrWrapper::Package { uri: resolved, package } => {
                tracing::debug!(uri = %uri, resolved = %resolved, "instantiating package");
                package.create_wrapper().await
            }
            UriPackageOrWrapper::Wrapper { wrapper, .. } => Ok(wrapper),
        }
    }

    /// Invoke `method` with JSON-encoded `args` and decode the JSON result.
    pub async fn invoke<T, A>(&self, uri: &Uri, method: &str, args: &A) -> Result<T>
    where
        T: DeserializeOwned,
        A: Serialize + ?Sized,
    {
        let args = serde_json::to_vec(args).map_err(Error::encode)?;
        let bytes = self.invoke_raw(uri, method, Some(&args), None, None).await?;
        serde_json::from_slice(&bytes).map_err(Error::decode)
    }
}

#[async_trait]
impl Invoker for WrapClient {
    async fn invoke_raw(
        &self,
        uri: &Uri,
        method: &str,
        args: Option<&[u8]>,
        env: Option<&[u8]>,
        resolution_context: Option<ResolutionContext>,
    ) -> Result<Vec<u8>> {
        let wrapper = self
            .load_wrapper(uri, resolution_context.as_ref())
            .await?;

        let configured_env = self.inner.envs.get(uri);
        let env = env.or(configured_env.map(Vec::as_slice));
        tracing::debug!(uri = %uri, method, "invoking wrapper");

        let invocation = wrapper.invoke(method, args, env, self.as_invoker());
        match self.inner.timeout {
            Some(timeout) => tokio::time::timeout(timeout, invocation)
                .await
                .map_err(|_| Error::InvokeTimeout {
                    uri: uri.clone(),
                    method: method.to_string(),
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                })?,
            None => invocation.await,
        }
    }

    fn get_implementations(&self, interface: &Uri) -> Option<Vec<Uri>> {
        self.inner.interfaces.get(interface).cloned()
    }

    fn get_interfaces(&self) -> Option<InterfaceImplementations> {
        if self.inner.interfaces.is_empty() {
            return None;
        }
        Some(self.inner.interfaces.clone())
    }

    fn get_env_by_uri(&self, uri: &Uri) -> Option<Vec<u8>> {
        self.inner.envs.get(uri).cloned()
    }
}
