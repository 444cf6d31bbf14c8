use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use wrap_core::Error;
use wrap_core::FilePackage;
use wrap_core::Invoker;
use wrap_core::ResolutionContext;
use wrap_core::Result;
use wrap_core::Uri;
use wrap_core::UriPackageOrWrapper;
use wrap_core::UriResolutionStep;
use wrap_core::UriResolver;
use wrap_core::WrapperRuntime;

use super::MaybeUriOrManifest;
use super::TRY_RESOLVE_URI_METHOD;
use super::TryResolveUriArgs;
use super::UriResolverExtensionFileReader;

/// A single extension implementation seen as a resolver.
///
/// The extension is loaded and invoked through the invoker in a sub-context:
/// its own resolution is not part of the chain being resolved, but its steps
/// still show up in the trace.
#[derive(Clone)]
pub struct UriResolverWrapper {
    implementation_uri: Uri,
    runtime: Arc<dyn WrapperRuntime>,
}

impl UriResolverWrapper {
    pub fn new(implementation_uri: Uri, runtime: Arc<dyn WrapperRuntime>) -> Self {
        Self {
            implementation_uri,
            runtime,
        }
    }

    async fn call_extension(
        &self,
        uri: &Uri,
        invoker: Arc<dyn Invoker>,
        resolution_context: &ResolutionContext,
    ) -> Result<UriPackageOrWrapper> {
        let args = serde_json::to_vec(&TryResolveUriArgs {
            authority: uri.authority(),
            path: uri.path(),
        })
        .map_err(Error::encode)?;
        let env = invoker.get_env_by_uri(&self.implementation_uri);

        let bytes = invoker
            .invoke_raw(
                &self.implementation_uri,
                TRY_RESOLVE_URI_METHOD,
                Some(&args),
                env.as_deref(),
                Some(resolution_context.create_sub_context()),
            )
            .await?;
        let response: Option<MaybeUriOrManifest> =
            serde_json::from_slice(&bytes).map_err(Error::decode)?;
        let response = response.unwrap_or_default();

        if let Some(redirect) = response.uri {
            return Ok(UriPackageOrWrapper::Uri(Uri::parse(&redirect)?));
        }
        if let Some(manifest) = response.manifest {
            let file_reader = UriResolverExtensionFileReader::new(
                self.implementation_uri.clone(),
                uri.clone(),
                invoker,
            );
            let package = FilePackage::new(
                manifest,
                Arc::new(file_reader),
                Arc::clone(&self.runtime),
            );
            return Ok(UriPackageOrWrapper::Package {
                uri: uri.clone(),
                package: Arc::new(package),
            });
        }
        Ok(UriPackageOrWrapper::Uri(uri.clone()))
    }

    fn extension_error(&self, uri: &Uri, err: Error) -> Error {
        match err.root() {
            Error::WrapperNotFound {
                uri: missing,
                history,
            } if *missing == self.implementation_uri => Error::ResolverExtensionNotFound {
                uri: uri.clone(),
                extension_uri: self.implementation_uri.clone(),
                history: history.clone(),
            },
            _ => Error::ResolverExtension {
                uri: uri.clone(),
                extension_uri: self.implementation_uri.clone(),
                source: Arc::new(err),
            },
        }
    }
}

impl fmt::Debug for UriResolverWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UriResolverWrapper")
            .field("implementation_uri", &self.implementation_uri)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl UriResolver for UriResolverWrapper {
    async fn try_resolve_uri(
        &self,
        uri: &Uri,
        invoker: Arc<dyn Invoker>,
        resolution_context: &ResolutionContext,
    ) -> Result<UriPackageOrWrapper> {
        let result = self
            .call_extension(uri, invoker, resolution_context)
            .await
            .map_err(|err| self.extension_error(uri, err));

        if let Err(err) = &result {
            tracing::warn!(
                uri = %uri,
                extension = %self.implementation_uri,
                category = err.category().as_str(),
                error = %err,
                "uri resolver extension failed"
            );
        }
        resolution_context.track_step(
            UriResolutionStep::new(uri.clone(), result.clone())
                .with_description(format!("ResolverExtension ({})", self.implementation_uri)),
        );
        result
    }
}
