//! Loadable-but-uninstantiated wrappers.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::file_reader::FileReader;
use crate::manifest::GetManifestOptions;
use crate::manifest::WrapManifest;
use crate::wrapper::Wrapper;

/// A package can be turned into a [`Wrapper`] on demand.
#[async_trait]
pub trait WrapPackage: Send + Sync + Debug {
    async fn create_wrapper(&self) -> Result<Arc<dyn Wrapper>>;

    async fn get_manifest(&self, options: Option<&GetManifestOptions>) -> Result<WrapManifest>;
}

/// Turns a manifest plus its backing files into a live wrapper.
///
/// This is the seam to the execution runtime (wasm host, plugin loader); the
/// engine never executes code itself.
#[async_trait]
pub trait WrapperRuntime: Send + Sync + Debug {
    async fn instantiate(
        &self,
        manifest: WrapManifest,
        file_reader: Arc<dyn FileReader>,
    ) -> Result<Arc<dyn Wrapper>>;
}

/// Package backed by raw manifest bytes and a [`FileReader`] for everything
/// else. Files are only read when the runtime asks for them.
#[derive(Debug, Clone)]
pub struct FilePackage {
    manifest: Vec<u8>,
    file_reader: Arc<dyn FileReader>,
    runtime: Arc<dyn WrapperRuntime>,
}

impl FilePackage {
    pub fn new(
        manifest: Vec<u8>,
        file_reader: Arc<dyn FileReader>,
        runtime: Arc<dyn WrapperRuntime>,
    ) -> Self {
        Self {
            manifest,
            file_reader,
            runtime,
        }
    }
}

#[async_trait]
impl WrapPackage for FilePackage {
    async fn create_wrapper(&self) -> Result<Arc<dyn Wrapper>> {
        let manifest = self.get_manifest(None).await?;
        tracing::debug!(name = %manifest.name, kind = ?manifest.kind, "instantiating file package");
        self.runtime
            .instantiate(manifest, Arc::clone(&self.file_reader))
            .await
    }

    async fn get_manifest(&self, options: Option<&GetManifestOptions>) -> Result<WrapManifest> {
        WrapManifest::from_bytes(&self.manifest, options)
    }
}
