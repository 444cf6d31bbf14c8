//! In-process wrappers backed by Rust code.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use wrap_core::Error;
use wrap_core::GetManifestOptions;
use wrap_core::Invoker;
use wrap_core::Result;
use wrap_core::WrapManifest;
use wrap_core::WrapPackage;
use wrap_core::Wrapper;

/// Methods of a plugin. Arguments, env and results travel as JSON values.
#[async_trait]
pub trait PluginModule: Send + Sync + Debug {
    async fn invoke_method(
        &self,
        method: &str,
        args: Value,
        env: Value,
        invoker: Arc<dyn Invoker>,
    ) -> Result<Value>;
}

/// A [`PluginModule`] exposed as a [`Wrapper`].
#[derive(Debug, Clone)]
pub struct PluginWrapper {
    manifest: WrapManifest,
    module: Arc<dyn PluginModule>,
}

impl PluginWrapper {
    pub fn new(manifest: WrapManifest, module: Arc<dyn PluginModule>) -> Self {
        Self { manifest, module }
    }
}

fn decode_json(bytes: Option<&[u8]>) -> Result<Value> {
    match bytes {
        Some(bytes) if !bytes.is_empty() => serde_json::from_slice(bytes).map_err(Error::decode),
        _ => Ok(Value::Null),
    }
}

#[async_trait]
impl Wrapper for PluginWrapper {
    async fn invoke(
        &self,
        method: &str,
        args: Option<&[u8]>,
        env: Option<&[u8]>,
        invoker: Arc<dyn Invoker>,
    ) -> Result<Vec<u8>> {
        let args = decode_json(args)?;
        let env = decode_json(env)?;
        tracing::trace!(plugin = %self.manifest.name, method, "invoking plugin method");
        let result = self
            .module
            .invoke_method(method, args, env, invoker)
            .await?;
        serde_json::to_vec(&result).map_err(Error::encode)
    }

    async fn get_file(&self, path: &str) -> Result<Vec<u8>> {
        Err(Error::FileRead {
            path: path.to_string(),
            message: format!("plugin {} has no files", self.manifest.name),
        })
    }

    fn get_manifest(&self) -> Result<WrapManifest> {
        Ok(self.manifest.clone())
    }
}

/// A plugin that is instantiated on demand; every `create_wrapper` call yields
/// a new [`PluginWrapper`] sharing the same module.
#[derive(Debug, Clone)]
pub struct PluginPackage {
    manifest: WrapManifest,
    module: Arc<dyn PluginModule>,
}

impl PluginPackage {
    pub fn new(manifest: WrapManifest, module: Arc<dyn PluginModule>) -> Self {
        Self { manifest, module }
    }
}

#[async_trait]
impl WrapPackage for PluginPackage {
    async fn create_wrapper(&self) -> Result<Arc<dyn Wrapper>> {
        Ok(Arc::new(PluginWrapper::new(
            self.manifest.clone(),
            Arc::clone(&self.module),
        )))
    }

    async fn get_manifest(&self, options: Option<&GetManifestOptions>) -> Result<WrapManifest> {
        if !options.is_some_and(|o| o.no_validate) {
            self.manifest.validate()?;
        }
        Ok(self.manifest.clone())
    }
}
