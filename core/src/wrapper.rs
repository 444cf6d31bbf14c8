//! Instantiated, invocable units of packaged code.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Error;
use crate::error::Result;
use crate::invoker::Invoker;
use crate::manifest::WrapManifest;

/// An instantiated wrapper.
///
/// How the wrapper executes (wasm, in-process plugin, ...) is up to the
/// implementation; the resolution engine only hands wrappers around.
#[async_trait]
pub trait Wrapper: Send + Sync + Debug {
    /// Invoke `method` with encoded `args`. `invoker` lets the wrapper call
    /// back into other wrappers.
    async fn invoke(
        &self,
        method: &str,
        args: Option<&[u8]>,
        env: Option<&[u8]>,
        invoker: Arc<dyn Invoker>,
    ) -> Result<Vec<u8>>;

    async fn get_file(&self, path: &str) -> Result<Vec<u8>>;

    fn get_manifest(&self) -> Result<WrapManifest>;

    /// Read a file and decode it as UTF-8.
    async fn get_file_as_string(&self, path: &str) -> Result<String> {
        let bytes = self.get_file(path).await?;
        String::from_utf8(bytes).map_err(|e| Error::FileRead {
            path: path.to_string(),
            message: format!("not valid utf-8: {e}"),
        })
    }
}
