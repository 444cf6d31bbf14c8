use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use wrap_core::Error;
use wrap_core::FileReader;
use wrap_core::Invoker;
use wrap_core::Result;
use wrap_core::Uri;

use super::GET_FILE_METHOD;
use super::GetFileArgs;

/// Reads the files of a package produced by an extension by calling `getFile`
/// on that extension, one file at a time and only when asked.
#[derive(Clone)]
pub struct UriResolverExtensionFileReader {
    resolver_extension_uri: Uri,
    wrapper_uri: Uri,
    invoker: Arc<dyn Invoker>,
}

impl UriResolverExtensionFileReader {
    pub fn new(resolver_extension_uri: Uri, wrapper_uri: Uri, invoker: Arc<dyn Invoker>) -> Self {
        Self {
            resolver_extension_uri,
            wrapper_uri,
            invoker,
        }
    }
}

impl fmt::Debug for UriResolverExtensionFileReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UriResolverExtensionFileReader")
            .field("resolver_extension_uri", &self.resolver_extension_uri)
            .field("wrapper_uri", &self.wrapper_uri)
            .finish_non_exhaustive()
    }
}

fn combine_paths(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if base.is_empty() {
        return path.to_string();
    }
    format!("{base}/{path}")
}

#[async_trait]
impl FileReader for UriResolverExtensionFileReader {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = combine_paths(self.wrapper_uri.path(), path);
        let args = serde_json::to_vec(&GetFileArgs { path: &full_path }).map_err(Error::encode)?;
        let env = self.invoker.get_env_by_uri(&self.resolver_extension_uri);

        tracing::trace!(
            extension = %self.resolver_extension_uri,
            path = %full_path,
            "reading file through resolver extension"
        );
        let bytes = self
            .invoker
            .invoke_raw(
                &self.resolver_extension_uri,
                GET_FILE_METHOD,
                Some(&args),
                env.as_deref(),
                None,
            )
            .await?;

        let contents: Option<Vec<u8>> = serde_json::from_slice(&bytes).map_err(Error::decode)?;
        contents.ok_or_else(|| Error::FileRead {
            path: full_path,
            message: format!("not found by {}", self.resolver_extension_uri),
        })
    }
}
