//! Read access to the files backing a package.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Error;
use crate::error::Result;

/// Source of a package's files (`wrap.info`, `wrap.wasm`, ...).
#[async_trait]
pub trait FileReader: Send + Sync + Debug {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>>;
}

/// File reader over an in-memory bundle, optionally falling back to another
/// reader for files it does not hold.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFileReader {
    files: HashMap<String, Vec<u8>>,
    fallback: Option<Arc<dyn FileReader>>,
}

impl InMemoryFileReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn FileReader>) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

#[async_trait]
impl FileReader for InMemoryFileReader {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        if let Some(contents) = self.files.get(path) {
            return Ok(contents.clone());
        }
        match &self.fallback {
            Some(fallback) => fallback.read_file(path).await,
            None => Err(Error::FileRead {
                path: path.to_string(),
                message: "file not found".to_string(),
            }),
        }
    }
}
