use crate::error::Result;
use crate::resolution::UriPackageOrWrapper;
use crate::uri::Uri;

/// One diagnostic record in a resolution history tree.
#[derive(Debug, Clone)]
pub struct UriResolutionStep {
    pub source_uri: Uri,
    pub result: Result<UriPackageOrWrapper>,
    pub description: Option<String>,
    pub sub_history: Vec<UriResolutionStep>,
}

impl UriResolutionStep {
    pub fn new(source_uri: Uri, result: Result<UriPackageOrWrapper>) -> Self {
        Self {
            source_uri,
            result,
            description: None,
            sub_history: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_sub_history(mut self, sub_history: Vec<UriResolutionStep>) -> Self {
        self.sub_history = sub_history;
        self
    }

    /// A step whose result is the unchanged source uri.
    pub fn is_miss(&self) -> bool {
        matches!(&self.result, Ok(result) if result.is_miss_for(&self.source_uri))
    }
}
