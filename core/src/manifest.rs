//! Wrap manifest (`wrap.info`) model.

use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;
use crate::error::Result;

/// File name a package's manifest is stored under.
pub const WRAP_MANIFEST_FILE: &str = "wrap.info";

/// File name of a wasm package's module.
pub const WRAP_MODULE_FILE: &str = "wrap.wasm";

/// Manifest format versions this engine understands.
pub const SUPPORTED_MANIFEST_VERSIONS: &[&str] = &["0.1", "0.1.0"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WrapKind {
    Wasm,
    Plugin,
    Interface,
}

/// Declared interface of a wrapper.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WrapManifest {
    pub version: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: WrapKind,
    #[serde(default)]
    pub abi: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetManifestOptions {
    /// Skip version and name validation
    pub no_validate: bool,
}

impl WrapManifest {
    pub fn new(name: impl Into<String>, kind: WrapKind) -> Self {
        Self {
            version: SUPPORTED_MANIFEST_VERSIONS[0].to_string(),
            name: name.into(),
            kind,
            abi: serde_json::Value::Null,
        }
    }

    /// Decode manifest bytes, validating unless `options.no_validate` is set.
    pub fn from_bytes(bytes: &[u8], options: Option<&GetManifestOptions>) -> Result<Self> {
        let manifest: WrapManifest = serde_json::from_slice(bytes)
            .map_err(|e| Error::Manifest(format!("failed to decode manifest: {e}")))?;

        if !options.is_some_and(|o| o.no_validate) {
            manifest.validate()?;
        }
        Ok(manifest)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(Error::encode)
    }

    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_MANIFEST_VERSIONS.contains(&self.version.as_str()) {
            return Err(Error::Manifest(format!(
                "unsupported manifest version {}, expected one of {SUPPORTED_MANIFEST_VERSIONS:?}",
                self.version
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Manifest("manifest name is empty".to_string()));
        }
        Ok(())
    }
}
