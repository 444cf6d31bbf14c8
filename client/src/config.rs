//! Client configuration loading
//!
//! Loads configuration from `~/.config/wrap/client.toml` (or `WRAP_CLIENT_CONFIG` env).
//!
//! ```toml
//! [resolution]
//! cache = "wrapper"          # "result" (default), "wrapper" or "none"
//! cache_errors = false
//! max_depth = 64
//! extension_interfaces = ["wrap://ens/wraps.eth:uri-resolver-ext@1.1.0"]
//!
//! [invocation]
//! timeout_ms = 30000         # 0 disables the timeout
//!
//! [redirects]
//! "ens/old.eth" = "ens/new.eth"
//!
//! [interfaces]
//! "wrap://ens/wraps.eth:uri-resolver-ext@1.1.0" = ["ens/fs-resolver.eth"]
//!
//! [envs."ens/new.eth"]
//! api_key = "..."
//! ```

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use wrap_core::Error;
use wrap_core::InterfaceImplementations;
use wrap_core::Result;
use wrap_core::Uri;
use wrap_resolvers::DEFAULT_MAX_DEPTH;
use wrap_resolvers::extensions::DEFAULT_EXTENSION_INTERFACES;

/// Which caching resolver sits between the recursive driver and the
/// aggregator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Memoize resolution results per exact uri
    #[default]
    Result,
    /// Instantiate packages once and cache wrappers along alias chains
    Wrapper,
    /// No caching
    None,
}

/// Root configuration for the wrap client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientConfig {
    /// Resolver stack settings
    #[serde(default)]
    pub resolution: ResolutionConfig,

    /// Invocation settings
    #[serde(default)]
    pub invocation: InvocationConfig,

    /// Static redirects, `from = "to"`
    #[serde(default)]
    pub redirects: BTreeMap<String, String>,

    /// Interface implementations, `interface = ["implementation", ...]`
    #[serde(default)]
    pub interfaces: BTreeMap<String, Vec<String>>,

    /// Per-wrapper environments, passed to invocations as JSON
    #[serde(default)]
    pub envs: BTreeMap<String, toml::Table>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolutionConfig {
    #[serde(default)]
    pub cache: CacheMode,

    /// Replay failures from the result cache instead of retrying them
    #[serde(default)]
    pub cache_errors: bool,

    /// Recursion fuse for redirect chains
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Uri resolver extension interfaces, most specific first
    #[serde(default = "default_extension_interfaces")]
    pub extension_interfaces: Vec<String>,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            cache: CacheMode::default(),
            cache_errors: false,
            max_depth: default_max_depth(),
            extension_interfaces: default_extension_interfaces(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvocationConfig {
    /// Per-invocation timeout in milliseconds; 0 disables it
    #[serde(default)]
    pub timeout_ms: u64,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_extension_interfaces() -> Vec<String> {
    DEFAULT_EXTENSION_INTERFACES
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn parse_uri(raw: &str, key: &str) -> Result<Uri> {
    Uri::parse(raw).map_err(|e| Error::Config(format!("invalid uri in {key}: {e}")))
}

impl ClientConfig {
    /// Environment variable for config path override
    pub const ENV_CONFIG_PATH: &'static str = "WRAP_CLIENT_CONFIG";

    /// Default config filename
    pub const DEFAULT_CONFIG_FILENAME: &'static str = "client.toml";

    /// Load configuration from file
    ///
    /// Resolution order:
    /// 1. `WRAP_CLIENT_CONFIG` environment variable
    /// 2. `~/.config/wrap/client.toml`
    ///
    /// If the config file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let path = Self::resolve_config_path();

        if !path.exists() {
            tracing::info!(
                path = %path.display(),
                "wrap client config not found, using defaults"
            );
            return Ok(Self::default());
        }

        Self::load_from_path(&path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read config at {}: {e}", path.display()))
        })?;

        Self::parse(&contents)
    }

    /// Parse configuration from TOML string
    pub fn parse(contents: &str) -> Result<Self> {
        let cfg: ClientConfig = toml::from_str(contents)
            .map_err(|e| Error::Config(format!("failed to parse config: {e}")))?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Resolve the configuration file path
    fn resolve_config_path() -> PathBuf {
        if let Ok(path) = std::env::var(Self::ENV_CONFIG_PATH) {
            return PathBuf::from(path);
        }

        dirs::home_dir()
            .map(|h| {
                h.join(".config")
                    .join("wrap")
                    .join(Self::DEFAULT_CONFIG_FILENAME)
            })
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_CONFIG_FILENAME))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.resolution.max_depth == 0 {
            return Err(Error::Config(
                "resolution.max_depth must be at least 1".to_string(),
            ));
        }

        // Surface malformed uris at load time rather than on first use
        self.redirects()?;
        self.interface_implementations()?;
        self.extension_interfaces()?;
        self.envs()?;

        if self.resolution.cache_errors && self.resolution.cache != CacheMode::Result {
            tracing::warn!(
                cache = ?self.resolution.cache,
                "resolution.cache_errors only applies to the result cache and will be ignored"
            );
        }

        if self.resolution.extension_interfaces.is_empty() && !self.interfaces.is_empty() {
            tracing::warn!(
                "no extension interfaces configured; uri resolver extensions will never be consulted"
            );
        }

        Ok(())
    }

    /// Parsed `[redirects]`, in key order.
    pub fn redirects(&self) -> Result<Vec<(Uri, Uri)>> {
        self.redirects
            .iter()
            .map(|(from, to)| Ok((parse_uri(from, "redirects")?, parse_uri(to, "redirects")?)))
            .collect()
    }

    /// Parsed `[interfaces]`.
    pub fn interface_implementations(&self) -> Result<InterfaceImplementations> {
        self.interfaces
            .iter()
            .map(|(interface, implementations)| {
                let implementations = implementations
                    .iter()
                    .map(|raw| parse_uri(raw, "interfaces"))
                    .collect::<Result<Vec<_>>>()?;
                Ok((parse_uri(interface, "interfaces")?, implementations))
            })
            .collect()
    }

    /// Parsed `resolution.extension_interfaces`.
    pub fn extension_interfaces(&self) -> Result<Vec<Uri>> {
        self.resolution
            .extension_interfaces
            .iter()
            .map(|raw| parse_uri(raw, "resolution.extension_interfaces"))
            .collect()
    }

    /// `[envs]` tables encoded as JSON, keyed by wrapper uri.
    pub fn envs(&self) -> Result<HashMap<Uri, Vec<u8>>> {
        self.envs
            .iter()
            .map(|(raw, table)| {
                let env = serde_json::to_vec(table).map_err(Error::encode)?;
                Ok((parse_uri(raw, "envs")?, env))
            })
            .collect()
    }

    /// Invocation timeout, if enabled.
    pub fn timeout(&self) -> Option<Duration> {
        match self.invocation.timeout_ms {
            0 => None,
            timeout_ms => Some(Duration::from_millis(timeout_ms)),
        }
    }
}
