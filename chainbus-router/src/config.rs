use anyhow::{Context, Result};
use serde::Deserialize;

/// Version prefix identifying the legacy (1.x) ledger protocol.
pub const LEGACY_VERSION_PREFIX: &str = "1.";
/// Version prefix identifying the modern (2.x) ledger protocol.
pub const MODERN_VERSION_PREFIX: &str = "2.";

/// The top-level configuration for the router.
///
/// This struct aggregates all settings the router needs at initialization:
/// which ledger protocol to speak, where the nodes are, how the shared send
/// pool is sized, and how often block watchers poll the chain tip. It is
/// typically deserialized from a TOML file via [`load_config`].
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct RouterConfig {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub watcher: WatcherConfig,
}

/// Identifies the ledger network: protocol version and node addresses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LedgerConfig {
    /// Protocol version string, e.g. `"2.0"`. The prefix selects the backend
    /// world; exactly one is active for the process lifetime.
    pub version: String,
    /// Semicolon- or comma-delimited node address list, e.g.
    /// `"10.0.0.1:8546;10.0.0.2:8546"`.
    pub nodes: String,
}

impl LedgerConfig {
    /// Splits the configured node list into individual addresses.
    pub fn node_addresses(&self) -> Vec<String> {
        self.nodes
            .split(|c| c == ';' || c == ',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Sizing for the shared send pool.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PoolConfig {
    /// Baseline number of workers kept warm.
    pub core_size: usize,
    /// Upper bound on concurrently executing sends.
    pub max_size: usize,
    /// How long an idle worker above the core size is retained.
    pub keep_alive_secs: u64,
}

/// Pacing for the per-partition block watchers.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WatcherConfig {
    /// The interval in seconds at which each watcher polls its partition's
    /// chain height.
    pub poll_interval_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            version: "2.0".to_string(),
            nodes: "127.0.0.1:8546".to_string(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            core_size: 8,
            max_size: 64,
            keep_alive_secs: 60,
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 3,
        }
    }
}

/// Loads the router configuration from a TOML file, with `CHAINBUS__`-prefixed
/// environment variables overriding file values.
pub fn load_config(path: &str) -> Result<RouterConfig> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(config::Environment::with_prefix("CHAINBUS").separator("__"));

    let settings: RouterConfig = builder
        .build()
        .context(format!("Failed to build configuration from '{}'", path))?
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    Ok(settings)
}
