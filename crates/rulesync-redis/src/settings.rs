//! Redis rule source settings
//!
//! Loaded from a configuration file plus `RULESYNC_`-prefixed environment
//! variables, e.g. `RULESYNC_HOST`, `RULESYNC_CHAIN_DATABASE` or
//! `RULESYNC_SENTINEL_ADDRESS=10.0.0.1:26379,10.0.0.2:26379`.
//!
//! ```yaml
//! redis_mode: sentinel
//! master_name: mymaster
//! sentinel_address:
//!   - 10.0.0.1:26379
//!   - 10.0.0.2:26379
//! password: secret
//! chain_database: 1
//! chain_key: flow:chain
//! script_database: 1
//! script_key: flow:script
//! mode: subscribe
//! ```

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use rulesync_common::{
    DEFAULT_DATABASE, DEFAULT_POLLING_SECONDS, DEFAULT_REDIS_PORT, ENV_PREFIX, Result,
    RuleSyncError, is_blank, is_not_blank,
};

use crate::topology::{self, ConnectionParameters, TopologyConfig, TopologyKind};

/// How the external listener picks up changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Periodically compare stored values
    #[default]
    Poll,
    /// React to keyspace notifications
    Subscribe,
}

/// Settings for a Redis-backed rule source
#[derive(Clone, Deserialize)]
pub struct RedisRuleSettings {
    #[serde(default)]
    pub redis_mode: TopologyKind,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub master_name: Option<String>,
    #[serde(default)]
    pub sentinel_address: Vec<String>,
    #[serde(default = "default_database")]
    pub chain_database: u32,
    #[serde(default)]
    pub chain_key: Option<String>,
    #[serde(default)]
    pub script_database: Option<u32>,
    #[serde(default)]
    pub script_key: Option<String>,
    #[serde(default)]
    pub mode: SyncMode,
    /// Seconds between polls
    #[serde(default = "default_polling")]
    pub polling_interval: u64,
    /// Seconds before the first poll
    #[serde(default = "default_polling")]
    pub polling_start_time: u64,
}

fn default_port() -> u16 {
    DEFAULT_REDIS_PORT
}

fn default_database() -> u32 {
    DEFAULT_DATABASE
}

fn default_polling() -> u64 {
    DEFAULT_POLLING_SECONDS
}

impl std::fmt::Debug for RedisRuleSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRuleSettings")
            .field("redis_mode", &self.redis_mode)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "******"))
            .field("master_name", &self.master_name)
            .field("sentinel_address", &self.sentinel_address)
            .field("chain_database", &self.chain_database)
            .field("chain_key", &self.chain_key)
            .field("script_database", &self.script_database)
            .field("script_key", &self.script_key)
            .field("mode", &self.mode)
            .field("polling_interval", &self.polling_interval)
            .field("polling_start_time", &self.polling_start_time)
            .finish()
    }
}

impl RedisRuleSettings {
    /// Load from `path` (format taken from the extension) with `RULESYNC_`
    /// environment overrides, then validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_env_prefix(path, ENV_PREFIX)
    }

    /// Load from `path` with overrides read from `{prefix}_*` variables.
    ///
    /// Environment values stay strings until deserialization, so numeric
    /// looking passwords or names such as `007` are kept verbatim.
    pub fn load_with_env_prefix(path: impl AsRef<Path>, prefix: &str) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), prefix, "Loading redis rule settings");
        let builder = Config::builder()
            .add_source(File::from(path))
            .add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("sentinel_address"),
            );
        Self::build(builder)
    }

    /// Parse settings from an in-memory document, without environment overrides
    pub fn parse_str(content: &str, format: FileFormat) -> Result<Self> {
        Self::build(Config::builder().add_source(File::from_str(content, format)))
    }

    fn build(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let settings: Self = builder
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .map_err(|e| RuleSyncError::ConfigError(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the fields the topology builders and the listener rely on
    pub fn validate(&self) -> Result<()> {
        match self.redis_mode {
            TopologyKind::Single => {
                if is_blank(&self.host) {
                    return Err(RuleSyncError::MissingField("host"));
                }
                if self.port == 0 {
                    return Err(RuleSyncError::MissingField("port"));
                }
            }
            TopologyKind::Sentinel => {
                if !is_not_blank(self.master_name.as_deref()) {
                    return Err(RuleSyncError::MissingField("master_name"));
                }
                if self.sentinel_address.iter().all(|a| is_blank(a)) {
                    return Err(RuleSyncError::MissingField("sentinel_address"));
                }
            }
        }

        if !is_not_blank(self.chain_key.as_deref()) {
            return Err(RuleSyncError::MissingField("chain_key"));
        }
        if self.mode == SyncMode::Poll && self.polling_interval == 0 {
            return Err(RuleSyncError::ConfigError(
                "polling_interval must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether script nodes are stored alongside the chains
    pub fn has_script_data(&self) -> bool {
        is_not_blank(self.script_key.as_deref())
    }

    pub fn connection_parameters(&self) -> ConnectionParameters {
        ConnectionParameters {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            master_name: self.master_name.clone(),
            sentinel_addresses: self
                .sentinel_address
                .iter()
                .filter(|a| !is_blank(a))
                .map(|a| a.trim().to_string())
                .collect(),
        }
    }

    /// Topology for the database holding chain definitions
    pub fn chain_topology(&self) -> TopologyConfig {
        topology::build(
            self.redis_mode,
            &self.connection_parameters(),
            self.chain_database,
        )
    }

    /// Topology for the database holding scripts, if scripts are configured.
    ///
    /// Scripts share the chain database unless `script_database` is set.
    pub fn script_topology(&self) -> Option<TopologyConfig> {
        if !self.has_script_data() {
            return None;
        }
        let database = self.script_database.unwrap_or(self.chain_database);
        Some(topology::build(
            self.redis_mode,
            &self.connection_parameters(),
            database,
        ))
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.polling_interval)
    }

    pub fn polling_start_delay(&self) -> Duration {
        Duration::from_secs(self.polling_start_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE_YAML: &str = r#"
host: 127.0.0.1
port: 6380
password: secret
chain_database: 1
chain_key: flow:chain
"#;

    const SENTINEL_YAML: &str = r#"
redis_mode: sentinel
master_name: mymaster
sentinel_address:
  - 10.0.0.2:26379
  - 10.0.0.1:26379
username: admin
password: secret
chain_database: 1
chain_key: flow:chain
script_database: 2
script_key: flow:script
mode: subscribe
"#;

    #[test]
    fn test_single_defaults() {
        let settings = RedisRuleSettings::parse_str(SINGLE_YAML, FileFormat::Yaml).unwrap();
        assert_eq!(settings.redis_mode, TopologyKind::Single);
        assert_eq!(settings.mode, SyncMode::Poll);
        assert_eq!(settings.polling_interval(), Duration::from_secs(60));
        assert_eq!(settings.polling_start_delay(), Duration::from_secs(60));
        assert!(!settings.has_script_data());
        assert!(settings.script_topology().is_none());

        let chain = settings.chain_topology();
        assert_eq!(chain.addresses(), ["redis://127.0.0.1:6380"]);
        assert_eq!(chain.database(), 1);
        assert_eq!(chain.username(), None);
        assert_eq!(chain.password(), Some("secret"));
    }

    #[test]
    fn test_sentinel_topologies() {
        let settings = RedisRuleSettings::parse_str(SENTINEL_YAML, FileFormat::Yaml).unwrap();
        assert_eq!(settings.mode, SyncMode::Subscribe);

        let chain = settings.chain_topology();
        assert_eq!(chain.kind(), TopologyKind::Sentinel);
        assert_eq!(chain.master_name(), Some("mymaster"));
        assert_eq!(
            chain.addresses(),
            ["redis://10.0.0.2:26379", "redis://10.0.0.1:26379"]
        );
        assert_eq!(chain.database(), 1);
        assert_eq!(chain.username(), Some("admin"));

        let script = settings.script_topology().unwrap();
        assert_eq!(script.database(), 2);
        assert_eq!(script.addresses(), chain.addresses());
    }

    #[test]
    fn test_missing_fields() {
        let err = RedisRuleSettings::parse_str("chain_key: c", FileFormat::Yaml).unwrap_err();
        assert_eq!(err, RuleSyncError::MissingField("host"));

        let err = RedisRuleSettings::parse_str("host: h", FileFormat::Yaml).unwrap_err();
        assert_eq!(err, RuleSyncError::MissingField("chain_key"));

        let err = RedisRuleSettings::parse_str(
            "redis_mode: sentinel\nmaster_name: m\nchain_key: c",
            FileFormat::Yaml,
        )
        .unwrap_err();
        assert_eq!(err, RuleSyncError::MissingField("sentinel_address"));

        let err = RedisRuleSettings::parse_str(
            "redis_mode: sentinel\nsentinel_address: [\"s:1\"]\nchain_key: c",
            FileFormat::Yaml,
        )
        .unwrap_err();
        assert_eq!(err, RuleSyncError::MissingField("master_name"));

    }

    #[test]
    fn test_script_database_defaults_to_chain_database() {
        let settings = RedisRuleSettings::parse_str(
            "host: h\nchain_key: c\nchain_database: 4\nscript_key: s",
            FileFormat::Yaml,
        )
        .unwrap();
        assert!(settings.has_script_data());
        assert_eq!(settings.script_topology().unwrap().database(), 4);

        let mut settings = settings;
        settings.script_database = Some(6);
        assert_eq!(settings.script_topology().unwrap().database(), 6);
        assert_eq!(settings.chain_topology().database(), 4);
    }

    #[test]
    fn test_invalid_values() {
        let err = RedisRuleSettings::parse_str(
            "host: h\nchain_key: c\npolling_interval: 0",
            FileFormat::Yaml,
        )
        .unwrap_err();
        assert!(matches!(err, RuleSyncError::ConfigError(_)));

        let err = RedisRuleSettings::parse_str(
            "redis_mode: cluster\nhost: h\nchain_key: c",
            FileFormat::Yaml,
        )
        .unwrap_err();
        assert!(matches!(err, RuleSyncError::ConfigError(_)));
    }

    #[test]
    fn test_debug_masks_password() {
        let settings = RedisRuleSettings::parse_str(SENTINEL_YAML, FileFormat::Yaml).unwrap();
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("mymaster"));
    }

    #[test]
    fn test_load_from_file() {
        let file = write_settings(SINGLE_YAML);
        let settings = RedisRuleSettings::load(file.path()).unwrap();
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.port, 6380);
        assert_eq!(settings.chain_key.as_deref(), Some("flow:chain"));
    }

    fn write_settings(content: &str) -> tempfile::NamedTempFile {
        use std::io::Write;

        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_env_keeps_numeric_looking_strings() {
        let file = write_settings("host: h\nchain_key: c\n");
        unsafe {
            std::env::set_var("RSTEST_VERBATIM_PASSWORD", "007");
            std::env::set_var("RSTEST_VERBATIM_USERNAME", "0123");
            std::env::set_var("RSTEST_VERBATIM_MASTER_NAME", "1e3");
            std::env::set_var("RSTEST_VERBATIM_PORT", "6381");
        }

        let settings =
            RedisRuleSettings::load_with_env_prefix(file.path(), "RSTEST_VERBATIM").unwrap();
        assert_eq!(settings.password.as_deref(), Some("007"));
        assert_eq!(settings.username.as_deref(), Some("0123"));
        assert_eq!(settings.master_name.as_deref(), Some("1e3"));
        assert_eq!(settings.port, 6381);

        let chain = settings.chain_topology();
        assert_eq!(chain.addresses(), ["redis://h:6381"]);
        assert_eq!(chain.username(), Some("0123"));
        assert_eq!(chain.password(), Some("007"));
    }

    #[test]
    fn test_env_overrides_sentinel_settings() {
        let file = write_settings("host: h\nchain_key: c\nchain_database: 1\n");
        unsafe {
            std::env::set_var("RSTEST_SENTINEL_REDIS_MODE", "sentinel");
            std::env::set_var("RSTEST_SENTINEL_MASTER_NAME", "mymaster");
            std::env::set_var("RSTEST_SENTINEL_SENTINEL_ADDRESS", "b:2,a:1");
            std::env::set_var("RSTEST_SENTINEL_CHAIN_DATABASE", "3");
        }

        let settings =
            RedisRuleSettings::load_with_env_prefix(file.path(), "RSTEST_SENTINEL").unwrap();
        assert_eq!(settings.redis_mode, TopologyKind::Sentinel);
        assert_eq!(settings.sentinel_address, ["b:2", "a:1"]);

        let chain = settings.chain_topology();
        assert_eq!(chain.kind(), TopologyKind::Sentinel);
        assert_eq!(chain.master_name(), Some("mymaster"));
        assert_eq!(chain.addresses(), ["redis://b:2", "redis://a:1"]);
        assert_eq!(chain.database(), 3);
    }
}
