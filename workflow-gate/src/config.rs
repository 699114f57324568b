//! Configuration management for workflow gate
//!
//! Settings are layered, lowest precedence first:
//! 1. Built-in defaults
//! 2. An optional `workflow-gate.yaml` file
//! 3. Action inputs passed through the environment (`INPUT_*`)
//! 4. Command-line flags
//!
//! The resulting [`GateConfig`] is built once at startup and passed by
//! reference to everything that needs it.

use crate::common::env_loader::{load_env_string, EnvLoader};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Public GitHub REST endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Number of recent runs fetched per query
pub const DEFAULT_PAGE_SIZE: u8 = 10;

/// Largest page the list endpoint accepts
pub const MAX_PAGE_SIZE: u8 = 100;

/// Per-request timeout for the GitHub client
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// File name searched for in the working directory
pub const CONFIG_FILE_NAME: &str = "workflow-gate.yaml";

/// Diagnostic verbosity. Has no effect on polling behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DebugLevel {
    /// Informational logs only
    #[default]
    Off,
    /// Log each query and matching decision
    On,
    /// Additionally log raw API responses
    Verbose,
}

impl DebugLevel {
    /// The level as written in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            DebugLevel::Off => "off",
            DebugLevel::On => "on",
            DebugLevel::Verbose => "verbose",
        }
    }
}

impl FromStr for DebugLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "false" => Ok(DebugLevel::Off),
            "on" | "true" => Ok(DebugLevel::On),
            "verbose" => Ok(DebugLevel::Verbose),
            other => Err(ConfigError::Invalid {
                name: "debug".to_string(),
                reason: format!("expected one of off, on, verbose; got '{other}'"),
            }),
        }
    }
}

impl TryFrom<String> for DebugLevel {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DebugLevel> for String {
    fn from(level: DebugLevel) -> Self {
        level.as_str().to_string()
    }
}

impl fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a newline-separated workflow list.
///
/// Entries are trimmed and kept in order. Duplicates are kept. Blank lines
/// are dropped since a YAML block scalar always ends with one.
pub fn parse_workflow_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// One layer of partially specified settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    /// Seconds between polling rounds
    pub wait_interval_seconds: Option<u64>,
    /// Total polling budget in seconds
    pub wait_max_seconds: Option<u64>,
    /// API credential
    pub repo_token: Option<String>,
    /// Workflows to wait for
    pub workflows: Option<Vec<String>>,
    /// Diagnostic verbosity
    pub debug: Option<DebugLevel>,
    /// Runs fetched per query
    pub page_size: Option<u8>,
    /// REST API base URL
    pub api_url: Option<String>,
    /// Per-request timeout in seconds
    pub request_timeout_seconds: Option<u64>,
}

impl ConfigOverrides {
    /// Read action inputs from `INPUT_*` variables and the API URL from
    /// `GITHUB_API_URL`
    pub fn from_env() -> Result<Self, ConfigError> {
        let inputs = EnvLoader::new("INPUT");

        Ok(Self {
            wait_interval_seconds: inputs.try_load_parsed("WAIT-INTERVAL-SECONDS")?,
            wait_max_seconds: inputs.try_load_parsed("WAIT-MAX-SECONDS")?,
            repo_token: inputs.load_string("REPO-TOKEN"),
            workflows: inputs
                .load_string("WORKFLOWS")
                .map(|raw| parse_workflow_list(&raw)),
            debug: inputs.try_load_parsed("DEBUG")?,
            page_size: inputs.try_load_parsed("PAGE-SIZE")?,
            api_url: load_env_string("GITHUB_API_URL"),
            request_timeout_seconds: inputs.try_load_parsed("REQUEST-TIMEOUT-SECONDS")?,
        })
    }

    /// Fill every unset field from `fallback`
    pub fn or(self, fallback: Self) -> Self {
        Self {
            wait_interval_seconds: self.wait_interval_seconds.or(fallback.wait_interval_seconds),
            wait_max_seconds: self.wait_max_seconds.or(fallback.wait_max_seconds),
            repo_token: self.repo_token.or(fallback.repo_token),
            workflows: self.workflows.or(fallback.workflows),
            debug: self.debug.or(fallback.debug),
            page_size: self.page_size.or(fallback.page_size),
            api_url: self.api_url.or(fallback.api_url),
            request_timeout_seconds: self
                .request_timeout_seconds
                .or(fallback.request_timeout_seconds),
        }
    }
}

/// Workflow list as written in YAML: a sequence or a block string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum YamlWorkflowList {
    Items(Vec<String>),
    Block(String),
}

impl YamlWorkflowList {
    fn into_vec(self) -> Vec<String> {
        match self {
            YamlWorkflowList::Items(items) => parse_workflow_list(&items.join("\n")),
            YamlWorkflowList::Block(block) => parse_workflow_list(&block),
        }
    }
}

/// Contents of `workflow-gate.yaml`.
///
/// There is no token field: credentials only come from the environment or
/// the command line.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct YamlConfig {
    wait_interval_seconds: Option<u64>,
    wait_max_seconds: Option<u64>,
    workflows: Option<YamlWorkflowList>,
    debug: Option<DebugLevel>,
    page_size: Option<u8>,
    api_url: Option<String>,
    request_timeout_seconds: Option<u64>,
}

impl YamlConfig {
    /// Load YAML configuration from a file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        tracing::debug!("Loading YAML configuration from: {:?}", path);

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::YamlParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Look for `workflow-gate.yaml` in `dir`
    pub fn find_config_file(dir: &Path) -> Option<PathBuf> {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!("Found configuration file: {:?}", candidate);
            Some(candidate)
        } else {
            None
        }
    }

    /// Load `explicit` if given, else the file in the working directory if
    /// one exists, else an empty layer.
    ///
    /// An explicitly named file that cannot be read is an error; a missing
    /// default file is not.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        let cwd = std::env::current_dir().map_err(|e| ConfigError::FileRead {
            path: PathBuf::from("."),
            source: e,
        })?;
        match Self::find_config_file(&cwd) {
            Some(path) => Self::load_from_file(path),
            None => {
                tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                Ok(Self::default())
            }
        }
    }

    /// Convert into an override layer
    pub fn into_overrides(self) -> ConfigOverrides {
        ConfigOverrides {
            wait_interval_seconds: self.wait_interval_seconds,
            wait_max_seconds: self.wait_max_seconds,
            repo_token: None,
            workflows: self.workflows.map(YamlWorkflowList::into_vec),
            debug: self.debug,
            page_size: self.page_size,
            api_url: self.api_url,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }
}

/// Fully resolved settings for one invocation
#[derive(Clone, PartialEq)]
pub struct GateConfig {
    /// Seconds slept between polling rounds
    pub wait_interval_seconds: u64,
    /// Budget; exceeding it after a round's sleep fails the gate
    pub wait_max_seconds: u64,
    /// API credential
    pub repo_token: String,
    /// Workflows to wait for, in order
    pub workflows: Vec<String>,
    /// Diagnostic verbosity
    pub debug: DebugLevel,
    /// Runs fetched per query
    pub page_size: u8,
    /// REST API base URL
    pub api_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,
}

impl fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateConfig")
            .field("wait_interval_seconds", &self.wait_interval_seconds)
            .field("wait_max_seconds", &self.wait_max_seconds)
            .field("repo_token", &"***")
            .field("workflows", &self.workflows)
            .field("debug", &self.debug)
            .field("page_size", &self.page_size)
            .field("api_url", &self.api_url)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

impl GateConfig {
    /// Resolve configuration from command-line overrides, the environment
    /// and the YAML file
    pub fn load(cli: ConfigOverrides, config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let env = ConfigOverrides::from_env()?;
        let file = YamlConfig::load_or_default(config_file)?.into_overrides();
        Self::from_overrides(cli.or(env).or(file))
    }

    /// Apply defaults to a merged override layer and validate the result
    pub fn from_overrides(layer: ConfigOverrides) -> Result<Self, ConfigError> {
        let config = Self {
            wait_interval_seconds: required(layer.wait_interval_seconds, "wait-interval-seconds")?,
            wait_max_seconds: required(layer.wait_max_seconds, "wait-max-seconds")?,
            repo_token: required(layer.repo_token, "repo-token")?,
            workflows: required(layer.workflows, "workflows")?,
            debug: layer.debug.unwrap_or_default(),
            page_size: layer.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            api_url: layer.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            request_timeout_seconds: layer
                .request_timeout_seconds
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the current configuration settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wait_interval_seconds == 0 {
            return Err(invalid("wait-interval-seconds", "must be at least 1"));
        }
        if self.wait_max_seconds == 0 {
            return Err(invalid("wait-max-seconds", "must be at least 1"));
        }
        if self.repo_token.trim().is_empty() {
            return Err(ConfigError::Missing {
                name: "repo-token".to_string(),
            });
        }
        if self.workflows.is_empty() {
            return Err(invalid("workflows", "at least one workflow is required"));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(invalid(
                "page-size",
                &format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        if self.request_timeout_seconds == 0 {
            return Err(invalid("request-timeout-seconds", "must be at least 1"));
        }
        Ok(())
    }

    /// Sleep between polling rounds
    pub fn wait_interval(&self) -> Duration {
        Duration::from_secs(self.wait_interval_seconds)
    }

    /// Timeout applied to each API request
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

fn required<T>(value: Option<T>, name: &str) -> Result<T, ConfigError> {
    value.ok_or_else(|| ConfigError::Missing {
        name: name.to_string(),
    })
}

fn invalid(name: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
