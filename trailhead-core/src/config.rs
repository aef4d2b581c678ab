//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/trailhead/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/trailhead/` (~/.config/trailhead/)
//! - State/Logs: `$XDG_STATE_HOME/trailhead/` (~/.local/state/trailhead/)

use crate::error::{Error, Result};
use crate::types::AgentKind;
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Per-namespace root overrides
    #[serde(default)]
    pub overrides: Overrides,

    /// Declared remote endpoints (`user@host`)
    #[serde(default)]
    pub remotes: Vec<String>,

    /// Probe behavior knobs
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The namespaces an override can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideNamespace {
    Local,
    CompatLayer,
    Windows,
}

impl OverrideNamespace {
    fn as_str(&self) -> &'static str {
        match self {
            OverrideNamespace::Local => "local",
            OverrideNamespace::CompatLayer => "wsl",
            OverrideNamespace::Windows => "windows",
        }
    }
}

/// Per-namespace, per-agent store root overrides.
///
/// When an override is present, probing is bypassed for that pair and the
/// path is trusted as-is (still existence-checked where the namespace is
/// locally accessible). Environment variables of the form
/// `TRAILHEAD_<NAMESPACE>_<AGENT>_ROOT` take precedence over the file.
#[derive(Debug, Deserialize, Default)]
pub struct Overrides {
    #[serde(default)]
    pub local: AgentRoots,
    #[serde(default)]
    pub wsl: AgentRoots,
    #[serde(default)]
    pub windows: AgentRoots,
}

/// One optional root path per agent kind.
#[derive(Debug, Deserialize, Default)]
pub struct AgentRoots {
    pub claude: Option<PathBuf>,
    pub codex: Option<PathBuf>,
    pub gemini: Option<PathBuf>,
}

impl AgentRoots {
    fn get(&self, agent: AgentKind) -> Option<&PathBuf> {
        match agent {
            AgentKind::Claude => self.claude.as_ref(),
            AgentKind::Codex => self.codex.as_ref(),
            AgentKind::Gemini => self.gemini.as_ref(),
        }
    }
}

impl Overrides {
    /// The effective override for a namespace/agent pair, env var first.
    pub fn root_for(&self, namespace: OverrideNamespace, agent: AgentKind) -> Option<PathBuf> {
        let var = format!(
            "TRAILHEAD_{}_{}_ROOT",
            namespace.as_str().to_ascii_uppercase(),
            agent.as_str().to_ascii_uppercase()
        );
        if let Some(path) = std::env::var_os(&var).filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(path));
        }

        let roots = match namespace {
            OverrideNamespace::Local => &self.local,
            OverrideNamespace::CompatLayer => &self.wsl,
            OverrideNamespace::Windows => &self.windows,
        };
        roots.get(agent).cloned()
    }
}

/// Probe behavior configuration
#[derive(Debug, Deserialize)]
pub struct ProbeConfig {
    /// Probe compatibility-layer distributions (disable for
    /// latency-sensitive invocations)
    #[serde(default = "default_true")]
    pub enable_compat_layer: bool,

    /// Probe declared remote endpoints
    #[serde(default = "default_true")]
    pub enable_remote: bool,

    /// Per-remote probe timeout in seconds
    #[serde(default = "default_remote_timeout")]
    pub remote_timeout_secs: u64,

    /// Upper bound on concurrent probe workers
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            enable_compat_layer: true,
            enable_remote: true,
            remote_timeout_secs: default_remote_timeout(),
            max_workers: default_max_workers(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_remote_timeout() -> u64 {
    10
}

fn default_max_workers() -> usize {
    4
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/trailhead/config.toml` (~/.config/trailhead/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("trailhead").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/trailhead/` (~/.local/state/trailhead/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("trailhead")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/trailhead/trailhead.log`
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("trailhead.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path
    /// behavior before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.remotes.is_empty());
        assert!(config.probe.enable_compat_layer);
        assert!(config.probe.enable_remote);
        assert_eq!(config.probe.remote_timeout_secs, 10);
        assert_eq!(config.probe.max_workers, 4);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
remotes = ["dev@build1", "dev@build2"]

[overrides.local]
claude = "/srv/exports/claude-projects"

[overrides.wsl]
codex = "/home/dev/.codex/sessions"

[probe]
enable_remote = false
remote_timeout_secs = 3

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.remotes, vec!["dev@build1", "dev@build2"]);
        assert_eq!(
            config.overrides.local.claude.as_deref(),
            Some(std::path::Path::new("/srv/exports/claude-projects"))
        );
        assert_eq!(
            config.overrides.wsl.codex.as_deref(),
            Some(std::path::Path::new("/home/dev/.codex/sessions"))
        );
        assert!(!config.probe.enable_remote);
        assert_eq!(config.probe.remote_timeout_secs, 3);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_override_lookup() {
        let toml = r#"
[overrides.local]
gemini = "/data/gemini-tmp"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config
                .overrides
                .root_for(OverrideNamespace::Local, AgentKind::Gemini),
            Some(PathBuf::from("/data/gemini-tmp"))
        );
        assert_eq!(
            config
                .overrides
                .root_for(OverrideNamespace::Local, AgentKind::Claude),
            None
        );
    }

    #[test]
    fn test_override_env_var_wins() {
        let toml = r#"
[overrides.windows]
codex = "/mnt/c/Users/dev/.codex/sessions"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        std::env::set_var("TRAILHEAD_WINDOWS_CODEX_ROOT", "/mnt/d/codex-sessions");
        let resolved = config
            .overrides
            .root_for(OverrideNamespace::Windows, AgentKind::Codex);
        std::env::remove_var("TRAILHEAD_WINDOWS_CODEX_ROOT");

        assert_eq!(resolved, Some(PathBuf::from("/mnt/d/codex-sessions")));
    }
}
