//! Configuration loading and resolution
//!
//! All tunable constants of the funnel (checkout destinations, reveal
//! delay, admin TTL, video polling bounds, development hosts) live here
//! with compiled defaults. Resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. `FUNNEL_CONFIG` environment variable
//! 3. Platform config file (`<config dir>/funnel/config.toml`)
//! 4. Compiled defaults (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "FUNNEL_CONFIG";

/// Purchase package offered by the funnel, one fixed checkout URL each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Package {
    OneBottle,
    ThreeBottle,
    SixBottle,
}

impl Package {
    /// Tag appended to outbound links identifying the selected package
    pub fn tag(&self) -> &'static str {
        match self {
            Package::OneBottle => "1-bottle",
            Package::ThreeBottle => "3-bottle",
            Package::SixBottle => "6-bottle",
        }
    }
}

impl std::str::FromStr for Package {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1-bottle" | "one-bottle" => Ok(Package::OneBottle),
            "3-bottle" | "three-bottle" => Ok(Package::ThreeBottle),
            "6-bottle" | "six-bottle" => Ok(Package::SixBottle),
            other => Err(Error::InvalidInput(format!("Unknown package '{}'", other))),
        }
    }
}

/// Fixed external checkout destinations, one per package
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    pub one_bottle_url: String,
    pub three_bottle_url: String,
    pub six_bottle_url: String,
}

impl CheckoutConfig {
    pub fn url_for(&self, package: Package) -> &str {
        match package {
            Package::OneBottle => &self.one_bottle_url,
            Package::ThreeBottle => &self.three_bottle_url,
            Package::SixBottle => &self.six_bottle_url,
        }
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            one_bottle_url: "https://checkout.example.com/order/1-bottle".to_string(),
            three_bottle_url: "https://checkout.example.com/order/3-bottle".to_string(),
            six_bottle_url: "https://checkout.example.com/order/6-bottle".to_string(),
        }
    }
}

/// Content reveal gate tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Wall-clock delay from page mount to the timer trigger, seconds
    pub delay_secs: u64,
    /// Candidate selectors for the purchase element, tried in order
    pub scroll_selectors: Vec<String>,
    /// Highlight effect duration after scrolling, milliseconds
    pub highlight_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            delay_secs: 1500,
            scroll_selectors: vec![
                "#buy-box".to_string(),
                ".purchase-cta".to_string(),
                "#packages".to_string(),
            ],
            highlight_ms: 2000,
        }
    }
}

/// Administrative session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Hours an admin login stays valid
    pub session_ttl_hours: i64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: 24,
        }
    }
}

/// Video player readiness polling bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Fixed polling interval, milliseconds
    pub poll_interval_ms: u64,
    /// Maximum poll attempts before terminal failure
    pub max_poll_attempts: u32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            max_poll_attempts: 20,
        }
    }
}

/// Execution environment detection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Page hosts treated as non-production (reveal gate bypass)
    pub dev_hosts: Vec<String>,
}

impl EnvironmentConfig {
    /// Whether `host` is a recognized development host
    pub fn is_dev_host(&self, host: &str) -> bool {
        self.dev_hosts.iter().any(|h| h == host)
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            dev_hosts: vec![
                "localhost".to_string(),
                "127.0.0.1".to_string(),
                "0.0.0.0".to_string(),
            ],
        }
    }
}

/// Top-level funnel configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FunnelConfig {
    pub checkout: CheckoutConfig,
    pub reveal: RevealConfig,
    pub admin: AdminConfig,
    pub video: VideoConfig,
    pub environment: EnvironmentConfig,
}

impl FunnelConfig {
    /// Resolve configuration following the priority order above.
    ///
    /// A path given explicitly (CLI or environment variable) that fails to
    /// load is a hard error; a missing default-location file falls through
    /// to compiled defaults.
    pub fn resolve(cli_path: Option<&Path>) -> Result<FunnelConfig> {
        // Priority 1: command-line argument
        if let Some(path) = cli_path {
            return Self::load_file(path);
        }

        // Priority 2: environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::load_file(Path::new(&path));
        }

        // Priority 3: platform config file
        if let Some(path) = default_config_path() {
            if path.exists() {
                return Self::load_file(&path);
            }
        }

        // Priority 4: compiled defaults
        Ok(FunnelConfig::default())
    }

    /// Load and parse a TOML config file
    pub fn load_file(path: &Path) -> Result<FunnelConfig> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Default configuration file path for the platform
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("funnel").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_defaults_are_complete() {
        let config = FunnelConfig::default();
        assert!(config.checkout.one_bottle_url.starts_with("https://"));
        assert!(config.checkout.three_bottle_url.contains("3-bottle"));
        assert_eq!(config.admin.session_ttl_hours, 24);
        assert_eq!(config.video.poll_interval_ms, 500);
        assert_eq!(config.video.max_poll_attempts, 20);
        assert!(config.environment.is_dev_host("localhost"));
        assert!(!config.environment.is_dev_host("site.example.com"));
    }

    #[test]
    fn test_partial_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[reveal]
delay_secs = 10

[video]
max_poll_attempts = 3
"#
        )
        .unwrap();

        let config = FunnelConfig::load_file(file.path()).unwrap();
        assert_eq!(config.reveal.delay_secs, 10);
        assert_eq!(config.video.max_poll_attempts, 3);
        // Untouched sections keep defaults
        assert_eq!(config.admin.session_ttl_hours, 24);
        assert!(config.checkout.six_bottle_url.contains("6-bottle"));
    }

    #[test]
    fn test_bad_file_is_hard_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "reveal = \"nope\"").unwrap();
        assert!(FunnelConfig::load_file(file.path()).is_err());
    }

    #[test]
    #[serial]
    fn test_env_var_resolution() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[reveal]\ndelay_secs = 7").unwrap();

        std::env::set_var(CONFIG_ENV_VAR, file.path());
        let config = FunnelConfig::resolve(None).unwrap();
        std::env::remove_var(CONFIG_ENV_VAR);

        assert_eq!(config.reveal.delay_secs, 7);
    }

    #[test]
    #[serial]
    fn test_cli_path_beats_env_var() {
        let mut env_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(env_file, "[reveal]\ndelay_secs = 7").unwrap();
        let mut cli_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(cli_file, "[reveal]\ndelay_secs = 99").unwrap();

        std::env::set_var(CONFIG_ENV_VAR, env_file.path());
        let config = FunnelConfig::resolve(Some(cli_file.path())).unwrap();
        std::env::remove_var(CONFIG_ENV_VAR);

        assert_eq!(config.reveal.delay_secs, 99);
    }

    #[test]
    fn test_package_parsing() {
        assert_eq!("3-bottle".parse::<Package>().unwrap(), Package::ThreeBottle);
        assert!("12-bottle".parse::<Package>().is_err());
    }
}
