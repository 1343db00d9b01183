//! ocictl settings file
//!
//! Stored as TOML in the platform config directory. Every field is optional
//! and a missing file is the same as an empty one.
//!
//! ```toml
//! default_profile = "prod"
//! oci_cli_path = "${HOME}/bin/oci"
//!
//! [wait]
//! timeout_secs = 600
//! interval_secs = 10
//!
//! [profiles.prod]
//! default_compartment = "${PROD_COMPARTMENT:-ocid1.compartment.oc1..aaaa}"
//! ```

#[cfg(target_os = "macos")]
use directories::BaseDirs;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::{ConfigError, Result};
use super::oci::DEFAULT_PROFILE;
use crate::waiter::{DEFAULT_MAX_WAIT, DEFAULT_POLL_INTERVAL, WaitOptions};

/// Top-level settings
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Settings {
    /// OCI profile used when neither `--profile` nor `OCI_CLI_PROFILE` is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Path to the `oci` executable; looked up on `PATH` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oci_cli_path: Option<String>,
    #[serde(default)]
    pub wait: WaitSettings,
    /// Per-profile settings keyed by OCI profile name
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileSettings>,
}

/// Defaults for `update` waits
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct WaitSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            interval_secs: default_interval_secs(),
        }
    }
}

impl WaitSettings {
    pub fn to_options(self) -> WaitOptions {
        WaitOptions::new(
            Duration::from_secs(self.timeout_secs),
            Duration::from_secs(self.interval_secs),
        )
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_MAX_WAIT.as_secs()
}

fn default_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}

/// Settings attached to one OCI profile
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct ProfileSettings {
    /// Compartment used by `list` when `--compartment-id` is omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_compartment: Option<String>,
}

impl Settings {
    /// Load settings from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load settings from a specific path
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        let expanded_content = Self::expand_env_vars(&content);

        let settings: Settings = toml::from_str(&expanded_content)?;

        Ok(settings)
    }

    /// Save settings to the standard location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Save settings to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(config_path, content).map_err(|e| ConfigError::SaveError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        Ok(())
    }

    /// Pick the OCI profile: explicit choice, then the configured default,
    /// then `DEFAULT`
    pub fn resolve_profile(&self, explicit: Option<&str>) -> String {
        explicit
            .or(self.default_profile.as_deref())
            .unwrap_or(DEFAULT_PROFILE)
            .to_string()
    }

    /// Default compartment configured for `profile`, if any
    pub fn default_compartment(&self, profile: &str) -> Option<&str> {
        self.profiles
            .get(profile)
            .and_then(|p| p.default_compartment.as_deref())
    }

    /// Set the default compartment of `profile`, creating its entry if needed
    pub fn set_default_compartment(&mut self, profile: &str, compartment_id: String) {
        self.profiles
            .entry(profile.to_string())
            .or_default()
            .default_compartment = Some(compartment_id);
    }

    /// Get the path to the settings file
    ///
    /// On macOS `~/.config/ocictl/config.toml` is preferred when that
    /// directory exists, otherwise the platform default is used:
    ///
    /// - Linux: `~/.config/ocictl/config.toml`
    /// - macOS: `~/Library/Application Support/com.ocictl.ocictl/config.toml`
    /// - Windows: `%APPDATA%\ocictl\ocictl\config.toml`
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(base_dirs) = BaseDirs::new() {
                let linux_style_path = base_dirs
                    .home_dir()
                    .join(".config")
                    .join("ocictl")
                    .join("config.toml");

                if linux_style_path
                    .parent()
                    .map(|p| p.exists())
                    .unwrap_or(false)
                {
                    return Ok(linux_style_path);
                }
            }
        }

        let proj_dirs =
            ProjectDirs::from("com", "ocictl", "ocictl").ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand `${VAR}` and `${VAR:-default}` references
    ///
    /// Unset variables without a default are left as written.
    fn expand_env_vars(content: &str) -> String {
        let expanded =
            shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok());
        expanded.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_settings_serialization() {
        let mut settings = Settings {
            default_profile: Some("prod".to_string()),
            ..Default::default()
        };
        settings.set_default_compartment("prod", "ocid1.compartment.oc1..aaaa".to_string());

        let serialized = toml::to_string(&settings).unwrap();
        let deserialized: Settings = toml::from_str(&serialized).unwrap();

        assert_eq!(settings, deserialized);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.wait, WaitSettings::default());
        assert_eq!(settings.wait.to_options(), WaitOptions::default());
        assert!(settings.profiles.is_empty());
    }

    #[test]
    fn test_partial_wait_section() {
        let settings: Settings = toml::from_str("[wait]\ntimeout_secs = 600\n").unwrap();
        assert_eq!(settings.wait.timeout_secs, 600);
        assert_eq!(settings.wait.interval_secs, 5);
    }

    #[test]
    fn test_profile_resolution_order() {
        let mut settings = Settings::default();
        assert_eq!(settings.resolve_profile(None), "DEFAULT");

        settings.default_profile = Some("dev".to_string());
        assert_eq!(settings.resolve_profile(None), "dev");
        assert_eq!(settings.resolve_profile(Some("prod")), "prod");
    }

    #[test]
    fn test_default_compartment_lookup() {
        let mut settings = Settings::default();
        assert_eq!(settings.default_compartment("DEFAULT"), None);

        settings.set_default_compartment("DEFAULT", "ocid1.compartment.oc1..one".to_string());
        settings.set_default_compartment("DEFAULT", "ocid1.compartment.oc1..two".to_string());
        assert_eq!(
            settings.default_compartment("DEFAULT"),
            Some("ocid1.compartment.oc1..two")
        );
        assert_eq!(settings.default_compartment("other"), None);
    }

    #[test]
    #[serial_test::serial]
    fn test_env_var_expansion() {
        unsafe {
            std::env::set_var("OCICTL_TEST_COMPARTMENT", "ocid1.compartment.oc1..env");
        }

        let content = r#"
[profiles.DEFAULT]
default_compartment = "${OCICTL_TEST_COMPARTMENT}"
"#;

        let expanded = Settings::expand_env_vars(content);
        assert!(expanded.contains("ocid1.compartment.oc1..env"));

        unsafe {
            std::env::remove_var("OCICTL_TEST_COMPARTMENT");
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_env_var_expansion_with_defaults() {
        unsafe {
            std::env::remove_var("OCICTL_NONEXISTENT_VAR");
        }

        let content = r#"
oci_cli_path = "${OCICTL_NONEXISTENT_VAR:-/usr/local/bin/oci}"
default_profile = "${OCICTL_UNSET_PROFILE}"
"#;

        let expanded = Settings::expand_env_vars(content);
        let settings: Settings = toml::from_str(&expanded).unwrap();
        assert_eq!(settings.oci_cli_path.as_deref(), Some("/usr/local/bin/oci"));
        assert_eq!(
            settings.default_profile.as_deref(),
            Some("${OCICTL_UNSET_PROFILE}")
        );
    }
}
