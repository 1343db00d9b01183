//! OCI credentials file
//!
//! The INI file shared with the official OCI tooling (`~/.oci/config`):
//!
//! ```ini
//! [DEFAULT]
//! user=ocid1.user.oc1..aaaa
//! fingerprint=12:34:56:78:90:ab:cd:ef:12:34:56:78:90:ab:cd:ef
//! key_file=~/.oci/oci_api_key.pem
//! tenancy=ocid1.tenancy.oc1..bbbb
//! region=us-phoenix-1
//!
//! [ASHBURN]
//! region=us-ashburn-1
//! ```
//!
//! Keys missing from a named profile are inherited from `DEFAULT`. Only the
//! identifying fields are read; the key file itself is never opened here.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ::config::{Config, File, FileFormat, Value};
use directories::BaseDirs;
use serde::Serialize;
use tracing::debug;

use super::error::{ConfigError, Result};

/// Name of the profile used when none is chosen
pub const DEFAULT_PROFILE: &str = "DEFAULT";

const REQUIRED_KEYS: [&str; 5] = ["user", "fingerprint", "key_file", "tenancy", "region"];

/// One resolved profile of the OCI credentials file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OciProfile {
    /// Section name as written in the file
    pub name: String,
    pub user: String,
    pub fingerprint: String,
    pub key_file: PathBuf,
    pub tenancy: String,
    pub region: String,
    /// File the profile was read from
    pub config_file: PathBuf,
}

impl OciProfile {
    /// Load `profile` from the default credentials file
    pub fn load(profile: &str) -> Result<Self> {
        let path = Self::default_config_path()?;
        Self::load_from_path(&path, profile)
    }

    /// Load `profile` from a specific credentials file
    ///
    /// The section name is matched case-insensitively.
    pub fn load_from_path(path: &Path, profile: &str) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::CredentialsNotFound {
                path: path.display().to_string(),
            });
        }
        debug!(path = %path.display(), profile, "Reading OCI config");

        let sections = read_sections(path)?;

        let (name, own) = sections
            .iter()
            .find(|(section, _)| section.eq_ignore_ascii_case(profile))
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: profile.to_string(),
                path: path.display().to_string(),
            })?;

        let mut merged = HashMap::new();
        if !name.eq_ignore_ascii_case(DEFAULT_PROFILE)
            && let Some((_, defaults)) = sections
                .iter()
                .find(|(section, _)| section.eq_ignore_ascii_case(DEFAULT_PROFILE))
        {
            merged.extend(defaults.clone());
        }
        merged.extend(own.clone());

        let mut take = |key: &str| -> Result<String> {
            merged
                .remove(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingKey {
                    profile: name.clone(),
                    key: key.to_string(),
                })
        };

        let [user, fingerprint, key_file, tenancy, region] = REQUIRED_KEYS;
        Ok(OciProfile {
            name: name.clone(),
            user: take(user)?,
            fingerprint: take(fingerprint)?,
            key_file: PathBuf::from(shellexpand::tilde(&take(key_file)?).as_ref()),
            tenancy: take(tenancy)?,
            region: take(region)?,
            config_file: path.to_path_buf(),
        })
    }

    /// `~/.oci/config`
    pub fn default_config_path() -> Result<PathBuf> {
        let base_dirs = BaseDirs::new().ok_or(ConfigError::ConfigDirError)?;
        Ok(base_dirs.home_dir().join(".oci").join("config"))
    }
}

/// Read every section of the INI file as a lowercase-key string map
fn read_sections(path: &Path) -> Result<Vec<(String, HashMap<String, String>)>> {
    let file_error = |e: ::config::ConfigError| ConfigError::CredentialsFile {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let root: HashMap<String, Value> = Config::builder()
        .add_source(
            File::from(path.to_path_buf())
                .format(FileFormat::Ini)
                .required(true),
        )
        .build()
        .and_then(|c| c.try_deserialize())
        .map_err(file_error)?;

    let mut sections = Vec::new();
    for (section, value) in root {
        // Keys outside any section come through as plain strings
        let Ok(table) = value.into_table() else {
            continue;
        };
        let mut entries = HashMap::new();
        for (key, value) in table {
            entries.insert(key.to_ascii_lowercase(), value.into_string().map_err(file_error)?);
        }
        sections.push((section, entries));
    }
    Ok(sections)
}
