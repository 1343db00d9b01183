//! Connection management: settings, OCI profile and the authenticated client

use std::path::PathBuf;
use std::time::Duration;

use ocictl_core::config::WaitSettings;
use ocictl_core::{AuthContext, OciCli, OciProfile, Settings, WaitOptions};
use tracing::{debug, info};

use crate::cli::WaitArgs;
use crate::error::Result as CliResult;

/// A client whose credentials have been verified
pub struct Session {
    pub client: OciCli,
    pub auth: AuthContext,
}

/// Resolves the profile and builds authenticated clients
#[derive(Clone)]
pub struct ConnectionManager {
    pub settings: Settings,
    pub settings_path: Option<PathBuf>,
    profile: Option<String>,
    oci_config_file: Option<PathBuf>,
}

impl ConnectionManager {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            settings_path: None,
            profile: None,
            oci_config_file: None,
        }
    }

    /// Settings loaded from `settings_path`, or from the platform location
    pub fn load(settings_path: Option<PathBuf>) -> CliResult<Self> {
        let settings = match &settings_path {
            Some(path) => Settings::load_from_path(path)?,
            None => Settings::load()?,
        };
        debug!(path = ?settings_path, "Loaded settings");

        Ok(Self {
            settings_path,
            ..Self::new(settings)
        })
    }

    /// Profile named on the command line or in `OCI_CLI_PROFILE`
    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile;
        self
    }

    /// OCI config file named on the command line or in `OCI_CLI_CONFIG_FILE`
    pub fn with_oci_config_file(mut self, path: Option<PathBuf>) -> Self {
        self.oci_config_file = path;
        self
    }

    /// Effective OCI profile name
    pub fn profile_name(&self) -> String {
        self.settings.resolve_profile(self.profile.as_deref())
    }

    /// Where the settings are read from and written to
    pub fn settings_file(&self) -> CliResult<PathBuf> {
        match &self.settings_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Settings::config_path()?),
        }
    }

    /// Save the settings to the appropriate location
    pub fn save_settings(&self) -> CliResult<()> {
        match &self.settings_path {
            Some(path) => self.settings.save_to_path(path)?,
            None => self.settings.save()?,
        }
        Ok(())
    }

    /// Compartment from the command line, else the profile's default
    pub fn compartment(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .or_else(|| self.settings.default_compartment(&self.profile_name()))
            .map(str::to_string)
    }

    /// Wait limits for `update`, command line over settings
    pub fn wait_options(&self, args: WaitArgs) -> WaitOptions {
        let WaitSettings {
            timeout_secs,
            interval_secs,
        } = self.settings.wait;
        WaitOptions::new(
            Duration::from_secs(args.wait_timeout.unwrap_or(timeout_secs)),
            Duration::from_secs(args.wait_interval.unwrap_or(interval_secs)),
        )
    }

    /// Read the selected profile from the OCI config file
    pub fn load_profile(&self) -> CliResult<OciProfile> {
        let name = self.profile_name();
        let profile = match &self.oci_config_file {
            Some(path) => OciProfile::load_from_path(path, &name)?,
            None => OciProfile::load(&name)?,
        };
        debug!(profile = %profile.name, path = %profile.config_file.display(), "Loaded OCI profile");
        Ok(profile)
    }

    /// Client bound to `profile`
    pub fn create_client(&self, profile: &OciProfile) -> OciCli {
        let client = OciCli::for_profile(profile);
        match &self.settings.oci_cli_path {
            Some(program) => client.with_program(program),
            None => client,
        }
    }

    /// Load the profile, build the client and verify the credentials
    pub async fn connect(&self) -> CliResult<Session> {
        let profile = self.load_profile()?;
        let client = self.create_client(&profile);
        let auth = AuthContext::establish(&client, &profile).await?;
        info!(
            profile = %auth.profile,
            user = %auth.user_name,
            region = %auth.region,
            "Using OCI profile"
        );
        Ok(Session { client, auth })
    }
}
