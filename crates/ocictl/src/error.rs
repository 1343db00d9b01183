//! Error types for ocictl
//!
//! Core failures are mapped onto a small set of user-facing categories, each
//! with its own hints, and printed as cargo-style diagnostics.

use colored::Colorize;
use ocictl_core::{ConfigError, CoreError};
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: Profile 'PROD' not found in /home/alice/.oci/config
///
///   tip: Select another profile with --profile or OCI_CLI_PROFILE
/// ```
pub struct CliDiagnostic {
    message: String,
    detail: Option<String>,
    tips: Vec<(String, Vec<String>)>,
}

impl CliDiagnostic {
    /// Start a new error diagnostic with the given message.
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            detail: None,
            tips: Vec::new(),
        }
    }

    /// Add a detail line below the error message.
    pub fn detail(mut self, text: &str) -> Self {
        self.detail = Some(text.to_string());
        self
    }

    /// Add a tip with optional example commands.
    pub fn tip(mut self, description: &str, commands: &[&str]) -> Self {
        self.tips.push((
            description.to_string(),
            commands.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        if let Some(detail) = &self.detail {
            eprintln!("  {}", detail);
        }

        for (description, commands) in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", description);
            for cmd in commands {
                eprintln!("      {}", cmd);
            }
        }
    }
}

/// Main error type for the ocictl application
#[derive(Error, Debug)]
pub enum OcictlError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Profile '{name}' not found in {path}")]
    ProfileNotFound { name: String, path: String },

    #[error("OCI config file not found: {path}")]
    MissingCredentials { path: String },

    #[error("Profile '{profile}' is missing required key '{key}'")]
    IncompleteProfile { profile: String, key: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("API error: {message}")]
    ApiError { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("{message}")]
    InvalidState { message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for ocictl operations
pub type Result<T> = std::result::Result<T, OcictlError>;

impl OcictlError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            OcictlError::ProfileNotFound { path, .. } => vec![
                format!("List the profiles defined in {}", path),
                "Select another profile with --profile or OCI_CLI_PROFILE".to_string(),
                "Set a default profile: ocictl config set-default-profile <name>".to_string(),
            ],
            OcictlError::MissingCredentials { .. } => vec![
                "Create the OCI config file: oci setup config".to_string(),
                "Point at another file with --config-file or OCI_CLI_CONFIG_FILE".to_string(),
            ],
            OcictlError::IncompleteProfile { profile, .. } => vec![
                format!("Add the missing key to the [{}] section", profile),
                "Regenerate the profile: oci setup config".to_string(),
            ],
            OcictlError::AuthenticationFailed { .. } => vec![
                "Check the key_file and fingerprint of the profile".to_string(),
                "Verify the credentials directly: oci iam region list".to_string(),
                "Make sure the API key is uploaded for the user".to_string(),
            ],
            OcictlError::ApiError { message } if message.contains("install the OCI CLI") => vec![
                "Install the OCI CLI: pip install oci-cli".to_string(),
                "Or point ocictl at it: oci_cli_path in the ocictl settings file".to_string(),
            ],
            OcictlError::ApiError { message }
                if message.contains("NotAuthorizedOrNotFound") || message.contains("404") =>
            {
                vec![
                    "Verify the OCID is correct".to_string(),
                    "List instances to find the right OCID: ocictl list".to_string(),
                    "Check that the profile has access to the compartment".to_string(),
                ]
            }
            OcictlError::InvalidState { .. } => vec![
                "Check the current state: ocictl update --instance-id <ocid> --status".to_string(),
            ],
            OcictlError::Timeout { .. } => vec![
                "The action keeps running in OCI; check again with --status".to_string(),
                "Wait longer with --wait-timeout <seconds>".to_string(),
            ],
            OcictlError::InvalidInput { .. } => vec![
                "Check the command syntax: ocictl <command> --help".to_string(),
            ],
            _ => vec![],
        }
    }

    /// Extra context printed under the message
    fn detail(&self) -> Option<&'static str> {
        match self {
            OcictlError::Timeout { .. } | OcictlError::Cancelled => {
                Some("The action was accepted by OCI; the instance may still be changing state.")
            }
            _ => None,
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&format!("{}", self));
        if let Some(detail) = self.detail() {
            diag = diag.detail(detail);
        }

        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion, &[]);
        }

        diag.print();
    }
}

impl From<serde_json::Error> for OcictlError {
    fn from(err: serde_json::Error) -> Self {
        OcictlError::OutputError {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<std::io::Error> for OcictlError {
    fn from(err: std::io::Error) -> Self {
        OcictlError::OutputError {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<anyhow::Error> for OcictlError {
    fn from(err: anyhow::Error) -> Self {
        OcictlError::OutputError {
            message: format!("{:#}", err),
        }
    }
}

impl From<ConfigError> for OcictlError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name, path } => {
                OcictlError::ProfileNotFound { name, path }
            }
            ConfigError::CredentialsNotFound { path } => OcictlError::MissingCredentials { path },
            ConfigError::MissingKey { profile, key } => {
                OcictlError::IncompleteProfile { profile, key }
            }
            other => OcictlError::Configuration(other.to_string()),
        }
    }
}

impl From<CoreError> for OcictlError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Remote { message } => OcictlError::ApiError { message },
            CoreError::Authentication { message } => OcictlError::AuthenticationFailed { message },
            CoreError::Timeout { .. } => OcictlError::Timeout {
                message: err.to_string(),
            },
            CoreError::PreconditionNotMet { .. } | CoreError::TerminalState { .. } => {
                OcictlError::InvalidState {
                    message: err.to_string(),
                }
            }
            CoreError::Cancelled => OcictlError::Cancelled,
            CoreError::Validation(message) => OcictlError::InvalidInput { message },
            CoreError::Config(config_err) => OcictlError::from(config_err),
            CoreError::Decode { .. } => OcictlError::ApiError {
                message: err.to_string(),
            },
        }
    }
}
