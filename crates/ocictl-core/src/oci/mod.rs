//! Provider binding backed by the official `oci` command line tool
//!
//! Request signing, credentials and the REST wire format all stay inside
//! `oci`; this binding only builds argument vectors, runs the process and
//! decodes its JSON output. Each call is one process, there are no retries.

pub mod args;
pub mod response;

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::config::OciProfile;
use crate::error::{CoreError, Result};
use crate::model::{Compartment, Instance, InstanceAction, LifecycleState, MetricSeries, Page, User};
use crate::provider::{ComputeApi, IdentityApi, MetricQuery, MonitoringApi};

/// Executable looked up on `PATH` when no explicit path is configured
pub const DEFAULT_PROGRAM: &str = "oci";

/// Upper bound for a single invocation
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs `oci` for one credential profile
#[derive(Debug, Clone)]
pub struct OciCli {
    program: PathBuf,
    profile: String,
    config_file: Option<PathBuf>,
    call_timeout: Duration,
}

impl OciCli {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            profile: profile.into(),
            config_file: None,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Binding for a resolved profile, pinned to the file it came from
    pub fn for_profile(profile: &OciProfile) -> Self {
        Self::new(profile.name.clone()).with_config_file(profile.config_file.clone())
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Full argument vector including the global options
    pub fn command_line(&self, args: Vec<String>) -> Vec<String> {
        let mut out = args;
        out.extend([
            "--output".to_string(),
            "json".to_string(),
            "--profile".to_string(),
            self.profile.clone(),
        ]);
        if let Some(path) = &self.config_file {
            out.push("--config-file".to_string());
            out.push(path.display().to_string());
        }
        out
    }

    /// Run one invocation and return its stdout
    async fn run(&self, args: Vec<String>) -> Result<Vec<u8>> {
        let argv = self.command_line(args);
        debug!(program = %self.program.display(), args = ?argv, "Running oci");

        let child = Command::new(&self.program)
            .args(&argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => CoreError::remote(format!(
                    "'{}' not found; install the OCI CLI (https://docs.oracle.com/iaas/Content/API/SDKDocs/cliinstall.htm) or set oci_cli_path",
                    self.program.display()
                )),
                _ => CoreError::remote(format!(
                    "failed to run '{}': {}",
                    self.program.display(),
                    e
                )),
            })?;

        // Dropping the future on timeout kills the child
        let output = tokio::time::timeout(self.call_timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                CoreError::remote(format!(
                    "oci timed out after {}s",
                    self.call_timeout.as_secs()
                ))
            })?
            .map_err(|e| CoreError::remote(format!("failed to read oci output: {e}")))?;

        trace!(status = ?output.status, bytes = output.stdout.len(), "oci finished");

        if !output.status.success() {
            return Err(CoreError::remote(response::error_message(&output.stderr)));
        }
        Ok(output.stdout)
    }

    async fn data<T: DeserializeOwned>(&self, args: Vec<String>, context: &str) -> Result<T> {
        let stdout = self.run(args).await?;
        response::decode_data(&stdout, context)
    }

    async fn page<T: DeserializeOwned>(&self, args: Vec<String>, context: &str) -> Result<Page<T>> {
        let stdout = self.run(args).await?;
        response::decode_page(&stdout, context)
    }
}

#[async_trait]
impl ComputeApi for OciCli {
    async fn get_instance(&self, instance_id: &str) -> Result<Instance> {
        self.data(args::get_instance(instance_id), "instance").await
    }

    async fn instance_action(&self, instance_id: &str, action: InstanceAction) -> Result<()> {
        self.run(args::instance_action(instance_id, action)).await?;
        Ok(())
    }

    async fn update_display_name(
        &self,
        instance_id: &str,
        display_name: &str,
    ) -> Result<Instance> {
        self.data(
            args::update_display_name(instance_id, display_name),
            "instance",
        )
        .await
    }

    async fn list_instances(
        &self,
        compartment_id: &str,
        state: Option<&LifecycleState>,
        page: Option<&str>,
    ) -> Result<Page<Instance>> {
        self.page(
            args::list_instances(compartment_id, state, page),
            "instance list",
        )
        .await
    }
}

#[async_trait]
impl IdentityApi for OciCli {
    async fn get_user(&self, user_id: &str) -> Result<User> {
        self.data(args::get_user(user_id), "user").await
    }

    async fn get_compartment(&self, compartment_id: &str) -> Result<Compartment> {
        self.data(args::get_compartment(compartment_id), "compartment")
            .await
    }

    async fn list_compartments(
        &self,
        parent_id: &str,
        page: Option<&str>,
    ) -> Result<Page<Compartment>> {
        self.page(
            args::list_compartments(parent_id, page),
            "compartment list",
        )
        .await
    }
}

#[async_trait]
impl MonitoringApi for OciCli {
    async fn summarize_metrics(&self, query: &MetricQuery) -> Result<Vec<MetricSeries>> {
        let stdout = self.run(args::summarize_metrics(query)).await?;
        if stdout.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        response::decode_data(&stdout, "metric data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_options_appended() {
        let cli = OciCli::new("PROD").with_config_file("/tmp/oci/config");
        let argv = cli.command_line(args::get_instance("ocid1.instance.oc1..a"));
        assert_eq!(
            argv.join(" "),
            "compute instance get --instance-id ocid1.instance.oc1..a \
             --output json --profile PROD --config-file /tmp/oci/config"
        );
    }

    #[test]
    fn test_no_config_file_by_default() {
        let argv = OciCli::new("DEFAULT").command_line(Vec::new());
        assert!(!argv.contains(&"--config-file".to_string()));
    }

    #[tokio::test]
    async fn test_missing_program_is_remote_error() {
        let cli = OciCli::new("DEFAULT").with_program("/nonexistent/bin/oci-missing");
        let err = cli.get_instance("ocid1.instance.oc1..a").await.unwrap_err();
        assert!(matches!(err, CoreError::Remote { ref message } if message.contains("not found")));
    }
}
