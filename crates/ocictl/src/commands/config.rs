//! `ocictl config`: inspect and edit the settings file

use serde::Serialize;
use tracing::info;

use crate::cli::{ConfigCommands, OutputFormat};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output::print_output;

#[derive(Serialize)]
struct SettingsView<'a> {
    path: String,
    active_profile: String,
    #[serde(flatten)]
    settings: &'a ocictl_core::Settings,
}

pub fn handle_config(
    conn_mgr: &mut ConnectionManager,
    command: &ConfigCommands,
    output_format: OutputFormat,
    query: Option<&str>,
) -> CliResult<()> {
    match command {
        ConfigCommands::Path => {
            println!("{}", conn_mgr.settings_file()?.display());
        }
        ConfigCommands::Show => {
            let view = SettingsView {
                path: conn_mgr.settings_file()?.display().to_string(),
                active_profile: conn_mgr.profile_name(),
                settings: &conn_mgr.settings,
            };
            let format = output_format
                .structured(query)
                .unwrap_or(crate::output::OutputFormat::Yaml);
            print_output(&view, format, query)?;
        }
        ConfigCommands::SetDefaultProfile { name } => {
            conn_mgr.settings.default_profile = Some(name.clone());
            conn_mgr.save_settings()?;
            info!(profile = %name, "Default profile updated");
            println!("Default profile set to '{}'", name);
        }
        ConfigCommands::SetCompartment { compartment_id } => {
            let profile = conn_mgr.profile_name();
            conn_mgr
                .settings
                .set_default_compartment(&profile, compartment_id.clone());
            conn_mgr.save_settings()?;
            info!(profile = %profile, compartment_id = %compartment_id, "Default compartment updated");
            println!(
                "Default compartment for profile '{}' set to {}",
                profile, compartment_id
            );
        }
    }
    Ok(())
}
