//! CLI structure and command definitions

use clap::{ArgGroup, Args, Parser, Subcommand};
use ocictl_core::{InstanceAction, LifecycleState};

/// Manage and monitor OCI compute instances
#[derive(Parser, Debug)]
#[command(name = "ocictl")]
#[command(version, about = "Manage and monitor OCI compute instances")]
#[command(long_about = "
Manage and monitor OCI compute instances

Credentials come from the OCI config file (~/.oci/config); every command
checks them once before talking to OCI. Calls are made through the official
`oci` command line tool, which must be installed.

EXAMPLES:
    # List the compartments of the tenancy
    ocictl list --list-compartments

    # List running instances in a compartment
    ocictl list --compartment-id ocid1.compartment.oc1..aaaa --state RUNNING

    # Start an instance and wait until it is RUNNING
    ocictl update --instance-id ocid1.instance.oc1..aaaa --start

    # CPU, memory and disk usage over the last 30 minutes
    ocictl monitor --instance-id ocid1.instance.oc1..aaaa \\
        --compartment-id ocid1.compartment.oc1..aaaa --minutes 30

    # Names of stopped instances, as JSON
    ocictl list -q '[?lifecycle_state==`STOPPED`].display_name'

For more help on a specific command, run:
    ocictl <command> --help
")]
pub struct Cli {
    /// OCI profile to use (section of the OCI config file)
    #[arg(long, short, global = true, env = "OCI_CLI_PROFILE")]
    pub profile: Option<String>,

    /// Path to the OCI config file
    #[arg(long, global = true, env = "OCI_CLI_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Path to the ocictl settings file
    #[arg(long, global = true, env = "OCICTL_CONFIG_FILE")]
    pub settings: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "auto")]
    pub output: OutputFormat,

    /// JMESPath query to filter output
    #[arg(long, short = 'q', global = true)]
    pub query: Option<String>,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable views; JSON when --query is given
    Auto,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Table built from the JSON fields
    Table,
}

impl OutputFormat {
    /// Structured format to render with, or `None` for the human view
    pub fn structured(self, query: Option<&str>) -> Option<crate::output::OutputFormat> {
        match self {
            OutputFormat::Auto if query.is_some() => Some(crate::output::OutputFormat::Json),
            OutputFormat::Auto => None,
            OutputFormat::Json => Some(crate::output::OutputFormat::Json),
            OutputFormat::Yaml => Some(crate::output::OutputFormat::Yaml),
            OutputFormat::Table => Some(crate::output::OutputFormat::Table),
        }
    }
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List instances or compartments
    #[command(visible_alias = "ls")]
    #[command(after_help = "EXAMPLES:
    # All instances in a compartment
    ocictl list --compartment-id ocid1.compartment.oc1..aaaa

    # Only stopped ones, using the profile's default compartment
    ocictl config set-compartment ocid1.compartment.oc1..aaaa
    ocictl list --state STOPPED

    # The tenancy's compartments
    ocictl list --list-compartments
")]
    List(ListArgs),

    /// Start, stop, reboot, rename or inspect an instance
    #[command(after_help = "EXAMPLES:
    # Stop and wait up to ten minutes
    ocictl update --instance-id ocid1.instance.oc1..aaaa --stop --wait-timeout 600

    # Soft reset a running instance
    ocictl update --instance-id ocid1.instance.oc1..aaaa --reboot

    # Rename
    ocictl update --instance-id ocid1.instance.oc1..aaaa --rename web-02

    # Current state as YAML
    ocictl update --instance-id ocid1.instance.oc1..aaaa --status -o yaml
")]
    Update(UpdateArgs),

    /// Summarize CPU, memory and disk metrics of an instance
    #[command(visible_alias = "mon")]
    #[command(after_help = "EXAMPLES:
    # Last hour
    ocictl monitor --instance-id ocid1.instance.oc1..aaaa --compartment-id ocid1.compartment.oc1..aaaa

    # Last 15 minutes, only the CPU average
    ocictl monitor --instance-id ocid1.instance.oc1..aaaa \\
        --compartment-id ocid1.compartment.oc1..aaaa --minutes 15 \\
        -q \"metrics[?metric=='CpuUtilization'].avg | [0]\"
")]
    Monitor(MonitorArgs),

    /// ocictl settings
    #[command(subcommand, visible_alias = "cfg")]
    Config(ConfigCommands),

    /// Version information
    #[command(visible_alias = "ver", visible_alias = "v")]
    Version,

    /// Generate shell completions
    #[command(visible_alias = "comp")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Compartment to list; defaults to the profile's configured compartment
    #[arg(long, short = 'c')]
    pub compartment_id: Option<String>,

    /// Only instances in this lifecycle state
    #[arg(long, short = 's', value_enum, ignore_case = true)]
    pub state: Option<StateFilter>,

    /// List the tenancy's compartments instead of instances
    #[arg(long, conflicts_with_all = ["compartment_id", "state"])]
    pub list_compartments: bool,
}

/// Lifecycle states accepted by `list --state`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StateFilter {
    #[value(name = "RUNNING")]
    Running,
    #[value(name = "STOPPED")]
    Stopped,
    #[value(name = "TERMINATED")]
    Terminated,
    #[value(name = "TERMINATING")]
    Terminating,
    #[value(name = "STOPPING")]
    Stopping,
    #[value(name = "STARTING")]
    Starting,
}

impl From<StateFilter> for LifecycleState {
    fn from(filter: StateFilter) -> Self {
        match filter {
            StateFilter::Running => LifecycleState::Running,
            StateFilter::Stopped => LifecycleState::Stopped,
            StateFilter::Terminated => LifecycleState::Terminated,
            StateFilter::Terminating => LifecycleState::Terminating,
            StateFilter::Stopping => LifecycleState::Stopping,
            StateFilter::Starting => LifecycleState::Starting,
        }
    }
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("operation")
        .required(true)
        .args(["start", "stop", "reboot", "rename", "status"])
))]
pub struct UpdateArgs {
    /// OCID of the instance
    #[arg(long, short = 'i')]
    pub instance_id: String,

    /// Start the instance and wait until it is RUNNING
    #[arg(long)]
    pub start: bool,

    /// Stop the instance and wait until it is STOPPED
    #[arg(long)]
    pub stop: bool,

    /// Soft reset a running instance and wait until it is RUNNING again
    #[arg(long)]
    pub reboot: bool,

    /// Change the display name
    #[arg(long, value_name = "NAME")]
    pub rename: Option<String>,

    /// Show the current state
    #[arg(long)]
    pub status: bool,

    #[command(flatten)]
    pub wait: WaitArgs,
}

/// What `update` was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Transition(InstanceAction),
    Rename(String),
    Status,
}

impl UpdateArgs {
    /// The single operation selected by the flags
    pub fn operation(&self) -> Operation {
        if self.start {
            Operation::Transition(InstanceAction::Start)
        } else if self.stop {
            Operation::Transition(InstanceAction::Stop)
        } else if self.reboot {
            Operation::Transition(InstanceAction::SoftReset)
        } else if let Some(name) = &self.rename {
            Operation::Rename(name.clone())
        } else {
            Operation::Status
        }
    }
}

/// Overrides for how long and how often `update` polls
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct WaitArgs {
    /// Maximum time to wait for the target state, in seconds
    #[arg(long, value_name = "SECS")]
    pub wait_timeout: Option<u64>,

    /// Time between state checks, in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub wait_interval: Option<u64>,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// OCID of the instance
    #[arg(long, short = 'i')]
    pub instance_id: String,

    /// Compartment the metrics are stored in
    #[arg(long, short = 'c')]
    pub compartment_id: String,

    /// Lookback window in minutes
    #[arg(long, short = 'm', default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    pub minutes: u32,
}

/// Settings file commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the settings file location
    Path,
    /// Show the effective settings
    Show,
    /// Use PROFILE when --profile is not given
    SetDefaultProfile {
        /// OCI profile name
        name: String,
    },
    /// Set the default compartment of the active profile
    SetCompartment {
        /// Compartment OCID
        compartment_id: String,
    },
}

/// Supported shells for completion generation
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bourne Again Shell
    Bash,
    /// Z Shell
    Zsh,
    /// Friendly Interactive Shell
    Fish,
    /// PowerShell
    #[value(name = "powershell", alias = "power-shell")]
    PowerShell,
    /// Elvish
    Elvish,
}
