use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, shells};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod connection;
mod error;
mod output;

use cli::{Cli, Commands, ConfigCommands, Operation};
use connection::ConnectionManager;
use error::OcictlError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level
    init_tracing(cli.verbose);

    let settings_path = cli.settings.as_ref().map(std::path::PathBuf::from);
    debug!("Loading settings from {:?}", settings_path);
    let conn_mgr = match ConnectionManager::load(settings_path) {
        Ok(conn_mgr) => conn_mgr
            .with_profile(cli.profile.clone())
            .with_oci_config_file(cli.config_file.as_ref().map(std::path::PathBuf::from)),
        Err(e) => {
            e.print_diagnostic();
            std::process::exit(1);
        }
    };

    // Ctrl-C interrupts waits instead of killing the process mid-call
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            on_signal.cancel();
        }
    });

    if let Err(e) = execute_command(&cli, conn_mgr, cancel).await {
        e.print_diagnostic();
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    // Check for RUST_LOG env var first, then fall back to verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "ocictl=warn,ocictl_core=warn",
            1 => "ocictl=info,ocictl_core=info",
            2 => "ocictl=debug,ocictl_core=debug",
            _ => "ocictl=trace,ocictl_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

async fn execute_command(
    cli: &Cli,
    mut conn_mgr: ConnectionManager,
    cancel: CancellationToken,
) -> Result<(), OcictlError> {
    trace!("Executing command: {:?}", cli.command);
    info!("Command: {}", format_command(&cli.command));

    let query = cli.query.as_deref();
    let start = std::time::Instant::now();
    let result = match &cli.command {
        Commands::Version => {
            debug!("Showing version information");
            match cli.output {
                cli::OutputFormat::Json | cli::OutputFormat::Yaml => {
                    let output_data = serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION"),
                        "name": env!("CARGO_PKG_NAME"),
                    });

                    let fmt = match cli.output {
                        cli::OutputFormat::Yaml => output::OutputFormat::Yaml,
                        _ => output::OutputFormat::Json,
                    };

                    output::print_output(&output_data, fmt, None).map_err(OcictlError::from)
                }
                _ => {
                    println!("ocictl {}", env!("CARGO_PKG_VERSION"));
                    Ok(())
                }
            }
        }
        Commands::Completions { shell } => {
            debug!("Generating completions for {:?}", shell);
            generate_completions(*shell);
            Ok(())
        }
        Commands::Config(config_cmd) => {
            commands::config::handle_config(&mut conn_mgr, config_cmd, cli.output, query)
        }
        Commands::List(args) => {
            commands::list::handle_list(&conn_mgr, args, cli.output, query).await
        }
        Commands::Update(args) => {
            commands::update::handle_update(&conn_mgr, args, cli.output, query, cancel).await
        }
        Commands::Monitor(args) => {
            commands::monitor::handle_monitor(&conn_mgr, args, cli.output, query).await
        }
    };

    let duration = start.elapsed();
    match &result {
        Ok(_) => info!("Command completed successfully in {:?}", duration),
        Err(e) => error!("Command failed after {:?}: {}", duration, e),
    }

    result
}

/// Generate shell completions
fn generate_completions(shell: cli::Shell) {
    let mut cmd = cli::Cli::command();
    let name = cmd.get_name().to_string();

    match shell {
        cli::Shell::Bash => generate(shells::Bash, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Zsh => generate(shells::Zsh, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Fish => generate(shells::Fish, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::PowerShell => {
            generate(shells::PowerShell, &mut cmd, name, &mut std::io::stdout())
        }
        cli::Shell::Elvish => generate(shells::Elvish, &mut cmd, name, &mut std::io::stdout()),
    }
}

/// Format command for human-readable logging
fn format_command(command: &Commands) -> String {
    match command {
        Commands::Version => "version".to_string(),
        Commands::Completions { shell } => format!("completions {:?}", shell),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Path => "config path".to_string(),
            ConfigCommands::Show => "config show".to_string(),
            ConfigCommands::SetDefaultProfile { name } => {
                format!("config set-default-profile {}", name)
            }
            ConfigCommands::SetCompartment { compartment_id } => {
                format!("config set-compartment {}", compartment_id)
            }
        },
        Commands::List(args) if args.list_compartments => "list --list-compartments".to_string(),
        Commands::List(args) => format!(
            "list --compartment-id {} --state {:?}",
            args.compartment_id.as_deref().unwrap_or("<default>"),
            args.state
        ),
        Commands::Update(args) => {
            let operation = match args.operation() {
                Operation::Transition(action) => action.to_string(),
                Operation::Rename(name) => format!("rename {}", name),
                Operation::Status => "status".to_string(),
            };
            format!("update {} {}", args.instance_id, operation)
        }
        Commands::Monitor(args) => format!(
            "monitor {} --minutes {}",
            args.instance_id, args.minutes
        ),
    }
}
