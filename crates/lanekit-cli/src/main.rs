use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use lanekit_core::Environment;
use lanekit_core::pipeline::LaneContext;

mod commands;
mod output;

use commands::{
    banner::handle_icon_banner,
    lane::handle_lane,
    signing::{handle_enterprise_configuration, handle_install_provisioning_profile},
};

#[derive(Parser)]
#[command(name = "lanekit")]
#[command(about = "iOS signing and build actions for CI lanes", long_about = None)]
struct Cli {
    /// Treat this host as a CI server even if no CI marker is detected
    #[arg(long, global = true)]
    ci: bool,

    /// Print the lane context as JSON on stdout. The certificate password is
    /// never included; read PROVISIONING_CERTIFICATE_PASSWORD where it is needed
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the enterprise signing configuration
    EnterpriseConfiguration {
        /// Produce an unsigned configuration instead of failing outside CI
        #[arg(long)]
        allow_local: bool,

        /// Project description (YAML); resolves one profile per extension
        #[arg(long)]
        project: Option<PathBuf>,
    },

    /// Parse a local provisioning profile and install it
    InstallProvisioningProfile {
        /// Path to the provisioning profile, relative to the project root
        #[arg(long, env = "FL_INSTALL_PROVISIONING_PROFILE_PATH")]
        path: Option<String>,
    },

    /// Generate a banner on app icons using a given text
    IconBanner {
        /// The text that will appear on top of the app icon
        #[arg(long, env = "FL_ICON_BANNER_TEXT")]
        text: Option<String>,
    },

    /// Run the steps of a lane file in order
    Lane {
        /// Lane file (YAML)
        file: PathBuf,
    },

    /// Show CLI version
    Version,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("LANEKIT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Logs go to stderr so stdout stays parseable with --json.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present (doesn't override existing env vars)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("lanekit {}", lanekit_core::VERSION);
        return Ok(());
    }

    let env = Environment::from_process();
    let host_ci = cli.ci || env.detect_host_ci();
    let working_dir = std::env::current_dir().context("Failed to determine working directory")?;

    let mut context = LaneContext::new();

    match cli.command {
        Commands::EnterpriseConfiguration {
            allow_local,
            project,
        } => {
            handle_enterprise_configuration(&env, host_ci, allow_local, project, &mut context)?
        }
        Commands::InstallProvisioningProfile { path } => {
            handle_install_provisioning_profile(path, &working_dir, &mut context).await?
        }
        Commands::IconBanner { text } => handle_icon_banner(text, &env, &working_dir).await?,
        Commands::Lane { file } => {
            context = handle_lane(&file, &env, host_ci, &working_dir).await?;
        }
        Commands::Version => unreachable!(), // Handled above
    }

    output::print_context(&context, cli.json)
}
