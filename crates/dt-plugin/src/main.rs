mod cli; // Command implementations

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use env_logger::Env;

use crate::cli::Simulator;

/// DT Plugin host simulator: boots the plugin against an in-memory host and
/// drives it through the host's hooks.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Plugin directory holding config/, routes/ and resources/
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Log at debug level (RUST_LOG still wins when set)
    #[arg(short, long)]
    verbose: bool,

    /// Version reported by the simulated Disciple.Tools theme
    #[arg(long)]
    theme_version: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a front-end request through `template_redirect`
    Request {
        /// HTTP method
        method: String,
        /// Request URI, path and query
        uri: String,
        /// Form field, `name=value` (repeatable)
        #[arg(long = "form", value_parser = parse_pair)]
        form: Vec<(String, String)>,
        /// Request header, `name=value` (repeatable)
        #[arg(long = "header", value_parser = parse_pair)]
        headers: Vec<(String, String)>,
        /// Attach a valid nonce for this action as `X-WP-Nonce`
        #[arg(long)]
        nonce: Option<String>,
    },
    /// Open the settings screen in the admin area
    Admin {
        /// Settings tab
        #[arg(long, default_value = "general")]
        tab: String,
        /// Submit the form with this field, `name=value` (repeatable)
        #[arg(long = "set", value_parser = parse_pair)]
        set: Vec<(String, String)>,
    },
    /// Print the `dt_plugins` filter output
    Plugins,
    /// Print merged configuration, or one dotted key
    Config {
        key: Option<String>,
    },
    /// List the routes declared by each route file
    Routes,
    /// Print the starter magic link for a user record
    MagicLink {
        user_id: u64,
    },
}

fn parse_pair(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{}'", value))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let simulator = Simulator::new(args.root, args.theme_version);
    let result = match args.command {
        Commands::Request { method, uri, form, headers, nonce } => {
            simulator.request(&method, &uri, &form, &headers, nonce.as_deref()).await
        }
        Commands::Admin { tab, set } => simulator.admin(&tab, &set).await,
        Commands::Plugins => simulator.plugins().await,
        Commands::Config { key } => simulator.config(key.as_deref()).await,
        Commands::Routes => simulator.routes().await,
        Commands::MagicLink { user_id } => simulator.magic_link(user_id).await,
    };

    match result {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{:?}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
