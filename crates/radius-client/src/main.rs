use clap::Parser;
use radius_client::{Client, Config, Credentials};
use std::path::PathBuf;
use std::process;
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Authenticate a user against the configured RADIUS servers
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "radius_auth")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "/etc/radius_client.json")]
    config: PathBuf,

    #[arg(short, long)]
    username: String,

    #[arg(short, long)]
    password: String,
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::from_file(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            init_logging(None);
            error!(path = %cli.config.display(), "Cannot read configuration: {}", e);
            process::exit(1);
        }
    };

    init_logging(Some(&config));
    debug!(path = %cli.config.display(), "Loaded configuration");

    let mut client = match Client::try_with_config(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("Cannot initialize client with config: {}", e);
            process::exit(1);
        }
    };

    let credentials = Credentials::with_username_password(cli.username, cli.password);
    let user = match client.authenticate(&credentials) {
        Ok(user) => user,
        Err(e) => {
            error!("Authentication failure: {}", e);
            drop(client);
            process::exit(1);
        }
    };

    match serde_json::to_string(&user) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("Cannot serialize user: {}", e);
            drop(client);
            process::exit(1);
        }
    }
}

/// Logs go to stderr so that stdout only carries the JSON result
fn init_logging(config: Option<&Config>) {
    let level = match config {
        Some(config) if config.debug => "debug",
        Some(config) => config.log_level.as_deref().unwrap_or("warn"),
        None => "warn",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
