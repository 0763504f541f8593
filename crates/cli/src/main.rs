mod commands;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use std::io;
use std::net::IpAddr;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG: &str = "site/site.toml";

#[derive(Parser)]
#[command(name = "alfanero")]
#[command(version, about = "Static SEO pages and lead capture for the ALFA NERO site", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Write a starter site.toml
    Init {
        /// Directory to create site.toml in
        path: PathBuf,

        /// Public origin used for canonical URLs
        #[arg(long, default_value = "https://example.com")]
        base_url: String,
    },

    /// Check the page list and, if built, the dist directory
    Validate {
        /// Path to site.toml
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,

        /// Override the dist directory from site.toml
        #[arg(short, long)]
        dist: Option<PathBuf>,
    },

    /// Write one static HTML page per route into the dist directory
    Generate {
        /// Path to site.toml
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,

        /// Override the dist directory from site.toml
        #[arg(short, long)]
        dist: Option<PathBuf>,
    },

    /// Serve the lead API and the generated site
    Serve {
        /// Path to site.toml
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,

        /// Override the dist directory from site.toml
        #[arg(short, long)]
        dist: Option<PathBuf>,

        /// Port to serve on
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: IpAddr,
    },

    /// Send the weekly inquiry report to the owner now
    Report {
        /// Path to site.toml
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_json = std::env::var("ALFANERO_LOG_JSON")
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);

    // Logs go to stderr so command output on stdout stays clean
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Init { path, base_url } => commands::init::run(path, base_url).await,
        Command::Validate { config, dist } => commands::validate::run(config, dist).await,
        Command::Generate { config, dist } => commands::generate::run(config, dist).await,
        Command::Serve {
            config,
            dist,
            port,
            bind,
        } => commands::serve::run(config, dist, bind, port).await,
        Command::Report { config } => commands::report::run(config).await,
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "alfanero", &mut io::stdout());
            Ok(())
        }
    }
}
