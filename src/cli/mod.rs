mod commands;
pub mod error;


use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, HttpConfig};

#[derive(Parser, Debug)]
#[command(name = "bb7")]
#[command(author, version, about = "MCP developer toolbox", long_about = None)]
pub struct Cli {
    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the MCP server (the default when no command is given)
    Serve(ServeArgs),
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// MCP over stdin/stdout
    #[default]
    Stdio,
    /// MCP Streamable HTTP on localhost
    Http,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Transport to serve MCP over
    #[arg(long, value_enum, default_value_t)]
    transport: Transport,

    /// Host address to bind to (http transport)
    #[arg(long)]
    host: Option<IpAddr>,

    /// Port to listen on (http transport)
    #[arg(short, long)]
    port: Option<u16>,

    /// Data directory (default: BB7_DATA_DIR or ~/.local/share/bb7)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

impl ServeArgs {
    fn config(&self) -> Config {
        let mut config = Config::new();
        if let Some(dir) = &self.data_dir {
            config = config.with_data_dir(dir);
        }
        let defaults = HttpConfig::default();
        config.with_http(HttpConfig {
            host: self.host.unwrap_or(defaults.host),
            port: self.port.unwrap_or(defaults.port),
            ..defaults
        })
    }
}

/// Logs go to stderr; stdout belongs to the stdio transport.
fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "bb7=debug,tower_http=debug"
    } else {
        "bb7=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub async fn run() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command.unwrap_or_else(|| Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => commands::serve::serve(args.config(), args.transport).await?,
    }
    Ok(())
}
