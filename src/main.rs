use anyhow::Result;
use clap::{Parser, Subcommand};

use gapdash::config::{self, GapdashConfig};
use gapdash::dashboard::Dashboard;
use gapdash::{cli, web};

#[derive(Debug, Parser)]
#[command(name = "gapdash")]
#[command(about = "Interactive gapminder dashboard")]
struct App {
    /// Log at debug level regardless of configuration
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load the dataset and serve the dashboard (default)
    Serve {
        /// Interface to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
        /// Open the dashboard in the default browser
        #[arg(long)]
        open: bool,
    },
    /// Load the dataset and print a summary
    Summary,
    /// Compute one chart and print its figure JSON
    Preview {
        /// Chart id: line-chart, bubble-chart, top-population-chart, continent-population-chart
        chart: String,
        /// Selected country (repeatable)
        #[arg(short, long = "country", default_value = "Canada")]
        countries: Vec<String>,
        /// Y-axis metric: pop or gdpPercap
        #[arg(long, default_value = "pop")]
        metric: String,
    },
    /// Show or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default config to ~/.gapdash/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let app = App::parse();
    let (mut cfg, warnings) = config::load_with_warnings();

    init_logging(&cfg, app.verbose);
    for warning in &warnings {
        log::warn!("{warning}");
    }

    match app.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
        open: false,
    }) {
        Commands::Serve { host, port, open } => {
            if let Some(host) = host {
                cfg.server.host = host;
            }
            if let Some(port) = port {
                cfg.server.port = port;
            }
            cfg.server.open_browser |= open;

            let dashboard = Dashboard::load(&cfg.data)?;
            web::serve(&dashboard, &cfg.server)
        }
        Commands::Summary => {
            let dashboard = Dashboard::load(&cfg.data)?;
            cli::run_summary(&dashboard)
        }
        Commands::Preview {
            chart,
            countries,
            metric,
        } => {
            let dashboard = Dashboard::load(&cfg.data)?;
            cli::run_preview(&dashboard, &chart, countries, &metric)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
        },
    }
}

fn init_logging(cfg: &GapdashConfig, verbose: bool) {
    let level = if verbose {
        log::Level::Debug
    } else {
        cfg.logging.level.to_level()
    };
    if let Err(e) = simple_logger::init_with_level(level) {
        eprintln!("failed to initialize logging: {e}");
    }
}
