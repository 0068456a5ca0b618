mod cli;
mod core;
mod handlers;
mod logging;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use handlers::HandlerKind;
use logging::LogFormat;

#[derive(Parser)]
#[command(
    name = "billwatch",
    about = "AWS cost reports and budget-alert resource disablers",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log output format (defaults to json for lambda, compact otherwise)
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve a handler inside the AWS Lambda runtime
    Lambda {
        /// Handler to serve
        #[arg(value_enum, env = "BILLWATCH_HANDLER", default_value = "report")]
        handler: HandlerKind,
    },
    /// Run a handler once locally and print its response
    Invoke {
        /// Handler to run
        #[arg(value_enum)]
        handler: HandlerKind,

        /// Reporting period (daily|weekly|monthly|yearly)
        #[arg(short, long)]
        period: Option<String>,

        /// JSON file used as the invocation event
        #[arg(short, long)]
        event: Option<PathBuf>,

        /// Config file (default: $XDG_CONFIG_HOME/billwatch/config.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate the effective config
    Check {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the effective config as JSON
    Show {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_format = match cli.command {
        Commands::Lambda { .. } => LogFormat::Json,
        _ => LogFormat::Compact,
    };
    logging::init_logging(cli.log_format.unwrap_or(default_format));

    let output_opts = cli::output::OutputOptions { pretty: cli.pretty };

    match cli.command {
        Commands::Lambda { handler } => cli::lambda_cmd::run(handler).await?,
        Commands::Invoke {
            handler,
            period,
            event,
            config,
        } => {
            let args = cli::invoke_cmd::InvokeArgs {
                handler,
                period,
                event,
                config,
            };
            cli::invoke_cmd::run(args, &output_opts).await?
        }
        Commands::Config { action } => match action {
            ConfigAction::Check { config } => cli::config_cmd::check(config.as_deref())?,
            ConfigAction::Show { config } => {
                cli::config_cmd::show(config.as_deref(), &output_opts)?
            }
        },
    }

    Ok(())
}
