//! FundLens CLI - Command-line interface for the fund document pipeline.

use clap::Parser;
use fundlens_cli::cli::{ConfigAction, ConfigArgs};
use fundlens_cli::commands;
use fundlens_cli::{log_level, Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns false when a validation found errors.
async fn run() -> anyhow::Result<bool> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON on stdout stays parseable
    let filter = if cli.verbose > 0 {
        EnvFilter::new(log_level(cli.verbose))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(0)))
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let config_path = Config::resolve_path(cli.config.as_deref())?;
    // A broken config file must not block writing a fresh one
    let mut config = match &cli.command {
        Command::Config(ConfigArgs {
            action: ConfigAction::Init { .. },
        }) => Config::default(),
        _ => Config::load_from(&config_path)?,
    };
    if let Some(llm) = cli.llm {
        config.llm.backend = llm.into();
    }

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Chunk(args) => commands::execute_chunk(args, &config, &formatter)?,
        Command::Extract(args) => {
            let llm = commands::build_llm(&config.llm)?;
            commands::execute_extract(args, &config, llm, &formatter).await?
        }
        Command::Validate(args) => {
            return commands::execute_validate(args, &config, &formatter);
        }
        Command::Process(args) => {
            let llm = commands::build_llm(&config.llm)?;
            commands::execute_process(args, &config, llm, &formatter).await?
        }
        Command::Config(args) => {
            commands::execute_config(args.action, &config, &config_path, format, &formatter)?
        }
    }

    Ok(true)
}
