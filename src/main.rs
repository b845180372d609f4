mod cli;

use clap::Parser;
use noor::Provider;
use noor::core::config;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::{self, File};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "noor", about = "Read, search and reflect on the Quran")]
struct Args {
    /// LLM provider for the AI commands
    #[arg(short, long, default_value_t, value_enum)]
    provider: Provider,

    /// Output width in columns
    #[arg(short, long, default_value_t = 80)]
    width: usize,

    #[command(subcommand)]
    command: cli::Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let cli_provider = match args.provider {
        Provider::Configured => None,
        Provider::OpenRouter => Some("openrouter"),
        Provider::LmStudio => Some("lmstudio"),
    };
    let resolved = config::resolve(&file_config, cli_provider);

    // File logger in the data dir; logging is skipped if it can't be opened
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if fs::create_dir_all(&resolved.data_dir).is_ok()
        && let Ok(log_file) = File::create(resolved.data_dir.join("noor.log"))
    {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    log::info!(
        "Noor starting up: provider={}, model={}, data_dir={}",
        resolved.provider,
        resolved.model_name,
        resolved.data_dir.display()
    );

    let app = match cli::App::new(resolved, args.width) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Could not open data directory: {e}");
            return ExitCode::FAILURE;
        }
    };

    match app.run(args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::warn!("Command failed: {}", e);
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
