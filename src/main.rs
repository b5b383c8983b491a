use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info};
use ringcat::commands::{cycle, tail};
use ringcat::config::{load_config, Overrides};
use ringcat::Error;

#[derive(Parser, Debug)]
#[command(name = "ringcat", version, about = "Stream bytes through a fixed-size ring buffer")]
struct Cli {
    /// Settings file (defaults to ~/.config/ringcat/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ring size in bytes
    #[arg(long, global = true)]
    capacity: Option<usize>,

    /// Offset the cursor starts at
    #[arg(long, global = true)]
    offset: Option<usize>,

    /// Byte budget for the ring accessor
    #[arg(long, global = true)]
    limit: Option<u64>,

    /// I/O chunk size in bytes
    #[arg(long, global = true)]
    chunk: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the last `capacity` bytes of FILE (or stdin)
    Tail { file: Option<PathBuf> },
    /// Repeat the contents of FILE until COUNT bytes have been written
    Cycle {
        file: PathBuf,
        #[arg(long)]
        count: Option<u64>,
    },
}

async fn run(cli: Cli) -> Result<u64, Error> {
    let overrides = Overrides {
        capacity: cli.capacity,
        offset: cli.offset,
        limit: cli.limit,
        chunk: cli.chunk,
    };
    let settings = load_config(cli.config.as_deref())?.resolve(&overrides)?;
    let stdout = tokio::io::stdout();

    match cli.command {
        Command::Tail { file: Some(path) } => {
            let file = tokio::fs::File::open(&path).await?;
            tail(file, stdout, &settings).await
        }
        Command::Tail { file: None } => tail(tokio::io::stdin(), stdout, &settings).await,
        Command::Cycle { file, count } => {
            let content = tokio::fs::read(&file).await?;
            cycle(content, stdout, &settings, count).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(n) => {
            info!("Wrote {} bytes", n);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.to_status_code())
        }
    }
}
