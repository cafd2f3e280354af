use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use stream_backup_tools::catalog::{ObjectCatalog, Prefix, S3ObjectStore};
use stream_backup_tools::config::Config;
use stream_backup_tools::errors::Result;
use stream_backup_tools::list::{list_and_download, ListOptions};
use stream_backup_tools::logging::init_logging;
use stream_backup_tools::shared::ui::TerminalPrompter;
use tracing::error;

#[derive(Parser)]
#[command(name = "list-backups")]
#[command(about = "List streamed backups in the object store and download one", long_about = None)]
struct Cli {
    /// Print the backup list as JSON (for scripting) and exit
    #[arg(short, long)]
    json: bool,
    /// Key or file name of the backup to download (skips the selection prompt)
    #[arg(short, long)]
    key: Option<String>,
    /// Where to save the backup (skips the path prompt)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_logging("list-backups.log") {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "list-backups failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Fails before any network call when credentials are missing
    let config = Config::load()?;

    let store = S3ObjectStore::new(&config).await;
    let catalog = ObjectCatalog::new(store, Prefix::new(&config.path_prefix));

    let options = ListOptions {
        json: cli.json,
        key: cli.key,
        output: cli.output,
        show_progress: !cli.json,
    };

    list_and_download(&catalog, &TerminalPrompter, &options).await?;
    Ok(())
}
