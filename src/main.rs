use clap::{Parser, Subcommand, ValueEnum};
use refit::api::{self, RequestError, RequestKind};
use refit::config::{self, LoggingConfig, RefitConfig};
use refit::types::{RestoreItem, ScanRequest};
use refit::walk::WalkError;
use refit::{browse, catalog, output, restore, scan};
use serde::Serialize;
use std::error::Error;
use std::fs::OpenOptions;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "refit")]
#[command(about = "Back up, resize, and restore every copy of a named image")]
#[command(long_about = "\
Back up, resize, and restore every copy of a named image

Every file called NAME under ROOT is copied to NAME.backup_<YYYYMMDDHHMMSS>
next to the original, then resized in place. A file that already has such a
backup beside it is skipped, so scans can be repeated safely.

  photos/
  ├── a/
  │   ├── photo.png                        # resized
  │   └── photo.png.backup_20240131154500  # original content
  └── b/
      └── photo.png

'refit restore' copies each backup back over its original and deletes it.

Run 'refit gen-config' to generate a documented refit.toml.")]
#[command(version)]
struct Cli {
    /// Config file (stock defaults when absent)
    #[arg(long, default_value = "refit.toml", global = true)]
    config: PathBuf,

    /// Print JSON responses instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Clone)]
struct ScanArgs {
    /// Directory tree to search
    root: PathBuf,
    /// Exact file name to match, e.g. photo.png
    name: String,
    /// Target width in pixels
    #[arg(long)]
    width: u32,
    /// Target height in pixels
    #[arg(long)]
    height: u32,
    /// Report what would happen without touching any file
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Back up and resize every file named NAME under ROOT
    Scan(ScanArgs),
    /// List existing backups under ROOT
    Backups {
        root: PathBuf,
    },
    /// Restore every backup under ROOT and delete it
    Restore {
        root: PathBuf,
        /// Only restore backups of files with this name
        #[arg(long)]
        name: Option<String>,
    },
    /// List the sub-directories of PATH (home directory by default)
    Browse {
        path: Option<PathBuf>,
    },
    /// Answer one JSON request read from stdin
    Request {
        #[arg(value_enum)]
        kind: KindArg,
    },
    /// Print a stock refit.toml with all options documented
    GenConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Scan,
    Backups,
    Restore,
    Browse,
}

impl From<KindArg> for RequestKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Scan => RequestKind::Scan,
            KindArg::Backups => RequestKind::Backups,
            KindArg::Restore => RequestKind::Restore,
            KindArg::Browse => RequestKind::Browse,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // A broken refit.toml must not stop gen-config from printing a fresh one.
    let loaded = match cli.command {
        Command::GenConfig => Ok(RefitConfig::default()),
        _ => config::load_config(&cli.config),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}: {}", cli.config.display(), e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_tracing(&config.logging) {
        eprintln!("error: cannot open log file: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, config: &RefitConfig) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::Scan(args) if cli.json => json_result(api::scan(
            api::ScanPayload {
                folder_path: Some(args.root),
                image_name: Some(args.name),
                width: Some(api::Dimension::Number(args.width.into())),
                height: Some(api::Dimension::Number(args.height.into())),
                dry_run: Some(args.dry_run),
            },
            config,
        )),
        Command::Scan(args) => run_scan(args, config),
        Command::Backups { root } if cli.json => json_result(api::find_backups(
            api::BackupsPayload {
                folder_path: Some(root),
            },
            config,
        )),
        Command::Backups { root } => {
            let inventory = catalog::find_backups(&root, config)?;
            output::print_backups(&inventory, &root);
            Ok(())
        }
        Command::Restore { root, name } if cli.json => {
            let response = restore_items(&root, name.as_deref(), config)
                .map_err(RequestError::from)
                .and_then(|items| api::restore(api::RestorePayload { files: Some(items) }));
            json_result(response)
        }
        Command::Restore { root, name } => {
            let items = restore_items(&root, name.as_deref(), config)?;
            output::print_restore_report(&restore::restore(&items));
            Ok(())
        }
        Command::Browse { path } if cli.json => {
            json_result(api::browse(api::BrowsePayload { path }))
        }
        Command::Browse { path } => {
            output::print_listing(&browse::list_directory(path.as_deref())?);
            Ok(())
        }
        Command::Request { kind } => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            json_result(api::handle(kind.into(), &body, config))
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            Ok(())
        }
    }
}

/// Run a scan, streaming per-file lines from a printer thread.
fn run_scan(args: ScanArgs, config: &RefitConfig) -> Result<(), Box<dyn Error>> {
    let request = ScanRequest {
        root: args.root,
        target: args.name,
        width: args.width,
        height: args.height,
        dry_run: args.dry_run,
    };

    let (tx, rx) = std::sync::mpsc::channel();
    let root = request.root.clone();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_scan_event(&event, &root);
        }
    });
    let result = scan::scan(&request, config, Some(tx));
    printer.join().map_err(|_| "progress printer panicked")?;

    output::print_scan_summary(&result?);
    Ok(())
}

/// Catalogue backups under `root`, keeping only those of files named `name`.
fn restore_items(
    root: &Path,
    name: Option<&str>,
    config: &RefitConfig,
) -> Result<Vec<RestoreItem>, WalkError> {
    let inventory = catalog::find_backups(root, config)?;
    Ok(inventory
        .backups
        .iter()
        .filter(|record| match name {
            Some(name) => record
                .original_path
                .file_name()
                .is_some_and(|f| f == name),
            None => true,
        })
        .map(RestoreItem::from)
        .collect())
}

/// Print a response as pretty JSON, or the error body when the request failed.
fn json_result<T: Serialize>(result: Result<T, RequestError>) -> Result<(), Box<dyn Error>> {
    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(e) => {
            println!("{}", serde_json::to_string_pretty(&e.to_body())?);
            Err(format!("{} ({})", e, e.code()).into())
        }
    }
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `logging.level`. Logs go to stderr unless
/// `logging.file` is set, in which case they are appended there.
fn init_tracing(logging: &LoggingConfig) -> std::io::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}
