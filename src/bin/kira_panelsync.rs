use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use kira_panelsync::app::{App, InitResult};
use kira_panelsync::config::{ConfigLoader, ResolvedConfig};
use kira_panelsync::domain::PanelId;
use kira_panelsync::error::KiraError;
use kira_panelsync::output::{JsonOutput, OutputMode, TextOutput};
use kira_panelsync::panelapp::{CatalogClient, CatalogGene, CatalogPanel, PanelAppHttpClient};
use kira_panelsync::snapshot::SnapshotFiles;
use kira_panelsync::store::SqliteStore;

#[derive(Parser)]
#[command(name = "kira-panelsync")]
#[command(about = "Sync PanelApp gene panels into the laboratory database")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true, help = "Path to kira-panelsync.json")]
    config: Option<String>,

    #[arg(long, global = true, help = "Print results as JSON on stdout")]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Fetch every panel from PanelApp into dated snapshot files")]
    Fetch(FetchArgs),
    #[command(about = "Load snapshot files into the database")]
    Load(LoadArgs),
    #[command(about = "Compare stored panel genes with a symbol snapshot")]
    Audit(AuditArgs),
    #[command(about = "Create the database schema in a local SQLite file")]
    InitDb(DatabaseArgs),
}

#[derive(Args)]
struct FetchArgs {
    #[arg(long)]
    output_dir: Option<Utf8PathBuf>,
}

#[derive(Args)]
struct DatabaseArgs {
    #[arg(long)]
    database: Option<Utf8PathBuf>,
}

#[derive(Args)]
struct LoadArgs {
    #[command(flatten)]
    db: DatabaseArgs,

    #[arg(long, help = "Identifier snapshot (defaults to today's file)")]
    identifiers: Option<Utf8PathBuf>,

    #[arg(long, help = "Symbol snapshot (defaults to today's file)")]
    symbols: Option<Utf8PathBuf>,
}

#[derive(Args)]
struct AuditArgs {
    #[command(flatten)]
    db: DatabaseArgs,

    #[arg(long)]
    symbols: Option<Utf8PathBuf>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(kira) = report.downcast_ref::<KiraError>() {
            return ExitCode::from(map_exit_code(kira));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &KiraError) -> u8 {
    match error {
        KiraError::ConfigRead(_)
        | KiraError::ConfigParse(_)
        | KiraError::SnapshotParse { .. }
        | KiraError::InvalidVersion(_)
        | KiraError::InvalidTier(_) => 2,
        KiraError::CatalogHttp(_)
        | KiraError::CatalogStatus { .. }
        | KiraError::CatalogDecode(_) => 3,
        KiraError::Database(_)
        | KiraError::MissingCategory(_)
        | KiraError::MissingVersionItem(_)
        | KiraError::MissingPanelItem(_) => 4,
        KiraError::Filesystem(_) => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };
    let mut config = ConfigLoader::resolve(cli.config.as_deref())?;

    match cli.command {
        Command::Fetch(args) => {
            if let Some(dir) = args.output_dir {
                config.output_dir = dir;
            }
            let client = PanelAppHttpClient::new(config.catalog.clone())?;
            let app = App::new(config, client);
            let files = app.snapshot_files();
            match output_mode {
                OutputMode::Json => {
                    let result = app.fetch(&files, &JsonOutput)?;
                    JsonOutput::print_fetch(&result).into_diagnostic()?;
                }
                OutputMode::Text => {
                    let result = app.fetch(&files, &TextOutput)?;
                    TextOutput::print_fetch(&result);
                }
            }
            Ok(())
        }
        Command::Load(args) => {
            apply_database(&mut config, args.db);
            let files = resolve_files(&config, args.identifiers, args.symbols);
            let store = SqliteStore::open(&config.database)?;
            let app = App::new(config, NopCatalog);
            match output_mode {
                OutputMode::Json => {
                    let result = app.load(&store, &files, &JsonOutput)?;
                    JsonOutput::print_load(&result).into_diagnostic()?;
                }
                OutputMode::Text => {
                    let result = app.load(&store, &files, &TextOutput)?;
                    TextOutput::print_load(&result);
                }
            }
            Ok(())
        }
        Command::Audit(args) => {
            apply_database(&mut config, args.db);
            let files = resolve_files(&config, None, args.symbols);
            let store = SqliteStore::open(&config.database)?;
            let app = App::new(config, NopCatalog);
            match output_mode {
                OutputMode::Json => {
                    let report = app.audit(&store, &files.symbols, &JsonOutput)?;
                    JsonOutput::print_audit(&report).into_diagnostic()?;
                }
                OutputMode::Text => {
                    let report = app.audit(&store, &files.symbols, &TextOutput)?;
                    TextOutput::print_audit(&report);
                }
            }
            Ok(())
        }
        Command::InitDb(args) => {
            apply_database(&mut config, args);
            let store = SqliteStore::open(&config.database)?;
            store.ensure_schema()?;
            let result = InitResult {
                database: config.database.to_string(),
            };
            match output_mode {
                OutputMode::Json => JsonOutput::print_init(&result).into_diagnostic()?,
                OutputMode::Text => TextOutput::print_init(&result),
            }
            Ok(())
        }
    }
}

fn apply_database(config: &mut ResolvedConfig, args: DatabaseArgs) {
    if let Some(database) = args.database {
        config.database = database;
    }
}

fn resolve_files(
    config: &ResolvedConfig,
    identifiers: Option<Utf8PathBuf>,
    symbols: Option<Utf8PathBuf>,
) -> SnapshotFiles {
    let today = SnapshotFiles::today(&config.output_dir);
    SnapshotFiles {
        identifiers: identifiers.unwrap_or(today.identifiers),
        symbols: symbols.unwrap_or(today.symbols),
    }
}

struct NopCatalog;

impl CatalogClient for NopCatalog {
    fn list_panels(&self) -> Result<Vec<CatalogPanel>, KiraError> {
        Err(KiraError::CatalogHttp(
            "catalog client not configured".to_string(),
        ))
    }

    fn panel_genes(&self, _panel_id: &PanelId) -> Result<Vec<CatalogGene>, KiraError> {
        Err(KiraError::CatalogHttp(
            "catalog client not configured".to_string(),
        ))
    }
}
