use clap::{Parser, Subcommand};
use qr_roster::credentials::{self, QrPngEncoder};
use qr_roster::import::{self, ColumnLayout};
use qr_roster::{config, output, reconcile, store};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "qr-roster")]
#[command(about = "Employee directory import and QR credential manager")]
#[command(long_about = "\
Employee directory import and QR credential manager

Spreadsheet exports are reconciled into a JSON store. Every employee keeps
the UUID it was first given; that id is printed inside a QR credential that
links to the lookup page.

Working directory layout:

  ./
  ├── qr-roster.toml      # Optional config (see gen-config)
  ├── empleados.json      # Canonical store, rewritten by import
  └── qr_codes/           # <NAME>.png credentials, added to by generate
      └── .credential-ledger.json

Typical cycle:
  qr-roster import plantilla.xlsx     # merge the latest sheet into the store
  qr-roster generate                  # write credentials for new employees
  qr-roster check                     # list missing/orphaned, verify ids

Existing credentials are never overwritten or deleted.

Run 'qr-roster gen-config' to generate a documented qr-roster.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding qr-roster.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// More diagnostics on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reconcile a spreadsheet export into the store
    Import {
        /// Spreadsheet to import (.xlsx, .xls, .ods)
        source: PathBuf,
        /// Store to write (default from config)
        store: Option<PathBuf>,
        /// Column layout of the spreadsheet (default from config)
        #[arg(long, value_enum)]
        layout: Option<ColumnLayout>,
    },
    /// Write credentials for records that have none
    Generate {
        /// Store to read (default from config)
        store: Option<PathBuf>,
        /// Credential directory (default from config)
        dir: Option<PathBuf>,
        /// Lookup page encoded into new credentials (default from config)
        base_url: Option<String>,
    },
    /// Classify credentials and verify embedded ids, writing nothing
    Check {
        /// Store to read (default from config)
        store: Option<PathBuf>,
        /// Credential directory (default from config)
        dir: Option<PathBuf>,
    },
    /// List the lookup URL of every record
    Urls {
        /// Store to read (default from config)
        store: Option<PathBuf>,
        /// Lookup page (default from config)
        base_url: Option<String>,
    },
    /// Print a stock qr-roster.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_dir = cli.config_dir;
    let load_config = || config::load_config(&config_dir);

    match cli.command {
        Command::Import {
            source,
            store: store_path,
            layout,
        } => {
            let config = load_config()?;
            let store_path = store_path.unwrap_or_else(|| PathBuf::from(&config.store));
            let layout = layout.unwrap_or(config.import.layout);

            let sheet = import::read_sheet(&source, layout)?;
            let existing = store::load_optional(&store_path)?;
            let result = reconcile::reconcile(
                &sheet.rows,
                existing.as_deref(),
                &config.reconcile_options(),
            );
            store::save(&store_path, &result.records)?;
            output::print_import_report(
                &result.report,
                sheet.ignored,
                &store_path,
                result.records.len(),
            );
        }
        Command::Generate {
            store: store_path,
            dir,
            base_url,
        } => {
            let config = load_config()?;
            let store_path = store_path.unwrap_or_else(|| PathBuf::from(&config.store));
            let dir = dir.unwrap_or_else(|| PathBuf::from(&config.credentials_dir));
            let base_url = resolve_base_url(base_url, &config)?;

            let records = store::load(&store_path)?;
            let outcome = credentials::sync(&QrPngEncoder::new(), &records, &dir, &base_url)?;
            output::print_generate_output(&outcome, &records, &dir);
        }
        Command::Check {
            store: store_path,
            dir,
        } => {
            let config = load_config()?;
            let store_path = store_path.unwrap_or_else(|| PathBuf::from(&config.store));
            let dir = dir.unwrap_or_else(|| PathBuf::from(&config.credentials_dir));

            let records = store::load(&store_path)?;
            let decoder = credentials::default_decoder();
            let outcome = credentials::check(decoder.as_ref(), &records, &dir)?;
            output::print_check_output(&outcome, &records, &dir);
        }
        Command::Urls {
            store: store_path,
            base_url,
        } => {
            let config = load_config()?;
            let store_path = store_path.unwrap_or_else(|| PathBuf::from(&config.store));
            let base_url = resolve_base_url(base_url, &config)?;

            let records = store::load(&store_path)?;
            output::print_urls(&records, &base_url);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Diagnostics go to stderr so stdout stays the report.
///
/// `RUST_LOG` wins when set; otherwise `-v` flags pick the level.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "qr_roster=info,warn",
        _ => "qr_roster=debug,info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// A base URL given on the command line goes through the same check as
/// the configured one.
fn resolve_base_url(
    cli_value: Option<String>,
    roster: &config::RosterConfig,
) -> Result<String, config::ConfigError> {
    let Some(url) = cli_value else {
        return Ok(roster.base_url.trim().to_string());
    };
    let overridden = config::RosterConfig {
        base_url: url,
        ..roster.clone()
    };
    overridden.validate()?;
    Ok(overridden.base_url.trim().to_string())
}
