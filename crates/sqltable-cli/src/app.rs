//! CLI application logic
//!
//! Argument parsing, settings and logging setup, and one function per
//! subcommand. The command functions are public so they can be driven
//! without going through argument parsing.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use sqltable_core::{
    generate_table, render_document, Diagnostics, Driver, Rendered, Settings, SqlTableDirective,
    SqlTableRunner,
};
use sqltable_data::{
    Connection, CsvOptions, ImportLog, LoadReport, SheetImporter, Verbosity, Workbook,
};

/// Output format for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text on stderr
    #[default]
    Text,
    /// JSON array on stderr, for tools
    Json,
}

#[derive(Parser)]
#[command(name = "sqltable")]
#[command(author, version, about = "Tables from SQL queries over spreadsheets", long_about = None)]
struct Cli {
    /// Configuration file (default: nearest sqltable.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More logging; repeat for trace output
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import every sheet of a workbook (or a CSV file) into SQLite
    Import {
        /// Input .xlsx/.xls/.ods/.csv/.tsv file
        input: PathBuf,

        /// Database file to create the tables in (default: in-memory)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Zero-based row holding the column names
        #[arg(long)]
        header_row: Option<usize>,
    },

    /// Run one query against a source and print an AsciiDoc table
    Query {
        /// Spreadsheet, CSV file or SQLite database
        source: PathBuf,

        #[command(flatten)]
        args: QueryArgs,
    },

    /// Expand every sql-table directive in a document
    Render {
        /// Input document
        input: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Diagnostics format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Exit with an error if any directive failed
        #[arg(long)]
        strict: bool,
    },
}

/// Directive options for the `query` subcommand
#[derive(Debug, Clone, Default, clap::Args)]
pub struct QueryArgs {
    /// SQL query
    #[arg(long)]
    pub sql: String,

    /// xlsx, csv or sqlite (default: from the file extension)
    #[arg(short, long)]
    pub driver: Option<String>,

    /// Comma-separated header labels
    #[arg(long)]
    pub header: Option<String>,

    /// Relative column widths, e.g. "2 1 1"
    #[arg(long)]
    pub widths: Option<String>,

    /// Number of leading stub columns
    #[arg(long, default_value_t = 0)]
    pub stub_columns: usize,

    /// Table caption
    #[arg(short, long)]
    pub title: Option<String>,

    /// Space-separated table classes
    #[arg(long)]
    pub class: Option<String>,
}

/// Run the CLI application
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let start_dir = match &cli.command {
        Commands::Render { input, .. } => document_dir(input),
        _ => PathBuf::from("."),
    };
    let mut settings = load_settings(cli.config.as_deref(), &start_dir)?;
    apply_verbosity(&mut settings, cli.verbose, cli.quiet);
    init_logging(&settings.log.level);
    debug!(?settings, "settings resolved");

    match cli.command {
        Commands::Import {
            input,
            db,
            header_row,
        } => {
            import_command(&input, db.as_deref(), header_row, &settings)?;
        }
        Commands::Query { source, args } => {
            let table = query_command(&source, &args, &settings)?;
            print!("{}", table);
        }
        Commands::Render {
            input,
            output,
            format,
            strict,
        } => {
            render_command(&input, output.as_deref(), format, strict, &settings)?;
        }
    }

    Ok(())
}

/// Install the stderr subscriber. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // a host program may already have installed a subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Settings from `config`, or the nearest `sqltable.toml` above `start_dir`
pub fn load_settings(config: Option<&Path>, start_dir: &Path) -> Result<Settings> {
    match config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display())),
        None => Settings::discover(start_dir).context("Failed to load sqltable.toml"),
    }
}

fn apply_verbosity(settings: &mut Settings, verbose: u8, quiet: bool) {
    if quiet {
        settings.import.verbosity = Verbosity::Quiet;
        settings.log.level = "warn".to_string();
    } else if verbose > 0 {
        settings.import.verbosity = Verbosity::Verbose;
        settings.log.level = if verbose > 1 { "trace" } else { "debug" }.to_string();
    }
}

/// Execute the import command
pub fn import_command(
    input: &Path,
    db: Option<&Path>,
    header_row: Option<usize>,
    settings: &Settings,
) -> Result<LoadReport> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let workbook = read_workbook(input, settings)?;
    let conn = match db {
        Some(path) => Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?,
        None => Connection::open_in_memory().context("Failed to open in-memory database")?,
    };

    let mut options = settings.import.to_options();
    if let Some(row) = header_row {
        options.header_row = row;
    }

    let mut importer = SheetImporter::with_connection(conn)
        .with_options(options)
        .with_log(ImportLog::new(settings.import.verbosity));
    let report = importer
        .load(&workbook, None)
        .with_context(|| format!("Failed to import {}", input.display()))?;

    println!(
        "Imported {} sheet(s) from {}",
        report.sheets.len(),
        input.display()
    );
    for sheet in &report.sheets {
        println!("  {}: {} rows", sheet.sheet, sheet.rows);
    }
    if let Some(path) = db {
        println!("  Database: {}", path.display());
    }

    Ok(report)
}

fn read_workbook(input: &Path, settings: &Settings) -> Result<Workbook> {
    let csv = |options: CsvOptions| {
        Workbook::from_csv(input, options)
            .with_context(|| format!("Failed to read CSV file: {}", input.display()))
    };

    match extension(input).as_deref() {
        Some("csv") => csv(settings.csv.to_options()?),
        Some("tsv") => csv(CsvOptions {
            delimiter: b'\t',
            ..settings.csv.to_options()?
        }),
        _ => Workbook::open(input)
            .with_context(|| format!("Failed to open workbook: {}", input.display())),
    }
}

/// Execute the query command, returning the generated AsciiDoc
pub fn query_command(source: &Path, args: &QueryArgs, settings: &Settings) -> Result<String> {
    let mut directive = SqlTableDirective {
        title: args.title.clone(),
        source: Some(source.to_string_lossy().into_owned()),
        stub_columns: args.stub_columns,
        ..Default::default()
    };
    directive.set_option("sql", args.sql.trim())?;

    let driver = match &args.driver {
        Some(name) => name.parse()?,
        None => driver_for(source).unwrap_or(settings.directive.driver),
    };
    directive.driver = Some(driver);
    if let Some(header) = &args.header {
        directive.set_option("header", header)?;
    }
    if let Some(widths) = &args.widths {
        directive.set_option("widths", widths)?;
    }
    if let Some(class) = &args.class {
        directive.set_option("class", class)?;
    }

    // sources on the command line are relative to the working directory
    let mut settings = settings.clone();
    settings.directive.base_dir = None;
    let runner = SqlTableRunner::new(".", &settings);

    let table = runner
        .run(&directive)
        .with_context(|| format!("Query against {} failed", source.display()))?;
    Ok(generate_table(&table))
}

/// Execute the render command
pub fn render_command(
    input: &Path,
    output: Option<&Path>,
    format: OutputFormat,
    strict: bool,
    settings: &Settings,
) -> Result<Rendered> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;

    let mut rendered = render_document(&text, &document_dir(input), settings);
    rendered.diagnostics.set_file(&input.display().to_string());

    match output {
        Some(path) => {
            fs::write(path, &rendered.text)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            info!(output = %path.display(), directives = rendered.directives, "document rendered");
        }
        None => print!("{}", rendered.text),
    }

    report_diagnostics(&rendered.diagnostics, format)?;

    if strict && rendered.diagnostics.has_errors() {
        anyhow::bail!(
            "{} of {} directive(s) failed",
            rendered.diagnostics.error_count(),
            rendered.directives
        );
    }

    Ok(rendered)
}

fn report_diagnostics(diagnostics: &Diagnostics, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let list: Vec<_> = diagnostics.iter().collect();
            let json = serde_json::to_string_pretty(&list)
                .context("Failed to serialize diagnostics to JSON")?;
            eprintln!("{}", json);
        }
        OutputFormat::Text => {
            for diag in diagnostics.iter() {
                eprintln!("{}", diag);
            }
        }
    }
    Ok(())
}

/// Driver implied by a file extension
fn driver_for(path: &Path) -> Option<Driver> {
    match extension(path)?.as_str() {
        "csv" => Some(Driver::Csv),
        "db" | "sqlite" | "sqlite3" => Some(Driver::Sqlite),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Driver::Xlsx),
        _ => None,
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

/// Directory of a document, `.` for a bare file name
fn document_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
