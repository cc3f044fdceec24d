// Entry point and high-level CLI flow.
//
// - `summary` (the default) loads the newest export, prints the three-week
//   summary and optionally exports it.
// - `clients` lists the deduplicated going-live and active clients of the
//   selected week in worksheet order.
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use oe_weekly::loader::{find_latest_workbook, load_and_clean};
use oe_weekly::util::format_int;
use oe_weekly::{
    client_listing, generate_summary, output, week_ranges, EnrollmentRow, LivesBasis,
    ReportConfig, WeekMode, WeekWindow,
};

#[derive(Parser)]
#[command(name = "oe-weekly")]
#[command(about = "Last/this/next week open enrollment summary from a spreadsheet export", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    report: ReportArgs,

    /// Log debug details (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print the three-week summary (default)
    Summary,
    /// List deduplicated going-live and active clients for this week
    Clients,
}

#[derive(Args)]
struct ReportArgs {
    /// Workbook to read (default: newest spreadsheet in the current directory)
    #[arg(short, long, value_name = "FILE", global = true)]
    input: Option<PathBuf>,

    /// Worksheet holding the enrollment rows
    #[arg(short, long, global = true)]
    sheet: Option<String>,

    /// First day of "this week" (YYYY-MM-DD), normally a Monday
    #[arg(long, value_name = "DATE", global = true)]
    start: Option<NaiveDate>,

    /// Last day of "this week" (YYYY-MM-DD), normally a Sunday
    #[arg(long, value_name = "DATE", global = true)]
    end: Option<NaiveDate>,

    /// Reference date for automatic week selection instead of today
    #[arg(long, value_name = "DATE", global = true, conflicts_with_all = ["start", "end"])]
    as_of: Option<NaiveDate>,

    /// Export the summary (.xlsx, .csv or .json)
    #[arg(short, long, value_name = "FILE", global = true)]
    export: Option<PathBuf>,

    /// Add per-week going/active/completed sheets to an .xlsx export
    #[arg(long, global = true)]
    detail: bool,

    /// Rows counted by the lives metrics
    #[arg(long, value_enum, global = true)]
    lives_basis: Option<BasisArg>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum BasisArg {
    /// Every population segment in the window
    Rows,
    /// One segment per client, after deduplication
    Clients,
}

impl From<BasisArg> for LivesBasis {
    fn from(arg: BasisArg) -> Self {
        match arg {
            BasisArg::Rows => LivesBasis::Rows,
            BasisArg::Clients => LivesBasis::Clients,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn load_config(args: &ReportArgs, cwd: &Path) -> Result<ReportConfig> {
    let mut config = ReportConfig::discover(args.config.as_deref(), cwd)
        .context("Failed to load configuration")?;
    if let Some(sheet) = &args.sheet {
        config.sheet_name = sheet.clone();
    }
    if let Some(basis) = args.lives_basis {
        config.lives_basis = basis.into();
    }
    Ok(config)
}

fn load_rows(args: &ReportArgs, config: &ReportConfig, cwd: &Path) -> Result<Vec<EnrollmentRow>> {
    let input = match &args.input {
        Some(path) => path.clone(),
        None => find_latest_workbook(cwd)?,
    };
    log::info!("Using workbook: {}", input.display());

    let (rows, report) = load_and_clean(&input, config)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    log::info!(
        "Loaded {} rows ({} usable) from sheet '{}'",
        format_int(report.total_rows),
        format_int(report.retained_rows),
        config.sheet_name
    );
    log::debug!(
        "Dropped rows: {} without client id, {} without dates, {} with end before start",
        report.missing_client_id,
        report.missing_dates,
        report.inverted_windows
    );
    Ok(rows)
}

fn select_weeks(args: &ReportArgs) -> Result<[WeekWindow; 3]> {
    let mode = WeekMode::from_bounds(args.start, args.end, args.as_of)?;
    let windows = week_ranges(mode, Local::now().date_naive())?;
    Ok(windows)
}

fn run_summary(args: &ReportArgs, config: &ReportConfig, cwd: &Path) -> Result<()> {
    let windows = select_weeks(args)?;
    let rows = load_rows(args, config, cwd)?;
    let summary = generate_summary(&rows, &windows, config.lives_basis);

    output::print_summary(&summary);

    match &args.export {
        Some(path) => {
            output::export(path, &summary, args.detail)
                .with_context(|| format!("Failed to export {}", path.display()))?;
            log::info!("Summary exported to {}", path.display());
        }
        None => {
            if args.detail {
                log::warn!("--detail has no effect without --export");
            }
            println!("(No file exported, terminal output only.)\n");
        }
    }
    Ok(())
}

/// Flags given on the command line that only the summary export reads.
fn summary_only_flags(args: &ReportArgs) -> Vec<&'static str> {
    let mut flags = Vec::new();
    if args.export.is_some() {
        flags.push("--export");
    }
    if args.detail {
        flags.push("--detail");
    }
    flags
}

fn run_clients(args: &ReportArgs, config: &ReportConfig, cwd: &Path) -> Result<()> {
    for flag in summary_only_flags(args) {
        log::warn!("{flag} has no effect on the clients listing");
    }
    let [_, this_week, _] = select_weeks(args)?;
    let rows = load_rows(args, config, cwd)?;
    let listing = client_listing(&rows, &this_week);
    output::print_listing(&listing);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cwd = std::env::current_dir().context("Failed to resolve the working directory")?;
    let config = load_config(&cli.report, &cwd)?;

    match cli.command.unwrap_or(Command::Summary) {
        Command::Summary => run_summary(&cli.report, &config, &cwd),
        Command::Clients => run_clients(&cli.report, &config, &cwd),
    }
}
