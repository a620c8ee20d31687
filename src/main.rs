//! CLI entry point for the learning modalities analyzer.
//!
//! Provides one-shot subcommands (`dates`, `state`, `district`) and the interactive menu that
//! runs when no subcommand is given.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use learning_modalities::download::DEFAULT_DATASET_URL;
use learning_modalities::ingestion::{
    CompositeObserver, FileObserver, IngestionObserver, IngestionOptions, TracingObserver, has_required_columns,
    ingest_from_path,
};
use learning_modalities::processing::{available_weeks, filter_by_zip};
use learning_modalities::report::{DistrictReport, StateReport};
use learning_modalities::types::{DataSet, ReportingWeek, StateFilter, ZipCode};
use learning_modalities::validate::parse_date;

#[derive(Parser)]
#[command(name = "learning-modalities")]
#[command(about = "Query U.S. school learning modalities by state, zip code, and week", long_about = None)]
struct Cli {
    /// Path to the learning-modality CSV export
    #[arg(long, env = "LEARNING_MODALITIES_DATA", default_value = "data.csv", global = true)]
    data: PathBuf,

    /// Download the export to --data if the file does not exist
    #[arg(long, default_value_t = false, global = true)]
    download: bool,

    /// URL to download the export from
    #[arg(long, env = "LEARNING_MODALITIES_URL", default_value = DEFAULT_DATASET_URL, global = true)]
    url: String,

    /// Append a JSON line per dataset load (success, failure, alert) to this file
    #[arg(long, env = "LEARNING_MODALITIES_INGEST_LOG", global = true)]
    ingest_log: Option<PathBuf>,

    /// Output format for one-shot subcommands
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List reporting weeks, newest first
    Dates,
    /// Learning modality by state on a date
    State {
        /// Two-letter state code, or "all"
        #[arg(short, long, value_parser = parse_state_arg)]
        state: StateFilter,

        /// Reporting week (MM/DD/YYYY)
        #[arg(short, long, value_parser = parse_week_arg)]
        date: ReportingWeek,
    },
    /// Learning modality of a school district by zip code on a date
    District {
        /// Five-digit zip code
        #[arg(short, long, value_parser = parse_zip_arg)]
        zip: ZipCode,

        /// Reporting week (MM/DD/YYYY)
        #[arg(short, long, value_parser = parse_week_arg)]
        date: ReportingWeek,
    },
    /// Menu-driven session (default)
    Interactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_state_arg(s: &str) -> Result<StateFilter, String> {
    StateFilter::parse(s).ok_or_else(|| format!("invalid state code '{s}' (expected e.g. CA, MO, or 'all')"))
}

fn parse_week_arg(s: &str) -> Result<ReportingWeek, String> {
    parse_date(s)
        .map(ReportingWeek::from_date)
        .ok_or_else(|| format!("invalid date '{s}' (expected MM/DD/YYYY)"))
}

fn parse_zip_arg(s: &str) -> Result<ZipCode, String> {
    s.trim()
        .parse::<u32>()
        .ok()
        .and_then(ZipCode::new)
        .ok_or_else(|| format!("invalid zip code '{s}' (expected 10000-99999)"))
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(env).with_writer(io::stderr).init();

    let cli = Cli::parse();
    let observer = ingestion_observer(cli.ingest_log.as_deref())?;
    let stdin = io::stdin();
    let stdout = io::stdout();

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Interactive => {
            let mut session = Session::new(stdin.lock(), stdout.lock());
            writeln!(session.output, "Learning Modalities Analyzer")?;
            if cli.download && !cli.data.exists() {
                fetch(&cli.url, &cli.data)?;
            }
            let data = session.resolve_data_file(&cli.data, &cli.url)?;
            let ds = load(&data, observer)?;
            session.run(&ds)?;
        }
        command => {
            let data = resolve_data_file(&cli.data, cli.download, &cli.url)?;
            let ds = load(&data, observer)?;
            run_command(&ds, command, cli.format, &mut stdout.lock())?;
        }
    }

    Ok(())
}

/// Load events always go to `tracing`; `--ingest-log` adds a JSON-lines file.
fn ingestion_observer(ingest_log: Option<&Path>) -> Result<Arc<dyn IngestionObserver>> {
    let Some(log) = ingest_log else {
        return Ok(Arc::new(TracingObserver));
    };
    let file = FileObserver::create(log).with_context(|| format!("opening ingest log {}", log.display()))?;
    Ok(Arc::new(
        CompositeObserver::default()
            .with(Arc::new(TracingObserver))
            .with(Arc::new(file)),
    ))
}

fn load(path: &Path, observer: Arc<dyn IngestionObserver>) -> Result<DataSet> {
    let opts = IngestionOptions {
        observer: Some(observer),
        ..Default::default()
    };
    ingest_from_path(path, &opts).with_context(|| format!("loading {}", path.display()))
}

/// Check the data file for one-shot subcommands, downloading it if asked to.
fn resolve_data_file(path: &Path, download: bool, url: &str) -> Result<PathBuf> {
    if !path.is_file() {
        if !download {
            bail!(
                "data file {} not found (pass --download to fetch it)",
                path.display()
            );
        }
        fetch(url, path)?;
    }
    if !has_required_columns(path) {
        bail!("{} is not a learning-modality CSV export", path.display());
    }
    Ok(path.to_path_buf())
}

/// Download the export, drawing progress on a single stderr line.
#[cfg(feature = "download")]
fn fetch(url: &str, path: &Path) -> Result<()> {
    let mut stderr = io::stderr();
    let result = learning_modalities::download::download_dataset(url, path, |progress| {
        let _ = write!(stderr, "\rDownloading {}: {progress}   ", path.display());
        let _ = stderr.flush();
    });
    eprintln!();
    result.with_context(|| format!("downloading {url}"))?;
    Ok(())
}

#[cfg(not(feature = "download"))]
fn fetch(_url: &str, path: &Path) -> Result<()> {
    bail!(
        "cannot download {}: built without the `download` feature",
        path.display()
    )
}

fn run_command<W: Write>(ds: &DataSet, command: Command, format: OutputFormat, out: &mut W) -> Result<()> {
    match command {
        Command::Dates => {
            let weeks: Vec<String> = available_weeks(ds).iter().map(ToString::to_string).collect();
            match format {
                OutputFormat::Text => {
                    for week in &weeks {
                        writeln!(out, "{week}")?;
                    }
                }
                OutputFormat::Json => emit_json(out, &weeks)?,
            }
        }
        Command::State { state, date } => {
            let report = StateReport::build(ds, state, date);
            match format {
                OutputFormat::Text => writeln!(out, "{report}")?,
                OutputFormat::Json => emit_json(out, &report)?,
            }
        }
        Command::District { zip, date } => {
            let report = district_report(ds, zip, date);
            match (format, report) {
                (OutputFormat::Text, Some(report)) => writeln!(out, "{report}")?,
                (OutputFormat::Text, None) => writeln!(out, "No data found for the given zip code and date.")?,
                (OutputFormat::Json, report) => emit_json(out, &report)?,
            }
        }
        Command::Interactive => unreachable!("interactive sessions are dispatched in main"),
    }
    Ok(())
}

fn emit_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn district_report(ds: &DataSet, zip: ZipCode, week: ReportingWeek) -> Option<DistrictReport> {
    let rows = filter_by_zip(ds, zip, week);
    if rows.len() > 1 {
        warn!(%zip, %week, matches = rows.len(), "multiple districts share this zip code; reporting the first");
    }
    DistrictReport::from_rows(&rows)
}

/// Interactive menu session over any line-oriented input and output.
struct Session<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn prompt(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("input closed");
        }
        Ok(line.trim().to_string())
    }

    /// Prompt until `accept` returns a value.
    fn prompt_until<T>(
        &mut self,
        prompt: &str,
        error_message: &str,
        mut accept: impl FnMut(&str) -> Option<T>,
    ) -> Result<T> {
        loop {
            let answer = self.prompt(prompt)?;
            if let Some(value) = accept(&answer) {
                return Ok(value);
            }
            writeln!(self.output, "{error_message}")?;
        }
    }

    fn yes_no(&mut self, prompt: &str) -> Result<bool> {
        self.prompt_until(prompt, "Invalid choice. Please enter 'y' or 'n'.", |s| {
            match s.to_ascii_lowercase().as_str() {
                "y" => Some(true),
                "n" => Some(false),
                _ => None,
            }
        })
    }

    /// Use `path` when it is a valid export; otherwise offer to download it or ask for another.
    fn resolve_data_file(&mut self, path: &Path, url: &str) -> Result<PathBuf> {
        let mut path = path.to_path_buf();
        loop {
            if path.is_file() {
                if has_required_columns(&path) {
                    return Ok(path);
                }
                writeln!(self.output, "Invalid file. Please try again.")?;
            } else if self.yes_no("File not found. Would you like to download it to this location (y/n)? ")? {
                match fetch(url, &path) {
                    Ok(()) => continue,
                    Err(e) => writeln!(self.output, "Download failed: {e:#}")?,
                }
            } else {
                writeln!(self.output, "File will not be downloaded. Please enter a valid file path.")?;
            }
            path = PathBuf::from(self.prompt("Data file path: ")?);
        }
    }

    fn run(&mut self, ds: &DataSet) -> Result<()> {
        loop {
            writeln!(self.output, "Data analysis options:\n")?;
            writeln!(self.output, "1. List dates")?;
            writeln!(self.output, "2. Learning modality by state on date")?;
            writeln!(self.output, "3. Learning modality by zip code on date")?;
            writeln!(self.output, "4. Exit\n")?;

            let choice = self.prompt_until(
                "Enter the number of the option (1, 2, 3, or 4): ",
                "Invalid choice. Please try again.",
                |s| s.parse::<u8>().ok().filter(|c| (1..=4).contains(c)),
            )?;
            match choice {
                1 => self.list_dates(ds)?,
                2 => self.by_state(ds)?,
                3 => self.by_zip(ds)?,
                _ => {
                    writeln!(self.output, "Goodbye")?;
                    info!("session ended");
                    return Ok(());
                }
            }
        }
    }

    fn date_prompt(&mut self) -> Result<ReportingWeek> {
        self.prompt_until("Enter a date (MM/DD/YYYY): ", "Invalid date.", |s| {
            parse_date(s).map(ReportingWeek::from_date)
        })
    }

    fn list_dates(&mut self, ds: &DataSet) -> Result<()> {
        for week in available_weeks(ds) {
            writeln!(self.output, "{week}")?;
        }
        Ok(())
    }

    fn by_state(&mut self, ds: &DataSet) -> Result<()> {
        loop {
            writeln!(
                self.output,
                "Enter the two digit code (CA, MO, IL, TX, etc.) for a state or 'all' for all states."
            )?;
            let state = self.prompt_until("State (2 letter code or 'all'): ", "Invalid state code.", StateFilter::parse)?;
            let week = self.date_prompt()?;
            writeln!(self.output, "{}", StateReport::build(ds, state, week))?;

            if !self.yes_no("Would you like to continue? (y/n): ")? {
                return Ok(());
            }
        }
    }

    fn by_zip(&mut self, ds: &DataSet) -> Result<()> {
        loop {
            writeln!(self.output, "Enter the zip code and date to get information about a school district.")?;
            let zip = self.prompt_until("Enter a zip code: ", "Invalid zip code.", |s| {
                s.parse::<u32>().ok().and_then(ZipCode::new)
            })?;
            let week = self.date_prompt()?;

            match district_report(ds, zip, week) {
                Some(report) => writeln!(self.output, "{report}")?,
                None => writeln!(self.output, "No data found for the given zip code and date.")?,
            }

            if !self.yes_no("Would you like to get information for another school district (y/n)? ")? {
                return Ok(());
            }
        }
    }
}
