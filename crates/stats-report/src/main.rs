use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, error};

mod config;
mod derive;
mod discovery;
mod format;
mod parquet_stats;
mod parquet_writer;
mod report;
mod run;

use config::{RunConfig, DEFAULT_COMPONENTS, DEFAULT_FREQUENCY_HZ};
use discovery::{discover, DEFAULT_FILE_NAME};
use parquet_writer::ReportWriter;
use report::Report;

/// Derive per-component metrics from simulator stats dumps
#[derive(Debug, Parser)]
#[command(name = "stats-report")]
struct Command {
    /// Directory searched recursively for stats files
    root: PathBuf,

    /// Fraction of checkpoints, from the start, excluded from windowed metrics
    #[arg(short, long, default_value_t = 0.0)]
    warmup: f64,

    /// Clock frequency of the simulated system in Hz
    #[arg(long, default_value_t = DEFAULT_FREQUENCY_HZ)]
    frequency_hz: f64,

    /// Print magnitude-scaled numbers (23.1M, 4.0K, 12.50%) instead of raw values
    #[arg(short, long)]
    pretty: bool,

    /// Components to report, in order
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_COMPONENTS.iter().map(|c| c.to_string()))]
    components: Vec<String>,

    /// Name of the stats file to look for
    #[arg(long, default_value = DEFAULT_FILE_NAME)]
    file_name: String,

    /// Also write every metric, unscaled, to this Parquet file
    #[arg(long)]
    parquet_out: Option<PathBuf>,

    /// Verbose debug output
    #[arg(short, long)]
    verbose: bool,
}

impl Command {
    fn run_config(&self) -> Result<RunConfig> {
        RunConfig::new(&self.components, self.warmup, self.frequency_hz, self.pretty)
            .with_context(|| "Invalid configuration")
    }
}

/// Analyzes one stats file. The file is closed before this returns.
fn process_file(path: &Path, config: &RunConfig) -> Result<Report> {
    let stats = parquet_stats::load(path)?;
    run::analyze(&stats, path.display().to_string(), config)
}

/// Reports on every file in turn, writing each report only once it is complete.
///
/// Returns the finished reports and the number of files that were aborted.
fn process_files<W: Write>(
    files: &[PathBuf],
    config: &RunConfig,
    out: &mut W,
) -> Result<(Vec<Report>, usize)> {
    let mut reports = Vec::new();
    let mut failed = 0;

    for path in files {
        match process_file(path, config) {
            Ok(report) => {
                out.write_all(report.render(config).as_bytes())
                    .with_context(|| "Failed to write report")?;
                out.flush().with_context(|| "Failed to flush report")?;
                reports.push(report);
            }
            Err(e) => {
                error!("Aborting {}: {:#}", path.display(), e);
                failed += 1;
            }
        }
    }

    Ok((reports, failed))
}

fn write_parquet(path: &Path, reports: &[Report]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = ReportWriter::new(file)?;
    for report in reports {
        writer.write(report)?;
    }
    writer.close()
}

fn main() -> Result<()> {
    let opts = Command::parse();

    let default_filter = if opts.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = opts.run_config()?;

    let files = discover(&opts.root, &opts.file_name)?;
    debug!(
        "Found {} {} file(s) under {}",
        files.len(),
        opts.file_name,
        opts.root.display()
    );

    let stdout = io::stdout();
    let (reports, failed) = process_files(&files, &config, &mut stdout.lock())?;

    if let Some(path) = &opts.parquet_out {
        write_parquet(path, &reports)?;
    }

    if failed > 0 {
        bail!("{} of {} stats files could not be analyzed", failed, files.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkpoint::InMemoryStats;
    use std::fs;

    fn write_run(dir: &Path, stats: &InMemoryStats) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(DEFAULT_FILE_NAME);
        parquet_stats::tests::write_stats(File::create(&path).unwrap(), stats);
        path
    }

    #[test]
    fn test_cli_requires_exactly_one_root() {
        assert!(Command::try_parse_from(["stats-report"]).is_err());
        assert!(Command::try_parse_from(["stats-report", "a", "b"]).is_err());

        let opts = Command::try_parse_from(["stats-report", "runs"]).unwrap();
        assert_eq!(opts.root, PathBuf::from("runs"));
        assert_eq!(opts.components, DEFAULT_COMPONENTS);
        assert_eq!(opts.file_name, DEFAULT_FILE_NAME);
        assert_eq!(opts.run_config().unwrap(), RunConfig::default());
    }

    #[test]
    fn test_cli_options() {
        let opts = Command::try_parse_from([
            "stats-report",
            "runs",
            "--warmup",
            "0.5",
            "--pretty",
            "--components",
            "c,llc,DRAM",
            "--frequency-hz",
            "1000000000",
        ])
        .unwrap();
        let config = opts.run_config().unwrap();

        assert_eq!(config.warmup_fraction(), 0.5);
        assert!(config.pretty);
        assert_eq!(config.system_frequency_hz, 1e9);
        assert_eq!(config.components.len(), 3);
    }

    #[test]
    fn test_cli_rejects_unknown_component() {
        let opts =
            Command::try_parse_from(["stats-report", "runs", "--components", "c,l3"]).unwrap();
        let err = opts.run_config().unwrap_err();
        assert!(format!("{:#}", err).contains("Undefined component l3"));
    }

    #[test]
    fn test_reports_every_file() {
        let root = tempfile::tempdir().unwrap();
        let stats = run::tests::full_system();
        write_run(&root.path().join("a"), &stats);
        write_run(&root.path().join("b"), &stats);

        let config = RunConfig::default();
        let files = discover(root.path(), DEFAULT_FILE_NAME).unwrap();
        let mut out: Vec<u8> = Vec::new();
        let (reports, failed) = process_files(&files, &config, &mut out).unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(failed, 0);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("\nFile: ").count(), 2);
        assert!(text.contains("--c_ipc: 1.75\n"));
        assert!(text.contains("--memctrl_Footprint: 409600\n"));
    }

    #[test]
    fn test_bad_file_is_skipped() {
        let root = tempfile::tempdir().unwrap();
        let good = write_run(&root.path().join("a"), &run::tests::full_system());

        // Only one checkpoint: no window to measure
        let short = InMemoryStats::new()
            .with("c", "instrs", vec![vec![10]])
            .unwrap();
        write_run(&root.path().join("b"), &short);

        fs::create_dir_all(root.path().join("c")).unwrap();
        fs::write(root.path().join("c").join(DEFAULT_FILE_NAME), b"not parquet").unwrap();

        let files = discover(root.path(), DEFAULT_FILE_NAME).unwrap();
        assert_eq!(files.len(), 3);

        let mut out: Vec<u8> = Vec::new();
        let (reports, failed) = process_files(&files, &RunConfig::default(), &mut out).unwrap();

        assert_eq!(failed, 2);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].file, good.display().to_string());

        // Nothing of the aborted files reaches the output
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("\nFile: ").count(), 1);
    }

    #[test]
    fn test_output_is_repeatable() {
        let root = tempfile::tempdir().unwrap();
        write_run(root.path(), &run::tests::full_system());
        let files = discover(root.path(), DEFAULT_FILE_NAME).unwrap();
        let config = RunConfig {
            pretty: true,
            ..RunConfig::default()
        };

        let mut first: Vec<u8> = Vec::new();
        let mut second: Vec<u8> = Vec::new();
        process_files(&files, &config, &mut first).unwrap();
        process_files(&files, &config, &mut second).unwrap();

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_parquet_output_written() {
        let root = tempfile::tempdir().unwrap();
        let report = run::analyze(&run::tests::full_system(), "a", &RunConfig::default()).unwrap();
        let path = root.path().join("out.parquet");

        write_parquet(&path, &[report]).unwrap();
        assert!(fs::metadata(&path).unwrap().len() > 0);
    }
}
