use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use aotai_game::{Catalogs, FsDataLoader};
use aotai_tester::logic::{
    DEFAULT_MAX_COMMANDS, GameplayStrategy, PlaythroughRunner, RunRecord, aggregate_playability,
    iteration_seed, reports, resolve_seed_inputs, split_csv,
};

#[derive(Debug, Parser)]
#[command(name = "aotai-tester", version)]
#[command(about = "Automated playthroughs and invariant checks for the Aotai traverse engine")]
struct Args {
    /// Seeds to run (comma-separated; integers, 0x hex or start..end ranges)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per seed and strategy
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Strategies to play (cautious,balanced,reckless,random or all)
    #[arg(long, default_value = "all")]
    strategy: String,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Read catalogs from this directory instead of the embedded data
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Commands allowed per run before it is abandoned
    #[arg(long, default_value_t = DEFAULT_MAX_COMMANDS)]
    max_commands: usize,

    /// Skip replaying each run to confirm determinism
    #[arg(long)]
    no_replay: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    announce_banner();

    let start_time = Instant::now();
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let strategies = GameplayStrategy::parse_list(&split_csv(&args.strategy))?;
    let catalogs = load_catalogs(&args)?;
    let runner = PlaythroughRunner::new(catalogs, args.max_commands, args.verbose);

    let records = run_playthroughs(&args, &runner, &strategies, &seeds);
    write_reports(&args, &records, start_time)?;

    if records.iter().any(|r| !r.passed()) {
        std::process::exit(1);
    }

    Ok(())
}

fn announce_banner() {
    println!("{}", "🏔️  Aotai Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn load_catalogs(args: &Args) -> Result<Catalogs> {
    match &args.data_dir {
        Some(dir) => {
            let loader = FsDataLoader::new(dir);
            Catalogs::try_load(&loader)
                .with_context(|| format!("failed to load catalogs from {}", dir.display()))
        }
        None => Ok(Catalogs::default_catalogs()),
    }
}

fn run_playthroughs(
    args: &Args,
    runner: &PlaythroughRunner,
    strategies: &[GameplayStrategy],
    seeds: &[u64],
) -> Vec<RunRecord> {
    println!("{}", "🧠 Running Playthroughs".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let mut records = Vec::new();
    for &strategy in strategies {
        for &seed in seeds {
            if args.verbose {
                println!(
                    "🧪 Strategy {} (seed {seed}, {} iterations)",
                    strategy.label().bright_white(),
                    args.iterations
                );
            }
            for i in 0..args.iterations {
                let run_seed = iteration_seed(seed, i);
                let record = if args.no_replay {
                    runner.run(strategy, run_seed)
                } else {
                    runner.run_checked(strategy, run_seed)
                };
                records.push(record);
            }
        }
    }
    records
}

fn write_reports(args: &Args, records: &[RunRecord], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let aggregates = aggregate_playability(records);

    match args.report.as_str() {
        "json" => reports::generate_json_report(&mut output_target, records, &aggregates)?,
        "markdown" => reports::generate_markdown_report(&mut output_target, records, &aggregates)?,
        "csv" => reports::generate_csv_report(&mut output_target, records)?,
        _ => {
            let duration = start_time.elapsed();
            if records.is_empty() {
                writeln!(&mut output_target, "No playthroughs executed.")?;
            } else {
                reports::generate_console_report(
                    &mut output_target,
                    records,
                    &aggregates,
                    duration,
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            seeds: "7".to_string(),
            iterations: 1,
            strategy: "balanced".to_string(),
            report: "json".to_string(),
            output: None,
            data_dir: None,
            max_commands: DEFAULT_MAX_COMMANDS,
            no_replay: true,
            verbose: false,
        }
    }

    #[test]
    fn args_parse_with_defaults() {
        let args = Args::parse_from(["aotai-tester"]);
        assert_eq!(args.seeds, "1337");
        assert_eq!(args.iterations, 10);
        assert_eq!(args.strategy, "all");
        assert_eq!(args.report, "console");
        assert!(!args.no_replay);
    }

    #[test]
    fn unknown_report_format_is_refused() {
        assert!(Args::try_parse_from(["aotai-tester", "--report", "xml"]).is_err());
    }

    #[test]
    fn missing_data_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = base_args();
        args.data_dir = Some(dir.path().join("nowhere"));
        let err = load_catalogs(&args).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load catalogs"));
    }

    #[test]
    fn iterations_expand_per_seed_and_strategy() {
        let mut args = base_args();
        args.iterations = 2;
        let runner = PlaythroughRunner::new(Catalogs::default_catalogs(), 1_500, false);
        let records = run_playthroughs(
            &args,
            &runner,
            &[GameplayStrategy::Balanced, GameplayStrategy::Random],
            &[7, 100],
        );
        assert_eq!(records.len(), 8);
        assert_eq!(records[1].seed, 8);
    }

    #[test]
    fn json_report_writes_to_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let mut args = base_args();
        args.output = Some(path.clone());
        let runner = PlaythroughRunner::new(Catalogs::default_catalogs(), 1_500, false);
        let records = run_playthroughs(&args, &runner, &[GameplayStrategy::Balanced], &[7]);
        write_reports(&args, &records, Instant::now()).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["runs"][0]["seed"], 7);
    }
}
