use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use co2_insights::data::loader::load_file;
use co2_insights::export::write_report;
use co2_insights::{Analysis, AnalysisConfig};

const USAGE: &str = "usage: co2-insights <input.csv|.parquet|.json> [--out <dir>] [--config <file.json>]";

struct Args {
    input: PathBuf,
    out_dir: PathBuf,
    config: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut input: Option<PathBuf> = None;
    let mut out_dir = PathBuf::from("out");
    let mut config: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out" => out_dir = args.next().context("--out needs a directory")?.into(),
            "--config" => config = Some(args.next().context("--config needs a file")?.into()),
            "-h" | "--help" => bail!("{USAGE}"),
            flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
            _ if input.is_none() => input = Some(PathBuf::from(&arg)),
            _ => bail!("unexpected argument {arg}\n{USAGE}"),
        }
    }

    Ok(Args {
        input: input.context(USAGE)?,
        out_dir,
        config,
    })
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => AnalysisConfig::from_json_file(path)?,
        None => AnalysisConfig::default(),
    };
    log::debug!("Using {config:?}");

    let rows = load_file(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    let analysis = Analysis::run(&rows, &config);

    let written = write_report(&analysis, &args.out_dir)?;
    log::info!(
        "Wrote {} files to {}",
        written.len(),
        args.out_dir.display()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = parse_args(std::env::args().skip(1)).and_then(run) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}
