/// p300: detect a P300 response in one or more trial recordings.
///
/// Each input is a safetensors file holding a `[trials, samples, channels]`
/// tensor.  The report goes to stdout (text or `--json`), logs to stderr.
///
///   p300 S1.safetensors                  prompt for threshold, blank = auto
///   p300 S1.st S2.st --threshold 2.0     batch, shared explicit threshold
///   p300 S1.st S2.st                     batch, auto threshold per input
///   p300                                 interactive menu
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use erp300::{
    io::{load_trials, write_plot_series, DEFAULT_TRIALS_KEY},
    run_batch, Detector, DetectorConfig, ErpReport, ThresholdSpec,
};

#[derive(Parser, Debug)]
#[command(name = "p300", about = "P300 recognition detection on trial-averaged EEG")]
struct Args {
    /// Trial files (safetensors).  Omit to start the interactive menu.
    inputs: Vec<PathBuf>,

    /// Detection threshold: a non-negative number, or `auto`.
    #[arg(long)]
    threshold: Option<String>,

    /// Channel to analyse.
    #[arg(long, default_value_t = 0)]
    channel: usize,

    /// Sampling rate of the trials (Hz).
    #[arg(long, default_value_t = 240.0)]
    sample_rate: f64,

    /// Tensor key inside each input file.
    #[arg(long, default_value = DEFAULT_TRIALS_KEY)]
    key: String,

    /// Print reports as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Write `<input stem>.plot.safetensors` (time axis, waveform, marker) here.
    #[arg(long)]
    plot_dir: Option<PathBuf>,

    /// Never prompt; a missing threshold means auto.
    #[arg(long)]
    no_prompt: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "erp300=info,p300=info".into()),
        )
        .init();

    let cfg = DetectorConfig {
        sample_rate_hz: args.sample_rate,
        channel: args.channel,
        ..DetectorConfig::default()
    };
    let detector = Detector::new(cfg).context("invalid detector settings")?;

    match args.inputs.as_slice() {
        [] => menu(&detector, &args),
        [single] if args.threshold.is_none() && !args.no_prompt => {
            let raw = ask("Detection threshold (blank = auto): ")?.unwrap_or_default();
            analyze_one(&detector, &args, single, &raw)
        }
        inputs => {
            let spec: ThresholdSpec = match &args.threshold {
                Some(t) => t.parse().context("invalid --threshold")?,
                None => ThresholdSpec::Auto,
            };
            if let ThresholdSpec::Explicit(v) = spec {
                info!(threshold = v, "explicit threshold in effect for all inputs");
            }

            let entries = run_batch(&detector, inputs, &spec, &args.key);
            let mut failed = 0usize;
            for entry in &entries {
                match &entry.outcome {
                    Ok(report) => emit(report, &entry.path, &args)?,
                    Err(e) => {
                        failed += 1;
                        eprintln!("{}: {e}", entry.path.display());
                    }
                }
            }
            if failed > 0 {
                bail!("{failed} of {} input(s) failed", entries.len());
            }
            Ok(())
        }
    }
}

fn analyze_one(detector: &Detector, args: &Args, path: &Path, raw_threshold: &str) -> Result<()> {
    let trials = load_trials(path, &args.key)?;
    let (n_trials, n_samples, n_channels) = trials.dim();
    info!(n_trials, n_samples, n_channels, "loaded {}", path.display());
    let report = detector
        .analyze_prompted(&trials, raw_threshold)?
        .with_source(path.display().to_string());
    emit(&report, path, args)
}

fn emit(report: &ErpReport, path: &Path, args: &Args) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{report}\n");
    }
    if let Some(dir) = &args.plot_dir {
        let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
        let out = dir.join(format!("{stem}.plot.safetensors"));
        write_plot_series(report, &out).with_context(|| format!("writing {}", out.display()))?;
        info!("plot data written → {}", out.display());
    }
    Ok(())
}

/// Analyse-or-exit loop for running without arguments.
fn menu(detector: &Detector, args: &Args) -> Result<()> {
    loop {
        println!("\n1. Analyze trial file\n2. Exit");
        let Some(choice) = ask("Choice: ")? else {
            return Ok(());
        };
        match choice.trim() {
            "1" => {
                let Some(file) = ask("Trial file: ")? else {
                    return Ok(());
                };
                let raw = ask("Detection threshold (blank = auto): ")?.unwrap_or_default();
                // A bad file should not end the session.
                if let Err(e) = analyze_one(detector, args, Path::new(file.trim()), &raw) {
                    eprintln!("error: {e:#}");
                }
            }
            "2" => return Ok(()),
            other => eprintln!("unknown choice {other:?}"),
        }
    }
}

/// Print `msg` and read one line; `None` at end of input.
fn ask(msg: &str) -> Result<Option<String>> {
    print!("{msg}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    let n = std::io::stdin().lock().read_line(&mut line)?;
    Ok((n > 0).then_some(line))
}
