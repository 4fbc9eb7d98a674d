use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};

use pfodiag::{
    analysis::{ElectronComparison, Variant},
    dump::dump_events,
    output::{HistogramSet, OutputFormat},
    reader::{EventReader, Format},
    track_eff::{files_in_dir, run_files},
    Config,
};

/// Compare truth-level and particle-flow electrons
///
/// Set the environment variable `RUST_LOG` to control the log output,
/// e.g. `RUST_LOG=debug` for per-event information.
#[derive(Debug, Parser)]
#[command(name = "pfodiag", version)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Input event format (jsonl, hepmc2, lhef). Default: from the file extension
    #[arg(long, global = true)]
    input_format: Option<Format>,

    /// Histogram output format (json, yoda). Default: from the file extension
    #[arg(long, global = true)]
    output_format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Truth and particle-flow electron η histograms
    EtaHistos {
        /// Input event file
        infile: PathBuf,
        /// Output histogram file
        outfile: PathBuf,
    },

    /// η histograms and transverse momentum response
    Diagnostics {
        /// Input event file
        infile: PathBuf,
        /// Output histogram file
        outfile: PathBuf,
    },

    /// Print all events
    Dump {
        /// Input event file
        infile: PathBuf,
    },

    /// Tracking efficiency from track to truth particle matching
    TrackEff {
        /// Input event files, or directories with `--dirs`
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output histogram file
        #[arg(short, long, default_value = "trackEff.json")]
        out: PathBuf,

        /// Add the track over truth efficiency histogram
        #[arg(short, long)]
        normalize: bool,

        /// Inputs are directories, each one forming a separate file set
        #[arg(short, long)]
        dirs: bool,

        /// Maximum number of files to process per file set
        #[arg(short, long)]
        max_files: Option<usize>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let cli = Cli::parse();
    debug!("{cli:#?}");

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?,
        None => Config::default(),
    };

    match &cli.command {
        Command::EtaHistos { infile, outfile } => {
            compare(&config, Variant::EtaHistos, infile, outfile, &cli)
        }
        Command::Diagnostics { infile, outfile } => {
            compare(&config, Variant::Diagnostics, infile, outfile, &cli)
        }
        Command::Dump { infile } => {
            let events = open(infile, cli.input_format)?;
            let stdout = std::io::stdout().lock();
            dump_events(events, stdout).with_context(|| {
                format!("Failed to dump events from {}", infile.display())
            })?;
            Ok(())
        }
        Command::TrackEff {
            inputs,
            out,
            normalize,
            dirs,
            max_files,
        } => {
            let (normalize, max_files) = (*normalize, *max_files);
            let mut hists = HistogramSet::new();
            if *dirs {
                for dir in inputs {
                    let files = files_in_dir(dir)
                        .with_context(|| format!("Failed to list {}", dir.display()))?;
                    let Some(name) = dir.file_name() else {
                        bail!("Cannot determine name of directory {}", dir.display());
                    };
                    let prefix = format!("{}/", name.to_string_lossy());
                    info!("File set {prefix}: {} files", files.len());
                    hists.extend(run_files(
                        &config,
                        &files,
                        cli.input_format,
                        max_files,
                        normalize,
                        &prefix,
                    )?);
                }
            } else {
                hists = run_files(
                    &config,
                    inputs,
                    cli.input_format,
                    max_files,
                    normalize,
                    "",
                )?;
            }
            write(&hists, out, cli.output_format)
        }
    }
}

fn open(path: &Path, format: Option<Format>) -> Result<EventReader<BufReader<File>>> {
    EventReader::open(path, format)
        .with_context(|| format!("Failed to open event file {}", path.display()))
}

fn compare(
    config: &Config,
    variant: Variant,
    infile: &Path,
    outfile: &Path,
    cli: &Cli,
) -> Result<()> {
    let events = open(infile, cli.input_format)?;
    let hists = ElectronComparison::new(config, variant)?
        .run(events)
        .with_context(|| format!("Failed to analyse {}", infile.display()))?;
    write(&hists, outfile, cli.output_format)
}

fn write(
    hists: &HistogramSet,
    path: &Path,
    format: Option<OutputFormat>,
) -> Result<()> {
    let format = format.unwrap_or_else(|| OutputFormat::from_path(path));
    hists
        .write_to_file(path, format)
        .with_context(|| format!("Failed to write histograms to {}", path.display()))
}
