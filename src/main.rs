//! pmhctui - p-MHC Binding Prediction Viewer
//!
//! A terminal UI for submitting peptide/HLA pairs and viewing predictions.
//!
//! ## Usage
//!
//! ```bash
//! pmhctui                                   # empty form
//! pmhctui peptides.txt -a 'HLA-A*02:01'     # preload a file
//! pmhctui peptides.csv -o -                 # batch mode, TSV to stdout
//! ```
//!
//! ## Supported Input Files
//!
//! - Plain text (.txt): one peptide per line
//! - CSV (.csv): first column or a `peptide` column
//! - FASTA (.fasta, .fa, .fas, .faa)

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use pmhctui::controller::run_app;
use pmhctui::formats::{load_sequences, write_tsv, SequenceFileFormat};
use pmhctui::model::{Allele, AppState};
use pmhctui::normalize::build_request;
use pmhctui::predictor::{MockPredictor, PredictionSource};
use pmhctui::table::PageSize;

/// Input file format specification for command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// One peptide per line
    Txt,
    /// Comma-separated, peptide in the first or `peptide` column
    Csv,
    /// FASTA records
    Fasta,
    /// Auto-detect from extension and content
    Auto,
}

impl From<FormatArg> for Option<SequenceFileFormat> {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Txt => Some(SequenceFileFormat::Txt),
            FormatArg::Csv => Some(SequenceFileFormat::Csv),
            FormatArg::Fasta => Some(SequenceFileFormat::Fasta),
            FormatArg::Auto => None,
        }
    }
}

/// pmhctui - submit peptides, browse p-MHC binding predictions
///
/// When run without -o/--output, opens the interactive TUI.
/// With -o/--output, runs in batch mode and writes a TSV to file (or stdout with "-").
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Sequence file to load (TXT, CSV or FASTA)
    file: Option<PathBuf>,

    /// Force a specific input format (overrides auto-detection)
    #[arg(short = 'f', long = "format", value_enum, default_value = "auto")]
    format: FormatArg,

    /// HLA allele, e.g. 'HLA-A*02:01'
    #[arg(short = 'a', long = "allele")]
    allele: Option<String>,

    /// Rows per page (10, 25 or 50)
    #[arg(short = 'p', long = "page-size", default_value = "10")]
    page_size: usize,

    /// Seed for the mock predictor (reproducible output)
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    /// Output file (enables batch mode). Use "-" for stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Use plain ASCII glyphs
    #[arg(long = "ascii")]
    ascii: bool,

    /// Write logs to this file (default: a temp file when RUST_LOG is set)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

/// Sets up file logging. Stdout and stderr belong to the TUI.
fn init_logging(log_file: Option<&Path>) -> Result<Option<PathBuf>> {
    let path = match log_file {
        Some(path) => path.to_path_buf(),
        None if std::env::var_os("RUST_LOG").is_some() => {
            std::env::temp_dir().join(format!("pmhctui-{:08x}.log", rand::random::<u32>()))
        }
        None => return Ok(None),
    };

    let file = File::create(&path)
        .with_context(|| format!("Cannot create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(Some(path))
}

fn make_predictor(seed: Option<u64>) -> MockPredictor {
    match seed {
        Some(seed) => MockPredictor::with_seed(seed),
        None => MockPredictor::new(),
    }
}

/// Runs batch mode: load file, predict, write TSV.
fn run_batch_mode(
    file_path: &Path,
    forced_format: Option<SequenceFileFormat>,
    allele: Allele,
    seed: Option<u64>,
    output: &str,
) -> Result<()> {
    let loaded = load_sequences(file_path, forced_format)
        .with_context(|| format!("Cannot load {}", file_path.display()))?;
    let request = build_request(&loaded.text, loaded.input_format, allele)?;

    let mut predictor = make_predictor(seed);
    let records = predictor.predict(&request)?;
    log::info!("Batch mode: {} predictions for {}", records.len(), allele);

    if output == "-" {
        let stdout = io::stdout();
        write_tsv(stdout.lock(), &records)?;
    } else {
        let file = File::create(output).with_context(|| format!("Cannot create {}", output))?;
        write_tsv(BufWriter::new(file), &records)?;
        eprintln!("Wrote {} predictions to {}", records.len(), output);
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_path = init_logging(args.log_file.as_deref())?;
    let forced_format: Option<SequenceFileFormat> = args.format.into();

    let allele = match &args.allele {
        Some(name) => name.parse::<Allele>()?,
        None => Allele::default(),
    };

    let Some(page_size) = PageSize::from_rows(args.page_size) else {
        anyhow::bail!("Page size must be 10, 25 or 50 (got {})", args.page_size);
    };

    if let Some(output) = args.output {
        let Some(file_path) = args.file else {
            anyhow::bail!("Batch mode (-o/--output) needs an input file");
        };
        run_batch_mode(&file_path, forced_format, allele, args.seed, &output)?;
    } else {
        let mut state = AppState::new(page_size, !args.ascii);
        state.form.allele = allele;
        state.forced_file_format = forced_format;
        if let Some(file_path) = &args.file {
            state
                .load_file(file_path)
                .with_context(|| format!("Cannot load {}", file_path.display()))?;
        }
        run_app(state, Box::new(make_predictor(args.seed)))?;
    }

    if let Some(path) = log_path {
        eprintln!("Log written to {}", path.display());
    }

    Ok(())
}
