use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use vp_app::{
    AppConfig, AppError, AppResult, MultiTableCoordinator, SessionEvent, rows_from_reduction,
    run_pipeline, save_table_csv, write_table_csv,
};
use vp_pca::{Norm, PreprocessAxis, PreprocessMode, PreprocessingConfig, SvdReducer};
use vp_spectra::{LoadReport, SpectrumLoader, WorkerPool};
use vp_table::SampleTable;

#[derive(Parser)]
#[command(name = "vp-cli")]
#[command(about = "ViewPCA CLI - PCA of averaged coin spectra", long_about = None)]
struct Cli {
    /// YAML configuration file; defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a manifest and report what was found
    Inspect {
        /// Path to the tag manifest
        manifest: PathBuf,
    },
    /// Load, preprocess and reduce to two principal components
    Reduce {
        /// Path to the tag manifest
        manifest: PathBuf,
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        #[arg(long, value_enum)]
        axis: Option<AxisArg>,
        #[arg(long, value_enum)]
        norm: Option<NormArg>,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print rows as JSON instead of CSV
        #[arg(long)]
        json: bool,
    },
    /// Load each manifest into its own table and print the shared axis range
    Bounds {
        /// Paths to tag manifests
        #[arg(required = true)]
        manifests: Vec<PathBuf>,
        /// Print the padded axis range as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the default configuration as YAML
    InitConfig {
        /// Destination file
        path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    None,
    Normalize,
    Standardize,
}

#[derive(Clone, Copy, ValueEnum)]
enum AxisArg {
    Features,
    Samples,
}

#[derive(Clone, Copy, ValueEnum)]
enum NormArg {
    L1,
    L2,
    Max,
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Inspect { manifest } => cmd_inspect(&config, &manifest),
        Commands::Reduce {
            manifest,
            mode,
            axis,
            norm,
            output,
            json,
        } => {
            let preprocessing = preprocessing_from_args(config.preprocessing, mode, axis, norm);
            cmd_reduce(&config, &manifest, preprocessing, output.as_deref(), json)
        }
        Commands::Bounds { manifests, json } => cmd_bounds(config, &manifests, json),
        Commands::InitConfig { path } => cmd_init_config(&config, &path),
    }
}

fn preprocessing_from_args(
    base: PreprocessingConfig,
    mode: Option<ModeArg>,
    axis: Option<AxisArg>,
    norm: Option<NormArg>,
) -> PreprocessingConfig {
    let mut config = base;
    if let Some(mode) = mode {
        config.mode = match mode {
            ModeArg::None => PreprocessMode::None,
            ModeArg::Normalize => PreprocessMode::Normalize,
            ModeArg::Standardize => PreprocessMode::Standardize,
        };
    }
    if let Some(axis) = axis {
        config.axis = match axis {
            AxisArg::Features => PreprocessAxis::Features,
            AxisArg::Samples => PreprocessAxis::Samples,
        };
    }
    if let Some(norm) = norm {
        config.norm = match norm {
            NormArg::L1 => Norm::L1,
            NormArg::L2 => Norm::L2,
            NormArg::Max => Norm::Max,
        };
    }
    config
}

fn loader(config: &AppConfig) -> AppResult<SpectrumLoader> {
    let pool = WorkerPool::new(config.worker_threads)?;
    Ok(SpectrumLoader::new(pool, config.loader_options()))
}

fn print_report(report: &LoadReport) {
    println!(
        "  Files: {} of {} loaded",
        report.files_loaded, report.files_requested
    );
    for missing in &report.missing {
        println!("  Missing: {} ({})", missing.path.display(), missing.group);
    }
    for short in &report.short_groups {
        println!(
            "  Short group: {} ({} of {} replicates)",
            short.label, short.found, short.expected
        );
    }
    for empty in &report.empty_groups {
        println!("  Empty group: {}", empty);
    }
}

fn cmd_inspect(config: &AppConfig, manifest: &Path) -> AppResult<()> {
    println!("Inspecting manifest: {}", manifest.display());
    let loaded = loader(config)?.load(manifest)?;
    let (rows, cols) = loaded.spectrum.shape();
    println!("  Samples: {}", rows);
    println!("  Points per spectrum: {}", cols);
    print_report(&loaded.report);
    if loaded.report.is_complete() {
        println!("✓ All replicates present");
    }
    for label in loaded.labels() {
        println!("  {}", label);
    }
    Ok(())
}

fn cmd_reduce(
    config: &AppConfig,
    manifest: &Path,
    preprocessing: PreprocessingConfig,
    output: Option<&Path>,
    json: bool,
) -> AppResult<()> {
    let loaded = loader(config)?.load(manifest)?;
    let reduction = run_pipeline(
        loaded.spectrum.matrix(),
        &preprocessing,
        &SvdReducer::default(),
    )?;
    let table = SampleTable::from_rows(rows_from_reduction(loaded.labels(), &reduction));

    let (r1, r2) = (
        reduction.explained_variance_ratio.0 * 100.0,
        reduction.explained_variance_ratio.1 * 100.0,
    );
    eprintln!("Preprocessing: {}", preprocessing);
    eprintln!(
        "  PC1: {:.1}% (singular value {:.1})",
        r1, reduction.singular_values.0
    );
    eprintln!(
        "  PC2: {:.1}% (singular value {:.1})",
        r2, reduction.singular_values.1
    );

    if let Some(path) = output {
        save_table_csv(&table, path)?;
        println!("✓ Exported {} rows to {}", table.len(), path.display());
    } else if json {
        let text = serde_json::to_string_pretty(table.rows())
            .map_err(|e| AppError::Io(e.into()))?;
        println!("{}", text);
    } else {
        write_table_csv(&table, std::io::stdout().lock())?;
    }
    Ok(())
}

fn cmd_bounds(config: AppConfig, manifests: &[PathBuf], json: bool) -> AppResult<()> {
    let mut coordinator = MultiTableCoordinator::new(config)?;
    for manifest in manifests {
        let handle = coordinator.add_table();
        if let Some(session) = coordinator.session_mut(handle) {
            session.request_load(manifest);
        }
    }

    for (handle, event) in coordinator.wait_idle() {
        let name = coordinator
            .session(handle)
            .map(|s| s.name().to_string())
            .unwrap_or_default();
        match event {
            SessionEvent::Loaded { source, rows, .. } if !json => {
                println!("{}: {} samples from {}", name, rows, source.display());
            }
            SessionEvent::LoadFailed { message } | SessionEvent::PipelineFailed { message } => {
                return Err(AppError::Run(format!("{}: {}", name, message)));
            }
            SessionEvent::Loaded { .. }
            | SessionEvent::TableReplaced { .. }
            | SessionEvent::Superseded { .. } => {}
        }
    }

    let b = coordinator.combined_bounds();
    if json {
        let text = serde_json::to_string_pretty(&b).map_err(|e| AppError::Io(e.into()))?;
        println!("{}", text);
        return Ok(());
    }
    for (_, session) in coordinator.sessions() {
        if let Some(summary) = session.summary() {
            println!("  {}: {}", session.name(), summary);
        }
    }
    println!("x: [{:.6}, {:.6}]", b.xmin, b.xmax);
    println!("y: [{:.6}, {:.6}]", b.ymin, b.ymax);
    Ok(())
}

fn cmd_init_config(config: &AppConfig, path: &Path) -> AppResult<()> {
    config.save(path)?;
    println!("✓ Wrote configuration to {}", path.display());
    Ok(())
}
