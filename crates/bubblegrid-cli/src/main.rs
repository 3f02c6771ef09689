//! bubblegrid CLI — batch answer-sheet scanning.

use clap::{Args, Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use bubblegrid_core::{
    vis, AnswerVerdict, Fiducial, SheetConfig, SheetObserver, SheetPipeline, SheetResult,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "bubblegrid")]
#[command(about = "Extract multiple-choice answers from photographed bubble sheets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory of sheet photos and write a CSV of verdicts.
    Scan(CliScanArgs),

    /// Process a single sheet photo and emit its verdicts as JSON.
    Sheet(CliSheetArgs),
}

#[derive(Debug, Clone, Args)]
struct CliScanArgs {
    /// Directory containing sheet photos (.jpg/.jpeg/.png).
    #[arg(long)]
    images: PathBuf,

    /// Path of the CSV to write.
    #[arg(long, default_value = "answers.csv")]
    out: PathBuf,

    /// Directory for debug renderings (fiducial overlay, rectified sheet,
    /// first-column band grids), one subdirectory per candidate.
    #[arg(long)]
    debug_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CliSheetArgs {
    /// Path to the sheet photo.
    #[arg(long)]
    image: PathBuf,

    /// Path to write the verdicts (JSON); stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => run_scan(&args),
        Commands::Sheet(args) => run_sheet(&args),
    }
}

// ── scan ───────────────────────────────────────────────────────────────

fn run_scan(args: &CliScanArgs) -> CliResult<()> {
    let files = list_sheet_images(&args.images)?;
    if files.is_empty() {
        tracing::warn!("no sheet images found in {}", args.images.display());
        return Ok(());
    }
    tracing::info!("{} sheet images in {}", files.len(), args.images.display());

    let pipeline = SheetPipeline::new(SheetConfig::default());

    // (question, verdict, candidate) rows, both indices 1-based.
    let mut rows: Vec<(usize, AnswerVerdict, usize)> = Vec::new();
    let mut kept = 0usize;

    for (candidate, path) in files.iter().enumerate().map(|(i, p)| (i + 1, p)) {
        tracing::info!("processing candidate {}: {}", candidate, path.display());

        // One failed sheet never aborts the batch: report and move on.
        let result = match scan_sheet(&pipeline, path, candidate, args.debug_dir.as_deref()) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!("candidate {} failed: {}", candidate, err);
                continue;
            }
        };

        if result.is_all_blank() {
            tracing::warn!(
                "candidate {} skipped: every question blank ({})",
                candidate,
                path.display()
            );
            continue;
        }

        for (question, verdict) in result.verdicts.iter().enumerate() {
            rows.push((question + 1, *verdict, candidate));
        }
        kept += 1;
    }

    if rows.is_empty() {
        tracing::warn!("no valid sheets; nothing written");
        return Ok(());
    }

    write_csv(&args.out, &rows)?;
    tracing::info!(
        "{} answers from {} sheets written to {}",
        rows.len(),
        kept,
        args.out.display()
    );
    Ok(())
}

fn scan_sheet(
    pipeline: &SheetPipeline,
    path: &Path,
    candidate: usize,
    debug_dir: Option<&Path>,
) -> CliResult<SheetResult> {
    // Decode failures ("bad photo") surface distinctly from the pipeline's
    // fiducial/geometry errors ("bad sheet layout").
    let photo = image::open(path)
        .map_err(|e| -> CliError { format!("cannot decode photo {}: {}", path.display(), e).into() })?
        .to_rgb8();

    let result = match debug_dir {
        Some(dir) => {
            let mut writer = DebugImageWriter::new(dir.join(format!("candidate_{:03}", candidate)))?;
            let result = pipeline.process_with_observer(&photo, &mut writer)?;
            writer.finish()?;
            result
        }
        None => pipeline.process(&photo)?,
    };
    Ok(result)
}

/// Sheet photos in `dir`, sorted by filename. The 1-based position in this
/// list is the candidate index.
fn list_sheet_images(dir: &Path) -> CliResult<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| -> CliError { format!("cannot read {}: {}", dir.display(), e).into() })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    matches!(ext.to_ascii_lowercase().as_str(), "jpg" | "jpeg" | "png")
                })
        })
        .collect();
    files.sort();
    Ok(files)
}

fn write_csv(path: &Path, rows: &[(usize, AnswerVerdict, usize)]) -> CliResult<()> {
    let mut out = String::from("questao,resposta,candidato\n");
    for (question, verdict, candidate) in rows {
        writeln!(out, "{},{},{}", question, verdict, candidate)?;
    }
    std::fs::write(path, out)?;
    Ok(())
}

// ── sheet ──────────────────────────────────────────────────────────────

fn run_sheet(args: &CliSheetArgs) -> CliResult<()> {
    let photo = image::open(&args.image)
        .map_err(|e| -> CliError {
            format!("cannot decode photo {}: {}", args.image.display(), e).into()
        })?
        .to_rgb8();

    let pipeline = SheetPipeline::new(SheetConfig::default());
    let result = pipeline.process(&photo)?;

    let json = serde_json::to_string_pretty(&result)?;
    match &args.out {
        Some(path) => {
            std::fs::write(path, &json)?;
            tracing::info!("verdicts written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

// ── debug imagery ──────────────────────────────────────────────────────

/// Observer that persists annotated pipeline artifacts. I/O errors are
/// recorded and surfaced by `finish`, since observer hooks cannot fail.
struct DebugImageWriter {
    dir: PathBuf,
    error: Option<CliError>,
}

impl DebugImageWriter {
    fn new(dir: PathBuf) -> CliResult<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, error: None })
    }

    fn save(&mut self, name: &str, img: &image::RgbImage) {
        if self.error.is_some() {
            return;
        }
        let path = self.dir.join(name);
        if let Err(e) = img.save(&path) {
            self.error = Some(format!("cannot write {}: {}", path.display(), e).into());
        }
    }

    fn finish(self) -> CliResult<()> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl SheetObserver for DebugImageWriter {
    fn on_fiducials(&mut self, photo: &image::RgbImage, fiducials: &[Fiducial]) {
        let overlay = vis::render_fiducial_overlay(photo, fiducials);
        self.save("fiducials.png", &overlay);
    }

    fn on_rectified(&mut self, sheet: &image::RgbImage) {
        self.save("rectified.png", sheet);
    }

    fn on_band(
        &mut self,
        column: usize,
        question: usize,
        band: &image::GrayImage,
        _ink: &[u32; bubblegrid_core::OPTION_COUNT],
        verdict: AnswerVerdict,
    ) {
        // Band grids only for the first column; it is representative and
        // keeps the debug tree small.
        if column != 0 {
            return;
        }
        let grid = vis::render_band_grid(band, verdict);
        self.save(&format!("question_{:02}_options.png", question + 1), &grid);
    }
}
