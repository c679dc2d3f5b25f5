use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use clap::Parser;

use faceblur_core::blurring::infrastructure::cpu_box_blurrer::CpuBoxBlurrer;
use faceblur_core::detection::infrastructure::model_resolver;
use faceblur_core::detection::infrastructure::onnx_yolo_detector::OnnxYoloDetector;
use faceblur_core::imaging::infrastructure::image_file_reader::ImageFileReader;
use faceblur_core::imaging::infrastructure::image_file_writer::ImageFileWriter;
use faceblur_core::pipeline::batch_executor::{BatchExecutor, SendError};
use faceblur_core::pipeline::blur_directory_use_case::BlurDirectoryUseCase;
use faceblur_core::pipeline::blur_image_use_case::BlurImageUseCase;
use faceblur_core::pipeline::error_policy::ErrorPolicy;
use faceblur_core::pipeline::infrastructure::sequential_batch_executor::SequentialBatchExecutor;
use faceblur_core::pipeline::infrastructure::threaded_batch_executor::ThreadedBatchExecutor;
use faceblur_core::pipeline::pipeline_logger::{PipelineLogger, StdoutPipelineLogger};
use faceblur_core::shared::blur_kernel::BlurKernel;
use faceblur_core::shared::constants::{
    DEFAULT_BLUR_KERNEL_HEIGHT, DEFAULT_BLUR_KERNEL_WIDTH, DEFAULT_CONFIDENCE, YOLO_MODEL_NAME,
    YOLO_MODEL_URL,
};

/// Detect and blur faces in images.
#[derive(Parser, Debug)]
#[command(name = "blur-faces")]
struct Cli {
    /// Directory with input images.
    #[arg(long = "input_dir", value_name = "DIR")]
    input_dir: PathBuf,

    /// Directory to save processed images (created if missing).
    #[arg(long = "output_dir", value_name = "DIR")]
    output_dir: PathBuf,

    /// Blurring kernel size, e.g. --blur_kernel 50 50.
    #[arg(
        long = "blur_kernel",
        num_args = 2,
        value_names = ["KERNEL_WIDTH", "KERNEL_HEIGHT"],
        default_values_t = [DEFAULT_BLUR_KERNEL_WIDTH, DEFAULT_BLUR_KERNEL_HEIGHT]
    )]
    blur_kernel: Vec<u32>,

    /// Face detection ONNX model (downloaded to the user cache if omitted).
    #[arg(long)]
    model: Option<PathBuf>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// What to do when detection fails for an image: halt or skip.
    #[arg(long = "on_error", default_value = "halt")]
    on_error: String,

    /// Number of images processed in parallel.
    #[arg(long, default_value = "1")]
    jobs: usize,
}

/// Validated run settings.
#[derive(Debug, PartialEq)]
struct Settings {
    kernel: BlurKernel,
    policy: ErrorPolicy,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    log::debug!("{cli:?}");
    let settings = validate(&cli)?;

    let model = LazyModel::new(cli.model.clone());
    let confidence = cli.confidence;
    let kernel = settings.kernel;
    let factory = move || -> Result<BlurImageUseCase, SendError> {
        let model_path = model.path()?;
        let detector = OnnxYoloDetector::new(model_path, confidence)
            .map_err(|e| -> SendError { e.to_string().into() })?;
        Ok(BlurImageUseCase::new(
            Box::new(ImageFileReader::new()),
            Box::new(ImageFileWriter::new()),
            Box::new(detector),
            Box::new(CpuBoxBlurrer::new(kernel)),
        ))
    };

    let mut logger = StdoutPipelineLogger::new();
    logger.info(&format!(
        "Blurring faces in {} -> {} (kernel {kernel})",
        cli.input_dir.display(),
        cli.output_dir.display()
    ));

    let use_case = BlurDirectoryUseCase::new(build_executor(cli.jobs), settings.policy);
    let summary = use_case.execute(&cli.input_dir, &cli.output_dir, &factory, &mut logger)?;
    log::info!(
        "Wrote {} image(s) with {} face(s) blurred to {} ({} unreadable, {} failed)",
        summary.processed,
        summary.faces,
        cli.output_dir.display(),
        summary.skipped,
        summary.failed
    );
    Ok(())
}

/// Resolves the model on first use, so runs with no matching images never
/// touch the network. Concurrent workers block on the same resolution.
struct LazyModel {
    explicit: Option<PathBuf>,
    resolved: OnceLock<Result<PathBuf, String>>,
    progress_drawn: Arc<AtomicBool>,
}

impl LazyModel {
    fn new(explicit: Option<PathBuf>) -> Self {
        Self {
            explicit,
            resolved: OnceLock::new(),
            progress_drawn: Arc::new(AtomicBool::new(false)),
        }
    }

    fn path(&self) -> Result<&Path, SendError> {
        let resolved = self.resolved.get_or_init(|| {
            log::info!("Resolving model: {YOLO_MODEL_NAME}");
            let drawn = Arc::clone(&self.progress_drawn);
            let result = model_resolver::resolve(
                self.explicit.as_deref(),
                YOLO_MODEL_NAME,
                YOLO_MODEL_URL,
                Some(Box::new(move |downloaded, total| {
                    drawn.store(true, Ordering::Relaxed);
                    download_progress(downloaded, total);
                })),
            );
            // Finish the \r progress line
            if self.progress_drawn.load(Ordering::Relaxed) {
                eprintln!();
            }
            result.map_err(|e| e.to_string())
        });
        match resolved {
            Ok(path) => Ok(path.as_path()),
            Err(e) => Err(e.clone().into()),
        }
    }
}

fn build_executor(jobs: usize) -> Box<dyn BatchExecutor> {
    if jobs > 1 {
        let executor = ThreadedBatchExecutor::new(jobs);
        log::info!("Processing with {} worker threads", executor.workers());
        Box::new(executor)
    } else {
        Box::new(SequentialBatchExecutor::new())
    }
}

fn validate(cli: &Cli) -> Result<Settings, Box<dyn std::error::Error>> {
    if !cli.input_dir.is_dir() {
        return Err(format!("Input directory not found: {}", cli.input_dir.display()).into());
    }
    if let Some(model) = cli.model.as_ref().filter(|p| !p.is_file()) {
        return Err(format!("Model file not found: {}", model.display()).into());
    }
    let [width, height] = cli.blur_kernel[..] else {
        return Err(format!(
            "--blur_kernel takes exactly two values, got {}",
            cli.blur_kernel.len()
        )
        .into());
    };
    let kernel = BlurKernel::new(width, height)?;
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    if cli.jobs == 0 {
        return Err("--jobs must be at least 1".into());
    }
    let policy = cli.on_error.parse::<ErrorPolicy>()?;
    Ok(Settings { kernel, policy })
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}
