use crate::pipeline::batch_error::BatchError;
use crate::pipeline::blur_image_use_case::{BlurImageUseCase, ImageOutcome};
use crate::pipeline::error_policy::ErrorPolicy;
use crate::pipeline::image_job::ImageJob;
use crate::pipeline::pipeline_logger::PipelineLogger;

pub type SendError = Box<dyn std::error::Error + Send + Sync>;

/// Builds a fresh single-image processor. Executors call it once per
/// worker so detectors never cross threads.
pub type ProcessorFactory = dyn Fn() -> Result<BlurImageUseCase, SendError> + Sync;

/// Counts for a finished batch run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Images written to the output directory.
    pub processed: usize,
    /// Faces blurred across all written images.
    pub faces: usize,
    /// Inputs that could not be decoded.
    pub skipped: usize,
    /// Images dropped by the skip policy after a failure.
    pub failed: usize,
}

/// Abstracts how the batch of images is scheduled.
///
/// Infrastructure provides sequential and threaded implementations.
pub trait BatchExecutor: Send {
    fn execute(
        &self,
        jobs: &[ImageJob],
        factory: &ProcessorFactory,
        policy: ErrorPolicy,
        logger: &mut dyn PipelineLogger,
    ) -> Result<BatchSummary, BatchError>;
}

/// Folds one image's result into the summary, applying the error policy.
///
/// Returns `Err` when the batch must stop.
pub(crate) fn record_outcome(
    job: &ImageJob,
    result: Result<ImageOutcome, BatchError>,
    policy: ErrorPolicy,
    summary: &mut BatchSummary,
    logger: &mut dyn PipelineLogger,
) -> Result<(), BatchError> {
    match result {
        Ok(ImageOutcome::Blurred { faces, timings }) => {
            summary.processed += 1;
            summary.faces += faces;
            for (stage, ms) in timings {
                logger.timing(stage, ms);
            }
            logger.metric("faces", faces as f64);
        }
        Ok(ImageOutcome::Unreadable { reason }) => {
            summary.skipped += 1;
            log::debug!("{}: {reason}", job.input.display());
            logger.warning(&format!("unable to read {}", job.input.display()));
        }
        Err(e) if policy == ErrorPolicy::Skip && e.is_per_image() => {
            summary.failed += 1;
            logger.warning(&format!("{e}; skipping"));
        }
        Err(e) => return Err(e),
    }
    Ok(())
}
