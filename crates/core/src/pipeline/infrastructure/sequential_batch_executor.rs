use crate::pipeline::batch_error::BatchError;
use crate::pipeline::batch_executor::{
    record_outcome, BatchExecutor, BatchSummary, ProcessorFactory,
};
use crate::pipeline::error_policy::ErrorPolicy;
use crate::pipeline::image_job::ImageJob;
use crate::pipeline::pipeline_logger::PipelineLogger;

/// Processes images one at a time on the calling thread: each image is
/// read, detected, blurred and written before the next starts.
pub struct SequentialBatchExecutor;

impl SequentialBatchExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SequentialBatchExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchExecutor for SequentialBatchExecutor {
    fn execute(
        &self,
        jobs: &[ImageJob],
        factory: &ProcessorFactory,
        policy: ErrorPolicy,
        logger: &mut dyn PipelineLogger,
    ) -> Result<BatchSummary, BatchError> {
        let mut summary = BatchSummary::default();
        if jobs.is_empty() {
            return Ok(summary);
        }

        let mut use_case = factory().map_err(|e| BatchError::WorkerInit(e.to_string()))?;
        let total = jobs.len();
        for (i, job) in jobs.iter().enumerate() {
            logger.progress(i + 1, total, &job.file_name());
            let result = use_case.execute(&job.input, &job.output);
            record_outcome(job, result, policy, &mut summary, logger)?;
        }
        Ok(summary)
    }
}
