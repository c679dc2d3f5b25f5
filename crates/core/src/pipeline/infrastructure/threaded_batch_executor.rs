use std::sync::atomic::{AtomicBool, Ordering};

use crate::pipeline::batch_error::BatchError;
use crate::pipeline::batch_executor::{
    record_outcome, BatchExecutor, BatchSummary, ProcessorFactory,
};
use crate::pipeline::blur_image_use_case::ImageOutcome;
use crate::pipeline::error_policy::ErrorPolicy;
use crate::pipeline::image_job::ImageJob;
use crate::pipeline::pipeline_logger::PipelineLogger;

enum WorkerMessage {
    Done(usize, Result<ImageOutcome, BatchError>),
    InitFailed(BatchError),
}

/// Processes images on a pool of worker threads.
///
/// Layout: `dispatcher → workers [read/detect/blur/write] → coordinator`
///
/// Each worker builds its own processor from the factory, so no detector
/// or blurrer state is shared. The calling thread collects results,
/// reports progress in completion order and applies the error policy;
/// on a halting error it stops workers from picking up further images.
pub struct ThreadedBatchExecutor {
    workers: usize,
}

impl ThreadedBatchExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl BatchExecutor for ThreadedBatchExecutor {
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

        let total = jobs.len();
        let workers = self.workers.min(total);
        let cancelled = AtomicBool::new(false);

        let (job_tx, job_rx) = crossbeam_channel::unbounded::<usize>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<WorkerMessage>();
        for i in 0..total {
            // Receiver is alive in this scope, so send cannot fail
            let _ = job_tx.send(i);
        }
        drop(job_tx);

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let cancelled = &cancelled;
                scope.spawn(move || run_worker(jobs, factory, job_rx, result_tx, cancelled));
            }
            drop(result_tx);

            let mut first_error: Option<BatchError> = None;
            let mut completed = 0;
            for message in result_rx {
                match message {
                    WorkerMessage::Done(i, result) => {
                        completed += 1;
                        let job = &jobs[i];
                        logger.progress(completed, total, &job.file_name());
                        if first_error.is_some() {
                            continue;
                        }
                        if let Err(e) = record_outcome(job, result, policy, &mut summary, logger) {
                            cancelled.store(true, Ordering::Relaxed);
                            first_error = Some(e);
                        }
                    }
                    WorkerMessage::InitFailed(e) => {
                        cancelled.store(true, Ordering::Relaxed);
                        first_error.get_or_insert(e);
                    }
                }
            }

            match first_error {
                Some(e) => Err(e),
                None => Ok(summary),
            }
        })
    }
}

fn run_worker(
    jobs: &[ImageJob],
    factory: &ProcessorFactory,
    job_rx: crossbeam_channel::Receiver<usize>,
    result_tx: crossbeam_channel::Sender<WorkerMessage>,
    cancelled: &AtomicBool,
) {
    let mut use_case = match factory() {
        Ok(use_case) => use_case,
        Err(e) => {
            let _ = result_tx.send(WorkerMessage::InitFailed(BatchError::WorkerInit(
                e.to_string(),
            )));
            return;
        }
    };

    for i in job_rx {
        if cancelled.load(Ordering::Relaxed) {
            break;
        }
        let job = &jobs[i];
        let result = use_case.execute(&job.input, &job.output);
        if result_tx.send(WorkerMessage::Done(i, result)).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_count_is_at_least_one() {
        assert_eq!(ThreadedBatchExecutor::new(0).workers(), 1);
        assert_eq!(ThreadedBatchExecutor::new(4).workers(), 4);
    }
}
