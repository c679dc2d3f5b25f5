use std::fs;
use std::path::Path;

use crate::pipeline::batch_error::BatchError;
use crate::pipeline::batch_executor::{BatchExecutor, BatchSummary, ProcessorFactory};
use crate::pipeline::error_policy::ErrorPolicy;
use crate::pipeline::image_job::collect_image_jobs;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::constants::IMAGE_EXTENSIONS;

/// Directory blurring pipeline: list → filter → process each image.
///
/// Output files mirror input file names under `output_dir`. Files with
/// other extensions are ignored without a warning.
pub struct BlurDirectoryUseCase {
    executor: Box<dyn BatchExecutor>,
    policy: ErrorPolicy,
    extensions: Vec<String>,
}

impl BlurDirectoryUseCase {
    pub fn new(executor: Box<dyn BatchExecutor>, policy: ErrorPolicy) -> Self {
        Self {
            executor,
            policy,
            extensions: IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Replaces the extension allow-list (lowercase, without dots).
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn execute(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        factory: &ProcessorFactory,
        logger: &mut dyn PipelineLogger,
    ) -> Result<BatchSummary, BatchError> {
        if !input_dir.is_dir() {
            return Err(BatchError::MissingInputDirectory(input_dir.to_path_buf()));
        }
        fs::create_dir_all(output_dir).map_err(|source| BatchError::CreateOutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

        logger.info(&format!("Processing {}...", input_dir.display()));
        let jobs = collect_image_jobs(input_dir, output_dir, &self.extensions)?;
        log::info!(
            "{} image(s) to process in {}",
            jobs.len(),
            input_dir.display()
        );

        let summary = self.executor.execute(&jobs, factory, self.policy, logger)?;
        logger.summary();
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blurring::infrastructure::cpu_box_blurrer::CpuBoxBlurrer;
    use crate::detection::domain::detections::{DetectedFace, Detections, FacialArea};
    use crate::detection::domain::face_detector::FaceDetector;
    use crate::imaging::infrastructure::image_file_reader::ImageFileReader;
    use crate::imaging::infrastructure::image_file_writer::ImageFileWriter;
    use crate::pipeline::batch_executor::SendError;
    use crate::pipeline::blur_image_use_case::BlurImageUseCase;
    use crate::pipeline::infrastructure::sequential_batch_executor::SequentialBatchExecutor;
    use crate::pipeline::infrastructure::threaded_batch_executor::ThreadedBatchExecutor;
    use crate::pipeline::pipeline_logger::{NullPipelineLogger, StdoutPipelineLogger};
    use crate::shared::blur_kernel::BlurKernel;
    use rstest::rstest;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Deterministic detector keyed by file name; unknown files have no faces.
    #[derive(Clone, Default)]
    struct ScriptedDetector {
        faces: HashMap<String, Vec<FacialArea>>,
        failing: Vec<String>,
    }

    impl ScriptedDetector {
        fn with_face(mut self, name: &str, x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
            self.faces
                .entry(name.to_string())
                .or_default()
                .push(FacialArea { x1, y1, x2, y2 });
            self
        }

        fn failing_on(mut self, name: &str) -> Self {
            self.failing.push(name.to_string());
            self
        }
    }

    impl FaceDetector for ScriptedDetector {
        fn detect(&mut self, image_path: &Path) -> Result<Detections, Box<dyn std::error::Error>> {
            let name = image_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if self.failing.contains(&name) {
                return Err(format!("inference failed on {name}").into());
            }
            let faces = self.faces.get(&name).cloned().unwrap_or_default();
            Ok(Detections::from_faces(
                faces
                    .into_iter()
                    .map(|facial_area| DetectedFace {
                        facial_area,
                        score: 0.99,
                    })
                    .collect(),
            ))
        }
    }

    fn factory(
        detector: ScriptedDetector,
        kernel: BlurKernel,
    ) -> impl Fn() -> Result<BlurImageUseCase, SendError> + Sync {
        move || {
            Ok(BlurImageUseCase::new(
                Box::new(ImageFileReader::new()),
                Box::new(ImageFileWriter::new()),
                Box::new(detector.clone()),
                Box::new(CpuBoxBlurrer::new(kernel)),
            ))
        }
    }

    fn executor(threads: usize) -> Box<dyn BatchExecutor> {
        if threads > 1 {
            Box::new(ThreadedBatchExecutor::new(threads))
        } else {
            Box::new(SequentialBatchExecutor::new())
        }
    }

    /// Noisy RGB image so blurring always changes pixels.
    fn textured_image(width: u32, height: u32) -> image::RgbImage {
        image::RgbImage::from_fn(width, height, |x, y| {
            let v = ((x * 37 + y * 91) ^ (x * y)) % 256;
            image::Rgb([v as u8, (255 - v) as u8, ((x * 17) % 256) as u8])
        })
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    struct Fixture {
        _root: tempfile::TempDir,
        input: PathBuf,
        output: PathBuf,
    }

    fn fixture() -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("input");
        let output = root.path().join("nested").join("output");
        fs::create_dir(&input).unwrap();
        Fixture {
            input,
            output,
            _root: root,
        }
    }

    fn run(
        fx: &Fixture,
        detector: ScriptedDetector,
        kernel: BlurKernel,
        policy: ErrorPolicy,
        threads: usize,
    ) -> Result<BatchSummary, BatchError> {
        let factory = factory(detector, kernel);
        BlurDirectoryUseCase::new(executor(threads), policy).execute(
            &fx.input,
            &fx.output,
            &factory,
            &mut NullPipelineLogger,
        )
    }

    #[rstest]
    #[case::sequential(1)]
    #[case::threaded(3)]
    fn test_mixed_directory_scenario(#[case] threads: usize) {
        let fx = fixture();
        let a = textured_image(40, 40);
        let b = textured_image(60, 50);
        a.save(fx.input.join("a.png")).unwrap();
        b.save(fx.input.join("b.jpg")).unwrap();
        fs::write(fx.input.join("c.txt"), b"not an image").unwrap();

        let detector = ScriptedDetector::default().with_face("b.jpg", 10, 10, 30, 30);
        let summary = run(
            &fx,
            detector,
            BlurKernel::new(10, 10).unwrap(),
            ErrorPolicy::Halt,
            threads,
        )
        .unwrap();

        assert_eq!(file_names(&fx.output), vec!["a.png", "b.jpg"]);
        assert_eq!(
            summary,
            BatchSummary {
                processed: 2,
                faces: 1,
                skipped: 0,
                failed: 0
            }
        );

        // No face: lossless PNG re-encode is pixel-identical
        let a_out = image::open(fx.output.join("a.png")).unwrap().to_rgb8();
        assert_eq!(a_out, a);

        // One face: pixels inside the box differ from the decoded input
        let b_in = image::open(fx.input.join("b.jpg")).unwrap().to_rgb8();
        let b_out = image::open(fx.output.join("b.jpg")).unwrap().to_rgb8();
        assert_eq!(b_out.dimensions(), b_in.dimensions());
        let changed = b_in
            .enumerate_pixels()
            .filter(|(x, y, p)| (10..30).contains(x) && (10..30).contains(y) && b_out.get_pixel(*x, *y) != *p)
            .count();
        assert!(changed > 0, "face region should be blurred");
    }

    #[test]
    fn test_region_containment_on_lossless_output() {
        let fx = fixture();
        let img = textured_image(64, 48);
        img.save(fx.input.join("face.png")).unwrap();

        let detector = ScriptedDetector::default().with_face("face.png", 10, 10, 30, 30);
        run(&fx, detector, BlurKernel::new(10, 10).unwrap(), ErrorPolicy::Halt, 1).unwrap();

        let out = image::open(fx.output.join("face.png")).unwrap().to_rgb8();
        let mut changed_inside = 0;
        for (x, y, p) in img.enumerate_pixels() {
            let inside = (10..30).contains(&x) && (10..30).contains(&y);
            if inside {
                changed_inside += usize::from(out.get_pixel(x, y) != p);
            } else {
                assert_eq!(out.get_pixel(x, y), p, "pixel ({x},{y}) outside the face changed");
            }
        }
        assert!(changed_inside > 0);
    }

    #[test]
    fn test_box_overflowing_image_is_truncated() {
        let fx = fixture();
        let img = textured_image(32, 32);
        img.save(fx.input.join("edge.png")).unwrap();

        let detector = ScriptedDetector::default().with_face("edge.png", 20, 24, 200, 90);
        let summary = run(&fx, detector, BlurKernel::new(5, 5).unwrap(), ErrorPolicy::Halt, 1).unwrap();
        assert_eq!(summary.faces, 1);

        let out = image::open(fx.output.join("edge.png")).unwrap().to_rgb8();
        assert_eq!(out.dimensions(), (32, 32));
        for (x, y, p) in img.enumerate_pixels() {
            if x < 20 || y < 24 {
                assert_eq!(out.get_pixel(x, y), p);
            }
        }
        assert_ne!(out, img);
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let fx = fixture();
        textured_image(48, 48).save(fx.input.join("p.png")).unwrap();
        textured_image(48, 48).save(fx.input.join("q.jpg")).unwrap();
        let detector = ScriptedDetector::default()
            .with_face("p.png", 5, 5, 25, 25)
            .with_face("q.jpg", 10, 10, 40, 40);
        let kernel = BlurKernel::new(7, 7).unwrap();

        run(&fx, detector.clone(), kernel, ErrorPolicy::Halt, 1).unwrap();
        let first: Vec<_> = ["p.png", "q.jpg"]
            .iter()
            .map(|n| fs::read(fx.output.join(n)).unwrap())
            .collect();

        run(&fx, detector, kernel, ErrorPolicy::Halt, 1).unwrap();
        let second: Vec<_> = ["p.png", "q.jpg"]
            .iter()
            .map(|n| fs::read(fx.output.join(n)).unwrap())
            .collect();

        assert_eq!(first, second);
    }

    #[rstest]
    #[case::sequential(1)]
    #[case::threaded(4)]
    fn test_empty_directory_creates_empty_output(#[case] threads: usize) {
        let fx = fixture();
        fs::write(fx.input.join("notes.txt"), b"ignored").unwrap();

        let summary = run(
            &fx,
            ScriptedDetector::default(),
            BlurKernel::default(),
            ErrorPolicy::Halt,
            threads,
        )
        .unwrap();

        assert!(fx.output.is_dir());
        assert!(file_names(&fx.output).is_empty());
        assert_eq!(summary, BatchSummary::default());
    }

    #[test]
    fn test_existing_output_directory_is_reused() {
        let fx = fixture();
        fs::create_dir_all(&fx.output).unwrap();
        textured_image(8, 8).save(fx.input.join("x.png")).unwrap();

        run(&fx, ScriptedDetector::default(), BlurKernel::default(), ErrorPolicy::Halt, 1).unwrap();
        assert_eq!(file_names(&fx.output), vec!["x.png"]);
    }

    #[test]
    fn test_missing_input_directory_fails_before_creating_output() {
        let fx = fixture();
        fs::remove_dir(&fx.input).unwrap();

        let err = run(&fx, ScriptedDetector::default(), BlurKernel::default(), ErrorPolicy::Halt, 1)
            .unwrap_err();
        assert!(matches!(err, BatchError::MissingInputDirectory(_)));
        assert!(!fx.output.exists());
    }

    #[test]
    fn test_unreadable_image_is_skipped_and_batch_continues() {
        let fx = fixture();
        fs::write(fx.input.join("broken.jpg"), b"garbage bytes").unwrap();
        textured_image(16, 16).save(fx.input.join("ok.png")).unwrap();

        let mut logger = StdoutPipelineLogger::new();
        let factory = factory(ScriptedDetector::default(), BlurKernel::default());
        let summary = BlurDirectoryUseCase::new(executor(1), ErrorPolicy::Halt)
            .execute(&fx.input, &fx.output, &factory, &mut logger)
            .unwrap();

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(file_names(&fx.output), vec!["ok.png"]);
        assert_eq!(logger.warnings().len(), 1);
        assert!(logger.warnings()[0].contains("broken.jpg"));
    }

    #[rstest]
    #[case::sequential(1)]
    #[case::threaded(2)]
    fn test_halt_policy_aborts_on_detection_failure(#[case] threads: usize) {
        let fx = fixture();
        textured_image(16, 16).save(fx.input.join("bad.png")).unwrap();

        let detector = ScriptedDetector::default().failing_on("bad.png");
        let err = run(&fx, detector, BlurKernel::default(), ErrorPolicy::Halt, threads).unwrap_err();

        assert!(matches!(err, BatchError::Detection { .. }));
        assert!(!fx.output.join("bad.png").exists());
    }

    #[test]
    fn test_halt_policy_leaves_later_files_unprocessed() {
        let fx = fixture();
        textured_image(16, 16).save(fx.input.join("a.png")).unwrap();
        textured_image(16, 16).save(fx.input.join("bad.png")).unwrap();
        textured_image(16, 16).save(fx.input.join("z.png")).unwrap();

        let detector = ScriptedDetector::default().failing_on("bad.png");
        let result = run(&fx, detector, BlurKernel::default(), ErrorPolicy::Halt, 1);

        assert!(matches!(result, Err(BatchError::Detection { ref path, .. }) if path.ends_with("bad.png")));
        assert_eq!(file_names(&fx.output), vec!["a.png"]);
        assert!(!fx.output.join("z.png").exists());
    }

    #[rstest]
    #[case::sequential(1)]
    #[case::threaded(2)]
    fn test_skip_policy_continues_past_detection_failure(#[case] threads: usize) {
        let fx = fixture();
        textured_image(16, 16).save(fx.input.join("bad.png")).unwrap();
        textured_image(16, 16).save(fx.input.join("good.png")).unwrap();

        let detector = ScriptedDetector::default().failing_on("bad.png");
        let summary = run(&fx, detector, BlurKernel::default(), ErrorPolicy::Skip, threads).unwrap();

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(file_names(&fx.output), vec!["good.png"]);
    }

    #[test]
    fn test_factory_failure_is_reported() {
        let fx = fixture();
        textured_image(8, 8).save(fx.input.join("x.png")).unwrap();

        let failing = || -> Result<BlurImageUseCase, SendError> { Err("model missing".into()) };
        for threads in [1, 2] {
            let err = BlurDirectoryUseCase::new(executor(threads), ErrorPolicy::Halt)
                .execute(&fx.input, &fx.output, &failing, &mut NullPipelineLogger)
                .unwrap_err();
            assert!(matches!(err, BatchError::WorkerInit(ref m) if m == "model missing"));
        }
    }

    #[test]
    fn test_custom_extensions() {
        let fx = fixture();
        textured_image(8, 8).save(fx.input.join("keep.png")).unwrap();
        textured_image(8, 8).save(fx.input.join("drop.jpg")).unwrap();

        let factory = factory(ScriptedDetector::default(), BlurKernel::default());
        BlurDirectoryUseCase::new(executor(1), ErrorPolicy::Halt)
            .with_extensions(vec!["png".to_string()])
            .execute(&fx.input, &fx.output, &factory, &mut NullPipelineLogger)
            .unwrap();

        assert_eq!(file_names(&fx.output), vec!["keep.png"]);
    }
}
