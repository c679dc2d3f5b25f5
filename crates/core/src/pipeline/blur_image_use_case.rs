use std::path::Path;
use std::time::Instant;

use crate::blurring::domain::frame_blurrer::FrameBlurrer;
use crate::detection::domain::face_detector::FaceDetector;
use crate::imaging::domain::image_reader::ImageReader;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::pipeline::batch_error::BatchError;

/// Result of processing one image.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageOutcome {
    /// The image was written; `faces` regions were blurred.
    Blurred {
        faces: usize,
        timings: Vec<(&'static str, f64)>,
    },
    /// The input could not be decoded; nothing was written.
    Unreadable { reason: String },
}

/// Single-image blurring pipeline: read → detect → blur → write.
pub struct BlurImageUseCase {
    reader: Box<dyn ImageReader>,
    writer: Box<dyn ImageWriter>,
    detector: Box<dyn FaceDetector>,
    blurrer: Box<dyn FrameBlurrer>,
}

impl BlurImageUseCase {
    pub fn new(
        reader: Box<dyn ImageReader>,
        writer: Box<dyn ImageWriter>,
        detector: Box<dyn FaceDetector>,
        blurrer: Box<dyn FrameBlurrer>,
    ) -> Self {
        Self {
            reader,
            writer,
            detector,
            blurrer,
        }
    }

    /// Reads one image, blurs every detected face and writes the result.
    ///
    /// An image with no faces is still written. An unreadable input is
    /// reported as [`ImageOutcome::Unreadable`] rather than an error.
    pub fn execute(
        &mut self,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<ImageOutcome, BatchError> {
        let mut timings = Vec::with_capacity(4);

        let t = Instant::now();
        let mut frame = match self.reader.read(input_path) {
            Ok(frame) => frame,
            Err(e) => {
                log::debug!("Cannot decode {}: {e}", input_path.display());
                return Ok(ImageOutcome::Unreadable {
                    reason: e.to_string(),
                });
            }
        };
        timings.push(("read", elapsed_ms(t)));

        let t = Instant::now();
        let boxes = self
            .detector
            .detect(input_path)
            .map_err(|e| BatchError::Detection {
                path: input_path.to_path_buf(),
                reason: e.to_string(),
            })?
            .into_bounding_boxes();
        timings.push(("detect", elapsed_ms(t)));

        let t = Instant::now();
        self.blurrer
            .blur(&mut frame, &boxes)
            .map_err(|e| BatchError::Blur {
                path: input_path.to_path_buf(),
                reason: e.to_string(),
            })?;
        timings.push(("blur", elapsed_ms(t)));

        let t = Instant::now();
        self.writer
            .write(output_path, &frame)
            .map_err(|e| BatchError::OutputWrite {
                path: output_path.to_path_buf(),
                reason: e.to_string(),
            })?;
        timings.push(("write", elapsed_ms(t)));

        log::debug!(
            "{} -> {} ({} face(s))",
            input_path.display(),
            output_path.display(),
            boxes.len()
        );
        Ok(ImageOutcome::Blurred {
            faces: boxes.len(),
            timings,
        })
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
