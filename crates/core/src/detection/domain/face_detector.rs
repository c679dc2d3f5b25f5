use std::path::Path;

use super::detections::Detections;

/// Domain interface for face detection.
///
/// Detectors receive the image path rather than decoded pixels and decode
/// independently. Implementations may hold mutable inference state,
/// hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect(&mut self, image_path: &Path) -> Result<Detections, Box<dyn std::error::Error>>;
}
