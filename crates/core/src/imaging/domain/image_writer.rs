use std::path::Path;

use crate::shared::frame::Frame;

/// Writes a single frame to an image file.
///
/// The encoding follows the extension of `path`. Implementations must
/// never leave a partially written file at `path`.
pub trait ImageWriter: Send {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;
}
