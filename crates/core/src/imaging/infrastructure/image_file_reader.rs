use std::path::Path;

use crate::imaging::domain::image_reader::ImageReader;
use crate::shared::frame::Frame;

/// Decodes an image to RGB, sniffing the format from the file contents
/// rather than trusting the extension. Alpha is dropped.
pub fn decode_rgb(path: &Path) -> Result<Frame, image::ImageError> {
    let img = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?;
    Ok(Frame::from_rgb(img.to_rgb8()))
}

/// Reads image files with the `image` crate.
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageReader for ImageFileReader {
    fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
        Ok(decode_rgb(path)?)
    }
}
