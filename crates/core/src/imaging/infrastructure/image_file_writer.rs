use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};

use crate::imaging::domain::image_writer::ImageWriter;
use crate::shared::constants::JPEG_QUALITY;
use crate::shared::frame::Frame;

/// Writes frames with the `image` crate, encoding by output extension.
/// JPEG is written at [`JPEG_QUALITY`].
///
/// The image is encoded into a hidden `.part` sibling and renamed over the
/// destination, so an interrupted or failed write never leaves a truncated
/// file at the final path.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.part"))
}

fn encode(img: &RgbImage, path: &Path, format: ImageFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        ImageFormat::Jpeg => {
            let mut out = BufWriter::new(fs::File::create(path)?);
            JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode_image(img)?;
            out.flush()?;
        }
        _ => img.save_with_format(path, format)?,
    }
    Ok(())
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let format = ImageFormat::from_path(path)?;
        let img = RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .ok_or("Failed to create image from frame data")?;

        let temp_path = temp_path_for(path);
        let result = encode(&img, &temp_path, format)
            .and_then(|()| fs::rename(&temp_path, path).map_err(Into::into));

        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }
}
