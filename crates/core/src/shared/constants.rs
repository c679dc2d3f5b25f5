pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

/// Extensions (lowercase, without the dot) picked up from the input directory.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

pub const DEFAULT_BLUR_KERNEL_WIDTH: u32 = 50;
pub const DEFAULT_BLUR_KERNEL_HEIGHT: u32 = 50;

pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Quality used for `.jpg`/`.jpeg` outputs.
pub const JPEG_QUALITY: u8 = 95;
