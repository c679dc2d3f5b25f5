/// YOLO face detector using ONNX Runtime via `ort`.
///
/// Decodes the image itself, letterboxes it to the model resolution, runs
/// inference and reduces the raw predictions with NMS.
use std::path::Path;

use crate::detection::domain::detections::{DetectedFace, Detections, FacialArea};
use crate::detection::domain::face_detector::FaceDetector;
use crate::imaging::infrastructure::image_file_reader::decode_rgb;
use crate::shared::frame::Frame;

use super::math::{nms, ScoredBox};

/// Fallback model input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 640;

const NMS_IOU_THRESH: f64 = 0.45;

/// Letterbox padding value (YOLO convention).
const PAD_VALUE: f32 = 114.0 / 255.0;

/// YOLO face detector backed by an ONNX Runtime session.
pub struct OnnxYoloDetector {
    session: ort::session::Session,
    confidence: f64,
    input_size: u32,
}

impl OnnxYoloDetector {
    /// Load a YOLO ONNX model and prepare for inference.
    ///
    /// The input resolution is read from the model's input shape (expecting NCHW).
    /// Falls back to 640 if the shape is dynamic or unreadable.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;

        let input_size = session
            .inputs()
            .first()
            .and_then(|input| match input.dtype() {
                ort::value::ValueType::Tensor { ref shape, .. }
                    if shape.len() >= 4 && shape[2] > 0 =>
                {
                    Some(shape[2] as u32)
                }
                _ => None,
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);
        log::debug!(
            "Loaded detection model {} (input {input_size}x{input_size})",
            model_path.display()
        );

        Ok(Self {
            session,
            confidence,
            input_size,
        })
    }
}

impl FaceDetector for OnnxYoloDetector {
    fn detect(&mut self, image_path: &Path) -> Result<Detections, Box<dyn std::error::Error>> {
        let frame = decode_rgb(image_path)?;
        if frame.width() == 0 || frame.height() == 0 {
            return Ok(Detections::NoFaces);
        }

        let (input_tensor, scale, pad_x, pad_y) = letterbox(&frame, self.input_size);

        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("YOLO model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        let data = tensor
            .as_slice()
            .ok_or("Cannot get tensor slice")?
            .to_vec();

        let candidates = parse_predictions(&data, &shape, self.confidence)?
            .into_iter()
            .map(|mut c| {
                // Letterbox coordinates back to the source image
                c.bbox[0] = (c.bbox[0] - pad_x as f64) / scale;
                c.bbox[1] = (c.bbox[1] - pad_y as f64) / scale;
                c.bbox[2] = (c.bbox[2] - pad_x as f64) / scale;
                c.bbox[3] = (c.bbox[3] - pad_y as f64) / scale;
                c
            })
            .collect();

        let faces = nms(candidates, NMS_IOU_THRESH)
            .into_iter()
            .map(|d| DetectedFace {
                facial_area: FacialArea {
                    x1: d.bbox[0].round() as i32,
                    y1: d.bbox[1].round() as i32,
                    x2: d.bbox[2].round() as i32,
                    y2: d.bbox[3].round() as i32,
                },
                score: d.score as f32,
            })
            .collect::<Vec<_>>();

        log::debug!("{}: {} face(s)", image_path.display(), faces.len());
        Ok(Detections::from_faces(faces))
    }
}

/// Platform execution providers; ONNX Runtime falls back to CPU when the
/// preferred provider is unavailable.
fn preferred_execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}

// ---------------------------------------------------------------------------
// Postprocessing
// ---------------------------------------------------------------------------

/// Parses raw YOLO output into corner boxes above the confidence threshold.
///
/// Output is `[1, features, detections]` (transposed) or
/// `[1, detections, features]`; rows start with `[cx, cy, w, h, conf, ...]`.
fn parse_predictions(
    data: &[f32],
    shape: &[usize],
    confidence: f64,
) -> Result<Vec<ScoredBox>, Box<dyn std::error::Error>> {
    if shape.len() != 3 {
        return Err(format!("Unexpected YOLO output shape: {shape:?}").into());
    }
    let transposed = shape[1] < shape[2];
    let (num_dets, num_feats) = if transposed {
        (shape[2], shape[1])
    } else {
        (shape[1], shape[2])
    };
    if num_feats < 5 || data.len() < num_dets * num_feats {
        return Err(format!("YOLO output too small for shape {shape:?}").into());
    }

    let at = |det: usize, feat: usize| -> f64 {
        let idx = if transposed {
            feat * num_dets + det
        } else {
            det * num_feats + feat
        };
        data[idx] as f64
    };

    let mut out = Vec::new();
    for i in 0..num_dets {
        let conf = at(i, 4);
        if conf < confidence {
            continue;
        }
        let (cx, cy, w, h) = (at(i, 0), at(i, 1), at(i, 2), at(i, 3));
        out.push(ScoredBox {
            bbox: [cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0],
            score: conf,
        });
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Letterbox-resize a frame to `target_size` × `target_size`.
///
/// Returns `(NCHW float32 tensor, scale, pad_x, pad_y)`.
fn letterbox(frame: &Frame, target_size: u32) -> (ndarray::Array4<f32>, f64, u32, u32) {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = ((fw * scale).round() as u32).min(target_size);
    let new_h = ((fh * scale).round() as u32).min(target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let mut tensor = ndarray::Array4::<f32>::from_elem(
        (1, 3, target_size as usize, target_size as usize),
        PAD_VALUE,
    );

    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;

    // Nearest-neighbour resize into the padded area
    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    (tensor, scale, pad_x, pad_y)
}
