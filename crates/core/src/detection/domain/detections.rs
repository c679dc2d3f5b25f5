use crate::shared::bounding_box::BoundingBox;

/// Corner coordinates `(x1, y1, x2, y2)` reported by a detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FacialArea {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DetectedFace {
    pub facial_area: FacialArea,
    pub score: f32,
}

/// Raw detector output.
///
/// Detectors either report faces keyed by an identifier (in their own
/// order) or the empty sentinel.
#[derive(Clone, Debug, PartialEq)]
pub enum Detections {
    Faces(Vec<(String, DetectedFace)>),
    NoFaces,
}

impl Detections {
    /// Builds a keyed result, naming faces `face_1`, `face_2`, ...
    /// Returns `NoFaces` when the list is empty.
    pub fn from_faces(faces: Vec<DetectedFace>) -> Self {
        if faces.is_empty() {
            return Detections::NoFaces;
        }
        Detections::Faces(
            faces
                .into_iter()
                .enumerate()
                .map(|(i, face)| (format!("face_{}", i + 1), face))
                .collect(),
        )
    }

    /// Normalizes both result shapes into boxes, preserving detector order.
    pub fn into_bounding_boxes(self) -> Vec<BoundingBox> {
        match self {
            Detections::NoFaces => Vec::new(),
            Detections::Faces(faces) => faces
                .into_iter()
                .map(|(_, face)| {
                    let a = face.facial_area;
                    BoundingBox::from_corners(a.x1, a.y1, a.x2, a.y2)
                })
                .collect(),
        }
    }
}
