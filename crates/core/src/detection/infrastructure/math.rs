//! Box arithmetic shared by detection backends.

/// IoU between two bounding boxes represented as `[x1, y1, x2, y2]`.
pub fn bbox_iou(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    let x1 = a[0].max(b[0]);
    let y1 = a[1].max(b[1]);
    let x2 = a[2].min(b[2]);
    let y2 = a[3].min(b[3]);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }

    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    inter / (area_a + area_b - inter)
}

/// A candidate box before suppression.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredBox {
    pub bbox: [f64; 4],
    pub score: f64,
}

/// Greedy NMS: sort by score descending, suppress boxes overlapping a kept
/// box by more than `iou_thresh`.
pub fn nms(mut dets: Vec<ScoredBox>, iou_thresh: f64) -> Vec<ScoredBox> {
    dets.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<ScoredBox> = Vec::new();
    for det in dets {
        let dominated = keep.iter().any(|k| bbox_iou(&k.bbox, &det.bbox) > iou_thresh);
        if !dominated {
            keep.push(det);
        }
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scored(x1: f64, y1: f64, x2: f64, y2: f64, score: f64) -> ScoredBox {
        ScoredBox {
            bbox: [x1, y1, x2, y2],
            score,
        }
    }

    #[test]
    fn test_bbox_iou_no_overlap() {
        assert_relative_eq!(
            bbox_iou(&[0.0, 0.0, 10.0, 10.0], &[20.0, 20.0, 30.0, 30.0]),
            0.0
        );
    }

    #[test]
    fn test_bbox_iou_perfect() {
        let b = [0.0, 0.0, 10.0, 10.0];
        assert_relative_eq!(bbox_iou(&b, &b), 1.0);
    }

    #[test]
    fn test_nms_suppresses_overlapping() {
        let kept = nms(
            vec![
                scored(0.0, 0.0, 100.0, 100.0, 0.9),
                scored(5.0, 5.0, 105.0, 105.0, 0.8),
            ],
            0.3,
        );
        assert_eq!(kept.len(), 1);
        assert_relative_eq!(kept[0].score, 0.9);
    }

    #[test]
    fn test_nms_keeps_non_overlapping_in_score_order() {
        let kept = nms(
            vec![
                scored(0.0, 0.0, 50.0, 50.0, 0.6),
                scored(200.0, 200.0, 250.0, 250.0, 0.8),
            ],
            0.3,
        );
        assert_eq!(kept.len(), 2);
        assert_relative_eq!(kept[0].score, 0.8);
        assert_relative_eq!(kept[1].score, 0.6);
    }

    #[test]
    fn test_nms_higher_score_wins() {
        let kept = nms(
            vec![
                scored(0.0, 0.0, 100.0, 100.0, 0.5),
                scored(2.0, 2.0, 102.0, 102.0, 0.9),
            ],
            0.3,
        );
        assert_eq!(kept, vec![scored(2.0, 2.0, 102.0, 102.0, 0.9)]);
    }

    #[test]
    fn test_nms_empty_input() {
        assert!(nms(Vec::new(), 0.3).is_empty());
    }
}
