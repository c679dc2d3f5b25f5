/// An axis-aligned face rectangle in image pixel coordinates.
///
/// Detector output may extend past the image or have its corners swapped;
/// `width` and `height` are always non-negative, but the origin is not
/// guaranteed to lie inside the image. Call [`BoundingBox::clamp_to`]
/// before indexing pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width: width.max(0),
            height: height.max(0),
        }
    }

    /// Builds a box from two corner points.
    ///
    /// The origin is the first corner; the extent is the absolute
    /// difference between the corners.
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x: x1,
            y: y1,
            width: (x2 - x1).abs(),
            height: (y2 - y1).abs(),
        }
    }

    /// Intersects the box with `[0, image_width) × [0, image_height)`.
    ///
    /// Returns `None` when nothing of the box remains inside the image.
    pub fn clamp_to(&self, image_width: u32, image_height: u32) -> Option<BoundingBox> {
        let x1 = (self.x as i64).max(0);
        let y1 = (self.y as i64).max(0);
        let x2 = (self.x as i64 + self.width as i64).min(image_width as i64);
        let y2 = (self.y as i64 + self.height as i64).min(image_height as i64);

        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(BoundingBox {
            x: x1 as i32,
            y: y1 as i32,
            width: (x2 - x1) as i32,
            height: (y2 - y1) as i32,
        })
    }
}
