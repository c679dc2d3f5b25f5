use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Domain interface for blurring rectangular regions within a frame.
///
/// Regions are applied in slice order, so where they overlap the last one
/// wins. Implementations modify the frame in place.
pub trait FrameBlurrer: Send {
    fn blur(
        &self,
        frame: &mut Frame,
        regions: &[BoundingBox],
    ) -> Result<(), Box<dyn std::error::Error>>;
}
