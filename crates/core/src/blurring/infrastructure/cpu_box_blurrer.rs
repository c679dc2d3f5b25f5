use std::cell::RefCell;

use crate::blurring::domain::frame_blurrer::FrameBlurrer;
use crate::shared::blur_kernel::BlurKernel;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

use super::box_filter;

/// CPU rectangular blurrer using a normalized box filter.
///
/// Each region is clamped to the frame, copied out, blurred in isolation
/// (pixels outside the region never contribute) and copied back.
pub struct CpuBoxBlurrer {
    kernel: BlurKernel,
    roi_buf: RefCell<Vec<u8>>,
    sums: RefCell<Vec<u64>>,
}

impl CpuBoxBlurrer {
    pub fn new(kernel: BlurKernel) -> Self {
        Self {
            kernel,
            roi_buf: RefCell::new(Vec::new()),
            sums: RefCell::new(Vec::new()),
        }
    }

    pub fn kernel(&self) -> BlurKernel {
        self.kernel
    }
}

impl Default for CpuBoxBlurrer {
    fn default() -> Self {
        Self::new(BlurKernel::default())
    }
}

impl FrameBlurrer for CpuBoxBlurrer {
    fn blur(
        &self,
        frame: &mut Frame,
        regions: &[BoundingBox],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let fw = frame.width();
        let fh = frame.height();
        let channels = frame.channels() as usize;
        let row_stride = fw as usize * channels;
        let data = frame.data_mut();

        let mut roi = self.roi_buf.borrow_mut();
        let mut sums = self.sums.borrow_mut();

        for region in regions {
            let Some(r) = region.clamp_to(fw, fh) else {
                log::debug!("Skipping region {region:?} outside {fw}x{fh} frame");
                continue;
            };
            if r != *region {
                log::debug!("Clamped region {region:?} to {r:?}");
            }

            let rx = r.x as usize;
            let ry = r.y as usize;
            let rw = r.width as usize;
            let rh = r.height as usize;
            let span = rw * channels;

            roi.resize(span * rh, 0);
            for row in 0..rh {
                let src = (ry + row) * row_stride + rx * channels;
                roi[row * span..(row + 1) * span].copy_from_slice(&data[src..src + span]);
            }

            box_filter::box_blur(
                &mut roi,
                rw,
                rh,
                channels,
                self.kernel.width() as usize,
                self.kernel.height() as usize,
                &mut sums,
            );

            for row in 0..rh {
                let dst = (ry + row) * row_stride + rx * channels;
                data[dst..dst + span].copy_from_slice(&roi[row * span..(row + 1) * span]);
            }
        }

        Ok(())
    }
}
