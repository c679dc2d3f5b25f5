use thiserror::Error;

use super::constants::{DEFAULT_BLUR_KERNEL_HEIGHT, DEFAULT_BLUR_KERNEL_WIDTH};

#[derive(Error, Debug, PartialEq, Eq)]
#[error("blur kernel must be two positive integers, got {width}x{height}")]
pub struct InvalidBlurKernel {
    pub width: u32,
    pub height: u32,
}

/// Neighbourhood size of the box blur, fixed for a whole batch run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlurKernel {
    width: u32,
    height: u32,
}

impl BlurKernel {
    pub fn new(width: u32, height: u32) -> Result<Self, InvalidBlurKernel> {
        if width == 0 || height == 0 {
            return Err(InvalidBlurKernel { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl Default for BlurKernel {
    fn default() -> Self {
        Self {
            width: DEFAULT_BLUR_KERNEL_WIDTH,
            height: DEFAULT_BLUR_KERNEL_HEIGHT,
        }
    }
}

impl std::fmt::Display for BlurKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_is_fifty_square() {
        let k = BlurKernel::default();
        assert_eq!((k.width(), k.height()), (50, 50));
    }

    #[test]
    fn test_new_accepts_asymmetric() {
        let k = BlurKernel::new(7, 3).unwrap();
        assert_eq!((k.width(), k.height()), (7, 3));
        assert_eq!(k.to_string(), "7x3");
    }

    #[rstest]
    #[case(0, 5)]
    #[case(5, 0)]
    #[case(0, 0)]
    fn test_new_rejects_zero(#[case] w: u32, #[case] h: u32) {
        assert_eq!(
            BlurKernel::new(w, h),
            Err(InvalidBlurKernel {
                width: w,
                height: h
            })
        );
    }
}
