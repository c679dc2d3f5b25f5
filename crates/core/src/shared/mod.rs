pub mod blur_kernel;
pub mod bounding_box;
pub mod constants;
pub mod frame;
