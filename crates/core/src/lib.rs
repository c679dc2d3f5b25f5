//! Batch face blurring: detect faces in every image of a directory and
//! box-blur them into a mirrored output directory.

pub mod blurring;
pub mod detection;
pub mod imaging;
pub mod pipeline;
pub mod shared;
