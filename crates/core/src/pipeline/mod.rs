pub mod batch_error;
pub mod batch_executor;
pub mod blur_directory_use_case;
pub mod blur_image_use_case;
pub mod error_policy;
pub mod image_job;
pub mod infrastructure;
pub mod pipeline_logger;
