use std::fs;
use std::path::{Path, PathBuf};

use crate::pipeline::batch_error::BatchError;

/// One input image paired with its mirrored output path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl ImageJob {
    pub fn file_name(&self) -> String {
        self.input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// True if the file's extension is in `extensions` (compared case-insensitively,
/// without the leading dot).
pub fn has_allowed_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Lists `input_dir` (one level) and pairs each matching regular file with
/// `output_dir/<same name>`.
///
/// Results are sorted by file name so progress output is reproducible;
/// callers must not rely on the order for anything else.
pub fn collect_image_jobs(
    input_dir: &Path,
    output_dir: &Path,
    extensions: &[String],
) -> Result<Vec<ImageJob>, BatchError> {
    let list_err = |source| BatchError::ListInputDir {
        path: input_dir.to_path_buf(),
        source,
    };

    let mut jobs = Vec::new();
    for entry in fs::read_dir(input_dir).map_err(list_err)? {
        let entry = entry.map_err(list_err)?;
        let path = entry.path();
        if !path.is_file() || !has_allowed_extension(&path, extensions) {
            continue;
        }
        jobs.push(ImageJob {
            output: output_dir.join(entry.file_name()),
            input: path,
        });
    }

    jobs.sort_by(|a, b| a.input.file_name().cmp(&b.input.file_name()));
    Ok(jobs)
}
