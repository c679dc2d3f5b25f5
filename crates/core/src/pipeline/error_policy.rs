use std::str::FromStr;

/// What the batch does when detecting or blurring one image fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Abort the whole run on the first failure.
    #[default]
    Halt,
    /// Report the failure and continue with the next image.
    Skip,
}

impl FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "halt" => Ok(ErrorPolicy::Halt),
            "skip" => Ok(ErrorPolicy::Skip),
            other => Err(format!("error policy must be 'halt' or 'skip', got '{other}'")),
        }
    }
}
