#![forbid(unsafe_code)]

use thiserror::Error;

#[derive(Debug, Error)]
pub enum YufError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid archive: {0}")]
    Format(String),

    #[error("archive exceeds the format's 4 GiB limit (at byte {0})")]
    SizeLimit(u64),

    #[error("too many directories: {0} does not fit the 16-bit id field")]
    TooManyDirectories(usize),
}

pub type YufResult<T> = Result<T, YufError>;
