use thiserror::Error;

/// Everything an adapter read or export can fail with. None of these are
/// retried internally; they propagate to the caller immediately.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("download error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("hdf5 error: {0}")]
    Hdf5(#[from] hdf5::Error),
    #[error("npz error: {0}")]
    Npz(#[from] ndarray_npy::ReadNpzError),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("no element for nuclear charge {0}")]
    UnknownElement(i64),
    #[error("index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("mismatched arrays: {0}")]
    Mismatch(String),
    #[error("archive error: {0}")]
    Archive(String),
}

pub type Result<T> = std::result::Result<T, DatasetError>;
