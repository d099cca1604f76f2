use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZentuneError {
    /// The MSR register device could not be opened or accessed. Always
    /// fatal to the current invocation; never retried.
    #[error(transparent)]
    DeviceUnavailable(#[from] zentune_raw::MsrError),

    /// A CLI-level input outside its declared domain. Rejected before any
    /// device access, so bad input never partially mutates hardware.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, ZentuneError>;
