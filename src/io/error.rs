use std::path::PathBuf;

use super::{Compression, Mode};
use crate::netcdf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid AMBER Restart file at '{}'", path.display())]
    InvalidFormat { path: PathBuf },

    #[error("AMBER Restart format does not support {0} mode")]
    UnsupportedMode(Mode),

    #[error("AMBER Restart format does not support {0} compression")]
    UnsupportedCompression(Compression),

    #[error("AMBER Restart format only supports {0} one frame")]
    SingleFrame(&'static str),

    #[error("missing data in restart file: {0}")]
    Lookup(#[source] netcdf::Error),

    #[error("NetCDF container error: {0}")]
    Container(#[source] netcdf::Error),
}

impl From<netcdf::Error> for Error {
    fn from(e: netcdf::Error) -> Self {
        match e {
            netcdf::Error::Io { source } => Error::Io { source },
            e if e.is_lookup() => Error::Lookup(e),
            e => Error::Container(e),
        }
    }
}

impl Error {
    pub fn invalid_format(path: impl Into<PathBuf>) -> Self {
        Self::InvalidFormat { path: path.into() }
    }

    pub(crate) fn single_reading() -> Self {
        Self::SingleFrame("reading")
    }

    pub(crate) fn single_writing() -> Self {
        Self::SingleFrame("writing")
    }
}
