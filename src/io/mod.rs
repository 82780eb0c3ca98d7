//! Trajectory formats built on the [`netcdf`](crate::netcdf) container.
//!
//! The only format shipped is the Amber NetCDF restart convention
//! ([`ncrst::AmberRestart`]); it is driven through the [`Format`] trait.

use std::fmt;

use crate::model::frame::Frame;

pub mod error;
pub mod ncrst;

pub use crate::netcdf::{Mode, Version};
pub use error::Error;
pub use ncrst::AmberRestart;

/// Compression applied on top of a file. Restart files support none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Bzip2,
    Lzma,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Gzip => write!(f, "gzip"),
            Compression::Bzip2 => write!(f, "bzip2"),
            Compression::Lzma => write!(f, "lzma"),
        }
    }
}

/// Options used when opening a restart file.
#[derive(Debug, Clone)]
pub struct RestartOptions {
    pub compression: Compression,
    /// Value of the `program` global attribute of new files.
    pub program: String,
    /// Value of the `programVersion` global attribute of new files.
    pub program_version: String,
    /// On-disk container version of new files.
    pub version: Version,
}

impl Default for RestartOptions {
    fn default() -> Self {
        Self {
            compression: Compression::None,
            program: env!("CARGO_PKG_NAME").to_string(),
            program_version: env!("CARGO_PKG_VERSION").to_string(),
            version: Version::default(),
        }
    }
}

/// Static description of a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    pub name: &'static str,
    pub extension: &'static str,
    pub description: &'static str,
}

/// Frame-level access to a trajectory file.
pub trait Format {
    /// Reads the frame at `step` into `frame`.
    fn read_step(&mut self, step: usize, frame: &mut Frame) -> Result<(), Error>;

    /// Reads the next frame into `frame`.
    fn read(&mut self, frame: &mut Frame) -> Result<(), Error>;

    /// Appends `frame` to the file.
    fn write(&mut self, frame: &Frame) -> Result<(), Error>;

    /// Number of frames in the file.
    fn nsteps(&mut self) -> Result<usize, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_carry_package_identity() {
        let options = RestartOptions::default();
        assert_eq!(options.compression, Compression::None);
        assert_eq!(options.program, "amber-restart");
        assert_eq!(options.program_version, env!("CARGO_PKG_VERSION"));
        assert_eq!(options.version, Version::Offset64);
    }

    #[test]
    fn compression_display_names() {
        assert_eq!(Compression::Gzip.to_string(), "gzip");
        assert_eq!(Compression::None.to_string(), "none");
    }
}
