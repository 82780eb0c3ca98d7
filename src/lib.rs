//! A pure Rust reader and writer for Amber NetCDF restart files (`.ncrst`).
//!
//! Restart files store a single molecular dynamics snapshot (coordinates,
//! optional velocities and the periodic cell) inside a NetCDF classic
//! container, following the `AMBERRESTART` convention, version 1.0.
//!
//! # Features
//!
//! - **Restart codec** – Validates the convention on read, creates the full
//!   schema on first write, applies `scale_factor` attributes when reading
//! - **NetCDF classic container** – Self-contained CDF-1/CDF-2 implementation
//!   with the define/data phase protocol, typed variables and attributes
//! - **No native dependencies** – No `libnetcdf` or HDF5 required
//!
//! # Quick Start
//!
//! ```
//! use amber_restart::io::{AmberRestart, Format, Mode};
//! use amber_restart::{Frame, UnitCell};
//!
//! let dir = tempfile::tempdir()?;
//! let path = dir.path().join("water.ncrst");
//!
//! // A two-atom frame in a 15 Å cubic box
//! let mut frame = Frame::with_capacity(2);
//! frame.positions_mut()[1] = [0.9572, 0.0, 0.0];
//! frame.set_cell(UnitCell::orthorhombic(15.0, 15.0, 15.0));
//!
//! let mut restart = AmberRestart::open(&path, Mode::Write)?;
//! restart.write(&frame)?;
//! restart.close()?;
//!
//! let mut restart = AmberRestart::open(&path, Mode::Read)?;
//! assert_eq!(restart.nsteps()?, 1);
//!
//! let mut read = Frame::new();
//! restart.read(&mut read)?;
//! assert_eq!(read.size(), 2);
//! assert_eq!(read.positions()[1], [0.9572, 0.0, 0.0]);
//! assert_eq!(read.cell().a(), 15.0);
//! assert!(!read.has_velocities());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Module Organization
//!
//! - [`io`] – The [`Format`](io::Format) trait, restart options and the
//!   [`AmberRestart`](io::AmberRestart) codec
//! - [`netcdf`] – The NetCDF classic container the codec is built on
//!
//! # Data Types
//!
//! - [`Frame`] – Positions, optional velocities and unit cell of one snapshot
//! - [`UnitCell`] – Cell lengths (Å) and angles (degrees)
//! - [`CellShape`] – Infinite, orthorhombic or triclinic

mod model;

pub mod io;
pub mod netcdf;

pub use model::cell::{CellShape, UnitCell};
pub use model::frame::Frame;

pub use io::Error as IoError;
pub use netcdf::Error as NetcdfError;
