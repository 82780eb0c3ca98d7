//! Pure Rust implementation of the NetCDF classic container.
//!
//! A container holds named dimensions, named multi-dimensional typed variables
//! with their own attributes, and global attributes. Files use the classic
//! (CDF-1) or 64-bit offset (CDF-2) binary layout, which is what Amber and most
//! molecular dynamics engines produce.
//!
//! Mutation follows the two-phase protocol of the reference library: a freshly
//! created container starts in [`Phase::Define`], where dimensions, variables
//! and attributes may be declared; switching to [`Phase::Data`] freezes the
//! schema, writes the header and fills every variable with its default fill
//! value. Variable data can only be read or written in the data phase.
//!
//! ```
//! use amber_restart::netcdf::{Mode, NcFile, Phase};
//!
//! let dir = tempfile::tempdir()?;
//! let path = dir.path().join("example.nc");
//!
//! let mut file = NcFile::open(&path, Mode::Write)?;
//! file.add_dimension("spatial", 3)?;
//! file.add_global_attribute("title", "example")?;
//! file.add_variable::<f64>("origin", &["spatial"])?;
//! file.set_phase(Phase::Data)?;
//! file.variable::<f64>("origin")?.add(&[0], &[3], &[1.0, 2.0, 3.0])?;
//! file.close()?;
//!
//! let mut file = NcFile::open(&path, Mode::Read)?;
//! assert_eq!(file.dimension("spatial")?, 3);
//! assert_eq!(file.global_attribute("title").as_deref(), Some("example"));
//! assert_eq!(file.variable::<f64>("origin")?.get(&[0], &[3])?, vec![1.0, 2.0, 3.0]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod header;
mod types;
mod variable;
mod xdr;

pub use error::Error;
pub use header::Version;
pub use types::{AttrValue, NcType, NcValue};
pub use variable::Variable;

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use header::{Dimension, Header, NUMRECS_OFFSET, VarInfo, find_attribute, set_attribute};

/// How a container (or a restart file) is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Open an existing file, read-only.
    Read,
    /// Create a new file, truncating any existing one.
    Write,
    /// Open an existing file for reading and writing data.
    Append,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Read => write!(f, "read ('r')"),
            Mode::Write => write!(f, "write ('w')"),
            Mode::Append => write!(f, "append ('a')"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid file mode '{0}': expected 'r', 'w' or 'a'")]
pub struct ParseModeError(char);

impl TryFrom<char> for Mode {
    type Error = ParseModeError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'r' => Ok(Mode::Read),
            'w' => Ok(Mode::Write),
            'a' => Ok(Mode::Append),
            other => Err(ParseModeError(other)),
        }
    }
}

/// Mutation phase of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Schema definition: dimensions, variables and attributes may be added.
    Define,
    /// Data access: the schema is frozen.
    Data,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Define => f.write_str("define"),
            Phase::Data => f.write_str("data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionSummary {
    pub name: String,
    /// Current length; the record count for the unlimited dimension.
    pub size: usize,
    pub unlimited: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableSummary {
    pub name: String,
    pub nc_type: NcType,
    pub dimensions: Vec<DimensionSummary>,
    pub attributes: Vec<(String, AttrValue)>,
}

/// An open NetCDF classic container.
#[derive(Debug)]
pub struct NcFile {
    file: File,
    path: PathBuf,
    mode: Mode,
    phase: Phase,
    header: Header,
}

impl NcFile {
    /// Opens an existing container ([`Mode::Read`], [`Mode::Append`]) or
    /// creates a new 64-bit offset container ([`Mode::Write`]).
    pub fn open(path: impl AsRef<Path>, mode: Mode) -> Result<Self, Error> {
        match mode {
            Mode::Write => Self::create_with(path, Version::default()),
            Mode::Read | Mode::Append => Self::open_existing(path.as_ref(), mode),
        }
    }

    /// Creates a new container using the given on-disk version.
    pub fn create_with(path: impl AsRef<Path>, version: Version) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;

        debug!("created NetCDF container '{}' ({version})", path.display());

        Ok(Self {
            file,
            path,
            mode: Mode::Write,
            phase: Phase::Define,
            header: Header::new(version),
        })
    }

    fn open_existing(path: &Path, mode: Mode) -> Result<Self, Error> {
        let file = OpenOptions::new()
            .read(true)
            .write(mode == Mode::Append)
            .open(path)?;

        let mut header = Header::decode(BufReader::new(&file))?;
        if header.streaming {
            let len = file.metadata()?.len();
            let record_size = header.record_size();
            header.numrecs = match header.record_begin() {
                Some(begin) if record_size > 0 && len > begin => (len - begin) / record_size,
                _ => 0,
            };
            header.streaming = false;
        }

        debug!(
            "opened NetCDF container '{}' ({}, {} dimensions, {} variables, {} records)",
            path.display(),
            header.version,
            header.dimensions.len(),
            header.variables.len(),
            header.numrecs
        );

        Ok(Self {
            file,
            path: path.to_path_buf(),
            mode,
            phase: Phase::Data,
            header,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn version(&self) -> Version {
        self.header.version
    }

    /// Switches the mutation phase.
    ///
    /// Requesting the current phase is a no-op. Leaving the define phase
    /// writes the header and fills all fixed-size variables; going back from
    /// the data phase to the define phase is not supported.
    pub fn set_phase(&mut self, phase: Phase) -> Result<(), Error> {
        if self.phase == phase {
            return Ok(());
        }
        match phase {
            Phase::Data => self.end_define(),
            Phase::Define => Err(Error::Phase {
                operation: "re-enter the define phase",
                phase: Phase::Data,
            }),
        }
    }

    fn end_define(&mut self) -> Result<(), Error> {
        self.header.compute_layout()?;

        let header = &self.header;
        let file = &mut self.file;

        file.seek(SeekFrom::Start(0))?;
        file.write_all(&header.encode())?;

        for var in header.variables.iter().filter(|v| !header.is_record_var(v)) {
            let fill = fill_slab(var, var.slab as usize);
            file.seek(SeekFrom::Start(var.begin))?;
            file.write_all(&fill)?;
        }

        self.phase = Phase::Data;
        debug!(
            "'{}' entered data phase, fixed data ends at byte {}",
            self.path.display(),
            self.header.fixed_end()
        );
        Ok(())
    }

    fn ensure_define(&self, operation: &'static str) -> Result<(), Error> {
        if self.mode == Mode::Read {
            return Err(Error::ReadOnly(operation));
        }
        if self.phase != Phase::Define {
            return Err(Error::Phase {
                operation,
                phase: self.phase,
            });
        }
        Ok(())
    }

    /// Declares a dimension. A size of zero declares the unlimited (record)
    /// dimension, of which there can be only one.
    pub fn add_dimension(&mut self, name: &str, size: usize) -> Result<(), Error> {
        self.ensure_define("add a dimension")?;
        check_name("dimension", name)?;

        if self.header.find_dimension(name).is_some() {
            return Err(Error::Duplicate {
                kind: "dimension",
                name: name.to_string(),
            });
        }
        if size == 0 && self.header.record_dimension().is_some() {
            return Err(Error::Schema(format!(
                "cannot add '{name}': only one unlimited dimension is allowed"
            )));
        }
        if size > u32::MAX as usize {
            return Err(Error::Schema(format!(
                "dimension '{name}' is too large ({size})"
            )));
        }

        self.header.dimensions.push(Dimension {
            name: name.to_string(),
            size,
            unlimited: size == 0,
        });
        Ok(())
    }

    /// Sets a global attribute, replacing any previous value.
    pub fn add_global_attribute(
        &mut self,
        name: &str,
        value: impl Into<AttrValue>,
    ) -> Result<(), Error> {
        self.ensure_define("add a global attribute")?;
        check_name("attribute", name)?;
        set_attribute(&mut self.header.attributes, name, value.into());
        Ok(())
    }

    /// Declares a variable of element type `T` over the named dimensions.
    pub fn add_variable<T: NcValue>(
        &mut self,
        name: &str,
        dimensions: &[&str],
    ) -> Result<Variable<'_, T>, Error> {
        self.ensure_define("add a variable")?;
        check_name("variable", name)?;

        if self.header.find_variable(name).is_some() {
            return Err(Error::Duplicate {
                kind: "variable",
                name: name.to_string(),
            });
        }

        let mut dim_ids = Vec::with_capacity(dimensions.len());
        for (axis, dim) in dimensions.iter().enumerate() {
            let id = self
                .header
                .find_dimension(dim)
                .ok_or_else(|| Error::MissingDimension(dim.to_string()))?;
            if axis > 0 && self.header.dimensions[id].unlimited {
                return Err(Error::Schema(format!(
                    "unlimited dimension '{dim}' must be the first dimension of '{name}'"
                )));
            }
            dim_ids.push(id);
        }

        self.header
            .variables
            .push(VarInfo::new(name, dim_ids, T::TYPE));
        let id = self.header.variables.len() - 1;
        Ok(Variable::new(self, id))
    }

    /// Size of a dimension.
    pub fn dimension(&self, name: &str) -> Result<usize, Error> {
        self.header
            .find_dimension(name)
            .map(|id| self.header.dim_size(id))
            .ok_or_else(|| Error::MissingDimension(name.to_string()))
    }

    /// Size of a dimension, or `default` when it does not exist.
    pub fn optional_dimension(&self, name: &str, default: usize) -> usize {
        self.dimension(name).unwrap_or(default)
    }

    pub fn variable_exists(&self, name: &str) -> bool {
        self.header.find_variable(name).is_some()
    }

    /// Value of a text global attribute; `None` when absent or not text.
    pub fn global_attribute(&self, name: &str) -> Option<String> {
        find_attribute(&self.header.attributes, name)
            .and_then(AttrValue::as_str)
            .map(str::to_string)
    }

    /// Accessor to an existing variable whose element type must be `T`.
    pub fn variable<T: NcValue>(&mut self, name: &str) -> Result<Variable<'_, T>, Error> {
        let id = self
            .header
            .find_variable(name)
            .ok_or_else(|| Error::MissingVariable(name.to_string()))?;

        let found = self.header.variables[id].nc_type;
        if found != T::TYPE {
            return Err(Error::TypeMismatch {
                variable: name.to_string(),
                expected: T::TYPE,
                found,
            });
        }
        Ok(Variable::new(self, id))
    }

    pub fn dimensions(&self) -> Vec<DimensionSummary> {
        (0..self.header.dimensions.len())
            .map(|id| self.dimension_summary(id))
            .collect()
    }

    pub fn variables(&self) -> Vec<VariableSummary> {
        self.header
            .variables
            .iter()
            .map(|var| VariableSummary {
                name: var.name.clone(),
                nc_type: var.nc_type,
                dimensions: var
                    .dim_ids
                    .iter()
                    .map(|&id| self.dimension_summary(id))
                    .collect(),
                attributes: var
                    .attributes
                    .iter()
                    .map(|a| (a.name.clone(), a.value.clone()))
                    .collect(),
            })
            .collect()
    }

    pub fn global_attributes(&self) -> Vec<(String, AttrValue)> {
        self.header
            .attributes
            .iter()
            .map(|a| (a.name.clone(), a.value.clone()))
            .collect()
    }

    fn dimension_summary(&self, id: usize) -> DimensionSummary {
        let dim = &self.header.dimensions[id];
        DimensionSummary {
            name: dim.name.clone(),
            size: self.header.dim_size(id),
            unlimited: dim.unlimited,
        }
    }

    /// Finishes the definition phase if needed and flushes the file.
    pub fn close(mut self) -> Result<(), Error> {
        if self.mode == Mode::Write && self.phase == Phase::Define {
            self.end_define()?;
        }
        self.file.flush()?;
        Ok(())
    }

    fn read_at(&self, offset: u64, len: usize) -> Result<Vec<u8>, Error> {
        let mut handle = &self.file;
        handle.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; len];
        handle.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> Result<(), Error> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(bytes)?;
        Ok(())
    }

    /// Extends the record dimension to `numrecs`, filling the new records.
    fn grow_records(&mut self, numrecs: u64) -> Result<(), Error> {
        if let Some(begin) = self.header.record_begin() {
            let record_size = self.header.record_size();
            let mut record = vec![0u8; record_size as usize];
            for var in self
                .header
                .variables
                .iter()
                .filter(|v| self.header.is_record_var(v))
            {
                let slab = var.slab as usize;
                let start = (var.begin - begin) as usize;
                record[start..start + slab].copy_from_slice(&fill_slab(var, slab)[..slab]);
            }

            for r in self.header.numrecs..numrecs {
                self.write_at(begin + r * record_size, &record)?;
            }
        }

        self.header.numrecs = numrecs;
        self.write_at(NUMRECS_OFFSET, &(numrecs as u32).to_be_bytes())
    }
}

impl Drop for NcFile {
    fn drop(&mut self) {
        if self.mode == Mode::Write && self.phase == Phase::Define {
            if let Err(err) = self.end_define() {
                warn!(
                    "failed to finalize NetCDF header of '{}': {err}",
                    self.path.display()
                );
            }
        }
    }
}

/// Fill values for `slab` bytes of a variable, padded with zeros to its vsize.
fn fill_slab(var: &VarInfo, slab: usize) -> Vec<u8> {
    let pattern = var.nc_type.fill_bytes();
    let mut out: Vec<u8> = pattern.iter().copied().cycle().take(slab).collect();
    out.resize((var.vsize as usize).max(slab), 0);
    out
}

fn check_name(kind: &'static str, name: &str) -> Result<(), Error> {
    if name.is_empty() || name.contains('/') || name.contains('\0') {
        return Err(Error::Schema(format!("invalid {kind} name '{name}'")));
    }
    Ok(())
}
