//! Amber NetCDF restart files (`.ncrst`).
//!
//! A restart holds exactly one frame: atomic coordinates, optional velocities
//! and the unit cell, stored in a NetCDF classic container that follows the
//! `AMBERRESTART` convention, version 1.0. Files are validated when opened for
//! reading; for writing, the schema is created by the first [`Format::write`]
//! call, once the number of atoms is known.
//!
//! Any `scale_factor` attribute found on a variable multiplies its stored
//! values on read. Written files never carry scale factors.

mod reader;
mod writer;

use std::path::Path;

use log::warn;

use super::{Compression, Error, Format, FormatInfo, Mode, RestartOptions};
use crate::model::frame::Frame;
use crate::netcdf::{self, NcFile};

pub(crate) const CONVENTIONS: &str = "AMBERRESTART";
pub(crate) const CONVENTION_VERSION: &str = "1.0";
/// Width of the `label` dimension used by `cell_angular`.
pub(crate) const LABEL_LENGTH: usize = 10;
pub(crate) const SCALE_FACTOR: &str = "scale_factor";

const INFO: FormatInfo = FormatInfo {
    name: "Amber Restart",
    extension: ".ncrst",
    description: "Amber convention for binary NetCDF Restart files",
};

/// Reader and writer for a single Amber restart file.
#[derive(Debug)]
pub struct AmberRestart {
    file: NcFile,
    options: RestartOptions,
    validated: bool,
    frame_done: bool,
}

impl AmberRestart {
    pub fn open(path: impl AsRef<Path>, mode: Mode) -> Result<Self, Error> {
        Self::open_with(path, mode, &RestartOptions::default())
    }

    pub fn open_with(
        path: impl AsRef<Path>,
        mode: Mode,
        options: &RestartOptions,
    ) -> Result<Self, Error> {
        let path = path.as_ref();
        if options.compression != Compression::None {
            return Err(Error::UnsupportedCompression(options.compression));
        }

        let file = match mode {
            Mode::Append => return Err(Error::UnsupportedMode(mode)),
            Mode::Write => NcFile::create_with(path, options.version)?,
            Mode::Read => NcFile::open(path, Mode::Read).map_err(|err| match err {
                netcdf::Error::Format(details) => {
                    warn!("'{}' is not a NetCDF classic file: {details}", path.display());
                    Error::invalid_format(path)
                }
                other => Error::from(other),
            })?,
        };

        if mode == Mode::Read && !is_valid(&file, None) {
            return Err(Error::invalid_format(path));
        }

        Ok(Self {
            file,
            options: options.clone(),
            validated: mode == Mode::Read,
            frame_done: false,
        })
    }

    pub fn info() -> FormatInfo {
        INFO
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// The underlying container.
    pub fn container(&self) -> &NcFile {
        &self.file
    }

    /// Flushes the file, reporting errors that dropping would hide.
    pub fn close(self) -> Result<(), Error> {
        self.file.close()?;
        Ok(())
    }
}

/// Checks the `AMBERRESTART` convention of a container.
///
/// With `natoms` unset the check is done for reading and every failure is
/// reported as a warning. When writing, only an `atom` dimension that does
/// not match `natoms` is reported.
pub fn is_valid(file: &NcFile, natoms: Option<usize>) -> bool {
    let reading = natoms.is_none();
    let path = file.path().display();

    let conventions = file.global_attribute("Conventions");
    if conventions.as_deref() != Some(CONVENTIONS) {
        if reading {
            warn!("'{path}': we can only read AMBER convention, found {conventions:?}");
        }
        return false;
    }

    let version = file.global_attribute("ConventionVersion");
    if version.as_deref() != Some(CONVENTION_VERSION) {
        if reading {
            warn!(
                "'{path}': we can only read version {CONVENTION_VERSION} of AMBER convention, found {version:?}"
            );
        }
        return false;
    }

    let spatial = file.optional_dimension("spatial", 0);
    if spatial != 3 {
        if reading {
            warn!("'{path}': wrong size for spatial dimension: should be 3, is {spatial}");
        }
        return false;
    }

    if let Some(expected) = natoms {
        match file.dimension("atom") {
            Ok(found) if found == expected => {}
            Ok(found) => {
                warn!("'{path}': wrong size for atom dimension: should be {expected}, is {found}");
                return false;
            }
            Err(_) => {
                warn!("'{path}': missing atom dimension");
                return false;
            }
        }
    }
    true
}

impl Format for AmberRestart {
    fn read_step(&mut self, step: usize, frame: &mut Frame) -> Result<(), Error> {
        if step != 0 || self.frame_done {
            return Err(Error::single_reading());
        }

        let cell = self.read_cell()?;
        let natoms = self.file.dimension("atom")?;
        let positions = self.read_array("coordinates", natoms)?;
        let velocities = if self.file.variable_exists("velocities") {
            Some(self.read_array("velocities", natoms)?)
        } else {
            None
        };

        let mut next = Frame::new();
        next.set_cell(cell);
        next.resize(natoms);
        next.positions_mut().copy_from_slice(&positions);
        if let Some(velocities) = velocities {
            next.add_velocities();
            if let Some(target) = next.velocities_mut() {
                target.copy_from_slice(&velocities);
            }
        }

        *frame = next;
        self.frame_done = true;
        Ok(())
    }

    fn read(&mut self, frame: &mut Frame) -> Result<(), Error> {
        if self.frame_done {
            return Err(Error::single_reading());
        }
        self.read_step(0, frame)
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Error> {
        if self.frame_done {
            return Err(Error::single_writing());
        }

        let natoms = frame.size();
        if !self.validated {
            self.initialize(natoms, frame.has_velocities())?;
            if !is_valid(&self.file, Some(natoms)) {
                return Err(Error::invalid_format(self.file.path()));
            }
            self.validated = true;
        }

        self.write_cell(frame.cell())?;
        self.write_array("coordinates", frame.positions())?;
        if let Some(velocities) = frame.velocities() {
            self.write_array("velocities", velocities)?;
        }

        self.frame_done = true;
        Ok(())
    }

    fn nsteps(&mut self) -> Result<usize, Error> {
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::cell::{CellShape, UnitCell};
    use crate::netcdf::{Phase, Version};
    use byteorder::{BigEndian, WriteBytesExt};
    use std::path::PathBuf;

    const WATER_FIRST: [f64; 3] = [0.4172191, 8.303366, 11.73717];

    fn assert_close(actual: [f64; 3], expected: [f64; 3], tol: f64) {
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < tol, "{actual:?} != {expected:?}");
        }
    }

    struct Authored<'a> {
        conventions: &'a str,
        version: &'a str,
        spatial: usize,
        natoms: usize,
        first: [f64; 3],
        coordinate_scale: Option<f32>,
        cell: Option<([f64; 3], [f64; 3])>,
        length_scale: Option<f32>,
        velocities: bool,
    }

    impl Default for Authored<'_> {
        fn default() -> Self {
            Self {
                conventions: CONVENTIONS,
                version: CONVENTION_VERSION,
                spatial: 3,
                natoms: 297,
                first: WATER_FIRST,
                coordinate_scale: None,
                cell: Some(([15.0; 3], [90.0; 3])),
                length_scale: None,
                velocities: false,
            }
        }
    }

    /// Writes a restart through the raw container API, the way an MD engine
    /// would, including layouts this crate never writes itself.
    fn author(path: &Path, layout: &Authored<'_>) {
        let mut file = NcFile::create_with(path, Version::Classic).unwrap();
        file.add_global_attribute("Conventions", layout.conventions).unwrap();
        file.add_global_attribute("ConventionVersion", layout.version).unwrap();
        file.add_global_attribute("program", "sander").unwrap();
        file.add_global_attribute("title", "default_name").unwrap();
        file.add_dimension("spatial", layout.spatial).unwrap();
        file.add_dimension("atom", layout.natoms).unwrap();
        file.add_dimension("cell_spatial", 3).unwrap();
        file.add_dimension("cell_angular", 3).unwrap();
        file.add_dimension("label", LABEL_LENGTH).unwrap();
        file.add_variable::<f64>("time", &[])
            .unwrap()
            .add_string_attribute("units", "picosecond")
            .unwrap();
        {
            let mut coords = file
                .add_variable::<f64>("coordinates", &["atom", "spatial"])
                .unwrap();
            coords.add_string_attribute("units", "angstrom").unwrap();
            if let Some(scale) = layout.coordinate_scale {
                coords.add_float_attribute(SCALE_FACTOR, scale).unwrap();
            }
        }
        if layout.velocities {
            file.add_variable::<f64>("velocities", &["atom", "spatial"])
                .unwrap()
                .add_float_attribute(SCALE_FACTOR, 20.455)
                .unwrap();
        }
        if layout.cell.is_some() {
            let mut lengths = file
                .add_variable::<f64>("cell_lengths", &["cell_spatial"])
                .unwrap();
            if let Some(scale) = layout.length_scale {
                lengths.add_float_attribute(SCALE_FACTOR, scale).unwrap();
            }
            file.add_variable::<f64>("cell_angles", &["cell_angular"])
                .unwrap();
        }
        file.set_phase(Phase::Data).unwrap();

        file.variable::<f64>("time").unwrap().add(&[], &[], &[10.0]).unwrap();

        let (natoms, spatial) = (layout.natoms, layout.spatial);
        let mut coords: Vec<f64> = (0..natoms * spatial).map(|i| i as f64 * 0.01).collect();
        if natoms > 0 && spatial == 3 {
            coords[..3].copy_from_slice(&layout.first);
        }
        file.variable::<f64>("coordinates")
            .unwrap()
            .add(&[0, 0], &[natoms, spatial], &coords)
            .unwrap();

        if layout.velocities {
            file.variable::<f64>("velocities")
                .unwrap()
                .add(&[0, 0], &[natoms, 3], &vec![0.1; natoms * 3])
                .unwrap();
        }
        if let Some((lengths, angles)) = layout.cell {
            file.variable::<f64>("cell_lengths")
                .unwrap()
                .add(&[0], &[3], &lengths)
                .unwrap();
            file.variable::<f64>("cell_angles")
                .unwrap()
                .add(&[0], &[3], &angles)
                .unwrap();
        }
        file.close().unwrap();
    }

    fn temp_file(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        dir.path().join(name)
    }

    #[test]
    fn reads_water_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir, "water.ncrst");
        author(&path, &Authored::default());

        let mut restart = AmberRestart::open(&path, Mode::Read).unwrap();
        assert_eq!(restart.nsteps().unwrap(), 1);

        let mut frame = Frame::new();
        restart.read(&mut frame).unwrap();
        assert_eq!(frame.size(), 297);
        assert_close(frame.positions()[0], WATER_FIRST, 1e-6);
        assert!(!frame.has_velocities());

        let cell = frame.cell();
        assert_eq!(cell.shape(), CellShape::Orthorhombic);
        assert_close(cell.lengths(), [15.0; 3], 1e-12);
        assert_close(cell.angles(), [90.0; 3], 1e-12);
    }

    #[test]
    fn applies_scale_factors_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir, "scaled.ncrst");
        author(
            &path,
            &Authored {
                natoms: 4,
                first: [1.0, 2.0, 3.0],
                coordinate_scale: Some(2.0),
                cell: Some(([60.9682, 60.9682, 0.0], [90.0; 3])),
                length_scale: Some(1.765),
                velocities: true,
                ..Authored::default()
            },
        );

        let mut restart = AmberRestart::open(&path, Mode::Read).unwrap();
        let mut frame = Frame::new();
        restart.read_step(0, &mut frame).unwrap();

        assert_close(frame.positions()[0], [2.0, 4.0, 6.0], 1e-9);
        let scaled = 60.9682 * 1.765;
        assert_close(frame.cell().lengths(), [scaled, scaled, 0.0], 1e-4);
        assert_eq!(frame.cell().shape(), CellShape::Orthorhombic);

        let velocities = frame.velocities().unwrap();
        assert_close(velocities[3], [2.0455; 3], 1e-5);
    }

    #[test]
    fn missing_cell_variables_give_an_infinite_cell() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir, "nocell.ncrst");
        author(
            &path,
            &Authored {
                natoms: 2,
                cell: None,
                ..Authored::default()
            },
        );

        let mut restart = AmberRestart::open(&path, Mode::Read).unwrap();
        let mut frame = Frame::new();
        restart.read(&mut frame).unwrap();
        assert_eq!(frame.size(), 2);
        assert_eq!(*frame.cell(), UnitCell::default());
        assert_eq!(frame.cell().shape(), CellShape::Infinite);
    }

    #[test]
    fn rejects_files_breaking_the_convention() {
        let dir = tempfile::tempdir().unwrap();

        let cases = [
            Authored {
                conventions: "AMBER",
                ..Authored::default()
            },
            Authored {
                version: "2.0",
                ..Authored::default()
            },
            Authored {
                spatial: 2,
                ..Authored::default()
            },
        ];
        for (i, case) in cases.iter().enumerate() {
            let path = temp_file(&dir, &format!("bad-{i}.ncrst"));
            author(&path, case);
            let err = AmberRestart::open(&path, Mode::Read).unwrap_err();
            assert!(
                matches!(&err, Error::InvalidFormat { path: p } if *p == path),
                "case {i}: {err}"
            );
        }

        let garbage = temp_file(&dir, "garbage.ncrst");
        std::fs::write(&garbage, b"not a restart").unwrap();
        assert!(matches!(
            AmberRestart::open(&garbage, Mode::Read),
            Err(Error::InvalidFormat { .. })
        ));
    }

    #[test]
    fn file_without_spatial_dimension_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir, "nospatial.ncrst");
        {
            let mut file = NcFile::open(&path, Mode::Write).unwrap();
            file.add_global_attribute("Conventions", CONVENTIONS).unwrap();
            file.add_global_attribute("ConventionVersion", CONVENTION_VERSION)
                .unwrap();
            file.close().unwrap();
        }
        let file = NcFile::open(&path, Mode::Read).unwrap();
        assert!(!is_valid(&file, None));
    }

    #[test]
    fn roundtrip_with_velocities_and_triclinic_cell() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir, "roundtrip.ncrst");

        let mut frame = Frame::with_capacity(3);
        frame.positions_mut().copy_from_slice(&[
            [1.0, 2.0, 3.0],
            [4.0, 5.0, 6.0],
            [-7.5, 8.25, 0.0],
        ]);
        frame.add_velocities();
        if let Some(velocities) = frame.velocities_mut() {
            velocities[1] = [0.5, -0.5, 1.5];
        }
        frame.set_cell(UnitCell::new([10.0, 11.0, 12.0], [80.0, 95.0, 120.0]));

        let options = RestartOptions {
            program: "tests".to_string(),
            program_version: "0.0.1".to_string(),
            ..RestartOptions::default()
        };
        let mut restart = AmberRestart::open_with(&path, Mode::Write, &options).unwrap();
        restart.write(&frame).unwrap();
        restart.close().unwrap();

        let mut restart = AmberRestart::open(&path, Mode::Read).unwrap();
        let mut read = Frame::new();
        restart.read(&mut read).unwrap();
        assert_eq!(read, frame);
        assert_eq!(read.cell().shape(), CellShape::Triclinic);

        let file = restart.container();
        assert_eq!(file.global_attribute("program").as_deref(), Some("tests"));
        assert_eq!(
            file.global_attribute("programVersion").as_deref(),
            Some("0.0.1")
        );
        assert_eq!(file.dimension("label").unwrap(), LABEL_LENGTH);
        for var in file.variables() {
            assert!(
                var.attributes.iter().all(|(name, _)| name != SCALE_FACTOR),
                "{} carries a scale factor",
                var.name
            );
        }
    }

    #[test]
    fn written_schema_follows_the_convention() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir, "schema.ncrst");

        let mut restart = AmberRestart::open(&path, Mode::Write).unwrap();
        restart.write(&Frame::with_capacity(5)).unwrap();
        restart.close().unwrap();

        let mut file = NcFile::open(&path, Mode::Read).unwrap();
        assert!(is_valid(&file, Some(5)));
        assert!(!is_valid(&file, Some(6)));
        assert!(!file.variable_exists("velocities"));

        assert_eq!(
            file.variable::<u8>("spatial").unwrap().get_strings().unwrap(),
            vec!["xyz"]
        );
        assert_eq!(
            file.variable::<u8>("cell_spatial")
                .unwrap()
                .get_strings()
                .unwrap(),
            vec!["abc"]
        );
        assert_eq!(
            file.variable::<u8>("cell_angular")
                .unwrap()
                .get_strings()
                .unwrap(),
            vec!["alpha", "beta", "gamma"]
        );

        let units = |file: &mut NcFile, name: &str| {
            file.variable::<f64>(name)
                .unwrap()
                .string_attribute("units")
                .unwrap()
        };
        assert_eq!(units(&mut file, "coordinates"), "angstrom");
        assert_eq!(units(&mut file, "cell_lengths"), "angstrom");
        assert_eq!(units(&mut file, "cell_angles"), "degree");
    }

    #[test]
    fn second_write_fails_and_leaves_the_file_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir, "twice.ncrst");

        let mut restart = AmberRestart::open(&path, Mode::Write).unwrap();
        let mut frame = Frame::with_capacity(2);
        restart.write(&frame).unwrap();
        let before = std::fs::read(&path).unwrap();

        frame.positions_mut()[0] = [9.0; 3];
        let err = restart.write(&frame).unwrap_err();
        assert!(matches!(err, Error::SingleFrame("writing")));
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn only_one_frame_can_be_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir, "once.ncrst");
        author(
            &path,
            &Authored {
                natoms: 3,
                ..Authored::default()
            },
        );

        let mut restart = AmberRestart::open(&path, Mode::Read).unwrap();
        let mut frame = Frame::new();
        assert!(matches!(
            restart.read_step(1, &mut frame),
            Err(Error::SingleFrame("reading"))
        ));
        restart.read(&mut frame).unwrap();

        let snapshot = frame.clone();
        assert!(matches!(
            restart.read(&mut frame),
            Err(Error::SingleFrame("reading"))
        ));
        assert!(matches!(
            restart.read_step(0, &mut frame),
            Err(Error::SingleFrame(_))
        ));
        assert_eq!(frame, snapshot);
    }

    #[test]
    fn empty_frame_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir, "empty.ncrst");

        let mut frame = Frame::new();
        frame.add_velocities();
        frame.set_cell(UnitCell::orthorhombic(20.0, 20.0, 20.0));

        let mut restart = AmberRestart::open(&path, Mode::Write).unwrap();
        restart.write(&frame).unwrap();
        restart.close().unwrap();

        let mut restart = AmberRestart::open(&path, Mode::Read).unwrap();
        let mut read = Frame::with_capacity(10);
        restart.read(&mut read).unwrap();
        assert_eq!(read.size(), 0);
        assert!(read.has_velocities());
        assert_close(read.cell().lengths(), [20.0; 3], 1e-12);
    }

    #[test]
    fn classic_container_version_is_honored() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir, "classic.ncrst");
        let options = RestartOptions {
            version: Version::Classic,
            ..RestartOptions::default()
        };

        let mut restart = AmberRestart::open_with(&path, Mode::Write, &options).unwrap();
        restart.write(&Frame::with_capacity(1)).unwrap();
        restart.close().unwrap();

        let restart = AmberRestart::open(&path, Mode::Read).unwrap();
        assert_eq!(restart.container().version(), Version::Classic);
        assert_eq!(restart.path(), path.as_path());
    }

    #[test]
    fn unsupported_modes_and_options_fail_before_touching_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir, "never.ncrst");

        assert!(matches!(
            AmberRestart::open(&path, Mode::Append),
            Err(Error::UnsupportedMode(Mode::Append))
        ));

        let options = RestartOptions {
            compression: Compression::Gzip,
            ..RestartOptions::default()
        };
        assert!(matches!(
            AmberRestart::open_with(&path, Mode::Write, &options),
            Err(Error::UnsupportedCompression(Compression::Gzip))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn file_closed_before_any_write_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir, "unwritten.ncrst");
        AmberRestart::open(&path, Mode::Write)
            .unwrap()
            .close()
            .unwrap();

        assert!(matches!(
            AmberRestart::open(&path, Mode::Read),
            Err(Error::InvalidFormat { .. })
        ));
    }

    /// A conforming restart with a `spatial` dimension but no coordinates.
    fn author_without_coordinates(path: &Path, with_atom: bool) {
        let mut file = NcFile::create_with(path, Version::Classic).unwrap();
        file.add_global_attribute("Conventions", CONVENTIONS).unwrap();
        file.add_global_attribute("ConventionVersion", CONVENTION_VERSION)
            .unwrap();
        file.add_dimension("spatial", 3).unwrap();
        if with_atom {
            file.add_dimension("atom", 2).unwrap();
        }
        file.close().unwrap();
    }

    /// Hand-encodes a conforming CDF-1 header of double variables whose data
    /// section is never written.
    fn write_bare_header(
        path: &Path,
        dimensions: &[(&str, u32)],
        variables: &[(&str, &[u32])],
    ) {
        fn put_name(out: &mut Vec<u8>, name: &str) {
            out.write_u32::<BigEndian>(name.len() as u32).unwrap();
            out.extend_from_slice(name.as_bytes());
            out.resize(out.len().next_multiple_of(4), 0);
        }

        let mut out = b"CDF\x01".to_vec();
        out.write_u32::<BigEndian>(0).unwrap();

        out.write_u32::<BigEndian>(0x0A).unwrap();
        out.write_u32::<BigEndian>(dimensions.len() as u32).unwrap();
        for &(name, size) in dimensions {
            put_name(&mut out, name);
            out.write_u32::<BigEndian>(size).unwrap();
        }

        out.write_u32::<BigEndian>(0x0C).unwrap();
        out.write_u32::<BigEndian>(2).unwrap();
        for (name, value) in [
            ("Conventions", CONVENTIONS),
            ("ConventionVersion", CONVENTION_VERSION),
        ] {
            put_name(&mut out, name);
            out.write_u32::<BigEndian>(2).unwrap(); // char
            put_name(&mut out, value);
        }

        out.write_u32::<BigEndian>(0x0B).unwrap();
        out.write_u32::<BigEndian>(variables.len() as u32).unwrap();
        for &(name, dim_ids) in variables {
            put_name(&mut out, name);
            out.write_u32::<BigEndian>(dim_ids.len() as u32).unwrap();
            for &id in dim_ids {
                out.write_u32::<BigEndian>(id).unwrap();
            }
            out.write_u64::<BigEndian>(0).unwrap(); // no attributes
            out.write_u32::<BigEndian>(6).unwrap(); // double
            out.write_u32::<BigEndian>(0).unwrap();
            out.write_u32::<BigEndian>(1024).unwrap();
        }
        std::fs::write(path, out).unwrap();
    }

    #[test]
    fn missing_atom_data_is_a_lookup_error_and_keeps_the_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut previous = Frame::with_capacity(1);
        previous.positions_mut()[0] = [1.0, 2.0, 3.0];
        previous.set_cell(UnitCell::orthorhombic(5.0, 5.0, 5.0));

        let path = temp_file(&dir, "noatom.ncrst");
        author_without_coordinates(&path, false);
        let mut restart = AmberRestart::open(&path, Mode::Read).unwrap();
        let mut frame = previous.clone();
        let err = restart.read(&mut frame).unwrap_err();
        assert!(
            matches!(&err, Error::Lookup(netcdf::Error::MissingDimension(name)) if name == "atom"),
            "{err}"
        );
        assert_eq!(frame, previous);

        let path = temp_file(&dir, "nocoordinates.ncrst");
        author_without_coordinates(&path, true);
        let mut restart = AmberRestart::open(&path, Mode::Read).unwrap();
        let mut frame = previous.clone();
        let err = restart.read(&mut frame).unwrap_err();
        assert!(
            matches!(&err, Error::Lookup(netcdf::Error::MissingVariable(name)) if name == "coordinates"),
            "{err}"
        );
        assert_eq!(frame, previous);
    }

    #[test]
    fn overflowing_variable_size_is_an_invalid_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir, "overflow.ncrst");
        write_bare_header(
            &path,
            &[
                ("spatial", 3),
                ("x", 0xFFFF_FFF0),
                ("y", 0xFFFF_FFF0),
                ("z", 0xFFFF_FFF0),
            ],
            &[("grid", &[1, 2, 3][..])],
        );

        assert!(matches!(
            AmberRestart::open(&path, Mode::Read),
            Err(Error::InvalidFormat { .. })
        ));
    }

    #[test]
    fn atom_count_past_the_end_of_the_file_fails_before_allocating() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir, "truncated.ncrst");
        write_bare_header(
            &path,
            &[("spatial", 3), ("atom", 0xFFFF_FFF0)],
            &[("coordinates", &[1, 0][..])],
        );

        let mut restart = AmberRestart::open(&path, Mode::Read).unwrap();
        let mut frame = Frame::new();
        let err = restart.read(&mut frame).unwrap_err();
        assert!(
            matches!(&err, Error::Container(netcdf::Error::Format(msg)) if msg.contains("past the end")),
            "{err}"
        );
        assert_eq!(frame, Frame::new());
    }

    #[test]
    fn format_information() {
        let info = AmberRestart::info();
        assert_eq!(info.name, "Amber Restart");
        assert_eq!(info.extension, ".ncrst");
    }
}
