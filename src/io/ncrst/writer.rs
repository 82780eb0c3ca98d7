use log::info;

use super::{AmberRestart, CONVENTION_VERSION, CONVENTIONS, LABEL_LENGTH};
use crate::io::Error;
use crate::model::cell::UnitCell;
use crate::netcdf::Phase;

impl AmberRestart {
    /// Creates the restart schema for `natoms` atoms and writes the label
    /// variables.
    pub(super) fn initialize(&mut self, natoms: usize, with_velocities: bool) -> Result<(), Error> {
        info!(
            "initializing AMBER restart '{}' for {natoms} atoms{}",
            self.file.path().display(),
            if with_velocities { " with velocities" } else { "" }
        );

        let file = &mut self.file;
        file.set_phase(Phase::Define)?;

        file.add_global_attribute("Conventions", CONVENTIONS)?;
        file.add_global_attribute("ConventionVersion", CONVENTION_VERSION)?;
        file.add_global_attribute("program", self.options.program.as_str())?;
        file.add_global_attribute("programVersion", self.options.program_version.as_str())?;

        file.add_dimension("spatial", 3)?;
        file.add_dimension("atom", natoms)?;
        file.add_dimension("cell_spatial", 3)?;
        file.add_dimension("cell_angular", 3)?;
        file.add_dimension("label", LABEL_LENGTH)?;

        file.add_variable::<u8>("spatial", &["spatial"])?;
        file.add_variable::<u8>("cell_spatial", &["cell_spatial"])?;
        file.add_variable::<u8>("cell_angular", &["cell_angular", "label"])?;

        file.add_variable::<f64>("coordinates", &["atom", "spatial"])?
            .add_string_attribute("units", "angstrom")?;
        file.add_variable::<f64>("cell_lengths", &["cell_spatial"])?
            .add_string_attribute("units", "angstrom")?;
        file.add_variable::<f64>("cell_angles", &["cell_angular"])?
            .add_string_attribute("units", "degree")?;
        if with_velocities {
            file.add_variable::<f64>("velocities", &["atom", "spatial"])?
                .add_string_attribute("units", "angstrom/picosecond")?;
        }

        file.set_phase(Phase::Data)?;

        file.variable::<u8>("spatial")?.add_str("xyz")?;
        file.variable::<u8>("cell_spatial")?.add_str("abc")?;
        file.variable::<u8>("cell_angular")?
            .add_strings(&["alpha", "beta", "gamma"])?;
        Ok(())
    }

    pub(super) fn write_cell(&mut self, cell: &UnitCell) -> Result<(), Error> {
        self.file
            .variable::<f64>("cell_lengths")?
            .add(&[0], &[3], &cell.lengths())?;
        self.file
            .variable::<f64>("cell_angles")?
            .add(&[0], &[3], &cell.angles())?;
        Ok(())
    }

    /// Writes `array` into an `[atom, spatial]` variable in one call.
    pub(super) fn write_array(&mut self, name: &str, array: &[[f64; 3]]) -> Result<(), Error> {
        let data: Vec<f64> = array.iter().flatten().copied().collect();
        self.file
            .variable::<f64>(name)?
            .add(&[0, 0], &[array.len(), 3], &data)?;
        Ok(())
    }
}
