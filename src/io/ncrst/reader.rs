use super::{AmberRestart, SCALE_FACTOR};
use crate::io::Error;
use crate::model::cell::UnitCell;
use crate::netcdf::Variable;

impl AmberRestart {
    /// Reads the unit cell, falling back to an infinite cell when the file
    /// has no usable cell data.
    pub(super) fn read_cell(&mut self) -> Result<UnitCell, Error> {
        let file = &mut self.file;
        if !file.variable_exists("cell_lengths") || !file.variable_exists("cell_angles") {
            return Ok(UnitCell::default());
        }
        if file.optional_dimension("cell_spatial", 0) != 3
            || file.optional_dimension("cell_angular", 0) != 3
        {
            return Ok(UnitCell::default());
        }

        let lengths = self.read_vector("cell_lengths")?;
        let angles = self.read_vector("cell_angles")?;
        Ok(UnitCell::new(lengths, angles))
    }

    fn read_vector(&mut self, name: &str) -> Result<[f64; 3], Error> {
        let var = self.file.variable::<f64>(name)?;
        let data = scaled(&var, var.get(&[0], &[3])?)?;
        Ok([data[0], data[1], data[2]])
    }

    /// Reads an `[atom, spatial]` variable as one vector per atom.
    pub(super) fn read_array(
        &mut self,
        name: &str,
        natoms: usize,
    ) -> Result<Vec<[f64; 3]>, Error> {
        let var = self.file.variable::<f64>(name)?;
        let data = scaled(&var, var.get(&[0, 0], &[natoms, 3])?)?;
        Ok(data
            .chunks_exact(3)
            .map(|chunk| [chunk[0], chunk[1], chunk[2]])
            .collect())
    }
}

fn scaled(var: &Variable<'_, f64>, mut data: Vec<f64>) -> Result<Vec<f64>, Error> {
    if var.attribute_exists(SCALE_FACTOR) {
        let factor = f64::from(var.float_attribute(SCALE_FACTOR)?);
        for value in &mut data {
            *value *= factor;
        }
    }
    Ok(data)
}
