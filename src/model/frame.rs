use super::cell::UnitCell;

/// One snapshot of a system: positions, optional velocities and the cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    positions: Vec<[f64; 3]>,
    velocities: Option<Vec<[f64; 3]>>,
    cell: UnitCell,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// A frame of `size` atoms at the origin, without velocities.
    pub fn with_capacity(size: usize) -> Self {
        Self {
            positions: vec![[0.0; 3]; size],
            ..Self::default()
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.positions.len()
    }

    /// Resizes positions, and velocities when present; new entries are zero.
    pub fn resize(&mut self, size: usize) {
        self.positions.resize(size, [0.0; 3]);
        if let Some(velocities) = &mut self.velocities {
            velocities.resize(size, [0.0; 3]);
        }
    }

    pub fn positions(&self) -> &[[f64; 3]] {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut [[f64; 3]] {
        &mut self.positions
    }

    pub fn velocities(&self) -> Option<&[[f64; 3]]> {
        self.velocities.as_deref()
    }

    pub fn velocities_mut(&mut self) -> Option<&mut [[f64; 3]]> {
        self.velocities.as_deref_mut()
    }

    /// Allocates zeroed velocities if the frame has none yet.
    pub fn add_velocities(&mut self) {
        if self.velocities.is_none() {
            self.velocities = Some(vec![[0.0; 3]; self.size()]);
        }
    }

    #[inline]
    pub fn has_velocities(&self) -> bool {
        self.velocities.is_some()
    }

    pub fn cell(&self) -> &UnitCell {
        &self.cell
    }

    pub fn set_cell(&mut self, cell: UnitCell) {
        self.cell = cell;
    }
}
