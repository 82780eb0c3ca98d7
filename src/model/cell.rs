/// Tolerance, in degrees, for treating an angle as a right angle.
const RIGHT_ANGLE_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellShape {
    /// No periodicity: every length is zero.
    Infinite,
    /// All three angles are 90°.
    Orthorhombic,
    Triclinic,
}

/// Periodic simulation box given by its lengths (Å) and angles (degrees).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitCell {
    lengths: [f64; 3],
    angles: [f64; 3],
}

impl Default for UnitCell {
    fn default() -> Self {
        Self {
            lengths: [0.0; 3],
            angles: [90.0; 3],
        }
    }
}

impl UnitCell {
    pub fn new(lengths: [f64; 3], angles: [f64; 3]) -> Self {
        Self { lengths, angles }
    }

    pub fn orthorhombic(a: f64, b: f64, c: f64) -> Self {
        Self::new([a, b, c], [90.0; 3])
    }

    #[inline]
    pub fn a(&self) -> f64 {
        self.lengths[0]
    }

    #[inline]
    pub fn b(&self) -> f64 {
        self.lengths[1]
    }

    #[inline]
    pub fn c(&self) -> f64 {
        self.lengths[2]
    }

    #[inline]
    pub fn alpha(&self) -> f64 {
        self.angles[0]
    }

    #[inline]
    pub fn beta(&self) -> f64 {
        self.angles[1]
    }

    #[inline]
    pub fn gamma(&self) -> f64 {
        self.angles[2]
    }

    pub fn lengths(&self) -> [f64; 3] {
        self.lengths
    }

    pub fn angles(&self) -> [f64; 3] {
        self.angles
    }

    pub fn shape(&self) -> CellShape {
        if self.lengths.iter().all(|&l| l == 0.0) {
            CellShape::Infinite
        } else if self
            .angles
            .iter()
            .all(|&angle| (angle - 90.0).abs() < RIGHT_ANGLE_TOLERANCE)
        {
            CellShape::Orthorhombic
        } else {
            CellShape::Triclinic
        }
    }

    /// Volume in Å³; zero for an infinite cell.
    pub fn volume(&self) -> f64 {
        let [a, b, c] = self.lengths;
        match self.shape() {
            CellShape::Infinite => 0.0,
            CellShape::Orthorhombic => a * b * c,
            CellShape::Triclinic => {
                let [ca, cb, cg] = self.angles.map(|angle| angle.to_radians().cos());
                let factor = 1.0 - ca * ca - cb * cb - cg * cg + 2.0 * ca * cb * cg;
                a * b * c * factor.max(0.0).sqrt()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cell_is_infinite() {
        let cell = UnitCell::default();
        assert_eq!(cell.shape(), CellShape::Infinite);
        assert_eq!(cell.lengths(), [0.0; 3]);
        assert_eq!(cell.angles(), [90.0; 3]);
        assert_eq!(cell.volume(), 0.0);
    }

    #[test]
    fn shape_follows_lengths_and_angles() {
        assert_eq!(
            UnitCell::orthorhombic(15.0, 15.0, 15.0).shape(),
            CellShape::Orthorhombic
        );
        // a flat box is still orthorhombic
        assert_eq!(
            UnitCell::orthorhombic(60.0, 60.0, 0.0).shape(),
            CellShape::Orthorhombic
        );
        assert_eq!(
            UnitCell::new([10.0; 3], [90.0, 90.0, 90.0005]).shape(),
            CellShape::Orthorhombic
        );
        assert_eq!(
            UnitCell::new([10.0; 3], [109.47, 109.47, 109.47]).shape(),
            CellShape::Triclinic
        );
    }

    #[test]
    fn volume_of_orthorhombic_and_triclinic_cells() {
        let cube = UnitCell::orthorhombic(2.0, 3.0, 4.0);
        assert!((cube.volume() - 24.0).abs() < 1e-12);

        let hexagonal = UnitCell::new([3.0, 3.0, 5.0], [90.0, 90.0, 120.0]);
        let expected = 3.0 * 3.0 * 5.0 * (3.0f64).sqrt() / 2.0;
        assert!((hexagonal.volume() - expected).abs() < 1e-9);
    }

    #[test]
    fn accessors_return_components() {
        let cell = UnitCell::new([1.0, 2.0, 3.0], [80.0, 85.0, 95.0]);
        assert_eq!((cell.a(), cell.b(), cell.c()), (1.0, 2.0, 3.0));
        assert_eq!((cell.alpha(), cell.beta(), cell.gamma()), (80.0, 85.0, 95.0));
    }
}
