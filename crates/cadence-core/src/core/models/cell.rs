use nalgebra::Vector3;

/// Represents an orthorhombic simulation cell with periodic boundaries.
///
/// The cell is centered at the origin; each side length is the full extent
/// along the corresponding axis. It provides the minimum-image convention
/// used when measuring displacements across periodic boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Side lengths along x, y, and z.
    pub side: Vector3<f64>,
}

impl Cell {
    /// Creates a cell with the given side lengths.
    pub fn new(side: Vector3<f64>) -> Self {
        Self { side }
    }

    /// Creates a cubic cell with equal side lengths.
    pub fn cubic(side: f64) -> Self {
        Self {
            side: Vector3::new(side, side, side),
        }
    }

    /// Returns the cell volume.
    pub fn volume(&self) -> f64 {
        self.side.x * self.side.y * self.side.z
    }

    /// Folds a displacement vector onto its minimum image.
    ///
    /// # Arguments
    ///
    /// * `displacement` - A raw displacement between two positions.
    ///
    /// # Return
    ///
    /// The shortest periodic image of the displacement.
    pub fn minimum_image(&self, displacement: Vector3<f64>) -> Vector3<f64> {
        let mut folded = displacement;
        for axis in 0..3 {
            let side = self.side[axis];
            if side > 0.0 {
                folded[axis] -= side * (folded[axis] / side).round();
            }
        }
        folded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubic_volume() {
        let cell = Cell::cubic(3.0);
        assert!((cell.volume() - 27.0).abs() < 1e-12);
    }

    #[test]
    fn minimum_image_folds_across_boundary() {
        let cell = Cell::cubic(10.0);
        let folded = cell.minimum_image(Vector3::new(9.0, -9.0, 0.5));
        assert!((folded.x - -1.0).abs() < 1e-12);
        assert!((folded.y - 1.0).abs() < 1e-12);
        assert!((folded.z - 0.5).abs() < 1e-12);
    }
}
