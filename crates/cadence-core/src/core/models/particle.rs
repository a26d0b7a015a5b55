use super::cell::Cell;
use super::species;
use nalgebra::{Point3, Vector3};

/// Represents a point particle in a simulation.
///
/// Particles carry the minimal state that trajectory writers and
/// thermodynamic observers consume: a species label, a mass, a position, and
/// a velocity. Backends are free to keep richer per-particle state privately.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// The species label (e.g., "Ar", or "A" in model mixtures).
    pub species: String,
    /// The particle mass in unified atomic mass units.
    pub mass: f64,
    /// The 3D position.
    pub position: Point3<f64>,
    /// The 3D velocity.
    pub velocity: Vector3<f64>,
}

impl Particle {
    /// Creates a particle at the given position with zero velocity.
    ///
    /// The mass is looked up in the species table; unknown species fall back
    /// to unit mass.
    ///
    /// # Arguments
    ///
    /// * `species` - The species label.
    /// * `position` - The initial position.
    pub fn new(species: &str, position: Point3<f64>) -> Self {
        Self {
            species: species.to_string(),
            mass: species::atomic_mass(species).unwrap_or(1.0),
            position,
            velocity: Vector3::zeros(),
        }
    }

    /// Returns the kinetic energy of the particle.
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.norm_squared()
    }

    /// Returns the displacement from `other` to this particle.
    ///
    /// When a cell is given, the displacement is folded onto its minimum
    /// periodic image.
    pub fn displacement_from(&self, other: &Particle, cell: Option<&Cell>) -> Vector3<f64> {
        let raw = self.position - other.position;
        match cell {
            Some(cell) => cell.minimum_image(raw),
            None => raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_species_gets_table_mass() {
        let p = Particle::new("Ar", Point3::origin());
        assert!((p.mass - 39.948).abs() < 1e-12);
    }

    #[test]
    fn unknown_species_gets_unit_mass() {
        let p = Particle::new("A", Point3::origin());
        assert_eq!(p.mass, 1.0);
    }

    #[test]
    fn kinetic_energy_uses_mass_and_speed() {
        let mut p = Particle::new("A", Point3::origin());
        p.velocity = Vector3::new(1.0, 2.0, 2.0);
        assert!((p.kinetic_energy() - 4.5).abs() < 1e-12);
    }

    #[test]
    fn displacement_respects_periodic_images() {
        let cell = Cell::cubic(10.0);
        let a = Particle::new("A", Point3::new(4.5, 0.0, 0.0));
        let b = Particle::new("A", Point3::new(-4.5, 0.0, 0.0));
        let d = a.displacement_from(&b, Some(&cell));
        assert!((d.x - -1.0).abs() < 1e-12);
    }
}
