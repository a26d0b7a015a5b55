use super::cell::Cell;
use super::particle::Particle;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Represents the physical system at hand: interacting point particles,
/// optionally enclosed in a simulation cell.
///
/// This struct is the central data model consumed by observers and reference
/// backends. The potential energy is a cached scalar owned by whichever
/// backend computes it; the system itself performs no force evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct System {
    /// The particles in the system.
    pub particle: Vec<Particle>,
    /// The enclosing cell, if any.
    pub cell: Option<Cell>,
    potential_energy: f64,
}

impl System {
    /// Creates an empty system with no cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a system from particles and an optional cell.
    pub fn with_particles(particle: Vec<Particle>, cell: Option<Cell>) -> Self {
        Self {
            particle,
            cell,
            potential_energy: 0.0,
        }
    }

    /// Returns the number of spatial dimensions.
    pub fn number_of_dimensions(&self) -> usize {
        3
    }

    /// Returns the number of distinct species in the system.
    pub fn number_of_species(&self) -> usize {
        let mut seen: Vec<&str> = Vec::new();
        for p in &self.particle {
            if !seen.contains(&p.species.as_str()) {
                seen.push(&p.species);
            }
        }
        seen.len()
    }

    /// Returns the number density, or `None` without a cell.
    pub fn density(&self) -> Option<f64> {
        self.cell
            .as_ref()
            .map(|cell| self.particle.len() as f64 / cell.volume())
    }

    /// Returns the total kinetic energy.
    pub fn kinetic_energy(&self) -> f64 {
        self.particle.iter().map(Particle::kinetic_energy).sum()
    }

    /// Returns the kinetic energy per particle.
    pub fn kinetic_energy_per_particle(&self) -> f64 {
        if self.particle.is_empty() {
            return 0.0;
        }
        self.kinetic_energy() / self.particle.len() as f64
    }

    /// Returns the cached total potential energy.
    pub fn potential_energy(&self) -> f64 {
        self.potential_energy
    }

    /// Returns the potential energy per particle.
    pub fn potential_energy_per_particle(&self) -> f64 {
        if self.particle.is_empty() {
            return 0.0;
        }
        self.potential_energy / self.particle.len() as f64
    }

    /// Stores the total potential energy computed by a backend.
    pub fn set_potential_energy(&mut self, energy: f64) {
        self.potential_energy = energy;
    }

    /// Returns the total energy per particle.
    pub fn total_energy_per_particle(&self) -> f64 {
        self.kinetic_energy_per_particle() + self.potential_energy_per_particle()
    }

    /// Returns the kinetic temperature.
    ///
    /// # Arguments
    ///
    /// * `ndof` - The number of degrees of freedom; defaults to
    ///   `(N - 1) * dim`, correcting for translational invariance.
    pub fn temperature(&self, ndof: Option<usize>) -> f64 {
        if self.particle.len() < 2 {
            return 0.0;
        }
        let ndof =
            ndof.unwrap_or((self.particle.len() - 1) * self.number_of_dimensions()) as f64;
        2.0 / ndof * self.kinetic_energy()
    }

    /// Computes the mean square displacement with respect to a reference
    /// system with the same particle ordering.
    pub fn mean_square_displacement(&self, reference: &System) -> f64 {
        if self.particle.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .particle
            .iter()
            .zip(&reference.particle)
            .map(|(p, q)| p.displacement_from(q, self.cell.as_ref()).norm_squared())
            .sum();
        total / self.particle.len() as f64
    }

    /// Removes the center-of-mass velocity.
    pub fn fix_cm(&mut self) {
        let total_mass: f64 = self.particle.iter().map(|p| p.mass).sum();
        if total_mass <= 0.0 {
            return;
        }
        let momentum = self
            .particle
            .iter()
            .fold(nalgebra::Vector3::zeros(), |acc, p| {
                acc + p.velocity * p.mass
            });
        let v_cm = momentum / total_mass;
        for p in &mut self.particle {
            p.velocity -= v_cm;
        }
    }

    /// Resets velocities to a Maxwellian distribution at the given
    /// temperature, with the center-of-mass motion removed.
    pub fn maxwellian<R: Rng>(&mut self, temperature: f64, rng: &mut R) {
        for p in &mut self.particle {
            let sigma = (temperature / p.mass).sqrt();
            let Ok(normal) = Normal::new(0.0, sigma) else {
                continue;
            };
            for axis in 0..3 {
                p.velocity[axis] = normal.sample(rng);
            }
        }
        self.fix_cm();
        // Rescale so the kinetic temperature matches exactly.
        let current = self.temperature(None);
        if current > 0.0 {
            let factor = (temperature / current).sqrt();
            for p in &mut self.particle {
                p.velocity *= factor;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};

    fn two_particle_system() -> System {
        let mut a = Particle::new("A", Point3::new(0.0, 0.0, 0.0));
        let mut b = Particle::new("B", Point3::new(1.0, 0.0, 0.0));
        a.velocity = Vector3::new(1.0, 0.0, 0.0);
        b.velocity = Vector3::new(-1.0, 0.0, 0.0);
        System::with_particles(vec![a, b], Some(Cell::cubic(10.0)))
    }

    #[test]
    fn kinetic_energy_and_temperature() {
        let system = two_particle_system();
        assert!((system.kinetic_energy() - 1.0).abs() < 1e-12);
        // ndof = (2 - 1) * 3 = 3
        assert!((system.temperature(None) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn density_requires_cell() {
        let mut system = two_particle_system();
        assert!((system.density().unwrap() - 2.0 / 1000.0).abs() < 1e-12);
        system.cell = None;
        assert!(system.density().is_none());
    }

    #[test]
    fn msd_against_displaced_reference() {
        let reference = two_particle_system();
        let mut moved = reference.clone();
        for p in &mut moved.particle {
            p.position.x += 2.0;
        }
        assert!((moved.mean_square_displacement(&reference) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn fix_cm_removes_net_momentum() {
        let mut system = two_particle_system();
        system.particle[0].velocity = Vector3::new(3.0, 0.0, 0.0);
        system.fix_cm();
        let momentum = system
            .particle
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.velocity * p.mass);
        assert!(momentum.norm() < 1e-12);
    }

    #[test]
    fn maxwellian_hits_requested_temperature() {
        let mut system = System::with_particles(
            (0..50)
                .map(|i| Particle::new("A", Point3::new(i as f64, 0.0, 0.0)))
                .collect(),
            Some(Cell::cubic(100.0)),
        );
        let mut rng = rand::thread_rng();
        system.maxwellian(1.5, &mut rng);
        assert!((system.temperature(None) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn species_counting() {
        let system = two_particle_system();
        assert_eq!(system.number_of_species(), 2);
    }
}
