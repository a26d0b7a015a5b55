use phf::{Map, phf_map};

/// Atomic masses in unified atomic mass units, keyed by species symbol.
///
/// Covers the elements that commonly appear in atomistic simulation inputs.
/// Single-letter labels used by model systems (Kob-Andersen style "A"/"B"
/// mixtures) are not listed here; unknown species fall back to unit mass.
pub static ATOMIC_MASS: Map<&'static str, f64> = phf_map! {
    "H" => 1.008,
    "He" => 4.0026,
    "Li" => 6.94,
    "B" => 10.81,
    "C" => 12.011,
    "N" => 14.007,
    "O" => 15.999,
    "F" => 18.998,
    "Ne" => 20.180,
    "Na" => 22.990,
    "Mg" => 24.305,
    "Al" => 26.982,
    "Si" => 28.085,
    "P" => 30.974,
    "S" => 32.06,
    "Cl" => 35.45,
    "Ar" => 39.948,
    "K" => 39.098,
    "Ca" => 40.078,
    "Fe" => 55.845,
    "Cu" => 63.546,
    "Zn" => 65.38,
    "Kr" => 83.798,
    "Xe" => 131.29,
};

/// Looks up the atomic mass for a species symbol.
///
/// # Arguments
///
/// * `species` - The species symbol (e.g., "Ar").
///
/// # Return
///
/// Returns `Some(mass)` for known elements, otherwise `None`.
pub fn atomic_mass(species: &str) -> Option<f64> {
    ATOMIC_MASS.get(species).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_species_have_masses() {
        assert_eq!(atomic_mass("Ar"), Some(39.948));
        assert_eq!(atomic_mass("H"), Some(1.008));
    }

    #[test]
    fn unknown_species_returns_none() {
        assert_eq!(atomic_mass("A"), None);
        assert_eq!(atomic_mass(""), None);
    }
}
