use std::time::Duration;

/// Wall time per step in seconds since the run started.
///
/// Undefined until at least one step has been performed; the division by
/// zero is made unrepresentable instead of guessed away.
pub fn wall_time_per_step(elapsed: Duration, steps: u64, initial_steps: u64) -> Option<f64> {
    let performed = steps.checked_sub(initial_steps)?;
    if performed == 0 {
        return None;
    }
    Some(elapsed.as_secs_f64() / performed as f64)
}

/// Wall time per step and particle in seconds.
///
/// Falls back to 0 when the per-step time is undefined or no physical
/// system is attached.
pub fn wall_time_per_step_particle(per_step: Option<f64>, particles: Option<usize>) -> f64 {
    match (per_step, particles) {
        (Some(per_step), Some(count)) if count > 0 => per_step / count as f64,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_step_requires_progress() {
        assert_eq!(wall_time_per_step(Duration::from_secs(2), 5, 5), None);
        assert_eq!(
            wall_time_per_step(Duration::from_secs(2), 9, 5),
            Some(0.5)
        );
    }

    #[test]
    fn per_step_tolerates_counter_regression() {
        assert_eq!(wall_time_per_step(Duration::from_secs(2), 3, 5), None);
    }

    #[test]
    fn per_particle_falls_back_to_zero() {
        assert_eq!(wall_time_per_step_particle(None, Some(10)), 0.0);
        assert_eq!(wall_time_per_step_particle(Some(1.0), None), 0.0);
        assert_eq!(wall_time_per_step_particle(Some(1.0), Some(0)), 0.0);
        assert_eq!(wall_time_per_step_particle(Some(1.0), Some(4)), 0.25);
    }
}
