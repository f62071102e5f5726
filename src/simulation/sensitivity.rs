use super::monte_carlo::MonteCarloSimulator;
use super::sampling::CellInputs;
use crate::domain::EnvironmentalVariable;
use crate::thermal::SolarGeometry;

/// Relative perturbation applied to each variable's mean.
const PERTURBATION: f64 = 0.1;

/// Relative sensitivity of the P90 conductor temperature to each
/// environmental variable, magnitudes averaged over the +10% and -10%
/// perturbations.
#[derive(Debug, Clone)]
pub struct SensitivityReport {
    pub sensitivities: Vec<(EnvironmentalVariable, f64)>,
    pub most_sensitive: Option<EnvironmentalVariable>,
}

/// Re-run the simulation with each mean perturbed in turn, all other inputs
/// and the random seed unchanged so runs are directly comparable.
pub fn analyze_sensitivity(
    simulator: &MonteCarloSimulator<'_>,
    inputs: &CellInputs,
    line_azimuth_deg: f64,
    current_a: f64,
    solar: Option<&SolarGeometry>,
    seed: u64,
) -> SensitivityReport {
    let base = simulator.run(inputs, line_azimuth_deg, current_a, solar, seed);
    let base_p90 = base.summary.p90;

    let mut sensitivities = Vec::with_capacity(EnvironmentalVariable::ALL.len());
    for variable in EnvironmentalVariable::ALL {
        let sensitivity = if base_p90.is_finite() && base_p90 != 0.0 {
            let mut magnitudes = 0.0;
            for direction in [1.0, -1.0] {
                let delta = direction * PERTURBATION;
                let perturbed = inputs.with_mean_scaled(variable, 1.0 + delta);
                let outcome =
                    simulator.run(&perturbed, line_azimuth_deg, current_a, solar, seed);
                magnitudes += ((outcome.summary.p90 - base_p90) / (base_p90 * delta)).abs();
            }
            magnitudes / 2.0
        } else {
            f64::NAN
        };
        sensitivities.push((variable, sensitivity));
    }

    let most_sensitive = sensitivities
        .iter()
        .filter(|(_, s)| s.is_finite())
        .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
        .map(|(v, _)| *v);

    SensitivityReport {
        sensitivities,
        most_sensitive,
    }
}
