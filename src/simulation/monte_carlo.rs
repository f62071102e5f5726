use super::sampling::{CellInputs, EnvironmentalSample, SamplingDistribution};
use crate::domain::PhysicalBounds;
use crate::risk::DistributionSummary;
use crate::thermal::{SolarGeometry, ThermalBalanceSolver};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

/// Initial solver guess above the sampled air temperature, C
const INITIAL_GUESS_OFFSET_C: f64 = 20.0;
/// A root this far below the sampled air temperature is physically
/// impossible and the iteration is rejected, C
const SUB_AMBIENT_TOLERANCE_C: f64 = 5.0;
/// A root this far above the sampled air temperature indicates a runaway
/// solution and the iteration is rejected, C
const RUNAWAY_LIMIT_C: f64 = 200.0;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    /// Environmental realizations per (point, hour) cell
    pub iterations: usize,
    pub distribution: SamplingDistribution,
    /// Base seed; each cell derives its own deterministic stream from it
    pub base_seed: u64,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            iterations: 10_000,
            distribution: SamplingDistribution::Normal,
            base_seed: 42,
        }
    }
}

/// Empirical result of one (point, hour) simulation.
///
/// `temperatures` holds accepted iterations only: solver failures and
/// physically implausible roots are counted in `failed_iterations` and never
/// enter the distribution. All statistics are NaN when nothing was accepted;
/// callers must check `valid_iterations` before trusting them.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub temperatures: Vec<f64>,
    pub requested_iterations: usize,
    pub valid_iterations: usize,
    pub failed_iterations: usize,
    pub success_rate: f64,
    pub summary: DistributionSummary,
}

impl SimulationOutcome {
    fn empty(requested: usize) -> Self {
        Self {
            temperatures: Vec::new(),
            requested_iterations: requested,
            valid_iterations: 0,
            failed_iterations: requested,
            success_rate: 0.0,
            summary: DistributionSummary::nan(),
        }
    }
}

/// Propagates environmental uncertainty through the thermal solver for one
/// (point, hour) cell at a time.
pub struct MonteCarloSimulator<'a> {
    solver: &'a ThermalBalanceSolver,
    bounds: PhysicalBounds,
    config: MonteCarloConfig,
}

impl<'a> MonteCarloSimulator<'a> {
    pub fn new(
        solver: &'a ThermalBalanceSolver,
        bounds: PhysicalBounds,
        config: MonteCarloConfig,
    ) -> Self {
        Self {
            solver,
            bounds,
            config,
        }
    }

    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Run the full iteration budget for one cell with a caller-supplied
    /// seed, so parallel cells stay deterministic and independent.
    pub fn run(
        &self,
        inputs: &CellInputs,
        line_azimuth_deg: f64,
        current_a: f64,
        solar: Option<&SolarGeometry>,
        seed: u64,
    ) -> SimulationOutcome {
        let requested = self.config.iterations;
        if inputs.has_nan() {
            return SimulationOutcome::empty(requested);
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut temperatures = Vec::with_capacity(requested);
        let mut failed = 0usize;

        for _ in 0..requested {
            let sample = EnvironmentalSample::draw(
                inputs,
                &self.bounds,
                self.config.distribution,
                line_azimuth_deg,
                &mut rng,
            );

            let solved = self.solver.solve_conductor_temperature(
                sample.air_temp_c + INITIAL_GUESS_OFFSET_C,
                current_a,
                sample.solar_radiation_wm2,
                line_azimuth_deg,
                sample.wind_speed_ms,
                sample.wind_attack_angle_deg,
                sample.air_temp_c,
                solar,
            );

            match solved {
                Ok(temp) if is_plausible(temp, sample.air_temp_c) => temperatures.push(temp),
                _ => failed += 1,
            }
        }

        let valid = temperatures.len();
        let summary = if valid > 0 {
            DistributionSummary::from_values(&temperatures)
        } else {
            DistributionSummary::nan()
        };

        SimulationOutcome {
            requested_iterations: requested,
            valid_iterations: valid,
            failed_iterations: failed,
            success_rate: valid as f64 / requested.max(1) as f64,
            summary,
            temperatures,
        }
    }
}

fn is_plausible(conductor_temp_c: f64, air_temp_c: f64) -> bool {
    conductor_temp_c.is_finite()
        && conductor_temp_c >= air_temp_c - SUB_AMBIENT_TOLERANCE_C
        && conductor_temp_c <= air_temp_c + RUNAWAY_LIMIT_C
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConductorParameters;
    use crate::simulation::sampling::EnvironmentalEstimate;

    fn drake_solver() -> ThermalBalanceSolver {
        ThermalBalanceSolver::new(ConductorParameters::acsr_drake())
    }

    fn inputs(std: f64) -> CellInputs {
        CellInputs {
            air_temp: EnvironmentalEstimate {
                mean: 25.0,
                std_dev: std,
            },
            radiation: EnvironmentalEstimate {
                mean: 800.0,
                std_dev: std * 30.0,
            },
            wind_u: EnvironmentalEstimate {
                mean: 2.0,
                std_dev: std * 0.3,
            },
            wind_v: EnvironmentalEstimate {
                mean: 0.0,
                std_dev: std * 0.3,
            },
        }
    }

    fn config(iterations: usize) -> MonteCarloConfig {
        MonteCarloConfig {
            iterations,
            ..Default::default()
        }
    }

    #[test]
    fn test_deterministic_inputs_converge_to_one_temperature() {
        let solver = drake_solver();
        let simulator =
            MonteCarloSimulator::new(&solver, PhysicalBounds::default(), config(1000));
        let outcome = simulator.run(&inputs(0.0), 0.0, 400.0, None, 99);

        assert_eq!(outcome.valid_iterations, 1000);
        assert_eq!(outcome.failed_iterations, 0);
        assert!(
            outcome.summary.std_dev < 1e-6,
            "spread was {}",
            outcome.summary.std_dev
        );
        assert!(outcome.summary.mean > 25.0);
    }

    #[test]
    fn test_nan_inputs_produce_empty_outcome() {
        let solver = drake_solver();
        let simulator = MonteCarloSimulator::new(&solver, PhysicalBounds::default(), config(100));
        let mut bad = inputs(1.0);
        bad.radiation.mean = f64::NAN;
        let outcome = simulator.run(&bad, 0.0, 400.0, None, 99);

        assert_eq!(outcome.valid_iterations, 0);
        assert_eq!(outcome.failed_iterations, 100);
        assert!(outcome.summary.p90.is_nan());
        assert_eq!(outcome.success_rate, 0.0);
    }

    #[test]
    fn test_same_seed_reproduces_outcome() {
        let solver = drake_solver();
        let simulator = MonteCarloSimulator::new(&solver, PhysicalBounds::default(), config(200));
        let a = simulator.run(&inputs(2.0), 30.0, 450.0, None, 7);
        let b = simulator.run(&inputs(2.0), 30.0, 450.0, None, 7);
        assert_eq!(a.temperatures, b.temperatures);

        let c = simulator.run(&inputs(2.0), 30.0, 450.0, None, 8);
        assert_ne!(a.temperatures, c.temperatures);
    }

    #[test]
    fn test_uncertain_inputs_spread_the_distribution() {
        let solver = drake_solver();
        let simulator = MonteCarloSimulator::new(&solver, PhysicalBounds::default(), config(500));
        let outcome = simulator.run(&inputs(3.0), 0.0, 400.0, None, 11);

        assert!(outcome.valid_iterations > 450);
        assert!(outcome.summary.std_dev > 0.5);
        assert!(outcome.summary.p90 > outcome.summary.median);
        assert!((0.0..=1.0).contains(&outcome.success_rate));
    }

    #[test]
    fn test_plausibility_window() {
        assert!(is_plausible(30.0, 25.0));
        assert!(is_plausible(21.0, 25.0));
        assert!(!is_plausible(19.0, 25.0));
        assert!(!is_plausible(226.0, 25.0));
        assert!(!is_plausible(f64::NAN, 25.0));
    }
}
