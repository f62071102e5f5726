use super::model::ThermalBalanceSolver;
use super::solar::SolarGeometry;
use thiserror::Error;

/// Absolute temperature tolerance for the root, C
const TEMPERATURE_TOLERANCE_C: f64 = 1e-4;
/// Residual tolerance on the heat balance at the accepted root, W/m
const RESIDUAL_TOLERANCE_WM: f64 = 0.1;
const MAX_ITERATIONS: usize = 100;
/// Offset above ambient used for the conservative fallback estimate, C
const FALLBACK_OFFSET_C: f64 = 50.0;

/// Why the steady-state solve failed.
///
/// The conservative estimate is available from the failure value so callers
/// can still act on it, but it can never be mistaken for a converged root.
#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum SolverFailure {
    #[error("heat balance has no sign change in the physical bracket (air temp {air_temp_c} C)")]
    BracketNotFound { air_temp_c: f64 },

    #[error("root finding did not converge within {iterations} iterations (air temp {air_temp_c} C)")]
    NonConvergence { air_temp_c: f64, iterations: usize },
}

impl SolverFailure {
    /// Conservative stand-in temperature, ambient plus a fixed margin. Only
    /// for callers that explicitly choose to degrade; the Monte Carlo stage
    /// treats any failure as a rejected iteration instead.
    pub fn conservative_estimate(&self) -> f64 {
        let air = match self {
            SolverFailure::BracketNotFound { air_temp_c } => *air_temp_c,
            SolverFailure::NonConvergence { air_temp_c, .. } => *air_temp_c,
        };
        air + FALLBACK_OFFSET_C
    }
}

impl ThermalBalanceSolver {
    /// Solve the heat balance for the steady-state conductor temperature, C.
    ///
    /// Brent's method over the physically meaningful interval
    /// `[air, air + 200]`, widened once to `[air - 10, air + 300]` when the
    /// initial bracket holds no sign change. The initial guess is probed as a
    /// cheap interior bracket endpoint before the full interval is used.
    #[allow(clippy::too_many_arguments)]
    pub fn solve_conductor_temperature(
        &self,
        initial_guess_c: f64,
        current_a: f64,
        solar_radiation_wm2: f64,
        line_azimuth_deg: f64,
        wind_speed_ms: f64,
        wind_angle_deg: f64,
        air_temp_c: f64,
        solar: Option<&SolarGeometry>,
    ) -> Result<f64, SolverFailure> {
        let f = |t: f64| {
            self.heat_balance(
                t,
                current_a,
                solar_radiation_wm2,
                line_azimuth_deg,
                wind_speed_ms,
                wind_angle_deg,
                air_temp_c,
                solar,
            )
        };

        let lower = air_temp_c;
        let upper = air_temp_c + 200.0;
        let f_lower = f(lower);

        if f_lower == 0.0 {
            return Ok(lower);
        }

        // Probe the caller's guess first: when it already sits on the other
        // side of the root the bracket shrinks to [air, guess].
        let mut bracket = None;
        if initial_guess_c > lower && initial_guess_c < upper {
            let f_guess = f(initial_guess_c);
            if f_guess == 0.0 {
                return Ok(initial_guess_c);
            }
            if f_lower.is_finite() && f_guess.is_finite() && f_lower * f_guess < 0.0 {
                bracket = Some((lower, initial_guess_c, f_lower, f_guess));
            }
        }

        if bracket.is_none() {
            let f_upper = f(upper);
            if f_lower.is_finite() && f_upper.is_finite() && f_lower * f_upper < 0.0 {
                bracket = Some((lower, upper, f_lower, f_upper));
            }
        }

        if bracket.is_none() {
            // Widen to the extended physical interval before giving up.
            let wide_lower = air_temp_c - 10.0;
            let wide_upper = air_temp_c + 300.0;
            let f_wide_lower = f(wide_lower);
            let f_wide_upper = f(wide_upper);
            if f_wide_lower.is_finite()
                && f_wide_upper.is_finite()
                && f_wide_lower * f_wide_upper < 0.0
            {
                bracket = Some((wide_lower, wide_upper, f_wide_lower, f_wide_upper));
            }
        }

        let (a, b, fa, fb) = bracket.ok_or(SolverFailure::BracketNotFound {
            air_temp_c,
        })?;

        let root = brent(&f, a, b, fa, fb).ok_or(SolverFailure::NonConvergence {
            air_temp_c,
            iterations: MAX_ITERATIONS,
        })?;

        if f(root).abs() > RESIDUAL_TOLERANCE_WM {
            return Err(SolverFailure::NonConvergence {
                air_temp_c,
                iterations: MAX_ITERATIONS,
            });
        }

        Ok(root)
    }
}

/// Brent's method: inverse-quadratic interpolation with a guaranteed
/// bisection fallback. Requires `f(a)` and `f(b)` of opposite sign.
fn brent(f: &dyn Fn(f64) -> f64, mut a: f64, mut b: f64, mut fa: f64, mut fb: f64) -> Option<f64> {
    if fa * fb > 0.0 {
        return None;
    }

    let mut c = a;
    let mut fc = fa;
    let mut d = b - a;
    let mut e = d;

    for _ in 0..MAX_ITERATIONS {
        if fb.abs() > fc.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol = 2.0 * f64::EPSILON * b.abs() + TEMPERATURE_TOLERANCE_C / 2.0;
        let half_interval = (c - b) / 2.0;

        if half_interval.abs() <= tol || fb == 0.0 {
            return Some(b);
        }

        if e.abs() >= tol && fa.abs() > fb.abs() {
            // Attempt interpolation
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                // Secant
                (2.0 * half_interval * s, 1.0 - s)
            } else {
                // Inverse quadratic
                let q0 = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * half_interval * q0 * (q0 - r) - (b - a) * (r - 1.0)),
                    (q0 - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();

            let accept = 2.0 * p < (3.0 * half_interval * q - (tol * q).abs()).min((e * q).abs());
            if accept {
                e = d;
                d = p / q;
            } else {
                d = half_interval;
                e = d;
            }
        } else {
            d = half_interval;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol {
            d
        } else if half_interval > 0.0 {
            tol
        } else {
            -tol
        };
        fb = f(b);
        if !fb.is_finite() {
            return None;
        }

        if (fb > 0.0) == (fc > 0.0) {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConductorParameters;

    fn solver() -> ThermalBalanceSolver {
        ThermalBalanceSolver::new(ConductorParameters::acsr_drake())
    }

    #[test]
    fn test_root_satisfies_heat_balance() {
        let s = solver();
        let root = s
            .solve_conductor_temperature(45.0, 400.0, 800.0, 90.0, 2.0, 90.0, 25.0, None)
            .unwrap();
        let residual = s.heat_balance(root, 400.0, 800.0, 90.0, 2.0, 90.0, 25.0, None);
        assert!(residual.abs() < 0.1, "residual {residual} at root {root}");
    }

    #[test]
    fn test_reference_scenario_bounds() {
        // Drake at 400 A, 25 C air, 800 W/m2, 2 m/s perpendicular wind:
        // above ambient, below ambient + 100.
        let s = solver();
        let root = s
            .solve_conductor_temperature(45.0, 400.0, 800.0, 90.0, 2.0, 90.0, 25.0, None)
            .unwrap();
        assert!(root > 25.0, "root {root}");
        assert!(root < 125.0, "root {root}");
    }

    #[test]
    fn test_solution_is_reproducible() {
        let s = solver();
        let first = s
            .solve_conductor_temperature(45.0, 400.0, 800.0, 90.0, 2.0, 90.0, 25.0, None)
            .unwrap();
        let second = s
            .solve_conductor_temperature(45.0, 400.0, 800.0, 90.0, 2.0, 90.0, 25.0, None)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_current_no_sun_settles_at_ambient() {
        let s = solver();
        let root = s
            .solve_conductor_temperature(30.0, 0.0, 0.0, 90.0, 2.0, 90.0, 25.0, None)
            .unwrap();
        assert!((root - 25.0).abs() < 0.5, "root {root}");
    }

    #[test]
    fn test_higher_current_runs_hotter() {
        let s = solver();
        let cool = s
            .solve_conductor_temperature(45.0, 300.0, 800.0, 90.0, 2.0, 90.0, 25.0, None)
            .unwrap();
        let hot = s
            .solve_conductor_temperature(45.0, 600.0, 800.0, 90.0, 2.0, 90.0, 25.0, None)
            .unwrap();
        assert!(hot > cool + 5.0);
    }

    #[test]
    fn test_conservative_estimate_offsets_ambient() {
        let failure = SolverFailure::BracketNotFound { air_temp_c: 32.0 };
        assert_eq!(failure.conservative_estimate(), 82.0);
    }
}
