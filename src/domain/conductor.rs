use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors raised when conductor parameters are constructed.
///
/// Any of these is fatal to an analysis run: no partial analysis is attempted
/// with an implausible conductor.
#[derive(Debug, Error)]
pub enum ConductorParameterError {
    #[error("conductor diameter {0} m outside plausible range (0.005-0.1 m)")]
    DiameterOutOfRange(f64),

    #[error("AC resistance at 25C must be positive, got {0} ohm/m")]
    NonPositiveResistance(f64),

    #[error("AC resistance must increase with temperature: R25={r25} ohm/m, R75={r75} ohm/m")]
    ResistanceNotIncreasing { r25: f64, r75: f64 },

    #[error("{name} must be in (0, 1], got {value}")]
    CoefficientOutOfRange { name: &'static str, value: f64 },
}

/// Electrical and surface parameters of the overhead conductor.
///
/// Constructed once per analysis run via [`ConductorParameters::new`], which
/// enforces the physical invariants; immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConductorParameters {
    /// Outer diameter in meters
    pub diameter_m: f64,
    /// AC resistance at 25 C in ohm/m
    pub resistance_ac_25: f64,
    /// AC resistance at 75 C in ohm/m
    pub resistance_ac_75: f64,
    /// Surface emissivity (0-1)
    pub emissivity: f64,
    /// Solar absorptivity (0-1)
    pub absorptivity: f64,
}

impl ConductorParameters {
    pub fn new(
        diameter_m: f64,
        resistance_ac_25: f64,
        resistance_ac_75: f64,
        emissivity: f64,
        absorptivity: f64,
    ) -> Result<Self, ConductorParameterError> {
        if !diameter_m.is_finite() || !(0.005..=0.1).contains(&diameter_m) {
            return Err(ConductorParameterError::DiameterOutOfRange(diameter_m));
        }
        if !resistance_ac_25.is_finite() || resistance_ac_25 <= 0.0 {
            return Err(ConductorParameterError::NonPositiveResistance(
                resistance_ac_25,
            ));
        }
        if !resistance_ac_75.is_finite() || resistance_ac_75 <= resistance_ac_25 {
            return Err(ConductorParameterError::ResistanceNotIncreasing {
                r25: resistance_ac_25,
                r75: resistance_ac_75,
            });
        }
        if !emissivity.is_finite() || emissivity <= 0.0 || emissivity > 1.0 {
            return Err(ConductorParameterError::CoefficientOutOfRange {
                name: "emissivity",
                value: emissivity,
            });
        }
        if !absorptivity.is_finite() || absorptivity <= 0.0 || absorptivity > 1.0 {
            return Err(ConductorParameterError::CoefficientOutOfRange {
                name: "absorptivity",
                value: absorptivity,
            });
        }

        Ok(Self {
            diameter_m,
            resistance_ac_25,
            resistance_ac_75,
            emissivity,
            absorptivity,
        })
    }

    /// ACSR 795 MCM "Drake", the conductor used throughout the documentation
    /// and tests.
    pub fn acsr_drake() -> Self {
        Self {
            diameter_m: 0.02814,
            resistance_ac_25: 7.28e-5,
            resistance_ac_75: 9.09e-5,
            emissivity: 0.8,
            absorptivity: 0.8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drake_parameters_are_valid() {
        let p = ConductorParameters::acsr_drake();
        let validated = ConductorParameters::new(
            p.diameter_m,
            p.resistance_ac_25,
            p.resistance_ac_75,
            p.emissivity,
            p.absorptivity,
        );
        assert!(validated.is_ok());
    }

    #[test]
    fn test_rejects_non_increasing_resistance() {
        let result = ConductorParameters::new(0.02814, 9.09e-5, 7.28e-5, 0.8, 0.8);
        assert!(matches!(
            result,
            Err(ConductorParameterError::ResistanceNotIncreasing { .. })
        ));
    }

    #[test]
    fn test_rejects_implausible_diameter() {
        assert!(ConductorParameters::new(0.5, 7.28e-5, 9.09e-5, 0.8, 0.8).is_err());
        assert!(ConductorParameters::new(0.001, 7.28e-5, 9.09e-5, 0.8, 0.8).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_coefficients() {
        assert!(ConductorParameters::new(0.02814, 7.28e-5, 9.09e-5, 0.0, 0.8).is_err());
        assert!(ConductorParameters::new(0.02814, 7.28e-5, 9.09e-5, 0.8, 1.2).is_err());
    }
}
