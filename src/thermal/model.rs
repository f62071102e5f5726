use super::solar::{SolarGeometry, DEFAULT_SHAPE_FACTOR};
use crate::domain::ConductorParameters;
use std::f64::consts::PI;
use tracing::warn;

/// Stefan-Boltzmann constant, W/m2K4
const STEFAN_BOLTZMANN: f64 = 5.670374419e-8;
/// Standard gravity, m/s2
const GRAVITY: f64 = 9.80665;
/// Air properties at the 20 C reference state
const AIR_KINEMATIC_VISCOSITY_REF: f64 = 15.06e-6;
const AIR_THERMAL_CONDUCTIVITY_REF: f64 = 0.0263;
const REFERENCE_TEMP_K: f64 = 293.15;
/// Sutherland constants for viscosity and conductivity of air, K
const SUTHERLAND_VISCOSITY_K: f64 = 110.4;
const SUTHERLAND_CONDUCTIVITY_K: f64 = 194.4;
const PRANDTL: f64 = 0.7;
/// Floor on the Reynolds number so the forced-convection correlation cannot
/// degenerate at zero perpendicular wind.
const MIN_REYNOLDS: f64 = 0.1;
/// Perpendicular wind speed below which convection is purely natural, m/s
const NATURAL_CONVECTION_WIND_LIMIT: f64 = 0.1;

const KELVIN_OFFSET: f64 = 273.15;

/// Air film properties evaluated at the film temperature.
#[derive(Debug, Clone, Copy)]
struct AirProperties {
    kinematic_viscosity: f64,
    thermal_conductivity: f64,
}

fn air_properties(film_temp_k: f64) -> AirProperties {
    let ratio = film_temp_k / REFERENCE_TEMP_K;
    AirProperties {
        kinematic_viscosity: AIR_KINEMATIC_VISCOSITY_REF
            * ratio.powf(1.5)
            * (REFERENCE_TEMP_K + SUTHERLAND_VISCOSITY_K)
            / (film_temp_k + SUTHERLAND_VISCOSITY_K),
        thermal_conductivity: AIR_THERMAL_CONDUCTIVITY_REF
            * ratio.powf(1.5)
            * (REFERENCE_TEMP_K + SUTHERLAND_CONDUCTIVITY_K)
            / (film_temp_k + SUTHERLAND_CONDUCTIVITY_K),
    }
}

/// Nusselt number for natural convection around a horizontal cylinder,
/// Morgan power-law bands over the Rayleigh number.
fn nusselt_natural(rayleigh: f64) -> f64 {
    let (coefficient, exponent) = match rayleigh {
        r if r < 1e-2 => (0.675, 0.058),
        r if r < 1e2 => (1.02, 0.148),
        r if r < 1e4 => (0.850, 0.188),
        r if r < 1e7 => (0.480, 0.250),
        _ => (0.125, 0.333),
    };
    coefficient * rayleigh.powf(exponent)
}

/// Nusselt number for forced cross-flow, Hilpert power-law bands over the
/// Reynolds number.
fn nusselt_forced(reynolds: f64) -> f64 {
    let (coefficient, exponent) = match reynolds {
        r if r < 4.0 => (0.989, 0.330),
        r if r < 40.0 => (0.911, 0.385),
        r if r < 4000.0 => (0.683, 0.466),
        r if r < 40_000.0 => (0.193, 0.618),
        _ => (0.027, 0.805),
    };
    coefficient * reynolds.powf(exponent) * PRANDTL.powf(1.0 / 3.0)
}

/// Ampacity result. When ambient cooling at the target temperature cannot
/// even absorb the solar gain, no positive current is thermally safe and the
/// estimate degenerates to zero with the deficit flagged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmpacityEstimate {
    pub current_a: f64,
    pub cooling_deficit: bool,
}

/// Steady-state CIGRE heat balance for one conductor.
///
/// All temperatures are degrees Celsius at the API surface; Kelvin is used
/// internally for the radiative and buoyancy terms. Owns its conductor
/// parameters for the lifetime of the analysis.
#[derive(Debug, Clone)]
pub struct ThermalBalanceSolver {
    params: ConductorParameters,
}

impl ThermalBalanceSolver {
    pub fn new(params: ConductorParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ConductorParameters {
        &self.params
    }

    /// AC resistance at the given conductor temperature, ohm/m.
    ///
    /// Linear interpolation between the 25 C and 75 C calibration points,
    /// clamped outside the calibration range rather than extrapolated.
    pub fn resistance_ac(&self, conductor_temp_c: f64) -> f64 {
        let t = conductor_temp_c.clamp(25.0, 75.0);
        self.params.resistance_ac_25
            + (t - 25.0) * (self.params.resistance_ac_75 - self.params.resistance_ac_25) / 50.0
    }

    /// Joule heating per unit length, W/m.
    pub fn joule_heating(&self, current_a: f64, conductor_temp_c: f64) -> f64 {
        current_a * current_a * self.resistance_ac(conductor_temp_c)
    }

    /// Solar gain per unit length, W/m.
    ///
    /// With solar-position inputs the beam-to-axis shape factor is computed
    /// geometrically; without them the fixed average factor is used.
    pub fn solar_heating(
        &self,
        solar_radiation_wm2: f64,
        line_azimuth_deg: f64,
        solar: Option<&SolarGeometry>,
    ) -> f64 {
        let shape_factor = solar
            .map(|g| g.shape_factor(line_azimuth_deg))
            .unwrap_or(DEFAULT_SHAPE_FACTOR);
        self.params.absorptivity * self.params.diameter_m * solar_radiation_wm2 * shape_factor
    }

    /// Convective cooling per unit length, W/m.
    ///
    /// Film-temperature-corrected air properties, Reynolds number from the
    /// wind component perpendicular to the conductor, Grashof from buoyancy.
    /// Below 0.1 m/s perpendicular wind the flow is treated as natural
    /// convection; above it the larger of the forced and natural Nusselt
    /// numbers applies (mixed-convection floor).
    pub fn convective_cooling(
        &self,
        wind_speed_ms: f64,
        wind_angle_deg: f64,
        air_temp_c: f64,
        conductor_temp_c: f64,
    ) -> f64 {
        let diameter = self.params.diameter_m;
        let delta_t = conductor_temp_c - air_temp_c;
        let film_temp_k = (air_temp_c + conductor_temp_c) / 2.0 + KELVIN_OFFSET;
        let air = air_properties(film_temp_k);

        let perpendicular_wind = wind_speed_ms * wind_angle_deg.to_radians().sin();
        let reynolds =
            (perpendicular_wind * diameter / air.kinematic_viscosity).max(MIN_REYNOLDS);
        let grashof = GRAVITY * diameter.powi(3) * delta_t.abs()
            / (film_temp_k * air.kinematic_viscosity * air.kinematic_viscosity);
        let rayleigh = grashof * PRANDTL;

        let nu_natural = nusselt_natural(rayleigh);
        let nusselt = if perpendicular_wind < NATURAL_CONVECTION_WIND_LIMIT {
            nu_natural
        } else {
            nusselt_forced(reynolds).max(nu_natural)
        };

        PI * nusselt * air.thermal_conductivity * delta_t
    }

    /// Radiative cooling per unit length, W/m. Stefan-Boltzmann on absolute
    /// temperatures.
    pub fn radiative_cooling(&self, air_temp_c: f64, conductor_temp_c: f64) -> f64 {
        let t_c_k = conductor_temp_c + KELVIN_OFFSET;
        let t_a_k = air_temp_c + KELVIN_OFFSET;
        self.params.emissivity
            * STEFAN_BOLTZMANN
            * PI
            * self.params.diameter_m
            * (t_c_k.powi(4) - t_a_k.powi(4))
    }

    /// Net heat input at the candidate conductor temperature, W/m. The
    /// steady-state temperature is the root of this function.
    ///
    /// Returns +infinity when any term is non-finite so the root finder
    /// rejects the candidate instead of silently treating it as balanced.
    #[allow(clippy::too_many_arguments)]
    pub fn heat_balance(
        &self,
        conductor_temp_c: f64,
        current_a: f64,
        solar_radiation_wm2: f64,
        line_azimuth_deg: f64,
        wind_speed_ms: f64,
        wind_angle_deg: f64,
        air_temp_c: f64,
        solar: Option<&SolarGeometry>,
    ) -> f64 {
        let joule = self.joule_heating(current_a, conductor_temp_c);
        let solar_gain = self.solar_heating(solar_radiation_wm2, line_azimuth_deg, solar);
        let convective =
            self.convective_cooling(wind_speed_ms, wind_angle_deg, air_temp_c, conductor_temp_c);
        let radiative = self.radiative_cooling(air_temp_c, conductor_temp_c);

        let balance = joule + solar_gain - convective - radiative;
        if balance.is_finite() {
            balance
        } else {
            f64::INFINITY
        }
    }

    /// Maximum steady current that holds the conductor at `max_temp_c`, A.
    #[allow(clippy::too_many_arguments)]
    pub fn ampacity(
        &self,
        max_temp_c: f64,
        solar_radiation_wm2: f64,
        line_azimuth_deg: f64,
        wind_speed_ms: f64,
        wind_angle_deg: f64,
        air_temp_c: f64,
        solar: Option<&SolarGeometry>,
    ) -> AmpacityEstimate {
        let convective =
            self.convective_cooling(wind_speed_ms, wind_angle_deg, air_temp_c, max_temp_c);
        let radiative = self.radiative_cooling(air_temp_c, max_temp_c);
        let solar_gain = self.solar_heating(solar_radiation_wm2, line_azimuth_deg, solar);

        let net_cooling = convective + radiative - solar_gain;
        if !net_cooling.is_finite() || net_cooling <= 0.0 {
            warn!(
                max_temp_c,
                air_temp_c, "cooling capacity does not exceed solar gain, ampacity is zero"
            );
            return AmpacityEstimate {
                current_a: 0.0,
                cooling_deficit: true,
            };
        }

        AmpacityEstimate {
            current_a: (net_cooling / self.resistance_ac(max_temp_c)).sqrt(),
            cooling_deficit: false,
        }
    }
}
