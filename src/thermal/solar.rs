use std::f64::consts::PI;

/// Shape factor used when no solar-position inputs are available: global
/// radiation is assumed to strike the conductor at an average effective
/// incidence. The geometric calculation below is the reference behavior.
pub const DEFAULT_SHAPE_FACTOR: f64 = 0.5;

/// Solar-position inputs for the geometric shape-factor calculation.
///
/// Hour is local solar time in fractional hours; no equation-of-time
/// correction is applied.
#[derive(Debug, Clone, Copy)]
pub struct SolarGeometry {
    pub latitude_deg: f64,
    /// Day of year, 1-366
    pub day_of_year: u32,
    /// Local solar time, fractional hours
    pub hour: f64,
}

impl SolarGeometry {
    /// Solar elevation and azimuth for the configured instant.
    ///
    /// Returns (elevation_deg, azimuth_deg). Elevation is the angle above the
    /// horizon; azimuth is measured clockwise from north. Declination uses
    /// the standard day-of-year approximation, the hour angle is 15 deg per
    /// hour from solar noon.
    pub fn solar_position(&self) -> (f64, f64) {
        let declination_deg =
            23.45 * (360.0 / 365.0 * (self.day_of_year as f64 + 284.0) * PI / 180.0).sin();
        let declination_rad = declination_deg * PI / 180.0;
        let latitude_rad = self.latitude_deg * PI / 180.0;

        let hour_angle_deg = 15.0 * (self.hour - 12.0);
        let hour_angle_rad = hour_angle_deg * PI / 180.0;

        let elevation_sin = latitude_rad.sin() * declination_rad.sin()
            + latitude_rad.cos() * declination_rad.cos() * hour_angle_rad.cos();
        let elevation_rad = elevation_sin.clamp(-1.0, 1.0).asin();
        let elevation_deg = elevation_rad.to_degrees();

        let denominator = latitude_rad.cos() * elevation_rad.cos();
        let azimuth_cos = if denominator.abs() < 1e-12 {
            1.0
        } else {
            ((declination_rad.sin() - latitude_rad.sin() * elevation_rad.sin()) / denominator)
                .clamp(-1.0, 1.0)
        };
        let mut azimuth_deg = azimuth_cos.acos().to_degrees();

        // Afternoon: sun in the western sky
        if hour_angle_deg > 0.0 {
            azimuth_deg = 360.0 - azimuth_deg;
        }

        (elevation_deg, azimuth_deg)
    }

    /// Effective fraction of the beam intercepted by the conductor,
    /// `sin(eta)` where `eta` is the angle between the solar beam and the
    /// conductor axis. Zero when the sun is below the horizon.
    pub fn shape_factor(&self, line_azimuth_deg: f64) -> f64 {
        let (elevation_deg, solar_azimuth_deg) = self.solar_position();
        if elevation_deg <= 0.0 {
            return 0.0;
        }

        let elevation_rad = elevation_deg.to_radians();
        let relative_azimuth_rad = (solar_azimuth_deg - line_azimuth_deg).to_radians();

        let cos_eta = elevation_rad.cos() * relative_azimuth_rad.cos();
        (1.0 - cos_eta * cos_eta).max(0.0).sqrt()
    }
}
