/// Deterministic, pure transform from geographic to planar coordinates in
/// meters. Implementations must be accurate for distances up to the full
/// line length.
pub trait Projector: Send + Sync {
    fn project(&self, latitude: f64, longitude: f64) -> (f64, f64);
}

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Equirectangular projection anchored at a reference origin.
///
/// Scales longitude by the cosine of the origin latitude, which keeps
/// distance distortion negligible over transmission-line extents.
#[derive(Debug, Clone, Copy)]
pub struct EquirectangularProjection {
    origin_lat_deg: f64,
    origin_lon_deg: f64,
    cos_origin_lat: f64,
}

impl EquirectangularProjection {
    pub fn new(origin_lat_deg: f64, origin_lon_deg: f64) -> Self {
        Self {
            origin_lat_deg,
            origin_lon_deg,
            cos_origin_lat: origin_lat_deg.to_radians().cos(),
        }
    }
}

impl Projector for EquirectangularProjection {
    fn project(&self, latitude: f64, longitude: f64) -> (f64, f64) {
        let x = (longitude - self.origin_lon_deg).to_radians() * EARTH_RADIUS_M * self.cos_origin_lat;
        let y = (latitude - self.origin_lat_deg).to_radians() * EARTH_RADIUS_M;
        (x, y)
    }
}
