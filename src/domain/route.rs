use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when the line route geometry is validated.
///
/// All of these are fatal: a malformed route aborts the run before any
/// interpolation or simulation is attempted.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route needs at least 2 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("chainage must be strictly increasing, violated at vertex {0}")]
    NonMonotonicChainage(usize),

    #[error("vertex {index}: latitude {latitude} / longitude {longitude} out of range")]
    CoordinateOutOfRange {
        index: usize,
        latitude: f64,
        longitude: f64,
    },

    #[error("vertex {index}: azimuth {azimuth} outside [0, 360)")]
    AzimuthOutOfRange { index: usize, azimuth: f64 },
}

/// One vertex of the line-route polyline as supplied by the geometry source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteVertex {
    /// Distance along the route from its origin, meters
    pub chainage_m: f64,
    /// Bearing of the outgoing segment, degrees clockwise from north
    pub azimuth_deg: f64,
    pub latitude: f64,
    pub longitude: f64,
}

/// A validated line route. Linear interpolation between consecutive vertices
/// is assumed to be an adequate route model.
#[derive(Debug, Clone)]
pub struct Route {
    vertices: Vec<RouteVertex>,
}

impl Route {
    pub fn new(vertices: Vec<RouteVertex>) -> Result<Self, RouteError> {
        if vertices.len() < 2 {
            return Err(RouteError::TooFewVertices(vertices.len()));
        }
        for (i, v) in vertices.iter().enumerate() {
            if !(-90.0..=90.0).contains(&v.latitude) || !(-180.0..=180.0).contains(&v.longitude) {
                return Err(RouteError::CoordinateOutOfRange {
                    index: i,
                    latitude: v.latitude,
                    longitude: v.longitude,
                });
            }
            if !v.azimuth_deg.is_finite() || !(0.0..360.0).contains(&v.azimuth_deg) {
                return Err(RouteError::AzimuthOutOfRange {
                    index: i,
                    azimuth: v.azimuth_deg,
                });
            }
            if i > 0 && v.chainage_m <= vertices[i - 1].chainage_m {
                return Err(RouteError::NonMonotonicChainage(i));
            }
        }
        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[RouteVertex] {
        &self.vertices
    }
}

/// One discretized point along the route. Produced by the discretizer,
/// immutable afterwards; the sequence order is the position along the line.
#[derive(Debug, Clone, Serialize)]
pub struct LinePoint {
    pub id: usize,
    /// Index of the route segment this point lies on
    pub segment: usize,
    /// Fraction along the segment, [0, 1)
    pub fraction: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// Projected planar coordinates, meters
    pub x_m: f64,
    pub y_m: f64,
    pub azimuth_deg: f64,
    /// Approximate distance along the route, meters
    pub chainage_m: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(chainage: f64, lat: f64, lon: f64) -> RouteVertex {
        RouteVertex {
            chainage_m: chainage,
            azimuth_deg: 0.0,
            latitude: lat,
            longitude: lon,
        }
    }

    #[test]
    fn test_accepts_two_vertex_route() {
        let route = Route::new(vec![
            vertex(0.0, -23.55, -46.63),
            vertex(1000.0, -23.56, -46.63),
        ]);
        assert!(route.is_ok());
    }

    #[test]
    fn test_rejects_single_vertex() {
        let result = Route::new(vec![vertex(0.0, -23.55, -46.63)]);
        assert!(matches!(result, Err(RouteError::TooFewVertices(1))));
    }

    #[test]
    fn test_rejects_non_monotonic_chainage() {
        let result = Route::new(vec![
            vertex(0.0, -23.55, -46.63),
            vertex(1000.0, -23.56, -46.63),
            vertex(500.0, -23.57, -46.63),
        ]);
        assert!(matches!(result, Err(RouteError::NonMonotonicChainage(2))));
    }

    #[test]
    fn test_rejects_bad_coordinates() {
        let result = Route::new(vec![vertex(0.0, -95.0, -46.63), vertex(1000.0, -23.56, -46.63)]);
        assert!(matches!(result, Err(RouteError::CoordinateOutOfRange { index: 0, .. })));
    }
}
