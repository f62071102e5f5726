use super::projection::Projector;
use crate::domain::{LinePoint, Route};
use itertools::Itertools;

/// Walks the route polyline and emits points at a fixed spacing.
///
/// Each segment is traversed from its start vertex; the segment azimuth is
/// carried across the whole segment and the far endpoint belongs to the next
/// segment. A segment shorter than the spacing still contributes its start
/// point so no part of the route is left unrepresented.
#[derive(Debug, Clone, Copy)]
pub struct LineDiscretizer {
    spacing_m: f64,
}

impl LineDiscretizer {
    pub fn new(spacing_m: f64) -> Self {
        Self {
            spacing_m: spacing_m.max(1.0),
        }
    }

    pub fn discretize(&self, route: &Route, projector: &dyn Projector) -> Vec<LinePoint> {
        let mut points = Vec::new();

        for (segment, (start, end)) in route.vertices().iter().tuple_windows().enumerate() {
            let (x0, y0) = projector.project(start.latitude, start.longitude);
            let (x1, y1) = projector.project(end.latitude, end.longitude);
            let segment_length = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();

            let steps = ((segment_length / self.spacing_m).floor() as usize).max(1);
            for j in 0..steps {
                let fraction = j as f64 / steps as f64;
                let latitude = start.latitude + fraction * (end.latitude - start.latitude);
                let longitude = start.longitude + fraction * (end.longitude - start.longitude);
                let (x_m, y_m) = projector.project(latitude, longitude);

                points.push(LinePoint {
                    id: points.len(),
                    segment,
                    fraction,
                    latitude,
                    longitude,
                    x_m,
                    y_m,
                    azimuth_deg: start.azimuth_deg,
                    chainage_m: start.chainage_m + fraction * segment_length,
                });
            }
        }

        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RouteVertex;
    use crate::geo::EquirectangularProjection;

    fn straight_route() -> Route {
        // Roughly 11 km of route heading north.
        Route::new(vec![
            RouteVertex {
                chainage_m: 0.0,
                azimuth_deg: 0.0,
                latitude: -23.60,
                longitude: -46.63,
            },
            RouteVertex {
                chainage_m: 11000.0,
                azimuth_deg: 10.0,
                latitude: -23.50,
                longitude: -46.63,
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_point_spacing_and_ordering() {
        let route = straight_route();
        let projector = EquirectangularProjection::new(-23.60, -46.63);
        let points = LineDiscretizer::new(1000.0).discretize(&route, &projector);

        // ~11.1 km segment discretized at 1 km.
        assert_eq!(points.len(), 11);
        for (i, p) in points.iter().enumerate() {
            assert_eq!(p.id, i);
        }
        for pair in points.windows(2) {
            let step = pair[1].chainage_m - pair[0].chainage_m;
            assert!((step - 1011.0).abs() < 10.0, "uneven step {step}");
        }
    }

    #[test]
    fn test_segment_azimuth_is_carried() {
        let route = straight_route();
        let projector = EquirectangularProjection::new(-23.60, -46.63);
        let points = LineDiscretizer::new(1000.0).discretize(&route, &projector);
        assert!(points.iter().all(|p| p.azimuth_deg == 0.0));
    }

    #[test]
    fn test_short_segment_still_yields_its_start() {
        let route = Route::new(vec![
            RouteVertex {
                chainage_m: 0.0,
                azimuth_deg: 0.0,
                latitude: -23.600,
                longitude: -46.63,
            },
            RouteVertex {
                chainage_m: 100.0,
                azimuth_deg: 0.0,
                latitude: -23.599,
                longitude: -46.63,
            },
        ])
        .unwrap();
        let projector = EquirectangularProjection::new(-23.6, -46.63);
        let points = LineDiscretizer::new(1000.0).discretize(&route, &projector);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].fraction, 0.0);
    }
}
