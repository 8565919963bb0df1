//! Straight-line travel times for hosts without a routing engine.

use crate::traits::{Intersection, TravelTimeProvider};

const MEAN_EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Great-circle distance between two intersections, in meters.
pub fn great_circle_meters(a: &Intersection, b: &Intersection) -> f64 {
    let (phi_a, phi_b) = (a.latitude.to_radians(), b.latitude.to_radians());
    let half_dphi = (phi_b - phi_a) / 2.0;
    let half_dlambda = (b.longitude - a.longitude).to_radians() / 2.0;

    let h = half_dphi.sin().powi(2) + phi_a.cos() * phi_b.cos() * half_dlambda.sin().powi(2);
    2.0 * MEAN_EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Travel time as great-circle distance at a constant speed.
///
/// Ignores the road layout, so times are lower bounds on a real network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HaversineTravelTime {
    pub speed_kmh: f64,
}

impl Default for HaversineTravelTime {
    /// Typical Manhattan taxi speed.
    fn default() -> Self {
        Self::new(18.0)
    }
}

impl HaversineTravelTime {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }
}

impl TravelTimeProvider for HaversineTravelTime {
    fn travel_time_between(&self, from: &Intersection, to: &Intersection) -> i64 {
        if from.id == to.id {
            return 0;
        }
        let meters_per_second = self.speed_kmh / 3.6;
        if meters_per_second <= 0.0 {
            return i64::MAX;
        }
        (great_circle_meters(from, to) / meters_per_second).round() as i64
    }
}
