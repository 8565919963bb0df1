//! Map matching: project a coordinate onto the nearest road.

use crate::geometry::snap;
use crate::traits::{IntersectionId, LocationOnRoad, RoadNetwork};

/// Match a geographic coordinate to the closest location on the network.
///
/// The coordinate is snapped onto the nearest link and the distance along
/// the link is converted into travel time by linear interpolation. The
/// result is clamped to the road's travel time.
pub fn map_match<N: RoadNetwork + ?Sized>(
    network: &N,
    longitude: f64,
    latitude: f64,
) -> LocationOnRoad {
    let link = network.nearest_link(longitude, latitude);
    let xy = network.to_planar(longitude, latitude);
    let snapped = snap(link.from, link.to, xy);

    let time_on_link = if link.length > 0.0 {
        let along = snapped.point.distance(&link.from);
        (along / link.length * link.travel_time).round() as i64
    } else {
        0
    };

    let elapsed = (link.begin_time + time_on_link).clamp(0, link.road.travel_time.max(0));
    LocationOnRoad::new(link.road, elapsed)
}

/// The road endpoint closest in travel time to `location`.
///
/// Ties go to the start intersection.
pub fn nearest_endpoint(location: &LocationOnRoad) -> IntersectionId {
    if location.travel_time_from_start > location.remaining_travel_time() {
        location.road.to
    } else {
        location.road.from
    }
}
