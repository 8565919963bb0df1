//! Road network traits consumed by the planner.
//!
//! The graph itself, its spatial index and its shortest-path engine live in
//! the host application. These traits are the narrow surface the planner
//! needs from it.

use crate::geometry::Point;

/// Identifier of an intersection (graph vertex).
pub type IntersectionId = u64;

/// Identifier of a road (directed graph edge).
pub type RoadId = u64;

/// A graph vertex with its geographic position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub id: IntersectionId,
    pub longitude: f64,
    pub latitude: f64,
}

impl Intersection {
    pub fn new(id: IntersectionId, longitude: f64, latitude: f64) -> Self {
        Self {
            id,
            longitude,
            latitude,
        }
    }

    /// Geographic position as a `(lon, lat)` point.
    pub fn point(&self) -> Point {
        Point::new(self.longitude, self.latitude)
    }
}

/// A directed road between two intersections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Road {
    pub id: RoadId,
    pub from: IntersectionId,
    pub to: IntersectionId,
    /// Time to traverse the whole road, in seconds.
    pub travel_time: i64,
}

/// A straight segment of a road, in planar coordinates.
///
/// Roads with curved geometry are made of several links; `begin_time` is the
/// travel time from the road's start intersection to the start of this link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub road: Road,
    pub from: Point,
    pub to: Point,
    /// Planar length of the link.
    pub length: f64,
    /// Time to traverse the link, in seconds.
    pub travel_time: f64,
    pub begin_time: i64,
}

/// A position on a road expressed as elapsed travel time from its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationOnRoad {
    pub road: Road,
    pub travel_time_from_start: i64,
}

impl LocationOnRoad {
    pub fn new(road: Road, travel_time_from_start: i64) -> Self {
        Self {
            road,
            travel_time_from_start,
        }
    }

    /// Travel time left before reaching the road's end intersection.
    pub fn remaining_travel_time(&self) -> i64 {
        self.road.travel_time - self.travel_time_from_start
    }
}

/// Topology and geometry of the road network.
pub trait RoadNetwork {
    /// All intersections of the network.
    fn intersections(&self) -> &[Intersection];

    /// Roads leaving the given intersection.
    fn roads_from(&self, intersection: IntersectionId) -> Vec<Road>;

    /// The link nearest to a geographic coordinate.
    fn nearest_link(&self, longitude: f64, latitude: f64) -> Link;

    /// Project a geographic coordinate into the planar space used by links.
    fn to_planar(&self, longitude: f64, latitude: f64) -> Point;

    /// Whether a geographic coordinate lies inside the network's bounding region.
    fn contains(&self, longitude: f64, latitude: f64) -> bool;

    /// Shortest travel-time path between two intersections, source included.
    ///
    /// Returns an empty vector when the destination is unreachable.
    fn shortest_travel_time_path(
        &self,
        from: IntersectionId,
        to: IntersectionId,
    ) -> Vec<IntersectionId>;
}

/// Provides the travel time between two intersections.
pub trait TravelTimeProvider {
    /// Travel time in seconds. `i64::MAX` means unreachable.
    fn travel_time_between(&self, from: &Intersection, to: &Intersection) -> i64;
}

