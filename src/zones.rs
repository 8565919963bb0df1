//! Partition of the road network into zones around learned centroids.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::clustering::nearest_centroid;
use crate::geometry::Point;
use crate::traits::{Intersection, IntersectionId, Road, RoadNetwork};

/// A zone: the intersections nearest to one centroid and the roads touching them.
#[derive(Debug, Clone)]
pub struct Zone {
    pub index: usize,
    pub centroid: Point,
    pub intersections: Vec<Intersection>,
    pub roads: Vec<Road>,
}

/// Immutable assignment of every intersection to exactly one zone.
#[derive(Debug, Clone)]
pub struct ZonePartition {
    zones: Vec<Zone>,
    zone_of_intersection: HashMap<IntersectionId, usize>,
    intersections: HashMap<IntersectionId, Intersection>,
}

impl ZonePartition {
    /// Assign each intersection of `network` to its nearest centroid.
    ///
    /// A road belongs to the zones of both of its endpoints.
    pub fn build<N: RoadNetwork + ?Sized>(network: &N, centroids: &[Point]) -> Self {
        let mut zones: Vec<Zone> = centroids
            .iter()
            .enumerate()
            .map(|(index, centroid)| Zone {
                index,
                centroid: *centroid,
                intersections: Vec::new(),
                roads: Vec::new(),
            })
            .collect();

        let all = network.intersections();
        let mut zone_of_intersection = HashMap::with_capacity(all.len());
        let mut intersections = HashMap::with_capacity(all.len());

        if !centroids.is_empty() {
            let assignment: Vec<usize> = all
                .par_iter()
                .map(|i| nearest_centroid(&i.point(), centroids))
                .collect();

            for (intersection, zone) in all.iter().zip(assignment) {
                zones[zone].intersections.push(*intersection);
                zone_of_intersection.insert(intersection.id, zone);
                intersections.insert(intersection.id, *intersection);
            }
        }

        for intersection in all {
            let Some(&from_zone) = zone_of_intersection.get(&intersection.id) else {
                continue;
            };
            for road in network.roads_from(intersection.id) {
                zones[from_zone].roads.push(road);
                if let Some(&to_zone) = zone_of_intersection.get(&road.to) {
                    if to_zone != from_zone {
                        zones[to_zone].roads.push(road);
                    }
                }
            }
        }

        Self {
            zones,
            zone_of_intersection,
            intersections,
        }
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zone(&self, index: usize) -> Option<&Zone> {
        self.zones.get(index)
    }

    pub fn intersection(&self, id: IntersectionId) -> Option<&Intersection> {
        self.intersections.get(&id)
    }

    pub fn zone_of_intersection(&self, id: IntersectionId) -> Option<usize> {
        self.zone_of_intersection.get(&id).copied()
    }

    /// Zone of a road: the lowest zone index among its endpoints.
    ///
    /// Roads whose endpoints are both unknown resolve to zone 0.
    pub fn zone_of_road(&self, road: &Road) -> usize {
        let from = self.zone_of_intersection(road.from);
        let to = self.zone_of_intersection(road.to);
        match (from, to) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => 0,
        }
    }
}
