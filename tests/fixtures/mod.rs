//! Test fixtures for cruise-planner.
//!
//! Provides:
//! - A rectangular grid road network with bidirectional roads
//! - Trip builders and local-time helpers (America/New_York)

#![allow(dead_code)]

use std::collections::VecDeque;

use chrono::TimeZone;
use chrono_tz::America::New_York;
use chrono_tz::Tz;

use cruise_planner::config::ModelConfig;
use cruise_planner::geometry::{Point, snap};
use cruise_planner::traits::{
    Intersection, IntersectionId, Link, Road, RoadNetwork, TravelTimeProvider,
};
use cruise_planner::trips::TripRecord;

pub const TIMEZONE: Tz = New_York;

/// Grid origin (south-west corner), lower Manhattan-ish.
pub const ORIGIN: (f64, f64) = (-74.0, 40.7);

/// Distance between neighbouring intersections, in degrees.
pub const SPACING: f64 = 0.01;

/// Travel time of every road, in seconds.
pub const ROAD_TIME: i64 = 60;

/// January 2016: the 4th is a Monday.
pub const WEEKDAYS: [u32; 5] = [4, 5, 6, 7, 8];
pub const WEEKEND: [u32; 2] = [9, 10];

// ============================================================================
// Grid network
// ============================================================================

/// `cols x rows` intersections; id = row * cols + col.
///
/// Planar projection is the identity on `(lon, lat)`.
pub struct GridNetwork {
    pub cols: usize,
    pub rows: usize,
    intersections: Vec<Intersection>,
    roads: Vec<Road>,
    adjacency: Vec<Vec<Road>>,
}

impl GridNetwork {
    pub fn new(cols: usize, rows: usize) -> Self {
        let mut intersections = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                intersections.push(Intersection::new(
                    (row * cols + col) as IntersectionId,
                    ORIGIN.0 + col as f64 * SPACING,
                    ORIGIN.1 + row as f64 * SPACING,
                ));
            }
        }

        let mut roads = Vec::new();
        let mut connect = |a: usize, b: usize| {
            for (from, to) in [(a, b), (b, a)] {
                roads.push(Road {
                    id: roads.len() as u64,
                    from: from as IntersectionId,
                    to: to as IntersectionId,
                    travel_time: ROAD_TIME,
                });
            }
        };
        for row in 0..rows {
            for col in 0..cols {
                let id = row * cols + col;
                if col + 1 < cols {
                    connect(id, id + 1);
                }
                if row + 1 < rows {
                    connect(id, id + cols);
                }
            }
        }

        let mut adjacency = vec![Vec::new(); intersections.len()];
        for road in &roads {
            adjacency[road.from as usize].push(*road);
        }

        Self {
            cols,
            rows,
            intersections,
            roads,
            adjacency,
        }
    }

    pub fn intersection_at(&self, col: usize, row: usize) -> Intersection {
        self.intersections[row * self.cols + col]
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    pub fn road_between(&self, from: IntersectionId, to: IntersectionId) -> Road {
        *self.adjacency[from as usize]
            .iter()
            .find(|r| r.to == to)
            .expect("intersections are not neighbours")
    }

    fn position(&self, id: IntersectionId) -> Point {
        self.intersections[id as usize].point()
    }

    fn hops(&self, from: IntersectionId, to: IntersectionId) -> i64 {
        let (fc, fr) = (from as usize % self.cols, from as usize / self.cols);
        let (tc, tr) = (to as usize % self.cols, to as usize / self.cols);
        (fc.abs_diff(tc) + fr.abs_diff(tr)) as i64
    }
}

impl RoadNetwork for GridNetwork {
    fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    fn roads_from(&self, intersection: IntersectionId) -> Vec<Road> {
        self.adjacency
            .get(intersection as usize)
            .cloned()
            .unwrap_or_default()
    }

    fn nearest_link(&self, longitude: f64, latitude: f64) -> Link {
        let p = Point::new(longitude, latitude);
        let mut best = self.roads[0];
        let mut best_distance = f64::INFINITY;
        for road in &self.roads {
            let distance = snap(self.position(road.from), self.position(road.to), p).distance;
            if distance < best_distance {
                best = *road;
                best_distance = distance;
            }
        }
        let from = self.position(best.from);
        let to = self.position(best.to);
        Link {
            road: best,
            from,
            to,
            length: from.distance(&to),
            travel_time: best.travel_time as f64,
            begin_time: 0,
        }
    }

    fn to_planar(&self, longitude: f64, latitude: f64) -> Point {
        Point::new(longitude, latitude)
    }

    fn contains(&self, longitude: f64, latitude: f64) -> bool {
        let margin = SPACING / 2.0;
        let max_lon = ORIGIN.0 + (self.cols - 1) as f64 * SPACING;
        let max_lat = ORIGIN.1 + (self.rows - 1) as f64 * SPACING;
        longitude >= ORIGIN.0 - margin
            && longitude <= max_lon + margin
            && latitude >= ORIGIN.1 - margin
            && latitude <= max_lat + margin
    }

    fn shortest_travel_time_path(
        &self,
        from: IntersectionId,
        to: IntersectionId,
    ) -> Vec<IntersectionId> {
        let n = self.intersections.len();
        let mut previous: Vec<Option<IntersectionId>> = vec![None; n];
        let mut visited = vec![false; n];
        let mut queue = VecDeque::from([from]);
        visited[from as usize] = true;

        while let Some(current) = queue.pop_front() {
            if current == to {
                let mut path = vec![to];
                let mut step = to;
                while let Some(prev) = previous[step as usize] {
                    path.push(prev);
                    step = prev;
                }
                path.reverse();
                return path;
            }
            for road in &self.adjacency[current as usize] {
                if !visited[road.to as usize] {
                    visited[road.to as usize] = true;
                    previous[road.to as usize] = Some(current);
                    queue.push_back(road.to);
                }
            }
        }
        Vec::new()
    }
}

impl TravelTimeProvider for GridNetwork {
    fn travel_time_between(&self, from: &Intersection, to: &Intersection) -> i64 {
        self.hops(from.id, to.id) * ROAD_TIME
    }
}

// ============================================================================
// Trips and time
// ============================================================================

/// Epoch seconds of a New York local time in January 2016.
pub fn january(day: u32, hour: u32, minute: u32) -> i64 {
    TIMEZONE
        .with_ymd_and_hms(2016, 1, day, hour, minute, 0)
        .unwrap()
        .timestamp()
}

pub fn trip(pickup: Point, pickup_time: i64, dropoff: Point, duration_secs: i64) -> TripRecord {
    TripRecord {
        pickup_time,
        dropoff_time: pickup_time + duration_secs,
        pickup,
        dropoff,
    }
}

/// One trip per intersection per day, picked up near the intersection at
/// `hour:minute` and dropped at the mirrored intersection 20 minutes later.
///
/// Pickup points get a small per-day offset so no two are identical.
pub fn grid_trips(grid: &GridNetwork, days: &[u32], hour: u32, minute: u32) -> Vec<TripRecord> {
    let mut trips = Vec::new();
    for (day_index, &day) in days.iter().enumerate() {
        let offset = 0.0003 * (day_index + 1) as f64;
        for row in 0..grid.rows {
            for col in 0..grid.cols {
                let origin = grid.intersection_at(col, row).point();
                let mirror = grid
                    .intersection_at(grid.cols - 1 - col, grid.rows - 1 - row)
                    .point();
                trips.push(trip(
                    Point::new(origin.x + offset, origin.y + offset / 2.0),
                    january(day, hour, minute),
                    mirror,
                    20 * 60,
                ));
            }
        }
    }
    trips
}

pub fn config(zone_count: usize) -> ModelConfig {
    ModelConfig::new(zone_count, 15, 4, "unused.csv", TIMEZONE).with_seed(17)
}
