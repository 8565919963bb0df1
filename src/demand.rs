//! Zone demand model: training and read-only queries.
//!
//! Training runs once: pickups from a random sample of days are clustered
//! into zones, every retained trip is map-matched into a zone, and pickup
//! and dropoff counts are accumulated per (day class, time slot, zone) and
//! per (day class, hour, zone), then averaged over the number of distinct
//! days seen for each day class. The trained model is immutable.

use std::collections::{BTreeSet, HashSet};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::calendar::{Calendar, DayClass, PERIODS_PER_DAY, PeakCondition};
use crate::clustering::KMeans;
use crate::config::ModelConfig;
use crate::error::TrainingError;
use crate::geometry::{Point, centroid};
use crate::map_match::{map_match, nearest_endpoint};
use crate::table::DemandTable;
use crate::traits::{IntersectionId, LocationOnRoad, RoadNetwork, TravelTimeProvider};
use crate::trips::{TripReader, TripRecord};
use crate::zones::ZonePartition;

/// Closed travel-time window in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TravelWindow {
    pub min: i64,
    pub max: i64,
}

impl TravelWindow {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, seconds: i64) -> bool {
        seconds >= self.min && seconds <= self.max
    }
}

/// Zones ordered by descending net demand for each (day class, hour).
#[derive(Debug, Clone, PartialEq)]
pub struct PopularityRanking {
    orders: Vec<Vec<usize>>,
}

impl PopularityRanking {
    /// Rank zones of an hourly table. Equal demand keeps zone index order.
    pub fn build(hourly: &DemandTable) -> Self {
        let mut orders = Vec::with_capacity(DayClass::ALL.len() * PERIODS_PER_DAY);
        for day in DayClass::ALL {
            for hour in 0..PERIODS_PER_DAY {
                let mut order: Vec<usize> = (0..hourly.zones()).collect();
                order.sort_by(|&a, &b| {
                    let net_a = hourly.get(day, hour, a).net();
                    let net_b = hourly.get(day, hour, b).net();
                    net_b.total_cmp(&net_a)
                });
                orders.push(order);
            }
        }
        Self { orders }
    }

    /// Zones from most to least popular.
    pub fn order(&self, day: DayClass, hour: usize) -> &[usize] {
        self.orders
            .get(day.index() * PERIODS_PER_DAY + hour)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 1-based rank of `zone`; unknown zones rank after every known one.
    pub fn rank(&self, day: DayClass, hour: usize, zone: usize) -> usize {
        let order = self.order(day, hour);
        order
            .iter()
            .position(|&z| z == zone)
            .map(|p| p + 1)
            .unwrap_or(order.len().max(1))
    }
}

/// Trained, read-only demand model shared by every agent.
#[derive(Debug, Clone)]
pub struct DemandModel {
    calendar: Calendar,
    lookahead_slots: usize,
    zones: ZonePartition,
    slot_demand: DemandTable,
    hour_demand: DemandTable,
    ranking: PopularityRanking,
    centers: Vec<[Option<IntersectionId>; 2]>,
}

impl DemandModel {
    /// Train from the CSV dataset named in the configuration.
    ///
    /// Rows that fail to parse are skipped and counted.
    pub fn train_from_dataset<N>(config: &ModelConfig, network: &N) -> Result<Self, TrainingError>
    where
        N: RoadNetwork + Sync + ?Sized,
    {
        config.validate()?;
        let reader = TripReader::open(&config.training_dataset, config.timezone)?;

        let mut skipped = 0usize;
        let trips = reader.filter_map(|row| match row {
            Ok(trip) => Some(trip),
            Err(err) => {
                skipped += 1;
                debug!(%err, "skipping trip record");
                None
            }
        });
        let model = Self::train(config, network, trips);

        if skipped > 0 {
            warn!(skipped, "skipped unreadable trip records");
        }
        model
    }

    /// Train from an in-memory sequence of trips.
    ///
    /// Trips whose pickup or dropoff lies outside the network region, or
    /// whose timestamps are out of calendar range, are excluded from every
    /// statistic.
    pub fn train<N, I>(config: &ModelConfig, network: &N, trips: I) -> Result<Self, TrainingError>
    where
        N: RoadNetwork + Sync + ?Sized,
        I: IntoIterator<Item = TripRecord>,
    {
        config.validate()?;
        if network.intersections().is_empty() {
            return Err(TrainingError::EmptyNetwork);
        }

        let calendar = Calendar::new(config.timezone, config.time_slot_minutes);
        let mut unrepresentable = 0usize;
        let trips: Vec<TripRecord> = trips
            .into_iter()
            .filter(|t| {
                if !calendar.is_representable(t.pickup_time) || !calendar.is_representable(t.dropoff_time) {
                    unrepresentable += 1;
                    return false;
                }
                network.contains(t.pickup.x, t.pickup.y) && network.contains(t.dropoff.x, t.dropoff.y)
            })
            .collect();
        if unrepresentable > 0 {
            warn!(unrepresentable, "skipped trip records with out-of-range timestamps");
        }
        if trips.is_empty() {
            return Err(TrainingError::EmptyDataset);
        }
        info!(records = trips.len(), "training demand model");

        let mut days = BTreeSet::new();
        let mut weekdays = BTreeSet::new();
        let mut weekends = BTreeSet::new();
        for trip in &trips {
            let day = calendar.day_of_year(trip.pickup_time);
            days.insert(day);
            match calendar.day_class(trip.pickup_time) {
                DayClass::Weekday => weekdays.insert(day),
                DayClass::Weekend => weekends.insert(day),
            };
        }

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let days: Vec<u32> = days.into_iter().collect();
        let sampled: HashSet<u32> = days
            .choose_multiple(&mut rng, config.sample_days.min(days.len()))
            .copied()
            .collect();
        let sample: Vec<Point> = trips
            .iter()
            .filter(|t| sampled.contains(&calendar.day_of_year(t.pickup_time)))
            .map(|t| t.pickup)
            .collect();

        let clustering = KMeans::new(config.zone_count)
            .with_max_iterations(config.max_iterations)
            .cluster(&sample, &mut rng);
        info!(
            sample = sample.len(),
            days = sampled.len(),
            iterations = clustering.iterations,
            zones = clustering.centroids.len(),
            "clustered pickups"
        );
        if clustering.centroids.len() < config.zone_count {
            warn!(
                requested = config.zone_count,
                trained = clustering.centroids.len(),
                "fewer zones than requested"
            );
        }

        let zones = ZonePartition::build(network, &clustering.centroids);
        let zone_count = zones.len();

        let matched: Vec<(usize, usize)> = trips
            .par_iter()
            .map(|t| {
                let pickup = map_match(network, t.pickup.x, t.pickup.y);
                let dropoff = map_match(network, t.dropoff.x, t.dropoff.y);
                (zones.zone_of_road(&pickup.road), zones.zone_of_road(&dropoff.road))
            })
            .collect();

        let mut slot_demand = DemandTable::new(calendar.slots_per_day(), zone_count);
        let mut hour_demand = DemandTable::new(PERIODS_PER_DAY, zone_count);
        let mut center_points: Vec<[Vec<Point>; 2]> = vec![[Vec::new(), Vec::new()]; zone_count];

        for (trip, (pickup_zone, dropoff_zone)) in trips.iter().zip(matched) {
            let day = calendar.day_class(trip.pickup_time);
            let condition = calendar.peak_condition(trip.pickup_time);
            if let Some(points) = center_points.get_mut(pickup_zone) {
                points[condition.index()].push(trip.pickup);
            }

            slot_demand.add_pickup(day, calendar.time_slot(trip.pickup_time), pickup_zone);
            slot_demand.add_dropoff(day, calendar.time_slot(trip.dropoff_time), dropoff_zone);
            hour_demand.add_pickup(day, calendar.time_period(trip.pickup_time), pickup_zone);
            hour_demand.add_dropoff(day, calendar.time_period(trip.dropoff_time), dropoff_zone);
        }

        for (day, count) in [(DayClass::Weekday, weekdays.len()), (DayClass::Weekend, weekends.len())] {
            slot_demand.average_over(day, count);
            hour_demand.average_over(day, count);
        }
        let ranking = PopularityRanking::build(&hour_demand);

        let centers: Vec<[Option<IntersectionId>; 2]> = center_points
            .iter()
            .enumerate()
            .map(|(zone, by_condition)| {
                PeakCondition::ALL.map(|condition| {
                    let center = center_intersection(network, &by_condition[condition.index()]);
                    if center.is_none() {
                        warn!(zone, ?condition, "zone has no pickups, no center intersection");
                    }
                    center
                })
            })
            .collect();

        info!(
            zones = zone_count,
            weekdays = weekdays.len(),
            weekends = weekends.len(),
            "demand model trained"
        );

        Ok(Self {
            calendar,
            lookahead_slots: config.lookahead_slots,
            zones,
            slot_demand,
            hour_demand,
            ranking,
            centers,
        })
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn zones(&self) -> &ZonePartition {
        &self.zones
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// Per-day average counts by (day class, time slot, zone).
    pub fn slot_demand(&self) -> &DemandTable {
        &self.slot_demand
    }

    /// Per-day average counts by (day class, hour, zone).
    pub fn hour_demand(&self) -> &DemandTable {
        &self.hour_demand
    }

    pub fn ranking(&self) -> &PopularityRanking {
        &self.ranking
    }

    pub fn is_weekday(&self, time: i64) -> bool {
        self.calendar.is_weekday(time)
    }

    pub fn is_peak_hours(&self, time: i64) -> bool {
        self.calendar.is_peak_hours(time)
    }

    /// Zone of the road the location lies on.
    pub fn zone_of_location(&self, location: &LocationOnRoad) -> usize {
        self.zones.zone_of_road(&location.road)
    }

    /// Forward-looking net demand of a zone, never negative.
    ///
    /// Sums `pickups - 0.5 * dropoffs` over the look-ahead slots starting
    /// at the slot of `time`. Slots past the end of the day are skipped.
    pub fn cluster_weight(&self, zone: usize, time: i64) -> f64 {
        let day = self.calendar.day_class(time);
        let first = self.calendar.time_slot(time);
        let last = first
            .saturating_add(self.lookahead_slots)
            .min(self.slot_demand.buckets());
        let weight: f64 = (first..last)
            .map(|slot| self.slot_demand.get(day, slot, zone).net())
            .sum();
        weight.max(0.0)
    }

    /// 1-based popularity rank of a zone for the day class and hour of `time`.
    pub fn popularity_rank(&self, zone: usize, time: i64) -> usize {
        let day = self.calendar.day_class(time);
        self.ranking.rank(day, self.calendar.time_period(time), zone)
    }

    /// Popularity rank of the zone containing `location`.
    pub fn popularity_rank_at(&self, location: &LocationOnRoad, time: i64) -> usize {
        self.popularity_rank(self.zone_of_location(location), time)
    }

    /// Popularity rank of the zone nearest to a geographic coordinate.
    pub fn popularity_rank_near<N: RoadNetwork + ?Sized>(
        &self,
        network: &N,
        longitude: f64,
        latitude: f64,
        time: i64,
    ) -> usize {
        let location = map_match(network, longitude, latitude);
        self.popularity_rank_at(&location, time)
    }

    /// Center intersection of a zone under the peak condition of `time`.
    pub fn center_intersection(&self, zone: usize, time: i64) -> Option<IntersectionId> {
        let condition = self.calendar.peak_condition(time);
        self.centers.get(zone)?[condition.index()]
    }

    /// Zones whose center intersection for `time` is reachable from
    /// `location` within `window`, in ascending zone order.
    pub fn reachable_zones<T: TravelTimeProvider + ?Sized>(
        &self,
        travel: &T,
        location: &LocationOnRoad,
        time: i64,
        window: TravelWindow,
    ) -> Vec<usize> {
        let Some(road_end) = self.zones.intersection(location.road.to) else {
            return Vec::new();
        };
        let remaining = location.remaining_travel_time();

        (0..self.zone_count())
            .filter(|&zone| {
                self.center_intersection(zone, time)
                    .and_then(|id| self.zones.intersection(id))
                    .map(|center| {
                        let cost = remaining.saturating_add(travel.travel_time_between(road_end, center));
                        window.contains(cost)
                    })
                    .unwrap_or(false)
            })
            .collect()
    }

    /// A uniformly random intersection of a zone.
    pub fn random_intersection<R: Rng + ?Sized>(&self, zone: usize, rng: &mut R) -> Option<IntersectionId> {
        self.zones
            .zone(zone)?
            .intersections
            .choose(rng)
            .map(|i| i.id)
    }
}

/// Centroid of the points, snapped to the network and rounded to the
/// nearer endpoint of the matched road.
fn center_intersection<N: RoadNetwork + ?Sized>(network: &N, points: &[Point]) -> Option<IntersectionId> {
    let center = centroid(points)?;
    let location = map_match(network, center.x, center.y);
    Some(nearest_endpoint(&location))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_travel_window_is_closed() {
        let window = TravelWindow::new(0, 600);
        assert!(window.contains(0));
        assert!(window.contains(600));
        assert!(!window.contains(601));
        assert!(!window.contains(-1));
    }

    #[test]
    fn test_ranking_orders_by_net_demand() {
        let mut hourly = DemandTable::new(PERIODS_PER_DAY, 3);
        // zone 0: net 1.0, zone 1: net 2.0 - 1.5 = 0.5, zone 2: net 3.0
        hourly.add_pickup(DayClass::Weekday, 9, 0);
        for _ in 0..2 {
            hourly.add_pickup(DayClass::Weekday, 9, 1);
        }
        for _ in 0..3 {
            hourly.add_dropoff(DayClass::Weekday, 9, 1);
            hourly.add_pickup(DayClass::Weekday, 9, 2);
        }

        let ranking = PopularityRanking::build(&hourly);

        assert_eq!(ranking.order(DayClass::Weekday, 9), &[2, 0, 1]);
        assert_eq!(ranking.rank(DayClass::Weekday, 9, 2), 1);
        assert_eq!(ranking.rank(DayClass::Weekday, 9, 1), 3);
        // Ties keep zone order
        assert_eq!(ranking.order(DayClass::Weekend, 9), &[0, 1, 2]);
    }

    #[test]
    fn test_rank_is_a_bijection() {
        let mut hourly = DemandTable::new(PERIODS_PER_DAY, 5);
        for zone in 0..5 {
            for _ in 0..(zone * 7 % 5) {
                hourly.add_pickup(DayClass::Weekend, 20, zone);
            }
        }
        let ranking = PopularityRanking::build(&hourly);

        let mut ranks: Vec<usize> = (0..5).map(|z| ranking.rank(DayClass::Weekend, 20, z)).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }
}
