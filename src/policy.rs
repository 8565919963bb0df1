//! Destination policy for an idle agent.
//!
//! Each planning call classifies the current situation (day class, peak
//! condition, popularity rank of the current zone), looks up the outcome in
//! a rule table, picks a zone and resolves it to a concrete intersection.
//! Planning never fails: when a step yields nothing it falls back to a
//! random intersection of the current zone, then to a neighbouring
//! intersection.

use std::ops::RangeInclusive;

use rand::Rng;
use tracing::debug;

use crate::calendar::{DayClass, PeakCondition};
use crate::demand::{DemandModel, TravelWindow};
use crate::traits::{IntersectionId, LocationOnRoad, RoadNetwork, TravelTimeProvider};

/// Total weight under which every zone is treated as equally attractive.
pub const MIN_TOTAL_WEIGHT: f64 = 1e-4;

/// Default number of random redraws before falling back to a nearest candidate.
pub const DEFAULT_MAX_REDRAWS: usize = 32;

/// What a rule tells the agent to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Cruise to a random intersection of the current zone.
    Direct,
    /// Pick among zones whose center is reachable within the window.
    Windowed(TravelWindow),
}

/// One row of the decision table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionRule {
    pub day: DayClass,
    pub condition: PeakCondition,
    pub ranks: RangeInclusive<usize>,
    pub outcome: Outcome,
}

impl DecisionRule {
    fn matches(&self, day: DayClass, condition: PeakCondition, rank: usize) -> bool {
        self.day == day && self.condition == condition && self.ranks.contains(&rank)
    }
}

/// Ordered rules; the first matching row wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionTable {
    rules: Vec<DecisionRule>,
}

impl DecisionTable {
    pub fn new(rules: Vec<DecisionRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[DecisionRule] {
        &self.rules
    }

    /// Outcome for a situation. Situations no row covers are `Direct`.
    pub fn outcome(&self, day: DayClass, condition: PeakCondition, rank: usize) -> Outcome {
        self.rules
            .iter()
            .find(|rule| rule.matches(day, condition, rank))
            .map(|rule| rule.outcome)
            .unwrap_or(Outcome::Direct)
    }
}

impl Default for DecisionTable {
    fn default() -> Self {
        use DayClass::{Weekday, Weekend};
        use Outcome::{Direct, Windowed};
        use PeakCondition::{NonPeak, Peak};

        let w = |min, max| Windowed(TravelWindow::new(min, max));
        let rule = |day, condition, ranks, outcome| DecisionRule {
            day,
            condition,
            ranks,
            outcome,
        };

        Self::new(vec![
            rule(Weekday, Peak, 0..=10, Direct),
            rule(Weekday, Peak, 11..=30, w(0, 600)),
            rule(Weekday, Peak, 31..=60, w(300, 600)),
            rule(Weekday, Peak, 61..=140, w(600, 900)),
            rule(Weekday, Peak, 141..=usize::MAX, w(600, 1200)),
            rule(Weekday, NonPeak, 0..=5, Direct),
            rule(Weekday, NonPeak, 6..=30, w(0, 600)),
            rule(Weekday, NonPeak, 31..=60, w(600, 1200)),
            rule(Weekday, NonPeak, 61..=120, w(1200, 1800)),
            rule(Weekday, NonPeak, 121..=usize::MAX, w(1500, 2100)),
            rule(Weekend, Peak, 0..=10, Direct),
            rule(Weekend, Peak, 11..=30, w(0, 600)),
            rule(Weekend, Peak, 31..=60, w(300, 900)),
            rule(Weekend, Peak, 61..=120, w(600, 1200)),
            rule(Weekend, Peak, 121..=usize::MAX, w(900, 1500)),
            rule(Weekend, NonPeak, 0..=5, Direct),
            rule(Weekend, NonPeak, 6..=60, w(0, 600)),
            rule(Weekend, NonPeak, 61..=120, w(1200, 1800)),
            rule(Weekend, NonPeak, 121..=usize::MAX, w(1500, 2100)),
        ])
    }
}

/// The situation a planning call starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub day: DayClass,
    pub condition: PeakCondition,
    pub zone: usize,
    pub rank: usize,
}

/// How the destination was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Random intersection of the current zone, by rule.
    Direct,
    /// Zone drawn from the reachable set.
    Zone { window: TravelWindow, zone: usize },
    /// The window reached no zone; random intersection of the current zone.
    NothingReachable { window: TravelWindow },
}

/// Result of one planning call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub classification: Classification,
    pub selection: Selection,
    pub destination: Option<IntersectionId>,
    /// Intersections to visit, source excluded.
    pub route: Vec<IntersectionId>,
}

#[derive(Debug, Clone)]
pub struct DestinationPolicy {
    pub rules: DecisionTable,
    /// Random redraws allowed when a draw returns the source intersection.
    pub max_redraws: usize,
}

impl Default for DestinationPolicy {
    fn default() -> Self {
        Self {
            rules: DecisionTable::default(),
            max_redraws: DEFAULT_MAX_REDRAWS,
        }
    }
}

impl DestinationPolicy {
    pub fn classify(&self, model: &DemandModel, location: &LocationOnRoad, time: i64) -> Classification {
        let calendar = model.calendar();
        let zone = model.zone_of_location(location);
        Classification {
            day: calendar.day_class(time),
            condition: calendar.peak_condition(time),
            zone,
            rank: model.popularity_rank(zone, time),
        }
    }

    /// Plan a cruising route from the end of the current road.
    pub fn plan<N, T, R>(
        &self,
        model: &DemandModel,
        network: &N,
        travel: &T,
        location: &LocationOnRoad,
        time: i64,
        rng: &mut R,
    ) -> Plan
    where
        N: RoadNetwork + ?Sized,
        T: TravelTimeProvider + ?Sized,
        R: Rng + ?Sized,
    {
        let source = location.road.to;
        let classification = self.classify(model, location, time);

        let (selection, destination) =
            match self.rules.outcome(classification.day, classification.condition, classification.rank) {
                Outcome::Direct => (
                    Selection::Direct,
                    self.other_intersection(model, network, classification.zone, source, rng),
                ),
                Outcome::Windowed(window) => {
                    let reachable = model.reachable_zones(travel, location, time, window);
                    let weights: Vec<f64> = reachable
                        .iter()
                        .map(|&zone| model.cluster_weight(zone, time))
                        .collect();

                    match sample_weighted(&weights, rng).map(|i| reachable[i]) {
                        Some(zone) => (
                            Selection::Zone { window, zone },
                            self.resolve_in_zone(model, network, zone, time, source, rng),
                        ),
                        None => (
                            Selection::NothingReachable { window },
                            self.other_intersection(model, network, classification.zone, source, rng),
                        ),
                    }
                }
            };

        let mut route = path_without_source(network, source, destination);
        if route.is_empty() {
            let fallback = self.other_intersection(model, network, classification.zone, source, rng);
            route = path_without_source(network, source, fallback);
        }
        if route.is_empty() {
            if let Some(next) = neighbour(network, source) {
                route = vec![next];
            }
        }

        debug!(
            ?classification,
            ?selection,
            ?destination,
            hops = route.len(),
            "planned search route"
        );

        Plan {
            classification,
            selection,
            destination,
            route,
        }
    }

    /// Center intersection of the zone, or another intersection of the zone
    /// when it has no center or the center is the source.
    fn resolve_in_zone<N, R>(
        &self,
        model: &DemandModel,
        network: &N,
        zone: usize,
        time: i64,
        source: IntersectionId,
        rng: &mut R,
    ) -> Option<IntersectionId>
    where
        N: RoadNetwork + ?Sized,
        R: Rng + ?Sized,
    {
        match model.center_intersection(zone, time) {
            Some(center) if center != source => Some(center),
            _ => self.other_intersection(model, network, zone, source, rng),
        }
    }

    /// A random intersection of `zone` other than `source`.
    ///
    /// After `max_redraws` misses, the zone's intersection nearest to the
    /// source is used, then any neighbour of the source.
    fn other_intersection<N, R>(
        &self,
        model: &DemandModel,
        network: &N,
        zone: usize,
        source: IntersectionId,
        rng: &mut R,
    ) -> Option<IntersectionId>
    where
        N: RoadNetwork + ?Sized,
        R: Rng + ?Sized,
    {
        for _ in 0..self.max_redraws {
            match model.random_intersection(zone, rng) {
                Some(id) if id != source => return Some(id),
                Some(_) => continue,
                None => break,
            }
        }

        let zones = model.zones();
        let nearest = zones.zone(zone).and_then(|z| {
            let origin = zones.intersection(source)?.point();
            z.intersections
                .iter()
                .filter(|i| i.id != source)
                .min_by(|a, b| origin.distance(&a.point()).total_cmp(&origin.distance(&b.point())))
                .map(|i| i.id)
        });
        nearest.or_else(|| neighbour(network, source))
    }
}

/// Draw an index with probability proportional to its weight.
///
/// A single uniform draw in `[0, 1)` is compared with the running
/// normalized sum, so zero weights are never chosen. When the total is
/// below [`MIN_TOTAL_WEIGHT`] every index is equally likely. Returns
/// `None` for an empty slice.
pub fn sample_weighted<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    let total: f64 = weights.iter().sum();
    if total < MIN_TOTAL_WEIGHT {
        return Some(rng.gen_range(0..weights.len()));
    }

    let draw: f64 = rng.gen_range(0.0..1.0);
    let mut cumulative = 0.0;
    for (i, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if draw < cumulative / total {
            return Some(i);
        }
    }
    Some(weights.len() - 1)
}

fn path_without_source<N: RoadNetwork + ?Sized>(
    network: &N,
    source: IntersectionId,
    destination: Option<IntersectionId>,
) -> Vec<IntersectionId> {
    let Some(destination) = destination else {
        return Vec::new();
    };
    if destination == source {
        return Vec::new();
    }
    let mut path = network.shortest_travel_time_path(source, destination);
    if path.first() == Some(&source) {
        path.remove(0);
    }
    path
}

fn neighbour<N: RoadNetwork + ?Sized>(network: &N, source: IntersectionId) -> Option<IntersectionId> {
    network
        .roads_from(source)
        .into_iter()
        .map(|road| road.to)
        .find(|&to| to != source)
}
