//! Cruising agent and the shared model it reads.

use std::collections::VecDeque;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::demand::DemandModel;
use crate::error::TrainingError;
use crate::policy::DestinationPolicy;
use crate::traits::{IntersectionId, LocationOnRoad, RoadNetwork, TravelTimeProvider};

/// Process-wide demand model, trained by the first caller only.
///
/// Concurrent first callers wait for the same training run. A failed run
/// leaves the cell empty so a later call can try again.
#[derive(Debug, Default)]
pub struct SharedDemandModel {
    cell: OnceCell<Arc<DemandModel>>,
}

impl SharedDemandModel {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub fn get(&self) -> Option<Arc<DemandModel>> {
        self.cell.get().cloned()
    }

    pub fn get_or_train<F>(&self, train: F) -> Result<Arc<DemandModel>, TrainingError>
    where
        F: FnOnce() -> Result<DemandModel, TrainingError>,
    {
        self.cell.get_or_try_init(|| train().map(Arc::new)).cloned()
    }
}

/// An idle agent that cruises toward zones with high expected demand.
///
/// Randomness is seeded from the agent id, so an agent replays the same
/// choices for the same inputs.
#[derive(Debug, Clone)]
pub struct SearchAgent {
    id: u64,
    model: Arc<DemandModel>,
    policy: DestinationPolicy,
    rng: ChaCha8Rng,
    route: VecDeque<IntersectionId>,
}

impl SearchAgent {
    pub fn new(id: u64, model: Arc<DemandModel>) -> Self {
        Self {
            id,
            model,
            policy: DestinationPolicy::default(),
            rng: ChaCha8Rng::seed_from_u64(id),
            route: VecDeque::new(),
        }
    }

    pub fn with_policy(mut self, policy: DestinationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn model(&self) -> &DemandModel {
        &self.model
    }

    /// Intersections still to visit.
    pub fn route(&self) -> &VecDeque<IntersectionId> {
        &self.route
    }

    /// Replace the current route with a freshly planned one.
    pub fn plan_search_route<N, T>(
        &mut self,
        network: &N,
        travel: &T,
        location: &LocationOnRoad,
        time: i64,
    ) where
        N: RoadNetwork + ?Sized,
        T: TravelTimeProvider + ?Sized,
    {
        let plan = self
            .policy
            .plan(&self.model, network, travel, location, time, &mut self.rng);
        self.route = plan.route.into();
    }

    /// Next intersection to drive to, replanning when the route is exhausted.
    pub fn next_intersection<N, T>(
        &mut self,
        network: &N,
        travel: &T,
        location: &LocationOnRoad,
        time: i64,
    ) -> Option<IntersectionId>
    where
        N: RoadNetwork + ?Sized,
        T: TravelTimeProvider + ?Sized,
    {
        if self.route.is_empty() {
            self.plan_search_route(network, travel, location, time);
        }
        self.route.pop_front()
    }

    /// The agent picked up a resource; the cruising route no longer applies.
    pub fn assigned_to(
        &mut self,
        location: &LocationOnRoad,
        time: i64,
        resource_id: u64,
        pickup: &LocationOnRoad,
        dropoff: &LocationOnRoad,
    ) {
        self.route.clear();
        info!(
            agent = self.id,
            resource = resource_id,
            road = location.road.id,
            time,
            pickup_road = pickup.road.id,
            dropoff_road = dropoff.road.id,
            "agent assigned to resource"
        );
    }
}
