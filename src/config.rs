//! Demand model configuration.

use std::path::PathBuf;

use chrono_tz::Tz;
use serde::Deserialize;

use crate::clustering::DEFAULT_MAX_ITERATIONS;
use crate::error::ConfigError;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Options for training a [`DemandModel`](crate::demand::DemandModel).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelConfig {
    /// Number of zones (k-means clusters).
    pub zone_count: usize,
    /// Length of a time slot in minutes. Must divide 1440.
    pub time_slot_minutes: u32,
    /// Number of consecutive time slots summed by cluster weight lookups.
    pub lookahead_slots: usize,
    /// CSV file of historical trips.
    pub training_dataset: PathBuf,
    /// Timezone in which trip timestamps are interpreted.
    pub timezone: Tz,
    /// Number of random distinct days whose pickups feed the clustering.
    #[serde(default = "default_sample_days")]
    pub sample_days: usize,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Seed for day sampling and centroid initialization.
    #[serde(default)]
    pub seed: u64,
}

fn default_sample_days() -> usize {
    7
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

impl ModelConfig {
    pub fn new(
        zone_count: usize,
        time_slot_minutes: u32,
        lookahead_slots: usize,
        training_dataset: impl Into<PathBuf>,
        timezone: Tz,
    ) -> Self {
        Self {
            zone_count,
            time_slot_minutes,
            lookahead_slots,
            training_dataset: training_dataset.into(),
            timezone,
            sample_days: default_sample_days(),
            max_iterations: default_max_iterations(),
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_sample_days(mut self, sample_days: usize) -> Self {
        self.sample_days = sample_days;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.zone_count == 0 {
            return Err(ConfigError::InvalidZoneCount);
        }
        let slot = self.time_slot_minutes;
        if slot == 0 || slot > MINUTES_PER_DAY || MINUTES_PER_DAY % slot != 0 {
            return Err(ConfigError::InvalidSlotLength(slot));
        }
        if self.lookahead_slots == 0 {
            return Err(ConfigError::InvalidLookahead);
        }
        if self.training_dataset.as_os_str().is_empty() {
            return Err(ConfigError::MissingDataset);
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::InvalidIterationCap);
        }
        if self.sample_days == 0 {
            return Err(ConfigError::InvalidSampleDays);
        }
        Ok(())
    }
}
