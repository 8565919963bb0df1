//! cruise-planner: demand-aware cruising for idle vehicles.
//!
//! Learns zones and time-varying demand from historical trips, then picks
//! where an idle agent should drive next. The road network is supplied by
//! the host through the traits in [`traits`].

pub mod traits;
pub mod geometry;
pub mod calendar;
pub mod clustering;
pub mod zones;
pub mod map_match;
pub mod table;
pub mod trips;
pub mod config;
pub mod error;
pub mod demand;
pub mod policy;
pub mod agent;
pub mod haversine;
pub mod osrm;
