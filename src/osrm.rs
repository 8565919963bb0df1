//! OSRM HTTP adapter for intersection travel times.
//!
//! Every `travel_time_between` call is a blocking HTTP request, and
//! `DemandModel::reachable_zones` makes one call per zone. Hosts that need
//! planning free of network I/O should precompute times or use an
//! in-memory provider.

use serde::Deserialize;
use tracing::warn;

use crate::traits::{Intersection, TravelTimeProvider};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn route_url(&self, from: &Intersection, to: &Intersection) -> String {
        format!(
            "{}/route/v1/{}/{:.6},{:.6};{:.6},{:.6}?overview=false",
            self.config.base_url,
            self.config.profile,
            from.longitude,
            from.latitude,
            to.longitude,
            to.latitude
        )
    }
}

impl TravelTimeProvider for OsrmClient {
    /// Fastest route duration; failures and missing routes count as unreachable.
    fn travel_time_between(&self, from: &Intersection, to: &Intersection) -> i64 {
        if from.id == to.id {
            return 0;
        }

        let response = self
            .client
            .get(self.route_url(from, to))
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OsrmRouteResponse>());

        match response {
            Ok(body) => body
                .routes
                .unwrap_or_default()
                .first()
                .map(|route| route.duration.round() as i64)
                .unwrap_or(i64::MAX),
            Err(err) => {
                warn!(%err, from = from.id, to = to.id, "OSRM route request failed");
                i64::MAX
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    routes: Option<Vec<OsrmRoute>>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    duration: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_url_is_lon_lat() {
        let client = OsrmClient::new(OsrmConfig::default()).unwrap();
        let a = Intersection::new(1, -73.985, 40.758);
        let b = Intersection::new(2, -73.778, 40.641);
        assert_eq!(
            client.route_url(&a, &b),
            "http://localhost:5000/route/v1/car/-73.985000,40.758000;-73.778000,40.641000?overview=false"
        );
    }

    #[test]
    fn test_parses_route_response() {
        let body = r#"{"code":"Ok","routes":[{"duration":1234.6,"distance":20500.0,"legs":[]}],"waypoints":[]}"#;
        let parsed: OsrmRouteResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.routes.unwrap()[0].duration, 1234.6);
    }

    #[test]
    fn test_same_intersection_skips_request() {
        // Unroutable base URL: a request would fail and return i64::MAX.
        let client = OsrmClient::new(OsrmConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..OsrmConfig::default()
        })
        .unwrap();
        let a = Intersection::new(7, -73.98, 40.75);
        assert_eq!(client.travel_time_between(&a, &a), 0);
    }
}
