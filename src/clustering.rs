//! K-means clustering of pickup points into zones.
//!
//! Centroids are seeded from distinct sample points and refined by
//! iterative relocation. Refinement stops at the iteration cap, when a
//! centroid loses all its points, or when any centroid of the previous
//! round reappears with exactly the same coordinates in the new round.
//! The exact-value check can stop refinement while other centroids are
//! still drifting.

use rand::Rng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use tracing::debug;

use crate::geometry::{Point, centroid};

/// Default iteration cap.
pub const DEFAULT_MAX_ITERATIONS: usize = 500;

#[derive(Debug, Clone)]
pub struct KMeans {
    /// Target number of clusters.
    pub k: usize,
    pub max_iterations: usize,
}

/// Output of a clustering run. `clusters[i]` holds the points of `centroids[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    pub clusters: Vec<Vec<Point>>,
    pub centroids: Vec<Point>,
    pub iterations: usize,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn cluster<R: Rng + ?Sized>(&self, points: &[Point], rng: &mut R) -> Clustering {
        let seeds = self.k.min(points.len());
        let mut centroids: Vec<Point> = points.choose_multiple(rng, seeds).copied().collect();
        let mut clusters = Vec::new();
        let mut iterations = 0;

        if centroids.is_empty() {
            return Clustering {
                clusters,
                centroids,
                iterations,
            };
        }

        loop {
            iterations += 1;
            let (next_clusters, next_centroids) = relocate(points, &centroids);

            let vanished = next_centroids.len() < self.k;
            let repeated = centroids.iter().any(|prev| next_centroids.contains(prev));
            let capped = iterations >= self.max_iterations;

            centroids = next_centroids;
            clusters = next_clusters;

            if vanished || repeated || capped {
                debug!(iterations, vanished, repeated, capped, "k-means stopped");
                break;
            }
        }

        Clustering {
            clusters,
            centroids,
            iterations,
        }
    }
}

/// Index of the centroid nearest to `point`; ties go to the lowest index.
///
/// `centroids` must not be empty.
pub fn nearest_centroid(point: &Point, centroids: &[Point]) -> usize {
    let mut best = 0;
    let mut best_distance = point.distance(&centroids[0]);
    for (i, c) in centroids.iter().enumerate().skip(1) {
        let distance = point.distance(c);
        if distance < best_distance {
            best = i;
            best_distance = distance;
        }
    }
    best
}

/// One assignment round. Clusters left without points are dropped along
/// with their centroid.
fn relocate(points: &[Point], centroids: &[Point]) -> (Vec<Vec<Point>>, Vec<Point>) {
    let assignment: Vec<usize> = points
        .par_iter()
        .map(|p| nearest_centroid(p, centroids))
        .collect();

    let mut groups: Vec<Vec<Point>> = vec![Vec::new(); centroids.len()];
    for (point, cluster) in points.iter().zip(assignment) {
        groups[cluster].push(*point);
    }

    groups
        .into_iter()
        .filter_map(|group| centroid(&group).map(|c| (group, c)))
        .unzip()
}
