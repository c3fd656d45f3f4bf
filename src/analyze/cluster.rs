// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.
//
// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

//! Seeded k-means row partitioning used by the advanced analysis stage.

use thiserror::Error;

/// Errors that can occur during clustering
#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("No data points to cluster")]
    EmptyInput,

    #[error("Cluster count must be between 1 and {max}, got {requested}")]
    InvalidClusterCount { requested: usize, max: usize },

    #[error("Point {index} has {actual} coordinates, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Point {index} contains a non-finite coordinate")]
    NonFinite { index: usize },
}

/// K-means parameters. The seed makes runs reproducible; two calls with the
/// same data and config produce identical labels and centers.
#[derive(Debug, Clone)]
pub struct KMeansConfig {
    pub k: usize,
    pub max_iter: usize,
    pub tol: f64,
    pub seed: u64,
}

impl KMeansConfig {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 300,
            tol: 1e-4,
            seed: 42,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// A fitted k-means partition.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    pub k: usize,
    /// One center per cluster, in input space.
    pub centroids: Vec<Vec<f64>>,
    /// Cluster index in `[0, k)` for each input point, input order.
    pub labels: Vec<usize>,
    pub iterations: usize,
}

/// Partition `points` into `config.k` clusters with Lloyd iterations and
/// k-means++ seeding.
pub fn kmeans(points: &[Vec<f64>], config: &KMeansConfig) -> Result<KMeansFit, ClusterError> {
    let n = points.len();
    if n == 0 {
        return Err(ClusterError::EmptyInput);
    }
    let k = config.k;
    if k == 0 || k > n {
        return Err(ClusterError::InvalidClusterCount {
            requested: k,
            max: n,
        });
    }

    let dims = points[0].len();
    for (index, point) in points.iter().enumerate() {
        if point.len() != dims {
            return Err(ClusterError::DimensionMismatch {
                index,
                expected: dims,
                actual: point.len(),
            });
        }
        if point.iter().any(|v| !v.is_finite()) {
            return Err(ClusterError::NonFinite { index });
        }
    }

    let mut centroids = seed_centroids(points, k, config.seed);
    let mut labels = vec![0usize; n];
    let mut iterations = 0;

    for iter in 0..config.max_iter {
        iterations = iter + 1;

        for (i, point) in points.iter().enumerate() {
            labels[i] = nearest_centroid(point, &centroids);
        }

        let mut next = vec![vec![0.0; dims]; k];
        let mut counts = vec![0usize; k];
        for (point, &label) in points.iter().zip(&labels) {
            counts[label] += 1;
            for (acc, &v) in next[label].iter_mut().zip(point) {
                *acc += v;
            }
        }
        for (cluster, count) in counts.iter().enumerate() {
            if *count > 0 {
                for v in &mut next[cluster] {
                    *v /= *count as f64;
                }
            } else {
                // An emptied cluster keeps its previous center.
                next[cluster] = centroids[cluster].clone();
            }
        }

        let max_shift = centroids
            .iter()
            .zip(&next)
            .map(|(old, new)| distance_sq(old, new).sqrt())
            .fold(0.0f64, f64::max);
        centroids = next;

        if max_shift < config.tol {
            break;
        }
    }

    // Final assignment against the converged centers.
    for (i, point) in points.iter().enumerate() {
        labels[i] = nearest_centroid(point, &centroids);
    }

    Ok(KMeansFit {
        k,
        centroids,
        labels,
        iterations,
    })
}

fn nearest_centroid(point: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (cluster, centroid) in centroids.iter().enumerate() {
        let dist = distance_sq(point, centroid);
        if dist < best_dist {
            best_dist = dist;
            best = cluster;
        }
    }
    best
}

#[inline]
fn distance_sq(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// K-means++ seeding with a splitmix-style deterministic generator, so the
/// same seed always picks the same starting centers.
fn seed_centroids(points: &[Vec<f64>], k: usize, seed: u64) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut state = seed.wrapping_add(0x9e3779b97f4a7c15);
    let mut next_unit = move || -> f64 {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as f64 / (1u64 << 31) as f64
    };

    let mut centroids: Vec<Vec<f64>> = Vec::with_capacity(k);
    let first = (next_unit() * n as f64) as usize % n;
    centroids.push(points[first].clone());

    let mut min_dists = vec![f64::INFINITY; n];
    while centroids.len() < k {
        let latest = centroids.last().expect("at least one centroid");
        for (dist, point) in min_dists.iter_mut().zip(points) {
            *dist = dist.min(distance_sq(point, latest));
        }

        let total: f64 = min_dists.iter().sum();
        if total <= f64::EPSILON {
            // All remaining points coincide with a chosen center.
            let idx = (next_unit() * n as f64) as usize % n;
            centroids.push(points[idx].clone());
            continue;
        }

        let target = next_unit() * total;
        let mut cumulative = 0.0;
        let mut chosen = n - 1;
        for (i, dist) in min_dists.iter().enumerate() {
            cumulative += dist;
            if cumulative >= target {
                chosen = i;
                break;
            }
        }
        centroids.push(points[chosen].clone());
    }

    centroids
}
