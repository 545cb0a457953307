//! Locality of the curve: how far apart consecutive keys land in space.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::ops::RangeInclusive;

use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::Serialize;

use crate::codec::MortonCodec;
use crate::errors::{Result, ZorderError};
use crate::types::{Coords, DistanceSample, Key};

/// Measures step distances between the points of consecutive keys.
#[derive(Debug, Clone, Copy)]
pub struct LocalityAnalyzer<'a, const D: usize> {
    codec: &'a MortonCodec<D>,
}

/// Lazy `(z, d(z))` sequence for z in (z_min, z_max].
///
/// Cheap to clone; a clone replays the remaining samples on its own.
#[derive(Debug, Clone)]
pub struct DistanceSamples<'a, const D: usize> {
    codec: &'a MortonCodec<D>,
    next: Key,
    remaining: u64,
    prev: Coords<D>,
}

impl<const D: usize> Iterator for DistanceSamples<'_, D> {
    type Item = DistanceSample;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let key = self.next;
        let point = self.codec.encode_unchecked(key);
        let distance = euclidean(&self.prev, &point);

        self.prev = point;
        self.next = key.wrapping_add(1);
        self.remaining -= 1;
        Some(DistanceSample { key, distance })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (n, usize::try_from(self.remaining).ok())
    }
}

impl<const D: usize> ExactSizeIterator for DistanceSamples<'_, D> {}

/// Euclidean distance between two points.
pub fn euclidean<const D: usize>(a: &Coords<D>, b: &Coords<D>) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&p, &q)| {
            let d = p.abs_diff(q) as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Closed-form step distance for a two-axis curve.
///
/// `key - 1` ends in `t = trailing_zeros(key)` one bits that all clear on the
/// step. With `m = ceil(t / 2)` one axis moves by 1 and the other by `2^m - 1`.
pub fn expected_step_distance(key: Key) -> f64 {
    let m = (key.trailing_zeros() + 1) / 2;
    let far = ((1u64 << m) - 1) as f64;
    (1.0 + far * far).sqrt()
}

impl<'a, const D: usize> LocalityAnalyzer<'a, D> {
    /// Analyzer over a shared codec.
    pub fn new(codec: &'a MortonCodec<D>) -> Self {
        Self { codec }
    }

    /// Step distances for every key in (z_min, z_max].
    ///
    /// An empty or single-key range yields nothing. `z_max` beyond the key
    /// width is a domain error.
    pub fn analyze(&self, range: RangeInclusive<Key>) -> Result<DistanceSamples<'a, D>> {
        let (lo, hi) = range.into_inner();
        let remaining = if hi > lo {
            self.codec.check_key(hi)?;
            hi - lo
        } else {
            0
        };
        Ok(DistanceSamples {
            codec: self.codec,
            next: lo.wrapping_add(1),
            remaining,
            prev: if remaining > 0 {
                self.codec.encode_unchecked(lo)
            } else {
                [0; D]
            },
        })
    }

    /// Sorted distances over the range, computed in parallel.
    pub fn stats(&self, range: RangeInclusive<Key>) -> Result<DistanceStats> {
        let (lo, hi) = range.into_inner();
        if hi <= lo {
            return Ok(DistanceStats::default());
        }
        self.codec.check_key(hi)?;

        let codec = self.codec;
        let distances: Vec<f64> = (lo + 1..=hi)
            .into_par_iter()
            .map(|z| euclidean(&codec.encode_unchecked(z - 1), &codec.encode_unchecked(z)))
            .collect();
        Ok(DistanceStats::from_distances(distances))
    }

    /// The `n` largest steps, by distance descending then key ascending.
    pub fn top_spikes(&self, range: RangeInclusive<Key>, n: usize) -> Result<Vec<DistanceSample>> {
        let samples = self.analyze(range)?;
        if n == 0 {
            return Ok(Vec::new());
        }

        // Min-heap of the current top n; among equal distances the larger key
        // is evicted first.
        let mut heap = BinaryHeap::new();
        for s in samples {
            heap.push(Reverse((OrderedFloat(s.distance), Reverse(s.key))));
            if heap.len() > n {
                heap.pop();
            }
        }

        let mut top: Vec<DistanceSample> = heap
            .into_iter()
            .map(|Reverse((d, Reverse(key)))| DistanceSample {
                key,
                distance: d.into_inner(),
            })
            .collect();
        top.sort_by(|a, b| {
            b.distance
                .total_cmp(&a.distance)
                .then_with(|| a.key.cmp(&b.key))
        });
        Ok(top)
    }

    /// Count, mean, extremes, requested percentiles and top spikes in one report.
    pub fn summarize(
        &self,
        range: RangeInclusive<Key>,
        percentiles: &[f64],
        top_n: usize,
    ) -> Result<LocalitySummary> {
        let (lo, hi) = (*range.start(), *range.end());
        tracing::info!("Analyzing locality over keys {}..={}", lo, hi);

        let stats = self.stats(range.clone())?;
        let percentiles = percentiles
            .iter()
            .map(|&p| Ok((p, stats.percentile(p)?)))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .filter_map(|(p, v)| v.map(|v| (p, v)))
            .collect();

        Ok(LocalitySummary {
            start: lo,
            end: hi,
            samples: stats.len(),
            mean: stats.mean(),
            min: stats.min(),
            max: stats.max(),
            percentiles,
            spikes: self.top_spikes(range, top_n)?,
        })
    }
}

/// Sorted step distances with order-statistic reducers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceStats {
    sorted: Vec<f64>,
    sum: f64,
}

impl DistanceStats {
    /// Sort and keep the given distances.
    pub fn from_distances(mut distances: Vec<f64>) -> Self {
        distances.sort_by(f64::total_cmp);
        let sum = distances.iter().sum();
        Self {
            sorted: distances,
            sum,
        }
    }

    /// Collect the distances out of a sample sequence.
    pub fn from_samples(samples: impl IntoIterator<Item = DistanceSample>) -> Self {
        Self::from_distances(samples.into_iter().map(|s| s.distance).collect())
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// True when no samples were collected.
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Arithmetic mean.
    pub fn mean(&self) -> Option<f64> {
        if self.sorted.is_empty() {
            None
        } else {
            Some(self.sum / self.sorted.len() as f64)
        }
    }

    /// Smallest distance.
    pub fn min(&self) -> Option<f64> {
        self.sorted.first().copied()
    }

    /// Largest distance.
    pub fn max(&self) -> Option<f64> {
        self.sorted.last().copied()
    }

    /// Nearest-rank percentile, `p` in [0, 100]. `p = 0` is the minimum.
    pub fn percentile(&self, p: f64) -> Result<Option<f64>> {
        if !(0.0..=100.0).contains(&p) {
            return Err(ZorderError::InvalidPercentile(p));
        }
        if self.sorted.is_empty() {
            return Ok(None);
        }
        let n = self.sorted.len();
        let rank = ((p / 100.0) * n as f64).ceil() as usize;
        Ok(Some(self.sorted[rank.clamp(1, n) - 1]))
    }

    /// Distances in ascending order.
    pub fn as_slice(&self) -> &[f64] {
        &self.sorted
    }
}

/// Serializable locality report for a key range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalitySummary {
    /// First key of the range.
    pub start: Key,
    /// Last key of the range.
    pub end: Key,
    /// Number of steps measured.
    pub samples: usize,
    /// Mean step distance.
    pub mean: Option<f64>,
    /// Shortest step.
    pub min: Option<f64>,
    /// Longest step.
    pub max: Option<f64>,
    /// `(p, value)` for each requested percentile.
    pub percentiles: Vec<(f64, f64)>,
    /// Largest steps, distance descending.
    pub spikes: Vec<DistanceSample>,
}
