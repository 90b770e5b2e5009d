//! Streaming distribution summaries.
//!
//! A [`DistributionSummary`] keeps count, sum, min and max over a stream of
//! samples. Two summaries merge as if every sample of one had been fed to
//! the other, so rollups give the same answer in any order.

use crate::utils::error::TraceError;
use std::fmt;
use std::str::FromStr;

/// A statistic that can be read off a [`DistributionSummary`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Statistic {
    Sum,
    Average,
    Min,
    Max,
    Count,
}

impl Statistic {
    /// Every statistic, in reporting order
    pub const ALL: [Statistic; 5] = [
        Statistic::Sum,
        Statistic::Average,
        Statistic::Min,
        Statistic::Max,
        Statistic::Count,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Sum => "Sum",
            Statistic::Average => "Average",
            Statistic::Min => "Min",
            Statistic::Max => "Max",
            Statistic::Count => "Count",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Statistic {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Statistic::ALL
            .iter()
            .copied()
            .find(|stat| stat.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TraceError::UnknownStatistic(s.to_string()))
    }
}

/// Online accumulator over a stream of `f64` samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistributionSummary {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
}

impl Default for DistributionSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl DistributionSummary {
    /// Empty summary: min starts at +inf and max at -inf
    pub fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Build a summary from a batch of samples
    pub fn from_samples(samples: impl IntoIterator<Item = f64>) -> Self {
        let mut summary = Self::new();
        for sample in samples {
            summary.add_sample(sample);
        }
        summary
    }

    pub fn add_sample(&mut self, sample: f64) {
        self.count += 1;
        self.sum += sample;
        self.min = self.min.min(sample);
        self.max = self.max.max(sample);
    }

    /// Fold `other` into `self` as if its samples had been added here
    pub fn merge(&mut self, other: &DistributionSummary) {
        self.count += other.count;
        self.sum += other.sum;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// `sum / count`, NaN when empty
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.sum / self.count as f64
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// True when every sample seen had the same value
    pub fn is_single_valued(&self) -> bool {
        self.count > 0 && self.min == self.max
    }

    pub fn statistic(&self, statistic: Statistic) -> f64 {
        match statistic {
            Statistic::Sum => self.sum,
            Statistic::Average => self.average(),
            Statistic::Min => self.min,
            Statistic::Max => self.max,
            Statistic::Count => self.count as f64,
        }
    }

    /// All statistics paired with their values, in reporting order
    pub fn statistics(&self) -> [(Statistic, f64); 5] {
        Statistic::ALL.map(|stat| (stat, self.statistic(stat)))
    }
}
