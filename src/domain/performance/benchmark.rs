//! Statistical benchmarks for comparing one value against a reference population.

use crate::domain::errors::BenchmarkError;
use crate::domain::stats::{mean, sample_std_dev, z_score};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Fewer points than this give an unreliable benchmark
pub const MIN_BENCHMARK_SAMPLES: usize = 10;

/// Attribute filter such as `{"department": "eng", "level": "3"}`
pub type Segment = BTreeMap<String, String>;

/// One subject's metric value with the attributes it can be segmented by
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    #[serde(default)]
    pub subject_id: String,
    pub value: f64,
    #[serde(default)]
    pub attributes: Segment,
}

impl MetricRecord {
    fn in_segment(&self, segment: &Segment) -> bool {
        segment
            .iter()
            .all(|(key, value)| self.attributes.get(key) == Some(value))
    }
}

/// Coarse performance band relative to the benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PerformanceLevel {
    Exceptional,
    Above,
    At,
    Below,
}

impl PerformanceLevel {
    pub fn from_percentile(percentile: f64) -> Self {
        if percentile >= 90.0 {
            PerformanceLevel::Exceptional
        } else if percentile >= 75.0 {
            PerformanceLevel::Above
        } else if percentile >= 25.0 {
            PerformanceLevel::At
        } else {
            PerformanceLevel::Below
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelativePosition {
    #[serde(rename = "TOP_10")]
    Top10,
    #[serde(rename = "TOP_25")]
    Top25,
    #[serde(rename = "MIDDLE_50")]
    Middle50,
    #[serde(rename = "BOTTOM_25")]
    Bottom25,
    #[serde(rename = "BOTTOM_10")]
    Bottom10,
}

impl RelativePosition {
    pub fn from_percentile(percentile: f64) -> Self {
        if percentile >= 90.0 {
            RelativePosition::Top10
        } else if percentile >= 75.0 {
            RelativePosition::Top25
        } else if percentile >= 25.0 {
            RelativePosition::Middle50
        } else if percentile >= 10.0 {
            RelativePosition::Bottom25
        } else {
            RelativePosition::Bottom10
        }
    }
}

/// Summary statistics of a reference population for one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    pub metric_name: String,
    /// Empty for a benchmark over the whole population
    #[serde(default)]
    pub segment: Segment,
    pub sample_size: usize,
    pub percentile_25: f64,
    pub percentile_50: f64,
    pub percentile_75: f64,
    pub percentile_90: f64,
    pub mean: f64,
    pub standard_deviation: f64,
    pub min_value: f64,
    pub max_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    pub user_value: f64,
    /// Benchmark median
    pub benchmark_value: f64,
    pub percentile_rank: f64,
    pub deviation_from_mean: f64,
    pub z_score: f64,
    pub performance_level: PerformanceLevel,
    pub relative_position: RelativePosition,
    pub strengths: Vec<String>,
    pub improvement_areas: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Condensed comparison row for one subject of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchComparison {
    pub subject_id: String,
    pub user_value: f64,
    pub percentile_rank: f64,
    pub z_score: f64,
    pub performance_level: PerformanceLevel,
    pub relative_position: RelativePosition,
}

impl Benchmark {
    /// Build a benchmark from raw metric values.
    ///
    /// # Errors
    /// * `BenchmarkError::NonFiniteValue` - a value is NaN or infinite
    /// * `BenchmarkError::InsufficientData` - fewer than [`MIN_BENCHMARK_SAMPLES`] values
    pub fn from_values(metric_name: &str, values: &[f64]) -> Result<Self, BenchmarkError> {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(BenchmarkError::NonFiniteValue {
                metric: metric_name.to_string(),
            });
        }
        if values.len() < MIN_BENCHMARK_SAMPLES {
            return Err(BenchmarkError::InsufficientData {
                metric: metric_name.to_string(),
                count: values.len(),
                required: MIN_BENCHMARK_SAMPLES,
            });
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Ok(Self {
            metric_name: metric_name.to_string(),
            segment: Segment::new(),
            sample_size: sorted.len(),
            percentile_25: interpolated_percentile(&sorted, 25.0),
            percentile_50: interpolated_percentile(&sorted, 50.0),
            percentile_75: interpolated_percentile(&sorted, 75.0),
            percentile_90: interpolated_percentile(&sorted, 90.0),
            mean: mean(&sorted),
            standard_deviation: sample_std_dev(&sorted),
            min_value: sorted[0],
            max_value: sorted[sorted.len() - 1],
        })
    }

    /// Build a benchmark from the records matching every entry of `segment`.
    ///
    /// Non-finite values are dropped before the sample-size check.
    ///
    /// # Errors
    /// * `BenchmarkError::EmptySegment` - no record matches `segment`
    /// * `BenchmarkError::InsufficientData` - fewer than [`MIN_BENCHMARK_SAMPLES`] usable values
    pub fn from_records(
        metric_name: &str,
        records: &[MetricRecord],
        segment: &Segment,
    ) -> Result<Self, BenchmarkError> {
        let matching: Vec<&MetricRecord> = records.iter().filter(|r| r.in_segment(segment)).collect();
        if matching.is_empty() {
            return Err(BenchmarkError::EmptySegment {
                metric: metric_name.to_string(),
            });
        }
        let values: Vec<f64> = matching
            .iter()
            .map(|r| r.value)
            .filter(|v| v.is_finite())
            .collect();

        let mut benchmark = Self::from_values(metric_name, &values)?;
        benchmark.segment = segment.clone();
        Ok(benchmark)
    }

    /// Lookup key: the metric name, followed by `_key:value` pairs when segmented.
    pub fn key(&self) -> String {
        benchmark_key(&self.metric_name, &self.segment)
    }

    /// Compare a single value against this benchmark.
    pub fn compare(&self, value: f64) -> BenchmarkComparison {
        let percentile_rank = self.percentile_rank(value);
        let performance_level = PerformanceLevel::from_percentile(percentile_rank);
        let (strengths, improvement_areas) = self.insights(value, percentile_rank);
        BenchmarkComparison {
            user_value: value,
            benchmark_value: self.percentile_50,
            percentile_rank,
            deviation_from_mean: value - self.mean,
            z_score: z_score(value, self.mean, self.standard_deviation),
            performance_level,
            relative_position: RelativePosition::from_percentile(percentile_rank),
            strengths,
            improvement_areas,
            recommendations: recommendations(performance_level),
        }
    }

    fn insights(&self, value: f64, percentile_rank: f64) -> (Vec<String>, Vec<String>) {
        let mut strengths = Vec::new();
        if percentile_rank >= 90.0 {
            strengths.push(format!("Performing in top 10% for {}", self.metric_name));
        }
        if percentile_rank >= 75.0 {
            strengths.push(format!(
                "Above average performance ({:.0}th percentile)",
                percentile_rank
            ));
        }
        if value >= self.percentile_75 {
            strengths.push(format!(
                "Exceeds 75th percentile by {:.1} points",
                value - self.percentile_75
            ));
        }

        let mut improvements = Vec::new();
        if percentile_rank < 25.0 {
            improvements.push(
                "Performance below 25th percentile - significant improvement opportunity"
                    .to_string(),
            );
        }
        if percentile_rank < 50.0 {
            improvements.push(format!(
                "Gap of {:.1} points to reach median performance",
                self.percentile_50 - value
            ));
        }
        if value < self.mean {
            improvements.push(format!("{:.1} points below average", self.mean - value));
        }

        (strengths, improvements)
    }

    /// Piecewise-linear percentile rank between the stored anchors.
    pub fn percentile_rank(&self, value: f64) -> f64 {
        if value <= self.min_value {
            return 0.0;
        }
        if value >= self.max_value {
            return 100.0;
        }
        let anchors = [
            (self.min_value, 0.0),
            (self.percentile_25, 25.0),
            (self.percentile_50, 50.0),
            (self.percentile_75, 75.0),
            (self.percentile_90, 90.0),
            (self.max_value, 100.0),
        ];
        for pair in anchors.windows(2) {
            let (lo_value, lo_rank) = pair[0];
            let (hi_value, hi_rank) = pair[1];
            if value <= hi_value {
                let span = hi_value - lo_value;
                if span <= 0.0 {
                    return lo_rank;
                }
                return lo_rank + (hi_rank - lo_rank) * (value - lo_value) / span;
            }
        }
        100.0
    }
}

fn recommendations(level: PerformanceLevel) -> Vec<String> {
    let advice: &[&str] = match level {
        PerformanceLevel::Exceptional => &[
            "Continue current practices",
            "Consider mentoring others",
            "Document success patterns for team learning",
        ],
        PerformanceLevel::Above => &[
            "Maintain strong performance",
            "Look for opportunities to push to top 10%",
        ],
        PerformanceLevel::At => &[
            "Identify specific areas for targeted improvement",
            "Seek feedback from high performers",
            "Set goals to move into top 25%",
        ],
        PerformanceLevel::Below => &[
            "Schedule 1-on-1 to discuss performance and barriers",
            "Create focused improvement plan",
            "Consider additional training or mentoring",
            "Identify and remove blockers",
        ],
    };
    advice.iter().map(|a| a.to_string()).collect()
}

pub fn benchmark_key(metric_name: &str, segment: &Segment) -> String {
    if segment.is_empty() {
        return metric_name.to_string();
    }
    let pairs: Vec<String> = segment.iter().map(|(k, v)| format!("{}:{}", k, v)).collect();
    format!("{}_{}", metric_name, pairs.join("_"))
}

/// Benchmarks keyed by metric and segment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSet {
    benchmarks: BTreeMap<String, Benchmark>,
}

impl BenchmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Population-wide benchmark plus one per distinct value of `column`.
    ///
    /// Segments without enough data are skipped with a warning.
    pub fn segmented(metric_name: &str, records: &[MetricRecord], column: &str) -> Self {
        let mut set = Self::new();
        let mut segments = vec![Segment::new()];
        let values: BTreeSet<&String> = records
            .iter()
            .filter_map(|r| r.attributes.get(column))
            .collect();
        segments.extend(
            values
                .into_iter()
                .map(|value| Segment::from([(column.to_string(), value.clone())])),
        );

        for segment in segments {
            match Benchmark::from_records(metric_name, records, &segment) {
                Ok(benchmark) => set.insert(benchmark),
                Err(e) => warn!("Skipping benchmark {}: {}", benchmark_key(metric_name, &segment), e),
            }
        }
        set
    }

    /// Store a benchmark, replacing any with the same key.
    pub fn insert(&mut self, benchmark: Benchmark) {
        self.benchmarks.insert(benchmark.key(), benchmark);
    }

    pub fn get(&self, metric_name: &str, segment: &Segment) -> Option<&Benchmark> {
        self.benchmarks.get(&benchmark_key(metric_name, segment))
    }

    pub fn len(&self) -> usize {
        self.benchmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.benchmarks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Benchmark> {
        self.benchmarks.values()
    }

    /// # Errors
    /// * `BenchmarkError::NotFound` - no benchmark stored for the metric and segment
    pub fn compare(
        &self,
        value: f64,
        metric_name: &str,
        segment: &Segment,
    ) -> Result<BenchmarkComparison, BenchmarkError> {
        self.get(metric_name, segment)
            .map(|benchmark| benchmark.compare(value))
            .ok_or_else(|| BenchmarkError::NotFound {
                key: benchmark_key(metric_name, segment),
            })
    }

    /// Compare every record against the benchmark of its segment.
    ///
    /// With `segment_by`, a record is matched against the benchmark for its
    /// value of that attribute; records lacking the attribute use the
    /// population benchmark. Records without a stored benchmark are left out.
    pub fn batch_compare(
        &self,
        records: &[MetricRecord],
        metric_name: &str,
        segment_by: Option<&str>,
    ) -> Vec<BatchComparison> {
        records
            .iter()
            .filter_map(|record| {
                let segment: Segment = segment_by
                    .and_then(|column| {
                        record
                            .attributes
                            .get(column)
                            .map(|value| (column.to_string(), value.clone()))
                    })
                    .into_iter()
                    .collect();
                match self.compare(record.value, metric_name, &segment) {
                    Ok(comparison) => Some(BatchComparison {
                        subject_id: record.subject_id.clone(),
                        user_value: comparison.user_value,
                        percentile_rank: comparison.percentile_rank,
                        z_score: comparison.z_score,
                        performance_level: comparison.performance_level,
                        relative_position: comparison.relative_position,
                    }),
                    Err(e) => {
                        debug!("Skipping {}: {}", record.subject_id, e);
                        None
                    }
                }
            })
            .collect()
    }
}

/// Percentile with linear interpolation between closest ranks; `sorted` must be ascending.
fn interpolated_percentile(sorted: &[f64], percentile: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = percentile / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_to_eleven() -> Vec<f64> {
        (1..=11).map(|v| v as f64 * 10.0).collect()
    }

    #[test]
    fn test_insufficient_data() {
        let err = Benchmark::from_values("goal_score", &[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            BenchmarkError::InsufficientData {
                metric: "goal_score".to_string(),
                count: 3,
                required: MIN_BENCHMARK_SAMPLES,
            }
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut values = one_to_eleven();
        values[3] = f64::NAN;
        assert!(matches!(
            Benchmark::from_values("x", &values),
            Err(BenchmarkError::NonFiniteValue { .. })
        ));
    }

    #[test]
    fn test_percentiles_interpolate() {
        let benchmark = Benchmark::from_values("score", &one_to_eleven()).unwrap();
        assert_eq!(benchmark.sample_size, 11);
        assert!((benchmark.percentile_25 - 35.0).abs() < 1e-9);
        assert!((benchmark.percentile_50 - 60.0).abs() < 1e-9);
        assert!((benchmark.percentile_90 - 100.0).abs() < 1e-9);
        assert_eq!(benchmark.min_value, 10.0);
        assert_eq!(benchmark.max_value, 110.0);
    }

    #[test]
    fn test_compare_levels() {
        let benchmark = Benchmark::from_values("score", &one_to_eleven()).unwrap();

        let median = benchmark.compare(60.0);
        assert!((median.percentile_rank - 50.0).abs() < 1e-9);
        assert_eq!(median.performance_level, PerformanceLevel::At);
        assert_eq!(median.relative_position, RelativePosition::Middle50);
        assert!(median.z_score.abs() < 1e-9);

        let top = benchmark.compare(120.0);
        assert_eq!(top.percentile_rank, 100.0);
        assert_eq!(top.performance_level, PerformanceLevel::Exceptional);

        let bottom = benchmark.compare(5.0);
        assert_eq!(bottom.percentile_rank, 0.0);
        assert_eq!(bottom.relative_position, RelativePosition::Bottom10);
    }

    fn record(id: &str, value: f64, department: Option<&str>) -> MetricRecord {
        MetricRecord {
            subject_id: id.to_string(),
            value,
            attributes: department
                .map(|d| Segment::from([("department".to_string(), d.to_string())]))
                .unwrap_or_default(),
        }
    }

    /// Eleven engineers at 10..110 and ten sales people at 1..10
    fn two_departments() -> Vec<MetricRecord> {
        let mut records: Vec<MetricRecord> = one_to_eleven()
            .into_iter()
            .enumerate()
            .map(|(i, v)| record(&format!("eng{}", i), v, Some("eng")))
            .collect();
        records.extend((1..=10).map(|i| record(&format!("sales{}", i), i as f64, Some("sales"))));
        records
    }

    #[test]
    fn test_insights_for_top_and_bottom() {
        let benchmark = Benchmark::from_values("score", &one_to_eleven()).unwrap();

        let top = benchmark.compare(105.0);
        assert_eq!(top.strengths.len(), 3);
        assert_eq!(top.strengths[0], "Performing in top 10% for score");
        assert!(top.improvement_areas.is_empty());
        assert_eq!(top.recommendations[0], "Continue current practices");

        let bottom = benchmark.compare(20.0);
        assert!(bottom.strengths.is_empty());
        assert_eq!(bottom.improvement_areas.len(), 3);
        assert_eq!(
            bottom.improvement_areas[1],
            "Gap of 40.0 points to reach median performance"
        );
        assert_eq!(bottom.improvement_areas[2], "40.0 points below average");
        assert_eq!(bottom.recommendations.len(), 4);
    }

    #[test]
    fn test_segment_filters_records() {
        let records = two_departments();
        let eng = Segment::from([("department".to_string(), "eng".to_string())]);
        let benchmark = Benchmark::from_records("score", &records, &eng).unwrap();
        assert_eq!(benchmark.sample_size, 11);
        assert_eq!(benchmark.min_value, 10.0);
        assert_eq!(benchmark.key(), "score_department:eng");

        let all = Benchmark::from_records("score", &records, &Segment::new()).unwrap();
        assert_eq!(all.sample_size, 21);
        assert_eq!(all.key(), "score");

        let ops = Segment::from([("department".to_string(), "ops".to_string())]);
        assert!(matches!(
            Benchmark::from_records("score", &records, &ops),
            Err(BenchmarkError::EmptySegment { .. })
        ));
    }

    #[test]
    fn test_segmented_set_skips_thin_segments() {
        let mut records = two_departments();
        records.push(record("ops0", 50.0, Some("ops")));
        let set = BenchmarkSet::segmented("score", &records, "department");
        // population, eng and sales; ops has a single value
        assert_eq!(set.len(), 3);
        let ops = Segment::from([("department".to_string(), "ops".to_string())]);
        assert!(set.get("score", &ops).is_none());
        assert!(matches!(
            set.compare(50.0, "score", &ops),
            Err(BenchmarkError::NotFound { key }) if key == "score_department:ops"
        ));
    }

    #[test]
    fn test_batch_compare_uses_each_subjects_segment() {
        let mut records = two_departments();
        records.push(record("ops0", 50.0, Some("ops")));
        records.push(record("contractor", 60.0, None));
        let set = BenchmarkSet::segmented("score", &records, "department");

        let rows = set.batch_compare(&records, "score", Some("department"));
        // ops0 has no benchmark for its segment
        assert_eq!(rows.len(), records.len() - 1);
        assert!(rows.iter().all(|r| r.subject_id != "ops0"));

        let top_sales = rows.iter().find(|r| r.subject_id == "sales10").unwrap();
        assert_eq!(top_sales.percentile_rank, 100.0);
        assert_eq!(top_sales.relative_position, RelativePosition::Top10);

        let contractor = rows.iter().find(|r| r.subject_id == "contractor").unwrap();
        let population = set.get("score", &Segment::new()).unwrap();
        assert_eq!(contractor.percentile_rank, population.percentile_rank(60.0));
    }

    #[test]
    fn test_repeated_values_rank_at_first_quartile() {
        let mut values = vec![50.0; 9];
        values.push(10.0);
        values.push(90.0);
        let benchmark = Benchmark::from_values("flat", &values).unwrap();
        // p25 == p50 == p75 == 50
        assert_eq!(benchmark.percentile_rank(50.0), 25.0);
    }
}
