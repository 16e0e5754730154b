//! Scoring CLI
//!
//! Reads a JSON request from a file or stdin, runs one calculator and prints
//! the JSON result to stdout. Logs go to stderr.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use perfscore::application::batch::{BatchScorer, Subject};
use perfscore::config::ScoringConfig;
use perfscore::domain::cpis::{CpisInput, compute_cpis_with};
use perfscore::domain::goals::{GoalRiskInput, TaskCompletion, assess_goal_risk, calculate_goal_from_tasks};
use perfscore::domain::performance::{
    BatchComparison, Benchmark, BenchmarkComparison, BenchmarkSet, EngagementMetrics, MetricRecord,
    PerformanceInputs, Segment, TeamInput, calculate_engagement_with,
    calculate_performance_score_with, calculate_team_analytics,
};
use perfscore::domain::reviews::{RatingRecord, calibrate_ratings};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Performance scoring engine", long_about = None)]
struct Cli {
    /// JSON request file (stdin when omitted)
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// TOML scoring config (overrides PERFSCORE_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Compact single-line JSON output
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Composite 8-dimension score for one person
    Cpis,
    /// Individual performance score
    Individual,
    /// Aggregate task completions into a goal score
    Goal,
    /// Goal risk assessment
    Risk,
    /// Team distribution analytics
    Team,
    /// Per-reviewer rating calibration
    Calibrate,
    /// Engagement score from activity counters
    Engagement,
    /// Build a benchmark and compare values against it
    Benchmark,
    /// CPIS over a whole roster plus team analytics
    Roster,
}

#[derive(Deserialize)]
struct GoalRequest {
    goal_id: String,
    tasks: Vec<TaskCompletion>,
    #[serde(default)]
    due_date: Option<DateTime<Utc>>,
    /// Evaluation time; current time when omitted
    #[serde(default)]
    now: Option<DateTime<Utc>>,
}

/// Either raw `values`, or `records` narrowed by `segment`.
/// With `segment_by`, every record is also compared against its own segment.
#[derive(Deserialize)]
struct BenchmarkRequest {
    metric_name: String,
    #[serde(default)]
    values: Vec<f64>,
    #[serde(default)]
    records: Vec<MetricRecord>,
    #[serde(default)]
    segment: Segment,
    #[serde(default)]
    segment_by: Option<String>,
    #[serde(default)]
    compare: Vec<f64>,
}

#[derive(Serialize)]
struct BenchmarkResponse {
    benchmark: Benchmark,
    comparisons: Vec<BenchmarkComparison>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    batch: Vec<BatchComparison>,
}

#[derive(Deserialize)]
struct RosterRequest {
    people: Vec<Subject<CpisInput>>,
    #[serde(default)]
    historical_averages: Vec<f64>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => {
            info!("Loading scoring config from: {}", path.display());
            let mut config = ScoringConfig::from_file(path)?;
            config.apply_overrides(|key| std::env::var(key).ok())?;
            config
        }
        None => ScoringConfig::load()?,
    };
    let raw = read_request(cli.input.as_deref())?;

    let output = match cli.command {
        Commands::Cpis => {
            let input: CpisInput = parse(&raw)?;
            render(&compute_cpis_with(&input, &config.cpis), cli.compact)?
        }
        Commands::Individual => {
            let input: PerformanceInputs = parse(&raw)?;
            render(
                &calculate_performance_score_with(&input, &config.individual),
                cli.compact,
            )?
        }
        Commands::Goal => {
            let request: GoalRequest = parse(&raw)?;
            let now = request.now.unwrap_or_else(Utc::now);
            render(
                &calculate_goal_from_tasks(&request.goal_id, &request.tasks, request.due_date, now),
                cli.compact,
            )?
        }
        Commands::Risk => {
            let input: GoalRiskInput = parse(&raw)?;
            render(&assess_goal_risk(&input), cli.compact)?
        }
        Commands::Team => {
            let input: TeamInput = parse(&raw)?;
            render(&calculate_team_analytics(&input), cli.compact)?
        }
        Commands::Calibrate => {
            let ratings: Vec<RatingRecord> = parse(&raw)?;
            render(&calibrate_ratings(&ratings), cli.compact)?
        }
        Commands::Engagement => {
            let metrics: EngagementMetrics = parse(&raw)?;
            render(&calculate_engagement_with(&metrics, &config.engagement), cli.compact)?
        }
        Commands::Benchmark => {
            let request: BenchmarkRequest = parse(&raw)?;
            let benchmark = if request.records.is_empty() {
                Benchmark::from_values(&request.metric_name, &request.values)
            } else {
                Benchmark::from_records(&request.metric_name, &request.records, &request.segment)
            }
            .context("Failed to build benchmark")?;
            let comparisons = request.compare.iter().map(|&v| benchmark.compare(v)).collect();
            let batch = match &request.segment_by {
                Some(column) => {
                    BenchmarkSet::segmented(&request.metric_name, &request.records, column)
                        .batch_compare(&request.records, &request.metric_name, Some(column))
                }
                None => Vec::new(),
            };
            render(
                &BenchmarkResponse {
                    benchmark,
                    comparisons,
                    batch,
                },
                cli.compact,
            )?
        }
        Commands::Roster => {
            let request: RosterRequest = parse(&raw)?;
            let scorer = BatchScorer::new(config);
            render(
                &scorer.team_from_roster(&request.people, &request.historical_averages),
                cli.compact,
            )?
        }
    };

    println!("{}", output);
    Ok(())
}

fn read_request(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read request from stdin")?;
            Ok(buffer)
        }
    }
}

fn parse<T: DeserializeOwned>(raw: &str) -> Result<T> {
    serde_json::from_str(raw).context("Failed to parse JSON request")
}

fn render<T: Serialize>(value: &T, compact: bool) -> Result<String> {
    if compact {
        serde_json::to_string(value).context("Failed to serialize result")
    } else {
        serde_json::to_string_pretty(value).context("Failed to serialize result")
    }
}
