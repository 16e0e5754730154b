//! Aggregates a goal's child task completions into a composite goal score.

use super::types::{GoalMathResult, TaskBreakdown, TaskCompletion};
use crate::domain::stats::{clamp_pct, ewma, mean, sigmoid_with, weighted_mean};
use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Recent task quality counts more
const QUALITY_EWMA_ALPHA: f64 = 0.4;
const TIMELINESS_STEEPNESS: f64 = 0.2;

const COMPLETION_WEIGHT: f64 = 0.50;
const QUALITY_WEIGHT: f64 = 0.30;
const TIMELINESS_WEIGHT: f64 = 0.20;

const MIN_EFFICIENCY_MULTIPLIER: f64 = 0.5;
const MAX_EFFICIENCY_MULTIPLIER: f64 = 1.5;

/// Compute the goal score, velocity, risk and forecast from its tasks.
///
/// # Arguments
/// * `goal_id` - Goal the tasks belong to
/// * `tasks` - Child task completions
/// * `due_date` - Goal deadline, if any
/// * `now` - Evaluation instant; the only clock the calculation sees
///
/// An empty task list yields [`GoalMathResult::empty`].
pub fn calculate_goal_from_tasks(
    goal_id: &str,
    tasks: &[TaskCompletion],
    due_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> GoalMathResult {
    if tasks.is_empty() {
        debug!("Goal {}: no tasks, returning neutral result", goal_id);
        return GoalMathResult::empty(goal_id);
    }

    let weights: Vec<f64> = tasks.iter().map(|t| t.weight.max(0.0)).collect();
    let progress: Vec<f64> = tasks.iter().map(|t| clamp_pct(t.progress)).collect();
    let qualities: Vec<f64> = tasks.iter().map(|t| t.quality.clamp(0.0, 5.0)).collect();
    let complexities: Vec<f64> = tasks
        .iter()
        .map(|t| f64::from(t.complexity.clamp(1, 5)))
        .collect();
    let days_late: Vec<f64> = tasks.iter().map(|t| f64::from(t.days_late)).collect();

    // 1. Completion
    let completion_score = weighted_mean(&progress, &weights);

    // 2. Quality, chronological so the latest completions dominate
    let chronological = chronological_order(tasks);
    let chronological_quality: Vec<f64> = chronological
        .iter()
        .map(|t| t.quality.clamp(0.0, 5.0))
        .collect();
    let quality_score = clamp_pct(ewma(&chronological_quality, QUALITY_EWMA_ALPHA) / 5.0 * 100.0);

    // 3. Timeliness in (-1, +1), rescaled to (0, 100)
    let avg_days_late = mean(&days_late);
    let timeliness_factor = sigmoid_with(-avg_days_late, TIMELINESS_STEEPNESS, 0.0) * 2.0 - 1.0;
    let timeliness_score = (timeliness_factor + 1.0) / 2.0 * 100.0;

    // 4. Efficiency
    let mean_quality = mean(&qualities);
    let mean_complexity = mean(&complexities);
    let efficiency = if mean_complexity > 0.0 {
        mean_quality / mean_complexity
    } else {
        0.0
    };
    let efficiency_multiplier = efficiency.clamp(MIN_EFFICIENCY_MULTIPLIER, MAX_EFFICIENCY_MULTIPLIER);

    // 5. Composite
    let blended = clamp_pct(
        COMPLETION_WEIGHT * completion_score
            + QUALITY_WEIGHT * quality_score
            + TIMELINESS_WEIGHT * timeliness_score,
    );
    let composite_score = clamp_pct(blended * efficiency_multiplier);

    // 6-7. Velocity and forecast
    let velocity = completion_velocity(&chronological);
    let predicted_completion_date = predict_completion(completion_score, velocity, now);

    // 8. Risk
    let risk_score = goal_risk(completion_score, velocity, due_date, now);

    // 9. Breakdown
    let task_breakdown = breakdown(tasks, &weights, &progress, mean_quality, avg_days_late);

    debug!(
        "Goal {}: completion={:.2} quality={:.2} timeliness={:.3} composite={:.2} velocity={:.3} risk={:.2}",
        goal_id,
        completion_score,
        quality_score,
        timeliness_factor,
        composite_score,
        velocity,
        risk_score
    );

    GoalMathResult {
        goal_id: goal_id.to_string(),
        completion_score,
        quality_adjusted_score: quality_score,
        timeliness_factor,
        composite_score,
        velocity,
        predicted_completion_date,
        risk_score,
        efficiency,
        task_breakdown,
    }
}

/// Tasks ordered by completion time; unfinished tasks keep input order and go last.
fn chronological_order(tasks: &[TaskCompletion]) -> Vec<&TaskCompletion> {
    let mut ordered: Vec<&TaskCompletion> = tasks.iter().collect();
    ordered.sort_by_key(|t| (t.completed_at.is_none(), t.completed_at));
    ordered
}

fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MS_PER_DAY
}

/// Weighted progress of completed tasks per day between first and last completion.
fn completion_velocity(chronological: &[&TaskCompletion]) -> f64 {
    let completed: Vec<(&TaskCompletion, DateTime<Utc>)> = chronological
        .iter()
        .filter_map(|t| t.completed_at.map(|at| (*t, at)))
        .collect();

    let (Some((_, first)), Some((_, last))) = (completed.first(), completed.last()) else {
        return 0.0;
    };
    if completed.len() < 2 {
        return 0.0;
    }

    let span_days = days_between(*first, *last);
    if span_days <= 0.0 {
        return 0.0;
    }

    let progress: Vec<f64> = completed.iter().map(|(t, _)| clamp_pct(t.progress)).collect();
    let weights: Vec<f64> = completed.iter().map(|(t, _)| t.weight.max(0.0)).collect();
    weighted_mean(&progress, &weights) / span_days
}

fn predict_completion(
    completion_score: f64,
    velocity: f64,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if velocity <= 0.0 || completion_score >= 100.0 {
        return None;
    }
    let days = (100.0 - completion_score) / velocity;
    let millis = (days * MS_PER_DAY).round();
    if !millis.is_finite() || millis >= i64::MAX as f64 {
        return None;
    }
    TimeDelta::try_milliseconds(millis as i64).and_then(|delta| now.checked_add_signed(delta))
}

fn goal_risk(
    completion_score: f64,
    velocity: f64,
    due_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> f64 {
    if completion_score >= 100.0 {
        return 0.0;
    }
    if due_date.is_some_and(|due| now > due) {
        return 100.0;
    }

    let remaining = 100.0 - completion_score;
    if velocity <= 0.0 {
        return (50.0 + remaining / 2.0).min(100.0);
    }

    let Some(due) = due_date else {
        return remaining / 2.0;
    };

    let days_left = days_between(now, due);
    let ratio = if days_left > 0.0 {
        let required = remaining / days_left;
        velocity / required
    } else {
        0.0
    };
    clamp_pct((1.0 - sigmoid_with(ratio, 3.0, 1.0)) * 100.0)
}

fn breakdown(
    tasks: &[TaskCompletion],
    weights: &[f64],
    progress: &[f64],
    mean_quality: f64,
    mean_days_late: f64,
) -> Vec<TaskBreakdown> {
    let total_weight: f64 = weights.iter().sum();
    let lateness_scale = mean_days_late.abs().max(1.0);

    tasks
        .iter()
        .zip(weights.iter().zip(progress.iter()))
        .map(|(task, (&weight, &progress))| {
            let weighted_contribution = if total_weight > 0.0 {
                weight / total_weight * progress
            } else {
                0.0
            };
            let quality_impact = if mean_quality > 0.0 {
                (task.quality.clamp(0.0, 5.0) - mean_quality) / mean_quality
            } else {
                0.0
            };
            let timeliness_impact = (mean_days_late - f64::from(task.days_late)) / lateness_scale;

            TaskBreakdown {
                task_id: task.task_id.clone(),
                weighted_contribution,
                quality_impact,
                timeliness_impact,
            }
        })
        .collect()
}
