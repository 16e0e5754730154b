use super::types::{GoalRiskInput, GoalRiskResult, RiskLevel};
use crate::domain::stats::{clamp_pct, ewma, mean, sigmoid_with};
use tracing::debug;

/// Intentional magic value: required velocity reported for a goal that is
/// past due with work remaining. Downstream consumers match on it.
pub const PAST_DUE_REQUIRED_VELOCITY: f64 = 999.0;

const VELOCITY_EWMA_ALPHA: f64 = 0.4;

const SCHEDULE_WEIGHT: f64 = 0.40;
const VELOCITY_WEIGHT: f64 = 0.30;
const DEPENDENCY_WEIGHT: f64 = 0.15;
const COMPLEXITY_WEIGHT: f64 = 0.15;

/// Composite schedule/velocity/dependency/complexity risk for a goal.
pub fn assess_goal_risk(input: &GoalRiskInput) -> GoalRiskResult {
    let progress = clamp_pct(input.progress);
    let remaining = 100.0 - progress;
    let is_complete = remaining <= 0.0;
    let is_past_due = input.days_remaining <= 0.0;

    // Schedule
    let elapsed = (input.total_days - input.days_remaining).max(0.0);
    let expected_progress = if input.total_days > 0.0 {
        clamp_pct(elapsed / input.total_days * 100.0)
    } else {
        0.0
    };
    let schedule_risk = if is_complete {
        0.0
    } else if expected_progress > 0.0 {
        sigmoid_with((expected_progress - progress) / expected_progress, 3.0, 0.0) * 100.0
    } else {
        50.0
    };

    // Velocity
    let current_velocity = ewma(&input.velocity_history, VELOCITY_EWMA_ALPHA);
    let required_velocity = if is_complete {
        0.0
    } else if is_past_due {
        PAST_DUE_REQUIRED_VELOCITY
    } else {
        remaining / input.days_remaining
    };
    let velocity_risk = if is_complete {
        0.0
    } else if is_past_due {
        100.0
    } else if input.velocity_history.is_empty() {
        50.0
    } else if current_velocity <= 0.0 {
        100.0
    } else {
        sigmoid_with(required_velocity / current_velocity - 1.0, 2.0, 0.0) * 100.0
    };

    // Dependencies
    let dependency_risk = match input
        .dependency_risks
        .iter()
        .copied()
        .map(clamp_pct)
        .reduce(f64::max)
    {
        Some(max) => {
            let clamped: Vec<f64> = input.dependency_risks.iter().copied().map(clamp_pct).collect();
            0.6 * mean(&clamped) + 0.4 * max
        }
        None => 0.0,
    };

    // Complexity
    let complexity_risk = (input.complexity.clamp(1.0, 5.0) / 5.0) * (remaining / 100.0) * 100.0;

    let risk_score = clamp_pct(
        SCHEDULE_WEIGHT * schedule_risk
            + VELOCITY_WEIGHT * velocity_risk
            + DEPENDENCY_WEIGHT * dependency_risk
            + COMPLEXITY_WEIGHT * complexity_risk,
    );
    let risk_level = RiskLevel::from_score(risk_score);

    let projected_completion =
        (progress + current_velocity.max(0.0) * input.days_remaining.max(0.0)).min(100.0);
    let days_needed_at_current_pace = if is_complete {
        Some(0.0)
    } else if current_velocity > 0.0 {
        Some(remaining / current_velocity)
    } else {
        None
    };

    debug!(
        "Goal risk: schedule={:.1} velocity={:.1} dependency={:.1} complexity={:.1} -> {:.1} ({:?})",
        schedule_risk, velocity_risk, dependency_risk, complexity_risk, risk_score, risk_level
    );

    GoalRiskResult {
        risk_score,
        risk_level,
        schedule_risk,
        velocity_risk,
        dependency_risk,
        complexity_risk,
        projected_completion,
        required_velocity,
        current_velocity,
        days_needed_at_current_pace,
    }
}
