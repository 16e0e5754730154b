use chrono::{Duration, TimeZone, Utc};
use perfscore::domain::cpis::{
    CollaborationCounters, ConsistencyCounters, CpisFeedback, CpisInput, DimensionCode,
    EvidenceCounters, Grade, GrowthCounters, InitiativeCounters, compute_cpis, compute_gai,
    compute_rqs,
};
use perfscore::domain::goals::{TaskCompletion, calculate_goal_from_tasks};
use perfscore::domain::reviews::{RatingRecord, calibrate_ratings};
use perfscore::domain::stats::{bounded_sigmoid, gini_coefficient, mean, sigmoid};

#[test]
fn scenario_a_mean() {
    assert_eq!(mean(&[]), 0.0);
    assert_eq!(mean(&[2.0, 4.0, 6.0]), 4.0);
}

#[test]
fn scenario_b_two_task_goal() {
    let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
    let tasks: Vec<TaskCompletion> = [100.0, 50.0]
        .iter()
        .enumerate()
        .map(|(i, &progress)| TaskCompletion {
            task_id: format!("t{}", i),
            goal_id: "goal-1".to_string(),
            weight: 5.0,
            progress,
            quality: 5.0,
            days_late: 0,
            complexity: 3,
            completed_at: Some(now - Duration::days(10 - i as i64)),
        })
        .collect();
    let result = calculate_goal_from_tasks("goal-1", &tasks, None, now);
    assert!((result.completion_score - 75.0).abs() < 1e-9);
    assert_eq!(result.task_breakdown.len(), 2);
}

#[test]
fn empty_inputs_use_documented_defaults() {
    let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
    let goal = calculate_goal_from_tasks("empty", &[], None, now);
    assert_eq!(goal.composite_score, 0.0);
    assert_eq!(goal.risk_score, 50.0);
    assert!(goal.predicted_completion_date.is_none());

    for dim in [compute_gai(&[]), compute_rqs(&[])] {
        assert_eq!(dim.raw_score, 0.0);
        assert_eq!(dim.grade, Grade::F);
    }
}

#[test]
fn scenario_c_gini() {
    assert!(gini_coefficient(&[10.0, 10.0, 10.0]).abs() < 1e-12);
    // (n - 1) / n is the ceiling for n = 3
    assert!((gini_coefficient(&[0.0, 0.0, 10.0]) - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn scenario_d_missing_goals_and_reviews() {
    let input = CpisInput {
        feedbacks: (0..5)
            .map(|i| CpisFeedback {
                sentiment: 0.4,
                has_skill_tag: true,
                has_value_tag: false,
                created_at: Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap() + Duration::days(i),
            })
            .collect(),
        collaboration: CollaborationCounters {
            cross_functional_goals: 2,
            feedback_given: 5,
            feedback_received: 5,
            one_on_ones: 4,
            recognitions_given: 3,
            team_contributions: 8,
        },
        consistency: ConsistencyCounters {
            total_deadlines: 4,
            deadlines_met: 4,
            streak_days: 10,
            ..Default::default()
        },
        growth: GrowthCounters {
            skill_progressions: 3,
            ..Default::default()
        },
        evidence: EvidenceCounters {
            total: 2,
            verified: 2,
            avg_impact: 60.0,
            avg_quality: 60.0,
            evidence_types: 1,
        },
        initiative: InitiativeCounters {
            knowledge_shares: 3,
            ..Default::default()
        },
        tenure_years: 0.0,
        ..Default::default()
    };

    let result = compute_cpis(&input);
    let mut expected_total = 0.0;
    for dim in &result.dimensions {
        match dim.code {
            DimensionCode::Gai | DimensionCode::Rqs => {
                assert!(!dim.has_data);
                assert_eq!(dim.weighted_score, 0.0);
            }
            code => {
                assert!((dim.weight - code.base_weight() / 0.55).abs() < 1e-9);
                expected_total += dim.raw_score * code.base_weight() / 0.55;
            }
        }
    }
    // zero tenure, no priors: the score is the live weighted sum
    assert!((result.score - (expected_total * 100.0).round() / 100.0).abs() < 1e-9);
    assert!(!result.strengths.iter().any(|s| s == "Goal Attainment" || s == "Review Quality"));
    assert!(!result.growth_areas.iter().any(|s| s == "Goal Attainment" || s == "Review Quality"));
}

#[test]
fn scenario_e_sigmoid() {
    assert_eq!(sigmoid(0.0), 0.5);
    assert_eq!(bounded_sigmoid(0.0, 10.0, 20.0, 1.0, 0.0), 15.0);
}

#[test]
fn single_reviewer_without_variance_is_unchanged() {
    let ratings: Vec<RatingRecord> = (0..4)
        .map(|i| RatingRecord {
            review_id: format!("r{}", i),
            reviewer_id: "only".to_string(),
            reviewee_id: format!("e{}", i),
            rating: 3.0,
        })
        .collect();
    for calibrated in calibrate_ratings(&ratings) {
        assert_eq!(calibrated.calibrated_rating, calibrated.original_rating);
        assert_eq!(calibrated.adjustment, 0.0);
    }
}
