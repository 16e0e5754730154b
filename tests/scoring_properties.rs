use chrono::{Duration, TimeZone, Utc};
use perfscore::domain::config::SourceWeights;
use perfscore::domain::cpis::{
    CollaborationCounters, ConsistencyCounters, CpisFeedback, CpisGoal, CpisInput, CpisReview,
    CpisReviewType, DimensionCode, EvidenceCounters, GoalPriority, GrowthCounters, InitiativeCounters,
    compute_cpis,
};
use perfscore::domain::goals::{
    GoalRiskInput, TaskCompletion, assess_goal_risk, calculate_goal_from_tasks,
};
use perfscore::domain::performance::{
    FeedbackSignal, GoalScore, PerformanceInputs, ReviewInput, ReviewType, TeamInput, MemberScore,
    calculate_performance_score, calculate_team_analytics,
};
use perfscore::domain::performance::individual::redistribute_weights;
use perfscore::domain::reviews::{RatingRecord, calibrate_ratings};

fn in_pct(value: f64) -> bool {
    (0.0..=100.0).contains(&value)
}

fn task(id: &str, progress: f64, days_late: i32, day: i64) -> TaskCompletion {
    TaskCompletion {
        task_id: id.to_string(),
        goal_id: "g".to_string(),
        weight: 5.0,
        progress,
        quality: 4.0,
        days_late,
        complexity: 3,
        completed_at: Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::days(day)),
    }
}

fn extreme_cpis_input() -> CpisInput {
    CpisInput {
        goals: vec![
            CpisGoal {
                progress: 500.0,
                weight: 3.0,
                priority: GoalPriority::Critical,
                days_late: -400.0,
                alignment_depth: 50,
                complexity: 99.0,
            },
            CpisGoal {
                progress: -20.0,
                weight: 1.0,
                priority: GoalPriority::Low,
                days_late: 400.0,
                alignment_depth: 0,
                complexity: -3.0,
            },
        ],
        reviews: vec![
            CpisReview {
                rating: 9.0,
                reviewer_trust: 300.0,
                review_type: CpisReviewType::SelfReview,
                bias_score: 4.0,
            },
            CpisReview {
                rating: -2.0,
                reviewer_trust: -10.0,
                review_type: CpisReviewType::External,
                bias_score: -1.0,
            },
        ],
        feedbacks: vec![CpisFeedback {
            sentiment: 7.0,
            has_skill_tag: true,
            has_value_tag: true,
            created_at: Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
        }],
        collaboration: CollaborationCounters {
            cross_functional_goals: 10_000,
            feedback_given: 10_000,
            feedback_received: 10_000,
            one_on_ones: 10_000,
            recognitions_given: 10_000,
            team_contributions: 10_000,
        },
        consistency: ConsistencyCounters {
            total_deadlines: 3,
            deadlines_met: 30,
            avg_days_overdue: -5.0,
            velocity_variance: -1.0,
            streak_days: 5_000,
            rating_std_dev: -1.0,
        },
        growth: GrowthCounters {
            historical_scores: vec![0.0, 100.0, 0.0, 100.0],
            skill_progressions: 1_000,
            trainings_completed: 1_000,
            dev_plan_progress: 250.0,
            promotion_readiness: -50.0,
        },
        evidence: EvidenceCounters {
            total: 2,
            verified: 20,
            avg_impact: 400.0,
            avg_quality: -40.0,
            evidence_types: 100,
        },
        initiative: InitiativeCounters {
            innovation_ideas: 1_000,
            ..Default::default()
        },
        tenure_years: 90.0,
        level: 9,
        department_avg: Some(5.0),
        org_avg: Some(99.0),
    }
}

#[test]
fn cpis_outputs_stay_in_their_domains() {
    for input in [CpisInput::default(), extreme_cpis_input()] {
        let result = compute_cpis(&input);
        assert!(in_pct(result.score));
        assert!(in_pct(result.raw_score));
        assert!((1..=5).contains(&result.star_rating));
        assert!(in_pct(result.confidence_interval.lower_bound));
        assert!(in_pct(result.confidence_interval.upper_bound));
        assert!(result.confidence_interval.lower_bound <= result.confidence_interval.upper_bound);
        assert!((0.0..=1.0).contains(&result.confidence_interval.level));
        assert!((0.0..=1.0).contains(&result.fairness.confidence));
        assert!(in_pct(result.trajectory.predicted_next));
        for dim in &result.dimensions {
            assert!(in_pct(dim.raw_score), "{:?} out of range", dim.code);
        }
    }
}

#[test]
fn saturated_counters_score_without_overflow() {
    let input = CpisInput {
        collaboration: CollaborationCounters {
            cross_functional_goals: u32::MAX,
            feedback_given: u32::MAX,
            feedback_received: u32::MAX,
            one_on_ones: u32::MAX,
            recognitions_given: u32::MAX,
            team_contributions: u32::MAX,
        },
        initiative: InitiativeCounters {
            innovation_ideas: u32::MAX,
            voluntary_goals: u32::MAX,
            ..Default::default()
        },
        evidence: EvidenceCounters {
            total: u32::MAX,
            verified: u32::MAX,
            evidence_types: u32::MAX,
            ..Default::default()
        },
        ..Default::default()
    };
    let result = compute_cpis(&input);
    assert!(in_pct(result.score));
    let cis = result
        .dimensions
        .iter()
        .find(|d| d.code == DimensionCode::Cis)
        .unwrap();
    assert!(cis.has_data);
    assert_eq!(cis.sub_metrics["totalActivity"], 6.0 * u32::MAX as f64);
}

#[test]
fn individual_outputs_stay_in_their_domains() {
    let inputs = PerformanceInputs {
        goals: vec![GoalScore {
            score: 400.0,
            weight: 2.0,
        }],
        reviews: vec![ReviewInput {
            rating: 11.0,
            reviewer_trust: 500.0,
            review_type: ReviewType::Manager,
        }],
        feedback: vec![FeedbackSignal {
            sentiment: -9.0,
            recency: 3.0,
        }],
        attendance_rate: Some(4.0),
        collaboration_score: Some(-30.0),
        population: Some(vec![10.0, 20.0, 30.0]),
    };
    let result = calculate_performance_score(&inputs);
    assert!(in_pct(result.overall_score));
    assert!((0.0..=1.0).contains(&result.confidence));
    assert!((1..=5).contains(&result.derived_rating));
    assert!(result.percentile.is_some_and(in_pct));
}

#[test]
fn goal_and_risk_outputs_stay_in_their_domains() {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    let tasks = vec![task("a", 250.0, -90, 1), task("b", -10.0, 400, 40)];
    let goal = calculate_goal_from_tasks("g", &tasks, Some(now - Duration::days(3)), now);
    assert!(in_pct(goal.completion_score));
    assert!(in_pct(goal.composite_score));
    assert!(in_pct(goal.risk_score));
    assert!(in_pct(goal.quality_adjusted_score));
    assert!((-1.0..=1.0).contains(&goal.timeliness_factor));

    let risk = assess_goal_risk(&GoalRiskInput {
        progress: 130.0,
        days_remaining: -5.0,
        total_days: 10.0,
        velocity_history: vec![-3.0, 40.0],
        dependency_risks: vec![300.0, -20.0],
        complexity: 12.0,
    });
    assert!(in_pct(risk.risk_score));
    assert!(in_pct(risk.schedule_risk));
    assert!(in_pct(risk.velocity_risk));
    assert!(in_pct(risk.dependency_risk));
    assert!(in_pct(risk.complexity_risk));
    assert!(in_pct(risk.projected_completion));
}

#[test]
fn team_outputs_stay_in_their_domains() {
    let input = TeamInput {
        members: [0.0, 0.0, 0.0, 100.0]
            .iter()
            .enumerate()
            .map(|(i, &score)| MemberScore {
                member_id: format!("m{}", i),
                score,
            })
            .collect(),
        historical_averages: vec![10.0, 90.0],
    };
    let result = calculate_team_analytics(&input);
    assert!((0.0..=1.0).contains(&result.rating_entropy));
    assert!((0.0..=1.0).contains(&result.gini_coefficient));
    assert!(in_pct(result.predicted_next_avg));
}

#[test]
fn calibrated_ratings_stay_on_scale() {
    let ratings: Vec<RatingRecord> = [1.0, 1.0, 1.0, 5.0, 5.0, 2.0]
        .iter()
        .enumerate()
        .map(|(i, &rating)| RatingRecord {
            review_id: format!("r{}", i),
            reviewer_id: if i < 3 { "harsh" } else { "mixed" }.to_string(),
            reviewee_id: format!("e{}", i),
            rating,
        })
        .collect();
    for calibrated in calibrate_ratings(&ratings) {
        assert!((1.0..=5.0).contains(&calibrated.calibrated_rating));
    }
}

#[test]
fn individual_weights_always_sum_to_one() {
    let base = SourceWeights::default();
    for mask in 0u8..32 {
        let present = [0, 1, 2, 3, 4].map(|bit| mask & (1 << bit) != 0);
        let weights = redistribute_weights(&base, present);
        assert!(
            (weights.sum() - 1.0).abs() < 1e-6,
            "mask {:05b} sums to {}",
            mask,
            weights.sum()
        );
        if mask != 0 {
            for (i, &w) in weights.as_array().iter().enumerate() {
                if !present[i] {
                    assert_eq!(w, 0.0, "absent source {} kept weight", i);
                }
            }
        }
    }
}

#[test]
fn cpis_weights_always_sum_to_one() {
    let full = extreme_cpis_input();
    let variants = [
        CpisInput::default(),
        full.clone(),
        CpisInput {
            goals: vec![],
            reviews: vec![],
            ..full.clone()
        },
        CpisInput {
            collaboration: CollaborationCounters::default(),
            growth: GrowthCounters::default(),
            initiative: InitiativeCounters::default(),
            ..full.clone()
        },
        CpisInput {
            goals: full.goals.clone(),
            ..Default::default()
        },
    ];
    for input in &variants {
        let result = compute_cpis(input);
        let sum: f64 = result.dimensions.iter().map(|d| d.weight).sum();
        assert!((sum - 1.0).abs() < 1e-6, "weights sum to {}", sum);
    }
}

#[test]
fn more_progress_never_lowers_completion() {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    let mut previous = f64::NEG_INFINITY;
    for progress in [0.0, 10.0, 35.0, 60.0, 99.0, 100.0] {
        let tasks = vec![task("a", progress, 0, 1), task("b", 40.0, 0, 5)];
        let result = calculate_goal_from_tasks("g", &tasks, None, now);
        assert!(result.completion_score >= previous);
        previous = result.completion_score;
    }
}

#[test]
fn more_lateness_never_raises_timeliness() {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    let mut previous = f64::INFINITY;
    for days_late in [-10, -1, 0, 1, 5, 30] {
        let tasks = vec![task("a", 80.0, days_late, 1), task("b", 80.0, 2, 5)];
        let result = calculate_goal_from_tasks("g", &tasks, None, now);
        assert!(result.timeliness_factor <= previous);
        previous = result.timeliness_factor;
    }
}

#[test]
fn calculators_are_idempotent() {
    let input = extreme_cpis_input();
    assert_eq!(compute_cpis(&input), compute_cpis(&input));

    let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    let tasks = vec![task("a", 70.0, 1, 1), task("b", 30.0, -2, 9)];
    let due = Some(now + Duration::days(10));
    assert_eq!(
        calculate_goal_from_tasks("g", &tasks, due, now),
        calculate_goal_from_tasks("g", &tasks, due, now)
    );
}
