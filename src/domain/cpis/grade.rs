use serde::{Deserialize, Serialize};
use std::fmt;

/// Eight-tier letter grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "C+")]
    CPlus,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 90.0 => Grade::APlus,
            s if s >= 80.0 => Grade::A,
            s if s >= 70.0 => Grade::BPlus,
            s if s >= 60.0 => Grade::B,
            s if s >= 50.0 => Grade::CPlus,
            s if s >= 40.0 => Grade::C,
            s if s >= 30.0 => Grade::D,
            _ => Grade::F,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 1-5 stars
pub fn star_rating(score: f64) -> u8 {
    match score {
        s if s >= 85.0 => 5,
        s if s >= 70.0 => 4,
        s if s >= 50.0 => 3,
        s if s >= 30.0 => 2,
        _ => 1,
    }
}

pub fn rank_label(score: f64) -> &'static str {
    match score {
        s if s >= 90.0 => "Exceptional",
        s if s >= 80.0 => "Outstanding",
        s if s >= 70.0 => "Strong Performer",
        s if s >= 60.0 => "Solid Contributor",
        s if s >= 50.0 => "Developing",
        s if s >= 40.0 => "Needs Improvement",
        _ => "Underperforming",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_tiers() {
        assert_eq!(Grade::from_score(100.0), Grade::APlus);
        assert_eq!(Grade::from_score(89.99), Grade::A);
        assert_eq!(Grade::from_score(55.0), Grade::CPlus);
        assert_eq!(Grade::from_score(30.0), Grade::D);
        assert_eq!(Grade::from_score(0.0), Grade::F);
    }

    #[test]
    fn test_grade_display_and_serde() {
        assert_eq!(Grade::APlus.to_string(), "A+");
        assert_eq!(serde_json::to_string(&Grade::BPlus).unwrap(), "\"B+\"");
        assert_eq!(serde_json::to_string(&Grade::F).unwrap(), "\"F\"");
    }

    #[test]
    fn test_stars_and_labels() {
        assert_eq!(star_rating(92.0), 5);
        assert_eq!(star_rating(10.0), 1);
        assert_eq!(rank_label(72.0), "Strong Performer");
        assert_eq!(rank_label(12.0), "Underperforming");
    }
}
