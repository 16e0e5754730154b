// Comprehensive Performance Intelligence Score
pub mod dimensions;
pub mod engine;
pub mod fairness;
pub mod grade;
pub mod types;

pub use dimensions::{
    compute_cis, compute_cri, compute_eqs, compute_fsi, compute_gai, compute_gts, compute_iii,
    compute_rqs,
};
pub use engine::{compute_cpis, compute_cpis_with, confidence_interval, reweight_dimensions, trajectory};
pub use fairness::analyze_fairness;
pub use grade::{Grade, rank_label, star_rating};
pub use types::*;
