// Review calibration domain
pub mod calibration;

pub use calibration::{CalibratedRating, RatingRecord, calibrate_ratings};
