// Pitch-level analytics built on top of validated Statcast data.

pub mod barrel;
pub mod fatigue;
pub mod insights;
pub mod profile;
pub mod zone;

use crate::providers::statcast::PitchRecord;

/// A pitch counts as a batted ball when tracking captured both launch
/// measurements.
pub fn is_batted_ball(pitch: &PitchRecord) -> bool {
    pitch.launch_speed.is_some() && pitch.launch_angle.is_some()
}

/// Default expected wOBA used when tracking data is missing.
pub const DEFAULT_XWOBA: f64 = 0.300;
