// Batter contact-quality profile: the scouting-report numbers for one
// player's batted balls.

use serde::Serialize;

use crate::analytics::{is_batted_ball, DEFAULT_XWOBA};
use crate::providers::statcast::PitchRecord;

// Profile thresholds use the simple barrel definition (98+ mph in the full
// 8-50 degree window) rather than the banded one.
const SIMPLE_BARREL_SPEED: f64 = 98.0;
const SIMPLE_BARREL_ANGLE: (f64, f64) = (8.0, 50.0);
const HARD_HIT_SPEED: f64 = 95.0;
const SWEET_SPOT_ANGLE: (f64, f64) = (8.0, 32.0);
const PULL_CUTOFF: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatterProfile {
    pub batted_balls: usize,
    pub avg_exit_velo: f64,
    pub avg_launch_angle: f64,
    pub barrel_rate_pct: f64,
    pub hard_hit_rate_pct: f64,
    pub sweet_spot_rate_pct: f64,
    pub avg_xwoba: f64,
    pub pull_rate_pct: f64,
}

/// Profile a batter from pitch-level rows. Only pitches with both launch
/// measurements count; returns None when there are none.
pub fn batter_profile(pitches: &[PitchRecord]) -> Option<BatterProfile> {
    let batted: Vec<&PitchRecord> = pitches.iter().filter(|p| is_batted_ball(p)).collect();
    if batted.is_empty() {
        return None;
    }
    let n = batted.len() as f64;

    let mut speed_sum = 0.0;
    let mut angle_sum = 0.0;
    let mut barrels = 0usize;
    let mut hard_hits = 0usize;
    let mut sweet_spots = 0usize;
    for pitch in &batted {
        let (Some(speed), Some(angle)) = (pitch.launch_speed, pitch.launch_angle) else {
            continue;
        };
        speed_sum += speed;
        angle_sum += angle;
        if speed >= SIMPLE_BARREL_SPEED
            && (SIMPLE_BARREL_ANGLE.0..=SIMPLE_BARREL_ANGLE.1).contains(&angle)
        {
            barrels += 1;
        }
        if speed >= HARD_HIT_SPEED {
            hard_hits += 1;
        }
        if (SWEET_SPOT_ANGLE.0..=SWEET_SPOT_ANGLE.1).contains(&angle) {
            sweet_spots += 1;
        }
    }

    let xwobas: Vec<f64> = batted.iter().filter_map(|p| p.estimated_woba).collect();
    let avg_xwoba = if xwobas.is_empty() {
        DEFAULT_XWOBA
    } else {
        xwobas.iter().sum::<f64>() / xwobas.len() as f64
    };

    Some(BatterProfile {
        batted_balls: batted.len(),
        avg_exit_velo: speed_sum / n,
        avg_launch_angle: angle_sum / n,
        barrel_rate_pct: barrels as f64 / n * 100.0,
        hard_hit_rate_pct: hard_hits as f64 / n * 100.0,
        sweet_spot_rate_pct: sweet_spots as f64 / n * 100.0,
        avg_xwoba,
        pull_rate_pct: pull_rate(&batted),
    })
}

/// Share of batted balls pulled, judged from plate position relative to the
/// batter's stand. With no stand or location data the rate reads neutral.
fn pull_rate(batted: &[&PitchRecord]) -> f64 {
    let mut pulled = 0usize;
    let mut total = 0usize;
    for pitch in batted {
        let (Some(stand), Some(x)) = (pitch.stand.as_deref(), pitch.plate_x) else {
            continue;
        };
        match stand {
            "R" => {
                total += 1;
                if x < -PULL_CUTOFF {
                    pulled += 1;
                }
            }
            "L" => {
                total += 1;
                if x > PULL_CUTOFF {
                    pulled += 1;
                }
            }
            _ => {}
        }
    }
    if total == 0 {
        50.0
    } else {
        pulled as f64 / total as f64 * 100.0
    }
}
